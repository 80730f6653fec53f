use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::Method;
use serde_json::{json, Value};

use care_portal_gateway::access::{
    render_menu, Decision, IdentityClaim, MenuTable, SectionPolicies,
};
use care_portal_gateway::backend::{ApiClient, BearerToken};
use care_portal_gateway::config::load_with_env;
use care_portal_gateway::forwarder::BackendTarget;

#[derive(Parser)]
#[command(name = "portal-cli")]
#[command(about = "Operator CLI for the care portal gateway", long_about = None)]
struct Cli {
    /// Path to a TOML config file (defaults to $PORTAL_CONFIG).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the navigation menu for an identity
    Menu {
        #[arg(long)]
        role: String,
        #[arg(long)]
        sub_role: Option<String>,
        /// Current path, used to mark the active entry
        #[arg(long, default_value = "")]
        current: String,
    },
    /// Evaluate the access policy for a page path
    Check {
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        sub_role: Option<String>,
        #[arg(long)]
        path: String,
    },
    /// Show the resolved backend target
    Target,
    /// Call the backend API directly
    Fetch {
        /// Path relative to the backend base path, query allowed
        path: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
        /// Bearer token for the call
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var_os("PORTAL_CONFIG").map(PathBuf::from));
    let config = load_with_env(config_path.as_deref())?;

    match cli.command {
        Commands::Menu { role, sub_role, current } => {
            let identity = IdentityClaim::new(role, sub_role.as_deref());
            let table = MenuTable::from_config(&config.menu);
            let entries = table.for_identity(&identity);
            print_json(&json!({
                "identity": identity,
                "landing_path": entries.first().map(|e| e.path.as_str()),
                "entries": render_menu(entries, &current, config.menu.active_match),
            }))?;
        }
        Commands::Check { role, sub_role, path } => {
            let identity = role.map(|r| IdentityClaim::new(r, sub_role.as_deref()));
            let sections = SectionPolicies::from_config(&config.access.sections);
            let report = match sections.section_for(&path) {
                Some(section) => {
                    let (decision, reason) = match section.policy.evaluate(identity.as_ref()) {
                        Decision::Allowed => ("ALLOWED", None),
                        Decision::Denied(reason) => ("DENIED", Some(reason.as_str())),
                    };
                    json!({
                        "path": path,
                        "section": section.name,
                        "decision": decision,
                        "reason": reason,
                    })
                }
                None => json!({ "path": path, "section": Value::Null, "decision": "ALLOWED", "reason": "public" }),
            };
            print_json(&report)?;
        }
        Commands::Target => {
            let target = BackendTarget::resolve(&config.backend.url);
            print_json(&json!({
                "configured": target.is_configured(),
                "origin": target.origin(),
                "base_path": target.base_path(),
            }))?;
        }
        Commands::Fetch { path, method, token } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())?;
            let token = token.map(BearerToken::new);
            let client = ApiClient::new(
                BackendTarget::resolve(&config.backend.url),
                Duration::from_secs(config.timeouts.request_secs),
            )?;

            let (status, body) = client.fetch(method, &path, token.as_ref()).await?;
            if !status.is_success() {
                eprintln!("Error: backend returned status {}", status);
            }
            match serde_json::from_str::<Value>(&body) {
                Ok(value) => print_json(&value)?,
                Err(_) => println!("{}", body),
            }
        }
    }

    Ok(())
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
