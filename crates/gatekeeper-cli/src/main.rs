//! Gatekeeper CLI - operator-facing entry points for the safety gateway

use std::path::PathBuf;

use clap::Parser;
use gatekeeper_core::{ControlTower, GatewayConfig};

#[derive(Parser)]
#[command(name = "gatekeeper")]
#[command(about = "Gatekeeper - policy-driven safety gateway for LLM responses")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run one evaluate_response call and print the Verdict as JSON
    Evaluate {
        /// Configuration file path
        #[arg(short, long, default_value = "gatekeeper.toml")]
        config: PathBuf,
        /// Text to evaluate
        text: String,
    },
    /// Load and validate config + policy without serving
    Check {
        #[arg(short, long, default_value = "gatekeeper.toml")]
        config: PathBuf,
    },
    /// Evaluate inputs piped on stdin (one per line), print final stats as JSON
    Stats {
        #[arg(short, long, default_value = "gatekeeper.toml")]
        config: PathBuf,
    },
}

fn load_config(path: &PathBuf) -> anyhow::Result<GatewayConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|source| gatekeeper_core::GatewayError::ConfigIo { path: path.display().to_string(), source })?;
    Ok(GatewayConfig::from_toml(&contents)?)
}

/// No concrete LLM provider is linked in: the provider transport itself is
/// an external collaborator (§1), so the CLI always starts Tier 3 with an
/// empty provider list. Gray-zone requests still route correctly; they just
/// settle at Tier 2 since `Adjudicator::is_available` reports false.
fn no_providers() -> Vec<Box<dyn gatekeeper_agent::Provider>> {
    Vec::new()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate { config, text } => {
            let config = load_config(&config)?;
            let tower = ControlTower::new(config, no_providers())?;
            let verdict = tower.evaluate_response(&text, None).await;
            println!("{}", serde_json::to_string_pretty(&verdict)?);
        }
        Commands::Check { config } => {
            let config = load_config(&config)?;
            ControlTower::new(config, no_providers())?;
            println!("config and policy are valid");
        }
        Commands::Stats { config } => {
            let config = load_config(&config)?;
            let tower = ControlTower::new(config, no_providers())?;

            let mut line = String::new();
            loop {
                line.clear();
                let read = std::io::stdin().read_line(&mut line)?;
                if read == 0 {
                    break;
                }
                let text = line.trim_end_matches(['\n', '\r']);
                if text.is_empty() {
                    continue;
                }
                tower.evaluate_response(text, None).await;
            }

            println!("{}", serde_json::to_string_pretty(&tower.get_stats())?);
        }
    }

    Ok(())
}
