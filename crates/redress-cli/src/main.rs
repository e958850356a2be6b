use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use redress_core::config::RedressConfig;
use redress_core::policy::resolve_policy;
use redress_core::types::Tier;

#[derive(Parser)]
#[command(
    name = "redress",
    about = "Autonomous customer-service agent for delivery delays",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, env = "REDRESS_CONFIG", default_value = "redress.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server and the background monitor loop
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the compensation policy a delay would resolve to
    Policy {
        /// Days the shipment is behind schedule
        #[arg(long)]
        days: i64,

        /// Customer tier: standard or vip
        #[arg(long, default_value = "standard")]
        tier: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let mut config = RedressConfig::load(&cli.config)?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            redress_server::serve(config).await
        }
        Commands::Policy { days, tier } => {
            let tier: Tier = tier.parse()?;
            let policy = resolve_policy(days, tier, &config.policy);
            println!("action:    {}", policy.action);
            println!("credit:    ${:.2}", policy.credit);
            println!(
                "threshold: ${:.2} (auto-approve refund)",
                policy.auto_approve_refund_threshold
            );
            Ok(())
        }
    }
}
