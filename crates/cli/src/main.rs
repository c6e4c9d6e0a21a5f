//! `ruleflow` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve` — start the API server.
//! - `demo`  — run the estimate-approval demo workflow.

mod demo;

use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "ruleflow",
    about = "Conditional workflow execution engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
    },
    /// Run the estimate-approval demo workflow and print its trace.
    Demo {
        /// Estimate amount to evaluate; both canonical examples run when omitted.
        #[arg(long)]
        amount: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => {
            info!("Starting API server on {bind}");
            api::serve(&bind).await?;
        }
        Command::Demo { amount } => match amount {
            Some(amount) => demo::run(amount).await?,
            None => {
                demo::run(500.00).await?;
                demo::run(1000.00).await?;
            }
        },
    }

    Ok(())
}
