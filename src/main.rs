//! Helpline - chat queue and callback simulator CLI
//!
#![doc = "Helpline - chat queue and callback simulator CLI"]
#![doc = "Main entry point for the helpline application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use helpline::cli::{Cli, Commands};
use helpline::commands;
use helpline::config::Config;
use helpline::roster::Roster;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let roster = Roster::from_config(&config)?;

    // Execute command
    match cli.command {
        Commands::Chat { name, mood } => {
            tracing::info!("Starting interactive session");
            commands::chat::run_chat(config, roster, name, mood).await?;
            Ok(())
        }
        Commands::Simulate {
            message,
            name,
            json,
        } => {
            tracing::info!("Starting chat simulation");
            commands::simulate::run_simulation(config, roster, &message, name.as_deref(), json)?;
            Ok(())
        }
        Commands::Callback {
            phone,
            time,
            slot,
            name,
        } => {
            tracing::info!("Requesting callback");
            commands::callback::run_callback(
                config,
                roster,
                &phone,
                &time,
                slot.as_deref(),
                name.as_deref(),
            )?;
            Ok(())
        }
        Commands::Roster => {
            commands::roster::list_roster(&roster);
            Ok(())
        }
        Commands::Tip => {
            commands::roster::print_tip(config, roster);
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "helpline=debug"
    } else {
        "helpline=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
