//! Command-line interface definition for Helpline
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for live chat, simulation, callback requests and
//! roster inspection.

use clap::{Parser, Subcommand};

/// Helpline - chat queue and callback simulator
///
/// Walk through the contact flow of a youth counseling helpline: queue
/// for a chat with a counselor or request a callback.
#[derive(Parser, Debug, Clone)]
#[command(name = "helpline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Seed for queue, counselor and tip sampling
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Speed factor for live sessions (2.0 runs twice as fast)
    #[arg(long, global = true)]
    pub speed: Option<f64>,

    /// YAML roster replacing the built-in counselors, moods and tips
    #[arg(long, global = true)]
    pub roster: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Helpline
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive session in the terminal
    Chat {
        /// Nickname shown to the counselor (optional)
        #[arg(short, long)]
        name: Option<String>,

        /// Mood label to start with (see `helpline roster`)
        #[arg(long)]
        mood: Option<String>,
    },

    /// Run a chat submission on the virtual clock and print the timeline
    Simulate {
        /// Message describing what the user wants to talk about
        #[arg(short, long)]
        message: String,

        /// Nickname shown to the counselor (optional)
        #[arg(short, long)]
        name: Option<String>,

        /// Print the timeline and final state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Request a callback
    Callback {
        /// Phone number (8 digits)
        #[arg(short, long)]
        phone: String,

        /// When to call: asap, today, tomorrow or specific
        #[arg(short, long)]
        time: String,

        /// Time slot when `--time specific` (9-12, 12-15, 15-18, 18-21)
        #[arg(short, long)]
        slot: Option<String>,

        /// Nickname (optional)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List counselors and moods
    Roster,

    /// Print a random tip
    Tip,
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["helpline", "chat"]).unwrap();
        assert_eq!(cli.config, Some("config/config.yaml".to_string()));
        assert!(!cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Chat {
                name: None,
                mood: None
            }
        ));
    }

    #[test]
    fn test_cli_parse_chat_with_name_and_mood() {
        let cli =
            Cli::try_parse_from(["helpline", "chat", "--name", "Ida", "--mood", "Glad"]).unwrap();
        if let Commands::Chat { name, mood } = cli.command {
            assert_eq!(name, Some("Ida".to_string()));
            assert_eq!(mood, Some("Glad".to_string()));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_simulate_requires_message() {
        assert!(Cli::try_parse_from(["helpline", "simulate"]).is_err());

        let cli = Cli::try_parse_from([
            "helpline",
            "simulate",
            "--message",
            "Jeg har brug for hjælp",
            "--json",
        ])
        .unwrap();
        if let Commands::Simulate {
            message,
            name,
            json,
        } = cli.command
        {
            assert_eq!(message, "Jeg har brug for hjælp");
            assert_eq!(name, None);
            assert!(json);
        } else {
            panic!("Expected Simulate command");
        }
    }

    #[test]
    fn test_cli_parse_callback() {
        let cli = Cli::try_parse_from([
            "helpline", "callback", "--phone", "12345678", "--time", "specific", "--slot", "9-12",
        ])
        .unwrap();
        if let Commands::Callback {
            phone,
            time,
            slot,
            name,
        } = cli.command
        {
            assert_eq!(phone, "12345678");
            assert_eq!(time, "specific");
            assert_eq!(slot, Some("9-12".to_string()));
            assert_eq!(name, None);
        } else {
            panic!("Expected Callback command");
        }
    }

    #[test]
    fn test_cli_global_overrides_after_subcommand() {
        let cli = Cli::try_parse_from(["helpline", "tip", "--seed", "3", "--speed", "10"]).unwrap();
        assert_eq!(cli.seed, Some(3));
        assert_eq!(cli.speed, Some(10.0));
        assert!(matches!(cli.command, Commands::Tip));
    }

    #[test]
    fn test_cli_parse_roster_with_verbose() {
        let cli = Cli::try_parse_from(["helpline", "-v", "roster"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Roster));
    }
}
