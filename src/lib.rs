//! Helpline - chat queue and callback simulator library
//!
//! This library simulates the contact flow of a youth counseling helpline:
//! a chat request waits in a fabricated queue before a counselor joins,
//! and a callback request is confirmed for a chosen time.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `engine`: The `Helpline` state machine, queue simulation, chat session
//!   and message history
//! - `scheduler`: Virtual-clock timer queue driving every delayed action
//! - `validation`: Phone formatting and per-field form validation
//! - `roster`: Counselors, moods and tips
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Handlers behind the CLI subcommands
//!
//! # Example
//!
//! ```
//! use helpline::{ChatState, Config, Helpline, Roster};
//!
//! let config = Config::default();
//! config.validate().unwrap();
//!
//! let mut helpline = Helpline::new(config, Roster::builtin());
//! helpline.set_message("Jeg har brug for at tale med nogen");
//! helpline.submit_chat();
//! helpline.run_until_idle();
//! assert_eq!(helpline.chat_state(), ChatState::Chatting);
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod roster;
pub mod scheduler;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use engine::{ChatState, Helpline, SubmitOutcome};
pub use error::{HelplineError, Result};
pub use roster::Roster;

#[cfg(test)]
pub mod test_utils;
