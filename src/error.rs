//! Error types for Helpline
//!
//! This module defines the error types used by the shell around the
//! simulation engine, using `thiserror` for ergonomic error handling.
//!
//! The engine itself never fails: form validation produces
//! [`FormErrors`](crate::validation::FormErrors) and user intents return
//! outcome enums. Only configuration, roster files and terminal I/O can
//! produce a [`HelplineError`].

use thiserror::Error;

/// Main error type for Helpline operations
#[derive(Error, Debug)]
pub enum HelplineError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Roster file errors (missing counselors, duplicate ids)
    #[error("Roster error: {0}")]
    Roster(String),

    /// A command-line or interactive value that does not name a known option
    #[error("Unknown {kind}: {value}")]
    UnknownValue {
        /// What kind of value was expected (mood, time slot, ...)
        kind: &'static str,
        /// The value that was supplied
        value: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Terminal line editor errors
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Result type alias for Helpline operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
