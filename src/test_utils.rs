//! Test utilities for Helpline
//!
//! This module provides common test utilities: seeded engines, config
//! files in temporary directories and assertion helpers.

use crate::config::Config;
use crate::engine::{Helpline, SubmitOutcome};
use crate::roster::Roster;
use std::path::PathBuf;
use tempfile::TempDir;

/// Message long enough to pass chat validation
pub const VALID_MESSAGE: &str = "Jeg har brug for at tale med nogen";

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: anyhow::Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Default configuration with a fixed seed
pub fn seeded_config(seed: u64) -> Config {
    let mut config = Config::default();
    config.session.seed = Some(seed);
    config
}

/// Engine over the built-in roster with a fixed seed
pub fn seeded_helpline(seed: u64) -> Helpline {
    Helpline::new(seeded_config(seed), Roster::builtin())
}

/// Fill in a valid chat message and submit it
///
/// # Panics
///
/// Panics if the submission is not accepted
pub fn submit_valid_chat(helpline: &mut Helpline) {
    helpline.set_message(VALID_MESSAGE);
    assert_eq!(helpline.submit_chat(), SubmitOutcome::Accepted);
}

/// YAML for a small two-counselor roster
pub fn test_roster_yaml() -> String {
    r#"
counselors:
  - id: 1
    name: Karen
    gender: female
    avatar: https://example.org/karen.svg
  - id: 2
    name: Jonas
    gender: male
    avatar: https://example.org/jonas.svg
tips:
  - Gå en tur i frisk luft.
"#
    .to_string()
}
