//! Configuration management for Helpline
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//!
//! All durations are expressed in milliseconds of *virtual* time. The
//! engine never sleeps; live sessions map virtual time onto the wall clock
//! using [`TimingConfig::speed`].

use crate::error::{HelplineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for Helpline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Timer delays used by the submission controllers and queue simulator
    #[serde(default)]
    pub timing: TimingConfig,
    /// Sampling bounds for the initial queue position and wait
    #[serde(default)]
    pub queue: QueueConfig,
    /// Per-session settings (display name default, seed, roster file)
    #[serde(default)]
    pub session: SessionConfig,
}

/// Timer configuration
///
/// Defaults mirror a one-minute simulated queue: six ticks ten seconds
/// apart, a one second settle delay after the queue drains, and a hard
/// deadline at sixty seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Delay between a valid submission and the submitted state
    #[serde(default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,

    /// Period of the queue decay tick
    #[serde(default = "default_queue_tick_ms")]
    pub queue_tick_ms: u64,

    /// Number of decay steps until the queue reaches zero
    #[serde(default = "default_queue_steps")]
    pub queue_steps: u32,

    /// Delay between the queue draining and the completion signal
    #[serde(default = "default_queue_settle_ms")]
    pub queue_settle_ms: u64,

    /// Hard cap after which the queue completes regardless of decay
    #[serde(default = "default_queue_deadline_ms")]
    pub queue_deadline_ms: u64,

    /// Delay between counselor assignment and the chat opening
    #[serde(default = "default_connect_delay_ms")]
    pub connect_delay_ms: u64,

    /// Wall-clock speed factor for live sessions (2.0 runs twice as fast)
    #[serde(default = "default_speed")]
    pub speed: f64,
}

fn default_submit_delay_ms() -> u64 {
    1_000
}

fn default_queue_tick_ms() -> u64 {
    10_000
}

fn default_queue_steps() -> u32 {
    6
}

fn default_queue_settle_ms() -> u64 {
    1_000
}

fn default_queue_deadline_ms() -> u64 {
    60_000
}

fn default_connect_delay_ms() -> u64 {
    2_000
}

fn default_speed() -> f64 {
    1.0
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: default_submit_delay_ms(),
            queue_tick_ms: default_queue_tick_ms(),
            queue_steps: default_queue_steps(),
            queue_settle_ms: default_queue_settle_ms(),
            queue_deadline_ms: default_queue_deadline_ms(),
            connect_delay_ms: default_connect_delay_ms(),
            speed: default_speed(),
        }
    }
}

impl TimingConfig {
    /// Submission delay as a [`Duration`]
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    /// Queue tick period as a [`Duration`]
    pub fn queue_tick(&self) -> Duration {
        Duration::from_millis(self.queue_tick_ms)
    }

    /// Settle delay as a [`Duration`]
    pub fn queue_settle(&self) -> Duration {
        Duration::from_millis(self.queue_settle_ms)
    }

    /// Queue deadline as a [`Duration`]
    pub fn queue_deadline(&self) -> Duration {
        Duration::from_millis(self.queue_deadline_ms)
    }

    /// Connect delay as a [`Duration`]
    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }
}

/// Queue sampling configuration
///
/// Both ranges are inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Smallest initial queue position
    #[serde(default = "default_min_position")]
    pub min_position: u32,

    /// Largest initial queue position
    #[serde(default = "default_max_position")]
    pub max_position: u32,

    /// Smallest initial wait estimate in minutes
    #[serde(default = "default_min_wait_minutes")]
    pub min_wait_minutes: u32,

    /// Largest initial wait estimate in minutes
    #[serde(default = "default_max_wait_minutes")]
    pub max_wait_minutes: u32,
}

fn default_min_position() -> u32 {
    2
}

fn default_max_position() -> u32 {
    4
}

fn default_min_wait_minutes() -> u32 {
    2
}

fn default_max_wait_minutes() -> u32 {
    10
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            min_position: default_min_position(),
            max_position: default_max_position(),
            min_wait_minutes: default_min_wait_minutes(),
            max_wait_minutes: default_max_wait_minutes(),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name used in the welcome message when the user gave none
    #[serde(default = "default_display_name")]
    pub default_name: String,

    /// Fixed RNG seed; `None` seeds from the operating system
    #[serde(default)]
    pub seed: Option<u64>,

    /// YAML roster replacing the built-in counselors, moods and tips
    #[serde(default)]
    pub roster_path: Option<String>,
}

fn default_display_name() -> String {
    "Anonym".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_name: default_display_name(),
            seed: None,
            roster_path: None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed command line, applied last
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| HelplineError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| HelplineError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn default_config() -> Self {
        Self {
            timing: TimingConfig::default(),
            queue: QueueConfig::default(),
            session: SessionConfig::default(),
        }
    }

    fn apply_env_vars(&mut self) {
        if let Ok(seed) = std::env::var("HELPLINE_SEED") {
            match seed.parse::<u64>() {
                Ok(value) => self.session.seed = Some(value),
                Err(_) => tracing::warn!("Ignoring invalid HELPLINE_SEED: {}", seed),
            }
        }

        if let Ok(speed) = std::env::var("HELPLINE_SPEED") {
            match speed.parse::<f64>() {
                Ok(value) => self.timing.speed = value,
                Err(_) => tracing::warn!("Ignoring invalid HELPLINE_SPEED: {}", speed),
            }
        }

        if let Ok(name) = std::env::var("HELPLINE_DEFAULT_NAME") {
            self.session.default_name = name;
        }

        if let Ok(roster) = std::env::var("HELPLINE_ROSTER") {
            self.session.roster_path = Some(roster);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if let Some(seed) = cli.seed {
            self.session.seed = Some(seed);
        }
        if let Some(speed) = cli.speed {
            self.timing.speed = speed;
        }
        if let Some(roster) = &cli.roster {
            self.session.roster_path = Some(roster.clone());
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `HelplineError::Config` describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        let timing = &self.timing;

        if timing.queue_steps == 0 {
            return Err(
                HelplineError::Config("timing.queue_steps must be greater than 0".to_string())
                    .into(),
            );
        }

        if timing.queue_tick_ms == 0 {
            return Err(HelplineError::Config(
                "timing.queue_tick_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if timing.queue_deadline_ms < timing.queue_tick_ms {
            return Err(HelplineError::Config(
                "timing.queue_deadline_ms must be at least one queue tick".to_string(),
            )
            .into());
        }

        if !timing.speed.is_finite() || timing.speed <= 0.0 {
            return Err(HelplineError::Config(
                "timing.speed must be a positive number".to_string(),
            )
            .into());
        }

        let queue = &self.queue;

        if queue.min_position == 0 {
            return Err(HelplineError::Config(
                "queue.min_position must be greater than 0".to_string(),
            )
            .into());
        }

        if queue.min_position > queue.max_position {
            return Err(HelplineError::Config(format!(
                "queue.min_position ({}) cannot exceed queue.max_position ({})",
                queue.min_position, queue.max_position
            ))
            .into());
        }

        if queue.min_wait_minutes > queue.max_wait_minutes {
            return Err(HelplineError::Config(format!(
                "queue.min_wait_minutes ({}) cannot exceed queue.max_wait_minutes ({})",
                queue.min_wait_minutes, queue.max_wait_minutes
            ))
            .into());
        }

        if self.session.default_name.trim().is_empty() {
            return Err(HelplineError::Config(
                "session.default_name cannot be empty".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
