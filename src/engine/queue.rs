//! Queue decay simulation
//!
//! The simulator fabricates a shrinking queue: an initial position and
//! wait estimate are reduced in equal steps until both reach zero. It holds
//! no timers itself; the engine calls [`QueueSimulator::tick`] from its
//! periodic queue timer.
//!
//! The running values are fractional (`initial * remaining / steps`) and
//! the displayed values are their ceilings. Ceiling display can show the
//! same integer on two consecutive ticks, e.g. a queue of 2 over 6 steps
//! shows 2, 2, 1, 1, 1, 0.
//!
//! The arithmetic is done on integers so the displayed values are exact:
//! `ceil(initial * remaining / steps)`.

use crate::config::QueueConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Initial queue parameters sampled when a chat request is submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueParams {
    /// People ahead in the queue
    pub position: u32,
    /// Estimated wait in minutes
    pub wait_minutes: u32,
}

impl QueueParams {
    /// Sample position and wait uniformly from the configured inclusive
    /// ranges
    ///
    /// Bounds given in the wrong order are swapped, so an unvalidated
    /// configuration still samples from the range it describes.
    ///
    /// # Examples
    ///
    /// ```
    /// use helpline::config::QueueConfig;
    /// use helpline::engine::queue::QueueParams;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let params = QueueParams::sample(&QueueConfig::default(), &mut StdRng::seed_from_u64(1));
    /// assert!((2..=4).contains(&params.position));
    /// assert!((2..=10).contains(&params.wait_minutes));
    /// ```
    pub fn sample<R: Rng + ?Sized>(config: &QueueConfig, rng: &mut R) -> Self {
        Self {
            position: sample_between(rng, config.min_position, config.max_position),
            wait_minutes: sample_between(rng, config.min_wait_minutes, config.max_wait_minutes),
        }
    }
}

fn sample_between<R: Rng + ?Sized>(rng: &mut R, a: u32, b: u32) -> u32 {
    rng.random_range(a.min(b)..=a.max(b))
}

/// What the user sees while waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    pub position: u32,
    pub wait_minutes: u32,
}

impl QueueStatus {
    /// Wait estimate with Danish pluralisation ("1 minut", "3 minutter")
    ///
    /// # Examples
    ///
    /// ```
    /// use helpline::engine::queue::QueueStatus;
    ///
    /// let status = QueueStatus { position: 1, wait_minutes: 1 };
    /// assert_eq!(status.wait_label(), "1 minut");
    /// assert_eq!(status.position_label(), "1 person");
    /// ```
    pub fn wait_label(&self) -> String {
        let unit = if self.wait_minutes == 1 {
            "minut"
        } else {
            "minutter"
        };
        format!("{} {}", self.wait_minutes, unit)
    }

    /// Position with Danish pluralisation ("1 person", "3 personer")
    pub fn position_label(&self) -> String {
        let unit = if self.position == 1 {
            "person"
        } else {
            "personer"
        };
        format!("{} {}", self.position, unit)
    }

    /// One-line queue headline
    pub fn headline(&self) -> String {
        if self.position > 0 {
            format!("Der er {} foran dig i køen", self.position_label())
        } else {
            "Det er snart din tur!".to_string()
        }
    }

    /// True once nobody is ahead in the queue
    pub fn is_front(&self) -> bool {
        self.position == 0
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_front() {
            write!(f, "{}", self.headline())
        } else {
            write!(
                f,
                "{} · Estimeret ventetid: {}",
                self.headline(),
                self.wait_label()
            )
        }
    }
}

/// Linear decay of a queue position and wait estimate
#[derive(Debug, Clone)]
pub struct QueueSimulator {
    initial: QueueParams,
    steps: u32,
    remaining_steps: u32,
}

impl QueueSimulator {
    /// Create a simulator that drains `initial` in `steps` ticks
    ///
    /// `steps` is clamped to at least one.
    pub fn new(initial: QueueParams, steps: u32) -> Self {
        let steps = steps.max(1);
        Self {
            initial,
            steps,
            remaining_steps: steps,
        }
    }

    /// Parameters the simulator started from
    pub fn initial(&self) -> QueueParams {
        self.initial
    }

    /// Ticks applied so far
    pub fn ticks(&self) -> u32 {
        self.steps - self.remaining_steps
    }

    /// Apply one decay step and return the new displayed status
    ///
    /// Ticking a drained queue leaves it at zero.
    pub fn tick(&mut self) -> QueueStatus {
        self.remaining_steps = self.remaining_steps.saturating_sub(1);
        let status = self.status();
        tracing::debug!(
            tick = self.ticks(),
            position = status.position,
            wait_minutes = status.wait_minutes,
            running_position = self.running_position(),
            "Queue decayed"
        );
        status
    }

    /// Displayed status: ceilings of the running values
    pub fn status(&self) -> QueueStatus {
        QueueStatus {
            position: self.ceil_share(self.initial.position),
            wait_minutes: self.ceil_share(self.initial.wait_minutes),
        }
    }

    /// Fractional position before rounding
    pub fn running_position(&self) -> f64 {
        f64::from(self.initial.position) * f64::from(self.remaining_steps) / f64::from(self.steps)
    }

    /// Fractional wait before rounding
    pub fn running_wait_minutes(&self) -> f64 {
        f64::from(self.initial.wait_minutes) * f64::from(self.remaining_steps)
            / f64::from(self.steps)
    }

    /// True once the running position reached zero
    pub fn is_drained(&self) -> bool {
        self.remaining_steps == 0
    }

    fn ceil_share(&self, initial: u32) -> u32 {
        let scaled = u64::from(initial) * u64::from(self.remaining_steps);
        // initial * remaining / steps <= initial, so the quotient fits in u32.
        scaled.div_ceil(u64::from(self.steps)) as u32
    }
}
