//! Static roster data: counselors, moods and tips
//!
//! The roster is read-only input to the engine. A built-in roster ships with
//! the crate; a YAML file with the same shape can replace it.
//!
//! # Example roster file
//!
//! ```yaml
//! counselors:
//!   - id: 1
//!     name: Maria
//!     gender: female
//!     avatar: https://example.org/maria.svg
//! moods:
//!   - icon: "😊"
//!     label: Glad
//!     description: Du føler dig positiv og optimistisk
//!     color: yellow
//! tips:
//!   - Husk at drikke vand.
//! ```

use crate::error::{HelplineError, Result};
use anyhow::Context;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Tip shown when the roster has none to offer
pub const DEFAULT_TIP: &str = "Husk at være god ved dig selv i dag.";

const AVATAR_BASE: &str = "https://api.dicebear.com/9.x/big-ears/svg";

/// Counselor gender tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// A counselor identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counselor {
    pub id: u32,
    pub name: String,
    pub gender: Gender,
    /// Avatar image URI
    pub avatar: String,
}

/// A mood the user can pick to describe how they feel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mood {
    pub icon: String,
    pub label: String,
    pub description: String,
    /// Terminal color name the label is shown in
    #[serde(default = "default_mood_color")]
    pub color: String,
}

fn default_mood_color() -> String {
    "white".to_string()
}

/// Counselors, moods and tips available to a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    pub counselors: Vec<Counselor>,
    #[serde(default)]
    pub moods: Vec<Mood>,
    #[serde(default)]
    pub tips: Vec<String>,
}

impl Roster {
    /// The roster bundled with the crate
    ///
    /// # Examples
    ///
    /// ```
    /// use helpline::roster::Roster;
    ///
    /// let roster = Roster::builtin();
    /// assert_eq!(roster.counselors.len(), 10);
    /// assert!(roster.find_mood("glad").is_some());
    /// ```
    pub fn builtin() -> Self {
        let counselors = [
            (1, "Maria", Gender::Female, "seed=Aidan&backgroundColor=b6e3f4"),
            (2, "Sophie", Gender::Female, "seed=Oliver&backgroundColor=c0aede"),
            (3, "Anna", Gender::Female, "seed=Jack&backgroundColor=d1d4f9"),
            (4, "Laura", Gender::Female, "seed=Martin&backgroundColor=b6e3f4"),
            (5, "Emma", Gender::Female, "seed=Emma&backgroundColor=c0aede"),
            (6, "Thomas", Gender::Male, "seed=Thomas&backgroundColor=b6e3f4"),
            (7, "Mikkel", Gender::Male, "seed=Mikkel&backgroundColor=c0aede"),
            (8, "Omar", Gender::Male, "seed=Anders&backgroundColor=d1d4f9"),
            (9, "Alexander", Gender::Male, "seed=Alexander&backgroundColor=b6e3f4"),
            (10, "Martin", Gender::Male, "seed=Laura&backgroundColor=c0aede"),
        ]
        .into_iter()
        .map(|(id, name, gender, query)| Counselor {
            id,
            name: name.to_string(),
            gender,
            avatar: format!("{}?{}", AVATAR_BASE, query),
        })
        .collect();

        let moods = [
            ("😊", "Glad", "Du føler dig positiv og optimistisk", "yellow"),
            ("😢", "Ked af det", "Du føler dig trist eller nedtrykt", "red"),
            (
                "😕",
                "Forvirret",
                "Du føler dig usikker eller har brug for vejledning",
                "magenta",
            ),
            (
                "😔",
                "Ensom",
                "Du føler dig alene eller savner nogen at tale med",
                "bright red",
            ),
            ("😌", "Rolig", "Du føler dig afslappet og fredfyldt", "blue"),
            (
                "😫",
                "Overvældet",
                "Du føler dig stresset eller overbelastet",
                "bright black",
            ),
            ("😰", "Nervøs", "Du føler dig ængstelig eller bekymret", "bright yellow"),
        ]
        .into_iter()
        .map(|(icon, label, description, color)| Mood {
            icon: icon.to_string(),
            label: label.to_string(),
            description: description.to_string(),
            color: color.to_string(),
        })
        .collect();

        let tips = [
            "Husk, at det er okay at have det svært nogle gange. At tale om det med nogen, du stoler på, kan hjælpe dig til at få det bedre.",
            "Tag en dyb indånding og tæl til 10, når du føler dig stresset. Det kan hjælpe dig med at falde til ro.",
            "Prøv at gøre noget venligt for en anden i dag. Det kan være et smil eller en kompliment!",
            "Husk at drikke vand og spise regelmæssigt. Det hjælper din krop og dit humør.",
            "Bevægelse er godt for både krop og sind. Prøv at danse til din yndlingssang!",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        Self {
            counselors,
            moods,
            tips,
        }
    }

    /// Load a roster from a YAML file and validate it
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it
    /// fails [`Roster::validate`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(HelplineError::from)
            .with_context(|| format!("Failed to read roster file {}", path.display()))?;
        let roster: Self = serde_yaml::from_str(&contents)
            .map_err(HelplineError::from)
            .with_context(|| format!("Failed to parse roster file {}", path.display()))?;
        roster.validate()?;
        tracing::info!(
            counselors = roster.counselors.len(),
            moods = roster.moods.len(),
            tips = roster.tips.len(),
            "Loaded roster from {}",
            path.display()
        );
        Ok(roster)
    }

    /// Resolve the roster for a configuration: the file when one is set,
    /// the built-in roster otherwise
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        match &config.session.roster_path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    /// Check that the roster can staff a session
    ///
    /// # Errors
    ///
    /// Returns `HelplineError::Roster` when there are no counselors or two
    /// counselors share an id.
    pub fn validate(&self) -> Result<()> {
        if self.counselors.is_empty() {
            return Err(HelplineError::Roster("roster has no counselors".to_string()).into());
        }

        let mut seen = HashSet::new();
        for counselor in &self.counselors {
            if !seen.insert(counselor.id) {
                return Err(HelplineError::Roster(format!(
                    "duplicate counselor id {}",
                    counselor.id
                ))
                .into());
            }
        }

        Ok(())
    }

    /// Pick a counselor uniformly at random
    pub fn pick_counselor<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Counselor> {
        self.counselors.choose(rng)
    }

    /// Pick a tip uniformly at random, falling back to [`DEFAULT_TIP`]
    pub fn pick_tip<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        match self.tips.choose(rng) {
            Some(tip) => tip.as_str(),
            None => {
                tracing::warn!("Roster has no tips, using default tip");
                DEFAULT_TIP
            }
        }
    }

    /// Find a mood by label, ignoring case
    pub fn find_mood(&self, label: &str) -> Option<&Mood> {
        let wanted = label.trim().to_lowercase();
        self.moods
            .iter()
            .find(|mood| mood.label.to_lowercase() == wanted)
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::builtin()
    }
}
