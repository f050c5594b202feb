//! Contact form fields and submission state
//!
//! Both contact channels share one form: the nickname is used by the chat
//! and the callback request alike, the message belongs to the chat, and
//! the phone number and preferred time belong to the callback.

use crate::validation::{self, Field, FormErrors};
use serde::{Deserialize, Serialize};
use std::fmt;

/// When the user would like to be called
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferredTime {
    Asap,
    Today,
    Tomorrow,
    /// A concrete [`TimeSlot`] must also be chosen
    Specific,
}

impl PreferredTime {
    /// All options in display order
    pub const ALL: [PreferredTime; 4] = [Self::Asap, Self::Today, Self::Tomorrow, Self::Specific];

    /// Parse an option value
    ///
    /// # Examples
    ///
    /// ```
    /// use helpline::engine::forms::PreferredTime;
    ///
    /// assert_eq!(PreferredTime::parse_str("ASAP").unwrap(), PreferredTime::Asap);
    /// assert!(PreferredTime::parse_str("later").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "asap" => Ok(Self::Asap),
            "today" => Ok(Self::Today),
            "tomorrow" => Ok(Self::Tomorrow),
            "specific" => Ok(Self::Specific),
            other => Err(format!("Unknown preferred time: {}", other)),
        }
    }

    /// Option label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            Self::Asap => "Så hurtigt som muligt",
            Self::Today => "I løbet af i dag",
            Self::Tomorrow => "I morgen",
            Self::Specific => "På et bestemt tidspunkt",
        }
    }

    /// Whether a concrete time slot is required
    pub fn needs_slot(&self) -> bool {
        matches!(self, Self::Specific)
    }
}

impl fmt::Display for PreferredTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asap => write!(f, "asap"),
            Self::Today => write!(f, "today"),
            Self::Tomorrow => write!(f, "tomorrow"),
            Self::Specific => write!(f, "specific"),
        }
    }
}

/// Concrete callback window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "9-12")]
    Morning,
    #[serde(rename = "12-15")]
    Midday,
    #[serde(rename = "15-18")]
    Afternoon,
    #[serde(rename = "18-21")]
    Evening,
}

impl TimeSlot {
    /// All slots in display order
    pub const ALL: [TimeSlot; 4] = [Self::Morning, Self::Midday, Self::Afternoon, Self::Evening];

    /// Parse a slot value such as `"9-12"`
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim() {
            "9-12" => Ok(Self::Morning),
            "12-15" => Ok(Self::Midday),
            "15-18" => Ok(Self::Afternoon),
            "18-21" => Ok(Self::Evening),
            other => Err(format!("Unknown time slot: {}", other)),
        }
    }

    /// Slot label shown to the user
    pub fn label(&self) -> String {
        format!("Mellem {}", self)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Morning => write!(f, "9-12"),
            Self::Midday => write!(f, "12-15"),
            Self::Afternoon => write!(f, "15-18"),
            Self::Evening => write!(f, "18-21"),
        }
    }
}

/// Which contact channel a submission belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    Chat,
    Callback,
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat => write!(f, "chat"),
            Self::Callback => write!(f, "callback"),
        }
    }
}

/// Progress of the current submission
///
/// The kind travels with the state, so "submitted" without a kind cannot
/// be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "kind", rename_all = "lowercase")]
pub enum Submission {
    /// The user is filling in the form
    #[default]
    Editing,
    /// Validation passed; completion is pending
    Submitting(SubmissionKind),
    /// The request was accepted
    Submitted(SubmissionKind),
}

impl Submission {
    /// Kind of the active submission, if any
    pub fn kind(&self) -> Option<SubmissionKind> {
        match self {
            Self::Editing => None,
            Self::Submitting(kind) | Self::Submitted(kind) => Some(*kind),
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting(_))
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }
}

/// Outcome of a submit intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation passed and completion has been scheduled
    Accepted,
    /// Validation failed; the errors are also stored on the engine
    Rejected(FormErrors),
    /// Another submission is in progress or the engine was torn down
    Busy,
}

/// Shared contact form fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    /// Optional nickname
    pub name: String,
    /// What the user wants to talk about (chat)
    pub message: String,
    /// Formatted phone number (callback)
    pub phone: String,
    /// When to call (callback)
    pub preferred_time: Option<PreferredTime>,
    /// Concrete window when `preferred_time` is specific (callback)
    pub specific_time: Option<TimeSlot>,
}

impl ContactForm {
    /// Validate the fields the chat channel needs
    ///
    /// # Examples
    ///
    /// ```
    /// use helpline::engine::forms::ContactForm;
    /// use helpline::validation::Field;
    ///
    /// let mut form = ContactForm::default();
    /// form.message = "Hej".to_string();
    /// assert!(form.validate_chat().get(Field::Message).is_some());
    ///
    /// form.message = "Jeg har brug for at tale med nogen".to_string();
    /// assert!(form.validate_chat().is_empty());
    /// ```
    pub fn validate_chat(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        errors.set(
            Field::Message,
            validation::message_submission_error(&self.message),
        );
        errors.set(Field::Name, validation::name_submission_error(&self.name));
        errors
    }

    /// Validate the fields the callback channel needs
    pub fn validate_callback(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        errors.set(Field::Phone, validation::phone_submission_error(&self.phone));
        errors.set(
            Field::PreferredTime,
            validation::preferred_time_submission_error(
                self.preferred_time.is_some(),
                self.preferred_time.is_some_and(|time| time.needs_slot()),
                self.specific_time.is_some(),
            ),
        );
        errors.set(Field::Name, validation::name_submission_error(&self.name));
        errors
    }

    /// Nickname to greet the user with, or `fallback` when blank
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        let name = self.name.trim();
        if name.is_empty() {
            fallback
        } else {
            name
        }
    }

    /// Confirmation lines for an accepted callback request
    pub fn callback_confirmation(&self) -> Vec<String> {
        match (self.preferred_time, self.specific_time) {
            (Some(PreferredTime::Asap), _) => vec![
                "Vi ringer dig op hurtigst muligt".to_string(),
                "Der er typisk 5-15 minutters ventetid i øjeblikket".to_string(),
            ],
            (Some(PreferredTime::Today), _) => vec!["Vi ringer dig op i løbet af i dag".to_string()],
            (Some(PreferredTime::Tomorrow), _) => vec!["Vi ringer dig op i morgen".to_string()],
            (Some(PreferredTime::Specific), Some(slot)) => {
                vec![format!("Vi ringer dig op {}", slot)]
            }
            _ => Vec::new(),
        }
    }

    /// Clear the callback fields, keeping the nickname and message
    pub fn reset_callback(&mut self) {
        self.phone.clear();
        self.preferred_time = None;
        self.specific_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callback_form(phone: &str, time: Option<PreferredTime>, slot: Option<TimeSlot>) -> ContactForm {
        ContactForm {
            phone: phone.to_string(),
            preferred_time: time,
            specific_time: slot,
            ..ContactForm::default()
        }
    }

    #[test]
    fn test_preferred_time_parse_and_display() {
        for time in PreferredTime::ALL {
            assert_eq!(PreferredTime::parse_str(&time.to_string()).unwrap(), time);
        }
        assert!(PreferredTime::parse_str("").is_err());
        assert!(PreferredTime::Specific.needs_slot());
        assert!(!PreferredTime::Today.needs_slot());
        assert_eq!(PreferredTime::Asap.label(), "Så hurtigt som muligt");
    }

    #[test]
    fn test_time_slot_parse_and_display() {
        for slot in TimeSlot::ALL {
            assert_eq!(TimeSlot::parse_str(&slot.to_string()).unwrap(), slot);
        }
        assert_eq!(TimeSlot::Morning.label(), "Mellem 9-12");
        assert!(TimeSlot::parse_str("21-24").is_err());
        assert_eq!(serde_json::to_string(&TimeSlot::Evening).unwrap(), r#""18-21""#);
    }

    #[test]
    fn test_submission_kind_tracking() {
        assert_eq!(Submission::default(), Submission::Editing);
        assert_eq!(Submission::Editing.kind(), None);
        assert_eq!(
            Submission::Submitting(SubmissionKind::Chat).kind(),
            Some(SubmissionKind::Chat)
        );
        assert!(Submission::Submitted(SubmissionKind::Callback).is_submitted());
        assert!(!Submission::Submitted(SubmissionKind::Callback).is_submitting());
    }

    #[test]
    fn test_submission_serializes_with_kind() {
        let json = serde_json::to_value(Submission::Submitted(SubmissionKind::Callback)).unwrap();
        assert_eq!(json["status"], "submitted");
        assert_eq!(json["kind"], "callback");
    }

    #[test]
    fn test_validate_chat_requires_message() {
        let form = ContactForm::default();
        let errors = form.validate_chat();
        assert_eq!(
            errors.get(Field::Message),
            Some("Din besked skal være mindst 10 bogstaver lang")
        );
        assert_eq!(errors.get(Field::Name), None);
        assert_eq!(errors.get(Field::Phone), None);
    }

    #[test]
    fn test_validate_chat_checks_optional_name() {
        let form = ContactForm {
            name: "A".to_string(),
            message: "Jeg har det svært".to_string(),
            ..ContactForm::default()
        };
        let errors = form.validate_chat();
        assert_eq!(errors.len(), 1);
        assert!(errors.get(Field::Name).is_some());
    }

    #[test]
    fn test_validate_callback_specific_needs_slot() {
        let form = callback_form("12345678", Some(PreferredTime::Specific), None);
        let errors = form.validate_callback();
        assert_eq!(
            errors.get(Field::PreferredTime),
            Some("Vælg venligst et specifikt tidspunkt")
        );
        assert_eq!(errors.len(), 1);

        let form = callback_form("12345678", Some(PreferredTime::Specific), Some(TimeSlot::Morning));
        assert!(form.validate_callback().is_empty());
    }

    #[test]
    fn test_validate_callback_missing_fields() {
        let form = callback_form("1234", None, None);
        let errors = form.validate_callback();
        assert_eq!(
            errors.get(Field::Phone),
            Some("Indtast venligst et gyldigt telefonnummer (8 cifre)")
        );
        assert_eq!(
            errors.get(Field::PreferredTime),
            Some("Vælg venligst hvornår vi må ringe")
        );
        assert_eq!(errors.get(Field::Message), None);
    }

    #[test]
    fn test_display_name_falls_back_when_blank() {
        let mut form = ContactForm::default();
        assert_eq!(form.display_name("Anonym"), "Anonym");
        form.name = "   ".to_string();
        assert_eq!(form.display_name("Anonym"), "Anonym");
        form.name = " Ida ".to_string();
        assert_eq!(form.display_name("Anonym"), "Ida");
    }

    #[test]
    fn test_callback_confirmation_per_time() {
        let asap = callback_form("12345678", Some(PreferredTime::Asap), None);
        assert_eq!(asap.callback_confirmation().len(), 2);

        let tomorrow = callback_form("12345678", Some(PreferredTime::Tomorrow), None);
        assert_eq!(
            tomorrow.callback_confirmation(),
            vec!["Vi ringer dig op i morgen".to_string()]
        );

        let specific = callback_form("12345678", Some(PreferredTime::Specific), Some(TimeSlot::Evening));
        assert_eq!(
            specific.callback_confirmation(),
            vec!["Vi ringer dig op 18-21".to_string()]
        );
    }

    #[test]
    fn test_reset_callback_keeps_name_and_message() {
        let mut form = ContactForm {
            name: "Ida".to_string(),
            message: "Jeg har brug for hjælp".to_string(),
            ..callback_form("12 34 56 78", Some(PreferredTime::Specific), Some(TimeSlot::Midday))
        };
        form.reset_callback();
        assert_eq!(form.name, "Ida");
        assert_eq!(form.message, "Jeg har brug for hjælp");
        assert!(form.phone.is_empty());
        assert!(form.preferred_time.is_none());
        assert!(form.specific_time.is_none());
    }
}
