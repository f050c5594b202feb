//! Field validation and phone number formatting
//!
//! Validators come in two flavours. The `*_input_error` functions run on
//! every edit and give advisory feedback; the `*_submission_error`
//! functions run when a form is submitted and are authoritative. The two
//! sets intentionally phrase some errors differently.
//!
//! Lengths are counted in characters, not bytes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Minimum nickname length when a nickname is given
pub const NAME_MIN_CHARS: usize = 2;
/// Maximum nickname length
pub const NAME_MAX_CHARS: usize = 50;
/// Minimum message length
pub const MESSAGE_MIN_CHARS: usize = 10;
/// Maximum message length
pub const MESSAGE_MAX_CHARS: usize = 500;
/// Number of digits in a valid phone number
pub const PHONE_DIGITS: usize = 8;
/// Maximum length of a formatted phone number (`XX XX XX XX`)
pub const PHONE_MAX_FORMATTED_CHARS: usize = 11;

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{8}$").expect("static phone pattern is valid"))
}

fn phone_input_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9\s]*$").expect("static phone input pattern is valid"))
}

/// A validated form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    Message,
    Phone,
    PreferredTime,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Message => write!(f, "message"),
            Self::Phone => write!(f, "phone"),
            Self::PreferredTime => write!(f, "preferredTime"),
        }
    }
}

/// Per-field error messages
///
/// A field without an entry is currently valid. Setting an error for a
/// field replaces any previous error for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<Field, String>);

impl FormErrors {
    /// Create an empty error set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the error for a field
    ///
    /// # Examples
    ///
    /// ```
    /// use helpline::validation::{Field, FormErrors};
    ///
    /// let mut errors = FormErrors::new();
    /// errors.set(Field::Phone, Some("Telefonnummeret skal være 8 cifre"));
    /// assert!(errors.get(Field::Phone).is_some());
    ///
    /// errors.set(Field::Phone, None);
    /// assert!(errors.is_empty());
    /// ```
    pub fn set(&mut self, field: Field, error: Option<&str>) {
        match error {
            Some(message) => {
                self.0.insert(field, message.to_string());
            }
            None => {
                self.0.remove(&field);
            }
        }
    }

    /// Error for a field, if any
    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// True when no field has an error
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with an error
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Remove all errors
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterate over fields with errors in field order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

/// Format a phone number as `XX XX XX XX`
///
/// All non-digit characters are dropped and at most eight digits are kept.
/// The function never fails.
///
/// # Examples
///
/// ```
/// use helpline::validation::format_phone_number;
///
/// assert_eq!(format_phone_number("12345678"), "12 34 56 78");
/// assert_eq!(format_phone_number("+45 123"), "45 12 3");
/// assert_eq!(format_phone_number("1234567890"), "12 34 56 78");
/// ```
pub fn format_phone_number(value: &str) -> String {
    let digits: Vec<char> = value
        .chars()
        .filter(char::is_ascii_digit)
        .take(PHONE_DIGITS)
        .collect();

    let mut formatted = String::with_capacity(PHONE_MAX_FORMATTED_CHARS);
    for (index, pair) in digits.chunks(2).enumerate() {
        if index > 0 {
            formatted.push(' ');
        }
        formatted.extend(pair);
    }
    formatted
}

/// Check that a phone number has exactly eight digits once whitespace is
/// removed
///
/// # Examples
///
/// ```
/// use helpline::validation::validate_phone;
///
/// assert!(validate_phone("12 34 56 78"));
/// assert!(!validate_phone("1234567"));
/// assert!(!validate_phone("12-34-56-78"));
/// ```
pub fn validate_phone(phone: &str) -> bool {
    let cleaned: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    phone_pattern().is_match(&cleaned)
}

/// True when an edit of the phone field contains only digits and whitespace
pub fn is_phone_input(input: &str) -> bool {
    phone_input_pattern().is_match(input)
}

/// Advisory error while editing the phone field
pub fn phone_input_error(formatted: &str) -> Option<&'static str> {
    let digits = formatted.chars().filter(|c| !c.is_whitespace()).count();
    if digits == PHONE_DIGITS || formatted.is_empty() {
        None
    } else {
        Some("Telefonnummeret skal være 8 cifre")
    }
}

/// Advisory error while editing the nickname field
pub fn name_input_error(value: &str) -> Option<&'static str> {
    let length = value.chars().count();
    if length > 0 && length < NAME_MIN_CHARS {
        Some("Dit navn skal være mindst 2 bogstaver langt")
    } else if length > NAME_MAX_CHARS {
        Some("Dit navn må ikke være længere end 50 bogstaver")
    } else {
        None
    }
}

/// Advisory error while editing the message field
///
/// An empty message is not flagged while typing; submission requires one.
pub fn message_input_error(value: &str) -> Option<&'static str> {
    let length = value.chars().count();
    if length == 0 {
        None
    } else {
        message_length_error(length)
    }
}

/// Advisory error while choosing a preferred callback time
pub fn preferred_time_input_error(selected: bool) -> Option<&'static str> {
    if selected {
        None
    } else {
        Some("Vælg venligst et tidspunkt")
    }
}

/// Authoritative nickname error on submission
///
/// The nickname is optional, so an empty value is valid.
pub fn name_submission_error(value: &str) -> Option<&'static str> {
    let length = value.chars().count();
    if length > 0 && length < NAME_MIN_CHARS {
        Some("Hvis du vælger et kaldenavn, skal det være mindst 2 bogstaver")
    } else if length > NAME_MAX_CHARS {
        Some("Kaldenavnet må ikke være længere end 50 bogstaver")
    } else {
        None
    }
}

/// Authoritative message error on submission
pub fn message_submission_error(value: &str) -> Option<&'static str> {
    message_length_error(value.chars().count())
}

/// Authoritative phone error on submission
pub fn phone_submission_error(phone: &str) -> Option<&'static str> {
    if validate_phone(phone) {
        None
    } else {
        Some("Indtast venligst et gyldigt telefonnummer (8 cifre)")
    }
}

/// Authoritative preferred-time error on submission
///
/// # Arguments
///
/// * `selected` - Whether a preferred time was chosen at all
/// * `needs_slot` - Whether the chosen time requires a concrete slot
/// * `has_slot` - Whether a slot was chosen
pub fn preferred_time_submission_error(
    selected: bool,
    needs_slot: bool,
    has_slot: bool,
) -> Option<&'static str> {
    if !selected {
        Some("Vælg venligst hvornår vi må ringe")
    } else if needs_slot && !has_slot {
        Some("Vælg venligst et specifikt tidspunkt")
    } else {
        None
    }
}

fn message_length_error(length: usize) -> Option<&'static str> {
    if length < MESSAGE_MIN_CHARS {
        Some("Din besked skal være mindst 10 bogstaver lang")
    } else if length > MESSAGE_MAX_CHARS {
        Some("Din besked må ikke være længere end 500 bogstaver")
    } else {
        None
    }
}
