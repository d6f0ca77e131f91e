//! # Core Type Definitions
//!
//! This module contains all core types for the Capes character catalogue:
//! - Record identifiers (`CharacterId`)
//! - Value types (`Universe`, `Decimal2`)
//! - The stored record (`CharacterAttrs`, `Character`)
//! - Error types (`FieldErrors`, `CatalogueError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` where they are used as `BTreeMap` keys

use crate::primitives::{POWER_TIERS, UNKNOWN_POWER_TIER};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier assigned by the store when a character is created.
/// Never reused and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub u64);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CharacterId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

// =============================================================================
// UNIVERSE
// =============================================================================

/// The universe a character belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Universe {
    #[default]
    Marvel,
    #[serde(rename = "DC")]
    Dc,
    Custom,
    Other,
}

impl Universe {
    /// Every universe, in declaration order.
    pub const ALL: [Universe; 4] = [Self::Marvel, Self::Dc, Self::Custom, Self::Other];

    /// The canonical spelling used on the wire and in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Marvel => "Marvel",
            Self::Dc => "DC",
            Self::Custom => "Custom",
            Self::Other => "Other",
        }
    }

    /// Case-insensitive lookup (`"dc"`, `"Dc"` and `"DC"` are all `Dc`).
    #[must_use]
    pub fn parse_ci(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|u| u.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact-spelling parse. Use [`Universe::parse_ci`] for lenient matching.
impl FromStr for Universe {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|u| u.as_str() == s)
            .ok_or(())
    }
}

// =============================================================================
// DECIMAL2
// =============================================================================

/// Fixed-point decimal with two fractional digits, stored as hundredths.
///
/// `Decimal2(17550)` is `175.50`. The text form always carries exactly
/// two fractional digits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Decimal2(pub i64);

/// Why a decimal string was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalParseError {
    /// Not a plain decimal number.
    Invalid,
    /// More than two digits after the decimal point.
    TooManyDecimalPlaces,
}

impl Decimal2 {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    /// Whole units, e.g. `from_units(7)` is `7.00`.
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units.saturating_mul(100))
    }

    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    /// Number of digits in the integer part (zero for values below 1).
    #[must_use]
    pub fn whole_digits(self) -> u32 {
        let whole = self.0.unsigned_abs() / 100;
        if whole == 0 { 0 } else { whole.ilog10() + 1 }
    }

    /// Total significant digits as counted by a `max_digits` constraint:
    /// whole digits plus the two fractional places.
    #[must_use]
    pub fn total_digits(self) -> u32 {
        self.whole_digits() + 2
    }
}

impl fmt::Display for Decimal2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Decimal2 {
    type Err = DecimalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(DecimalParseError::Invalid);
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(DecimalParseError::Invalid);
        }

        // Trailing zeros beyond the second place carry no value ("1.500").
        let frac = frac.trim_end_matches('0');
        if frac.len() > 2 {
            return Err(DecimalParseError::TooManyDecimalPlaces);
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| DecimalParseError::Invalid)?
        };
        let frac_value: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| DecimalParseError::Invalid)? * 10,
            _ => frac.parse().map_err(|_| DecimalParseError::Invalid)?,
        };

        let hundredths = whole_value
            .checked_mul(100)
            .and_then(|v| v.checked_add(frac_value))
            .ok_or(DecimalParseError::Invalid)?;

        Ok(Self(if negative { -hundredths } else { hundredths }))
    }
}

// =============================================================================
// CHARACTER
// =============================================================================

/// The writable attributes of a character.
///
/// Everything a caller may set. Identity and timestamps live on
/// [`Character`] and are owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterAttrs {
    pub name: String,
    pub real_name: Option<String>,
    pub alias: Option<String>,
    pub age: Option<u32>,
    pub height: Option<Decimal2>,
    pub weight: Option<Decimal2>,
    pub powers: Option<String>,
    pub power_level: u8,
    pub origin_story: Option<String>,
    pub universe: Universe,
    pub is_active: bool,
    pub is_villain: bool,
}

impl CharacterAttrs {
    /// Attributes for a new character with every other field at its default.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            real_name: None,
            alias: None,
            age: None,
            height: None,
            weight: None,
            powers: None,
            power_level: crate::primitives::DEFAULT_POWER_LEVEL,
            origin_story: None,
            universe: Universe::default(),
            is_active: true,
            is_villain: false,
        }
    }
}

/// A stored character record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub attrs: CharacterAttrs,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    /// `"{name} ({alias})"` when an alias is set, otherwise the name.
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name(&self.attrs.name, self.attrs.alias.as_deref())
    }

    /// Tier label for the character's power level.
    #[must_use]
    pub fn power_description(&self) -> &'static str {
        power_description(self.attrs.power_level)
    }
}

/// Build a display name from a name and an optional alias.
///
/// An empty alias counts as absent.
#[must_use]
pub fn display_name(name: &str, alias: Option<&str>) -> String {
    match alias {
        Some(alias) if !alias.is_empty() => format!("{} ({})", name, alias),
        _ => name.to_string(),
    }
}

/// Tier label for a power level; levels outside the table are "Unknown".
#[must_use]
pub fn power_description(level: u8) -> &'static str {
    POWER_TIERS
        .iter()
        .find(|(tier, _)| *tier == level)
        .map(|(_, label)| *label)
        .unwrap_or(UNKNOWN_POWER_TIER)
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Field-level validation messages, keyed by field (or parameter) name.
///
/// Every failing field is reported, not just the first one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding one message for one field.
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Iterate fields in deterministic (sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<(), CatalogueError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CatalogueError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Error types for catalogue operations.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// One or more fields or parameters failed validation. Nothing was written.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// The referenced character does not exist.
    #[error("Character not found: {0}")]
    NotFound(CharacterId),

    /// A record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The underlying store failed.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl CatalogueError {
    /// Shorthand for a single-field validation failure.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_parses_and_formats() {
        assert_eq!("175.5".parse::<Decimal2>(), Ok(Decimal2(17550)));
        assert_eq!("70".parse::<Decimal2>(), Ok(Decimal2(7000)));
        assert_eq!(".25".parse::<Decimal2>(), Ok(Decimal2(25)));
        assert_eq!("-3.10".parse::<Decimal2>(), Ok(Decimal2(-310)));
        assert_eq!("1.500".parse::<Decimal2>(), Ok(Decimal2(150)));
        assert_eq!(Decimal2(17550).to_string(), "175.50");
        assert_eq!(Decimal2(5).to_string(), "0.05");
        assert_eq!(Decimal2(-310).to_string(), "-3.10");
    }

    #[test]
    fn decimal_rejects_garbage_and_precision() {
        assert_eq!("abc".parse::<Decimal2>(), Err(DecimalParseError::Invalid));
        assert_eq!("".parse::<Decimal2>(), Err(DecimalParseError::Invalid));
        assert_eq!(".".parse::<Decimal2>(), Err(DecimalParseError::Invalid));
        assert_eq!("1e3".parse::<Decimal2>(), Err(DecimalParseError::Invalid));
        assert_eq!(
            "1.234".parse::<Decimal2>(),
            Err(DecimalParseError::TooManyDecimalPlaces)
        );
    }

    #[test]
    fn decimal_digit_counts() {
        assert_eq!(Decimal2(17550).total_digits(), 5);
        assert_eq!(Decimal2(99_999).total_digits(), 5);
        assert_eq!(Decimal2(100_000).total_digits(), 6);
        assert_eq!(Decimal2(50).total_digits(), 2);
    }

    #[test]
    fn universe_parsing() {
        assert_eq!("DC".parse::<Universe>(), Ok(Universe::Dc));
        assert!("dc".parse::<Universe>().is_err());
        assert_eq!(Universe::parse_ci("dc"), Some(Universe::Dc));
        assert_eq!(Universe::parse_ci(" marvel "), Some(Universe::Marvel));
        assert_eq!(Universe::parse_ci("Image"), None);
    }

    #[test]
    fn universe_serializes_with_canonical_spelling() {
        let json = serde_json::to_string(&Universe::Dc).expect("serialize");
        assert_eq!(json, "\"DC\"");
    }

    #[test]
    fn power_description_table() {
        assert_eq!(power_description(1), "Beginner");
        assert_eq!(power_description(5), "Expert");
        assert_eq!(power_description(7), "Elite");
        assert_eq!(power_description(10), "Godlike");
        assert_eq!(power_description(0), "Unknown");
        assert_eq!(power_description(11), "Unknown");
    }

    #[test]
    fn display_name_with_and_without_alias() {
        assert_eq!(display_name("Spider-Man", Some("Spidey")), "Spider-Man (Spidey)");
        assert_eq!(display_name("Spider-Man", None), "Spider-Man");
        assert_eq!(display_name("Spider-Man", Some("")), "Spider-Man");
    }

    #[test]
    fn field_errors_accumulate_in_order() {
        let mut errors = FieldErrors::new();
        errors.add("power_level", "too high");
        errors.add("age", "too old");
        errors.add("age", "still too old");

        assert_eq!(errors.get("age").map(<[String]>::len), Some(2));
        let fields: Vec<_> = errors.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["age", "power_level"]);
        assert_eq!(
            errors.to_string(),
            "age: too old; age: still too old; power_level: too high"
        );
        assert!(errors.into_result().is_err());
        assert!(FieldErrors::new().into_result().is_ok());
    }
}
