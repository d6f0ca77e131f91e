//! # View Module
//!
//! The shapes records take on the way in and out of the catalogue.
//!
//! - [`ListView`]: the compact row used by listings and action results
//! - [`DetailView`]: every field plus the derived ones
//! - [`CharacterInput`]: the writable fields, validated by
//!   [`CharacterInput::apply`]
//!
//! Decimal fields travel as strings with exactly two fractional digits.
//! Submitted values are read as [`FieldValue`] and coerced per field, so a
//! value of the wrong type is reported under its field.

use crate::primitives::{
    HEIGHT_MAX_DIGITS, MAX_AGE, MAX_NAME_LENGTH, MAX_POWER_LEVEL, MIN_AGE, MIN_POWER_LEVEL,
    WEIGHT_MAX_DIGITS,
};
use crate::{
    Character, CharacterAttrs, CharacterId, CatalogueError, Decimal2, DecimalParseError,
    FieldErrors, Universe,
};
use chrono::{DateTime, Utc};
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

const MSG_REQUIRED: &str = "This field is required.";
const MSG_NULL: &str = "This field may not be null.";
const MSG_BLANK: &str = "This field may not be blank.";
const MSG_DUPLICATE_NAME: &str = "A superhero with this name already exists.";
const MSG_POWER_RANGE: &str = "Power level must be between 1 and 10.";
const MSG_AGE_RANGE: &str = "Age must be between 1 and 10000 years.";
const MSG_DECIMAL_INVALID: &str = "A valid number is required.";
const MSG_DECIMAL_PLACES: &str = "Ensure that there are no more than 2 decimal places.";
const MSG_INTEGER_INVALID: &str = "A valid integer is required.";
const MSG_BOOLEAN_INVALID: &str = "Must be a valid boolean.";
const MSG_STRING_INVALID: &str = "Not a valid string.";

// =============================================================================
// OUTPUT SHAPES
// =============================================================================

/// Compact listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListView {
    pub id: CharacterId,
    pub name: String,
    pub display_name: String,
    pub universe: Universe,
    pub power_level: u8,
    pub power_description: String,
    pub is_active: bool,
    pub is_villain: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Character> for ListView {
    fn from(c: &Character) -> Self {
        Self {
            id: c.id,
            name: c.attrs.name.clone(),
            display_name: c.display_name(),
            universe: c.attrs.universe,
            power_level: c.attrs.power_level,
            power_description: c.power_description().to_string(),
            is_active: c.attrs.is_active,
            is_villain: c.attrs.is_villain,
            created_at: c.created_at,
        }
    }
}

/// Full record with derived fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailView {
    pub id: CharacterId,
    pub name: String,
    pub real_name: Option<String>,
    pub alias: Option<String>,
    pub display_name: String,
    pub age: Option<u32>,
    #[serde(with = "decimal_text")]
    pub height: Option<Decimal2>,
    #[serde(with = "decimal_text")]
    pub weight: Option<Decimal2>,
    pub powers: Option<String>,
    pub power_level: u8,
    pub power_description: String,
    pub origin_story: Option<String>,
    pub universe: Universe,
    pub is_active: bool,
    pub is_villain: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Character> for DetailView {
    fn from(c: &Character) -> Self {
        let a = &c.attrs;
        Self {
            id: c.id,
            name: a.name.clone(),
            real_name: a.real_name.clone(),
            alias: a.alias.clone(),
            display_name: c.display_name(),
            age: a.age,
            height: a.height,
            weight: a.weight,
            powers: a.powers.clone(),
            power_level: a.power_level,
            power_description: c.power_description().to_string(),
            origin_story: a.origin_story.clone(),
            universe: a.universe,
            is_active: a.is_active,
            is_villain: a.is_villain,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// JSON text form of an optional [`Decimal2`]: `"175.50"` or `null`.
/// Accepts a string or a number on input.
pub mod decimal_text {
    use super::FieldValue;
    use crate::Decimal2;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &Option<Decimal2>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.collect_str(v),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal2>, D::Error> {
        Option::<FieldValue>::deserialize(d)?
            .map(|raw| raw.to_decimal().map_err(|_| de::Error::custom("invalid decimal")))
            .transpose()
    }
}

// =============================================================================
// INPUT SHAPE
// =============================================================================

/// A submitted value exactly as the caller sent it.
///
/// Every writable field is read into this shape first and coerced during
/// validation, so a value of the wrong type becomes a field error instead
/// of a malformed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// A JSON number in its shortest text form (`175.5`, `7`).
    Number(String),
    Bool(bool),
    /// An array or object.
    Compound,
}

const TRUE_WORDS: [&str; 6] = ["true", "t", "yes", "y", "on", "1"];
const FALSE_WORDS: [&str; 6] = ["false", "f", "no", "n", "off", "0"];

impl FieldValue {
    /// Text and numbers read as text; booleans and compounds do not.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Text(s) | Self::Number(s) => Some(s.clone()),
            Self::Bool(_) | Self::Compound => None,
        }
    }

    fn numeric_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Number(s) => Some(s.trim()),
            Self::Bool(_) | Self::Compound => None,
        }
    }

    /// Whole numbers, written plainly (`7`, `"7"`) or with a zero
    /// fraction (`7.0`). Values beyond the `i64` range saturate so that
    /// range checks still reject them.
    fn to_integer(&self) -> Option<i64> {
        let text = self.numeric_text()?;
        let whole = match text.split_once('.') {
            Some((whole, frac)) if frac.bytes().all(|b| b == b'0') => whole,
            Some(_) => return None,
            None => text,
        };
        let (negative, digits) = match whole.as_bytes().first() {
            Some(b'-') => (true, &whole[1..]),
            Some(b'+') => (false, &whole[1..]),
            _ => (false, whole),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(match whole.parse::<i64>() {
            Ok(value) => value,
            Err(_) if negative => i64::MIN,
            Err(_) => i64::MAX,
        })
    }

    /// `true`/`false` plus the usual spellings (`"yes"`, `"off"`, `1`, ...).
    fn to_bool(&self) -> Option<bool> {
        if let Self::Bool(flag) = self {
            return Some(*flag);
        }
        let word = self.numeric_text()?.to_ascii_lowercase();
        if TRUE_WORDS.contains(&word.as_str()) {
            Some(true)
        } else if FALSE_WORDS.contains(&word.as_str()) {
            Some(false)
        } else {
            None
        }
    }

    pub(crate) fn to_decimal(&self) -> Result<Decimal2, DecimalParseError> {
        self.numeric_text()
            .ok_or(DecimalParseError::Invalid)?
            .parse()
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Number(n.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<Decimal2> for FieldValue {
    fn from(d: Decimal2) -> Self {
        Self::Number(d.to_string())
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct FieldValueVisitor;

        impl<'de> Visitor<'de> for FieldValueVisitor {
            type Value = FieldValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("any JSON value")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(FieldValue::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(FieldValue::Text(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(FieldValue::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(FieldValue::Number(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(FieldValue::Number(v.to_string()))
            }

            // Shortest round-trip text, so 175.5 arrives as "175.5".
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(FieldValue::Number(v.to_string()))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(FieldValue::Compound)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(FieldValue::Compound)
            }
        }

        d.deserialize_any(FieldValueVisitor)
    }
}

/// Distinguishes an absent key (`None`) from an explicit `null`
/// (`Some(None)`).
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(d: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(d).map(Some)
    }
}

/// Writable fields as submitted by a caller.
///
/// Every field is optional at this level; which ones are required depends
/// on the [`WriteMode`]. Unknown keys (including read-only ones such as
/// `id` or `created_at`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CharacterInput {
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub name: Option<Option<FieldValue>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub real_name: Option<Option<FieldValue>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub alias: Option<Option<FieldValue>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub age: Option<Option<FieldValue>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub height: Option<Option<FieldValue>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub weight: Option<Option<FieldValue>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub powers: Option<Option<FieldValue>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub power_level: Option<Option<FieldValue>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub origin_story: Option<Option<FieldValue>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub universe: Option<Option<FieldValue>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub is_active: Option<Option<FieldValue>>,
    #[serde(default, deserialize_with = "double_option::deserialize")]
    pub is_villain: Option<Option<FieldValue>>,
}

/// How an input is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    /// Full update: `name` must be present.
    Replace,
    /// Partial update: every field may be omitted.
    Patch,
}

impl WriteMode {
    #[must_use]
    pub fn requires_name(self) -> bool {
        matches!(self, Self::Create | Self::Replace)
    }
}

fn max_length_message(limit: usize) -> String {
    format!("Ensure this field has no more than {} characters.", limit)
}

fn max_digits_message(limit: u32) -> String {
    format!(
        "Ensure that there are no more than {} digits in total.",
        limit
    )
}

/// Trim and length-check an optional text field.
fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<FieldValue>,
    limit: Option<usize>,
) -> Option<String> {
    let Some(text) = value?.to_text() else {
        errors.add(field, MSG_STRING_INVALID);
        return None;
    };
    let text = text.trim().to_string();
    if let Some(limit) = limit.filter(|limit| text.chars().count() > *limit) {
        errors.add(field, max_length_message(limit));
    }
    Some(text)
}

/// Integer within `range`, reporting a type error before a range error.
fn bounded_integer(
    errors: &mut FieldErrors,
    field: &str,
    value: &FieldValue,
    range: std::ops::RangeInclusive<i64>,
    range_message: &str,
) -> Option<i64> {
    match value.to_integer() {
        None => {
            errors.add(field, MSG_INTEGER_INVALID);
            None
        }
        Some(n) if range.contains(&n) => Some(n),
        Some(_) => {
            errors.add(field, range_message);
            None
        }
    }
}

/// Non-null boolean; `None` leaves the current value in place.
fn flag(errors: &mut FieldErrors, field: &str, value: Option<Option<FieldValue>>) -> Option<bool> {
    match value? {
        None => {
            errors.add(field, MSG_NULL);
            None
        }
        Some(raw) => {
            let parsed = raw.to_bool();
            if parsed.is_none() {
                errors.add(field, MSG_BOOLEAN_INVALID);
            }
            parsed
        }
    }
}

fn decimal(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<FieldValue>,
    max_digits: u32,
) -> Option<Decimal2> {
    let raw = value?;
    match raw.to_decimal() {
        Ok(d) if d.total_digits() > max_digits => {
            errors.add(field, max_digits_message(max_digits));
            None
        }
        Ok(d) => Some(d),
        Err(DecimalParseError::TooManyDecimalPlaces) => {
            errors.add(field, MSG_DECIMAL_PLACES);
            None
        }
        Err(DecimalParseError::Invalid) => {
            errors.add(field, MSG_DECIMAL_INVALID);
            None
        }
    }
}

impl CharacterInput {
    /// Input carrying only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(Some(FieldValue::Text(name.into()))),
            ..Self::default()
        }
    }

    /// Validate every supplied field and merge it over `base`.
    ///
    /// `existing` is the full record set used for the name-uniqueness
    /// check; the record with id `exclude` (the one being updated) is
    /// skipped. All failures are collected before returning.
    pub fn apply(
        self,
        base: CharacterAttrs,
        mode: WriteMode,
        existing: &[Character],
        exclude: Option<CharacterId>,
    ) -> Result<CharacterAttrs, CatalogueError> {
        let mut errors = FieldErrors::new();
        let mut attrs = base;

        match self.name {
            None if mode.requires_name() => errors.add("name", MSG_REQUIRED),
            None => {}
            Some(None) => errors.add("name", MSG_NULL),
            Some(Some(raw)) => match raw.to_text() {
                None => errors.add("name", MSG_STRING_INVALID),
                Some(name) => {
                    let name = name.trim().to_string();
                    if name.is_empty() {
                        errors.add("name", MSG_BLANK);
                    } else if name.chars().count() > MAX_NAME_LENGTH {
                        errors.add("name", max_length_message(MAX_NAME_LENGTH));
                    } else if name_taken(existing, &name, exclude) {
                        errors.add("name", MSG_DUPLICATE_NAME);
                    }
                    attrs.name = name;
                }
            },
        }

        if let Some(value) = self.real_name {
            attrs.real_name = optional_text(&mut errors, "real_name", value, Some(MAX_NAME_LENGTH));
        }
        if let Some(value) = self.alias {
            attrs.alias = optional_text(&mut errors, "alias", value, Some(MAX_NAME_LENGTH));
        }
        if let Some(value) = self.powers {
            attrs.powers = optional_text(&mut errors, "powers", value, None);
        }
        if let Some(value) = self.origin_story {
            attrs.origin_story = optional_text(&mut errors, "origin_story", value, None);
        }

        if let Some(value) = self.age {
            attrs.age = value
                .and_then(|raw| {
                    bounded_integer(&mut errors, "age", &raw, MIN_AGE..=MAX_AGE, MSG_AGE_RANGE)
                })
                .and_then(|age| u32::try_from(age).ok());
        }

        if let Some(value) = self.height {
            attrs.height = decimal(&mut errors, "height", value, HEIGHT_MAX_DIGITS);
        }
        if let Some(value) = self.weight {
            attrs.weight = decimal(&mut errors, "weight", value, WEIGHT_MAX_DIGITS);
        }

        match self.power_level {
            None => {}
            Some(None) => errors.add("power_level", MSG_NULL),
            Some(Some(raw)) => {
                let range = MIN_POWER_LEVEL..=MAX_POWER_LEVEL;
                if let Some(level) =
                    bounded_integer(&mut errors, "power_level", &raw, range, MSG_POWER_RANGE)
                        .and_then(|level| u8::try_from(level).ok())
                {
                    attrs.power_level = level;
                }
            }
        }

        match self.universe {
            None => {}
            Some(None) => errors.add("universe", MSG_NULL),
            Some(Some(raw)) => match raw.to_text() {
                None => errors.add("universe", MSG_STRING_INVALID),
                Some(raw) => match raw.trim().parse::<Universe>() {
                    Ok(universe) => attrs.universe = universe,
                    Err(()) => {
                        errors.add("universe", format!("\"{}\" is not a valid choice.", raw))
                    }
                },
            },
        }

        if let Some(active) = flag(&mut errors, "is_active", self.is_active) {
            attrs.is_active = active;
        }
        if let Some(villain) = flag(&mut errors, "is_villain", self.is_villain) {
            attrs.is_villain = villain;
        }

        errors.into_result()?;
        Ok(attrs)
    }
}

/// Case-insensitive name collision with any record other than `exclude`.
fn name_taken(existing: &[Character], name: &str, exclude: Option<CharacterId>) -> bool {
    let wanted = name.to_lowercase();
    existing
        .iter()
        .filter(|c| Some(c.id) != exclude)
        .any(|c| c.attrs.name.to_lowercase() == wanted)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(id: u64, name: &str) -> Character {
        Character {
            id: CharacterId(id),
            attrs: CharacterAttrs::named(name),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn input(value: serde_json::Value) -> CharacterInput {
        serde_json::from_value(value).unwrap()
    }

    fn errors_of(result: Result<CharacterAttrs, CatalogueError>) -> FieldErrors {
        match result {
            Err(CatalogueError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn create_applies_defaults() {
        let attrs = CharacterInput::named("  Storm ")
            .apply(CharacterAttrs::named(""), WriteMode::Create, &[], None)
            .unwrap();
        assert_eq!(attrs.name, "Storm");
        assert_eq!(attrs.power_level, 1);
        assert_eq!(attrs.universe, Universe::Marvel);
        assert!(attrs.is_active);
        assert!(!attrs.is_villain);
    }

    #[test]
    fn full_input_is_parsed() {
        let attrs = input(json!({
            "name": "Spider-Man",
            "real_name": "Peter Parker",
            "alias": "Spidey",
            "age": 25,
            "height": 175.5,
            "weight": "70",
            "power_level": 7,
            "universe": "Marvel",
            "is_villain": false,
            "id": 99,
        }))
        .apply(CharacterAttrs::named(""), WriteMode::Create, &[], None)
        .unwrap();

        assert_eq!(attrs.age, Some(25));
        assert_eq!(attrs.height, Some(Decimal2(17550)));
        assert_eq!(attrs.weight, Some(Decimal2(7000)));
        assert_eq!(attrs.power_level, 7);
    }

    #[test]
    fn name_required_unless_patching() {
        let base = CharacterAttrs::named("Existing");
        for mode in [WriteMode::Create, WriteMode::Replace] {
            let errors = errors_of(CharacterInput::default().apply(base.clone(), mode, &[], None));
            assert_eq!(errors.get("name"), Some(&["This field is required.".to_string()][..]));
        }
        let patched = CharacterInput::default()
            .apply(base, WriteMode::Patch, &[], None)
            .unwrap();
        assert_eq!(patched.name, "Existing");
    }

    #[test]
    fn blank_and_long_names_are_rejected() {
        let blank = errors_of(CharacterInput::named("   ").apply(
            CharacterAttrs::named(""),
            WriteMode::Create,
            &[],
            None,
        ));
        assert_eq!(blank.get("name"), Some(&["This field may not be blank.".to_string()][..]));

        let long = errors_of(CharacterInput::named("x".repeat(101)).apply(
            CharacterAttrs::named(""),
            WriteMode::Create,
            &[],
            None,
        ));
        assert!(long.get("name").unwrap()[0].contains("100 characters"));
    }

    #[test]
    fn duplicate_names_are_case_insensitive_and_exclude_self() {
        let existing = vec![stored(1, "Batman"), stored(2, "Joker")];

        let errors = errors_of(CharacterInput::named("BATMAN").apply(
            CharacterAttrs::named(""),
            WriteMode::Create,
            &existing,
            None,
        ));
        assert_eq!(
            errors.get("name"),
            Some(&["A superhero with this name already exists.".to_string()][..])
        );

        let renamed = CharacterInput::named("batman")
            .apply(existing[0].attrs.clone(), WriteMode::Replace, &existing, Some(CharacterId(1)))
            .unwrap();
        assert_eq!(renamed.name, "batman");

        let clash = errors_of(CharacterInput::named("joker").apply(
            existing[0].attrs.clone(),
            WriteMode::Patch,
            &existing,
            Some(CharacterId(1)),
        ));
        assert!(clash.contains("name"));
    }

    #[test]
    fn all_field_errors_are_collected() {
        let errors = errors_of(
            input(json!({
                "name": "Overload",
                "power_level": 11,
                "age": 0,
                "height": "1000.00",
                "weight": "1.234",
                "universe": "Image",
                "is_active": null,
            }))
            .apply(CharacterAttrs::named(""), WriteMode::Create, &[], None),
        );

        assert_eq!(
            errors.get("power_level"),
            Some(&["Power level must be between 1 and 10.".to_string()][..])
        );
        assert_eq!(
            errors.get("age"),
            Some(&["Age must be between 1 and 10000 years.".to_string()][..])
        );
        assert_eq!(
            errors.get("height"),
            Some(&["Ensure that there are no more than 5 digits in total.".to_string()][..])
        );
        assert_eq!(
            errors.get("weight"),
            Some(&["Ensure that there are no more than 2 decimal places.".to_string()][..])
        );
        assert_eq!(
            errors.get("universe"),
            Some(&["\"Image\" is not a valid choice.".to_string()][..])
        );
        assert_eq!(
            errors.get("is_active"),
            Some(&["This field may not be null.".to_string()][..])
        );
        assert!(!errors.contains("name"));
    }

    #[test]
    fn power_level_boundaries() {
        for (level, ok) in [(0, false), (1, true), (10, true), (11, false), (-3, false)] {
            let result = input(json!({"name": "X", "power_level": level})).apply(
                CharacterAttrs::named(""),
                WriteMode::Create,
                &[],
                None,
            );
            assert_eq!(result.is_ok(), ok, "power_level {}", level);
        }
        let null = errors_of(input(json!({"power_level": null})).apply(
            CharacterAttrs::named("X"),
            WriteMode::Patch,
            &[],
            None,
        ));
        assert!(null.contains("power_level"));
    }

    #[test]
    fn wrongly_typed_integers_are_field_errors() {
        let errors = errors_of(
            input(json!({"name": "X", "power_level": 5.5, "age": 0}))
                .apply(CharacterAttrs::named(""), WriteMode::Create, &[], None),
        );
        assert_eq!(
            errors.get("power_level"),
            Some(&["A valid integer is required.".to_string()][..])
        );
        assert_eq!(
            errors.get("age"),
            Some(&["Age must be between 1 and 10000 years.".to_string()][..])
        );

        let errors = errors_of(
            input(json!({"name": "X", "age": "abc", "power_level": 11}))
                .apply(CharacterAttrs::named(""), WriteMode::Create, &[], None),
        );
        assert_eq!(errors.get("age"), Some(&["A valid integer is required.".to_string()][..]));
        assert_eq!(
            errors.get("power_level"),
            Some(&["Power level must be between 1 and 10.".to_string()][..])
        );
    }

    #[test]
    fn numeric_strings_and_whole_floats_are_integers() {
        let attrs = input(json!({"name": "X", "power_level": "7", "age": 30.0}))
            .apply(CharacterAttrs::named(""), WriteMode::Create, &[], None)
            .unwrap();
        assert_eq!(attrs.power_level, 7);
        assert_eq!(attrs.age, Some(30));

        let huge = errors_of(
            input(json!({"name": "X", "age": "99999999999999999999999"}))
                .apply(CharacterAttrs::named(""), WriteMode::Create, &[], None),
        );
        assert_eq!(
            huge.get("age"),
            Some(&["Age must be between 1 and 10000 years.".to_string()][..])
        );
    }

    #[test]
    fn booleans_accept_common_spellings() {
        let attrs = input(json!({"is_villain": "yes", "is_active": 0}))
            .apply(CharacterAttrs::named("X"), WriteMode::Patch, &[], None)
            .unwrap();
        assert!(attrs.is_villain);
        assert!(!attrs.is_active);

        let errors = errors_of(
            input(json!({"is_villain": "maybe", "is_active": [true]}))
                .apply(CharacterAttrs::named("X"), WriteMode::Patch, &[], None),
        );
        assert_eq!(
            errors.get("is_villain"),
            Some(&["Must be a valid boolean.".to_string()][..])
        );
        assert_eq!(
            errors.get("is_active"),
            Some(&["Must be a valid boolean.".to_string()][..])
        );
    }

    #[test]
    fn non_text_values_are_rejected_for_text_fields() {
        let errors = errors_of(
            input(json!({"name": {"first": "Bruce"}, "alias": true, "height": false}))
                .apply(CharacterAttrs::named(""), WriteMode::Create, &[], None),
        );
        assert_eq!(errors.get("name"), Some(&["Not a valid string.".to_string()][..]));
        assert_eq!(errors.get("alias"), Some(&["Not a valid string.".to_string()][..]));
        assert_eq!(
            errors.get("height"),
            Some(&["A valid number is required.".to_string()][..])
        );
    }

    #[test]
    fn patch_can_clear_nullable_fields() {
        let mut base = CharacterAttrs::named("Logan");
        base.age = Some(150);
        base.alias = Some("Wolverine".to_string());

        let attrs = input(json!({"age": null, "alias": null}))
            .apply(base, WriteMode::Patch, &[], None)
            .unwrap();
        assert_eq!(attrs.age, None);
        assert_eq!(attrs.alias, None);
        assert_eq!(attrs.name, "Logan");
    }

    #[test]
    fn detail_view_renders_decimals_as_text() {
        let mut record = stored(3, "Spider-Man");
        record.attrs.alias = Some("Spidey".to_string());
        record.attrs.height = Some(Decimal2(17550));

        let json = serde_json::to_value(DetailView::from(&record)).unwrap();
        assert_eq!(json["height"], "175.50");
        assert_eq!(json["weight"], serde_json::Value::Null);
        assert_eq!(json["display_name"], "Spider-Man (Spidey)");
        assert_eq!(json["power_description"], "Beginner");

        let back: DetailView = serde_json::from_value(json).unwrap();
        assert_eq!(back.height, Some(Decimal2(17550)));
    }

    #[test]
    fn list_view_shape() {
        let json = serde_json::to_value(ListView::from(&stored(4, "Batman"))).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                "id",
                "name",
                "display_name",
                "universe",
                "power_level",
                "power_description",
                "is_active",
                "is_villain",
                "created_at",
            ]
        );
    }
}
