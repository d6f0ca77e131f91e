//! # Filter Module
//!
//! Criteria, ordering and pagination for listing operations.
//!
//! - [`CharacterFilter`] enumerates every recognised criterion; unset
//!   criteria impose no constraint and set ones combine with AND
//! - [`SortOrder`] sorts by one or more keys, always breaking ties by name
//!   and then id so results are deterministic
//! - [`PageRequest`] slices the ordered result; a bad page number yields an
//!   empty page instead of an error
//!
//! Raw query-string values are parsed by [`ListParams::parse`], which
//! reports malformed values per key.

use crate::primitives::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::{Character, CatalogueError, Decimal2, FieldErrors, Universe};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

const MSG_NUMBER: &str = "Enter a number.";
const MSG_DATETIME: &str = "Enter a valid date/time.";
const MSG_BOOLEAN: &str = "Enter a valid boolean.";

// =============================================================================
// BOUNDS
// =============================================================================

/// Inclusive lower/upper bound pair. Either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
        }
    }
}

impl<T: Ord + Copy> Bounds<T> {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.min.is_none_or(|min| *value >= min) && self.max.is_none_or(|max| *value <= max)
    }

    /// Raise the lower bound if `min` is tighter than the current one.
    pub fn tighten_min(&mut self, min: T) {
        self.min = Some(self.min.map_or(min, |current| current.max(min)));
    }

    /// Lower the upper bound if `max` is tighter than the current one.
    pub fn tighten_max(&mut self, max: T) {
        self.max = Some(self.max.map_or(max, |current| current.min(max)));
    }

    /// An optional field only satisfies a constrained range when present.
    fn admits(&self, value: Option<T>) -> bool {
        self.is_open() || value.is_some_and(|v| self.contains(&v))
    }
}

// =============================================================================
// CHARACTER FILTER
// =============================================================================

/// Every criterion a listing can be narrowed by.
///
/// Numeric criteria are expressed as [`Decimal2`] so that `age_min=24.5`
/// behaves like a numeric comparison instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterFilter {
    /// Case-insensitive substring criteria.
    pub name: Option<String>,
    pub real_name: Option<String>,
    pub alias: Option<String>,
    pub powers: Option<String>,
    pub origin_story: Option<String>,

    pub age: Bounds<Decimal2>,
    pub height: Bounds<Decimal2>,
    pub weight: Bounds<Decimal2>,
    pub power_level: Bounds<Decimal2>,
    pub power_level_exact: Option<Decimal2>,
    pub power_level_in: Option<Vec<Decimal2>>,
    pub power_level_lt: Option<Decimal2>,
    pub power_level_gt: Option<Decimal2>,

    pub universe: Option<Universe>,
    pub universe_in: Option<Vec<Universe>>,
    pub is_active: Option<bool>,
    pub is_villain: Option<bool>,

    pub created: Bounds<DateTime<Utc>>,
    pub updated: Bounds<DateTime<Utc>>,

    /// Free text matched against name, real_name, alias and powers (any).
    pub search: Option<String>,
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

fn text_matches(criterion: Option<&String>, field: Option<&str>) -> bool {
    criterion.is_none_or(|needle| contains_ci(field, needle))
}

impl CharacterFilter {
    /// A filter that admits every record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the record satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, character: &Character) -> bool {
        let a = &character.attrs;
        let level = Decimal2::from_units(i64::from(a.power_level));

        text_matches(self.name.as_ref(), Some(&a.name))
            && text_matches(self.real_name.as_ref(), a.real_name.as_deref())
            && text_matches(self.alias.as_ref(), a.alias.as_deref())
            && text_matches(self.powers.as_ref(), a.powers.as_deref())
            && text_matches(self.origin_story.as_ref(), a.origin_story.as_deref())
            && self
                .age
                .admits(a.age.map(|age| Decimal2::from_units(i64::from(age))))
            && self.height.admits(a.height)
            && self.weight.admits(a.weight)
            && self.power_level.contains(&level)
            && self.power_level_exact.is_none_or(|exact| exact == level)
            && self
                .power_level_in
                .as_ref()
                .is_none_or(|set| set.contains(&level))
            && self.power_level_lt.is_none_or(|lt| level < lt)
            && self.power_level_gt.is_none_or(|gt| level > gt)
            && self.universe.is_none_or(|u| u == a.universe)
            && self
                .universe_in
                .as_ref()
                .is_none_or(|set| set.contains(&a.universe))
            && self.is_active.is_none_or(|v| v == a.is_active)
            && self.is_villain.is_none_or(|v| v == a.is_villain)
            && self.created.contains(&character.created_at)
            && self.updated.contains(&character.updated_at)
            && self.search.as_ref().is_none_or(|text| {
                contains_ci(Some(&a.name), text)
                    || contains_ci(a.real_name.as_deref(), text)
                    || contains_ci(a.alias.as_deref(), text)
                    || contains_ci(a.powers.as_deref(), text)
            })
    }

    /// Parse query-string criteria. Unknown keys and blank values are
    /// ignored; every malformed value is reported under its own key.
    pub fn from_params(params: &BTreeMap<String, String>) -> Result<Self, CatalogueError> {
        let mut filter = Self::new();
        let mut errors = FieldErrors::new();

        for (key, raw) in params {
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }
            let key = key.as_str();

            match key {
                "name" => filter.name = Some(value.to_string()),
                "real_name" => filter.real_name = Some(value.to_string()),
                "alias" => filter.alias = Some(value.to_string()),
                "powers" => filter.powers = Some(value.to_string()),
                "origin_story" => filter.origin_story = Some(value.to_string()),
                "search" => filter.search = Some(value.to_string()),

                "age_min" | "age_max" | "height_min" | "height_max" | "weight_min"
                | "weight_max" | "power_level_min" | "power_level_max" | "power_level"
                | "power_level__lt" | "power_level__lte" | "power_level__gt"
                | "power_level__gte" => match value.parse::<Decimal2>() {
                    Ok(number) => filter.apply_number(key, number),
                    Err(_) => errors.add(key, MSG_NUMBER),
                },

                "power_level__in" => match parse_list(value, |v| v.parse::<Decimal2>().ok()) {
                    Some(set) => filter.power_level_in = Some(set),
                    None => errors.add(key, MSG_NUMBER),
                },

                "universe" => match value.parse::<Universe>() {
                    Ok(universe) => filter.universe = Some(universe),
                    Err(()) => errors.add(key, invalid_choice(value)),
                },
                "universe__in" => {
                    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
                    match parts.iter().find(|p| p.parse::<Universe>().is_err()) {
                        Some(bad) => errors.add(key, invalid_choice(bad)),
                        None => {
                            filter.universe_in = Some(
                                parts.iter().filter_map(|p| p.parse().ok()).collect(),
                            );
                        }
                    }
                }

                "is_active" | "is_villain" => match parse_bool(value) {
                    Some(flag) if key == "is_active" => filter.is_active = Some(flag),
                    Some(flag) => filter.is_villain = Some(flag),
                    None => errors.add(key, MSG_BOOLEAN),
                },

                "created_after" | "created_before" | "updated_after" | "updated_before" => {
                    match parse_datetime(value) {
                        Some(at) => filter.apply_datetime(key, at),
                        None => errors.add(key, MSG_DATETIME),
                    }
                }

                _ => {}
            }
        }

        errors.into_result()?;
        Ok(filter)
    }

    fn apply_number(&mut self, key: &str, number: Decimal2) {
        match key {
            "age_min" => self.age.tighten_min(number),
            "age_max" => self.age.tighten_max(number),
            "height_min" => self.height.tighten_min(number),
            "height_max" => self.height.tighten_max(number),
            "weight_min" => self.weight.tighten_min(number),
            "weight_max" => self.weight.tighten_max(number),
            "power_level_min" | "power_level__gte" => self.power_level.tighten_min(number),
            "power_level_max" | "power_level__lte" => self.power_level.tighten_max(number),
            "power_level" => self.power_level_exact = Some(number),
            "power_level__lt" => self.power_level_lt = Some(number),
            "power_level__gt" => self.power_level_gt = Some(number),
            _ => {}
        }
    }

    fn apply_datetime(&mut self, key: &str, at: DateTime<Utc>) {
        match key {
            "created_after" => self.created.tighten_min(at),
            "created_before" => self.created.tighten_max(at),
            "updated_after" => self.updated.tighten_min(at),
            "updated_before" => self.updated.tighten_max(at),
            _ => {}
        }
    }
}

fn invalid_choice(value: &str) -> String {
    format!(
        "Select a valid choice. {} is not one of the available choices.",
        value
    )
}

fn parse_list<T>(value: &str, parse: impl Fn(&str) -> Option<T>) -> Option<Vec<T>> {
    value.split(',').map(|part| parse(part.trim())).collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]` / `YYYY-MM-DDTHH:MM[:SS]`
/// (read as UTC) and a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Some(at.with_timezone(&Utc));
    }
    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// =============================================================================
// ORDERING
// =============================================================================

/// Fields a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Name,
    PowerLevel,
    Age,
    CreatedAt,
    UpdatedAt,
}

impl OrderField {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(Self::Name),
            "power_level" => Some(Self::PowerLevel),
            "age" => Some(Self::Age),
            "created_at" => Some(Self::CreatedAt),
            "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }
}

/// One sort key with its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderKey {
    pub field: OrderField,
    pub descending: bool,
}

impl OrderKey {
    #[must_use]
    pub const fn asc(field: OrderField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    #[must_use]
    pub const fn desc(field: OrderField) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

/// Sort specification. Empty means the default order (name ascending).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOrder {
    keys: Vec<OrderKey>,
}

/// Absent values sort after present ones (ascending).
fn cmp_optional<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn cmp_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl SortOrder {
    #[must_use]
    pub fn new(keys: Vec<OrderKey>) -> Self {
        Self { keys }
    }

    /// Parse an `ordering` parameter such as `-power_level` or
    /// `name,-age`. Unknown keys are dropped.
    #[must_use]
    pub fn parse(spec: &str) -> Self {
        let keys = spec
            .split(',')
            .filter_map(|part| {
                let part = part.trim();
                let (descending, name) = match part.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, part),
                };
                OrderField::parse(name).map(|field| OrderKey { field, descending })
            })
            .collect();
        Self { keys }
    }

    #[must_use]
    pub fn keys(&self) -> &[OrderKey] {
        &self.keys
    }

    /// Compare two records under this order, then name, then id.
    #[must_use]
    pub fn compare(&self, a: &Character, b: &Character) -> Ordering {
        for key in &self.keys {
            let ord = match key.field {
                OrderField::Name => cmp_names(&a.attrs.name, &b.attrs.name),
                OrderField::PowerLevel => a.attrs.power_level.cmp(&b.attrs.power_level),
                OrderField::Age => cmp_optional(a.attrs.age, b.attrs.age),
                OrderField::CreatedAt => a.created_at.cmp(&b.created_at),
                OrderField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            };
            let ord = if key.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        cmp_names(&a.attrs.name, &b.attrs.name).then_with(|| a.id.cmp(&b.id))
    }

    pub fn sort(&self, records: &mut [Character]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Which slice of an ordered result to return.
///
/// `page` is 1-based; `0` marks a page number that could not be parsed and
/// always produces an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    #[must_use]
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Parse raw `page` / `page_size` values. A missing page means the
    /// first page; an unusable page size falls back to `default_size`.
    #[must_use]
    pub fn parse(page: Option<&str>, page_size: Option<&str>, default_size: usize) -> Self {
        let page = match page.map(str::trim) {
            None | Some("") => 1,
            Some(raw) => raw.parse::<usize>().unwrap_or(0),
        };
        let page_size = page_size
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(default_size);
        Self::new(page, page_size)
    }

    /// Cut one page out of `items`.
    #[must_use]
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let count = items.len();
        let total_pages = count.div_ceil(self.page_size).max(1);

        let results = if self.page == 0 || self.page > total_pages {
            Vec::new()
        } else {
            items
                .into_iter()
                .skip((self.page - 1) * self.page_size)
                .take(self.page_size)
                .collect()
        };

        Page {
            count,
            page: self.page,
            page_size: self.page_size,
            total_pages,
            results,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of matching records across all pages.
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub results: Vec<T>,
}

// =============================================================================
// LIST PARAMETERS
// =============================================================================

/// Everything a `list` call needs: criteria, order and page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub filter: CharacterFilter,
    pub ordering: SortOrder,
    pub page: PageRequest,
}

impl ListParams {
    /// Parse a full query string map (`ordering`, `page` and `page_size`
    /// included).
    pub fn parse(
        params: &BTreeMap<String, String>,
        default_page_size: usize,
    ) -> Result<Self, CatalogueError> {
        Ok(Self {
            filter: CharacterFilter::from_params(params)?,
            ordering: params
                .get("ordering")
                .map(String::as_str)
                .map(SortOrder::parse)
                .unwrap_or_default(),
            page: PageRequest::parse(
                params.get("page").map(String::as_str),
                params.get("page_size").map(String::as_str),
                default_page_size,
            ),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::{CharacterAttrs, CharacterId};
    use chrono::TimeZone;

    fn record(id: u64, name: &str, power: u8, age: Option<u32>) -> Character {
        let at = Utc.with_ymd_and_hms(2024, 1, id as u32, 12, 0, 0).single().unwrap_or_default();
        Character {
            id: CharacterId(id),
            attrs: CharacterAttrs {
                power_level: power,
                age,
                ..CharacterAttrs::named(name)
            },
            created_at: at,
            updated_at: at,
        }
    }

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = CharacterFilter::new();
        assert!(filter.matches(&record(1, "Anyone", 1, None)));
    }

    #[test]
    fn text_criteria_are_case_insensitive_substrings() {
        let mut hero = record(1, "Spider-Man", 7, Some(25));
        hero.attrs.real_name = Some("Peter Parker".to_string());

        let filter = CharacterFilter::from_params(&params(&[("real_name", "PARK")]))
            .expect("parse");
        assert!(filter.matches(&hero));

        let filter = CharacterFilter::from_params(&params(&[("alias", "spid")])).expect("parse");
        assert!(!filter.matches(&hero), "absent alias never matches");
    }

    #[test]
    fn search_is_any_of_four_fields() {
        let mut hero = record(1, "Batman", 6, None);
        hero.attrs.powers = Some("Detective skills".to_string());
        hero.attrs.origin_story = Some("Crime alley".to_string());

        let by_powers = CharacterFilter::from_params(&params(&[("search", "detective")]))
            .expect("parse");
        assert!(by_powers.matches(&hero));

        let by_origin =
            CharacterFilter::from_params(&params(&[("search", "alley")])).expect("parse");
        assert!(!by_origin.matches(&hero), "origin_story is not searched");
    }

    #[test]
    fn ranges_are_inclusive_and_skip_absent_values() {
        let filter = CharacterFilter::from_params(&params(&[("age_min", "25"), ("age_max", "30")]))
            .expect("parse");
        assert!(filter.matches(&record(1, "A", 1, Some(25))));
        assert!(filter.matches(&record(2, "B", 1, Some(30))));
        assert!(!filter.matches(&record(3, "C", 1, Some(31))));
        assert!(!filter.matches(&record(4, "D", 1, None)));
    }

    #[test]
    fn power_level_lookups() {
        let strict = CharacterFilter::from_params(&params(&[("power_level__gt", "5")]))
            .expect("parse");
        assert!(!strict.matches(&record(1, "A", 5, None)));
        assert!(strict.matches(&record(2, "B", 6, None)));

        let set = CharacterFilter::from_params(&params(&[("power_level__in", "3, 7")]))
            .expect("parse");
        assert!(set.matches(&record(3, "C", 7, None)));
        assert!(!set.matches(&record(4, "D", 5, None)));

        let exact = CharacterFilter::from_params(&params(&[("power_level", "5")])).expect("parse");
        assert!(exact.matches(&record(5, "E", 5, None)));
    }

    #[test]
    fn universe_and_flags() {
        let mut joker = record(1, "Joker", 5, None);
        joker.attrs.universe = Universe::Dc;
        joker.attrs.is_villain = true;

        let filter = CharacterFilter::from_params(&params(&[
            ("universe__in", "DC,Other"),
            ("is_villain", "True"),
        ]))
        .expect("parse");
        assert!(filter.matches(&joker));

        let filter =
            CharacterFilter::from_params(&params(&[("is_active", "false")])).expect("parse");
        assert!(!filter.matches(&joker));
    }

    #[test]
    fn date_ranges() {
        let filter = CharacterFilter::from_params(&params(&[
            ("created_after", "2024-01-02"),
            ("created_before", "2024-01-03T12:00:00Z"),
        ]))
        .expect("parse");
        assert!(!filter.matches(&record(1, "A", 1, None)));
        assert!(filter.matches(&record(2, "B", 1, None)));
        assert!(filter.matches(&record(3, "C", 1, None)));
        assert!(!filter.matches(&record(4, "D", 1, None)));
    }

    #[test]
    fn malformed_values_are_reported_per_key() {
        let err = CharacterFilter::from_params(&params(&[
            ("age_min", "old"),
            ("universe", "Image"),
            ("created_after", "yesterday"),
            ("is_active", "maybe"),
            ("unknown_key", "ignored"),
        ]))
        .expect_err("should fail");

        let CatalogueError::Validation(errors) = err else {
            unreachable!("expected validation error");
        };
        assert_eq!(errors.get("age_min"), Some(&["Enter a number.".to_string()][..]));
        assert!(errors.contains("universe"));
        assert!(errors.contains("created_after"));
        assert!(errors.contains("is_active"));
        assert!(!errors.contains("unknown_key"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let filter = CharacterFilter::from_params(&params(&[("age_min", "  "), ("name", "")]))
            .expect("parse");
        assert_eq!(filter, CharacterFilter::new());
    }

    #[test]
    fn default_order_is_name_ascending() {
        let mut records = vec![
            record(1, "Wolverine", 8, None),
            record(2, "batman", 6, None),
            record(3, "Superman", 10, None),
        ];
        SortOrder::default().sort(&mut records);
        let names: Vec<_> = records.iter().map(|c| c.attrs.name.as_str()).collect();
        assert_eq!(names, vec!["batman", "Superman", "Wolverine"]);
    }

    #[test]
    fn descending_order_breaks_ties_by_name() {
        let mut records = vec![
            record(1, "Zatanna", 7, None),
            record(2, "Batman", 6, None),
            record(3, "Aquaman", 7, None),
        ];
        SortOrder::parse("-power_level").sort(&mut records);
        let names: Vec<_> = records.iter().map(|c| c.attrs.name.as_str()).collect();
        assert_eq!(names, vec!["Aquaman", "Zatanna", "Batman"]);
    }

    #[test]
    fn absent_age_sorts_last_ascending_and_first_descending() {
        let mut records = vec![
            record(1, "NoAge", 1, None),
            record(2, "Old", 1, Some(90)),
            record(3, "Young", 1, Some(9)),
        ];
        SortOrder::parse("age").sort(&mut records);
        assert_eq!(records[2].attrs.name, "NoAge");
        SortOrder::parse("-age").sort(&mut records);
        assert_eq!(records[0].attrs.name, "NoAge");
    }

    #[test]
    fn unknown_order_keys_fall_back_to_default() {
        let order = SortOrder::parse("-secret_identity");
        assert!(order.keys().is_empty());
        let order = SortOrder::parse("universe, -age");
        assert_eq!(order.keys(), &[OrderKey::desc(OrderField::Age)]);
    }

    #[test]
    fn pagination_slices_and_tolerates_bad_pages() {
        let items: Vec<u32> = (1..=45).collect();

        let page = PageRequest::new(3, 20).paginate(items.clone());
        assert_eq!(page.count, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.results, vec![41, 42, 43, 44, 45]);

        let beyond = PageRequest::new(4, 20).paginate(items.clone());
        assert!(beyond.results.is_empty());
        assert_eq!(beyond.count, 45);

        let garbage = PageRequest::parse(Some("last"), None, 20).paginate(items);
        assert!(garbage.results.is_empty());
    }

    #[test]
    fn page_size_parsing() {
        assert_eq!(PageRequest::parse(None, None, 20), PageRequest::new(1, 20));
        assert_eq!(PageRequest::parse(None, Some("0"), 20).page_size, 20);
        assert_eq!(PageRequest::parse(None, Some("x"), 20).page_size, 20);
        assert_eq!(PageRequest::parse(None, Some("5000"), 20).page_size, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::parse(Some("-1"), None, 20).page, 0);
    }

    #[test]
    fn list_params_collects_everything() {
        let parsed = ListParams::parse(
            &params(&[
                ("ordering", "-power_level"),
                ("page", "2"),
                ("page_size", "5"),
                ("is_villain", "false"),
            ]),
            DEFAULT_PAGE_SIZE,
        )
        .expect("parse");

        assert_eq!(parsed.page, PageRequest::new(2, 5));
        assert_eq!(parsed.ordering.keys(), &[OrderKey::desc(OrderField::PowerLevel)]);
        assert_eq!(parsed.filter.is_villain, Some(false));
    }
}
