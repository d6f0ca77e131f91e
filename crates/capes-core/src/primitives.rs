//! # Catalogue Primitives
//!
//! Hardcoded constants for the Capes catalogue.
//!
//! These bounds are compiled into the binary and are immutable at runtime.
//! Validation, the filter engine and the action handlers all read them from
//! here so the limits cannot drift apart.

// =============================================================================
// RECORD CONSTRAINTS
// =============================================================================

/// Lowest accepted power level.
pub const MIN_POWER_LEVEL: i64 = 1;

/// Highest accepted power level.
pub const MAX_POWER_LEVEL: i64 = 10;

/// Power level given to a character created without one.
pub const DEFAULT_POWER_LEVEL: u8 = 1;

/// Lowest accepted age, in years.
pub const MIN_AGE: i64 = 1;

/// Highest accepted age, in years.
pub const MAX_AGE: i64 = 10_000;

/// Maximum length (in characters) of `name`, `real_name` and `alias`.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum total digits of a height value (`999.99`).
pub const HEIGHT_MAX_DIGITS: u32 = 5;

/// Maximum total digits of a weight value (`9999.99`).
pub const WEIGHT_MAX_DIGITS: u32 = 6;

// =============================================================================
// POWER TIERS
// =============================================================================

/// Tier label for each power level.
pub const POWER_TIERS: [(u8, &str); 10] = [
    (1, "Beginner"),
    (2, "Novice"),
    (3, "Competent"),
    (4, "Skilled"),
    (5, "Expert"),
    (6, "Advanced"),
    (7, "Elite"),
    (8, "Master"),
    (9, "Legendary"),
    (10, "Godlike"),
];

/// Label for any level missing from [`POWER_TIERS`].
pub const UNKNOWN_POWER_TIER: &str = "Unknown";

// =============================================================================
// LISTING LIMITS
// =============================================================================

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Number of entries returned by `top` when no limit is supplied.
pub const DEFAULT_TOP_LIMIT: usize = 10;
