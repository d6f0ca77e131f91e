//! # API Request/Response Types
//!
//! JSON structures specific to the HTTP layer. Record shapes
//! (`ListView`, `DetailView`, `CharacterInput`, ...) come from the core.

use capes_core::FieldErrors;
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// QUERY PARAMETERS
// =============================================================================

/// `?universe=` for the by_universe action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UniverseQuery {
    pub universe: Option<String>,
}

/// `?limit=` for the top action. Kept raw so bad values become field errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

// =============================================================================
// ERROR BODIES
// =============================================================================

/// Body of a 400 caused by field validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    pub errors: FieldErrors,
}

/// Body of every other error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
