//! # API Endpoint Handlers
//!
//! Each handler translates HTTP input into one catalogue call. Reads take
//! the shared lock; every mutation takes the write lock, so toggles on the
//! same record cannot interleave.

use super::{
    AppState,
    error::{AppError, AppResult},
    types::{HealthResponse, LimitQuery, UniverseQuery},
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use capes_core::{
    CharacterId, CharacterInput, DetailView, ListParams, ListView, Page, StatsSnapshot,
    ToggleOutcome, parse_limit,
};
use std::collections::BTreeMap;

/// Unparseable ids cannot name a record.
fn parse_id(raw: &str) -> AppResult<CharacterId> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("Character with id {} not found", raw)))
}

fn read_body(payload: Result<Json<CharacterInput>, JsonRejection>) -> AppResult<CharacterInput> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// CRUD HANDLERS
// =============================================================================

/// List characters with filters, ordering and pagination.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
) -> AppResult<Json<Page<ListView>>> {
    let params = ListParams::parse(&query, state.page_size)?;
    let catalogue = state.catalogue.read().await;
    Ok(Json(catalogue.list(&params)?))
}

/// Create a character.
pub async fn create_handler(
    State(state): State<AppState>,
    payload: Result<Json<CharacterInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<DetailView>)> {
    let input = read_body(payload)?;
    let mut catalogue = state.catalogue.write().await;
    let created = catalogue.create(input)?;

    tracing::info!(id = %created.id, name = %created.name, "Character created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Fetch one character.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DetailView>> {
    let id = parse_id(&id)?;
    let catalogue = state.catalogue.read().await;
    Ok(Json(catalogue.get(id)?))
}

async fn update(
    state: AppState,
    raw_id: &str,
    payload: Result<Json<CharacterInput>, JsonRejection>,
    partial: bool,
) -> AppResult<Json<DetailView>> {
    let id = parse_id(raw_id)?;
    let input = read_body(payload)?;
    let mut catalogue = state.catalogue.write().await;
    let updated = catalogue.update(id, input, partial)?;

    tracing::info!(id = %updated.id, partial, "Character updated");
    Ok(Json(updated))
}

/// Full update (`PUT`): `name` is required.
pub async fn replace_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CharacterInput>, JsonRejection>,
) -> AppResult<Json<DetailView>> {
    update(state, &id, payload, false).await
}

/// Partial update (`PATCH`).
pub async fn patch_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CharacterInput>, JsonRejection>,
) -> AppResult<Json<DetailView>> {
    update(state, &id, payload, true).await
}

/// Delete a character.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    let mut catalogue = state.catalogue.write().await;
    catalogue.delete(id)?;

    tracing::info!(id = %id, "Character deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// AGGREGATE & QUERY HANDLERS
// =============================================================================

/// Catalogue-wide statistics.
pub async fn stats_handler(State(state): State<AppState>) -> AppResult<Json<StatsSnapshot>> {
    let catalogue = state.catalogue.read().await;
    Ok(Json(catalogue.stats()?))
}

/// Characters of one universe.
pub async fn by_universe_handler(
    State(state): State<AppState>,
    Query(query): Query<UniverseQuery>,
) -> AppResult<Json<Vec<ListView>>> {
    let catalogue = state.catalogue.read().await;
    Ok(Json(catalogue.by_universe(query.universe.as_deref())?))
}

/// Strongest non-villains.
pub async fn top_handler(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<ListView>>> {
    let limit = parse_limit(query.limit.as_deref())?;
    let catalogue = state.catalogue.read().await;
    Ok(Json(catalogue.top(limit)?))
}

/// Villains only.
pub async fn villains_handler(State(state): State<AppState>) -> AppResult<Json<Vec<ListView>>> {
    let catalogue = state.catalogue.read().await;
    Ok(Json(catalogue.villains()?))
}

// =============================================================================
// TOGGLE HANDLERS
// =============================================================================

/// Flip `is_villain`.
pub async fn toggle_villain_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ToggleOutcome>> {
    let id = parse_id(&id)?;
    let mut catalogue = state.catalogue.write().await;
    let outcome = catalogue.toggle_villain(id)?;

    tracing::info!(id = %id, is_villain = outcome.character.is_villain, "Character toggled");
    Ok(Json(outcome))
}

/// Flip `is_active`.
pub async fn toggle_active_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ToggleOutcome>> {
    let id = parse_id(&id)?;
    let mut catalogue = state.catalogue.write().await;
    let outcome = catalogue.toggle_active(id)?;

    tracing::info!(id = %id, is_active = outcome.character.is_active, "Character toggled");
    Ok(Json(outcome))
}
