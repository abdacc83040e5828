// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout plan routes: generation, deletion, day detail, plan selection.

use super::coordinator;
use super::profile::SaveResponse;
use crate::error::Result;
use crate::middleware::Identity;
use crate::models::{resolve_day, DayLookup, DayPlan, GenerationPreferences, WeeklyPlan};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Where invalid day links end up.
pub const DASHBOARD_PATH: &str = "/dashboard";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/plan/generate", post(generate_plan))
        .route("/api/plan", delete(delete_plan))
        .route("/api/plan/days/{index}", get(get_day))
        .route("/api/plan/selection", put(select_plan))
}

// ─── Generation ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub plan: WeeklyPlan,
    pub model: String,
    /// False when the model returned other than seven days
    pub complete: bool,
    #[serde(flatten)]
    pub save: SaveResponse,
}

/// Generate a new weekly plan from the stored profile and save it.
async fn generate_plan(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(prefs): Json<GenerationPreferences>,
) -> Result<Json<GenerateResponse>> {
    prefs.validate()?;

    let coordinator = coordinator(&state, &identity);
    let profile = coordinator
        .get_user_profile(identity.user_id())
        .await?
        .unwrap_or_default();

    let cancel = state.shutdown.child_token();
    let generated = state.generator.generate(&profile, &prefs, &cancel).await?;

    let outcome = coordinator
        .save_workout_routine(identity.user_id(), &generated.plan)
        .await?;

    Ok(Json(GenerateResponse {
        complete: generated.plan.is_complete(),
        plan: generated.plan,
        model: generated.model,
        save: outcome.into(),
    }))
}

// ─── Deletion ────────────────────────────────────────────────

async fn delete_plan(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<SaveResponse>> {
    let outcome = coordinator(&state, &identity)
        .delete_user_plan(identity.user_id())
        .await?;
    Ok(Json(outcome.into()))
}

// ─── Day Detail ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub index: usize,
    pub day: DayPlan,
}

/// One day of the current plan. Anything that doesn't resolve to a day
/// redirects to the dashboard instead of erroring.
async fn get_day(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(raw_index): Path<String>,
) -> Result<Response> {
    let profile = coordinator(&state, &identity)
        .get_user_profile(identity.user_id())
        .await?;
    let plan = profile.and_then(|p| p.workout_routine);

    Ok(match resolve_day(plan.as_ref(), &raw_index) {
        DayLookup::Found { index, day } => Json(DayResponse {
            index,
            day: day.clone(),
        })
        .into_response(),
        DayLookup::Redirect => {
            tracing::debug!(raw_index = %raw_index, "Day not found, redirecting");
            Redirect::to(DASHBOARD_PATH).into_response()
        }
    })
}

// ─── Plan Selection ──────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct SelectPlanRequest {
    #[validate(length(min = 1, max = 64))]
    pub plan_id: String,
}

/// Record the chosen subscription plan (signed-in users only).
async fn select_plan(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<SelectPlanRequest>,
) -> Result<StatusCode> {
    request.validate()?;
    coordinator(&state, &identity)
        .save_selected_plan(identity.user_id(), request.plan_id.trim())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
