// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile and onboarding routes.

use super::coordinator;
use crate::error::Result;
use crate::middleware::Identity;
use crate::models::UserProfile;
use crate::services::onboarding::OnboardingForm;
use crate::services::SaveOutcome;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", get(get_profile))
        .route("/api/onboarding", post(save_onboarding))
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// None when neither store knows this user
    pub profile: Option<UserProfile>,
    pub has_routine: bool,
}

/// Current profile, merged from the profile store and the device cache.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ProfileResponse>> {
    let profile = coordinator(&state, &identity)
        .get_user_profile(identity.user_id())
        .await?;

    Ok(Json(ProfileResponse {
        has_routine: profile.as_ref().is_some_and(UserProfile::has_routine),
        profile,
    }))
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub saved: SaveOutcome,
    pub warning: Option<&'static str>,
}

impl From<SaveOutcome> for SaveResponse {
    fn from(saved: SaveOutcome) -> Self {
        Self {
            warning: saved.warning(),
            saved,
        }
    }
}

/// Save the completed onboarding form.
async fn save_onboarding(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(form): Json<OnboardingForm>,
) -> Result<Json<SaveResponse>> {
    let profile = form.into_profile()?;

    let outcome = coordinator(&state, &identity)
        .save_onboarding_data(identity.user_id(), &profile)
        .await?;

    Ok(Json(outcome.into()))
}
