// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! All profile data lives in one collection (`user_plans`), one document per
//! user. Writes use field masks so that onboarding, plan generation and plan
//! selection never clobber each other's fields.

use super::{collections, ProfileStore};
use crate::error::AppError;
use crate::models::{UserProfile, WeeklyPlan};
use async_trait::async_trait;

const BIOMETRIC_FIELDS: [&str; 7] = [
    "user_id",
    "units",
    "gender",
    "age",
    "weight",
    "height",
    "goal",
];
const ROUTINE_FIELDS: [&str; 3] = ["user_id", "workout_routine", "updated_at"];
const SELECTED_PLAN_FIELDS: [&str; 2] = ["user_id", "selected_plan"];

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client: every operation fails with a database error.
    ///
    /// Useful for exercising the remote-failure paths.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Write the masked fields of `profile` into the user's document,
    /// creating it if needed.
    async fn update_fields(
        &self,
        user_id: &str,
        fields: &[&str],
        profile: &UserProfile,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields.iter().copied())
            .in_col(collections::USER_PLANS)
            .document_id(user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for FirestoreDb {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_PLANS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_biometrics(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<(), AppError> {
        let record = UserProfile {
            user_id: Some(user_id.to_string()),
            ..profile.clone()
        };
        self.update_fields(user_id, &BIOMETRIC_FIELDS, &record).await
    }

    async fn upsert_workout_routine(
        &self,
        user_id: &str,
        routine: &WeeklyPlan,
        updated_at: &str,
    ) -> Result<(), AppError> {
        let record = UserProfile {
            user_id: Some(user_id.to_string()),
            workout_routine: Some(routine.clone()),
            updated_at: Some(updated_at.to_string()),
            ..Default::default()
        };
        self.update_fields(user_id, &ROUTINE_FIELDS, &record).await
    }

    async fn clear_workout_routine(&self, user_id: &str) -> Result<(), AppError> {
        // Plain update semantics: a missing record stays missing.
        if self.get_profile(user_id).await?.is_none() {
            tracing::debug!(user_id, "No profile record to clear routine from");
            return Ok(());
        }

        let record = UserProfile {
            user_id: Some(user_id.to_string()),
            workout_routine: None,
            ..Default::default()
        };
        self.update_fields(user_id, &["workout_routine"], &record)
            .await
    }

    async fn upsert_selected_plan(&self, user_id: &str, plan_id: &str) -> Result<(), AppError> {
        let record = UserProfile {
            user_id: Some(user_id.to_string()),
            selected_plan: Some(plan_id.to_string()),
            ..Default::default()
        };
        self.update_fields(user_id, &SELECTED_PLAN_FIELDS, &record)
            .await
    }
}
