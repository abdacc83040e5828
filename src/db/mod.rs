// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile store (Firestore, or in-memory for development and tests).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryProfileStore;

use crate::error::AppError;
use crate::models::{UserProfile, WeeklyPlan};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// User profiles with embedded workout routine (keyed by user_id)
    pub const USER_PLANS: &str = "user_plans";
}

/// Remote profile record operations. Every write is keyed by `user_id`
/// and replaces only the fields it names.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Get a profile by user id.
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError>;

    /// Create or update the biometric fields (units, gender, age, weight, height, goal).
    async fn upsert_biometrics(&self, user_id: &str, profile: &UserProfile)
        -> Result<(), AppError>;

    /// Create or replace the embedded workout routine.
    async fn upsert_workout_routine(
        &self,
        user_id: &str,
        routine: &WeeklyPlan,
        updated_at: &str,
    ) -> Result<(), AppError>;

    /// Null out the workout routine of an existing record. Never deletes the record.
    async fn clear_workout_routine(&self, user_id: &str) -> Result<(), AppError>;

    /// Create or update the selected subscription plan.
    async fn upsert_selected_plan(&self, user_id: &str, plan_id: &str) -> Result<(), AppError>;
}
