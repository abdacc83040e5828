// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dual-store persistence: device-local cache plus remote profile store.
//!
//! The local cache is always written first. The remote write only happens
//! for authenticated users, and its outcome is reported separately so the
//! caller can tell a full save from a local-only one.

use crate::cache::{keys, LocalCache};
use crate::db::ProfileStore;
use crate::error::AppError;
use crate::models::{UserProfile, WeeklyPlan};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Warning attached to a save whose remote half failed.
pub const LOCAL_ONLY_WARNING: &str = "Saved locally only";

/// Default age for a profile assembled only from local data.
const FALLBACK_AGE: u32 = 25;

/// How remote write failures affect the overall result. Applies to every
/// write that has a local counterpart (routine save, onboarding save,
/// routine delete).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteWritePolicy {
    /// Log and report the failure; the operation still succeeds.
    #[default]
    BestEffort,
    /// The operation fails with `RemoteWriteFailed`.
    Strict,
}

impl RemoteWritePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "best_effort" | "best-effort" => Some(Self::BestEffort),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// What to do when a remote profile lacks a routine the local cache has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePolicy {
    /// Graft the local routine into the returned profile only.
    #[default]
    MergeOnRead,
    /// Graft it and also write it back to the remote store.
    WriteBack,
}

impl ReconcilePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "merge_on_read" | "merge-on-read" => Some(Self::MergeOnRead),
            "write_back" | "write-back" => Some(Self::WriteBack),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistencePolicy {
    pub remote_writes: RemoteWritePolicy,
    pub reconcile: ReconcilePolicy,
}

/// Outcome of one half of a dual write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum WriteStatus {
    Written,
    /// Not attempted (anonymous session)
    Skipped,
    Failed(String),
}

impl WriteStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, WriteStatus::Failed(_))
    }
}

/// Which stores a write reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub local: WriteStatus,
    pub remote: WriteStatus,
}

impl SaveOutcome {
    /// User-facing warning for a partial save.
    pub fn warning(&self) -> Option<&'static str> {
        self.remote.is_failed().then_some(LOCAL_ONLY_WARNING)
    }
}

pub struct PersistenceCoordinator {
    cache: Arc<dyn LocalCache>,
    store: Arc<dyn ProfileStore>,
    policy: PersistencePolicy,
    clock: fn() -> DateTime<Utc>,
}

impl PersistenceCoordinator {
    pub fn new(
        cache: Arc<dyn LocalCache>,
        store: Arc<dyn ProfileStore>,
        policy: PersistencePolicy,
    ) -> Self {
        Self {
            cache,
            store,
            policy,
            clock: Utc::now,
        }
    }

    /// Replace the clock used for `updated_at` stamps.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> String {
        (self.clock)().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    // ─── Workout Routine ─────────────────────────────────────────

    /// Save a routine locally, then (for signed-in users) remotely.
    pub async fn save_workout_routine(
        &self,
        user_id: Option<&str>,
        plan: &WeeklyPlan,
    ) -> Result<SaveOutcome, AppError> {
        let local = self.write_local(keys::WORKOUT_ROUTINE, plan).await;

        let Some(user_id) = user_id else {
            tracing::debug!("Anonymous session, routine kept in local cache only");
            return Ok(SaveOutcome {
                local,
                remote: WriteStatus::Skipped,
            });
        };

        let remote = match self
            .store
            .upsert_workout_routine(user_id, plan, &self.now())
            .await
        {
            Ok(()) => {
                tracing::info!(user_id, days = plan.days.len(), "Routine saved");
                WriteStatus::Written
            }
            Err(e) => self.remote_failure(user_id, "save routine", e)?,
        };

        Ok(SaveOutcome { local, remote })
    }

    /// Remove the routine locally and null it remotely. The profile record stays.
    pub async fn delete_user_plan(&self, user_id: Option<&str>) -> Result<SaveOutcome, AppError> {
        let local = match self.cache.remove(keys::WORKOUT_ROUTINE).await {
            Ok(()) => WriteStatus::Written,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to clear cached routine");
                WriteStatus::Failed(e.to_string())
            }
        };

        let Some(user_id) = user_id else {
            return Ok(SaveOutcome {
                local,
                remote: WriteStatus::Skipped,
            });
        };

        let remote = match self.store.clear_workout_routine(user_id).await {
            Ok(()) => {
                tracing::info!(user_id, "Routine deleted");
                WriteStatus::Written
            }
            Err(e) => self.remote_failure(user_id, "delete routine", e)?,
        };

        Ok(SaveOutcome { local, remote })
    }

    // ─── Onboarding & Plan Selection ─────────────────────────────

    /// Save onboarding biometrics locally, then (for signed-in users) remotely.
    pub async fn save_onboarding_data(
        &self,
        user_id: Option<&str>,
        profile: &UserProfile,
    ) -> Result<SaveOutcome, AppError> {
        let snapshot = UserProfile {
            user_id: None,
            workout_routine: None,
            ..profile.clone()
        };
        let local = self.write_local(keys::PROFILE_SNAPSHOT, &snapshot).await;

        let Some(user_id) = user_id else {
            return Ok(SaveOutcome {
                local,
                remote: WriteStatus::Skipped,
            });
        };

        let remote = match self.store.upsert_biometrics(user_id, &snapshot).await {
            Ok(()) => WriteStatus::Written,
            Err(e) => self.remote_failure(user_id, "save onboarding", e)?,
        };

        Ok(SaveOutcome { local, remote })
    }

    /// Record the chosen subscription plan. Has no local fallback, so it
    /// needs a signed-in user and fails if the remote write fails.
    pub async fn save_selected_plan(
        &self,
        user_id: Option<&str>,
        plan_id: &str,
    ) -> Result<(), AppError> {
        let user_id = user_id.ok_or(AppError::Unauthorized)?;
        self.store
            .upsert_selected_plan(user_id, plan_id)
            .await
            .map_err(|e| {
                tracing::error!(user_id, error = %e, "Failed to save selected plan");
                AppError::RemoteWriteFailed(e.to_string())
            })
    }

    // ─── Reads ───────────────────────────────────────────────────

    /// Current profile, merged from the remote record and the local cache.
    ///
    /// Remote fields win; the routine comes from whichever store has one.
    pub async fn get_user_profile(
        &self,
        user_id: Option<&str>,
    ) -> Result<Option<UserProfile>, AppError> {
        let remote = match user_id {
            Some(user_id) => match self.store.get_profile(user_id).await {
                Ok(profile) => profile,
                Err(e) => {
                    tracing::warn!(user_id, error = %e, "Remote profile unavailable, using local data");
                    None
                }
            },
            None => None,
        };

        let local_routine: Option<WeeklyPlan> = self.read_local(keys::WORKOUT_ROUTINE).await;

        let mut profile = match remote {
            Some(profile) => profile,
            None => {
                let snapshot: Option<UserProfile> = self.read_local(keys::PROFILE_SNAPSHOT).await;
                match (snapshot, &local_routine) {
                    (Some(snapshot), _) => snapshot,
                    (None, Some(_)) => UserProfile::default(),
                    (None, None) => return Ok(None),
                }
            }
        };

        if profile.workout_routine.is_none() {
            if let Some(routine) = local_routine {
                if profile.age.is_none() {
                    profile.age = Some(FALLBACK_AGE);
                }
                if let (Some(user_id), ReconcilePolicy::WriteBack) =
                    (user_id, self.policy.reconcile)
                {
                    self.write_back(user_id, &routine).await;
                }
                profile.workout_routine = Some(routine);
            }
        }

        Ok(Some(profile))
    }

    // ─── Helpers ─────────────────────────────────────────────────

    async fn write_back(&self, user_id: &str, routine: &WeeklyPlan) {
        match self
            .store
            .upsert_workout_routine(user_id, routine, &self.now())
            .await
        {
            Ok(()) => tracing::info!(user_id, "Local routine written back to profile store"),
            Err(e) => tracing::warn!(user_id, error = %e, "Routine write-back failed"),
        }
    }

    /// Local write failures are reported, never fatal.
    async fn write_local<T: Serialize>(&self, key: &str, value: &T) -> WriteStatus {
        let result = match serde_json::to_string(value) {
            Ok(json) => self.cache.set(key, &json).await,
            Err(e) => Err(AppError::LocalCache(format!("Failed to serialize: {}", e))),
        };
        match result {
            Ok(()) => WriteStatus::Written,
            Err(e) => {
                tracing::warn!(key, error = %e, "Local cache write failed");
                WriteStatus::Failed(e.to_string())
            }
        }
    }

    /// Read and decode a cached value; unreadable entries count as absent.
    async fn read_local<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.cache.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "Local cache read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring unreadable cache entry");
                None
            }
        }
    }

    fn remote_failure(
        &self,
        user_id: &str,
        operation: &'static str,
        error: AppError,
    ) -> Result<WriteStatus, AppError> {
        match self.policy.remote_writes {
            RemoteWritePolicy::BestEffort => {
                tracing::warn!(user_id, operation, error = %error, "Remote write failed, kept local copy");
                Ok(WriteStatus::Failed(error.to_string()))
            }
            RemoteWritePolicy::Strict => {
                tracing::error!(user_id, operation, error = %error, "Remote write failed");
                Err(AppError::RemoteWriteFailed(error.to_string()))
            }
        }
    }
}
