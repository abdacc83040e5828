// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-local profile store.
//!
//! Mirrors the field-mask semantics of the Firestore store. Counts every
//! call and can be switched offline, which makes it the store of choice for
//! local development and for tests of the persistence paths.

use super::ProfileStore;
use crate::error::AppError;
use crate::models::{UserProfile, WeeklyPlan};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: DashMap<String, UserProfile>,
    offline: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When offline, every operation fails like an unreachable database.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of read calls made so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of write calls made so far (including failed ones).
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw record access, bypassing counters.
    pub fn snapshot(&self, user_id: &str) -> Option<UserProfile> {
        self.profiles.get(user_id).map(|p| p.clone())
    }

    /// Seed a record, bypassing counters.
    pub fn insert(&self, user_id: &str, profile: UserProfile) {
        self.profiles.insert(user_id.to_string(), profile);
    }

    fn check_online(&self) -> Result<(), AppError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Database(
                "Profile store unavailable (offline)".to_string(),
            ));
        }
        Ok(())
    }

    fn write(&self, user_id: &str, apply: impl FnOnce(&mut UserProfile)) -> Result<(), AppError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let mut entry = self
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile {
                user_id: Some(user_id.to_string()),
                ..Default::default()
            });
        apply(entry.value_mut());
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.snapshot(user_id))
    }

    async fn upsert_biometrics(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<(), AppError> {
        self.write(user_id, |record| {
            record.units = profile.units;
            record.gender = profile.gender.clone();
            record.age = profile.age;
            record.weight = profile.weight;
            record.height = profile.height;
            record.goal = profile.goal.clone();
        })
    }

    async fn upsert_workout_routine(
        &self,
        user_id: &str,
        routine: &WeeklyPlan,
        updated_at: &str,
    ) -> Result<(), AppError> {
        self.write(user_id, |record| {
            record.workout_routine = Some(routine.clone());
            record.updated_at = Some(updated_at.to_string());
        })
    }

    async fn clear_workout_routine(&self, user_id: &str) -> Result<(), AppError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        if let Some(mut record) = self.profiles.get_mut(user_id) {
            record.workout_routine = None;
        }
        Ok(())
    }

    async fn upsert_selected_plan(&self, user_id: &str, plan_id: &str) -> Result<(), AppError> {
        self.write(user_id, |record| {
            record.selected_plan = Some(plan_id.to_string());
        })
    }
}
