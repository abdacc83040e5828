// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device-local key-value cache.
//!
//! Holds the fallback copy of a user's data: the onboarding snapshot and the
//! most recent workout routine. Values are JSON strings.

pub mod file;
pub mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

use crate::error::AppError;
use async_trait::async_trait;
use std::sync::Arc;

/// Cache keys.
pub mod keys {
    /// Serialized `WeeklyPlan`
    pub const WORKOUT_ROUTINE: &str = "workout_routine";
    /// Serialized onboarding form snapshot
    pub const PROFILE_SNAPSHOT: &str = "user_profile_local";
}

/// String-keyed blob storage. Reads and writes are expected to be fast.
#[async_trait]
pub trait LocalCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// A view of a shared cache restricted to one device.
pub struct ScopedCache {
    inner: Arc<dyn LocalCache>,
    prefix: String,
}

impl ScopedCache {
    pub fn new(inner: Arc<dyn LocalCache>, device_id: &str) -> Self {
        Self {
            inner,
            prefix: format!("{}.", sanitize_scope(device_id)),
        }
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl LocalCache for ScopedCache {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        self.inner.get(&self.scoped(key)).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.inner.set(&self.scoped(key), value).await
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.inner.remove(&self.scoped(key)).await
    }
}

/// Keep scope identifiers filesystem- and key-safe.
fn sanitize_scope(device_id: &str) -> String {
    let cleaned: String = device_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(64)
        .collect();
    if cleaned.is_empty() {
        "default".to_string()
    } else {
        cleaned
    }
}
