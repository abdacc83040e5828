// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! NextGen Fit: personalised weekly workout plans.
//!
//! This crate provides the backend API that turns a user's biometric
//! profile into a generated 7-day training plan and keeps that plan in
//! the profile store and the device-local cache.

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use cache::LocalCache;
use config::Config;
use db::ProfileStore;
use services::{PersistencePolicy, PlanGenerator};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn ProfileStore>,
    pub cache: Arc<dyn LocalCache>,
    pub generator: PlanGenerator,
    pub persistence_policy: PersistencePolicy,
    /// Cancelled on shutdown; in-flight generations stop at the next boundary.
    pub shutdown: CancellationToken,
}
