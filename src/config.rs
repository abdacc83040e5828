// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; a `.env` file is honoured for local
//! development.

use crate::services::persistence::{ReconcilePolicy, RemoteWritePolicy};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODELS: &str = "gemini-2.5-flash,gemini-2.0-flash,gemini-1.5-flash";
const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 45;

/// Which backend holds user profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStoreKind {
    Firestore,
    /// Process-local store, for development without GCP credentials.
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Generation backend ---
    /// API key for the generative-language API
    pub gemini_api_key: String,
    /// Base URL of the generative-language API
    pub gemini_base_url: String,
    /// Ordered candidate model identifiers, tried first to last
    pub gemini_models: Vec<String>,
    /// Upper bound for a single candidate attempt
    pub generation_timeout: Duration,

    // --- Auth collaborator ---
    /// HS256 secret used to verify session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,

    // --- Storage ---
    pub profile_store: ProfileStoreKind,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Directory backing the local cache
    pub local_cache_dir: PathBuf,
    pub remote_write_policy: RemoteWritePolicy,
    pub reconcile_policy: ReconcilePolicy,

    // --- Server ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            gemini_api_key: "test_gemini_key".to_string(),
            gemini_base_url: "http://127.0.0.1:9".to_string(),
            gemini_models: vec!["model-a".to_string(), "model-b".to_string()],
            generation_timeout: Duration::from_secs(5),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            profile_store: ProfileStoreKind::Memory,
            gcp_project_id: "test-project".to_string(),
            local_cache_dir: PathBuf::from("data/test_cache"),
            remote_write_policy: RemoteWritePolicy::BestEffort,
            reconcile_policy: ReconcilePolicy::MergeOnRead,
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Test configuration; identical to `Config::default()`.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let gemini_models = parse_model_list(
            &env::var("GEMINI_MODELS").unwrap_or_else(|_| DEFAULT_GEMINI_MODELS.to_string()),
        )?;

        let generation_timeout_secs = match env::var("GENERATION_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    name: "GENERATION_TIMEOUT_SECS",
                    value: raw,
                })?,
            Err(_) => DEFAULT_GENERATION_TIMEOUT_SECS,
        };

        Ok(Self {
            gemini_api_key: env::var("GEMINI_API_KEY")
                .map(|v| v.trim().to_string())
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing("GEMINI_API_KEY"))?,
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            gemini_models,
            generation_timeout: Duration::from_secs(generation_timeout_secs),

            jwt_signing_key: env::var("AUTH_JWT_SECRET")
                .map_err(|_| ConfigError::Missing("AUTH_JWT_SECRET"))?
                .into_bytes(),

            profile_store: parse_store_kind(
                &env::var("PROFILE_STORE").unwrap_or_else(|_| "firestore".to_string()),
            )?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            local_cache_dir: env::var("LOCAL_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/local_cache")),
            remote_write_policy: parse_env_or("REMOTE_WRITE_POLICY", RemoteWritePolicy::parse)?
                .unwrap_or_default(),
            reconcile_policy: parse_env_or("RECONCILE_POLICY", ReconcilePolicy::parse)?
                .unwrap_or_default(),

            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }
}

/// Split a comma-separated model list, dropping blanks.
fn parse_model_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();

    if models.is_empty() {
        return Err(ConfigError::Invalid {
            name: "GEMINI_MODELS",
            value: raw.to_string(),
        });
    }
    Ok(models)
}

fn parse_store_kind(raw: &str) -> Result<ProfileStoreKind, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "firestore" => Ok(ProfileStoreKind::Firestore),
        "memory" => Ok(ProfileStoreKind::Memory),
        _ => Err(ConfigError::Invalid {
            name: "PROFILE_STORE",
            value: raw.to_string(),
        }),
    }
}

fn parse_env_or<T>(
    name: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse(&raw)
            .map(Some)
            .ok_or(ConfigError::Invalid { name, value: raw }),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
