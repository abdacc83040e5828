// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use nextgen_fit::cache::MemoryCache;
use nextgen_fit::config::Config;
use nextgen_fit::db::{FirestoreDb, MemoryProfileStore};
use nextgen_fit::routes::create_router;
use nextgen_fit::services::{BackendError, GenerationBackend, PersistencePolicy, PlanGenerator};
use nextgen_fit::AppState;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Backend with a fixed answer per model. Unknown models answer 404.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScriptedBackend {
    responses: Mutex<HashMap<String, Result<String, BackendError>>>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, model: &str, result: Result<String, BackendError>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(model.to_string(), result);
        self
    }

    /// Models called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, model: &str, _prompt: &str) -> Result<String, BackendError> {
        self.calls.lock().unwrap().push(model.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(model)
            .cloned()
            .unwrap_or_else(|| Err(BackendError::new(Some(404), "model not found")))
    }
}

/// Seven-day plan as the model would return it.
#[allow(dead_code)]
pub fn seven_day_plan_json() -> String {
    let days: Vec<_> = (0..7)
        .map(|i| {
            if i % 2 == 0 {
                json!({
                    "title": format!("Ganzkörper {}", i + 1),
                    "desc": "Kraft",
                    "exercises": [{"name": "Kniebeuge", "sets": 3, "reps": "10"}]
                })
            } else {
                json!({"title": "Ruhetag", "desc": "Erholung", "exercises": []})
            }
        })
        .collect();
    serde_json::Value::Array(days).to_string()
}

/// App wired to in-memory stores and a scripted backend.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryProfileStore>,
    pub cache: Arc<MemoryCache>,
    pub backend: Arc<ScriptedBackend>,
}

/// Create a test app whose first model returns a valid plan.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let config = Config::test_default();
    let backend = ScriptedBackend::new().respond(&config.gemini_models[0], Ok(seven_day_plan_json()));
    create_test_app_with(backend, PersistencePolicy::default())
}

#[allow(dead_code)]
pub fn create_test_app_with(backend: ScriptedBackend, policy: PersistencePolicy) -> TestApp {
    let config = Config::test_default();
    let store = Arc::new(MemoryProfileStore::new());
    let cache = Arc::new(MemoryCache::new());
    let backend = Arc::new(backend);

    let generator = PlanGenerator::new(
        backend.clone(),
        config.gemini_models.clone(),
        config.generation_timeout,
    );

    let state = Arc::new(AppState {
        config,
        db: store.clone(),
        cache: cache.clone(),
        generator,
        persistence_policy: policy,
        shutdown: CancellationToken::new(),
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        cache,
        backend,
    }
}

/// Create a test JWT for a user.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    nextgen_fit::middleware::auth::create_jwt(user_id, signing_key).unwrap()
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
