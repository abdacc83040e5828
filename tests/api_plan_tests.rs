// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan generation, deletion, day detail and plan selection over HTTP.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use nextgen_fit::cache::{keys, LocalCache};
use nextgen_fit::services::gemini::BackendError;
use nextgen_fit::services::persistence::RemoteWritePolicy;
use nextgen_fit::services::PersistencePolicy;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, create_test_app_with, ScriptedBackend};

/// Device every request in these tests comes from.
const DEVICE: &str = "tab-1";

fn generate_request(token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/plan/generate")
        .header("X-Device-Id", DEVICE)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("GET")
        .uri(uri)
        .header("X-Device-Id", DEVICE);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_anonymous_generation_stays_local() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(generate_request(None, json!({"trainingDays": 4})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["model"], "model-a");
    assert_eq!(body["complete"], true);
    assert_eq!(body["plan"]["days"][0]["day_name"], "Montag");
    assert_eq!(body["plan"]["days"][6]["day_name"], "Sonntag");
    assert_eq!(body["saved"]["local"]["status"], "written");
    assert_eq!(body["saved"]["remote"]["status"], "skipped");
    assert!(body["warning"].is_null());

    // Anonymous sessions never reach the profile store.
    assert_eq!(app.store.write_count(), 0);
    assert_eq!(app.store.read_count(), 0);
    let cached = app
        .cache
        .get(&format!("{}.{}", DEVICE, keys::WORKOUT_ROUTINE))
        .await
        .unwrap();
    assert!(cached.is_some());
}

#[tokio::test]
async fn test_authenticated_generation_saves_remotely() {
    let app = create_test_app();
    let token = common::create_test_jwt("user-1", &app.state.config.jwt_signing_key);

    let response = app
        .router
        .clone()
        .oneshot(generate_request(Some(&token), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["saved"]["remote"]["status"], "written");

    let record = app.store.snapshot("user-1").unwrap();
    let routine = record.workout_routine.unwrap();
    assert_eq!(routine.days.len(), 7);
    assert!(record.updated_at.is_some());
}

#[tokio::test]
async fn test_remote_failure_reports_local_only_save() {
    let app = create_test_app();
    app.store.set_offline(true);
    let token = common::create_test_jwt("user-1", &app.state.config.jwt_signing_key);

    let response = app
        .router
        .clone()
        .oneshot(generate_request(Some(&token), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["saved"]["local"]["status"], "written");
    assert_eq!(body["saved"]["remote"]["status"], "failed");
    assert_eq!(body["warning"], "Saved locally only");
}

#[tokio::test]
async fn test_strict_policy_fails_on_remote_error() {
    let config = nextgen_fit::config::Config::test_default();
    let backend = ScriptedBackend::new().respond(
        &config.gemini_models[0],
        Ok(common::seven_day_plan_json()),
    );
    let app = create_test_app_with(
        backend,
        PersistencePolicy {
            remote_writes: RemoteWritePolicy::Strict,
            ..Default::default()
        },
    );
    app.store.set_offline(true);
    let token = common::create_test_jwt("user-1", &config.jwt_signing_key);

    let response = app
        .router
        .clone()
        .oneshot(generate_request(Some(&token), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "remote_write_failed");
}

#[tokio::test]
async fn test_fallback_to_second_model() {
    let backend = ScriptedBackend::new()
        .respond("model-a", Err(BackendError::new(Some(404), "gone")))
        .respond("model-b", Ok(common::seven_day_plan_json()));
    let app = create_test_app_with(backend, PersistencePolicy::default());

    let response = app
        .router
        .clone()
        .oneshot(generate_request(None, json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["model"], "model-b");
    assert_eq!(app.backend.calls(), vec!["model-a", "model-b"]);
}

#[tokio::test]
async fn test_quota_error_surfaces_with_hint() {
    let backend = ScriptedBackend::new()
        .respond("model-a", Err(BackendError::new(Some(429), "RESOURCE_EXHAUSTED")))
        .respond("model-b", Err(BackendError::new(Some(500), "internal")));
    let app = create_test_app_with(backend, PersistencePolicy::default());

    let response = app
        .router
        .clone()
        .oneshot(generate_request(None, json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[header::RETRY_AFTER], "60");
    let body = body_json(response).await;
    assert_eq!(body["error"], "quota_exceeded");
    assert!(body["hint"].as_str().unwrap().contains("quota"));
    // Nothing saved on failure.
    assert!(app.cache.is_empty());
}

#[tokio::test]
async fn test_malformed_model_output_is_not_saved() {
    let backend = ScriptedBackend::new().respond("model-a", Ok("Here is your plan!".to_string()));
    let app = create_test_app_with(backend, PersistencePolicy::default());

    let response = app
        .router
        .clone()
        .oneshot(generate_request(None, json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"], "malformed_response");
    // Parse failures are not retried against other models.
    assert_eq!(app.backend.calls(), vec!["model-a"]);
    assert!(app.cache.is_empty());
}

#[tokio::test]
async fn test_invalid_preferences_rejected() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(generate_request(None, json!({"trainingDays": 9})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .router
        .clone()
        .oneshot(generate_request(
            None,
            json!({"extraConstraints": "x".repeat(101)}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.backend.calls().is_empty());
}

#[tokio::test]
async fn test_day_detail_and_redirects() {
    let app = create_test_app();

    // No plan yet.
    let response = app
        .router
        .clone()
        .oneshot(get("/api/plan/days/0", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");

    app.router
        .clone()
        .oneshot(generate_request(None, json!({})))
        .await
        .unwrap();

    let response = app
        .router
        .clone()
        .oneshot(get("/api/plan/days/2", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["index"], 2);
    assert_eq!(body["day"]["day_name"], "Mittwoch");
    assert_eq!(body["day"]["exercises"][0]["sets"], "3");

    for bad in ["7", "9", "-1", "abc"] {
        let response = app
            .router
            .clone()
            .oneshot(get(&format!("/api/plan/days/{}", bad), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "index {}", bad);
    }
}

#[tokio::test]
async fn test_delete_plan_clears_both_stores() {
    let app = create_test_app();
    let token = common::create_test_jwt("user-1", &app.state.config.jwt_signing_key);

    app.router
        .clone()
        .oneshot(generate_request(Some(&token), json!({})))
        .await
        .unwrap();
    assert!(app.store.snapshot("user-1").unwrap().workout_routine.is_some());

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/plan")
                .header("X-Device-Id", DEVICE)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Record stays, routine is gone.
    let record = app.store.snapshot("user-1").unwrap();
    assert!(record.workout_routine.is_none());
    assert!(app
        .cache
        .get(&format!("{}.{}", DEVICE, keys::WORKOUT_ROUTINE))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_select_plan_requires_sign_in() {
    let app = create_test_app();
    let request = |token: Option<&str>| {
        let mut builder = Request::builder()
            .method("PUT")
            .uri("/api/plan/selection")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder
            .body(Body::from(json!({"plan_id": "pro"}).to_string()))
            .unwrap()
    };

    let response = app.router.clone().oneshot(request(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = common::create_test_jwt("user-2", &app.state.config.jwt_signing_key);
    let response = app
        .router
        .clone()
        .oneshot(request(Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        app.store.snapshot("user-2").unwrap().selected_plan.as_deref(),
        Some("pro")
    );
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(get("/api/profile", Some("not-a-jwt")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "invalid_token");
}

#[tokio::test]
async fn test_health_is_public() {
    let app = create_test_app();

    let response = app.router.clone().oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["models"], json!(["model-a", "model-b"]));
}
