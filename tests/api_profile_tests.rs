// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Onboarding and profile reads over HTTP.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use nextgen_fit::models::{Goal, UserProfile};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app};

fn onboarding_form() -> serde_json::Value {
    json!({
        "units": "metric",
        "gender": "Weiblich",
        "age": "31",
        "weight": "64,5",
        "height": "170",
        "goal": "endurance"
    })
}

fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    device: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    if let Some(device) = device {
        builder = builder.header("X-Device-Id", device);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn test_unknown_user_has_no_profile() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/profile", None, None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["profile"].is_null());
    assert_eq!(body["has_routine"], false);
}

#[tokio::test]
async fn test_anonymous_onboarding_is_read_back_from_device() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/api/onboarding",
            None,
            Some("phone"),
            Some(onboarding_form()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["saved"]["remote"]["status"], "skipped");
    assert_eq!(app.store.write_count(), 0);

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/profile", None, Some("phone"), None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["profile"]["age"], 31);
    assert_eq!(body["profile"]["weight"], 64.5);
    assert_eq!(body["profile"]["goal"], "endurance");

    // Another device does not see it.
    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/profile", None, Some("laptop"), None))
        .await
        .unwrap();
    assert!(body_json(response).await["profile"].is_null());
}

#[tokio::test]
async fn test_authenticated_onboarding_writes_biometrics() {
    let app = create_test_app();
    let token = common::create_test_jwt("user-9", &app.state.config.jwt_signing_key);

    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/api/onboarding",
            Some(&token),
            None,
            Some(onboarding_form()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let record = app.store.snapshot("user-9").unwrap();
    assert_eq!(record.age, Some(31));
    assert_eq!(record.height, Some(170.0));
    assert_eq!(record.goal, Some(Goal::Endurance));
    assert!(record.workout_routine.is_none());
}

#[tokio::test]
async fn test_incomplete_onboarding_rejected() {
    let app = create_test_app();
    let mut form = onboarding_form();
    form["age"] = json!("");

    let response = app
        .router
        .clone()
        .oneshot(request("POST", "/api/onboarding", None, None, Some(form)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.cache.is_empty());
}

#[tokio::test]
async fn test_remote_fields_win_and_local_routine_is_grafted() {
    let app = create_test_app();
    let token = common::create_test_jwt("user-3", &app.state.config.jwt_signing_key);

    // Generate while the store is down: routine lands in the cache only.
    app.store.set_offline(true);
    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/api/plan/generate",
            Some(&token),
            Some("phone"),
            Some(json!({})),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["warning"], "Saved locally only");
    app.store.set_offline(false);

    app.store.insert(
        "user-3",
        UserProfile {
            user_id: Some("user-3".to_string()),
            age: Some(52),
            ..Default::default()
        },
    );

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/profile", Some(&token), Some("phone"), None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["profile"]["age"], 52);
    assert_eq!(body["has_routine"], true);

    // Merge-on-read leaves the stored record untouched.
    assert!(app.store.snapshot("user-3").unwrap().workout_routine.is_none());
}

#[tokio::test]
async fn test_clients_without_device_id_do_not_share_cache() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(request(
            "POST",
            "/api/onboarding",
            None,
            None,
            Some(onboarding_form()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers()[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("nextgen_device="));

    // A different client with no device id sees nothing.
    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/profile", None, None, None))
        .await
        .unwrap();
    assert!(body_json(response).await["profile"].is_null());

    // A signed-in user on yet another fresh client gets no foreign routine either.
    let token = common::create_test_jwt("victim", &app.state.config.jwt_signing_key);
    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/profile", Some(&token), None, None))
        .await
        .unwrap();
    assert!(body_json(response).await["profile"].is_null());

    // The first client finds its data again by presenting the issued cookie.
    let device_cookie = cookie.split(';').next().unwrap().to_string();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/profile")
                .header(header::COOKIE, device_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_json(response).await["profile"]["age"], 31);
}

#[tokio::test]
async fn test_write_back_never_copies_another_clients_routine() {
    use nextgen_fit::services::persistence::ReconcilePolicy;
    use nextgen_fit::services::PersistencePolicy;

    let config = nextgen_fit::config::Config::test_default();
    let backend = common::ScriptedBackend::new()
        .respond(&config.gemini_models[0], Ok(common::seven_day_plan_json()));
    let app = common::create_test_app_with(
        backend,
        PersistencePolicy {
            reconcile: ReconcilePolicy::WriteBack,
            ..Default::default()
        },
    );

    // Anonymous client without a device id generates a plan.
    let response = app
        .router
        .clone()
        .oneshot(request("POST", "/api/plan/generate", None, None, Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    app.store.insert(
        "victim",
        UserProfile {
            user_id: Some("victim".to_string()),
            ..Default::default()
        },
    );
    let token = common::create_test_jwt("victim", &config.jwt_signing_key);
    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/profile", Some(&token), None, None))
        .await
        .unwrap();

    assert_eq!(body_json(response).await["has_routine"], false);
    assert!(app.store.snapshot("victim").unwrap().workout_routine.is_none());
}
