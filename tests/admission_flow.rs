//! End-to-end admission tests against a running gatekeeper.

use std::time::Duration;

use serde_json::Value;

mod common;

async fn body_json(response: reqwest::Response) -> Value {
    response.json().await.expect("body should be JSON")
}

#[tokio::test]
async fn test_missing_token_rejected() {
    let gk = common::start_gatekeeper(|_| {}).await;
    common::seed_credential(&gk, "abc", &["127.0.0.1"], None, None).await;

    let response = common::client().get(gk.url("/status")).send().await.unwrap();
    assert_eq!(response.status(), 401);

    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "NO_TOKEN");
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn test_unknown_token_rejected() {
    let gk = common::start_gatekeeper(|_| {}).await;
    common::seed_credential(&gk, "abc", &["127.0.0.1"], None, None).await;

    let response = common::client()
        .get(gk.url("/status"))
        .header("Authorization", "Bearer nope")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_valid_credential_allowed_with_identity() {
    let gk = common::start_gatekeeper(|_| {}).await;
    common::seed_credential(&gk, "abc", &["127.0.0.1"], Some(5), None).await;

    let response = common::client()
        .get(gk.url("/status"))
        .header("Authorization", "Bearer abc")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data"]["identity"]["kind"], "personal");
    assert!(body["data"]["identity"]["id"].is_i64());
}

#[tokio::test]
async fn test_credential_quota_override_trips_sixth_request() {
    let gk = common::start_gatekeeper(|_| {}).await;
    common::seed_credential(&gk, "abc", &["127.0.0.1"], Some(5), None).await;

    let client = common::client();
    for i in 1..=5 {
        let response = client
            .get(gk.url("/ping"))
            .header("Authorization", "Bearer abc")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200, "request {i} should pass");
    }

    let sixth = client
        .get(gk.url("/ping"))
        .header("Authorization", "Bearer abc")
        .send()
        .await
        .unwrap();
    assert_eq!(sixth.status(), 429);
    assert_eq!(body_json(sixth).await["code"], "RATE_LIMIT");
}

#[tokio::test]
async fn test_address_binding_rejects_other_sources() {
    let gk = common::start_gatekeeper(|_| {}).await;
    // Only 10.0.0.1 may present this credential; the test client comes from
    // loopback.
    common::seed_credential(&gk, "abc", &["10.0.0.1"], None, None).await;

    let response = common::client()
        .get(gk.url("/status"))
        .header("Authorization", "Bearer abc")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_expired_credential_rejected() {
    let gk = common::start_gatekeeper(|_| {}).await;
    common::seed_credential(&gk, "abc", &["127.0.0.1"], None, Some(common::unix_now())).await;

    let response = common::client()
        .get(gk.url("/status"))
        .header("Authorization", "Bearer abc")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    assert_eq!(body_json(response).await["code"], "EXPIRED_TOKEN");
}

#[tokio::test]
async fn test_ip_guard_trips_before_authentication() {
    let gk = common::start_gatekeeper(|config| {
        config.security.ip_guard.max_requests = 2;
    })
    .await;
    common::seed_credential(&gk, "abc", &["127.0.0.1"], None, None).await;

    let client = common::client();
    for _ in 0..2 {
        let response = client
            .get(gk.url("/ping"))
            .header("Authorization", "Bearer abc")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    // Valid, currently-allowed credential; the guard still wins.
    let third = client
        .get(gk.url("/ping"))
        .header("Authorization", "Bearer abc")
        .send()
        .await
        .unwrap();
    assert_eq!(third.status(), 429);
    assert_eq!(body_json(third).await["code"], "IP_GUARD");
}

#[tokio::test]
async fn test_auth_disabled_passes_through_without_identity() {
    let gk = common::start_gatekeeper(|config| {
        config.security.auth.enabled = false;
    })
    .await;

    let response = common::client().get(gk.url("/status")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["data"]["identity"], Value::Null);
}

#[tokio::test]
async fn test_rate_limit_window_resets() {
    let gk = common::start_gatekeeper(|config| {
        config.security.auth.enabled = false;
        config.security.rate_limit.window_ms = 300;
        config.security.rate_limit.max_requests = 2;
    })
    .await;

    let client = common::client();
    for _ in 0..2 {
        assert_eq!(client.get(gk.url("/ping")).send().await.unwrap().status(), 200);
    }
    assert_eq!(client.get(gk.url("/ping")).send().await.unwrap().status(), 429);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(
        client.get(gk.url("/ping")).send().await.unwrap().status(),
        200,
        "a fresh window should open after the old one elapses"
    );
}

#[tokio::test]
async fn test_unknown_route_yields_not_found_envelope() {
    let gk = common::start_gatekeeper(|_| {}).await;
    common::seed_credential(&gk, "abc", &["127.0.0.1"], None, None).await;

    let response = common::client()
        .get(gk.url("/definitely-not-a-route"))
        .header("Authorization", "Bearer abc")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_reload_makes_new_credential_visible() {
    let gk = common::start_gatekeeper(|_| {}).await;
    common::seed_credential(&gk, "abc", &["127.0.0.1"], None, None).await;

    let client = common::client();
    let before = client
        .get(gk.url("/status"))
        .header("Authorization", "Bearer fresh")
        .send()
        .await
        .unwrap();
    assert_eq!(before.status(), 403);

    common::seed_credential(&gk, "fresh", &["127.0.0.1"], None, None).await;

    let after = client
        .get(gk.url("/status"))
        .header("Authorization", "Bearer fresh")
        .send()
        .await
        .unwrap();
    assert_eq!(after.status(), 200);
}

#[tokio::test]
async fn test_health_reports_enabled_stages() {
    let gk = common::start_gatekeeper(|config| {
        config.security.rate_limit.enabled = false;
    })
    .await;
    common::seed_credential(&gk, "abc", &["127.0.0.1"], None, None).await;

    let response = common::client()
        .get(gk.url("/health"))
        .header("Authorization", "Bearer abc")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body = body_json(response).await;
    assert_eq!(body["data"]["features"]["auth"], true);
    assert_eq!(body["data"]["features"]["rate_limit"], false);
    assert_eq!(body["data"]["credentials_cached"], 1);
}
