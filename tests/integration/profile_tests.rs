//! Profile directory endpoints

use serde_json::{json, Value};

use crate::common::{profile_body, TestApp};

#[tokio::test]
async fn test_create_and_fetch_profile() {
    let app = TestApp::new().await;

    let response = app
        .post_json("/api/profiles", profile_body("Amy", "America/New_York"))
        .await;
    response.assert_created();

    let created: Value = response.json();
    assert_eq!(created["name"], "Amy");
    assert_eq!(created["timezone"], "America/New_York");
    assert!(created["createdAt"].is_string());

    let id = created["id"].as_str().unwrap();
    let fetched: Value = app.get(&format!("/api/profiles/{}", id)).await.json();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_profile_timezone_defaults_to_utc() {
    let app = TestApp::new().await;

    let response = app.post_json("/api/profiles", json!({ "name": "Amy" })).await;
    response.assert_created();
    assert_eq!(response.json::<Value>()["timezone"], "UTC");
}

#[tokio::test]
async fn test_duplicate_name_is_case_sensitive() {
    let app = TestApp::new().await;
    app.create_profile("Amy", "America/New_York").await;

    let response = app.post_json("/api/profiles", profile_body("Amy", "UTC")).await;
    response.assert_bad_request();
    let body: Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("already exists"));

    app.post_json("/api/profiles", profile_body("amy", "UTC"))
        .await
        .assert_created();
}

#[tokio::test]
async fn test_profile_validation_errors() {
    let app = TestApp::new().await;

    let response = app
        .post_json("/api/profiles", profile_body("A", "Mars/Olympus"))
        .await;
    response.assert_bad_request();

    let body: Value = response.json();
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"]["name"].is_array());
    assert!(body["details"]["timezone"].is_array());
}

#[tokio::test]
async fn test_list_profiles_newest_first() {
    let app = TestApp::new().await;
    app.create_profile("First", "UTC").await;
    app.create_profile("Second", "UTC").await;

    let response = app.get("/api/profiles").await;
    response.assert_ok();

    let profiles: Vec<Value> = response.json();
    let names: Vec<_> = profiles.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::new().await;
    let id = app.create_profile("Amy", "UTC").await;
    app.create_profile("Bob", "UTC").await;

    let response = app
        .put_json(
            &format!("/api/profiles/{}", id),
            json!({ "name": "Amy", "timezone": "Europe/Paris" }),
        )
        .await;
    response.assert_ok();
    assert_eq!(response.json::<Value>()["timezone"], "Europe/Paris");

    app.put_json(&format!("/api/profiles/{}", id), json!({ "name": "Bob" }))
        .await
        .assert_bad_request();

    app.put_json(&format!("/api/profiles/{}", id), json!({}))
        .await
        .assert_ok();
}

#[tokio::test]
async fn test_missing_and_malformed_profile_ids() {
    let app = TestApp::new().await;

    app.get(&format!("/api/profiles/{}", uuid::Uuid::new_v4()))
        .await
        .assert_not_found();
    app.put_json(
        &format!("/api/profiles/{}", uuid::Uuid::new_v4()),
        json!({ "name": "Ghost" }),
    )
    .await
    .assert_not_found();
    app.get("/api/profiles/not-a-uuid").await.assert_bad_request();
}
