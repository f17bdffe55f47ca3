//! Health and timezone catalogue endpoints

use crate::common::TestApp;

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let app = TestApp::new().await;
    let response = app.get("/api/health").await;

    response.assert_ok();

    let json: serde_json::Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_probe() {
    let app = TestApp::new().await;
    app.get("/api/health/ready").await.assert_ok();
}

#[tokio::test]
async fn test_timezone_catalogue() {
    let app = TestApp::new().await;
    let response = app.get("/api/timezones").await;
    response.assert_ok();

    let zones: Vec<serde_json::Value> = response.json();
    let new_york = zones
        .iter()
        .find(|z| z["value"] == "America/New_York")
        .expect("New York in catalogue");
    assert_eq!(new_york["region"], "Americas");
    let abbreviation = new_york["abbreviation"].as_str().unwrap();
    assert!(abbreviation == "EST" || abbreviation == "EDT");
}

#[tokio::test]
async fn test_zone_info_endpoint() {
    let app = TestApp::new().await;

    let response = app.get("/api/timezones/Asia/Tokyo").await;
    response.assert_ok();
    let info: serde_json::Value = response.json();
    assert_eq!(info["timezone"], "Asia/Tokyo");
    assert_eq!(info["abbreviation"], "JST");
    assert_eq!(info["utcOffset"], "+09:00");
    assert_eq!(info["dstActive"], false);

    app.get("/api/timezones/UTC").await.assert_ok();
    app.get("/api/timezones/Mars/Olympus").await.assert_bad_request();
}

#[tokio::test]
async fn test_every_catalogue_zone_is_reachable() {
    let app = TestApp::new().await;
    let zones: Vec<serde_json::Value> = app.get("/api/timezones").await.json();
    assert!(!zones.is_empty());

    for zone in &zones {
        let value = zone["value"].as_str().unwrap();
        let response = app.get(&format!("/api/timezones/{}", value)).await;
        response.assert_ok();
        assert_eq!(response.json::<serde_json::Value>()["timezone"], value);
    }

    app.get("/api/timezones/America/Indiana/Indianapolis")
        .await
        .assert_ok();
}
