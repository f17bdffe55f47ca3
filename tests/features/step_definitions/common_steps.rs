//! Common step definitions used across features

use cucumber::then;

use crate::features::support::TestWorld;

#[then(expr = "the response status should be {int}")]
async fn response_status(world: &mut TestWorld, status: u16) {
    world.last_response().assert_status(
        axum::http::StatusCode::from_u16(status).expect("valid status code"),
    );
}

#[then("the response should contain an error")]
async fn response_contains_error(world: &mut TestWorld) {
    let body: serde_json::Value = world.last_response().json();
    assert!(body.get("error").is_some());
}

#[then(expr = "the error message should mention {string}")]
async fn error_mentions(world: &mut TestWorld, text: String) {
    let body: serde_json::Value = world.last_response().json();
    let message = body["message"].as_str().unwrap_or_default();
    assert!(message.contains(&text), "message was {:?}", message);
}
