//! Event scheduling and audit trail steps

use chrono::{DateTime, Utc};
use cucumber::{given, then, when};
use serde_json::{json, Value};

use crate::common::event_body;
use crate::features::support::TestWorld;

fn instant(value: &Value) -> DateTime<Utc> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .expect("RFC 3339 instant")
}

fn current_event(world: &TestWorld) -> &Value {
    world.event.as_ref().expect("No event in scenario")
}

async fn schedule(
    world: &mut TestWorld,
    profiles: &[String],
    title: &str,
    start: &str,
    end: &str,
    timezone: &str,
) {
    let ids: Vec<String> = profiles.iter().map(|name| world.profile_id(name)).collect();
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();

    let response = world
        .app()
        .await
        .post_json("/api/events", event_body(title, start, end, timezone, &ids))
        .await;
    world.record(response);
}

#[given(expr = "{string} has an event {string} from {string} to {string} in {string}")]
async fn existing_event(
    world: &mut TestWorld,
    profile: String,
    title: String,
    start: String,
    end: String,
    timezone: String,
) {
    schedule(world, &[profile], &title, &start, &end, &timezone).await;
    world.last_response().assert_status(axum::http::StatusCode::CREATED);
}

#[when(expr = "{string} schedules {string} from {string} to {string} in {string}")]
async fn schedule_event(
    world: &mut TestWorld,
    profile: String,
    title: String,
    start: String,
    end: String,
    timezone: String,
) {
    schedule(world, &[profile], &title, &start, &end, &timezone).await;
}

#[given(expr = "{string} and {string} share an event {string} from {string} to {string} in {string}")]
async fn schedule_shared_event(
    world: &mut TestWorld,
    first: String,
    second: String,
    title: String,
    start: String,
    end: String,
    timezone: String,
) {
    schedule(world, &[first, second], &title, &start, &end, &timezone).await;
}

#[when(expr = "{string} updates the event with {string}")]
async fn update_event(world: &mut TestWorld, editor: String, patch: String) {
    let mut body: Value = serde_json::from_str(&patch).expect("patch must be JSON");
    body["updatedBy"] = json!(editor);

    let uri = world.event_uri();
    let response = world.app().await.put_json(&uri, body).await;
    world.record(response);
}

#[when(expr = "the profiles are resubmitted as {string} and {string}")]
async fn resubmit_profiles(world: &mut TestWorld, first: String, second: String) {
    let body = json!({ "profiles": [world.profile_id(&first), world.profile_id(&second)] });

    let uri = world.event_uri();
    let response = world.app().await.put_json(&uri, body).await;
    world.record(response);
}

#[when("I delete the event")]
async fn delete_event(world: &mut TestWorld) {
    let uri = world.event_uri();
    let response = world.app().await.delete(&uri).await;
    world.last_response = Some(response);
}

#[when(expr = "I view the event in {string}")]
async fn view_event(world: &mut TestWorld, timezone: String) {
    let uri = format!("{}/display?timezone={}", world.event_uri(), timezone);
    let response = world.app().await.get(&uri).await;
    world.last_response = Some(response);
}

#[when("I fetch the event logs")]
async fn fetch_logs(world: &mut TestWorld) {
    let uri = format!("{}/logs", world.event_uri());
    let response = world.app().await.get(&uri).await;
    world.last_response = Some(response);
}

#[then(expr = "the event should start at {string}")]
async fn event_starts_at(world: &mut TestWorld, expected: String) {
    let expected = DateTime::parse_from_rfc3339(&expected)
        .expect("expected instant")
        .with_timezone(&Utc);
    assert_eq!(instant(&current_event(world)["startTime"]), expected);
}

#[then(expr = "the event should last {int} hour(s)")]
async fn event_lasts(world: &mut TestWorld, hours: i64) {
    let event = current_event(world);
    let duration = instant(&event["endTime"]) - instant(&event["startTime"]);
    assert_eq!(duration, chrono::Duration::hours(hours));
}

#[then(expr = "the displayed start should be {string} with abbreviation {string}")]
async fn displayed_start(world: &mut TestWorld, start: String, abbreviation: String) {
    let display: Value = world.last_response().json();
    assert_eq!(display["start"], json!(start));
    assert_eq!(display["abbreviation"], json!(abbreviation));
}

#[then(expr = "the event should have {int} log entry/entries")]
async fn log_count(world: &mut TestWorld, count: usize) {
    let uri = format!("{}/logs", world.event_uri());
    let response = world.app().await.get(&uri).await;
    response.assert_ok();

    let logs: Vec<Value> = response.json();
    assert_eq!(logs.len(), count);
}

#[then(expr = "the latest log entry by {string} should change {string} from {string} to {string}")]
async fn latest_log_entry(
    world: &mut TestWorld,
    editor: String,
    field: String,
    old_value: String,
    new_value: String,
) {
    let uri = format!("{}/logs", world.event_uri());
    let logs: Vec<Value> = world.app().await.get(&uri).await.json();
    let latest = logs.first().expect("at least one log entry");

    assert_eq!(latest["updatedBy"], json!(editor));
    let change = latest["changes"]
        .as_array()
        .and_then(|changes| changes.iter().find(|c| c["field"] == json!(field)))
        .unwrap_or_else(|| panic!("no change for {}", field));
    assert_eq!(change["oldValue"], json!(old_value));
    assert_eq!(change["newValue"], json!(new_value));
}
