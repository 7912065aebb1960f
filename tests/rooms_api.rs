use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use elmo_back::{
    ai::canned::CannedGenerator,
    config::AppConfig,
    dao::room_store::memory::MemoryRoomStore,
    routes,
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app(generator: CannedGenerator) -> Router {
    let state = AppState::new(
        Arc::new(MemoryRoomStore::new()),
        Arc::new(generator),
        AppConfig::default(),
    );
    routes::router(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn room_lifecycle_over_http() {
    let app = app(CannedGenerator::new().with_question("What went well this week?"));

    let (status, user) = send(&app, Method::POST, "/users", Some(json!({ "user_name": "Ann" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = user["id"].as_str().unwrap().to_owned();

    let (status, room) = send(&app, Method::POST, "/rooms", Some(json!({ "title": "Weekly sync" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(room["status"], "not started");
    let room_id = room["id"].as_str().unwrap().to_owned();

    let membership = json!({ "room_id": room_id, "user_id": user_id });
    let (status, _) = send(&app, Method::POST, "/participants", Some(membership.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, Method::POST, "/participants", Some(membership)).await;
    assert_eq!(status, StatusCode::OK);

    let start = format!("/rooms/{room_id}/start");
    let (status, started) = send(&app, Method::POST, &start, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["initial_question"], "What went well this week?");
    assert_eq!(started["room_info"]["status"], "inprogress");
    assert_eq!(started["participants"][0]["name"], "Ann");

    let (status, error) = send(&app, Method::GET, &start, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["message"].is_string());

    let sorena = format!("/rooms/{room_id}/sorena");
    let (status, _) = send(&app, Method::POST, &sorena, Some(json!({ "user_id": user_id, "count": 0 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, Method::POST, &sorena, Some(json!({ "user_id": user_id, "count": 3 }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/rooms/{room_id}/summary"),
        Some(json!({ "logs": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, result) = send(&app, Method::GET, &format!("/rooms/{room_id}/result"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["room_info"]["title"], "Weekly sync");
    assert_eq!(result["sorena_summary"]["total_count"], 3);
    assert_eq!(result["sorena_summary"]["participants"][0]["user_name"], "Ann");
    assert_eq!(result["chat_logs"], json!([]));

    let status_uri = format!("/rooms/{room_id}/status");
    let (status, _) = send(&app, Method::PUT, &status_uri, Some(json!({ "status": "closed" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, Method::PUT, &status_uri, Some(json!({ "status": "done" }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, room) = send(&app, Method::GET, &format!("/rooms/{room_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(room["status"], "done");
}

#[tokio::test]
async fn malformed_json_uses_error_body() {
    let app = app(CannedGenerator::new());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/rooms")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"].as_str().unwrap().starts_with("bad request"));
}

#[tokio::test]
async fn unknown_room_is_not_found() {
    let app = app(CannedGenerator::new());
    for uri in ["/rooms/nope00", "/rooms/nope00/result"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn generator_failure_is_service_unavailable() {
    let app = app(CannedGenerator::new().failing("quota exceeded"));
    let (_, room) = send(&app, Method::POST, "/rooms", Some(json!({ "title": "Retro" }))).await;
    let room_id = room["id"].as_str().unwrap();

    let (status, body) = send(&app, Method::POST, &format!("/rooms/{room_id}/start"), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(!body["message"].as_str().unwrap().contains("quota"));

    let (_, room) = send(&app, Method::GET, &format!("/rooms/{room_id}"), None).await;
    assert_eq!(room["status"], "not started");
}

#[tokio::test]
async fn healthcheck_reports_ok() {
    let app = app(CannedGenerator::new());
    let (status, body) = send(&app, Method::GET, "/healthcheck", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn rejected_transition_message_uses_plain_words() {
    let app = app(CannedGenerator::new());
    let (_, room) = send(&app, Method::POST, "/rooms", Some(json!({ "title": "Retro" }))).await;
    let room_id = room["id"].as_str().unwrap();

    let uri = format!("/rooms/{room_id}/status");
    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "status": "done" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "bad request: cannot mark as done a room whose status is \"not started\""
    );
}

#[tokio::test]
async fn oversized_sorena_count_is_rejected() {
    let app = app(CannedGenerator::new());
    let (_, user) = send(&app, Method::POST, "/users", Some(json!({ "user_name": "Ann" }))).await;
    let (_, room) = send(&app, Method::POST, "/rooms", Some(json!({ "title": "Retro" }))).await;
    let room_id = room["id"].as_str().unwrap();

    let uri = format!("/rooms/{room_id}/sorena");
    let body = json!({ "user_id": user["id"], "count": i64::MAX });
    let (status, _) = send(&app, Method::POST, &uri, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, result) = send(&app, Method::GET, &format!("/rooms/{room_id}/result"), None).await;
    assert_eq!(result["sorena_summary"]["total_count"], 0);
}
