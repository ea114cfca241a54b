use std::path::PathBuf;

use api::{CorsConfig, router};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use coach_core::time::fixed_now;
use serde_json::{Value, json};
use services::{AppServices, Clock};
use tower::ServiceExt;

fn public_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../public")
}

fn app() -> Router {
    router(
        AppServices::in_memory(Clock::fixed(fixed_now())),
        &public_dir(),
        &CorsConfig::default(),
    )
}

async fn sqlite_app(name: &str) -> Router {
    let url = format!("sqlite:file:memdb_api_{name}?mode=memory&cache=shared");
    let services = AppServices::new_sqlite(&url, Clock::fixed(fixed_now()))
        .await
        .unwrap();
    router(services, &public_dir(), &CorsConfig::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_coach(app: &Router, name: &str) -> u64 {
    let (status, body) = send(app, Method::POST, "/api/coaches", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_u64().unwrap()
}

#[tokio::test]
async fn coach_crud_roundtrip() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/coaches",
        Some(json!({ "name": "  Ada ", "email": "ADA@coachtrack.com", "phone": "+221 77 000 1111" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["email"], "ada@coachtrack.com");
    assert_eq!(body["message"], "Coach created successfully");
    assert_eq!(body["created_at"], "2023-11-14T22:13:20.000Z");
    let id = body["id"].as_u64().unwrap();

    let (status, body) = send(&app, Method::POST, "/api/coaches", Some(json!({ "name": "Ada" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Ada"));

    let (status, body) = send(&app, Method::GET, &format!("/api/coaches/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone"], "+221 77 000 1111");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/coaches/{id}"),
        Some(json!({ "name": "Ada Lovelace", "phone": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada Lovelace");
    assert_eq!(body["phone"], Value::Null);

    create_coach(&app, "Bea").await;
    let (_, body) = send(&app, Method::GET, "/api/coaches", None).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Ada Lovelace", "Bea"]);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/coaches/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Coach deleted successfully");

    let (status, body) = send(&app, Method::GET, &format!("/api/coaches/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Coach not found");
    let (status, _) = send(&app, Method::GET, &format!("/api/coaches/{id}/progress"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_input_is_rejected_with_400() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/api/coaches", Some(json!({ "name": "A" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::POST, "/api/coaches", Some(json!({ "email": "x@y.com" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/coaches/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid coach id");

    let (status, _) = send(&app, Method::GET, "/api/sessions/0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = create_coach(&app, "Ada").await;
    let uri = format!("/api/coaches/{id}/sessions");
    for bad in [
        json!({ "date": "2023-11-01", "equipment": "mat", "type": "practice", "hours": 0.3 }),
        json!({ "date": "2023-11-01", "equipment": "mat", "type": "practice", "hours": 25 }),
        json!({ "date": "2023-11-01", "equipment": "bike", "type": "practice", "hours": 1 }),
        json!({ "date": "2023-11-01", "equipment": "mat", "type": "teaching", "hours": 1 }),
        json!({ "date": "2099-01-01", "equipment": "mat", "type": "practice", "hours": 1 }),
        json!({ "date": "yesterday", "equipment": "mat", "type": "practice", "hours": 1 }),
        json!({ "date": "2023-11-01", "equipment": "mat", "type": "practice", "hours": 1, "notes": "x".repeat(501) }),
    ] {
        let (status, _) = send(&app, Method::POST, &uri, Some(bad.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{bad}");
    }
    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn sessions_feed_progress_and_summary() {
    let app = app();
    let id = create_coach(&app, "Ada").await;
    let uri = format!("/api/coaches/{id}/sessions");

    let (status, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({ "date": "2023-11-14", "equipment": "mat", "type": "practice", "hours": 1.5, "notes": "first" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["coach_id"], id);
    assert_eq!(body["date"], "2023-11-14");
    assert_eq!(body["type"], "practice");
    assert_eq!(body["hours"], 1.5);
    let session_id = body["id"].as_u64().unwrap();

    let (status, progress) = send(&app, Method::GET, &format!("/api/coaches/{id}/progress"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["mat"]["practice"], 1.5);
    assert_eq!(progress["mat"]["total"], 1.5);
    assert_eq!(progress["mat"]["practicePercentage"], 12.5);
    assert_eq!(progress["mat"]["totalPercentage"], 10.0);
    assert_eq!(progress["mat"]["objectives"], json!({ "practice": 12, "observation": 3, "total": 15 }));
    assert_eq!(progress["reformer"]["totalPercentage"], 0.0);
    assert_eq!(progress["chair"]["objectives"]["total"], 15);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/sessions/{session_id}"),
        Some(json!({ "type": "observation", "hours": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "observation");
    assert_eq!(body["notes"], "first");

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/sessions/{session_id}"),
        Some(json!({ "hours": 2.25 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, progress) = send(&app, Method::GET, &format!("/api/coaches/{id}/progress"), None).await;
    assert_eq!(progress["mat"]["observationPercentage"], 100.0);

    let (status, summary) = send(&app, Method::GET, &format!("/api/coaches/{id}/summary"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totalSessions"], 1);
    assert_eq!(summary["totalHours"], 3.0);
    assert_eq!(summary["byEquipment"]["mat"]["observation"], 3.0);

    let (status, body) = send(&app, Method::GET, &format!("/api/sessions/{session_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["equipment"], "mat");
}

#[tokio::test]
async fn deleting_sessions() {
    let app = app();
    let id = create_coach(&app, "Ada").await;
    let uri = format!("/api/coaches/{id}/sessions");

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 0);

    let mut ids = Vec::new();
    for day in ["2023-11-01", "2023-11-03", "2023-11-02"] {
        let (_, body) = send(
            &app,
            Method::POST,
            &uri,
            Some(json!({ "date": day, "equipment": "chair", "type": "practice", "hours": 1 })),
        )
        .await;
        ids.push(body["id"].as_u64().unwrap());
    }

    let (_, listed) = send(&app, Method::GET, &uri, None).await;
    let dates: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["date"].as_str().unwrap())
        .collect();
    assert_eq!(dates, ["2023-11-03", "2023-11-02", "2023-11-01"]);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/sessions/{}", ids[0]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Session deleted successfully");
    let (status, body) = send(&app, Method::DELETE, &format!("/api/sessions/{}", ids[0]), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Session not found");

    let (_, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(body["deletedCount"], 2);

    let (status, _) = send(&app, Method::DELETE, "/api/coaches/999/sessions", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/coaches/999/sessions",
        Some(json!({ "date": "2023-11-01", "equipment": "mat", "type": "practice", "hours": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_json_body_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/coaches")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok(), "{timestamp}");
    // Millisecond precision, UTC: 2023-11-14T22:13:20.000Z
    assert_eq!(timestamp.len(), 24, "{timestamp}");
    assert!(timestamp.ends_with('Z'));

    let (status, body) = send(&app, Method::GET, "/api/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");

    let (status, body) = send(&app, Method::GET, "/missing.txt", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Route not found");
}

#[tokio::test]
async fn serves_browser_client() {
    let app = app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_owned();
    assert!(content_type.starts_with("text/html"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("app.js"));
}

#[tokio::test]
async fn ids_beyond_rowid_range_are_bad_requests() {
    let past_max = "9223372036854775808";
    for app in [app(), sqlite_app("oversized_ids").await] {
        for uri in [
            format!("/api/coaches/{past_max}"),
            format!("/api/coaches/{past_max}/progress"),
            format!("/api/coaches/{past_max}/sessions"),
        ] {
            let (status, body) = send(&app, Method::GET, &uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {body}");
            assert_eq!(body["error"], "Invalid coach id");
        }

        let (status, body) =
            send(&app, Method::DELETE, &format!("/api/sessions/{past_max}"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["error"], "Invalid session id");

        // The largest representable id is well formed and simply absent.
        let (status, body) =
            send(&app, Method::GET, "/api/coaches/9223372036854775807", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
    }
}

#[tokio::test]
async fn hours_must_be_a_json_number() {
    let app = app();
    let coach = create_coach(&app, "Ada").await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/coaches/{coach}/sessions"),
        Some(json!({ "date": "2023-11-01", "equipment": "mat", "type": "practice", "hours": "1.5" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));

    let (_, sessions) =
        send(&app, Method::GET, &format!("/api/coaches/{coach}/sessions"), None).await;
    assert_eq!(sessions, json!([]));
}
