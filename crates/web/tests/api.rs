use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::NaiveDate;
use export::{ExportSettings, PdfExporter};
use futures::StreamExt;
use registration::FixedClock;
use serde_json::{Value, json};
use storage::{MemoryRecordStore, RecordStore};
use tower::ServiceExt;
use web::state::AppState;

fn app_with_store() -> (Router, Arc<MemoryRecordStore>) {
    let store = Arc::new(MemoryRecordStore::new());
    let exporter = PdfExporter::new(ExportSettings::default()).unwrap();
    let state = AppState::new(store.clone(), exporter).with_clock(Arc::new(FixedClock(
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
    )));
    (web::app(state, std::env::temp_dir()), store)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create(app: &Router, body: Value) -> String {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/athletes", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_normalizes_and_lists() {
    let (app, _) = app_with_store();
    let id = create(
        &app,
        json!({
            "kind": "self_registration",
            "name": "João",
            "tax_id": "123.456.789-00",
            "birth_date": "2010-06-16",
            "phone": "(81) 99999-8888"
        }),
    )
    .await;

    let response = app.clone().oneshot(get("/api/athletes")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;

    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], id);
    assert_eq!(list[0]["kind"], "self_registration");
    assert_eq!(list[0]["tax_id"], "12345678900");
    assert_eq!(list[0]["phone"], "81999998888");
    assert_eq!(list[0]["age"], 13);
}

#[tokio::test]
async fn test_guardian_with_same_tax_ids_is_rejected() {
    let (app, store) = app_with_store();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/athletes",
            json!({
                "kind": "guardian_consent",
                "name": "Ana",
                "minor_tax_id": "123.456.789-00",
                "guardian_tax_id": "12345678900"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Validation failed");
    assert!(store.fetch_once().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_merges_fields() {
    let (app, _) = app_with_store();
    let id = create(
        &app,
        json!({ "kind": "self_registration", "name": "João", "height": "1.80", "city": "Recife" }),
    )
    .await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/athletes/{}", id),
            json!({ "kind": "self_registration", "city": "Olinda", "height": null }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get(&format!("/api/athletes/{}", id)))
        .await
        .unwrap();
    let athlete = body_json(response).await;
    assert_eq!(athlete["name"], "João");
    assert_eq!(athlete["city"], "Olinda");
    assert_eq!(athlete["height"], Value::Null);
}

#[tokio::test]
async fn test_update_errors() {
    let (app, _) = app_with_store();
    let id = create(&app, json!({ "kind": "self_registration", "name": "João" })).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/athletes/{}", id),
            json!({ "kind": "guardian_consent", "guardian_name": "Maria" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/athletes/{}", uuid::Uuid::new_v4()),
            json!({ "kind": "self_registration", "name": "Ninguém" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let (app, store) = app_with_store();
    let id = create(&app, json!({ "kind": "self_registration", "name": "João" })).await;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/athletes/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
    assert!(store.fetch_once().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stream_sends_current_list_then_changes() {
    let (app, _) = app_with_store();
    let response = app.clone().oneshot(get("/api/athletes/stream")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let mut events = response.into_body().into_data_stream();
    let first = events.next().await.unwrap().unwrap();
    let first = String::from_utf8(first.to_vec()).unwrap();
    assert!(first.contains("event: snapshot"));
    assert!(first.contains("data: []"));

    create(&app, json!({ "kind": "self_registration", "name": "João" })).await;

    let next = tokio::time::timeout(Duration::from_secs(5), events.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let next = String::from_utf8(next.to_vec()).unwrap();
    assert!(next.contains("João"));
}

#[tokio::test]
async fn test_export_downloads_pdf() {
    let (app, _) = app_with_store();
    create(&app, json!({ "kind": "guardian_consent", "name": "Ana" })).await;

    let response = app.clone().oneshot(get("/api/export/slip")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"bilhetes.pdf\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF-1.7"));

    let response = app.oneshot(get("/api/export/csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (app, _) = app_with_store();
    let response = app.oneshot(get("/api-docs/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let doc = body_json(response).await;
    assert!(doc["paths"]["/api/athletes/{id}"].is_object());
    assert!(doc["paths"]["/api/export/{style}"].is_object());
}
