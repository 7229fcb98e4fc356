use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::{json_request, notes_kernel, read_json};

#[tokio::test]
async fn test_plugin_resource_is_mounted_during_bootstrap() {
    let kernel = notes_kernel().await;
    assert_eq!(kernel.resource_names(), vec!["notes"]);
    let paths = kernel.route_paths();
    for path in ["/api/notes", "/api/notes/count", "/api/notes/:id", "/health", "/api"] {
        assert!(paths.contains(&path.to_string()), "missing {path} in {paths:?}");
    }
}

#[tokio::test]
async fn test_crud_round_trip() {
    let router = notes_kernel().await.into_router();
    let author = "authenticated";

    let response = router
        .clone()
        .oneshot(json_request(Method::POST, "/api/notes", author, Some(json!({ "body": "first" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    let id = created["id"].as_i64().unwrap();

    let response = router
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/notes/{id}"),
            author,
            Some(json!({ "body": "edited" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["body"], "edited");

    let response = router
        .clone()
        .oneshot(json_request(Method::GET, "/api/notes/count", "", None))
        .await
        .unwrap();
    assert_eq!(read_json(response).await["count"], 1);

    let response = router
        .clone()
        .oneshot(json_request(Method::DELETE, &format!("/api/notes/{id}"), author, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .oneshot(json_request(Method::GET, &format!("/api/notes/{id}"), "", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anonymous_callers_cannot_write() {
    let router = notes_kernel().await.into_router();

    let response = router
        .clone()
        .oneshot(json_request(Method::POST, "/api/notes", "", Some(json!({ "body": "x" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["message"], "restricted access");

    let response = router
        .oneshot(json_request(Method::GET, "/api/notes", "", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!([]));
}

#[tokio::test]
async fn test_invalid_payload_reports_field_errors() {
    let router = notes_kernel().await.into_router();
    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/notes",
            "authenticated",
            Some(json!({ "body": "" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["errors"][0]["field"], "body");
    assert_eq!(body["errors"][0]["tag"], "length");
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let router = notes_kernel().await.into_router();
    let response = router
        .oneshot(json_request(Method::GET, "/api/notes/abc", "", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["message"], "record id must be an integer");
}
