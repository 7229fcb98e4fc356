use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use keel_core::config::Configuration;
use keel_core::event::LifecycleEvent;
use keel_core::kernel::Kernel;
use keel_core::plugin_system::Plugin;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::model::ListParams;
use crate::{EDITOR_ROLE, WidgetsPlugin, permissions};

async fn app() -> axum::Router {
    let config = Configuration::new()
        .with("DB_URI", "sqlite::memory:")
        .with("TEMPLATE_DISABLE", "true");
    let mut kernel = Kernel::with_configuration(config);
    kernel.register_plugin(WidgetsPlugin).unwrap();
    kernel.bootstrap().await.unwrap();
    kernel.into_router()
}

fn call(method: Method, uri: &str, roles: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("accept", "application/json")
        .header("content-type", "application/json");
    if let Some(roles) = roles {
        builder = builder.header("x-user-roles", roles);
    }
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
    builder.body(body).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn test_list_params_are_clamped() {
    let params = ListParams {
        limit: 10_000,
        offset: -3,
    }
    .clamped();
    assert_eq!(params.limit, ListParams::MAX_LIMIT);
    assert_eq!(params.offset, 0);
}

#[tokio::test]
async fn test_init_grants_permissions() {
    let config = Configuration::new()
        .with("DB_URI", "sqlite::memory:")
        .with("TEMPLATE_DISABLE", "true");
    let mut kernel = Kernel::with_configuration(config);
    kernel.register_plugin(WidgetsPlugin).unwrap();
    kernel.bootstrap().await.unwrap();

    assert!(kernel.can(permissions::FIND, &["unAuthenticated"]));
    assert!(!kernel.can(permissions::CREATE, &["unAuthenticated"]));
    assert!(kernel.can(permissions::DELETE, &[EDITOR_ROLE]));
    assert_eq!(kernel.resource_names(), vec!["widgets"]);
    assert!(kernel.api_router_group("widgets").is_some());
}

#[test]
fn test_non_sqlite_engine_leaves_plugin_inert() {
    let config = Configuration::new().with("DB_ENGINE", "mysql");
    let mut kernel = Kernel::with_configuration(config);
    WidgetsPlugin.init(&mut kernel).unwrap();

    assert_eq!(kernel.events().handler_count(LifecycleEvent::BindRoutes), 0);
    assert!(!kernel.can(permissions::FIND, &["unAuthenticated"]));
    kernel.must_trigger(LifecycleEvent::BindRoutes);
    assert!(kernel.resource_names().is_empty());
}

#[test]
fn test_unknown_engine_fails_init() {
    let config = Configuration::new().with("DB_ENGINE", "oracle");
    let mut kernel = Kernel::with_configuration(config);
    assert!(WidgetsPlugin.init(&mut kernel).is_err());
}

#[test]
fn test_bind_routes_without_database_mounts_nothing() {
    let mut kernel = Kernel::with_configuration(Configuration::new());
    WidgetsPlugin.init(&mut kernel).unwrap();
    assert_eq!(kernel.events().handler_count(LifecycleEvent::BindRoutes), 1);

    let outcome = kernel.fire(LifecycleEvent::BindRoutes);
    assert!(outcome.first_error.is_none());
    assert!(kernel.resource_names().is_empty());
}

#[tokio::test]
async fn test_create_list_and_count() {
    let app = app().await;

    for name in ["sprocket", "gear"] {
        let response = app
            .clone()
            .oneshot(call(
                Method::POST,
                "/api/widgets",
                Some(EDITOR_ROLE),
                Some(json!({ "name": name, "quantity": 3 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(call(Method::GET, "/api/widgets?limit=1", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = json_body(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["name"], "sprocket");
    assert_eq!(listed[0]["color"], "grey");

    let response = app
        .oneshot(call(Method::GET, "/api/widgets/count", None, None))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["count"], 2);
}

#[tokio::test]
async fn test_update_and_delete() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(call(
            Method::POST,
            "/api/widgets",
            Some(EDITOR_ROLE),
            Some(json!({ "name": "flange" })),
        ))
        .await
        .unwrap();
    let id = json_body(response).await["id"].as_i64().unwrap();
    let member = format!("/api/widgets/{id}");

    let response = app
        .clone()
        .oneshot(call(
            Method::PUT,
            &member,
            Some(EDITOR_ROLE),
            Some(json!({ "name": "flange", "color": "red", "quantity": 9 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["color"], "red");

    let response = app
        .clone()
        .oneshot(call(Method::DELETE, &member, Some(EDITOR_ROLE), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(call(Method::DELETE, &member, Some(EDITOR_ROLE), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(call(Method::GET, &member, None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anonymous_writes_are_restricted() {
    let response = app()
        .await
        .oneshot(call(
            Method::POST,
            "/api/widgets",
            None,
            Some(json!({ "name": "bolt" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_payload_is_rejected() {
    let response = app()
        .await
        .oneshot(call(
            Method::POST,
            "/api/widgets",
            Some(EDITOR_ROLE),
            Some(json!({ "name": "x", "quantity": -1 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["name", "quantity"]);
}
