use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Json;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use validator::Validate;

use crate::http::error::RequestError;
use crate::http::resource::{HttpController, RequestContext};

pub type Calls = Arc<Mutex<Vec<(String, Option<String>)>>>;

/// Controller answering every action with `{"action": ..., "id": ...}`
#[derive(Default)]
pub struct RecordingController {
    pub calls: Calls,
}

impl RecordingController {
    pub fn new() -> (Arc<Self>, Calls) {
        let controller = Arc::new(Self::default());
        let calls = Arc::clone(&controller.calls);
        (controller, calls)
    }

    fn record(&self, action: &str, ctx: RequestContext) -> Result<Response, RequestError> {
        self.calls
            .lock()
            .unwrap()
            .push((action.to_string(), ctx.id.clone()));
        Ok(Json(json!({ "action": action, "id": ctx.id })).into_response())
    }
}

#[async_trait]
impl HttpController for RecordingController {
    async fn query(&self, ctx: RequestContext) -> Result<Response, RequestError> {
        self.record("query", ctx)
    }
    async fn count(&self, ctx: RequestContext) -> Result<Response, RequestError> {
        self.record("count", ctx)
    }
    async fn create(&self, ctx: RequestContext) -> Result<Response, RequestError> {
        self.record("create", ctx)
    }
    async fn find_one(&self, ctx: RequestContext) -> Result<Response, RequestError> {
        self.record("find_one", ctx)
    }
    async fn update(&self, ctx: RequestContext) -> Result<Response, RequestError> {
        self.record("update", ctx)
    }
    async fn delete(&self, ctx: RequestContext) -> Result<Response, RequestError> {
        self.record("delete", ctx)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewGadget {
    #[validate(length(min = 3))]
    pub name: String,
    #[validate(range(min = 1, max = 10))]
    pub quantity: i64,
}

/// Controller whose every action fails in a different way
pub struct FailingController;

#[async_trait]
impl HttpController for FailingController {
    async fn query(&self, _ctx: RequestContext) -> Result<Response, RequestError> {
        Err(RequestError::status(StatusCode::IM_A_TEAPOT, "short and stout"))
    }
    async fn count(&self, _ctx: RequestContext) -> Result<Response, RequestError> {
        Err(RequestError::internal("connection reset by peer"))
    }
    async fn create(&self, ctx: RequestContext) -> Result<Response, RequestError> {
        let gadget: NewGadget = ctx.validated_json()?;
        Ok(Json(json!({ "name": gadget.name })).into_response())
    }
    async fn find_one(&self, _ctx: RequestContext) -> Result<Response, RequestError> {
        Err(sqlx::Error::RowNotFound.into())
    }
    async fn update(&self, ctx: RequestContext) -> Result<Response, RequestError> {
        ctx.authorize("update_gadget")?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
    async fn delete(&self, _ctx: RequestContext) -> Result<Response, RequestError> {
        Err(RequestError::unauthorized())
    }
}

pub fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn request_with(method: Method, uri: &str, accept: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("accept", accept)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
