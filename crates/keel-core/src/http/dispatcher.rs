//! Format-aware rendering of request errors.
//!
//! [`dispatch_errors`] is installed as the outermost middleware. It
//! negotiates the response format, stores it in the request extensions and,
//! when the inner service answered with a [`RequestError`], replaces that
//! response with one rendered for the negotiated format.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;

use crate::http::error::{
    DeferredError, Disposition, RequestError, ValidationFieldError, ValidationResponse,
    canonical_reason,
};
use crate::http::negotiation::{JSON_API_MEDIA_TYPE, ResponseFormat, ResponseFormats};
use crate::templates::TemplateSet;

/// Values exposed to error page templates
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PageContext {
    pub title: String,
    pub status: u16,
    pub message: String,
    pub errors: Vec<ValidationFieldError>,
}

pub struct ErrorDispatcher {
    renderer: Arc<TemplateSet>,
    formats: Arc<ResponseFormats>,
    template_root: PathBuf,
}

impl ErrorDispatcher {
    pub fn new(
        renderer: Arc<TemplateSet>,
        formats: Arc<ResponseFormats>,
        template_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            renderer,
            formats,
            template_root: template_root.into(),
        }
    }

    pub fn formats(&self) -> &ResponseFormats {
        &self.formats
    }

    pub fn template_root(&self) -> &Path {
        &self.template_root
    }

    /// Build the response for `err` in `format`.
    pub async fn dispatch(&self, err: &RequestError, format: ResponseFormat) -> Response {
        let disposition = err.disposition();
        match disposition {
            Disposition::Unauthorized => self.respond(err, format, "site/401", "Restricted access"),
            Disposition::NotFound => self.respond(err, format, "site/404", "Not found"),
            Disposition::Validation => self.respond(err, format, "site/400", "Bad request"),
            Disposition::Internal => {
                log::error!("Internal server error: {}", err);
                self.respond(err, format, "site/500", "Internal server error")
            }
            Disposition::Other(status) => {
                log::warn!("Unhandled error status {} ({})", status.as_u16(), err);
                match self.machine_readable(err, format) {
                    Some(response) => response,
                    None => self.static_page(status).await,
                }
            }
        }
    }

    fn respond(
        &self,
        err: &RequestError,
        format: ResponseFormat,
        template: &str,
        title: &str,
    ) -> Response {
        self.machine_readable(err, format)
            .unwrap_or_else(|| self.page(err, template, title))
    }

    /// JSON or JSON-API body for `err`; `None` for HTML.
    fn machine_readable(&self, err: &RequestError, format: ResponseFormat) -> Option<Response> {
        let status = err.status_code();
        match format {
            ResponseFormat::Json => Some((status, Json(err.envelope())).into_response()),
            ResponseFormat::JsonApi => {
                let mut response = match err {
                    RequestError::Validation(errors) => (
                        status,
                        Json(ValidationResponse {
                            errors: errors.clone(),
                        }),
                    )
                        .into_response(),
                    _ => (status, Json(serde_json::json!({}))).into_response(),
                };
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_API_MEDIA_TYPE));
                Some(response)
            }
            ResponseFormat::Html => None,
        }
    }

    fn page(&self, err: &RequestError, template: &str, title: &str) -> Response {
        let status = err.status_code();
        let context = PageContext {
            title: title.to_string(),
            status: status.as_u16(),
            message: err.public_message(),
            errors: err.field_errors().to_vec(),
        };
        match self.renderer.render(template, &context) {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                log::error!("Failed to render error page '{}': {}", template, e);
                status.into_response()
            }
        }
    }

    async fn static_page(&self, status: StatusCode) -> Response {
        let page = self
            .template_root
            .join("site")
            .join(format!("{}.html", status.as_u16()));
        match tokio::fs::read_to_string(&page).await {
            Ok(body) => (status, Html(body)).into_response(),
            Err(e) => {
                log::error!(
                    "Error page '{}' for status {} ({}) unavailable: {}",
                    page.display(),
                    status.as_u16(),
                    canonical_reason(status),
                    e
                );
                status.into_response()
            }
        }
    }
}

/// Middleware rendering handler errors in the negotiated format.
pub async fn dispatch_errors(
    State(dispatcher): State<Arc<ErrorDispatcher>>,
    mut req: Request,
    next: Next,
) -> Response {
    let format = dispatcher.formats().negotiate(req.headers());
    req.extensions_mut().insert(format);

    let response = next.run(req).await;
    match response.extensions().get::<DeferredError>().cloned() {
        Some(DeferredError(err)) => dispatcher.dispatch(&err, format).await,
        None => response,
    }
}
