//! Generic CRUD resources.
//!
//! A resource binds an [`HttpController`] to a [`RouteGroup`] with eight
//! endpoints:
//!
//! | Method                | Path     | Action     |
//! |-----------------------|----------|------------|
//! | `GET`                 | (base)   | `query`    |
//! | `GET`                 | `/count` | `count`    |
//! | `POST`                | (base)   | `create`   |
//! | `GET`                 | `/:id`   | `find_one` |
//! | `POST`, `PATCH`, `PUT`| `/:id`   | `update`   |
//! | `DELETE`              | `/:id`   | `delete`   |
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Path, Query, Request};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use axum::routing::get;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::acl::Acl;
use crate::http::error::RequestError;
use crate::http::negotiation::ResponseFormat;
use crate::http::router::{Endpoint, RouteGroup};
use crate::kernel::error::Result as KernelResult;

/// Largest request body read into a [`RequestContext`]. Larger bodies are
/// rejected with `413 Payload Too Large`.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Header carrying the caller's comma-separated role names
pub const ROLES_HEADER: &str = "x-user-roles";

/// Role assumed when a request carries no roles
pub const ANONYMOUS_ROLE: &str = "unAuthenticated";

/// The six operations of a CRUD resource
#[async_trait]
pub trait HttpController: Send + Sync {
    async fn query(&self, ctx: RequestContext) -> Result<Response, RequestError>;
    async fn count(&self, ctx: RequestContext) -> Result<Response, RequestError>;
    async fn create(&self, ctx: RequestContext) -> Result<Response, RequestError>;
    async fn find_one(&self, ctx: RequestContext) -> Result<Response, RequestError>;
    async fn update(&self, ctx: RequestContext) -> Result<Response, RequestError>;
    async fn delete(&self, ctx: RequestContext) -> Result<Response, RequestError>;
}

/// Everything a controller action gets to see of the request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub id: Option<String>,
    pub format: ResponseFormat,
    pub acl: Option<Acl>,
    pub body: Bytes,
}

impl RequestContext {
    /// Buffer the request. `id` is the `:id` path segment, when routed.
    pub async fn from_request(req: Request, id: Option<String>) -> Result<Self, RequestError> {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let headers = req.headers().clone();
        let format = req
            .extensions()
            .get::<ResponseFormat>()
            .copied()
            .unwrap_or_default();
        let acl = req.extensions().get::<Acl>().cloned();

        let body = Bytes::from_request(req, &())
            .await
            .map_err(|rejection| RequestError::status(rejection.status(), rejection.body_text()))?;

        Ok(Self {
            method,
            uri,
            headers,
            id,
            format,
            acl,
            body,
        })
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn require_id(&self) -> Result<&str, RequestError> {
        self.id().ok_or_else(|| RequestError::bad_request("missing record id"))
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| RequestError::bad_request(format!("invalid JSON body: {e}")))
    }

    /// Decode the body as JSON and run its validation rules
    pub fn validated_json<T: DeserializeOwned + Validate>(&self) -> Result<T, RequestError> {
        let value: T = self.json()?;
        value.validate()?;
        Ok(value)
    }

    /// Decode the query string
    pub fn query<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        Query::try_from_uri(&self.uri)
            .map(|Query(q)| q)
            .map_err(|e| RequestError::bad_request(e.to_string()))
    }

    /// Role names from the roles header, or the anonymous role
    pub fn roles(&self) -> Vec<String> {
        let roles: Vec<String> = self
            .headers
            .get(ROLES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if roles.is_empty() {
            vec![ANONYMOUS_ROLE.to_string()]
        } else {
            roles
        }
    }

    /// Fail with 401 unless one of the caller's roles grants `permission`
    pub fn authorize(&self, permission: &str) -> Result<(), RequestError> {
        let allowed = self
            .acl
            .as_ref()
            .is_some_and(|acl| acl.can(permission, &self.roles()));
        if allowed {
            Ok(())
        } else {
            Err(RequestError::unauthorized())
        }
    }
}

/// A controller bound to a route group
#[derive(Clone)]
pub struct Resource {
    pub name: String,
    pub controller: Arc<dyn HttpController>,
    pub group: RouteGroup,
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("name", &self.name)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Query,
    Count,
    Create,
    FindOne,
    Update,
    Delete,
}

async fn invoke(
    controller: Arc<dyn HttpController>,
    action: Action,
    req: Request,
    id: Option<String>,
) -> Result<Response, RequestError> {
    let ctx = RequestContext::from_request(req, id).await?;
    match action {
        Action::Query => controller.query(ctx).await,
        Action::Count => controller.count(ctx).await,
        Action::Create => controller.create(ctx).await,
        Action::FindOne => controller.find_one(ctx).await,
        Action::Update => controller.update(ctx).await,
        Action::Delete => controller.delete(ctx).await,
    }
}

/// Mount the eight CRUD endpoints of `controller` on `group`.
///
/// Nothing is mounted if any of them conflicts with an existing route.
pub(crate) fn mount(group: &RouteGroup, controller: Arc<dyn HttpController>) -> KernelResult<()> {
    let collection = |action: Action| {
        let controller = Arc::clone(&controller);
        move |req: Request| invoke(controller, action, req, None)
    };
    let member = |action: Action| {
        let controller = Arc::clone(&controller);
        move |Path(id): Path<String>, req: Request| invoke(controller, action, req, Some(id))
    };

    group.route_all(vec![
        Endpoint {
            path: "",
            methods: &[Method::GET, Method::POST],
            handler: get(collection(Action::Query)).post(collection(Action::Create)),
        },
        Endpoint {
            path: "/count",
            methods: &[Method::GET],
            handler: get(collection(Action::Count)),
        },
        Endpoint {
            path: "/:id",
            methods: &[
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::PUT,
                Method::DELETE,
            ],
            handler: get(member(Action::FindOne))
                .post(member(Action::Update))
                .patch(member(Action::Update))
                .put(member(Action::Update))
                .delete(member(Action::Delete)),
        },
    ])
}
