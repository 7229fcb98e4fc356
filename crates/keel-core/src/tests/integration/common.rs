use async_trait::async_trait;
use axum::Json;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use validator::Validate;

use crate::config::Configuration;
use crate::event::LifecycleEvent;
use crate::http::{HttpController, RequestContext, RequestError};
use crate::kernel::Kernel;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::Plugin;

pub const NOTES_READ: &str = "read_notes";
pub const NOTES_WRITE: &str = "write_notes";

#[derive(Debug, Deserialize, Validate)]
pub struct NewNote {
    #[validate(length(min = 1, max = 140))]
    pub body: String,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Note {
    pub id: i64,
    pub body: String,
}

/// Sqlite-backed notes resource
pub struct NotesController {
    pool: SqlitePool,
}

impl NotesController {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn ensure_table(&self) -> std::result::Result<(), RequestError> {
        sqlx::query("CREATE TABLE IF NOT EXISTS notes (id INTEGER PRIMARY KEY, body TEXT NOT NULL)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn parse_id(ctx: &RequestContext) -> std::result::Result<i64, RequestError> {
        ctx.require_id()?
            .parse()
            .map_err(|_| RequestError::bad_request("record id must be an integer"))
    }
}

#[async_trait]
impl HttpController for NotesController {
    async fn query(&self, ctx: RequestContext) -> std::result::Result<Response, RequestError> {
        ctx.authorize(NOTES_READ)?;
        self.ensure_table().await?;
        let notes: Vec<Note> = sqlx::query_as("SELECT id, body FROM notes ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(Json(notes).into_response())
    }

    async fn count(&self, ctx: RequestContext) -> std::result::Result<Response, RequestError> {
        ctx.authorize(NOTES_READ)?;
        self.ensure_table().await?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notes")
            .fetch_one(&self.pool)
            .await?;
        Ok(Json(json!({ "count": count })).into_response())
    }

    async fn create(&self, ctx: RequestContext) -> std::result::Result<Response, RequestError> {
        ctx.authorize(NOTES_WRITE)?;
        let note: NewNote = ctx.validated_json()?;
        self.ensure_table().await?;
        let created: Note = sqlx::query_as("INSERT INTO notes (body) VALUES (?) RETURNING id, body")
            .bind(&note.body)
            .fetch_one(&self.pool)
            .await?;
        Ok((StatusCode::CREATED, Json(created)).into_response())
    }

    async fn find_one(&self, ctx: RequestContext) -> std::result::Result<Response, RequestError> {
        ctx.authorize(NOTES_READ)?;
        let id = Self::parse_id(&ctx)?;
        self.ensure_table().await?;
        let note: Note = sqlx::query_as("SELECT id, body FROM notes WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(Json(note).into_response())
    }

    async fn update(&self, ctx: RequestContext) -> std::result::Result<Response, RequestError> {
        ctx.authorize(NOTES_WRITE)?;
        let id = Self::parse_id(&ctx)?;
        let note: NewNote = ctx.validated_json()?;
        self.ensure_table().await?;
        let updated: Note =
            sqlx::query_as("UPDATE notes SET body = ? WHERE id = ? RETURNING id, body")
                .bind(&note.body)
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(Json(updated).into_response())
    }

    async fn delete(&self, ctx: RequestContext) -> std::result::Result<Response, RequestError> {
        ctx.authorize(NOTES_WRITE)?;
        let id = Self::parse_id(&ctx)?;
        self.ensure_table().await?;
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RequestError::RecordNotFound);
        }
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

/// Plugin wiring the notes resource under `/api/notes`
pub struct NotesPlugin;

impl Plugin for NotesPlugin {
    fn name(&self) -> &str {
        "notes"
    }

    fn init(&self, kernel: &mut Kernel) -> Result<()> {
        kernel.grant_permission("unAuthenticated", NOTES_READ);
        kernel.grant_permission("authenticated", NOTES_READ);
        kernel.grant_permission("authenticated", NOTES_WRITE);

        kernel.subscribe(LifecycleEvent::BindRoutes, |ctx| {
            let kernel = ctx.kernel();
            let pool = kernel
                .db()
                .and_then(|db| db.as_sqlite())
                .cloned()
                .ok_or_else(|| Error::resource("notes", "a sqlite database is required"))?;
            let group = kernel.set_api_router_group("notes", "/notes");
            kernel.set_resource("notes", std::sync::Arc::new(NotesController::new(pool)), &group)
        });
        Ok(())
    }
}

pub fn test_configuration() -> Configuration {
    Configuration::new()
        .with("DB_URI", "sqlite::memory:")
        .with("TEMPLATE_DISABLE", "true")
}

/// Bootstrapped kernel with the notes plugin registered
pub async fn notes_kernel() -> Kernel {
    let mut kernel = Kernel::with_configuration(test_configuration());
    kernel.register_plugin(NotesPlugin).unwrap();
    kernel.bootstrap().await.unwrap();
    kernel
}

pub fn json_request(method: Method, uri: &str, roles: &str, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("accept", "application/json");
    if !roles.is_empty() {
        builder = builder.header("x-user-roles", roles);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}
