use async_trait::async_trait;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use keel_core::http::{HttpController, RequestContext, RequestError};
use serde_json::json;
use sqlx::SqlitePool;
use tokio::sync::OnceCell;

use crate::model::{ListParams, Widget, WidgetPayload};
use crate::permissions;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS widgets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    color TEXT NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 0
)";

/// CRUD over the `widgets` table.
///
/// The table is created on first use.
pub struct WidgetsController {
    pool: SqlitePool,
    schema: OnceCell<()>,
}

impl WidgetsController {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            schema: OnceCell::new(),
        }
    }

    async fn ready(&self) -> Result<&SqlitePool, RequestError> {
        self.schema
            .get_or_try_init(|| async {
                log::debug!("Creating widgets table");
                sqlx::query(SCHEMA).execute(&self.pool).await.map(|_| ())
            })
            .await?;
        Ok(&self.pool)
    }

    fn record_id(ctx: &RequestContext) -> Result<i64, RequestError> {
        let id = ctx.require_id()?;
        id.parse()
            .map_err(|_| RequestError::bad_request(format!("invalid widget id '{id}'")))
    }
}

#[async_trait]
impl HttpController for WidgetsController {
    async fn query(&self, ctx: RequestContext) -> Result<Response, RequestError> {
        ctx.authorize(permissions::FIND)?;
        let params = ctx.query::<ListParams>()?.clamped();
        let widgets: Vec<Widget> =
            sqlx::query_as("SELECT id, name, color, quantity FROM widgets ORDER BY id LIMIT ? OFFSET ?")
                .bind(params.limit)
                .bind(params.offset)
                .fetch_all(self.ready().await?)
                .await?;
        Ok(Json(widgets).into_response())
    }

    async fn count(&self, ctx: RequestContext) -> Result<Response, RequestError> {
        ctx.authorize(permissions::FIND)?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM widgets")
            .fetch_one(self.ready().await?)
            .await?;
        Ok(Json(json!({ "count": count })).into_response())
    }

    async fn create(&self, ctx: RequestContext) -> Result<Response, RequestError> {
        ctx.authorize(permissions::CREATE)?;
        let payload: WidgetPayload = ctx.validated_json()?;
        let widget: Widget = sqlx::query_as(
            "INSERT INTO widgets (name, color, quantity) VALUES (?, ?, ?) \
             RETURNING id, name, color, quantity",
        )
        .bind(&payload.name)
        .bind(&payload.color)
        .bind(payload.quantity)
        .fetch_one(self.ready().await?)
        .await?;
        log::info!("Created widget {} '{}'", widget.id, widget.name);
        Ok((StatusCode::CREATED, Json(widget)).into_response())
    }

    async fn find_one(&self, ctx: RequestContext) -> Result<Response, RequestError> {
        ctx.authorize(permissions::FIND)?;
        let id = Self::record_id(&ctx)?;
        let widget: Widget =
            sqlx::query_as("SELECT id, name, color, quantity FROM widgets WHERE id = ?")
                .bind(id)
                .fetch_one(self.ready().await?)
                .await?;
        Ok(Json(widget).into_response())
    }

    async fn update(&self, ctx: RequestContext) -> Result<Response, RequestError> {
        ctx.authorize(permissions::UPDATE)?;
        let id = Self::record_id(&ctx)?;
        let payload: WidgetPayload = ctx.validated_json()?;
        let widget: Widget = sqlx::query_as(
            "UPDATE widgets SET name = ?, color = ?, quantity = ? WHERE id = ? \
             RETURNING id, name, color, quantity",
        )
        .bind(&payload.name)
        .bind(&payload.color)
        .bind(payload.quantity)
        .bind(id)
        .fetch_one(self.ready().await?)
        .await?;
        Ok(Json(widget).into_response())
    }

    async fn delete(&self, ctx: RequestContext) -> Result<Response, RequestError> {
        ctx.authorize(permissions::DELETE)?;
        let id = Self::record_id(&ctx)?;
        let deleted = sqlx::query("DELETE FROM widgets WHERE id = ?")
            .bind(id)
            .execute(self.ready().await?)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(RequestError::RecordNotFound);
        }
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
