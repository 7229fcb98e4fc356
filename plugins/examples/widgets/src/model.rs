use serde::{Deserialize, Serialize};
use validator::Validate;

/// A stored widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Widget {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub quantity: i64,
}

/// Payload of `create` and `update`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WidgetPayload {
    #[validate(length(min = 2, max = 64))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    #[serde(default = "default_color")]
    pub color: String,
    #[validate(range(min = 0, max = 10_000))]
    #[serde(default)]
    pub quantity: i64,
}

fn default_color() -> String {
    "grey".to_string()
}

/// Paging parameters of `query`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl ListParams {
    pub const MAX_LIMIT: i64 = 200;

    pub fn clamped(self) -> Self {
        Self {
            limit: self.limit.clamp(1, Self::MAX_LIMIT),
            offset: self.offset.max(0),
        }
    }
}
