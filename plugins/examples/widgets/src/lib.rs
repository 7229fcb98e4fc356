//! Example resource plugin.
//!
//! Mounts a `widgets` CRUD resource under `/api/widgets`, backed by the
//! kernel's default sqlite database. Anonymous callers may read; the
//! `authenticated` role may also write. With any other `DB_ENGINE` the
//! plugin stays inert.
use std::sync::Arc;

use keel_core::database::DbEngine;
use keel_core::event::LifecycleEvent;
use keel_core::http::resource::ANONYMOUS_ROLE;
use keel_core::kernel::Kernel;
use keel_core::kernel::constants::{DB_ENGINE, DEFAULT_DB_ENGINE};
use keel_core::kernel::error::Result as KernelResult;
use keel_core::plugin_system::Plugin;

pub mod controller;
pub mod model;

pub use controller::WidgetsController;

pub const RESOURCE_NAME: &str = "widgets";

pub mod permissions {
    pub const FIND: &str = "find_widget";
    pub const CREATE: &str = "create_widget";
    pub const UPDATE: &str = "update_widget";
    pub const DELETE: &str = "delete_widget";
}

/// Role allowed to modify widgets
pub const EDITOR_ROLE: &str = "authenticated";

#[derive(Debug, Default)]
pub struct WidgetsPlugin;

impl Plugin for WidgetsPlugin {
    fn name(&self) -> &str {
        "widgets"
    }

    fn init(&self, kernel: &mut Kernel) -> KernelResult<()> {
        let engine: DbEngine = kernel
            .configuration()
            .get_or(DB_ENGINE, DEFAULT_DB_ENGINE)
            .parse()?;
        if engine != DbEngine::Sqlite {
            log::warn!(
                "Widgets need a sqlite database, {} configured; resource not mounted",
                engine
            );
            return Ok(());
        }

        kernel.grant_permission(ANONYMOUS_ROLE, permissions::FIND);
        for permission in [
            permissions::FIND,
            permissions::CREATE,
            permissions::UPDATE,
            permissions::DELETE,
        ] {
            kernel.grant_permission(EDITOR_ROLE, permission);
        }

        kernel.subscribe(LifecycleEvent::BindRoutes, |ctx| {
            let kernel = ctx.kernel();
            let Some(pool) = kernel.db().and_then(|db| db.as_sqlite()).cloned() else {
                log::warn!("No sqlite database open; resource '{}' not mounted", RESOURCE_NAME);
                return Ok(());
            };
            let group = kernel.set_api_router_group(RESOURCE_NAME, "/widgets");
            kernel.set_resource(RESOURCE_NAME, Arc::new(WidgetsController::new(pool)), &group)
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests;
