//! Route groups, resources, models and template functions.
use std::sync::Arc;

use crate::http::resource::{self, HttpController, Resource};
use crate::http::router::RouteGroup;
use crate::kernel::bootstrap::Kernel;
use crate::kernel::constants::{API_GROUP, API_PREFIX};
use crate::kernel::error::{Error, Result};

impl Kernel {
    /// Route group `name` at `prefix`, created on first request.
    ///
    /// Asking again for an existing name returns the cached handle and
    /// ignores `prefix`.
    pub fn set_router_group(&mut self, name: &str, prefix: &str) -> RouteGroup {
        if let Some(group) = self.router_groups.get(name) {
            if group.prefix() != crate::http::join_path(prefix, "") {
                log::debug!(
                    "Route group '{}' already mounted at '{}', ignoring '{}'",
                    name,
                    group.prefix(),
                    prefix
                );
            }
            return group.clone();
        }
        let group = RouteGroup::new(name, prefix, Arc::clone(&self.routes));
        self.router_groups.insert(name.to_string(), group.clone());
        group
    }

    pub fn router_group(&self, name: &str) -> Option<RouteGroup> {
        self.router_groups.get(name).cloned()
    }

    /// Route group `name` nested under the `api` group.
    pub fn set_api_router_group(&mut self, name: &str, prefix: &str) -> RouteGroup {
        if let Some(group) = self.api_router_groups.get(name) {
            return group.clone();
        }
        let group = self.set_router_group(API_GROUP, API_PREFIX).group(name, prefix);
        self.api_router_groups.insert(name.to_string(), group.clone());
        group
    }

    pub fn api_router_group(&self, name: &str) -> Option<RouteGroup> {
        self.api_router_groups.get(name).cloned()
    }

    /// Bind `controller` to `group` under `name`.
    ///
    /// Fails without mounting anything if `name` is already taken or one of
    /// the eight endpoints is already mounted on `group`.
    pub fn set_resource(
        &mut self,
        name: &str,
        controller: Arc<dyn HttpController>,
        group: &RouteGroup,
    ) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::resource(name, "resource name must not be empty"));
        }
        if self.resources.contains_key(name) {
            return Err(Error::resource(name, "a resource with this name is already registered"));
        }

        resource::mount(group, Arc::clone(&controller))
            .map_err(|err| Error::resource(name, err.to_string()))?;
        log::debug!("Resource '{}' mounted at '{}'", name, group.prefix());

        self.resources.insert(
            name.to_string(),
            Resource {
                name: name.to_string(),
                controller,
                group: group.clone(),
            },
        );
        Ok(())
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    pub fn resource_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Register a model, replacing any previous entry under `name`.
    pub fn set_model<T: std::any::Any + Send + Sync>(&mut self, name: &str, model: T) {
        if self.models.insert(name, model) {
            log::debug!("Model '{}' replaced", name);
        }
    }

    pub fn model<T: std::any::Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.models.get::<T>(name)
    }

    /// Register a template function, replacing any previous one.
    ///
    /// Only functions registered before the template load phase are visible
    /// to templates.
    pub fn set_template_function<F>(&mut self, name: &str, function: F)
    where
        F: tera::Function + 'static,
    {
        self.template_functions.insert(name, function);
    }
}
