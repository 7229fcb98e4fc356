use std::fmt;
use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use axum::routing::MethodRouter;
use parking_lot::Mutex;

use crate::kernel::error::{Error, Result};

/// Router under construction, shared by every group of one kernel.
///
/// Every mounted path keeps the methods it answers so that a conflicting
/// registration is rejected before it reaches the router.
pub(crate) struct RouteTable {
    router: Router,
    endpoints: Vec<(String, Vec<Method>)>,
}

impl RouteTable {
    pub(crate) fn new() -> Self {
        Self {
            router: Router::new(),
            endpoints: Vec::new(),
        }
    }

    pub(crate) fn router(&self) -> Router {
        self.router.clone()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.endpoints.iter().map(|(path, _)| path.clone()).collect()
    }

    fn check(&self, path: &str, methods: &[Method]) -> Result<()> {
        let shape = path_shape(path);
        for (mounted, answered) in &self.endpoints {
            if mounted != path && path_shape(mounted) == shape {
                return Err(Error::RouteConflict {
                    method: "*".to_string(),
                    path: mounted.clone(),
                });
            }
            if mounted == path {
                if let Some(method) = methods.iter().find(|m| answered.contains(m)) {
                    return Err(Error::RouteConflict {
                        method: method.to_string(),
                        path: path.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn record(&mut self, path: String, methods: &[Method]) {
        match self.endpoints.iter_mut().find(|(p, _)| *p == path) {
            Some((_, answered)) => answered.extend_from_slice(methods),
            None => self.endpoints.push((path, methods.to_vec())),
        }
    }
}

/// Path with every parameter name erased; two paths of equal shape but
/// different spelling cannot share a router.
fn path_shape(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.chars().next() {
            Some(':') => ":",
            Some('*') => "*",
            _ => segment,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// One endpoint of a [`RouteGroup::route_all`] batch
pub struct Endpoint<'a> {
    pub path: &'a str,
    pub methods: &'a [Method],
    pub handler: MethodRouter,
}

pub(crate) type SharedRoutes = Arc<Mutex<RouteTable>>;

struct GroupInner {
    name: String,
    prefix: String,
    routes: SharedRoutes,
}

/// Handle on a named path prefix. Clones refer to the same group.
#[derive(Clone)]
pub struct RouteGroup {
    inner: Arc<GroupInner>,
}

impl fmt::Debug for RouteGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGroup")
            .field("name", &self.inner.name)
            .field("prefix", &self.inner.prefix)
            .finish()
    }
}

impl RouteGroup {
    pub(crate) fn new(name: &str, prefix: &str, routes: SharedRoutes) -> Self {
        Self {
            inner: Arc::new(GroupInner {
                name: name.to_string(),
                prefix: join_path(prefix, ""),
                routes,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Absolute prefix of the group
    pub fn prefix(&self) -> &str {
        &self.inner.prefix
    }

    pub fn full_path(&self, path: &str) -> String {
        join_path(&self.inner.prefix, path)
    }

    /// Mount `method_router` at `path` relative to the group prefix.
    ///
    /// `methods` are the verbs `method_router` answers. Fails with
    /// [`Error::RouteConflict`] and leaves the router untouched when one of
    /// them is already mounted at the same path.
    pub fn route(
        &self,
        path: &str,
        methods: &[Method],
        method_router: MethodRouter,
    ) -> Result<&Self> {
        self.route_all(vec![Endpoint {
            path,
            methods,
            handler: method_router,
        }])?;
        Ok(self)
    }

    /// Fail if mounting `methods` at `path` would conflict.
    pub fn check(&self, path: &str, methods: &[Method]) -> Result<()> {
        self.inner.routes.lock().check(&self.full_path(path), methods)
    }

    /// Mount every endpoint or none of them.
    pub fn route_all(&self, endpoints: Vec<Endpoint<'_>>) -> Result<()> {
        let mut table = self.inner.routes.lock();
        let mut planned: Vec<(String, &[Method])> = Vec::with_capacity(endpoints.len());
        for endpoint in &endpoints {
            let full = self.full_path(endpoint.path);
            table.check(&full, endpoint.methods)?;
            if let Some((_, methods)) = planned.iter().find(|(p, _)| *p == full) {
                if let Some(method) = endpoint.methods.iter().find(|m| methods.contains(m)) {
                    return Err(Error::RouteConflict {
                        method: method.to_string(),
                        path: full,
                    });
                }
            }
            planned.push((full, endpoint.methods));
        }

        let mut router = table.router();
        for (endpoint, (full, _)) in endpoints.into_iter().zip(&planned) {
            router = router.route(full, endpoint.handler);
        }
        table.router = router;
        for (full, methods) in planned {
            table.record(full, methods);
        }
        Ok(())
    }

    /// Nested group sharing this group's router
    pub fn group(&self, name: &str, prefix: &str) -> RouteGroup {
        RouteGroup::new(
            name,
            &self.full_path(prefix),
            Arc::clone(&self.inner.routes),
        )
    }

    /// Whether both handles refer to the same group
    pub fn ptr_eq(&self, other: &RouteGroup) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Join a prefix and a relative path into an absolute route path.
///
/// `join_path("/api", "")` is `/api`, `join_path("/", "/health")` is
/// `/health`.
pub fn join_path(prefix: &str, path: &str) -> String {
    let base = prefix.trim_matches('/');
    let rest = path.trim_matches('/');
    match (base.is_empty(), rest.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{rest}"),
        (false, true) => format!("/{base}"),
        (false, false) => format!("/{base}/{rest}"),
    }
}
