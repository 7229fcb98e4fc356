use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Extension, Router};
use parking_lot::Mutex;
use tower_http::trace::TraceLayer;

use crate::acl::{Acl, DEFAULT_ROLES, RoleTable};
use crate::config::Configuration;
use crate::database::{Database, DatabaseSettings, DbEngine};
use crate::event::{EventBus, EventContext, FireOutcome, HandlerId, LifecycleEvent};
use crate::http::client::build_client;
use crate::http::dispatcher::{ErrorDispatcher, dispatch_errors};
use crate::http::error::RequestError;
use crate::http::health::health_handler;
use crate::http::negotiation::{ResponseFormat, ResponseFormats};
use crate::http::resource::{MAX_BODY_BYTES, Resource};
use crate::http::router::{RouteGroup, RouteTable, SharedRoutes};
use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::kernel::models::ModelRegistry;
use crate::kernel::phase::{BOOTSTRAP_SEQUENCE, BootstrapPhase};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::{Plugin, PluginRegistry};
use crate::templates::{TemplateFunctions, TemplateSet};

/// Transformation applied to the assembled router before serving
pub type Middleware = Box<dyn FnOnce(Router) -> Router + Send + Sync>;

/// The application kernel.
///
/// Owns all process-wide state and is passed as `&mut Kernel` to plugin
/// `init` hooks and lifecycle handlers. After [`Kernel::bootstrap`] it is
/// consumed into an axum [`Router`].
pub struct Kernel {
    config: Configuration,
    roles: Arc<RoleTable>,
    /// Decoding failure of the last role definition, raised by the
    /// roles phase
    roles_error: Option<String>,
    plugins: PluginRegistry,
    events: EventBus,
    databases: HashMap<String, Database>,
    default_database: Option<String>,
    pub(crate) models: ModelRegistry,
    pub(crate) resources: HashMap<String, Resource>,
    pub(crate) routes: SharedRoutes,
    pub(crate) router_groups: HashMap<String, RouteGroup>,
    pub(crate) api_router_groups: HashMap<String, RouteGroup>,
    middlewares: Vec<Middleware>,
    response_formats: ResponseFormats,
    pub(crate) template_functions: TemplateFunctions,
    templates: Arc<TemplateSet>,
    renderer: Option<Arc<TemplateSet>>,
    http_client: Option<reqwest::Client>,
    bootstrapped: bool,
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("plugins", &self.plugins)
            .field("events", &self.events)
            .field("databases", &self.databases.keys().collect::<Vec<_>>())
            .field("resources", &self.resource_names())
            .field("bootstrapped", &self.bootstrapped)
            .finish_non_exhaustive()
    }
}

impl Kernel {
    /// Kernel configured from the process environment.
    pub fn new() -> Self {
        Self::with_configuration(Configuration::from_env())
    }

    /// Kernel with the default route groups (`main`, `public`, `api`), the
    /// health route and the `/api` probe.
    pub fn with_configuration(config: Configuration) -> Self {
        log::debug!("Creating {} kernel v{}", constants::APP_NAME, constants::APP_VERSION);

        let mut kernel = Self {
            config,
            roles: Arc::new(RoleTable::new()),
            roles_error: None,
            plugins: PluginRegistry::new(),
            events: EventBus::new(),
            databases: HashMap::new(),
            default_database: None,
            models: ModelRegistry::new(),
            resources: HashMap::new(),
            routes: Arc::new(Mutex::new(RouteTable::new())),
            router_groups: HashMap::new(),
            api_router_groups: HashMap::new(),
            middlewares: Vec::new(),
            response_formats: ResponseFormats::new(),
            template_functions: TemplateFunctions::new(),
            templates: Arc::new(TemplateSet::default()),
            renderer: None,
            http_client: None,
            bootstrapped: false,
        };

        kernel.set_roles_definition(DEFAULT_ROLES);
        let main = kernel.set_router_group(constants::MAIN_GROUP, constants::MAIN_PREFIX);
        kernel.set_router_group(constants::PUBLIC_GROUP, constants::PUBLIC_PREFIX);
        let api = kernel.set_router_group(constants::API_GROUP, constants::API_PREFIX);
        for (group, path) in [(&main, constants::HEALTH_PATH), (&api, "")] {
            if let Err(err) = group.route(path, &[Method::GET], get(health_handler)) {
                log::error!("Built-in route not mounted: {}", err);
            }
        }

        kernel
    }

    // --- Configuration ---

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn configuration_mut(&mut self) -> &mut Configuration {
        &mut self.config
    }

    // --- Plugins ---

    pub fn register_plugin<P: Plugin + 'static>(&mut self, plugin: P) -> Result<()> {
        self.register_plugin_arc(Arc::new(plugin))
    }

    pub fn register_plugin_arc(&mut self, plugin: Arc<dyn Plugin>) -> Result<()> {
        if self.bootstrapped {
            return Err(Error::KernelLifecycleError {
                phase: BootstrapPhase::PluginInit,
                message: format!(
                    "plugin '{}' registered after bootstrap started",
                    plugin.name()
                ),
            });
        }
        self.plugins.register_plugin(plugin)
    }

    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    // --- Events ---

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe<F>(&mut self, event: LifecycleEvent, handler: F) -> HandlerId
    where
        F: Fn(&mut EventContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.events.subscribe(event, handler)
    }

    pub fn unsubscribe(&mut self, id: HandlerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Fire `event`, running every handler even after a failure.
    pub fn fire(&mut self, event: LifecycleEvent) -> FireOutcome {
        let subscribers = self.events.subscribers(event);
        log::debug!("Firing '{}' to {} handler(s)", event, subscribers.len());
        subscribers.fire(self)
    }

    /// Fire `event` and panic if any handler failed.
    pub fn must_trigger(&mut self, event: LifecycleEvent) {
        let outcome = self.fire(event);
        if let Some(err) = &outcome.first_error {
            log::error!(
                "Mandatory event '{}' failed in {} handler(s): {}",
                event,
                outcome.failures,
                err
            );
            panic!("mandatory event '{}' failed: {}", event, err);
        }
    }

    // --- Bootstrap ---

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    /// Run the bootstrap pipeline. Callable once per kernel.
    pub async fn bootstrap(&mut self) -> Result<()> {
        if self.bootstrapped {
            return Err(Error::KernelLifecycleError {
                phase: BootstrapPhase::RolesDecode,
                message: "kernel already bootstrapped".to_string(),
            });
        }
        self.bootstrapped = true;

        log::debug!("Bootstrapping with {} plugin(s)", self.plugins.plugin_count());
        for phase in BOOTSTRAP_SEQUENCE {
            log::trace!("Bootstrap phase '{}'", phase);
            self.run_phase(phase).await?;
        }
        log::info!("{} bootstrap complete", constants::APP_NAME);
        Ok(())
    }

    async fn run_phase(&mut self, phase: BootstrapPhase) -> Result<()> {
        if let Some(event) = phase.event() {
            self.must_trigger(event);
            return Ok(());
        }

        match phase {
            BootstrapPhase::RolesDecode => self.decode_roles(),
            BootstrapPhase::PluginInit => self.init_plugins(),
            BootstrapPhase::DatabaseInit => {
                let engine = self
                    .config
                    .get_or(constants::DB_ENGINE, constants::DEFAULT_DB_ENGINE);
                self.init_database(constants::DEFAULT_DATABASE, &engine, true)
                    .await
            }
            BootstrapPhase::HttpClientInit => {
                self.init_http_client();
                Ok(())
            }
            BootstrapPhase::TemplateLoad => self.load_templates(),
            BootstrapPhase::RendererAttach => {
                log::debug!("Attaching renderer with {} template(s)", self.templates.len());
                self.renderer = Some(Arc::clone(&self.templates));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn decode_roles(&mut self) -> Result<()> {
        if let Some(message) = &self.roles_error {
            return Err(Error::configuration(
                "roles",
                format!("invalid role definition: {message}"),
            ));
        }
        log::debug!("Decoded {} role(s)", self.roles.len());
        Ok(())
    }

    fn init_plugins(&mut self) -> Result<()> {
        for plugin in self.plugins.initialization_order()? {
            let name = plugin.name().to_string();
            if self.plugins.is_initialized(&name) {
                continue;
            }
            log::debug!("Initializing plugin '{}' v{}", name, plugin.version());
            plugin.init(self).map_err(|e| {
                Error::PluginSystem(PluginSystemError::InitializationError {
                    plugin_id: name.clone(),
                    source: Box::new(e),
                })
            })?;
            self.plugins.mark_initialized(&name);
        }
        Ok(())
    }

    /// Open a database pool and store it under `name`.
    pub async fn init_database(&mut self, name: &str, engine: &str, is_default: bool) -> Result<()> {
        let engine: DbEngine = engine.parse()?;
        let settings = DatabaseSettings::from_configuration(&self.config)?;
        log::debug!(
            "Opening {} database '{}' (slow threshold {:?}, query log {})",
            engine,
            name,
            settings.slow_threshold,
            settings.log_queries
        );

        let database = Database::connect(engine, &settings)
            .await
            .map_err(|source| Error::Database {
                name: name.to_string(),
                source,
            })?;

        self.databases.insert(name.to_string(), database);
        if is_default {
            self.default_database = Some(name.to_string());
        }
        Ok(())
    }

    fn init_http_client(&mut self) {
        let timeout = self.config.get_i64_or(
            constants::HTTP_CLIENT_TIMEOUT,
            constants::DEFAULT_HTTP_CLIENT_TIMEOUT_SECS,
        );
        match build_client(timeout.max(1) as u64) {
            Ok(client) => self.http_client = Some(client),
            Err(e) => log::warn!("HTTP client unavailable: {}", e),
        }
    }

    fn load_templates(&mut self) -> Result<()> {
        if self.config.get_bool(constants::TEMPLATE_DISABLE) {
            log::debug!("Template loading disabled");
            return Ok(());
        }

        let root = PathBuf::from(self.template_root());
        log::debug!(
            "Loading templates from '{}' with {} function(s)",
            root.display(),
            self.template_functions.len()
        );

        let mut set = TemplateSet::new(&self.template_functions);
        let outcome = set.load_dir(&root);
        self.templates = Arc::new(set);

        match outcome {
            Ok(count) => {
                log::debug!("Loaded {} template(s)", count);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load templates from '{}': {}", root.display(), e);
                Err(e.into())
            }
        }
    }

    /// Fire the `migrate` event. Not part of bootstrap.
    pub fn migrate(&mut self) -> Result<()> {
        self.fire(LifecycleEvent::Migrate).into_result()
    }

    // --- Databases ---

    pub fn db(&self) -> Option<&Database> {
        self.default_database
            .as_deref()
            .and_then(|name| self.databases.get(name))
    }

    pub fn database(&self, name: &str) -> Option<&Database> {
        self.databases.get(name)
    }

    pub fn database_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.databases.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    // --- Access control ---

    /// Replace the role table, including earlier grants, with `json`.
    ///
    /// A definition that does not decode leaves the table as it was and
    /// fails the roles phase of [`Kernel::bootstrap`].
    pub fn set_roles_definition(&mut self, json: &str) {
        match RoleTable::from_json(json) {
            Ok(decoded) => {
                self.roles = Arc::new(decoded);
                self.roles_error = None;
            }
            Err(e) => {
                log::warn!("Role definition rejected: {}", e);
                self.roles_error = Some(e.to_string());
            }
        }
    }

    pub fn roles(&self) -> &RoleTable {
        &self.roles
    }

    pub fn grant_permission(&mut self, role: &str, permission: &str) {
        Arc::make_mut(&mut self.roles).grant(role, permission);
    }

    pub fn can<S: AsRef<str>>(&self, permission: &str, roles: &[S]) -> bool {
        self.roles.can(permission, roles)
    }

    pub fn acl(&self) -> Acl {
        Acl::new(Arc::clone(&self.roles))
    }

    // --- HTTP ---

    pub fn use_middleware<F>(&mut self, middleware: F)
    where
        F: FnOnce(Router) -> Router + Send + Sync + 'static,
    {
        self.middlewares.push(Box::new(middleware));
    }

    pub fn response_formats(&self) -> &ResponseFormats {
        &self.response_formats
    }

    pub fn add_response_format(&mut self, media_type: &str, format: ResponseFormat) {
        self.response_formats.add(media_type, format);
    }

    pub fn http_client(&self) -> Option<&reqwest::Client> {
        self.http_client.as_ref()
    }

    pub fn templates(&self) -> Arc<TemplateSet> {
        Arc::clone(&self.templates)
    }

    pub fn renderer(&self) -> Option<Arc<TemplateSet>> {
        self.renderer.clone()
    }

    pub fn template_functions(&self) -> &TemplateFunctions {
        &self.template_functions
    }

    fn template_root(&self) -> String {
        self.config
            .get_or(constants::TEMPLATE_FOLDER, constants::DEFAULT_TEMPLATE_FOLDER)
    }

    /// Absolute paths of every mounted route, sorted
    pub fn route_paths(&self) -> Vec<String> {
        let mut paths = self.routes.lock().paths();
        paths.sort();
        paths
    }

    /// Assemble the request pipeline.
    pub fn into_router(mut self) -> Router {
        let routes = self.routes.lock().router();
        let renderer = self
            .renderer
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.templates));
        let dispatcher = Arc::new(ErrorDispatcher::new(
            Arc::clone(&renderer),
            Arc::new(self.response_formats.clone()),
            self.template_root(),
        ));

        let mut router = routes.fallback(|| async { RequestError::not_found() });
        for middleware in self.middlewares.drain(..) {
            router = middleware(router);
        }

        router
            .layer(Extension(self.acl()))
            .layer(Extension(renderer))
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(TraceLayer::new_for_http())
            .layer(from_fn_with_state(dispatcher, dispatch_errors))
    }

    /// Serve on `0.0.0.0:PORT` until the process stops.
    pub async fn serve(self) -> Result<()> {
        let port = self.config.get_or(constants::PORT, constants::DEFAULT_PORT);
        let addr = format!("0.0.0.0:{port}");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        log::info!("Server listening on {}", addr);
        axum::serve(listener, self.into_router()).await?;
        Ok(())
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::new()
    }
}
