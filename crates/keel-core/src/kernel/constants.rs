/// Application name
pub const APP_NAME: &str = "Keel";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Database engine selector
pub const DB_ENGINE: &str = "DB_ENGINE";

/// Engine used when `DB_ENGINE` is unset
pub const DEFAULT_DB_ENGINE: &str = "sqlite";

/// Connection target of the default database. Required.
pub const DB_URI: &str = "DB_URI";

/// Slow query threshold in milliseconds
pub const DB_SLOW_THRESHOLD: &str = "DB_SLOW_THRESHOLD";

pub const DEFAULT_DB_SLOW_THRESHOLD_MS: i64 = 400;

/// Any non-empty value raises statement logging to `Info`
pub const LOG_QUERY: &str = "LOG_QUERY";

/// Root directory scanned for `*.html` templates
pub const TEMPLATE_FOLDER: &str = "TEMPLATE_FOLDER";

pub const DEFAULT_TEMPLATE_FOLDER: &str = "./templates";

/// Boolean flag turning template loading off entirely
pub const TEMPLATE_DISABLE: &str = "TEMPLATE_DISABLE";

/// Listener port
pub const PORT: &str = "PORT";

pub const DEFAULT_PORT: &str = "8080";

/// Request timeout (seconds) of the shared outbound HTTP client
pub const HTTP_CLIENT_TIMEOUT: &str = "HTTP_CLIENT_TIMEOUT";

pub const DEFAULT_HTTP_CLIENT_TIMEOUT_SECS: i64 = 30;

/// Name under which the bootstrap database is stored
pub const DEFAULT_DATABASE: &str = "default";

/// Default route groups wired by the kernel constructor
pub const MAIN_GROUP: &str = "main";
pub const PUBLIC_GROUP: &str = "public";
pub const API_GROUP: &str = "api";

pub const MAIN_PREFIX: &str = "/";
pub const PUBLIC_PREFIX: &str = "/public";
pub const API_PREFIX: &str = "/api";

/// Health probe path
pub const HEALTH_PATH: &str = "/health";
