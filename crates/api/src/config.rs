/// Which Configuration Store backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL via `DATABASE_URL` (default).
    Postgres,
    /// Process memory; state is lost on restart.
    Memory,
}

impl StoreBackend {
    fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Self::Memory,
            "postgres" | "postgresql" | "" => Self::Postgres,
            other => panic!("STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        }
    }
}

/// Settings for the live F5 controller client.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Per-request timeout in seconds (default: `20`).
    pub timeout_secs: u64,
    /// Accept self-signed controller certificates (default: `true`; lab
    /// BIG-IPs rarely carry a trusted certificate).
    pub accept_invalid_certs: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            accept_invalid_certs: true,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Store backend (default: PostgreSQL).
    pub store_backend: StoreBackend,
    /// Live controller client settings.
    pub controller: ControllerConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                  |
    /// |----------------------------------|--------------------------|
    /// | `HOST`                           | `0.0.0.0`                |
    /// | `PORT`                           | `3000`                   |
    /// | `CORS_ORIGINS`                   | `http://localhost:4200`  |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                     |
    /// | `STORE_BACKEND`                  | `postgres`               |
    /// | `CONTROLLER_TIMEOUT_SECS`        | `20`                     |
    /// | `CONTROLLER_ACCEPT_INVALID_CERTS`| `true`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:4200".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let store_backend = StoreBackend::from_env_value(
            &std::env::var("STORE_BACKEND").unwrap_or_default(),
        );

        let timeout_secs: u64 = std::env::var("CONTROLLER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("CONTROLLER_TIMEOUT_SECS must be a valid u64");

        let accept_invalid_certs: bool = std::env::var("CONTROLLER_ACCEPT_INVALID_CERTS")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("CONTROLLER_ACCEPT_INVALID_CERTS must be true or false");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            store_backend,
            controller: ControllerConfig {
                timeout_secs,
                accept_invalid_certs,
            },
        }
    }
}
