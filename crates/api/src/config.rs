/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Lifetime of authentication tokens issued at login, in hours (default: `24`).
    pub auth_token_ttl_hours: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default   |
    /// |------------------------|-----------|
    /// | `HOST`                 | `0.0.0.0` |
    /// | `PORT`                 | `8080`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`      |
    /// | `AUTH_TOKEN_TTL_HOURS` | `24`      |
    ///
    /// # Panics
    ///
    /// Panics if a variable is set but does not parse.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let auth_token_ttl_hours: i64 = std::env::var("AUTH_TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "24".into())
            .parse()
            .expect("AUTH_TOKEN_TTL_HOURS must be a valid i64");
        assert!(auth_token_ttl_hours > 0, "AUTH_TOKEN_TTL_HOURS must be positive");

        Self {
            host,
            port,
            request_timeout_secs,
            auth_token_ttl_hours,
        }
    }

    /// Authentication token lifetime as a [`chrono::Duration`].
    pub fn auth_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.auth_token_ttl_hours)
    }
}
