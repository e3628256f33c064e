use std::env;

/// Application name used in logs and the health endpoint.
pub const APP_NAME: &str = "medbase";

/// Application version from Cargo.toml.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable naming the record service base URL.
pub const SERVICE_URL_VAR: &str = "MEDBASE_SERVICE_URL";

/// Environment variable holding the record service access key.
pub const SERVICE_KEY_VAR: &str = "MEDBASE_SERVICE_KEY";

/// Local development stack defaults, matching a stock `supabase start`.
const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:54321";
const DEFAULT_SERVICE_KEY: &str = "dev-anon-key";

/// Row cap applied to searches and listings when the caller gives none.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Default bind address for the `api` subcommand.
pub const DEFAULT_API_HOST: &str = "0.0.0.0";

/// Default port for the `api` subcommand.
pub const DEFAULT_API_PORT: u16 = 5000;

/// Connection settings for the hosted record service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub url: String,
    pub key: String,
}

impl ServiceConfig {
    /// Read the service URL and access key from the environment, falling
    /// back to the local development defaults when unset.
    pub fn from_env() -> Self {
        Self::from_vars(env::var(SERVICE_URL_VAR).ok(), env::var(SERVICE_KEY_VAR).ok())
    }

    fn from_vars(url: Option<String>, key: Option<String>) -> Self {
        Self {
            url: url.unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string()),
            key: key.unwrap_or_else(|| DEFAULT_SERVICE_KEY.to_string()),
        }
    }
}

/// Tracing filter applied when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "medbase=info"
}

/// Filter applied when the API runs with `--debug` and `RUST_LOG` is unset.
pub fn debug_log_filter() -> &'static str {
    "medbase=debug"
}
