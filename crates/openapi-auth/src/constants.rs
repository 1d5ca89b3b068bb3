//! Open API endpoint and configuration constants
//!
//! Host names and port are public protocol endpoints, not secrets. Client
//! secrets and tokens are loaded from configuration or the environment.

/// Live trading environment host
pub const LIVE_HOST: &str = "live.ctraderapi.com";

/// Demo trading environment host
pub const DEMO_HOST: &str = "demo.ctraderapi.com";

/// Protobuf-over-TLS port for both environments
pub const API_PORT: u16 = 5035;

/// Per-request deadline when the config does not set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Env var that overrides the configured client secret
pub const CLIENT_SECRET_ENV: &str = "OPENAPI_CLIENT_SECRET";

/// Env var naming the config file when no explicit path is given
pub const CONFIG_PATH_ENV: &str = "OPENAPI_CONFIG_PATH";

/// Config file used when neither an explicit path nor the env var is set
pub const DEFAULT_CONFIG_PATH: &str = "openapi.toml";
