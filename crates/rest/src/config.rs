//! Server configuration for the search gateway.
//!
//! This module provides configuration types for the gateway, supporting
//! both programmatic configuration and environment variable overrides.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ESS_SERVER_PORT` | 8080 | Server port |
//! | `ESS_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `ESS_LOG_LEVEL` | info | Log level |
//! | `ESS_REQUEST_TIMEOUT` | 60 | Whole-request timeout (seconds) |
//! | `ESS_ENABLE_CORS` | true | Enable CORS |
//! | `ESS_CORS_ORIGINS` | * | Allowed origins |
//! | `ESS_BASES` | (none) | Known bases, comma-separated |
//! | `ESS_SRU_TARGET_URL` | http://localhost:9000 | SRU proxy base URL |
//! | `ESS_OPEN_FORMAT_URL` | http://localhost:9001/format | Formatting service URL |
//! | `ESS_MAX_PAGE_SIZE` | 50 | Maximum rows per request |
//! | `ESS_BACKEND_TIMEOUT` | 30 | SRU call timeout (seconds) |
//! | `ESS_FORMATTING_TIMEOUT` | 30 | Deadline for formatting all records (seconds) |
//! | `ESS_IDENTIFIER_PREFIX` | `base: ` | Prefix of every record identifier |
//!
//! # Example
//!
//! ```rust
//! use ess_rest::ServerConfig;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     bases: vec!["bibdk".to_string()],
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use clap::Parser;
use url::Url;

/// Identifier prefix used when none is configured.
pub const DEFAULT_IDENTIFIER_PREFIX: &str = "base: ";

/// Server configuration for the search gateway.
///
/// This struct can be constructed from environment variables using [`ServerConfig::from_env`],
/// from command line arguments using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "ess")]
#[command(about = "External search gateway in front of an SRU proxy")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "ESS_SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "ESS_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "ESS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Whole-request timeout in seconds.
    #[arg(long, env = "ESS_REQUEST_TIMEOUT", default_value = "60")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "ESS_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "ESS_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Bases that may be searched (comma-separated).
    #[arg(long, env = "ESS_BASES", value_delimiter = ',')]
    pub bases: Vec<String>,

    /// Base URL of the SRU proxy; the base name is appended as a path segment.
    #[arg(long, env = "ESS_SRU_TARGET_URL", default_value = "http://localhost:9000")]
    pub sru_target_url: String,

    /// URL of the formatting service.
    #[arg(
        long,
        env = "ESS_OPEN_FORMAT_URL",
        default_value = "http://localhost:9001/format"
    )]
    pub open_format_url: String,

    /// Maximum number of rows a single request may ask for.
    #[arg(long, env = "ESS_MAX_PAGE_SIZE", default_value = "50")]
    pub max_page_size: u32,

    /// Timeout for a single SRU call in seconds.
    #[arg(long, env = "ESS_BACKEND_TIMEOUT", default_value = "30")]
    pub backend_timeout: u64,

    /// Deadline in seconds for formatting every record of one response.
    #[arg(long, env = "ESS_FORMATTING_TIMEOUT", default_value = "30")]
    pub formatting_timeout: u64,

    /// Prefix prepended to every record identifier.
    #[arg(long, env = "ESS_IDENTIFIER_PREFIX", default_value = DEFAULT_IDENTIFIER_PREFIX)]
    pub identifier_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            request_timeout: 60,
            enable_cors: true,
            cors_origins: "*".to_string(),
            bases: Vec::new(),
            sru_target_url: "http://localhost:9000".to_string(),
            open_format_url: "http://localhost:9001/format".to_string(),
            max_page_size: 50,
            backend_timeout: 30,
            formatting_timeout: 30,
            identifier_prefix: DEFAULT_IDENTIFIER_PREFIX.to_string(),
        }
    }
}

impl ServerConfig {
    /// Creates a new ServerConfig from environment variables.
    ///
    /// This is a convenience method that parses environment variables without
    /// requiring command line arguments.
    pub fn from_env() -> Self {
        Self::try_parse_from(["ess"]).unwrap_or_default()
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Deadline for one whole search request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Timeout applied to each SRU call.
    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout)
    }

    /// Deadline for the formatting fan-out of one request.
    pub fn formatting_timeout(&self) -> Duration {
        Duration::from_secs(self.formatting_timeout)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.bases.iter().all(|b| b.trim().is_empty()) {
            errors.push("At least one base must be configured".to_string());
        }

        if self.max_page_size == 0 {
            errors.push("Max page size cannot be 0".to_string());
        }

        if self.formatting_timeout == 0 {
            errors.push("Formatting timeout cannot be 0".to_string());
        }

        if let Err(e) = Url::parse(&self.sru_target_url) {
            errors.push(format!("Invalid SRU target URL '{}': {}", self.sru_target_url, e));
        }

        if let Err(e) = Url::parse(&self.open_format_url) {
            errors.push(format!(
                "Invalid formatting service URL '{}': {}",
                self.open_format_url, e
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// This uses ephemeral port 0 and short timeouts.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            request_timeout: 10,
            enable_cors: false,
            cors_origins: "*".to_string(),
            bases: vec!["bibdk".to_string(), "danbib".to_string()],
            sru_target_url: "http://127.0.0.1:9".to_string(),
            open_format_url: "http://127.0.0.1:9/format".to_string(),
            max_page_size: 10,
            backend_timeout: 5,
            formatting_timeout: 5,
            identifier_prefix: DEFAULT_IDENTIFIER_PREFIX.to_string(),
        }
    }
}
