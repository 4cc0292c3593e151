/// Configuration schema and defaults for resolvx.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[api]`, `[web]`, `[proxy]`, `[complaint]` and `[logging]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use std::net::IpAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level resolvx configuration.
///
/// Maps directly to the `~/.resolvx/config.toml` and `.resolvx.toml` file
/// schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvxConfig {
    pub api: ApiConfig,
    pub web: WebConfig,
    pub proxy: ProxyConfig,
    pub complaint: ComplaintConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Which ticket API origin to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    /// Decide from the dashboard host: local hosts use the proxy.
    #[default]
    Auto,
    /// Always go through the local development proxy.
    Development,
    /// Always call the CRM origin directly.
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Ticket API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// `auto`, `development` or `production`.
    pub environment: Environment,
    /// Local development proxy origin (see `resolvx proxy`).
    pub proxy_url: String,
    /// Production CRM origin.
    pub crm_url: String,
    /// Path of the ticket listing endpoint, appended to the origin.
    pub tickets_path: String,
    /// Time budget for the main dashboard load.
    pub dashboard_timeout_secs: u64,
    /// Time budget for the metrics bar refresh.
    pub metrics_timeout_secs: u64,
    /// Interval between metrics bar refreshes.
    pub metrics_interval_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Auto,
            proxy_url: "http://localhost:8001".to_string(),
            crm_url: "https://desperate-bird-personal-viky-c10a64c7.koyeb.app/crmserver"
                .to_string(),
            tickets_path: "/api/tickets".to_string(),
            dashboard_timeout_secs: 30,
            metrics_timeout_secs: 10,
            metrics_interval_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Resolve `auto` against the host the dashboard is served from.
    pub fn resolve_environment(&self, host: &str) -> Environment {
        match self.environment {
            Environment::Auto if is_local_host(host) => Environment::Development,
            Environment::Auto => Environment::Production,
            explicit => explicit,
        }
    }

    /// Full ticket endpoint URL for the given dashboard host.
    pub fn tickets_url(&self, host: &str) -> String {
        let origin = match self.resolve_environment(host) {
            Environment::Development => &self.proxy_url,
            _ => &self.crm_url,
        };
        format!("{}{}", origin.trim_end_matches('/'), self.tickets_path)
    }

    pub fn dashboard_timeout(&self) -> Duration {
        Duration::from_secs(self.dashboard_timeout_secs)
    }

    pub fn metrics_timeout(&self) -> Duration {
        Duration::from_secs(self.metrics_timeout_secs)
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_secs(self.metrics_interval_secs)
    }
}

/// Hostname heuristic: loopback, private-network and unspecified addresses
/// and `localhost` names count as local.
///
/// Accepts bare hosts as well as `host:port` and `[v6]:port` forms.
pub fn is_local_host(host: &str) -> bool {
    let host = strip_port(host.trim());
    if host.eq_ignore_ascii_case("localhost") || host.to_ascii_lowercase().ends_with(".localhost")
    {
        return true;
    }

    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => {
            ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
        }
        Ok(IpAddr::V6(ip)) => ip.is_loopback() || ip.is_unspecified(),
        Err(_) => false,
    }
}

fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    // A bare IPv6 address has more than one colon and no port.
    if host.matches(':').count() == 1 {
        return host.split(':').next().unwrap_or(host);
    }
    host
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Embedded dashboard server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Bind address for `resolvx web`.
    pub addr: String,
    /// Open the landing page in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8000".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [proxy]
// ---------------------------------------------------------------------------

/// Local CORS proxy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub port: u16,
    /// Time budget for each upstream CRM request.
    pub upstream_timeout_secs: u64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: 8001,
            upstream_timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// [complaint]
// ---------------------------------------------------------------------------

/// Landing page complaint form settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplaintConfig {
    /// Mailbox that receives complaints.
    pub target_email: String,
    /// Team name used in the letter salutation.
    pub team_name: String,
}

impl Default for ComplaintConfig {
    fn default() -> Self {
        Self {
            target_email: "reachus.sherlox@gmail.com".to_string(),
            team_name: "CarePilot - the customer's co-pilot".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Diagnostic logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset: error, warn, info, debug, trace.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl ResolvxConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `resolvx config init`.
    pub fn default_toml() -> String {
        r#"# resolvx Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (RESOLVX_*)
#   2. Project config (.resolvx.toml in current directory)
#   3. User global config (~/.resolvx/config.toml)
#   4. Built-in defaults

[api]
environment = "auto"                  # auto | development | production
proxy_url = "http://localhost:8001"   # used in development (run `resolvx proxy`)
crm_url = "https://desperate-bird-personal-viky-c10a64c7.koyeb.app/crmserver"
tickets_path = "/api/tickets"
dashboard_timeout_secs = 30
metrics_timeout_secs = 10
metrics_interval_secs = 30

[web]
addr = "127.0.0.1:8000"
open_browser = true

[proxy]
port = 8001
upstream_timeout_secs = 30

[complaint]
target_email = "reachus.sherlox@gmail.com"
team_name = "CarePilot - the customer's co-pilot"

[logging]
level = "warn"                        # error | warn | info | debug | trace (RUST_LOG wins)
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
