//! Process configuration.
//!
//! Assembled once at process entry and handed to each stage by reference.
//! Secrets live here only as far as the stages need them to build clients;
//! [`Config::log_keys`] prints previews, never full values.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{BlogflowError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Deployment environment name reported by `/health`.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Blob storage.
    #[serde(default)]
    pub storage: StorageConfig,
    /// HTTP server.
    #[serde(default)]
    pub server: ServerConfig,
    /// Scheduler timer.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Domain suggestion stage.
    #[serde(default)]
    pub domains: DomainConfig,
    /// Publisher stage.
    #[serde(default)]
    pub publisher: PublisherConfig,
    /// Notification delivery.
    #[serde(default)]
    pub notify: NotifyConfig,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_environment() -> String {
    "development".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            storage: StorageConfig::default(),
            server: ServerConfig::default(),
            scheduler: SchedulerConfig::default(),
            domains: DomainConfig::default(),
            publisher: PublisherConfig::default(),
            notify: NotifyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Blob storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the filesystem store.
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./data"),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the results logger binds to.
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Scheduler timer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between scheduler ticks when serving.
    pub tick_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_secs: 3600 }
    }
}

impl SchedulerConfig {
    /// Tick interval.
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.tick_secs.max(1))
    }
}

/// Domain suggestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Registrar API key.
    pub api_key: Option<String>,
    /// Registrar API secret.
    pub api_secret: Option<String>,
    /// Registrar base URL.
    #[serde(default = "default_registrar_url")]
    pub base_url: String,
    /// Highest acceptable price, major currency units.
    #[serde(default = "default_max_price")]
    pub max_price: f64,
    /// TLDs to try, without the leading dot. Only the first five are used.
    #[serde(default = "default_tlds")]
    pub tlds: Vec<String>,
    /// Delay between availability queries.
    #[serde(default = "default_query_delay_ms")]
    pub query_delay_ms: u64,
}

fn default_registrar_url() -> String {
    "https://api.godaddy.com".to_string()
}

fn default_max_price() -> f64 {
    50.0
}

fn default_tlds() -> Vec<String> {
    ["com", "net", "org", "blog", "io"].iter().map(ToString::to_string).collect()
}

fn default_query_delay_ms() -> u64 {
    1000
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            base_url: default_registrar_url(),
            max_price: default_max_price(),
            tlds: default_tlds(),
            query_delay_ms: default_query_delay_ms(),
        }
    }
}

impl DomainConfig {
    /// Returns `(key, secret)` or a configuration error.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.api_key.as_deref(), self.api_secret.as_deref()) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => Ok((key, secret)),
            _ => Err(BlogflowError::config(
                "GODADDY_API_KEY and GODADDY_API_SECRET must be set",
            )),
        }
    }

    /// Delay between availability queries.
    #[must_use]
    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.query_delay_ms)
    }
}

/// Publisher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Base URL of the WordPress site.
    pub site_url: Option<String>,
    /// WordPress user.
    pub username: Option<String>,
    /// WordPress application password.
    pub app_password: Option<String>,
    /// Skip publication when a successful `publish.json` already exists.
    #[serde(default = "default_true")]
    pub skip_if_published: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            site_url: None,
            username: None,
            app_password: None,
            skip_if_published: true,
        }
    }
}

impl PublisherConfig {
    /// Returns `(site_url, username, app_password)` or a configuration error.
    pub fn credentials(&self) -> Result<(&str, &str, &str)> {
        match (
            self.site_url.as_deref(),
            self.username.as_deref(),
            self.app_password.as_deref(),
        ) {
            (Some(site), Some(user), Some(password)) if !site.is_empty() && !user.is_empty() => {
                Ok((site, user, password))
            }
            _ => Err(BlogflowError::config(
                "WORDPRESS_SITE_URL, WORDPRESS_USERNAME and WORDPRESS_APP_PASSWORD must be set",
            )),
        }
    }
}

/// Notification settings. Notifications are sent only when all are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// SendGrid API key.
    pub sendgrid_api_key: Option<String>,
    /// Sender address.
    pub from: Option<String>,
    /// Recipient address.
    pub to: Option<String>,
}

impl NotifyConfig {
    /// Returns true if every notification field is set.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.sendgrid_api_key.is_some() && self.from.is_some() && self.to.is_some()
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging settings. The level filter comes from `RUST_LOG`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub default_filter: String,
}

fn default_filter() -> String {
    "blogflow=info,tower_http=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            default_filter: default_filter(),
        }
    }
}

impl Config {
    /// Loads configuration from the process environment, reading `.env`
    /// first when present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let parse_u64 = |key: &str, default: u64| -> Result<u64> {
            get(key).map_or(Ok(default), |v| {
                v.trim()
                    .parse()
                    .map_err(|_| BlogflowError::config(format!("{key} must be an integer, got '{v}'")))
            })
        };

        let max_price = match get("DOMAIN_MAX_PRICE") {
            Some(v) => v
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite() && *p >= 0.0)
                .ok_or_else(|| {
                    BlogflowError::config(format!("DOMAIN_MAX_PRICE must be a non-negative number, got '{v}'"))
                })?,
            None => default_max_price(),
        };

        let tlds = get("DOMAIN_TLDS").map_or_else(default_tlds, |v| {
            v.split(',')
                .map(|t| t.trim().trim_start_matches('.').to_lowercase())
                .filter(|t| !t.is_empty())
                .collect()
        });

        let skip_if_published = match get("PUBLISH_SKIP_IF_PUBLISHED") {
            Some(v) => parse_bool(&v).ok_or_else(|| {
                BlogflowError::config(format!("PUBLISH_SKIP_IF_PUBLISHED must be a boolean, got '{v}'"))
            })?,
            None => true,
        };

        let format = match get("LOG_FORMAT").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(BlogflowError::config(format!("LOG_FORMAT must be text or json, got '{other}'")))
            }
        };

        Ok(Self {
            environment: get("BLOGFLOW_ENV").unwrap_or_else(default_environment),
            storage: StorageConfig {
                root: get("STORAGE_ROOT").map_or_else(|| StorageConfig::default().root, PathBuf::from),
            },
            server: ServerConfig {
                bind_addr: get("BIND_ADDR").unwrap_or_else(|| ServerConfig::default().bind_addr),
            },
            scheduler: SchedulerConfig {
                tick_secs: parse_u64("SCHEDULER_TICK_SECS", SchedulerConfig::default().tick_secs)?,
            },
            domains: DomainConfig {
                api_key: get("GODADDY_API_KEY"),
                api_secret: get("GODADDY_API_SECRET"),
                base_url: get("GODADDY_BASE_URL").unwrap_or_else(default_registrar_url),
                max_price,
                tlds,
                query_delay_ms: parse_u64("DOMAIN_QUERY_DELAY_MS", default_query_delay_ms())?,
            },
            publisher: PublisherConfig {
                site_url: get("WORDPRESS_SITE_URL").map(|s| s.trim_end_matches('/').to_string()),
                username: get("WORDPRESS_USERNAME"),
                app_password: get("WORDPRESS_APP_PASSWORD"),
                skip_if_published,
            },
            notify: NotifyConfig {
                sendgrid_api_key: get("SENDGRID_API_KEY"),
                from: get("NOTIFY_FROM"),
                to: get("NOTIFY_TO"),
            },
            logging: LoggingConfig {
                format,
                default_filter: default_filter(),
            },
        })
    }

    /// Logs which credentials are present, as short previews.
    pub fn log_keys(&self) {
        fn preview(val: Option<&String>) -> String {
            match val {
                Some(v) => {
                    let n = v.chars().take(4).collect::<String>();
                    format!("{n}...({} chars)", v.len())
                }
                None => "<not set>".to_string(),
            }
        }

        tracing::info!(environment = %self.environment, storage_root = %self.storage.root.display(), "Config loaded");
        tracing::info!("  GODADDY_API_KEY: {}", preview(self.domains.api_key.as_ref()));
        tracing::info!("  WORDPRESS_SITE_URL: {}", self.publisher.site_url.as_deref().unwrap_or("<not set>"));
        tracing::info!("  WORDPRESS_APP_PASSWORD: {}", preview(self.publisher.app_password.as_ref()));
        tracing::info!("  SENDGRID_API_KEY: {}", preview(self.notify.sendgrid_api_key.as_ref()));
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
