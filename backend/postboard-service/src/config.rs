/// Configuration management for Postboard Service
///
/// Loads configuration from environment variables.
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Entity store configuration
    pub store: StoreConfig,
    /// Post view cache configuration
    pub cache: CacheConfig,
    /// Uploaded file storage configuration
    pub media: MediaConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub http_port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Database configuration, present for the postgres backend
    pub database: Option<DatabaseConfig>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Min connections in pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Post view cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis URL; the in-process cache is used when unset
    pub redis_url: Option<String>,
    /// Lifetime of a cached post view entry
    #[serde(default = "default_post_view_ttl_secs")]
    pub post_view_ttl_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaBackend {
    Local,
    S3,
}

/// Uploaded file storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub backend: MediaBackend,
    /// Root directory for the local backend
    pub root: String,
}

// Default values
fn default_http_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_post_view_ttl_secs() -> u64 {
    60
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|s| s.parse().ok()).unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app = AppConfig {
            env: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            http_port: parse_or(lookup("PORT"), default_http_port()),
        };

        let backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => bail!("Unknown STORE_BACKEND: {}", other),
        };
        let database = match backend {
            StoreBackend::Postgres => Some(DatabaseConfig {
                url: lookup("DATABASE_URL")
                    .context("DATABASE_URL environment variable not set")?,
                max_connections: parse_or(
                    lookup("DB_MAX_CONNECTIONS"),
                    default_max_connections(),
                ),
                min_connections: parse_or(
                    lookup("DB_MIN_CONNECTIONS"),
                    default_min_connections(),
                ),
            }),
            StoreBackend::Memory => None,
        };

        let cache = CacheConfig {
            redis_url: lookup("REDIS_URL").filter(|url| !url.is_empty()),
            post_view_ttl_secs: parse_or(
                lookup("POST_VIEW_CACHE_TTL_SECS"),
                default_post_view_ttl_secs(),
            ),
        };

        let media = MediaConfig {
            backend: match lookup("MEDIA_BACKEND").as_deref() {
                None | Some("local") => MediaBackend::Local,
                Some("s3") => MediaBackend::S3,
                Some(other) => bail!("Unknown MEDIA_BACKEND: {}", other),
            },
            root: lookup("MEDIA_ROOT").unwrap_or_else(|| "./storage/public".to_string()),
        };

        Ok(Config {
            app,
            store: StoreConfig { backend, database },
            cache,
            media,
        })
    }
}
