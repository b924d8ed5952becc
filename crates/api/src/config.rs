use std::path::PathBuf;

use axum::http::HeaderValue;
use instabids_storage::MediaStorageConfig;

/// Startup configuration problems. The server refuses to start on any of
/// these instead of falling back to placeholder values.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Request body limit; bounds multipart uploads (default: 50 MiB).
    pub max_upload_bytes: usize,
    pub log_format: LogFormat,
    /// Mount the in-memory mock bid card API (default: off).
    pub mock_bid_cards: bool,
    pub database_url: String,
    pub media: MediaStorageConfig,
}

/// Where the local media provider's files are served from.
pub const LOCAL_MEDIA_ROUTE: &str = "/media";

const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `DATABASE_URL`          | required                |
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `MAX_UPLOAD_BYTES`      | `52428800`              |
    /// | `LOG_FORMAT`            | `pretty`                |
    /// | `MOCK_BID_CARDS`        | `false`                 |
    /// | `MEDIA_STORAGE`         | required (`local`/`s3`) |
    ///
    /// `MEDIA_STORAGE=local` needs `MEDIA_LOCAL_DIR` and
    /// `MEDIA_PUBLIC_BASE_URL`; `MEDIA_STORAGE=s3` needs `S3_BUCKET`,
    /// `S3_REGION` and `S3_PUBLIC_BASE_URL`, with optional `S3_ENDPOINT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host = env.or("HOST", "0.0.0.0");
        let port: u16 = env.parsed("PORT", 3000)?;
        let cors_origins: Vec<String> = env
            .or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| invalid("CORS_ORIGINS", origin, e.to_string()))?;
        }
        let request_timeout_secs: u64 = env.parsed("REQUEST_TIMEOUT_SECS", 30)?;
        let max_upload_bytes: usize = env.parsed("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        let log_format = match env.or("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => return Err(invalid("LOG_FORMAT", other, "expected 'pretty' or 'json'")),
        };
        let mock_bid_cards = env.flag("MOCK_BID_CARDS")?;

        let database_url = env.required("DATABASE_URL")?;
        let media = media_config(&env)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_bytes,
            log_format,
            mock_bid_cards,
            database_url,
            media,
        })
    }
}

fn media_config(env: &Env<'_>) -> Result<MediaStorageConfig, ConfigError> {
    let provider = env.required("MEDIA_STORAGE")?;
    match provider.to_ascii_lowercase().as_str() {
        "local" => Ok(MediaStorageConfig::Local {
            root: PathBuf::from(env.required("MEDIA_LOCAL_DIR")?),
            public_base_url: env.url("MEDIA_PUBLIC_BASE_URL")?,
        }),
        "s3" => Ok(MediaStorageConfig::S3 {
            bucket: env.required("S3_BUCKET")?,
            region: env.required("S3_REGION")?,
            public_base_url: env.url("S3_PUBLIC_BASE_URL")?,
            endpoint: match env.get("S3_ENDPOINT") {
                Some(_) => Some(env.url("S3_ENDPOINT")?),
                None => None,
            },
        }),
        other => Err(invalid("MEDIA_STORAGE", other, "expected 'local' or 's3'")),
    }
}

fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Lookup helpers. Blank values count as unset.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn parsed<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|e: T::Err| invalid(key, &raw, e.to_string())),
        }
    }

    fn flag(&self, key: &'static str) -> Result<bool, ConfigError> {
        match self.get(key).map(|v| v.to_ascii_lowercase()) {
            None => Ok(false),
            Some(v) => match v.as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(invalid(key, &v, "expected true or false")),
            },
        }
    }

    fn url(&self, key: &'static str) -> Result<String, ConfigError> {
        let value = self.required(key)?;
        if value.starts_with("http://") || value.starts_with("https://") {
            Ok(value)
        } else {
            Err(invalid(key, &value, "must be an http(s) URL"))
        }
    }
}
