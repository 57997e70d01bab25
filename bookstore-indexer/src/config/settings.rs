//! Environment-driven settings for the catalog service.

use std::env;
use std::fmt;
use std::time::Duration;

use bookstore_repository::SequentialIdPolicy;
use bookstore_search_repository::IndexConfig;
use tracing::warn;

use crate::IndexingError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default index alias.
const DEFAULT_INDEX_ALIAS: &str = "book";

/// Default connection retry interval in seconds.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// Default storage bucket.
const DEFAULT_BUCKET: &str = "my-bucket";

/// Connection mode for OpenSearch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionMode {
    /// Fail immediately if connection fails.
    FailFast,
    /// Retry connection until successful.
    #[default]
    Retry,
}

impl ConnectionMode {
    /// Parse a connection mode.
    ///
    /// Valid values: "fail-fast" or "retry" (case-insensitive).
    /// Defaults to "retry" if invalid.
    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Self::FailFast,
            "retry" => Self::Retry,
            _ => {
                warn!(
                    value = %value,
                    "Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'retry'"
                );
                Self::Retry
            }
        }
    }
}

/// Object storage settings for author avatars and static assets.
///
/// The credentials are passed through untouched; the storage backend itself
/// lives outside this service.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
}

impl StorageSettings {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            bucket: bucket.into(),
        }
    }

    /// Public host serving the bucket.
    pub fn custom_domain(&self) -> String {
        format!("{}.s3.amazonaws.com", self.bucket)
    }

    pub fn static_url(&self) -> String {
        format!("https://{}/static/", self.custom_domain())
    }

    pub fn media_url_base(&self) -> String {
        format!("https://{}/media/", self.custom_domain())
    }

    /// Public URL of an uploaded file stored under `key`.
    pub fn media_url(&self, key: &str) -> String {
        format!("{}{}", self.media_url_base(), key.trim_start_matches('/'))
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self::new("", "", DEFAULT_BUCKET)
    }
}

impl fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSettings")
            .field("access_key_id", &redact(&self.access_key_id))
            .field("secret_access_key", &redact(&self.secret_access_key))
            .field("bucket", &self.bucket)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        ""
    } else {
        "[redacted]"
    }
}

/// Settings for the whole service, read once at startup.
#[derive(Clone)]
pub struct Settings {
    pub database_url: String,
    pub opensearch_url: String,
    pub index_config: IndexConfig,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    pub sequential_id_policy: SequentialIdPolicy,
    pub storage: StorageSettings,
    pub allowed_hosts: Vec<String>,
    pub debug: bool,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: Postgres URL; assembled from `DB_HOST`, `DB_PORT`,
    ///   `DB_NAME`, `DB_USER` and `DB_PASSWORD` when unset
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `BOOK_INDEX_ALIAS`: Index alias name (default: "book")
    /// - `BOOK_INDEX_VERSION`: Index version number (default: 0)
    /// - `OPENSEARCH_CONNECTION_MODE`: "fail-fast" or "retry" (default: retry)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `SEQUENTIAL_ID_POLICY`: "serialized" or "unguarded" (default: serialized)
    /// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_STORAGE_BUCKET_NAME`
    /// - `ALLOWED_HOSTS`: Comma-separated host names
    /// - `DEBUG`: "true" or "1" to enable debug mode
    pub fn from_env() -> Result<Self, IndexingError> {
        let index_version = match env::var("BOOK_INDEX_VERSION") {
            Ok(v) => v.parse::<u32>().map_err(|_| {
                IndexingError::config(format!("BOOK_INDEX_VERSION must be a number, got {}", v))
            })?,
            Err(_) => 0,
        };

        let sequential_id_policy = match env::var("SEQUENTIAL_ID_POLICY") {
            Ok(v) => v
                .parse::<SequentialIdPolicy>()
                .map_err(|e| IndexingError::config(e.to_string()))?,
            Err(_) => SequentialIdPolicy::default(),
        };

        let retry_interval = env::var("OPENSEARCH_RETRY_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_INTERVAL_SECS);

        Ok(Self {
            database_url: database_url_from_env()?,
            opensearch_url: env_or("OPENSEARCH_URL", DEFAULT_OPENSEARCH_URL),
            index_config: IndexConfig::new(
                env_or("BOOK_INDEX_ALIAS", DEFAULT_INDEX_ALIAS),
                index_version,
            ),
            connection_mode: env::var("OPENSEARCH_CONNECTION_MODE")
                .map(|v| ConnectionMode::parse(&v))
                .unwrap_or_default(),
            retry_interval: Duration::from_secs(retry_interval),
            sequential_id_policy,
            storage: StorageSettings::new(
                env_or("AWS_ACCESS_KEY_ID", ""),
                env_or("AWS_SECRET_ACCESS_KEY", ""),
                env_or("AWS_STORAGE_BUCKET_NAME", DEFAULT_BUCKET),
            ),
            allowed_hosts: split_hosts(&env_or("ALLOWED_HOSTS", "")),
            debug: matches!(
                env_or("DEBUG", "false").to_lowercase().as_str(),
                "true" | "1" | "yes"
            ),
        })
    }

    /// The database URL with its password masked, for logging.
    pub fn redacted_database_url(&self) -> String {
        match url::Url::parse(&self.database_url) {
            Ok(mut url) if url.password().is_some() => {
                let _ = url.set_password(Some("****"));
                url.to_string()
            }
            _ => self.database_url.clone(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// `DATABASE_URL`, or a URL assembled from the `DB_*` parts with the
/// credentials and database name percent-encoded.
fn database_url_from_env() -> Result<String, IndexingError> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return Ok(url);
    }

    let host = env_or("DB_HOST", "postgres");
    let port = env_or("DB_PORT", "5432");
    let mut url = url::Url::parse(&format!("postgres://{}:{}", host, port)).map_err(|e| {
        IndexingError::config(format!("Invalid DB_HOST/DB_PORT {}:{}: {}", host, port, e))
    })?;

    url.set_path(&format!("/{}", env_or("DB_NAME", "postgres")));
    url.set_username(&env_or("DB_USER", "postgres"))
        .map_err(|_| IndexingError::config("DB_USER cannot be set on the database URL"))?;
    url.set_password(Some(&env_or("DB_PASSWORD", "postgres")))
        .map_err(|_| IndexingError::config("DB_PASSWORD cannot be set on the database URL"))?;

    Ok(url.into())
}

fn split_hosts(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .collect()
}
