use anyhow::{Context, Result};

const DEFAULT_INGEST_API_BASE: &str = "http://127.0.0.1:5002";
const DEFAULT_EVALUATION_API_BASE: &str = "http://127.0.0.1:5000";
const DEFAULT_ACCEPTED_MIME_TYPE: &str = "application/pdf";
/// Room for multipart boundaries, part headers and text fields.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Application configuration loaded from environment variables.
/// Every setting has a local-development default; malformed numbers abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Document ingestion service (batch and single résumé ingest).
    pub ingest_api_base: String,
    /// Scoring/evaluation service (batch summary and skill details).
    pub evaluation_api_base: String,
    pub port: u16,
    /// Upper bound for every outbound request.
    pub request_timeout_secs: u64,
    pub accepted_mime_type: String,
    pub max_file_bytes: u64,
    /// Largest accepted request body. Raised to fit at least one file of
    /// `max_file_bytes` plus form overhead.
    pub max_upload_bytes: u64,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ingest_api_base: DEFAULT_INGEST_API_BASE.to_string(),
            evaluation_api_base: DEFAULT_EVALUATION_API_BASE.to_string(),
            port: 8080,
            request_timeout_secs: 120,
            accepted_mime_type: DEFAULT_ACCEPTED_MIME_TYPE.to_string(),
            max_file_bytes: 10 * 1024 * 1024,
            max_upload_bytes: 64 * 1024 * 1024,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            ingest_api_base: env_or("INGEST_API_BASE", defaults.ingest_api_base),
            evaluation_api_base: env_or("EVALUATION_API_BASE", defaults.evaluation_api_base),
            port: parse_env("PORT", defaults.port)
                .context("PORT must be a valid port number")?,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)
                .context("REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            accepted_mime_type: env_or("ACCEPTED_MIME_TYPE", defaults.accepted_mime_type)
                .to_ascii_lowercase(),
            max_file_bytes: parse_env("MAX_FILE_BYTES", defaults.max_file_bytes)
                .context("MAX_FILE_BYTES must be a whole number of bytes")?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)
                .context("MAX_UPLOAD_BYTES must be a whole number of bytes")?,
            rust_log: env_or("RUST_LOG", defaults.rust_log),
        })
    }

    /// Body limit for console routes. Never below one full-size file.
    pub fn upload_body_limit(&self) -> usize {
        let floor = self.max_file_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
        usize::try_from(self.max_upload_bytes.max(floor)).unwrap_or(usize::MAX)
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        _ => Ok(default),
    }
}
