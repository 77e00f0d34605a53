//! Configuration management for Swatchbook.
//!
//! Loads configuration from environment variables; `main` reads `.env`
//! into the environment first. The resulting [`Config`] is built once in `main` and handed to
//! [`crate::AppState::new`]; nothing reads the environment after startup.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use swatchbook_extract::{ImaggaConfig, RetryPolicy};

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub imagga: ImaggaSettings,
    pub colormind: ColormindSettings,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Where palettes live. The platform picks the backend.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub platform: Platform,
    pub database_path: String,
    pub blob_path: String,
}

#[derive(Debug, Clone)]
pub struct ImaggaSettings {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub min_request_interval_ms: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ColormindSettings {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_upload_size: usize,
    /// Directory whose images can be extracted by path.
    pub image_library: PathBuf,
}

/// Deployment flavour.
///
/// `Native` stores palettes in SQLite and probes the extraction API before
/// uploading. `Web` stores them as one JSON blob and skips the probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Native,
    Web,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Web => "web",
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "native" | "ios" | "android" => Ok(Self::Native),
            "web" => Ok(Self::Web),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        let platform = env_or("SWATCHBOOK_PLATFORM", "native")
            .parse()
            .unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "Falling back to native platform");
                Platform::Native
            });

        Self {
            server: ServerConfig {
                host: env_or("HOST", "0.0.0.0"),
                port: env_parse("PORT", 8780),
            },
            storage: StorageConfig {
                platform,
                database_path: env_or("DATABASE_PATH", "./data/swatchbook.db"),
                blob_path: env_or("BLOB_STORAGE_PATH", "./data/blob"),
            },
            imagga: ImaggaSettings {
                base_url: env_or("IMAGGA_BASE_URL", swatchbook_extract::imagga::DEFAULT_BASE_URL),
                api_key: env_or("IMAGGA_API_KEY", ""),
                api_secret: env_or("IMAGGA_API_SECRET", ""),
                min_request_interval_ms: env_parse("IMAGGA_MIN_REQUEST_INTERVAL_MS", 2000),
                max_retries: env_parse("IMAGGA_MAX_RETRIES", 3),
                retry_base_delay_ms: env_parse("IMAGGA_RETRY_BASE_DELAY_MS", 1000),
            },
            colormind: ColormindSettings {
                url: env_or("COLORMIND_URL", swatchbook_extract::colormind::DEFAULT_COLORMIND_URL),
            },
            upload: UploadConfig {
                max_upload_size: env_parse("MAX_UPLOAD_SIZE", 10 * 1024 * 1024),
                image_library: PathBuf::from(env_or("IMAGE_LIBRARY_PATH", "./data/images")),
            },
        }
    }
}

impl ImaggaSettings {
    /// Client configuration for the given platform.
    pub fn client_config(&self, platform: Platform) -> ImaggaConfig {
        ImaggaConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            api_secret: self.api_secret.clone(),
            min_request_interval: Duration::from_millis(self.min_request_interval_ms),
            retry: RetryPolicy::new(
                self.max_retries,
                Duration::from_millis(self.retry_base_delay_ms),
            ),
            preflight: platform == Platform::Native,
            ..Default::default()
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
