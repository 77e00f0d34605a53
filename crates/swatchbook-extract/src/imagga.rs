//! Imagga color extraction client.
//!
//! Extraction runs as a fixed pipeline: optional usage preflight, image
//! upload, color extraction for the upload id, normalization. Both network
//! steps go through the shared [`RequestGate`] and the [`RetryPolicy`].
//! Whatever fails along the way, callers get a palette back: the extracted
//! colors or a curated fallback.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use swatchbook_models::unique_colors;
use tracing::{debug, info, warn};

use crate::{Error, FallbackPalettes, ImageSource, RequestGate, Result, RetryPolicy};

/// Imagga API v2 endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.imagga.com/v2";

/// Maximum number of colors kept from one extraction.
pub const MAX_COLORS: usize = 6;

const USER_AGENT: &str = "swatchbook/0.1";

/// Configuration for [`ImaggaClient`].
#[derive(Debug, Clone)]
pub struct ImaggaConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    /// Minimum spacing between two requests through the gate.
    pub min_request_interval: Duration,
    pub retry: RetryPolicy,
    /// Probe `/usage` before uploading. Disabled for browser-hosted deployments,
    /// where the probe fails on cross-origin checks.
    pub preflight: bool,
    pub timeout: Duration,
}

impl Default for ImaggaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            min_request_interval: crate::gate::DEFAULT_MIN_INTERVAL,
            retry: RetryPolicy::default(),
            preflight: true,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Result of the `/usage` probe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatus {
    pub is_working: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Which image the `/colors` endpoint should analyse.
#[derive(Debug, Clone, Copy)]
enum ColorQuery<'a> {
    UploadId(&'a str),
    ImageUrl(&'a str),
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    result: Option<UploadResult>,
}

#[derive(Debug, Deserialize)]
struct UploadResult {
    upload_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ColorsResponse {
    result: Option<ColorsResult>,
}

#[derive(Debug, Deserialize)]
struct ColorsResult {
    colors: Option<ColorSets>,
}

#[derive(Debug, Deserialize)]
struct ColorSets {
    image_colors: Option<Vec<ImageColor>>,
}

#[derive(Debug, Deserialize)]
struct ImageColor {
    html_code: Option<String>,
}

/// Client for the Imagga color extraction API.
///
/// Cheap to clone; clones share the HTTP client and the request gate, so
/// every request made through any clone is serialized.
#[derive(Clone)]
pub struct ImaggaClient {
    inner: Arc<ImaggaClientInner>,
}

struct ImaggaClientInner {
    client: Client,
    config: ImaggaConfig,
    auth_header: String,
    gate: RequestGate,
    fallback: FallbackPalettes,
}

impl ImaggaClient {
    pub fn new(config: ImaggaConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let auth_header = basic_auth(&config.api_key, &config.api_secret);
        let gate = RequestGate::new(config.min_request_interval);

        info!(
            base_url = %config.base_url,
            min_interval_ms = config.min_request_interval.as_millis() as u64,
            max_retries = config.retry.max_retries,
            preflight = config.preflight,
            "Imagga client initialized"
        );

        Ok(Self {
            inner: Arc::new(ImaggaClientInner {
                client,
                config,
                auth_header,
                gate,
                fallback: FallbackPalettes::extraction(),
            }),
        })
    }

    pub fn config(&self) -> &ImaggaConfig {
        &self.inner.config
    }

    /// Produce up to [`MAX_COLORS`] unique colors for an image.
    ///
    /// Never fails: any error along the pipeline yields a fallback palette.
    pub async fn generate_palette_from_image(&self, image: &ImageSource) -> Vec<String> {
        info!(filename = %image.filename, bytes = image.data.len(), "Starting color extraction");

        if self.inner.config.preflight {
            let status = self.check_api_status().await;
            if !status.is_working {
                warn!(
                    error = status.error.as_deref().unwrap_or("unknown"),
                    "Extraction API unavailable, using fallback palette"
                );
                return self.inner.fallback.pick();
            }
        }

        match self.extract_from_image(image).await {
            Ok(colors) => {
                info!(colors = ?colors, "Extracted colors from image");
                colors
            }
            Err(e) => {
                warn!(error = %e, "Color extraction failed, using fallback palette");
                self.inner.fallback.pick()
            }
        }
    }

    /// Extract colors from a publicly reachable image URL.
    ///
    /// Same fallback policy as [`Self::generate_palette_from_image`].
    pub async fn extract_colors_from_url(&self, image_url: &str) -> Vec<String> {
        match self.extract_colors(ColorQuery::ImageUrl(image_url)).await {
            Ok(colors) => colors,
            Err(e) => {
                warn!(url = %image_url, error = %e, "URL color extraction failed, using fallback palette");
                self.inner.fallback.pick()
            }
        }
    }

    /// Probe the `/usage` endpoint.
    ///
    /// Not routed through the gate; it is a single cheap status call.
    pub async fn check_api_status(&self) -> ApiStatus {
        debug!("Checking extraction API status");

        let response = self
            .inner
            .client
            .get(self.url("/usage"))
            .header("Authorization", &self.inner.auth_header)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                return ApiStatus {
                    is_working: false,
                    usage: None,
                    error: Some(Error::from(e).to_string()),
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = Error::Status(format!("{} - {}", status.as_u16(), error_message(&body)));
            return ApiStatus {
                is_working: false,
                usage: None,
                error: Some(err.to_string()),
            };
        }

        match response.json::<Value>().await {
            Ok(data) => ApiStatus {
                is_working: true,
                usage: data.get("result").cloned(),
                error: None,
            },
            Err(e) => ApiStatus {
                is_working: false,
                usage: None,
                error: Some(Error::Parse(e.to_string()).to_string()),
            },
        }
    }

    /// Upload an image and return its upload id.
    pub async fn upload_image(&self, image: &ImageSource) -> Result<String> {
        let inner = &self.inner;
        inner
            .gate
            .enqueue(
                inner
                    .config
                    .retry
                    .run(|| self.send_upload(image), Error::is_concurrency_limited),
            )
            .await
    }

    /// Extract colors for an image previously uploaded with [`Self::upload_image`].
    pub async fn extract_colors_from_upload_id(&self, upload_id: &str) -> Result<Vec<String>> {
        self.extract_colors(ColorQuery::UploadId(upload_id)).await
    }

    async fn extract_from_image(&self, image: &ImageSource) -> Result<Vec<String>> {
        let upload_id = self.upload_image(image).await?;
        debug!(upload_id = %upload_id, "Image uploaded");
        self.extract_colors_from_upload_id(&upload_id).await
    }

    async fn extract_colors(&self, query: ColorQuery<'_>) -> Result<Vec<String>> {
        let inner = &self.inner;
        inner
            .gate
            .enqueue(
                inner
                    .config
                    .retry
                    .run(|| self.send_colors(query), Error::is_concurrency_limited),
            )
            .await
    }

    async fn send_upload(&self, image: &ImageSource) -> Result<String> {
        let part = Part::bytes(image.data.clone())
            .file_name(image.filename.clone())
            .mime_str(&image.content_type)?;
        let form = Form::new().part("image", part);

        let response = self
            .inner
            .client
            .post(self.url("/uploads"))
            .header("Authorization", &self.inner.auth_header)
            .multipart(form)
            .send()
            .await?;

        let body = read_success_body(response).await?;
        let parsed: UploadResponse =
            serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))?;

        parsed
            .result
            .and_then(|r| r.upload_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Upload("response did not contain an upload id".to_string()))
    }

    async fn send_colors(&self, query: ColorQuery<'_>) -> Result<Vec<String>> {
        let (key, value) = match query {
            ColorQuery::UploadId(id) => ("image_upload_id", id),
            ColorQuery::ImageUrl(url) => ("image_url", url),
        };
        let overall_count = MAX_COLORS.to_string();

        let response = self
            .inner
            .client
            .get(self.url("/colors"))
            .header("Authorization", &self.inner.auth_header)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .query(&[
                (key, value),
                ("extract_object_colors", "0"),
                ("extract_overall_colors", "1"),
                ("overall_count", overall_count.as_str()),
            ])
            .send()
            .await?;

        let body = read_success_body(response).await?;
        parse_colors(&body)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.config.base_url.trim_end_matches('/'), path)
    }
}

/// `Basic base64(key:secret)`.
fn basic_auth(key: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", key, secret)))
}

/// Return the body of a 2xx response, or an [`Error::Http`] carrying the
/// API's error message.
async fn read_success_body(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    Ok(body)
}

/// Pull a readable message out of an error body.
///
/// Imagga reports errors as `{"status":{"text":..}}`; some gateways use
/// `{"error":{"message":..}}`. Anything else is returned verbatim.
fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    json.pointer("/error/message")
        .or_else(|| json.pointer("/status/text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

fn parse_colors(body: &str) -> Result<Vec<String>> {
    let parsed: ColorsResponse =
        serde_json::from_str(body).map_err(|e| Error::Parse(e.to_string()))?;

    let raw: Vec<String> = parsed
        .result
        .and_then(|r| r.colors)
        .and_then(|c| c.image_colors)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| c.html_code)
        .collect();

    let colors = unique_colors(raw, MAX_COLORS);
    if colors.is_empty() {
        return Err(Error::EmptyResult);
    }
    Ok(colors)
}
