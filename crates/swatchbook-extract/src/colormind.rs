//! Random palette generation backed by the Colormind API.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use swatchbook_models::rgb_to_hex;
use tracing::{debug, warn};

use crate::{Error, FallbackPalettes, Result};

pub const DEFAULT_COLORMIND_URL: &str = "http://colormind.io/api/";

#[derive(Debug, Deserialize)]
struct ColormindResponse {
    result: Option<Vec<[f64; 3]>>,
}

/// Client for Colormind's `default` model.
#[derive(Debug, Clone)]
pub struct ColormindClient {
    client: Client,
    url: String,
    fallback: FallbackPalettes,
}

impl ColormindClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            url: url.into(),
            fallback: FallbackPalettes::random(),
        })
    }

    /// A random 5-color palette. Falls back to a curated palette on any error.
    pub async fn random_palette(&self) -> Vec<String> {
        match self.fetch().await {
            Ok(colors) => colors,
            Err(e) => {
                warn!(error = %e, "Random palette API failed, using fallback palette");
                self.fallback.pick()
            }
        }
    }

    async fn fetch(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "model": "default" }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: ColormindResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        let colors: Vec<String> = parsed
            .result
            .unwrap_or_default()
            .iter()
            .map(|[r, g, b]| rgb_to_hex(*r, *g, *b))
            .collect();

        if colors.is_empty() {
            return Err(Error::EmptyResult);
        }
        debug!(colors = ?colors, "Generated random palette");
        Ok(colors)
    }
}
