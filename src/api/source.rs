use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::SourceConfig;

const USER_AGENT: &str = "platebench/0.1.0 (https://github.com/platebench-rs/platebench)";

/// Raw GeoJSON FeatureCollection (the subset platebench consumes)
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// A single GeoJSON feature
#[derive(Debug, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// Feature geometry. Coordinates stay untyped here because their nesting
/// depth depends on the geometry type; the parser decodes Polygon rings.
#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub coordinates: serde_json::Value,
}

/// Fetch the plate-boundary dataset from the configured mirrors.
///
/// Tries each mirror in order per attempt, with a linear backoff between
/// attempts. 429/504 responses and transport errors move on to the next
/// mirror; any other error status aborts immediately.
pub fn fetch_plates(config: &SourceConfig) -> Result<FeatureCollection> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to create HTTP client")?;

    let mut last_error = None;

    for attempt in 0..config.max_retries {
        if attempt > 0 {
            let wait_secs = 5 * attempt as u64;
            eprintln!(
                "Dataset fetch failed, retrying in {} seconds (attempt {}/{})",
                wait_secs,
                attempt + 1,
                config.max_retries
            );
            std::thread::sleep(Duration::from_secs(wait_secs));
        }

        for url in &config.urls {
            let response = match client.get(url).send() {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(format!("{}: {}", url, e));
                    continue;
                }
            };

            match response.status().as_u16() {
                200 => {
                    let collection: FeatureCollection = response
                        .json()
                        .context("Failed to parse GeoJSON response")?;
                    return Ok(collection);
                }
                429 | 504 => {
                    // Overloaded mirror, try the next one
                    last_error =
                        Some(format!("{} returned status {}", url, response.status()));
                    continue;
                }
                status => {
                    bail!("Dataset mirror {} returned error status: {}", url, status);
                }
            }
        }
    }

    bail!(
        "Dataset fetch failed after {} attempts: {}",
        config.max_retries,
        last_error.unwrap_or_else(|| "Unknown error".to_string())
    )
}
