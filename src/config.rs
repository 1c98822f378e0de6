use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use reqwest::Url;
use serde::Deserialize;

use crate::catalog::{DEFAULT_RESULT_LIMIT, DEFAULT_SEARCH_ENDPOINT, SearchQuery};
use crate::dedup::InitialOrder;

pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "https://garden.spoonflower.com/c/12984962/p/f/m/EH5aWJbn_LhuOlWypO5l_PaHuLwc4GUac9wRjQv8xJ-7aocY_A8rq3E/Solid%20graphite%20dark%20grey.jpg";

/// The catalog rejects larger pages.
pub const MAX_RESULT_LIMIT: u32 = 200;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Catalog search endpoint; query parameters are appended per request.
    pub search_endpoint: String,
    /// Maximum number of records requested per search.
    pub result_limit: u32,
    /// Upper bound on one catalog request, connect through body.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Period between two rotation ticks while playing.
    #[serde(with = "humantime_serde")]
    pub rotation_interval: Duration,
    /// Image shown in every slot before the first successful search.
    pub placeholder_image: String,
    /// Which fetched images fill the grid first.
    pub initial_order: InitialOrder,
    /// Optional deterministic seed for `initial-order: shuffle`.
    pub shuffle_seed: Option<u64>,
    /// Optional deterministic seed for rotation slot selection.
    pub rotation_seed: Option<u64>,
    /// Term and media category pre-filled in the search inputs.
    pub default_query: SearchQuery,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        let endpoint = self
            .endpoint()
            .context("search-endpoint must be an absolute URL")?;
        ensure!(
            matches!(endpoint.scheme(), "http" | "https"),
            "search-endpoint must use http or https"
        );
        ensure!(
            (1..=MAX_RESULT_LIMIT).contains(&self.result_limit),
            "result-limit must be between 1 and {MAX_RESULT_LIMIT}"
        );
        ensure!(
            !self.request_timeout.is_zero(),
            "request-timeout must be greater than zero"
        );
        ensure!(
            !self.rotation_interval.is_zero(),
            "rotation-interval must be greater than zero"
        );
        ensure!(
            !self.placeholder_image.trim().is_empty(),
            "placeholder-image must not be empty"
        );
        Ok(self)
    }

    pub fn endpoint(&self) -> Result<Url> {
        Url::parse(&self.search_endpoint)
            .with_context(|| format!("invalid search endpoint '{}'", self.search_endpoint))
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            result_limit: DEFAULT_RESULT_LIMIT,
            request_timeout: Duration::from_secs(30),
            rotation_interval: Duration::from_secs(2),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
            initial_order: InitialOrder::default(),
            shuffle_seed: None,
            rotation_seed: None,
            default_query: SearchQuery::default(),
        }
    }
}
