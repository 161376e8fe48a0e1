//! Fuzzy registry client for drug-identity resolution.
//!
//! Pipeline per name: Exact search → Wildcard fuzzy search → Not found
//!
//! Every network or decode fault degrades to "no result from this step":
//! callers always receive a [`LookupOutcome`], never an error. A non-success
//! status from the registry counts as an answer with no results, not a
//! fault.

mod label;
mod matching;
mod parse;

pub use label::*;
pub use matching::*;
pub use parse::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::DrugRecord;

/// Default public registry endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.fda.gov/drug";

/// Per-request timeout for registry queries.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Registry transport errors. Internal to the lookup pipeline; they are
/// folded into [`LookupOutcome::TransientFailure`] before reaching callers.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("registry request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Outcome of a single drug-name lookup.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    /// A registry match above the quality threshold.
    Resolved(DrugRecord),
    /// The registry answered, but nothing matched well enough.
    NotFound,
    /// The registry could not be consulted (network or decode fault).
    TransientFailure(String),
}

/// A source of drug-identity answers.
///
/// The tiered cache talks to the registry through this seam so tests can
/// substitute stub lookups with canned results and call counters.
#[async_trait]
pub trait DrugLookup: Send + Sync {
    /// Resolve one candidate name. Faults are reported through
    /// [`LookupOutcome::TransientFailure`], never as an error.
    async fn resolve(&self, name: &str) -> LookupOutcome;
}

#[async_trait]
impl<T: DrugLookup + ?Sized> DrugLookup for Arc<T> {
    async fn resolve(&self, name: &str) -> LookupOutcome {
        (**self).resolve(name).await
    }
}

/// HTTP client for the external drug registry.
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
    config: MatchConfig,
}

impl RegistryClient {
    /// Client against the default public registry.
    pub fn new() -> RegistryResult<Self> {
        Self::with_base_url(DEFAULT_BASE_URL.into(), MatchConfig::default())
    }

    /// Client against a custom endpoint (mirrors, test servers).
    pub fn with_base_url(base_url: String, config: MatchConfig) -> RegistryResult<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Exact brand/generic name search; first hit wins.
    async fn exact_search(&self, name: &str) -> RegistryResult<Option<DrugRecord>> {
        let expression =
            format!(r#"openfda.brand_name:"{name}" openfda.generic_name:"{name}""#);
        let results = self.search(&expression, 1).await?;

        Ok(results.first().map(|record| {
            tracing::info!(name, "exact registry match");
            parse_label(record, name)
        }))
    }

    /// Wildcard prefix search scored by name similarity.
    async fn fuzzy_search(&self, name: &str) -> RegistryResult<Option<DrugRecord>> {
        let prefix = search_prefix(name, &self.config);
        tracing::debug!(name, %prefix, "fuzzy registry search");

        let expression =
            format!(r#"openfda.brand_name:"{prefix}"* openfda.generic_name:"{prefix}"*"#);
        let results = self
            .search(&expression, self.config.fuzzy_result_limit)
            .await?;

        match select_best_match(name, &results, &self.config) {
            Some(best) => {
                tracing::info!(
                    name,
                    variant = best.variant,
                    score = best.score,
                    "fuzzy registry match"
                );
                Ok(Some(parse_label(best.record, best.variant)))
            }
            None => Ok(None),
        }
    }

    /// One search request against the label endpoint.
    async fn search(&self, expression: &str, limit: usize) -> RegistryResult<Vec<LabelRecord>> {
        let url = format!("{}/label.json", self.base_url);
        let limit = limit.to_string();
        let response = self
            .http
            .get(&url)
            .query(&[("search", expression), ("limit", limit.as_str())])
            .send()
            .await?;

        // The registry answers "no matches" with a non-success status.
        if !response.status().is_success() {
            tracing::debug!(
                status = response.status().as_u16(),
                "registry returned non-success; treating as no results"
            );
            return Ok(Vec::new());
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.results)
    }
}

#[async_trait]
impl DrugLookup for RegistryClient {
    async fn resolve(&self, name: &str) -> LookupOutcome {
        match self.exact_search(name).await {
            Ok(Some(record)) => return LookupOutcome::Resolved(record),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(name, error = %err, "exact registry search failed");
            }
        }

        match self.fuzzy_search(name).await {
            Ok(Some(record)) => LookupOutcome::Resolved(record),
            Ok(None) => LookupOutcome::NotFound,
            Err(err) => {
                tracing::warn!(name, error = %err, "fuzzy registry search failed");
                LookupOutcome::TransientFailure(err.to_string())
            }
        }
    }
}
