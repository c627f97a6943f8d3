use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use tracing::debug;

use super::cache::{Clock, TtlCache};
use super::score::NeighborhoodMetrics;

/// Lookup of area statistics keyed by ZIP code (crime, census and similar feeds).
pub trait NeighborhoodSource: Send + Sync {
    fn metrics(&self, zip_code: &str) -> Result<NeighborhoodMetrics, NeighborhoodSourceError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum NeighborhoodSourceError {
    #[error("no neighborhood data for ZIP {0}")]
    UnknownZip(String),
    #[error("neighborhood data unavailable: {0}")]
    Unavailable(String),
}

/// In-memory table of metrics, optionally answering unknown ZIPs with a
/// fallback profile.
#[derive(Debug, Clone, Default)]
pub struct StaticNeighborhoodSource {
    by_zip: HashMap<String, NeighborhoodMetrics>,
    fallback: Option<NeighborhoodMetrics>,
}

impl StaticNeighborhoodSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zip(mut self, zip_code: impl Into<String>, metrics: NeighborhoodMetrics) -> Self {
        self.by_zip.insert(zip_code.into(), metrics);
        self
    }

    pub fn with_fallback(mut self, metrics: NeighborhoodMetrics) -> Self {
        self.fallback = Some(metrics);
        self
    }

    /// Typical mid-size metro profile used by demos and local runs.
    pub fn sample() -> Self {
        Self::new().with_fallback(NeighborhoodMetrics {
            crime_rate: Some(28.9),
            safety_index: Some(7.0),
            median_income: Some(75_000.0),
            school_rating: Some(8.5),
            employment_rate: Some(0.95),
            population_density: Some(4_500.0),
            median_home_value: Some(325_000.0),
            median_rent: Some(1_650.0),
            walkability_score: Some(85.0),
            transit_score: None,
        })
    }
}

impl NeighborhoodSource for StaticNeighborhoodSource {
    fn metrics(&self, zip_code: &str) -> Result<NeighborhoodMetrics, NeighborhoodSourceError> {
        self.by_zip
            .get(zip_code.trim())
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| NeighborhoodSourceError::UnknownZip(zip_code.to_string()))
    }
}

/// Wraps a source with an expire-on-read cache keyed by ZIP.
pub struct CachedNeighborhoodSource<S> {
    inner: S,
    cache: TtlCache<String, NeighborhoodMetrics>,
}

impl<S: NeighborhoodSource> CachedNeighborhoodSource<S> {
    pub fn new(inner: S, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl, clock),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

impl<S: NeighborhoodSource> NeighborhoodSource for CachedNeighborhoodSource<S> {
    fn metrics(&self, zip_code: &str) -> Result<NeighborhoodMetrics, NeighborhoodSourceError> {
        let key = zip_code.trim().to_string();
        if let Some(metrics) = self.cache.get(&key) {
            debug!(zip_code = %key, "neighborhood cache hit");
            return Ok(metrics);
        }

        debug!(zip_code = %key, "neighborhood cache miss");
        let metrics = self.inner.metrics(&key)?;
        self.cache.insert(key, metrics.clone());
        Ok(metrics)
    }
}
