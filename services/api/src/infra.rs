use metrics_exporter_prometheus::PrometheusHandle;
use rent_advisor::analyses::{
    AnalysisId, AnalysisRecord, AnalysisRepository, RentAnalysisService, RepositoryError,
};
use rent_advisor::comparables::{ComparableSource, CsvComparableSource, MockComparableSource};
use rent_advisor::config::PricingConfig;
use rent_advisor::error::AppError;
use rent_advisor::narrative::SummaryWriter;
use rent_advisor::neighborhood::{CachedNeighborhoodSource, StaticNeighborhoodSource, SystemClock};
use rent_advisor::pricing::{Amenity, PropertyType, QualityTier};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct StoredAnalyses {
    by_id: HashMap<AnalysisId, AnalysisRecord>,
    order: Vec<AnalysisId>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAnalysisRepository {
    records: Arc<Mutex<StoredAnalyses>>,
}

impl AnalysisRepository for InMemoryAnalysisRepository {
    fn insert(&self, record: AnalysisRecord) -> Result<AnalysisRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.by_id.contains_key(&record.analysis_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.order.push(record.analysis_id.clone());
        guard.by_id.insert(record.analysis_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &AnalysisId) -> Result<Option<AnalysisRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.by_id.get(id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .order
            .iter()
            .rev()
            .take(limit)
            .filter_map(|id| guard.by_id.get(id).cloned())
            .collect())
    }
}

/// Listing CSV when configured, otherwise synthetic comparables.
pub(crate) fn comparable_source(
    config: &PricingConfig,
) -> Result<Arc<dyn ComparableSource>, AppError> {
    match &config.comparables_csv {
        Some(path) => Ok(Arc::new(CsvComparableSource::from_path(path)?)),
        None => Ok(Arc::new(MockComparableSource)),
    }
}

pub(crate) fn analysis_service(
    config: &PricingConfig,
    repository: Arc<InMemoryAnalysisRepository>,
) -> Result<RentAnalysisService<InMemoryAnalysisRepository>, AppError> {
    let neighborhood = CachedNeighborhoodSource::new(
        StaticNeighborhoodSource::sample(),
        config.cache_ttl(),
        Arc::new(SystemClock),
    );

    Ok(
        RentAnalysisService::new(repository, comparable_source(config)?)
            .with_neighborhood(Arc::new(neighborhood))
            .with_narrator(Arc::new(SummaryWriter::default())),
    )
}

pub(crate) fn parse_property_type(raw: &str) -> Result<PropertyType, String> {
    PropertyType::parse(raw).ok_or_else(|| {
        format!(
            "unknown property type '{raw}' (expected Single-Family, Condo, Townhouse, \
             Multi-Unit, Apartment, Duplex or Mobile Home)"
        )
    })
}

pub(crate) fn parse_quality(raw: &str) -> Result<QualityTier, String> {
    Ok(QualityTier::parse(raw))
}

pub(crate) fn parse_amenity(raw: &str) -> Result<Amenity, String> {
    Ok(Amenity::parse(raw))
}
