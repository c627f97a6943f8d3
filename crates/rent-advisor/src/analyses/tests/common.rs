use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::analyses::domain::{AnalysisId, AnalysisRecord};
use crate::analyses::repository::{AnalysisRepository, RepositoryError};
use crate::analyses::{analysis_router, RentAnalysisService};
use crate::comparables::{ComparableSource, ComparableSourceError};
use crate::narrative::{GeneratedText, NarrativeError, PromptRequest, TextGenerator};
use crate::neighborhood::ManualClock;
use crate::pricing::{
    ComparableProperty, PropertyFeatures, PropertyType, QualityTier, SubjectProperty,
};

pub(super) fn analysis_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 1, 9, 30, 0).unwrap()
}

fn features(address: &str) -> PropertyFeatures {
    let mut features = PropertyFeatures::new(address, PropertyType::SingleFamily);
    features.beds = Some(2);
    features.full_baths = Some(1.0);
    features.half_baths = Some(0.0);
    features.square_feet = Some(1000);
    features.year_built = Some(2000);
    features.quality = QualityTier::Good;
    features
}

pub(super) fn subject() -> SubjectProperty {
    SubjectProperty {
        features: features("100 Main St"),
        requested_rent: Some(2050.0),
        zip_code: Some("50309".to_string()),
    }
}

/// Two listings identical to the subject, so the estimate is their mean rent.
pub(super) fn comparables() -> Vec<ComparableProperty> {
    vec![
        ComparableProperty {
            features: features("1 Elm St"),
            rent: 1900.0,
            distance: 0.4,
        },
        ComparableProperty {
            features: features("2 Elm St"),
            rent: 2100.0,
            distance: 0.7,
        },
    ]
}

pub(super) fn build_service() -> (RentAnalysisService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = RentAnalysisService::new(repository.clone(), Arc::new(FixedComparables))
        .with_clock(Arc::new(ManualClock::new(analysis_time())));
    (service, repository)
}

pub(super) fn analysis_router_with_service(
    service: RentAnalysisService<MemoryRepository>,
) -> axum::Router {
    analysis_router(Arc::new(service))
}

pub(super) struct FixedComparables;

impl ComparableSource for FixedComparables {
    fn comparables(
        &self,
        _subject: &SubjectProperty,
    ) -> Result<Vec<ComparableProperty>, ComparableSourceError> {
        Ok(comparables())
    }
}

pub(super) struct OfflineComparables;

impl ComparableSource for OfflineComparables {
    fn comparables(
        &self,
        _subject: &SubjectProperty,
    ) -> Result<Vec<ComparableProperty>, ComparableSourceError> {
        Err(ComparableSourceError::Unavailable("listing feed down".to_string()))
    }
}

pub(super) struct FailingNarrator;

impl TextGenerator for FailingNarrator {
    fn generate(&self, _request: &PromptRequest) -> Result<GeneratedText, NarrativeError> {
        Err(NarrativeError::Unavailable("quota exceeded".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<AnalysisId, AnalysisRecord>>>,
}

impl AnalysisRepository for MemoryRepository {
    fn insert(&self, record: AnalysisRecord) -> Result<AnalysisRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.analysis_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.analysis_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &AnalysisId) -> Result<Option<AnalysisRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<AnalysisRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| b.analysis_id.0.cmp(&a.analysis_id.0));
        records.truncate(limit);
        Ok(records)
    }
}

pub(super) struct UnavailableRepository;

impl AnalysisRepository for UnavailableRepository {
    fn insert(&self, _record: AnalysisRecord) -> Result<AnalysisRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AnalysisId) -> Result<Option<AnalysisRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<AnalysisRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
