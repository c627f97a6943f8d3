use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::comparables::{ComparableSource, ComparableSourceError};
use crate::narrative::{
    analysis_prompt, compliance_prompt, listing_prompt, ComplianceRequest, GeneratedText,
    ListingRequest, NarrativeError, TextGenerator,
};
use crate::neighborhood::{
    compute_neighborhood_score, Clock, NeighborhoodMetrics, NeighborhoodSource, SystemClock,
};
use crate::pricing::domain::ensure_non_negative;
use crate::pricing::{
    format_rent_range, rent_increase, AdjustmentEngine, ComparableProperty, ConfidenceInputs,
    PricingError, SubjectProperty,
};

use super::domain::{AnalysisId, AnalysisRecord, AnalysisRequest, ComplianceReview, RentEstimate};
use super::repository::{AnalysisRepository, RepositoryError};

/// Service composing the comparable source, adjustment engine, neighborhood
/// lookup, narrative generator, and repository.
pub struct RentAnalysisService<R> {
    repository: Arc<R>,
    comparables: Arc<dyn ComparableSource>,
    neighborhood: Option<Arc<dyn NeighborhoodSource>>,
    narrator: Option<Arc<dyn TextGenerator>>,
    engine: AdjustmentEngine,
    clock: Arc<dyn Clock>,
}

static ANALYSIS_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_analysis_id() -> AnalysisId {
    let id = ANALYSIS_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AnalysisId(format!("analysis-{id:06}"))
}

impl<R> RentAnalysisService<R>
where
    R: AnalysisRepository + 'static,
{
    pub fn new(repository: Arc<R>, comparables: Arc<dyn ComparableSource>) -> Self {
        Self {
            repository,
            comparables,
            neighborhood: None,
            narrator: None,
            engine: AdjustmentEngine::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_neighborhood(mut self, source: Arc<dyn NeighborhoodSource>) -> Self {
        self.neighborhood = Some(source);
        self
    }

    pub fn with_narrator(mut self, narrator: Arc<dyn TextGenerator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub fn with_engine(mut self, engine: AdjustmentEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Prices the subject without storing anything.
    pub fn estimate(
        &self,
        subject: &SubjectProperty,
        comparables: Option<Vec<ComparableProperty>>,
        metrics: Option<NeighborhoodMetrics>,
    ) -> Result<RentEstimate, AnalysisServiceError> {
        subject.validate()?;

        let comparables = match comparables {
            Some(supplied) => supplied,
            None => self.comparables.comparables(subject)?,
        };
        let analysis = self.engine.analyze(subject, &comparables)?;

        let metrics = match metrics {
            Some(metrics) => Some(metrics),
            None => self.lookup_metrics(subject),
        };
        if let Some(metrics) = &metrics {
            metrics.validate()?;
        }
        let neighborhood = metrics.as_ref().map(compute_neighborhood_score);

        let inputs = ConfidenceInputs {
            has_comparables: analysis.comparables_used > 0,
            has_crime_data: metrics.as_ref().is_some_and(|m| m.crime_rate.is_some()),
            has_walk_score: metrics
                .as_ref()
                .is_some_and(|m| m.walkability_score.is_some()),
            has_school_data: metrics.as_ref().is_some_and(|m| m.school_rating.is_some()),
            amenity_count: subject.features.amenities.len(),
        };
        let range = format_rent_range(analysis.estimated_rent, &inputs)?;

        let requested_rent_within_range = subject.requested_rent.map(|rent| range.contains(rent));
        let warnings = analysis.warnings().map(str::to_string).collect();

        Ok(RentEstimate {
            analysis,
            range,
            neighborhood,
            requested_rent_within_range,
            warnings,
        })
    }

    /// Runs a full analysis and stores it under a fresh id.
    pub fn submit(
        &self,
        request: AnalysisRequest,
    ) -> Result<AnalysisRecord, AnalysisServiceError> {
        let AnalysisRequest {
            subject,
            comparables,
            neighborhood,
            include_narrative,
        } = request;

        let estimate = self.estimate(&subject, comparables, neighborhood)?;
        let narrative = if include_narrative {
            self.narrate(&subject, &estimate)?
        } else {
            None
        };

        let record = AnalysisRecord {
            analysis_id: next_analysis_id(),
            subject,
            estimate,
            narrative,
            created_at: self.clock.now(),
        };

        let stored = self.repository.insert(record)?;
        info!(
            analysis_id = %stored.analysis_id.0,
            suggested_rent = stored.estimate.range.median,
            confidence = stored.estimate.range.confidence,
            "stored rent analysis"
        );
        Ok(stored)
    }

    /// Fetch a stored analysis for API responses.
    pub fn get(&self, analysis_id: &AnalysisId) -> Result<AnalysisRecord, AnalysisServiceError> {
        let record = self
            .repository
            .fetch(analysis_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<AnalysisRecord>, AnalysisServiceError> {
        Ok(self.repository.recent(limit)?)
    }

    /// Sizes a proposed rent change and, when a narrator is configured,
    /// attaches commentary on local rent rules.
    pub fn check_rent_increase(
        &self,
        request: &ComplianceRequest,
    ) -> Result<ComplianceReview, AnalysisServiceError> {
        if let Some(field) = request.missing_field() {
            return Err(AnalysisServiceError::MissingField(field));
        }
        let increase = rent_increase(request.current_rent, request.proposed_rent)?;

        let commentary = match self.narrator.as_ref() {
            Some(narrator) if request.include_commentary => {
                let prompt = compliance_prompt(request, &increase)?;
                Some(narrator.generate(&prompt)?)
            }
            _ => None,
        };

        let location = request.location();
        info!(
            location = %location,
            increase_percentage = increase.percentage,
            "reviewed rent increase"
        );
        Ok(ComplianceReview {
            location,
            increase,
            tenancy_start: request.tenancy_start,
            commentary,
        })
    }

    /// Writes marketing copy for a listing. Requires a narrator.
    pub fn describe_listing(
        &self,
        request: &ListingRequest,
    ) -> Result<GeneratedText, AnalysisServiceError> {
        ensure_non_negative("baths", request.baths)?;
        let narrator = self.narrator.as_ref().ok_or_else(|| {
            NarrativeError::Unavailable("no text generator configured".to_string())
        })?;

        let prompt = listing_prompt(request)?;
        let description = narrator.generate(&prompt)?;
        info!(
            property_type = request.property_type.label(),
            completion_tokens = description.usage.completion_tokens,
            "wrote listing description"
        );
        Ok(description)
    }

    fn lookup_metrics(&self, subject: &SubjectProperty) -> Option<NeighborhoodMetrics> {
        let source = self.neighborhood.as_ref()?;
        let zip_code = subject.zip_code.as_deref()?;
        match source.metrics(zip_code) {
            Ok(metrics) => Some(metrics),
            Err(err) => {
                warn!(zip_code, error = %err, "neighborhood lookup failed; continuing without it");
                None
            }
        }
    }

    fn narrate(
        &self,
        subject: &SubjectProperty,
        estimate: &RentEstimate,
    ) -> Result<Option<GeneratedText>, NarrativeError> {
        let Some(narrator) = self.narrator.as_ref() else {
            return Ok(None);
        };
        let request = analysis_prompt(
            subject,
            &estimate.analysis,
            &estimate.range,
            estimate.neighborhood.as_ref(),
        )?;
        narrator.generate(&request).map(Some)
    }
}

/// Error raised by the analysis service.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisServiceError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Comparables(#[from] ComparableSourceError),
    #[error(transparent)]
    Narrative(#[from] NarrativeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
