use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::narrative::GeneratedText;
use crate::neighborhood::{NeighborhoodMetrics, NeighborhoodScore};
use crate::pricing::{
    ComparableAnalysis, ComparableProperty, ConfidenceInputs, RentIncrease, RentRange,
    SubjectProperty,
};

/// Identifier wrapper for stored analyses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisId(pub String);

/// Caller input for an estimate. Comparables are fetched from the configured
/// source when omitted; neighborhood metrics are looked up by ZIP when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub subject: SubjectProperty,
    #[serde(default)]
    pub comparables: Option<Vec<ComparableProperty>>,
    #[serde(default)]
    pub neighborhood: Option<NeighborhoodMetrics>,
    #[serde(default = "default_include_narrative")]
    pub include_narrative: bool,
}

fn default_include_narrative() -> bool {
    true
}

impl AnalysisRequest {
    pub fn for_subject(subject: SubjectProperty) -> Self {
        Self {
            subject,
            comparables: None,
            neighborhood: None,
            include_narrative: default_include_narrative(),
        }
    }
}

/// Body of the standalone range endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeRequest {
    pub estimated_rent: f64,
    pub confidence: ConfidenceInputs,
}

/// Priced result for a subject, before anything is stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RentEstimate {
    pub analysis: ComparableAnalysis,
    pub range: RentRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<NeighborhoodScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_rent_within_range: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Repository record for a submitted analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub analysis_id: AnalysisId,
    pub subject: SubjectProperty,
    pub estimate: RentEstimate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<GeneratedText>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn summary_view(&self) -> AnalysisSummaryView {
        let range = self.estimate.range;
        AnalysisSummaryView {
            analysis_id: self.analysis_id.clone(),
            address: self.subject.features.address.clone(),
            suggested_rent: range.median,
            rent_low: range.low,
            rent_high: range.high,
            confidence: range.confidence,
            comparables_used: self.estimate.analysis.comparables_used,
            neighborhood_score: self.estimate.neighborhood.as_ref().map(|n| n.score),
            narrative: self.narrative.as_ref().map(|n| n.text.clone()),
        }
    }
}

/// Compact representation returned when an analysis is accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummaryView {
    pub analysis_id: AnalysisId,
    pub address: String,
    pub suggested_rent: u32,
    pub rent_low: u32,
    pub rent_high: u32,
    pub confidence: u8,
    pub comparables_used: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// Result of a rent increase check. The numbers are always computed; the
/// commentary is present only when a narrator produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReview {
    pub location: String,
    pub increase: RentIncrease,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenancy_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<GeneratedText>,
}
