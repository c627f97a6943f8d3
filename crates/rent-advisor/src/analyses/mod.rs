//! Submitted rent analyses: orchestration, storage contract, and HTTP routes.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AnalysisId, AnalysisRecord, AnalysisRequest, AnalysisSummaryView, ComplianceReview,
    RangeRequest, RentEstimate,
};
pub use repository::{AnalysisRepository, RepositoryError};
pub use router::analysis_router;
pub use service::{AnalysisServiceError, RentAnalysisService};
