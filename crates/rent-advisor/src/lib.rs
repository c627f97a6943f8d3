//! Rental pricing core: comparable adjustments, neighborhood scoring, and the
//! displayed rent range, plus the analysis service that ties them together.

pub mod analyses;
pub mod comparables;
pub mod config;
pub mod error;
pub mod narrative;
pub mod neighborhood;
pub mod pricing;
pub mod telemetry;
