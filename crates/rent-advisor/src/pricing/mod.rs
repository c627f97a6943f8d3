//! Comparable-adjustment rent estimation.
//!
//! [`compute_adjusted_rent`] prices each comparable against the subject along
//! independent feature axes and blends the adjusted rents by credibility;
//! [`format_rent_range`] turns the blended figure into the displayed band.

pub mod adjustments;
pub mod amenities;
pub mod domain;
pub mod heuristic;
pub mod increase;
pub mod range;

pub use adjustments::{
    compute_adjusted_rent, AdjustedComparable, AdjustmentEngine, CategoryWeights,
    ComparableAnalysis,
};
pub use amenities::{Amenity, AmenityGroup};
pub use domain::{
    Adjustment, AdjustmentCategory, ComparableProperty, MissingField, PropertyFeatures,
    PropertySide, PropertyType, QualityTier, SubjectProperty,
};
pub use heuristic::{baseline_rent, market_estimate, MarketFactors};
pub use increase::{rent_increase, RentIncrease};
pub use range::{format_rent_range, ConfidenceInputs, RentRange};

/// Failures the pricing functions report to their caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("no usable comparable data to estimate rent from")]
    NoComparableData,
    #[error("adjustments drive the blended estimate to {estimate:.2}, which is not a usable rent")]
    NonPositiveEstimate { estimate: f64 },
    #[error("invalid value {value} for {field}")]
    InvalidNumericInput { field: &'static str, value: f64 },
}
