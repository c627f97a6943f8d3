use serde::{Deserialize, Serialize};

use super::PricingError;

const RANGE_SPREAD: f64 = 0.10;
const NO_COMPARABLES_PENALTY: i32 = 40;
const NO_CRIME_DATA_PENALTY: i32 = 10;
const NO_WALK_SCORE_PENALTY: i32 = 5;
const NO_SCHOOL_DATA_PENALTY: i32 = 5;
const AMENITY_ALLOWANCE: usize = 5;
const PER_EXTRA_AMENITY_PENALTY: i32 = 2;

/// Completeness of the data an estimate was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceInputs {
    pub has_comparables: bool,
    pub has_crime_data: bool,
    pub has_walk_score: bool,
    pub has_school_data: bool,
    #[serde(default)]
    pub amenity_count: usize,
}

impl ConfidenceInputs {
    /// Every signal present and no more than the amenity allowance.
    pub const fn complete() -> Self {
        Self {
            has_comparables: true,
            has_crime_data: true,
            has_walk_score: true,
            has_school_data: true,
            amenity_count: 0,
        }
    }

    /// Starts at 100 and deducts for each missing signal and for amenity
    /// counts above the allowance, clamped to 0–100.
    pub fn score(&self) -> u8 {
        let mut confidence: i32 = 100;
        if !self.has_comparables {
            confidence -= NO_COMPARABLES_PENALTY;
        }
        if !self.has_crime_data {
            confidence -= NO_CRIME_DATA_PENALTY;
        }
        if !self.has_walk_score {
            confidence -= NO_WALK_SCORE_PENALTY;
        }
        if !self.has_school_data {
            confidence -= NO_SCHOOL_DATA_PENALTY;
        }

        let extra_amenities = self.amenity_count.saturating_sub(AMENITY_ALLOWANCE);
        let extra_penalty = i32::try_from(extra_amenities)
            .unwrap_or(i32::MAX)
            .saturating_mul(PER_EXTRA_AMENITY_PENALTY);
        confidence = confidence.saturating_sub(extra_penalty);

        confidence.clamp(0, 100) as u8
    }
}

/// Displayed rent band around an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentRange {
    pub low: u32,
    pub median: u32,
    pub high: u32,
    pub confidence: u8,
}

impl RentRange {
    pub fn contains(&self, rent: f64) -> bool {
        rent >= f64::from(self.low) && rent <= f64::from(self.high)
    }
}

pub fn format_rent_range(
    estimated_rent: f64,
    inputs: &ConfidenceInputs,
) -> Result<RentRange, PricingError> {
    if !estimated_rent.is_finite() || estimated_rent <= 0.0 {
        return Err(PricingError::InvalidNumericInput {
            field: "estimated_rent",
            value: estimated_rent,
        });
    }

    Ok(RentRange {
        low: whole_dollars(estimated_rent * (1.0 - RANGE_SPREAD)),
        median: whole_dollars(estimated_rent),
        high: whole_dollars(estimated_rent * (1.0 + RANGE_SPREAD)),
        confidence: inputs.score(),
    })
}

fn whole_dollars(value: f64) -> u32 {
    value.round().min(f64::from(u32::MAX)) as u32
}
