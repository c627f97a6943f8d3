//! Quick market estimate used when only area-level signals are available.

use serde::{Deserialize, Serialize};

use super::range::{ConfidenceInputs, RentRange};
use super::PricingError;

const CRIME_WEIGHT: f64 = 0.10;
const WALK_WEIGHT: f64 = 0.05;
const AGE_WEIGHT: f64 = 0.10;
const AMENITY_WEIGHT: f64 = 0.20;
const SQFT_WEIGHT: f64 = 0.20;

const DOLLARS_PER_AMENITY: f64 = 25.0;
const DOLLARS_PER_EXTRA_SQFT: f64 = 0.10;
const BASELINE_SQFT: f64 = 800.0;

/// Area-level signals for the heuristic estimate. Zero means "not available"
/// for the crime index, walk score and school score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketFactors {
    pub comparable_median_rent: f64,
    pub crime_index: f64,
    pub walk_score: f64,
    pub school_score: f64,
    pub amenity_count: usize,
    pub property_age: u32,
    pub square_feet: u32,
}

impl MarketFactors {
    pub fn confidence_inputs(&self) -> ConfidenceInputs {
        ConfidenceInputs {
            has_comparables: self.comparable_median_rent > 0.0,
            has_crime_data: self.crime_index > 0.0,
            has_walk_score: self.walk_score > 0.0,
            has_school_data: self.school_score > 0.0,
            amenity_count: self.amenity_count,
        }
    }
}

/// Nudges the comparable median by area safety, walkability, age, amenity
/// count and size, then returns a ±10% band.
pub fn market_estimate(factors: &MarketFactors) -> Result<RentRange, PricingError> {
    let base = factors.comparable_median_rent;
    if !base.is_finite() || base <= 0.0 {
        return Err(PricingError::NoComparableData);
    }

    let crime_modifier = if factors.crime_index < 20.0 {
        0.05
    } else if factors.crime_index > 50.0 {
        -0.10
    } else {
        0.0
    };
    let walk_modifier = if factors.walk_score > 80.0 {
        0.05
    } else if factors.walk_score < 40.0 {
        -0.05
    } else {
        0.0
    };
    let age_modifier = match factors.property_age {
        0..=4 => 0.10,
        5..=14 => 0.05,
        _ => -0.05,
    };

    let amenities = factors.amenity_count as f64 * DOLLARS_PER_AMENITY;
    let size = (f64::from(factors.square_feet) - BASELINE_SQFT) * DOLLARS_PER_EXTRA_SQFT;

    let adjusted = base
        + base * CRIME_WEIGHT * crime_modifier
        + base * WALK_WEIGHT * walk_modifier
        + base * AGE_WEIGHT * age_modifier
        + amenities * AMENITY_WEIGHT
        + size * SQFT_WEIGHT;

    let spread = adjusted * 0.1;
    Ok(RentRange {
        low: (adjusted - spread).round().max(0.0) as u32,
        median: adjusted.round().max(0.0) as u32,
        high: (adjusted + spread).round().max(0.0) as u32,
        confidence: factors.confidence_inputs().score(),
    })
}

/// Rough rent from size and room counts, rounded to the nearest $10. Used to
/// seed synthetic comparables when no listing data is available.
pub fn baseline_rent(square_feet: u32, beds: u32, baths: f64) -> f64 {
    let raw = f64::from(square_feet) * 2.5 + f64::from(beds) * 200.0 + baths * 150.0;
    round_to_ten(raw)
}

pub(crate) fn round_to_ten(value: f64) -> f64 {
    (value / 10.0).round() * 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors() -> MarketFactors {
        MarketFactors {
            comparable_median_rent: 2150.0,
            crime_index: 28.9,
            walk_score: 85.0,
            school_score: 8.5,
            amenity_count: 4,
            property_age: 20,
            square_feet: 1000,
        }
    }

    #[test]
    fn applies_weighted_modifiers_to_the_median() {
        let range = market_estimate(&factors()).expect("estimate");
        // 2150 + walk 5.375 - age 10.75 + amenities 20 + size 4
        assert_eq!(range.median, 2169);
        assert_eq!(range.confidence, 100);
        assert!(range.low < range.median && range.median < range.high);
    }

    #[test]
    fn missing_signals_reduce_confidence() {
        let mut factors = factors();
        factors.crime_index = 0.0;
        factors.walk_score = 0.0;
        let range = market_estimate(&factors).expect("estimate");
        assert_eq!(range.confidence, 85);
    }

    #[test]
    fn requires_a_comparable_median() {
        let mut factors = factors();
        factors.comparable_median_rent = 0.0;
        assert!(matches!(
            market_estimate(&factors),
            Err(PricingError::NoComparableData)
        ));
    }

    #[test]
    fn baseline_rounds_to_ten_dollars() {
        // 900 * 2.5 + 2 * 200 + 1.5 * 150 = 2875
        assert_eq!(baseline_rent(900, 2, 1.5), 2880.0);
    }
}
