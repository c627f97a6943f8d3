use serde::{Deserialize, Serialize};

use crate::pricing::PricingError;

/// Weights applied to each neighborhood signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodWeights {
    pub crime_rate: f64,
    pub safety_index: f64,
    pub median_income: f64,
    pub school_rating: f64,
    pub employment_rate: f64,
    pub population_density: f64,
    pub median_home_value: f64,
}

pub const NEIGHBORHOOD_WEIGHTS: NeighborhoodWeights = NeighborhoodWeights {
    crime_rate: 0.30,
    safety_index: 0.20,
    median_income: 0.12,
    school_rating: 0.15,
    employment_rate: 0.10,
    population_density: 0.03,
    median_home_value: 0.10,
};

/// Area statistics for a ZIP code. Every field is optional; absent signals
/// are left out of the score rather than counted as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodMetrics {
    #[serde(default)]
    pub crime_rate: Option<f64>,
    #[serde(default)]
    pub safety_index: Option<f64>,
    #[serde(default)]
    pub median_income: Option<f64>,
    #[serde(default)]
    pub school_rating: Option<f64>,
    #[serde(default)]
    pub employment_rate: Option<f64>,
    #[serde(default)]
    pub population_density: Option<f64>,
    #[serde(default)]
    pub median_home_value: Option<f64>,
    #[serde(default)]
    pub median_rent: Option<f64>,
    #[serde(default)]
    pub walkability_score: Option<f64>,
    #[serde(default)]
    pub transit_score: Option<f64>,
}

impl NeighborhoodMetrics {
    /// Rejects negative or non-finite statistics.
    pub fn validate(&self) -> Result<(), PricingError> {
        let fields = [
            ("crime_rate", self.crime_rate),
            ("safety_index", self.safety_index),
            ("median_income", self.median_income),
            ("school_rating", self.school_rating),
            ("employment_rate", self.employment_rate),
            ("population_density", self.population_density),
            ("median_home_value", self.median_home_value),
            ("median_rent", self.median_rent),
            ("walkability_score", self.walkability_score),
            ("transit_score", self.transit_score),
        ];

        for (field, value) in fields {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(PricingError::InvalidNumericInput { field, value });
                }
            }
        }
        Ok(())
    }
}

/// Contribution of each signal to the composite, before clamping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub crime: Option<f64>,
    pub safety: Option<f64>,
    pub income: Option<f64>,
    pub school: Option<f64>,
    pub employment: Option<f64>,
    pub density: Option<f64>,
    pub home_value: Option<f64>,
}

impl ScoreBreakdown {
    pub fn raw_total(&self) -> f64 {
        [
            self.crime,
            self.safety,
            self.income,
            self.school,
            self.employment,
            self.density,
            self.home_value,
        ]
        .into_iter()
        .flatten()
        .sum()
    }

    pub fn signals_present(&self) -> usize {
        [
            self.crime,
            self.safety,
            self.income,
            self.school,
            self.employment,
            self.density,
            self.home_value,
        ]
        .into_iter()
        .flatten()
        .count()
    }
}

/// Composite 1–10 neighborhood score with one decimal place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborhoodScore {
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

pub fn compute_neighborhood_score(metrics: &NeighborhoodMetrics) -> NeighborhoodScore {
    score_with_weights(metrics, &NEIGHBORHOOD_WEIGHTS)
}

pub fn score_with_weights(
    metrics: &NeighborhoodMetrics,
    weights: &NeighborhoodWeights,
) -> NeighborhoodScore {
    let present = |value: Option<f64>| value.filter(|v| v.is_finite());

    let breakdown = ScoreBreakdown {
        crime: present(metrics.crime_rate).map(|rate| (10.0 - rate / 10.0) * weights.crime_rate),
        safety: present(metrics.safety_index).map(|index| index * weights.safety_index),
        income: present(metrics.median_income).map(|income| {
            let base = (income / 10_000.0).min(10.0);
            (base + 1.0).log10() * 10.0 * weights.median_income
        }),
        school: present(metrics.school_rating).map(|rating| rating * weights.school_rating),
        employment: present(metrics.employment_rate).map(|rate| {
            let employment_score = rate.max(0.0).sqrt() * 10.0;
            (employment_score / 10.0) * weights.employment_rate
        }),
        density: present(metrics.population_density).map(|density| {
            (10.0 - (density / 10_000.0).min(10.0)) * weights.population_density
        }),
        home_value: match (
            present(metrics.median_home_value),
            present(metrics.median_rent).filter(|rent| *rent > 0.0),
        ) {
            (Some(value), Some(rent)) => {
                Some(((value / rent) / 200.0).min(10.0) * weights.median_home_value)
            }
            _ => None,
        },
    };

    let clamped = breakdown.raw_total().clamp(1.0, 10.0);
    NeighborhoodScore {
        score: (clamped * 10.0).round() / 10.0,
        breakdown,
    }
}
