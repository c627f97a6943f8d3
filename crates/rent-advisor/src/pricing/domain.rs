use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::amenities::Amenity;
use super::PricingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "Single-Family", alias = "single_family")]
    SingleFamily,
    #[serde(rename = "Condo", alias = "condo")]
    Condo,
    #[serde(rename = "Townhouse", alias = "townhouse")]
    Townhouse,
    #[serde(rename = "Multi-Unit", alias = "multi_unit")]
    MultiUnit,
    #[serde(rename = "Apartment", alias = "apartment")]
    Apartment,
    #[serde(rename = "Duplex", alias = "duplex")]
    Duplex,
    #[serde(rename = "Mobile Home", alias = "mobile_home")]
    MobileHome,
}

impl PropertyType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SingleFamily => "Single-Family",
            Self::Condo => "Condo",
            Self::Townhouse => "Townhouse",
            Self::MultiUnit => "Multi-Unit",
            Self::Apartment => "Apartment",
            Self::Duplex => "Duplex",
            Self::MobileHome => "Mobile Home",
        }
    }

    /// Accepts the display label or a snake/kebab-case spelling.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "singlefamily" | "house" => Some(Self::SingleFamily),
            "condo" | "condominium" => Some(Self::Condo),
            "townhouse" | "townhome" => Some(Self::Townhouse),
            "multiunit" | "multifamily" => Some(Self::MultiUnit),
            "apartment" => Some(Self::Apartment),
            "duplex" => Some(Self::Duplex),
            "mobilehome" => Some(Self::MobileHome),
            _ => None,
        }
    }
}

/// Condition tier reported on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    #[default]
    Unknown,
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }

    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Excellent => 1.1,
            Self::Good => 1.0,
            Self::Fair => 0.9,
            Self::Poor => 0.8,
            Self::Unknown => 1.0,
        }
    }

    /// Only the top tier implies a recent remodel.
    pub const fn recently_remodeled(self) -> bool {
        matches!(self, Self::Excellent)
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "excellent" => Self::Excellent,
            "good" => Self::Good,
            "fair" => Self::Fair,
            "poor" => Self::Poor,
            _ => Self::Unknown,
        }
    }
}

/// Attributes shared by the subject and its comparables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFeatures {
    pub address: String,
    pub property_type: PropertyType,
    #[serde(default)]
    pub beds: Option<u32>,
    #[serde(default)]
    pub full_baths: Option<f64>,
    #[serde(default)]
    pub half_baths: Option<f64>,
    #[serde(default)]
    pub square_feet: Option<u32>,
    #[serde(default)]
    pub year_built: Option<i32>,
    #[serde(default)]
    pub quality: QualityTier,
    #[serde(default)]
    pub amenities: BTreeSet<Amenity>,
    #[serde(default)]
    pub location_score: Option<f64>,
}

impl PropertyFeatures {
    pub fn new(address: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            address: address.into(),
            property_type,
            beds: None,
            full_baths: None,
            half_baths: None,
            square_feet: None,
            year_built: None,
            quality: QualityTier::Unknown,
            amenities: BTreeSet::new(),
            location_score: None,
        }
    }

    fn validate(&self, names: &FieldNames) -> Result<(), PricingError> {
        if let Some(full) = self.full_baths {
            ensure_non_negative(names.full_baths, full)?;
        }
        if let Some(half) = self.half_baths {
            ensure_non_negative(names.half_baths, half)?;
        }
        if self.square_feet == Some(0) {
            return Err(PricingError::InvalidNumericInput {
                field: names.square_feet,
                value: 0.0,
            });
        }
        if let Some(score) = self.location_score {
            if !score.is_finite() || !(0.0..=10.0).contains(&score) {
                return Err(PricingError::InvalidNumericInput {
                    field: names.location_score,
                    value: score,
                });
            }
        }
        Ok(())
    }
}

/// Property being priced. Built once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectProperty {
    #[serde(flatten)]
    pub features: PropertyFeatures,
    #[serde(default)]
    pub requested_rent: Option<f64>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

impl SubjectProperty {
    pub fn validate(&self) -> Result<(), PricingError> {
        self.features.validate(&SUBJECT_FIELDS)?;
        if let Some(requested) = self.requested_rent {
            ensure_positive("subject.requested_rent", requested)?;
        }
        Ok(())
    }
}

/// A nearby listing with an observed rent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableProperty {
    #[serde(flatten)]
    pub features: PropertyFeatures,
    pub rent: f64,
    #[serde(default)]
    pub distance: f64,
}

impl ComparableProperty {
    pub fn validate(&self) -> Result<(), PricingError> {
        self.features.validate(&COMPARABLE_FIELDS)?;
        ensure_positive("comparable.rent", self.rent)?;
        ensure_non_negative("comparable.distance", self.distance)?;
        Ok(())
    }
}

/// Feature axis an adjustment was computed along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentCategory {
    Bedrooms,
    Bathrooms,
    SquareFootage,
    AgeCondition,
    Amenities,
    Location,
}

impl AdjustmentCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bedrooms => "Bedrooms",
            Self::Bathrooms => "Bathrooms",
            Self::SquareFootage => "Square Footage",
            Self::AgeCondition => "Age/Condition",
            Self::Amenities => "Amenities",
            Self::Location => "Location",
        }
    }
}

/// Signed dollar correction applied to one comparable along one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub category: AdjustmentCategory,
    pub amount: f64,
    pub explanation: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertySide {
    Subject,
    Comparable,
}

/// Input a category needed but did not receive. The category is skipped,
/// except age/condition which only loses confidence when one year is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingField {
    pub category: AdjustmentCategory,
    pub field: &'static str,
    pub side: PropertySide,
}

struct FieldNames {
    full_baths: &'static str,
    half_baths: &'static str,
    square_feet: &'static str,
    location_score: &'static str,
}

const SUBJECT_FIELDS: FieldNames = FieldNames {
    full_baths: "subject.full_baths",
    half_baths: "subject.half_baths",
    square_feet: "subject.square_feet",
    location_score: "subject.location_score",
};

const COMPARABLE_FIELDS: FieldNames = FieldNames {
    full_baths: "comparable.full_baths",
    half_baths: "comparable.half_baths",
    square_feet: "comparable.square_feet",
    location_score: "comparable.location_score",
};

pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<(), PricingError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PricingError::InvalidNumericInput { field, value })
    }
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), PricingError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PricingError::InvalidNumericInput { field, value })
    }
}
