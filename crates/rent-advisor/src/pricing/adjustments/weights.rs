use serde::{Deserialize, Serialize};

use super::super::domain::AdjustmentCategory;

/// Relative influence of each feature axis on a comparable's credibility.
///
/// `property_type` and `utilities` have no adjustment rule yet; they count
/// toward [`CategoryWeights::total`] (and therefore coverage) but never toward
/// credibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub square_footage: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub property_type: f64,
    pub year_built: f64,
    pub utilities: f64,
    pub amenities: f64,
    pub location: f64,
}

impl CategoryWeights {
    pub const fn standard() -> Self {
        Self {
            square_footage: 0.20,
            bedrooms: 0.15,
            bathrooms: 0.15,
            property_type: 0.12,
            year_built: 0.10,
            utilities: 0.10,
            amenities: 0.08,
            location: 0.10,
        }
    }

    pub fn weight_for(&self, category: AdjustmentCategory) -> f64 {
        match category {
            AdjustmentCategory::SquareFootage => self.square_footage,
            AdjustmentCategory::Bedrooms => self.bedrooms,
            AdjustmentCategory::Bathrooms => self.bathrooms,
            AdjustmentCategory::AgeCondition => self.year_built,
            AdjustmentCategory::Amenities => self.amenities,
            AdjustmentCategory::Location => self.location,
        }
    }

    pub fn total(&self) -> f64 {
        self.square_footage
            + self.bedrooms
            + self.bathrooms
            + self.property_type
            + self.year_built
            + self.utilities
            + self.amenities
            + self.location
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_weights_sum_to_one() {
        let total = CategoryWeights::standard().total();
        assert!((total - 1.0).abs() < 1e-9, "total was {total}");
    }
}
