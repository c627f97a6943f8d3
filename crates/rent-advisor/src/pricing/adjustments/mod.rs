mod rules;
mod weights;

pub use weights::CategoryWeights;

use serde::Serialize;
use tracing::debug;

use super::domain::{Adjustment, ComparableProperty, MissingField, SubjectProperty};
use super::PricingError;

/// Stateless engine that prices each comparable against the subject and
/// blends the results.
#[derive(Debug, Clone, Default)]
pub struct AdjustmentEngine {
    weights: CategoryWeights,
}

impl AdjustmentEngine {
    pub fn new(weights: CategoryWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &CategoryWeights {
        &self.weights
    }

    /// Computes the adjustments for a single comparable.
    pub fn adjust(&self, subject: &SubjectProperty, comp: &ComparableProperty) -> AdjustedComparable {
        let output = rules::apply_rules(subject, comp);

        let mut weighted_confidence = 0.0;
        let mut applied_weight = 0.0;
        for adjustment in &output.adjustments {
            let weight = self.weights.weight_for(adjustment.category);
            weighted_confidence += weight * adjustment.confidence;
            applied_weight += weight;
        }

        let credibility = if applied_weight > 0.0 {
            weighted_confidence / applied_weight
        } else {
            0.0
        };
        let total_weight = self.weights.total();
        let coverage = if total_weight > 0.0 {
            applied_weight / total_weight
        } else {
            0.0
        };

        let total_adjustment: f64 = output.adjustments.iter().map(|a| a.amount).sum();

        AdjustedComparable {
            comparable: comp.clone(),
            adjusted_rent: comp.rent + total_adjustment,
            total_adjustment,
            credibility,
            coverage,
            adjustments: output.adjustments,
            missing_fields: output.missing_fields,
            warnings: output.warnings,
        }
    }

    /// Validates the inputs, adjusts every comparable, and blends the adjusted
    /// rents weighted by credibility.
    pub fn analyze(
        &self,
        subject: &SubjectProperty,
        comparables: &[ComparableProperty],
    ) -> Result<ComparableAnalysis, PricingError> {
        subject.validate()?;
        for comp in comparables {
            comp.validate()?;
        }

        let per_comparable: Vec<AdjustedComparable> = comparables
            .iter()
            .map(|comp| self.adjust(subject, comp))
            .collect();

        let blend = blend(&per_comparable)?;
        debug!(
            comparables = per_comparable.len(),
            used = blend.used,
            estimated_rent = blend.estimate,
            "blended comparable rents"
        );

        Ok(ComparableAnalysis {
            estimated_rent: blend.estimate,
            average_credibility: blend.total_weight / blend.used as f64,
            comparables_used: blend.used,
            per_comparable,
        })
    }
}

/// Adjusts `comparables` against `subject` with the standard category weights.
pub fn compute_adjusted_rent(
    subject: &SubjectProperty,
    comparables: &[ComparableProperty],
) -> Result<ComparableAnalysis, PricingError> {
    AdjustmentEngine::default().analyze(subject, comparables)
}

/// One comparable after adjustment, with the audit trail that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedComparable {
    pub comparable: ComparableProperty,
    pub adjustments: Vec<Adjustment>,
    pub adjusted_rent: f64,
    pub total_adjustment: f64,
    /// Weighted mean confidence of the computed categories, 0–1.
    pub credibility: f64,
    /// Share of the category weight table that was computed, 0–1.
    pub coverage: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<MissingField>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl AdjustedComparable {
    pub fn contributes(&self) -> bool {
        self.credibility > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparableAnalysis {
    pub estimated_rent: f64,
    pub average_credibility: f64,
    pub comparables_used: usize,
    pub per_comparable: Vec<AdjustedComparable>,
}

impl ComparableAnalysis {
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.per_comparable
            .iter()
            .flat_map(|comp| comp.warnings.iter().map(String::as_str))
    }
}

struct Blend {
    estimate: f64,
    total_weight: f64,
    used: usize,
}

fn blend(per_comparable: &[AdjustedComparable]) -> Result<Blend, PricingError> {
    let mut contributions: Vec<(f64, f64)> = per_comparable
        .iter()
        .filter(|comp| comp.contributes())
        .map(|comp| (comp.adjusted_rent, comp.credibility))
        .collect();

    if contributions.is_empty() {
        return Err(PricingError::NoComparableData);
    }

    // Canonical order so the floating-point sums do not depend on input order.
    contributions.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    let total_weight: f64 = contributions.iter().map(|(_, weight)| weight).sum();
    let weighted: f64 = contributions
        .iter()
        .map(|(rent, weight)| rent * weight)
        .sum();
    let estimate = weighted / total_weight;

    if !estimate.is_finite() || estimate <= 0.0 {
        return Err(PricingError::NonPositiveEstimate { estimate });
    }

    Ok(Blend {
        estimate,
        total_weight,
        used: contributions.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::amenities::Amenity;
    use crate::pricing::domain::{
        AdjustmentCategory, PropertyFeatures, PropertySide, PropertyType, QualityTier,
    };

    fn features(address: &str) -> PropertyFeatures {
        let mut features = PropertyFeatures::new(address, PropertyType::Apartment);
        features.beds = Some(2);
        features.full_baths = Some(1.0);
        features.half_baths = Some(0.0);
        features.square_feet = Some(900);
        features.year_built = Some(2005);
        features.quality = QualityTier::Good;
        features
    }

    fn subject() -> SubjectProperty {
        SubjectProperty {
            features: features("10 Subject Way"),
            requested_rent: Some(1800.0),
            zip_code: Some("50309".to_string()),
        }
    }

    fn comparable(address: &str, rent: f64) -> ComparableProperty {
        ComparableProperty {
            features: features(address),
            rent,
            distance: 0.5,
        }
    }

    fn amount(comp: &AdjustedComparable, category: AdjustmentCategory) -> Option<f64> {
        comp.adjustments
            .iter()
            .find(|adjustment| adjustment.category == category)
            .map(|adjustment| adjustment.amount)
    }

    #[test]
    fn identical_properties_produce_zero_adjustments() {
        let engine = AdjustmentEngine::default();
        let result = engine.adjust(&subject(), &comparable("1 Twin St", 1750.0));

        assert_eq!(result.adjustments.len(), 4);
        assert!(result.adjustments.iter().all(|a| a.amount == 0.0));
        assert_eq!(result.adjusted_rent, 1750.0);
    }

    #[test]
    fn identical_amenities_location_and_remodel_cancel_out() {
        let twin = |features: &mut PropertyFeatures| {
            features.quality = QualityTier::Excellent;
            features.location_score = Some(7.0);
            features.amenities = [Amenity::Parking, Amenity::Dishwasher, Amenity::Pool]
                .into_iter()
                .collect();
        };
        let mut subject = subject();
        twin(&mut subject.features);
        let mut comp = comparable("3 Twin St", 1750.0);
        twin(&mut comp.features);

        let result = AdjustmentEngine::default().adjust(&subject, &comp);
        assert_eq!(result.adjustments.len(), 6);
        assert!(result.adjustments.iter().all(|a| a.amount == 0.0));
        assert_eq!(amount(&result, AdjustmentCategory::Amenities), Some(0.0));
        assert_eq!(amount(&result, AdjustmentCategory::Location), Some(0.0));
        assert_eq!(amount(&result, AdjustmentCategory::AgeCondition), Some(0.0));
        assert_eq!(result.adjusted_rent, 1750.0);
        assert!(result.missing_fields.is_empty());
    }

    #[test]
    fn bedroom_difference_is_two_hundred_per_room() {
        let mut subject = subject();
        subject.features.beds = Some(3);
        let comp = comparable("2 Bed Ln", 2000.0);

        let result = AdjustmentEngine::default().adjust(&subject, &comp);
        assert_eq!(amount(&result, AdjustmentCategory::Bedrooms), Some(200.0));
    }

    #[test]
    fn bathrooms_scale_with_comparable_rent() {
        let mut subject = subject();
        subject.features.full_baths = Some(2.0);
        subject.features.half_baths = Some(1.0);
        let comp = comparable("1 Bath Ct", 2000.0);

        let result = AdjustmentEngine::default().adjust(&subject, &comp);
        let bath = amount(&result, AdjustmentCategory::Bathrooms).expect("bath adjustment");
        // 1 full bath at 4% of rent plus a half bath at 40% of that.
        assert!((bath - (80.0 + 32.0)).abs() < 1e-9, "bath was {bath}");
    }

    #[test]
    fn square_footage_is_log_dampened() {
        let mut subject = subject();
        subject.features.square_feet = Some(1899);
        let comp = comparable("Small Pl", 2000.0);

        let result = AdjustmentEngine::default().adjust(&subject, &comp);
        let sqft = amount(&result, AdjustmentCategory::SquareFootage).expect("sqft adjustment");
        // log10(999 + 1) * 2000 / 1000
        assert!((sqft - 6.0).abs() < 1e-9, "sqft was {sqft}");

        subject.features.square_feet = Some(800);
        let result = AdjustmentEngine::default().adjust(&subject, &comp);
        let sqft = amount(&result, AdjustmentCategory::SquareFootage).expect("sqft adjustment");
        assert!(sqft < 0.0);
    }

    #[test]
    fn excellent_subject_earns_quality_and_remodel_premium() {
        let mut subject = subject();
        subject.features.quality = QualityTier::Excellent;
        let comp = comparable("Plain Ave", 2000.0);

        let result = AdjustmentEngine::default().adjust(&subject, &comp);
        let age = result
            .adjustments
            .iter()
            .find(|a| a.category == AdjustmentCategory::AgeCondition)
            .expect("age adjustment");
        // 10% quality gap plus 5% remodel bonus, no age gap.
        assert!((age.amount - 300.0).abs() < 1e-6, "age was {}", age.amount);
        assert!((age.confidence - 0.85).abs() < 1e-12);
        assert!(age.explanation.contains("recently remodeled"));
    }

    #[test]
    fn age_confidence_drops_for_unknown_quality_and_missing_year() {
        let mut subject = subject();
        subject.features.quality = QualityTier::Unknown;
        subject.features.year_built = None;
        let comp = comparable("Old Rd", 1500.0);

        let result = AdjustmentEngine::default().adjust(&subject, &comp);
        let age = result
            .adjustments
            .iter()
            .find(|a| a.category == AdjustmentCategory::AgeCondition)
            .expect("age adjustment still computed");
        assert!((age.confidence - 0.85 * 0.8 * 0.7).abs() < 1e-12);
        assert!(result.missing_fields.iter().any(|missing| {
            missing.field == "year_built" && missing.side == PropertySide::Subject
        }));
    }

    #[test]
    fn missing_square_feet_skips_the_category() {
        let mut comp = comparable("No Size St", 1600.0);
        comp.features.square_feet = None;

        let result = AdjustmentEngine::default().adjust(&subject(), &comp);
        assert!(amount(&result, AdjustmentCategory::SquareFootage).is_none());
        assert_eq!(result.missing_fields.len(), 1);
        assert_eq!(result.missing_fields[0].side, PropertySide::Comparable);
    }

    #[test]
    fn amenity_differences_are_signed_by_owner() {
        let mut subject = subject();
        subject.features.amenities.insert(Amenity::Garage);
        let mut comp = comparable("Pool Dr", 1900.0);
        comp.features.amenities.insert(Amenity::Pool);

        let result = AdjustmentEngine::default().adjust(&subject, &comp);
        assert_eq!(amount(&result, AdjustmentCategory::Amenities), Some(25.0));
    }

    #[test]
    fn unknown_amenities_are_reported_not_priced() {
        let mut subject = subject();
        subject.features.amenities.insert(Amenity::parse("Rooftop Helipad"));
        let comp = comparable("Plain Ave", 1900.0);

        let result = AdjustmentEngine::default().adjust(&subject, &comp);
        assert_eq!(amount(&result, AdjustmentCategory::Amenities), Some(0.0));
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("Rooftop Helipad"));
    }

    #[test]
    fn credibility_only_counts_computed_categories() {
        let engine = AdjustmentEngine::default();
        let result = engine.adjust(&subject(), &comparable("Twin", 1700.0));
        // beds .15*.95 + baths .15*.9 + sqft .20*.9 + age .10*.85 over .60
        let expected = (0.15 * 0.95 + 0.15 * 0.9 + 0.20 * 0.9 + 0.10 * 0.85) / 0.60;
        assert!((result.credibility - expected).abs() < 1e-12);
        assert!((result.coverage - 0.60).abs() < 1e-12);
    }

    #[test]
    fn blended_estimate_is_credibility_weighted() {
        let subject = subject();
        let mut sparse = comparable("Sparse", 2400.0);
        sparse.features.beds = None;
        sparse.features.full_baths = None;
        sparse.features.square_feet = None;
        let comps = vec![comparable("Full", 1800.0), sparse];

        let analysis = compute_adjusted_rent(&subject, &comps).expect("estimate");
        let full = &analysis.per_comparable[0];
        let sparse = &analysis.per_comparable[1];
        let expected = (full.adjusted_rent * full.credibility
            + sparse.adjusted_rent * sparse.credibility)
            / (full.credibility + sparse.credibility);
        assert!((analysis.estimated_rent - expected).abs() < 1e-9);
        assert_eq!(analysis.comparables_used, 2);
    }

    #[test]
    fn empty_comparables_report_no_data() {
        let err = compute_adjusted_rent(&subject(), &[]).expect_err("no data");
        assert!(matches!(err, PricingError::NoComparableData));
    }

    #[test]
    fn comparables_without_any_category_report_no_data() {
        let mut bare_subject = subject();
        bare_subject.features = PropertyFeatures::new("Bare", PropertyType::Condo);
        let comp = ComparableProperty {
            features: PropertyFeatures::new("Bare Comp", PropertyType::Condo),
            rent: 1500.0,
            distance: 1.0,
        };

        let err = compute_adjusted_rent(&bare_subject, &[comp]).expect_err("no usable data");
        assert!(matches!(err, PricingError::NoComparableData));
    }

    #[test]
    fn adjustments_below_zero_are_not_reported_as_missing_data() {
        let mut studio = subject();
        studio.features.beds = Some(0);
        let mut mansion = comparable("Big House", 1000.0);
        mansion.features.beds = Some(20);

        let err = compute_adjusted_rent(&studio, &[mansion]).expect_err("negative blend");
        match err {
            PricingError::NonPositiveEstimate { estimate } => assert!(estimate < 0.0),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn invalid_rent_is_rejected_before_adjusting() {
        let err = compute_adjusted_rent(&subject(), &[comparable("Free", -5.0)])
            .expect_err("negative rent");
        assert!(matches!(err, PricingError::InvalidNumericInput { .. }));
    }
}
