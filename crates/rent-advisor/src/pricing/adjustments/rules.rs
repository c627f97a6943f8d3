use tracing::warn;

use super::super::amenities::Amenity;
use super::super::domain::{
    Adjustment, AdjustmentCategory, ComparableProperty, MissingField, PropertySide,
    QualityTier, SubjectProperty,
};

pub(crate) const BEDROOM_DOLLARS: f64 = 200.0;
pub(crate) const BEDROOM_CONFIDENCE: f64 = 0.95;
pub(crate) const FULL_BATH_RENT_SHARE: f64 = 0.04;
pub(crate) const HALF_BATH_FACTOR: f64 = 0.4;
pub(crate) const BATHROOM_CONFIDENCE: f64 = 0.9;
pub(crate) const SQFT_CONFIDENCE: f64 = 0.9;
pub(crate) const AGE_RENT_SHARE: f64 = 0.005;
pub(crate) const REMODEL_RENT_SHARE: f64 = 0.05;
pub(crate) const AGE_BASE_CONFIDENCE: f64 = 0.85;
pub(crate) const UNKNOWN_QUALITY_PENALTY: f64 = 0.8;
pub(crate) const MISSING_YEAR_PENALTY: f64 = 0.7;
pub(crate) const AMENITY_CONFIDENCE: f64 = 0.8;
pub(crate) const LOCATION_DOLLARS_PER_POINT: f64 = 100.0;
pub(crate) const LOCATION_THRESHOLD: f64 = 0.5;
pub(crate) const LOCATION_CONFIDENCE: f64 = 0.75;

type Rule = fn(&SubjectProperty, &ComparableProperty, &mut RuleOutput) -> Option<Adjustment>;

const RULES: [Rule; 6] = [
    bedrooms,
    bathrooms,
    square_footage,
    age_condition,
    amenities,
    location,
];

/// Per-comparable accumulator for the category rules.
pub(crate) struct RuleOutput {
    pub adjustments: Vec<Adjustment>,
    pub missing_fields: Vec<MissingField>,
    pub warnings: Vec<String>,
}

pub(crate) fn apply_rules(subject: &SubjectProperty, comp: &ComparableProperty) -> RuleOutput {
    let mut output = RuleOutput {
        adjustments: Vec::new(),
        missing_fields: Vec::new(),
        warnings: Vec::new(),
    };

    for rule in RULES {
        if let Some(adjustment) = rule(subject, comp, &mut output) {
            output.adjustments.push(adjustment);
        }
    }

    output
}

fn bedrooms(
    subject: &SubjectProperty,
    comp: &ComparableProperty,
    output: &mut RuleOutput,
) -> Option<Adjustment> {
    let (subject_beds, comp_beds) = require(
        AdjustmentCategory::Bedrooms,
        "beds",
        subject.features.beds,
        comp.features.beds,
        output,
    )?;

    let diff = i64::from(subject_beds) - i64::from(comp_beds);
    let explanation = match diff {
        0 => "Same bedroom count".to_string(),
        d if d > 0 => format!("{} bedroom{} more", d, plural(d.unsigned_abs() as f64)),
        d => format!("{} bedroom{} less", d.abs(), plural(d.unsigned_abs() as f64)),
    };

    Some(Adjustment {
        category: AdjustmentCategory::Bedrooms,
        amount: diff as f64 * BEDROOM_DOLLARS,
        explanation,
        confidence: BEDROOM_CONFIDENCE,
    })
}

fn bathrooms(
    subject: &SubjectProperty,
    comp: &ComparableProperty,
    output: &mut RuleOutput,
) -> Option<Adjustment> {
    let (subject_full, comp_full) = require(
        AdjustmentCategory::Bathrooms,
        "full_baths",
        subject.features.full_baths,
        comp.features.full_baths,
        output,
    )?;

    let full_diff = subject_full - comp_full;
    let half_diff =
        subject.features.half_baths.unwrap_or(0.0) - comp.features.half_baths.unwrap_or(0.0);
    let rate = comp.rent * FULL_BATH_RENT_SHARE;
    let amount = full_diff * rate + half_diff * rate * HALF_BATH_FACTOR;

    let mut parts = Vec::new();
    if full_diff != 0.0 {
        parts.push(describe_count(full_diff, "full bath"));
    }
    if half_diff != 0.0 {
        parts.push(describe_count(half_diff, "half bath"));
    }
    let explanation = if parts.is_empty() {
        "Same bathroom count".to_string()
    } else {
        parts.join(", ")
    };

    Some(Adjustment {
        category: AdjustmentCategory::Bathrooms,
        amount,
        explanation,
        confidence: BATHROOM_CONFIDENCE,
    })
}

fn square_footage(
    subject: &SubjectProperty,
    comp: &ComparableProperty,
    output: &mut RuleOutput,
) -> Option<Adjustment> {
    let (subject_sqft, comp_sqft) = require(
        AdjustmentCategory::SquareFootage,
        "square_feet",
        subject.features.square_feet,
        comp.features.square_feet,
        output,
    )?;

    let diff = f64::from(subject_sqft) - f64::from(comp_sqft);
    let amount = sign(diff) * (diff.abs() + 1.0).log10() * (comp.rent / 1000.0);
    let explanation = if diff == 0.0 {
        "Same square footage".to_string()
    } else {
        format!(
            "{} sqft {}",
            diff.abs(),
            if diff > 0.0 { "larger" } else { "smaller" }
        )
    };

    Some(Adjustment {
        category: AdjustmentCategory::SquareFootage,
        amount,
        explanation,
        confidence: SQFT_CONFIDENCE,
    })
}

fn age_condition(
    subject: &SubjectProperty,
    comp: &ComparableProperty,
    output: &mut RuleOutput,
) -> Option<Adjustment> {
    let subject_year = subject.features.year_built;
    let comp_year = comp.features.year_built;

    if subject_year.is_none() && comp_year.is_none() {
        record_missing(
            AdjustmentCategory::AgeCondition,
            "year_built",
            true,
            true,
            output,
        );
        return None;
    }

    let subject_quality = subject.features.quality;
    let comp_quality = comp.features.quality;

    // Positive when the subject is older than the comparable.
    let age_diff = match (subject_year, comp_year) {
        (Some(subject_year), Some(comp_year)) => {
            Some(i64::from(comp_year) - i64::from(subject_year))
        }
        _ => None,
    };
    let age_impact = age_diff
        .map(|diff| {
            let diff = diff as f64;
            sign(diff) * (diff.abs() + 1.0).log10() * (comp.rent * AGE_RENT_SHARE)
        })
        .unwrap_or(0.0);

    let quality_diff = subject_quality.multiplier() - comp_quality.multiplier();
    let quality_impact = comp.rent * quality_diff;

    let remodel_impact = match (
        subject_quality.recently_remodeled(),
        comp_quality.recently_remodeled(),
    ) {
        (true, false) => comp.rent * REMODEL_RENT_SHARE,
        (false, true) => -comp.rent * REMODEL_RENT_SHARE,
        _ => 0.0,
    };

    let mut confidence = AGE_BASE_CONFIDENCE;
    if subject_quality == QualityTier::Unknown || comp_quality == QualityTier::Unknown {
        confidence *= UNKNOWN_QUALITY_PENALTY;
    }
    if subject_year.is_none() || comp_year.is_none() {
        confidence *= MISSING_YEAR_PENALTY;
        record_missing(
            AdjustmentCategory::AgeCondition,
            "year_built",
            subject_year.is_none(),
            comp_year.is_none(),
            output,
        );
    }

    let mut parts = Vec::new();
    if let Some(diff) = age_diff.filter(|diff| *diff != 0) {
        parts.push(format!(
            "{} years {}",
            diff.abs(),
            if diff > 0 { "older" } else { "newer" }
        ));
    }
    if quality_diff != 0.0 {
        parts.push(format!(
            "{} vs {}",
            subject_quality.label(),
            comp_quality.label()
        ));
    }
    if remodel_impact > 0.0 {
        parts.push("recently remodeled".to_string());
    } else if remodel_impact < 0.0 {
        parts.push("comp recently remodeled".to_string());
    }
    let explanation = if parts.is_empty() {
        "Similar age and condition".to_string()
    } else {
        parts.join(", ")
    };

    Some(Adjustment {
        category: AdjustmentCategory::AgeCondition,
        amount: age_impact + quality_impact + remodel_impact,
        explanation,
        confidence,
    })
}

fn amenities(
    subject: &SubjectProperty,
    comp: &ComparableProperty,
    output: &mut RuleOutput,
) -> Option<Adjustment> {
    let subject_amenities = &subject.features.amenities;
    let comp_amenities = &comp.features.amenities;
    if subject_amenities.is_empty() && comp_amenities.is_empty() {
        return None;
    }

    let subject_only: Vec<&Amenity> = subject_amenities.difference(comp_amenities).collect();
    let comp_only: Vec<&Amenity> = comp_amenities.difference(subject_amenities).collect();

    for (amenity, side) in subject_only
        .iter()
        .map(|amenity| (*amenity, "subject"))
        .chain(comp_only.iter().map(|amenity| (*amenity, "comparable")))
    {
        if !amenity.is_known() {
            warn!(
                amenity = amenity.label(),
                side,
                address = %comp.features.address,
                "unrecognised amenity carries no rent adjustment"
            );
            output.warnings.push(format!(
                "unrecognised amenity '{}' on {} ignored",
                amenity.label(),
                side
            ));
        }
    }

    let cents: i64 = subject_only
        .iter()
        .map(|amenity| amenity.adjustment_cents())
        .sum::<i64>()
        - comp_only
            .iter()
            .map(|amenity| amenity.adjustment_cents())
            .sum::<i64>();

    let mut parts = Vec::new();
    if !subject_only.is_empty() {
        parts.push(format!("subject adds {}", join_labels(&subject_only)));
    }
    if !comp_only.is_empty() {
        parts.push(format!("comparable adds {}", join_labels(&comp_only)));
    }
    let explanation = if parts.is_empty() {
        "Same amenities".to_string()
    } else {
        parts.join("; ")
    };

    Some(Adjustment {
        category: AdjustmentCategory::Amenities,
        amount: cents as f64 / 100.0,
        explanation,
        confidence: AMENITY_CONFIDENCE,
    })
}

fn location(
    subject: &SubjectProperty,
    comp: &ComparableProperty,
    output: &mut RuleOutput,
) -> Option<Adjustment> {
    let subject_score = subject.features.location_score;
    let comp_score = comp.features.location_score;
    if subject_score.is_none() && comp_score.is_none() {
        return None;
    }

    let (subject_score, comp_score) = require(
        AdjustmentCategory::Location,
        "location_score",
        subject_score,
        comp_score,
        output,
    )?;

    let diff = subject_score - comp_score;
    let (amount, explanation) = if diff.abs() > LOCATION_THRESHOLD {
        (
            diff * LOCATION_DOLLARS_PER_POINT,
            format!("Location score difference of {:.1}", diff),
        )
    } else {
        (0.0, "Comparable location".to_string())
    };

    Some(Adjustment {
        category: AdjustmentCategory::Location,
        amount,
        explanation,
        confidence: LOCATION_CONFIDENCE,
    })
}

fn require<T: Copy>(
    category: AdjustmentCategory,
    field: &'static str,
    subject: Option<T>,
    comp: Option<T>,
    output: &mut RuleOutput,
) -> Option<(T, T)> {
    match (subject, comp) {
        (Some(subject), Some(comp)) => Some((subject, comp)),
        (subject, comp) => {
            record_missing(category, field, subject.is_none(), comp.is_none(), output);
            None
        }
    }
}

fn record_missing(
    category: AdjustmentCategory,
    field: &'static str,
    subject_missing: bool,
    comp_missing: bool,
    output: &mut RuleOutput,
) {
    if subject_missing {
        output.missing_fields.push(MissingField {
            category,
            field,
            side: PropertySide::Subject,
        });
    }
    if comp_missing {
        output.missing_fields.push(MissingField {
            category,
            field,
            side: PropertySide::Comparable,
        });
    }
}

/// Like `f64::signum` but zero for zero.
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn plural(count: f64) -> &'static str {
    if count == 1.0 {
        ""
    } else {
        "s"
    }
}

fn describe_count(diff: f64, noun: &str) -> String {
    format!(
        "{} {}{} {}",
        diff.abs(),
        noun,
        plural(diff.abs()),
        if diff > 0.0 { "more" } else { "less" }
    )
}

fn join_labels(amenities: &[&Amenity]) -> String {
    amenities
        .iter()
        .map(|amenity| amenity.label())
        .collect::<Vec<_>>()
        .join(", ")
}
