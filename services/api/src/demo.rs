use crate::infra::{
    parse_amenity, parse_property_type, parse_quality, InMemoryAnalysisRepository,
};
use chrono::Datelike;
use clap::Args;
use rent_advisor::analyses::{AnalysisRequest, RentAnalysisService, RentEstimate};
use rent_advisor::comparables::{ComparableSource, CsvComparableSource, MockComparableSource};
use rent_advisor::error::AppError;
use rent_advisor::narrative::{ComplianceRequest, ListingRequest, SummaryWriter};
use rent_advisor::neighborhood::{
    compute_neighborhood_score, CachedNeighborhoodSource, NeighborhoodMetrics,
    NeighborhoodScore, NeighborhoodSource, StaticNeighborhoodSource, SystemClock,
    DEFAULT_TTL_SECS,
};
use rent_advisor::pricing::{
    baseline_rent, market_estimate, Amenity, MarketFactors, PropertyFeatures, PropertySide,
    PropertyType, QualityTier, SubjectProperty,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// Street address of the property being priced
    #[arg(long, default_value = "Subject property")]
    pub(crate) address: String,
    /// Property type (Single-Family, Condo, Townhouse, Multi-Unit, Apartment, Duplex, Mobile Home)
    #[arg(long, value_parser = parse_property_type, default_value = "Single-Family")]
    pub(crate) property_type: PropertyType,
    #[arg(long)]
    pub(crate) beds: Option<u32>,
    #[arg(long)]
    pub(crate) full_baths: Option<f64>,
    #[arg(long)]
    pub(crate) half_baths: Option<f64>,
    #[arg(long)]
    pub(crate) square_feet: Option<u32>,
    #[arg(long)]
    pub(crate) year_built: Option<i32>,
    /// Condition tier: excellent, good, fair, poor
    #[arg(long, value_parser = parse_quality)]
    pub(crate) quality: Option<QualityTier>,
    /// Comma-separated amenity tags, e.g. "central ac,garage"
    #[arg(long, value_parser = parse_amenity, value_delimiter = ',')]
    pub(crate) amenities: Vec<Amenity>,
    /// Location score from 0 to 10
    #[arg(long)]
    pub(crate) location_score: Option<f64>,
    /// Rent the owner is asking for, checked against the suggested range
    #[arg(long)]
    pub(crate) requested_rent: Option<f64>,
    #[arg(long)]
    pub(crate) zip: Option<String>,
    /// Listing CSV export to draw comparables from (synthetic comparables when omitted)
    #[arg(long)]
    pub(crate) comparables_csv: Option<PathBuf>,
    /// Print the estimate as JSON instead of a report
    #[arg(long)]
    pub(crate) json: bool,
}

impl EstimateArgs {
    pub(crate) fn subject(&self) -> SubjectProperty {
        let mut features = PropertyFeatures::new(self.address.clone(), self.property_type);
        features.beds = self.beds;
        features.full_baths = self.full_baths;
        features.half_baths = self.half_baths;
        features.square_feet = self.square_feet;
        features.year_built = self.year_built;
        features.quality = self.quality.unwrap_or_default();
        features.amenities = self.amenities.iter().cloned().collect();
        features.location_score = self.location_score;

        SubjectProperty {
            features,
            requested_rent: self.requested_rent,
            zip_code: self.zip.clone(),
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct NeighborhoodArgs {
    /// Crimes per 1,000 residents
    #[arg(long)]
    pub(crate) crime_rate: Option<f64>,
    /// Safety index on a 0-10 scale
    #[arg(long)]
    pub(crate) safety_index: Option<f64>,
    #[arg(long)]
    pub(crate) median_income: Option<f64>,
    /// School rating on a 0-10 scale
    #[arg(long)]
    pub(crate) school_rating: Option<f64>,
    /// Employment rate as a fraction (0.95) or percentage (95)
    #[arg(long)]
    pub(crate) employment_rate: Option<f64>,
    /// Residents per square mile
    #[arg(long)]
    pub(crate) population_density: Option<f64>,
    #[arg(long)]
    pub(crate) median_home_value: Option<f64>,
    #[arg(long)]
    pub(crate) median_rent: Option<f64>,
    /// Print the score as JSON instead of a report
    #[arg(long)]
    pub(crate) json: bool,
}

impl NeighborhoodArgs {
    fn metrics(&self) -> NeighborhoodMetrics {
        NeighborhoodMetrics {
            crime_rate: self.crime_rate,
            safety_index: self.safety_index,
            median_income: self.median_income,
            school_rating: self.school_rating,
            employment_rate: self.employment_rate,
            population_density: self.population_density,
            median_home_value: self.median_home_value,
            median_rent: self.median_rent,
            ..NeighborhoodMetrics::default()
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// ZIP code for the sample property
    #[arg(long, default_value = "50309")]
    pub(crate) zip: String,
    /// Asking rent to compare with the suggested range
    #[arg(long, default_value_t = 2450.0)]
    pub(crate) requested_rent: f64,
    /// Skip the generated summary
    #[arg(long)]
    pub(crate) skip_narrative: bool,
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let subject = args.subject();
    let source: Arc<dyn ComparableSource> = match &args.comparables_csv {
        Some(path) => Arc::new(CsvComparableSource::from_path(path)?),
        None => Arc::new(MockComparableSource),
    };

    let service = RentAnalysisService::new(Arc::new(InMemoryAnalysisRepository::default()), source);
    let estimate = service.estimate(&subject, None, None)?;

    if args.json {
        print_json(&estimate)?;
    } else {
        render_estimate(&subject, &estimate);
    }
    Ok(())
}

pub(crate) fn run_neighborhood(args: NeighborhoodArgs) -> Result<(), AppError> {
    let metrics = args.metrics();
    metrics.validate()?;
    let score = compute_neighborhood_score(&metrics);

    if args.json {
        print_json(&score)?;
    } else {
        println!("Neighborhood score: {:.1}/10", score.score);
        render_breakdown(&score);
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        zip,
        requested_rent,
        skip_narrative,
    } = args;

    let subject = sample_subject(zip, requested_rent);
    let neighborhood = Arc::new(CachedNeighborhoodSource::new(
        StaticNeighborhoodSource::sample(),
        chrono::Duration::seconds(DEFAULT_TTL_SECS),
        Arc::new(SystemClock),
    ));
    let repository = Arc::new(InMemoryAnalysisRepository::default());
    let service = RentAnalysisService::new(repository, Arc::new(MockComparableSource))
        .with_neighborhood(neighborhood.clone())
        .with_narrator(Arc::new(SummaryWriter::default()));

    println!("Rent advisor demo");
    let mut request = AnalysisRequest::for_subject(subject.clone());
    request.include_narrative = !skip_narrative;
    let record = service.submit(request)?;
    println!("Stored analysis {}", record.analysis_id.0);
    render_estimate(&record.subject, &record.estimate);

    if let Some(narrative) = &record.narrative {
        println!("\nSummary");
        println!("{}", narrative.text);
        println!(
            "({} prompt tokens, {} completion tokens)",
            narrative.usage.prompt_tokens, narrative.usage.completion_tokens
        );
    }

    let metrics = subject
        .zip_code
        .as_deref()
        .and_then(|zip| neighborhood.metrics(zip).ok())
        .unwrap_or_default();
    let comparable_rents: Vec<f64> = record
        .estimate
        .analysis
        .per_comparable
        .iter()
        .map(|adjusted| adjusted.comparable.rent)
        .collect();
    let property_age = subject
        .features
        .year_built
        .map(|year| (record.created_at.year() - year).max(0) as u32)
        .unwrap_or_default();

    let factors = MarketFactors {
        comparable_median_rent: median(&comparable_rents),
        crime_index: metrics.crime_rate.unwrap_or(0.0),
        walk_score: metrics.walkability_score.unwrap_or(0.0),
        school_score: metrics.school_rating.unwrap_or(0.0),
        amenity_count: subject.features.amenities.len(),
        property_age,
        square_feet: subject.features.square_feet.unwrap_or_default(),
    };
    let market = market_estimate(&factors)?;
    println!("\nMarket heuristic cross-check");
    println!(
        "- ${} (range ${} - ${}) | confidence {}%",
        market.median, market.low, market.high, market.confidence
    );
    if let (Some(sqft), Some(beds), Some(full)) = (
        subject.features.square_feet,
        subject.features.beds,
        subject.features.full_baths,
    ) {
        let baths = full + subject.features.half_baths.unwrap_or(0.0) * 0.5;
        println!(
            "- Baseline from size and rooms: ${:.0}",
            baseline_rent(sqft, beds, baths)
        );
    }
    println!(
        "- Neighborhood cache entries: {}",
        neighborhood.cached_entries()
    );

    let mut compliance = ComplianceRequest::new(
        "IA",
        "Des Moines",
        f64::from(record.estimate.range.median),
        requested_rent,
    );
    compliance.include_commentary = !skip_narrative;
    let review = service.check_rent_increase(&compliance)?;
    println!("\nMoving a tenant from the suggested rent to the requested rent");
    println!(
        "- {}: ${:.2} ({:.2}%)",
        review.location, review.increase.amount, review.increase.percentage
    );
    if let Some(commentary) = &review.commentary {
        println!("- {}", commentary.text);
    }

    if !skip_narrative {
        let features = &subject.features;
        let mut listing = ListingRequest::new(
            features.property_type,
            features.beds.unwrap_or_default(),
            features.full_baths.unwrap_or_default()
                + features.half_baths.unwrap_or_default() * 0.5,
        );
        listing.square_feet = features.square_feet;
        listing.location = subject.zip_code.as_ref().map(|zip| format!("ZIP {zip}"));
        listing.amenities = features.amenities.clone();
        let description = service.describe_listing(&listing)?;
        println!("\nListing copy");
        println!("{}", description.text);
    }

    Ok(())
}

fn sample_subject(zip: String, requested_rent: f64) -> SubjectProperty {
    let mut features = PropertyFeatures::new("2400 Ingersoll Ave", PropertyType::SingleFamily);
    features.beds = Some(3);
    features.full_baths = Some(2.0);
    features.half_baths = Some(0.0);
    features.square_feet = Some(1450);
    features.year_built = Some(2005);
    features.quality = QualityTier::Good;
    features.amenities = [Amenity::CentralAc, Amenity::Dishwasher, Amenity::Parking]
        .into_iter()
        .collect();

    SubjectProperty {
        features,
        requested_rent: Some(requested_rent),
        zip_code: Some(zip),
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

fn render_estimate(subject: &SubjectProperty, estimate: &RentEstimate) {
    let range = estimate.range;
    println!("\nRent estimate for {}", subject.features.address);
    println!(
        "- Suggested ${} per month (range ${} - ${}) | confidence {}%",
        range.median, range.low, range.high, range.confidence
    );
    if let (Some(requested), Some(within)) =
        (subject.requested_rent, estimate.requested_rent_within_range)
    {
        let verdict = if within {
            "within range"
        } else if requested < f64::from(range.low) {
            "below range"
        } else {
            "above range"
        };
        println!("- Requested ${requested:.0}: {verdict}");
    }

    let analysis = &estimate.analysis;
    println!(
        "\nComparables ({} of {} used, average credibility {:.2})",
        analysis.comparables_used,
        analysis.per_comparable.len(),
        analysis.average_credibility
    );
    for adjusted in &analysis.per_comparable {
        println!(
            "  - {}: listed ${:.0} -> adjusted ${:.0} | credibility {:.2} | coverage {:.0}%",
            adjusted.comparable.features.address,
            adjusted.comparable.rent,
            adjusted.adjusted_rent,
            adjusted.credibility,
            adjusted.coverage * 100.0
        );
        for adjustment in &adjusted.adjustments {
            println!(
                "      {:<15} {:>+8.0}  {}",
                adjustment.category.label(),
                adjustment.amount,
                adjustment.explanation
            );
        }
        for missing in &adjusted.missing_fields {
            let side = match missing.side {
                PropertySide::Subject => "subject",
                PropertySide::Comparable => "comparable",
            };
            println!(
                "      {:<15} skipped: {} missing on {}",
                missing.category.label(),
                missing.field,
                side
            );
        }
    }

    if !estimate.warnings.is_empty() {
        println!("Warnings:");
        for warning in &estimate.warnings {
            println!("  - {warning}");
        }
    }

    if let Some(score) = &estimate.neighborhood {
        println!("\nNeighborhood score: {:.1}/10", score.score);
        render_breakdown(score);
    }
}

fn render_breakdown(score: &NeighborhoodScore) {
    let breakdown = &score.breakdown;
    let entries = [
        ("Crime", breakdown.crime),
        ("Safety", breakdown.safety),
        ("Income", breakdown.income),
        ("Schools", breakdown.school),
        ("Employment", breakdown.employment),
        ("Density", breakdown.density),
        ("Home value", breakdown.home_value),
    ];
    for (label, contribution) in entries {
        match contribution {
            Some(value) => println!("  - {label:<11} {value:>5.2}"),
            None => println!("  - {label:<11}   n/a"),
        }
    }
}
