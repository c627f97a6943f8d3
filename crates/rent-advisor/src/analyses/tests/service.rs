use super::common::*;
use crate::analyses::domain::{AnalysisId, AnalysisRequest};
use crate::analyses::repository::{AnalysisRepository, RepositoryError};
use crate::analyses::{AnalysisServiceError, RentAnalysisService};
use crate::comparables::{ComparableSourceError, MockComparableSource};
use crate::narrative::{ComplianceRequest, ListingRequest, NarrativeError, SummaryWriter};
use crate::neighborhood::{ManualClock, NeighborhoodMetrics, StaticNeighborhoodSource};
use crate::pricing::{Amenity, PricingError, PropertyType};
use std::sync::Arc;

#[test]
fn estimate_blends_supplied_comparables() {
    let (service, repository) = build_service();

    let estimate = service
        .estimate(&subject(), Some(comparables()), None)
        .expect("estimate succeeds");

    assert_eq!(estimate.analysis.comparables_used, 2);
    assert_eq!(estimate.range.low, 1800);
    assert_eq!(estimate.range.median, 2000);
    assert_eq!(estimate.range.high, 2200);
    // No crime, walk or school signals.
    assert_eq!(estimate.range.confidence, 80);
    assert_eq!(estimate.requested_rent_within_range, Some(true));
    assert!(estimate.neighborhood.is_none());
    assert!(repository.recent(10).expect("recent").is_empty());
}

#[test]
fn estimate_fetches_comparables_when_omitted() {
    let repository = Arc::new(MemoryRepository::default());
    let service = RentAnalysisService::new(repository, Arc::new(MockComparableSource));

    let estimate = service
        .estimate(&subject(), None, None)
        .expect("estimate succeeds");

    assert_eq!(estimate.analysis.per_comparable.len(), 3);
    assert!(estimate.range.median > 0);
}

#[test]
fn estimate_rejects_empty_comparable_set() {
    let (service, _) = build_service();

    match service.estimate(&subject(), Some(Vec::new()), None) {
        Err(AnalysisServiceError::Pricing(PricingError::NoComparableData)) => {}
        other => panic!("expected no comparable data, got {other:?}"),
    }
}

#[test]
fn estimate_propagates_comparable_source_failures() {
    let service = RentAnalysisService::new(
        Arc::new(MemoryRepository::default()),
        Arc::new(OfflineComparables),
    );

    match service.estimate(&subject(), None, None) {
        Err(AnalysisServiceError::Comparables(ComparableSourceError::Unavailable(_))) => {}
        other => panic!("expected source failure, got {other:?}"),
    }
}

#[test]
fn neighborhood_lookup_by_zip_lifts_confidence() {
    let (service, _) = build_service();
    let service = service.with_neighborhood(Arc::new(StaticNeighborhoodSource::sample()));

    let estimate = service
        .estimate(&subject(), Some(comparables()), None)
        .expect("estimate succeeds");

    assert_eq!(estimate.range.confidence, 100);
    let neighborhood = estimate.neighborhood.expect("score attached");
    assert!((1.0..=10.0).contains(&neighborhood.score));
}

#[test]
fn failed_neighborhood_lookup_is_not_fatal() {
    let (service, _) = build_service();
    let service = service.with_neighborhood(Arc::new(StaticNeighborhoodSource::new()));

    let estimate = service
        .estimate(&subject(), Some(comparables()), None)
        .expect("estimate succeeds");

    assert!(estimate.neighborhood.is_none());
    assert_eq!(estimate.range.confidence, 80);
}

#[test]
fn supplied_metrics_are_validated() {
    let (service, _) = build_service();
    let metrics = NeighborhoodMetrics {
        crime_rate: Some(-3.0),
        ..NeighborhoodMetrics::default()
    };

    match service.estimate(&subject(), Some(comparables()), Some(metrics)) {
        Err(AnalysisServiceError::Pricing(PricingError::InvalidNumericInput { field, .. })) => {
            assert_eq!(field, "crime_rate");
        }
        other => panic!("expected invalid input, got {other:?}"),
    }
}

#[test]
fn submit_stores_record_with_narrative() {
    let (service, repository) = build_service();
    let writer = SummaryWriter::new(Arc::new(ManualClock::new(analysis_time())));
    let service = service.with_narrator(Arc::new(writer));

    let mut request = AnalysisRequest::for_subject(subject());
    request.comparables = Some(comparables());
    let record = service.submit(request).expect("submission succeeds");

    assert!(record.analysis_id.0.starts_with("analysis-"));
    assert_eq!(record.created_at, analysis_time());
    let narrative = record.narrative.as_ref().expect("narrative attached");
    assert!(narrative.text.contains("100 Main St"));
    assert!(narrative.text.contains("falls within the suggested range"));

    let stored = repository
        .fetch(&record.analysis_id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored, record);

    let view = record.summary_view();
    assert_eq!(view.suggested_rent, 2000);
    assert_eq!(view.comparables_used, 2);
}

#[test]
fn submit_skips_narrative_when_not_requested() {
    let (service, _) = build_service();
    let service = service.with_narrator(Arc::new(FailingNarrator));

    let mut request = AnalysisRequest::for_subject(subject());
    request.include_narrative = false;
    let record = service.submit(request).expect("submission succeeds");

    assert!(record.narrative.is_none());
}

#[test]
fn submit_propagates_narrative_failures() {
    let (service, repository) = build_service();
    let service = service.with_narrator(Arc::new(FailingNarrator));

    match service.submit(AnalysisRequest::for_subject(subject())) {
        Err(AnalysisServiceError::Narrative(NarrativeError::Unavailable(_))) => {}
        other => panic!("expected narrative failure, got {other:?}"),
    }
    assert!(repository.recent(10).expect("recent").is_empty());
}

#[test]
fn submit_propagates_repository_failures() {
    let service =
        RentAnalysisService::new(Arc::new(UnavailableRepository), Arc::new(FixedComparables));

    match service.submit(AnalysisRequest::for_subject(subject())) {
        Err(AnalysisServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository failure, got {other:?}"),
    }
}

#[test]
fn get_propagates_not_found() {
    let (service, _) = build_service();

    match service.get(&AnalysisId("missing".to_string())) {
        Err(AnalysisServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found error, got {other:?}"),
    }
}

#[test]
fn recent_lists_newest_first() {
    let (service, _) = build_service();
    let first = service
        .submit(AnalysisRequest::for_subject(subject()))
        .expect("first");
    let second = service
        .submit(AnalysisRequest::for_subject(subject()))
        .expect("second");

    let recent = service.recent(1).expect("recent");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].analysis_id, second.analysis_id);
    assert_ne!(first.analysis_id, second.analysis_id);
}

#[test]
fn rent_increase_check_computes_numbers_and_commentary() {
    let (service, repository) = build_service();
    let writer = SummaryWriter::new(Arc::new(ManualClock::new(analysis_time())));
    let service = service.with_narrator(Arc::new(writer));

    let mut request = ComplianceRequest::new("CA", "Los Angeles", 2400.0, 2592.0);
    request.tenancy_start = chrono::NaiveDate::from_ymd_opt(2021, 3, 15);
    let review = service.check_rent_increase(&request).expect("review");

    assert_eq!(review.location, "Los Angeles, CA");
    assert_eq!(review.increase.amount, 192.0);
    assert_eq!(review.increase.percentage, 8.0);
    let commentary = review.commentary.expect("commentary attached");
    assert!(commentary.text.contains("rises by $192.00 (8.00%)"));
    assert!(commentary.text.contains("2021-03-15"));
    assert_eq!(commentary.generated_at, analysis_time());
    assert!(repository.recent(10).expect("recent").is_empty());
}

#[test]
fn rent_increase_check_works_without_narrator() {
    let (service, _) = build_service();

    let review = service
        .check_rent_increase(&ComplianceRequest::new("TX", "Austin", 1800.0, 1710.0))
        .expect("review");
    assert_eq!(review.increase.percentage, -5.0);
    assert!(review.commentary.is_none());
}

#[test]
fn rent_increase_check_rejects_bad_input() {
    let (service, _) = build_service();

    match service.check_rent_increase(&ComplianceRequest::new("OR", "Portland", 0.0, 1500.0)) {
        Err(AnalysisServiceError::Pricing(PricingError::InvalidNumericInput { field, .. })) => {
            assert_eq!(field, "current_rent");
        }
        other => panic!("expected invalid input, got {other:?}"),
    }
    match service.check_rent_increase(&ComplianceRequest::new("OR", " ", 1400.0, 1500.0)) {
        Err(AnalysisServiceError::MissingField(field)) => assert_eq!(field, "city"),
        other => panic!("expected missing city, got {other:?}"),
    }
}

#[test]
fn listing_description_uses_the_narrator() {
    let (service, _) = build_service();
    let service = service.with_narrator(Arc::new(SummaryWriter::default()));

    let mut request = ListingRequest::new(PropertyType::Townhouse, 3, 2.5);
    request.square_feet = Some(1650);
    request.amenities = [Amenity::Garage, Amenity::Patio].into_iter().collect();
    let description = service.describe_listing(&request).expect("description");

    assert_eq!(
        description.text,
        "3 bed, 2.5 bath Townhouse with 1650 square feet. Features include Garage, Patio."
    );
    assert!(description.usage.prompt_tokens > 0);
}

#[test]
fn listing_description_needs_a_narrator() {
    let (service, _) = build_service();

    match service.describe_listing(&ListingRequest::new(PropertyType::Condo, 1, 1.0)) {
        Err(AnalysisServiceError::Narrative(NarrativeError::Unavailable(_))) => {}
        other => panic!("expected unavailable narrator, got {other:?}"),
    }
}

#[test]
fn listing_description_rejects_negative_baths() {
    let (service, _) = build_service();
    let service = service.with_narrator(Arc::new(SummaryWriter::default()));

    match service.describe_listing(&ListingRequest::new(PropertyType::Condo, 1, -1.0)) {
        Err(AnalysisServiceError::Pricing(PricingError::InvalidNumericInput { field, .. })) => {
            assert_eq!(field, "baths");
        }
        other => panic!("expected invalid input, got {other:?}"),
    }
}
