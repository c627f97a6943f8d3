use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::response::IntoResponse;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::analyses::domain::AnalysisRequest;
use crate::analyses::router::submit_handler;
use crate::analyses::RentAnalysisService;
use crate::narrative::SummaryWriter;

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn estimate_body() -> Value {
    json!({
        "subject": subject(),
        "comparables": comparables(),
    })
}

#[tokio::test]
async fn estimate_route_returns_range_and_audit_trail() {
    let (service, _) = build_service();
    let router = analysis_router_with_service(service);

    let response = router
        .oneshot(post_json("/api/v1/rent/estimate", &estimate_body()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["range"]["median"], json!(2000));
    assert_eq!(payload["analysis"]["comparables_used"], json!(2));
    let adjustments = payload["analysis"]["per_comparable"][0]["adjustments"]
        .as_array()
        .expect("adjustments listed");
    assert!(!adjustments.is_empty());
}

#[tokio::test]
async fn estimate_route_returns_unprocessable_without_comparables() {
    let (service, _) = build_service();
    let router = analysis_router_with_service(service);

    let body = json!({ "subject": subject(), "comparables": [] });
    let response = router
        .oneshot(post_json("/api/v1/rent/estimate", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("no usable comparable data"));
}

#[tokio::test]
async fn estimate_route_rejects_negative_rent() {
    let (service, _) = build_service();
    let router = analysis_router_with_service(service);

    let mut body = estimate_body();
    body["comparables"][0]["rent"] = json!(-100.0);
    let response = router
        .oneshot(post_json("/api/v1/rent/estimate", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn range_route_formats_estimate() {
    let (service, _) = build_service();
    let router = analysis_router_with_service(service);

    let body = json!({
        "estimated_rent": 1000.0,
        "confidence": {
            "has_comparables": true,
            "has_crime_data": false,
            "has_walk_score": true,
            "has_school_data": true,
            "amenity_count": 7
        }
    });
    let response = router
        .oneshot(post_json("/api/v1/rent/range", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload,
        json!({ "low": 900, "median": 1000, "high": 1100, "confidence": 86 })
    );
}

#[tokio::test]
async fn neighborhood_route_scores_metrics() {
    let (service, _) = build_service();
    let router = analysis_router_with_service(service);

    let body = json!({ "school_rating": 8.0 });
    let response = router
        .oneshot(post_json("/api/v1/neighborhood/score", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert!(payload["score"].as_f64().is_some());
    assert!(payload["breakdown"]["crime"].is_null());
}

#[tokio::test]
async fn neighborhood_route_rejects_negative_metrics() {
    let (service, _) = build_service();
    let router = analysis_router_with_service(service);

    let body = json!({ "median_income": -1.0 });
    let response = router
        .oneshot(post_json("/api/v1/neighborhood/score", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submitted_analysis_can_be_fetched() {
    let (service, _) = build_service();
    let router = analysis_router_with_service(service);

    let response = router
        .clone()
        .oneshot(post_json("/api/v1/rent/analyses", &estimate_body()))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let summary = read_json_body(response).await;
    let analysis_id = summary["analysis_id"]
        .as_str()
        .expect("id returned")
        .to_string();
    assert_eq!(summary["suggested_rent"], json!(2000));

    let response = router
        .oneshot(
            Request::get(format!("/api/v1/rent/analyses/{analysis_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["analysis_id"], json!(analysis_id));
    assert_eq!(payload["subject"]["address"], json!("100 Main St"));
    assert_eq!(payload["created_at"], json!("2025-04-01T09:30:00Z"));
}

#[tokio::test]
async fn missing_analysis_returns_not_found() {
    let (service, _) = build_service();
    let router = analysis_router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/rent/analyses/analysis-missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submit_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(RentAnalysisService::new(
        Arc::new(UnavailableRepository),
        Arc::new(FixedComparables),
    ));

    let response = submit_handler::<UnavailableRepository>(
        State(service),
        axum::Json(AnalysisRequest::for_subject(subject())),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn compliance_route_returns_computed_increase() {
    let (service, _) = build_service();
    let router = analysis_router_with_service(service);

    let body = json!({
        "state": "WA",
        "city": "Seattle",
        "current_rent": 2000.0,
        "proposed_rent": 2150.0,
        "tenancy_start": "2023-01-01"
    });
    let response = router
        .oneshot(post_json("/api/v1/rent/compliance", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["location"], json!("Seattle, WA"));
    assert_eq!(payload["increase"]["amount"], json!(150.0));
    assert_eq!(payload["increase"]["percentage"], json!(7.5));
    assert_eq!(payload["tenancy_start"], json!("2023-01-01"));
    assert!(payload.get("commentary").is_none());
}

#[tokio::test]
async fn compliance_route_rejects_zero_rent() {
    let (service, _) = build_service();
    let router = analysis_router_with_service(service);

    let body = json!({
        "state": "WA",
        "city": "Seattle",
        "current_rent": 2000.0,
        "proposed_rent": 0.0
    });
    let response = router
        .oneshot(post_json("/api/v1/rent/compliance", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("proposed_rent"));
}

#[tokio::test]
async fn listing_route_writes_description() {
    let (service, _) = build_service();
    let router = analysis_router_with_service(
        service.with_narrator(Arc::new(SummaryWriter::new(Arc::new(
            crate::neighborhood::ManualClock::new(analysis_time()),
        )))),
    );

    let body = json!({
        "property_type": "Apartment",
        "beds": 1,
        "baths": 1.0,
        "location": "Sherman Hill",
        "amenities": ["Gym", "Elevator"]
    });
    let response = router
        .oneshot(post_json("/api/v1/listing/description", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["text"],
        json!("1 bed, 1.0 bath Apartment in Sherman Hill. Features include Gym, Elevator.")
    );
    assert_eq!(payload["generated_at"], json!("2025-04-01T09:30:00Z"));
}

#[tokio::test]
async fn listing_route_is_unavailable_without_narrator() {
    let (service, _) = build_service();
    let router = analysis_router_with_service(service);

    let body = json!({ "property_type": "Condo", "beds": 2, "baths": 1.0 });
    let response = router
        .oneshot(post_json("/api/v1/listing/description", &body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
