use std::collections::BTreeMap;

use crate::neighborhood::NeighborhoodScore;
use crate::pricing::{ComparableAnalysis, RentIncrease, RentRange, SubjectProperty};

use super::{ComplianceRequest, ListingRequest, NarrativeError, PromptKind, PromptRequest};

pub const ANALYSIS_SYSTEM_PROMPT: &str =
    "You are a real estate analysis expert with deep knowledge of rental markets.";

pub const ANALYSIS_TEMPLATE: &str = "\
Analyze the rental pricing for {address}, a {property_type} with {beds} bedrooms, \
{baths} bathrooms and {square_feet} square feet.
Comparable analysis estimates ${estimated_rent} per month from {comparables_used} comparables \
(range ${rent_low} to ${rent_high}, confidence {confidence}%).
Neighborhood score: {neighborhood_score}. Requested rent: {requested_rent}.
Explain the main pricing drivers and recommend a listing price.";

pub const COMPLIANCE_SYSTEM_PROMPT: &str =
    "You are a legal expert in rental law and tenant rights. Assess rent increases against \
     local regulations and say plainly when a rule cannot be confirmed.";

pub const COMPLIANCE_TEMPLATE: &str = "\
Review this rent increase against local rent control rules.
Location: {location}
Current rent: ${current_rent}. Proposed rent: ${proposed_rent}.
Increase: ${increase_amount} ({increase_percentage}%). Tenancy start: {tenancy_start}.
State whether it complies, the largest allowed increase, the rules that apply, \
and what the landlord should do to stay compliant.";

pub const LISTING_SYSTEM_PROMPT: &str =
    "You are a professional real estate copywriter. Write engaging, accurate listing copy \
     that leads with a property's strongest features.";

pub const LISTING_TEMPLATE: &str = "\
Write a listing title and description for a {property_type} with {beds} bedrooms, \
{baths} bathrooms and {square_feet} square feet.
Location: {location}. Amenities: {amenities}. Nearby: {nearby_attractions}.";

const ANALYSIS_TEMPERATURE: f32 = 0.5;
const ANALYSIS_MAX_TOKENS: u32 = 1000;
const COMPLIANCE_TEMPERATURE: f32 = 0.2;
const COMPLIANCE_MAX_TOKENS: u32 = 800;
const LISTING_TEMPERATURE: f32 = 0.8;
const LISTING_MAX_TOKENS: u32 = 600;

const NOT_SPECIFIED: &str = "not specified";

/// Replaces every `{key}` with its value. An unfilled placeholder is an error.
pub fn fill_template(
    template: &str,
    facts: &BTreeMap<String, String>,
) -> Result<String, NarrativeError> {
    let mut filled = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        filled.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_placeholder(&after[..close]) => {
                let key = &after[..close];
                let value = facts
                    .get(key)
                    .ok_or_else(|| NarrativeError::MissingFact(key.to_string()))?;
                filled.push_str(value);
                rest = &after[close + 1..];
            }
            _ => {
                filled.push('{');
                rest = after;
            }
        }
    }
    filled.push_str(rest);

    Ok(filled)
}

fn is_placeholder(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Builds the rent analysis prompt from a finished estimate.
pub fn analysis_prompt(
    subject: &SubjectProperty,
    analysis: &ComparableAnalysis,
    range: &RentRange,
    neighborhood: Option<&NeighborhoodScore>,
) -> Result<PromptRequest, NarrativeError> {
    let features = &subject.features;
    let unknown = || "unknown".to_string();

    let baths = features.full_baths.map(|full| {
        let total = full + features.half_baths.unwrap_or(0.0) * 0.5;
        format!("{total:.1}")
    });

    let mut facts = BTreeMap::new();
    facts.insert("address".to_string(), features.address.clone());
    facts.insert(
        "property_type".to_string(),
        features.property_type.label().to_string(),
    );
    facts.insert(
        "beds".to_string(),
        features.beds.map(|beds| beds.to_string()).unwrap_or_else(unknown),
    );
    facts.insert("baths".to_string(), baths.unwrap_or_else(unknown));
    facts.insert(
        "square_feet".to_string(),
        features
            .square_feet
            .map(|sqft| sqft.to_string())
            .unwrap_or_else(unknown),
    );
    facts.insert("estimated_rent".to_string(), range.median.to_string());
    facts.insert("rent_low".to_string(), range.low.to_string());
    facts.insert("rent_high".to_string(), range.high.to_string());
    facts.insert("confidence".to_string(), range.confidence.to_string());
    facts.insert(
        "comparables_used".to_string(),
        analysis.comparables_used.to_string(),
    );
    facts.insert(
        "neighborhood_score".to_string(),
        neighborhood
            .map(|score| format!("{:.1}/10", score.score))
            .unwrap_or_else(|| "not available".to_string()),
    );
    facts.insert(
        "requested_rent".to_string(),
        subject
            .requested_rent
            .map(|rent| format!("${rent:.0}"))
            .unwrap_or_else(|| "none".to_string()),
    );

    let prompt = fill_template(ANALYSIS_TEMPLATE, &facts)?;
    Ok(PromptRequest {
        kind: PromptKind::Analysis,
        system: ANALYSIS_SYSTEM_PROMPT.to_string(),
        prompt,
        temperature: ANALYSIS_TEMPERATURE,
        max_tokens: ANALYSIS_MAX_TOKENS,
        facts,
    })
}

/// Builds the compliance prompt for an already computed increase.
pub fn compliance_prompt(
    request: &ComplianceRequest,
    increase: &RentIncrease,
) -> Result<PromptRequest, NarrativeError> {
    let mut facts = BTreeMap::new();
    facts.insert("location".to_string(), request.location());
    facts.insert(
        "current_rent".to_string(),
        format!("{:.2}", increase.current_rent),
    );
    facts.insert(
        "proposed_rent".to_string(),
        format!("{:.2}", increase.proposed_rent),
    );
    facts.insert(
        "increase_amount".to_string(),
        format!("{:.2}", increase.amount),
    );
    facts.insert(
        "increase_percentage".to_string(),
        format!("{:.2}", increase.percentage),
    );
    facts.insert(
        "tenancy_start".to_string(),
        request
            .tenancy_start
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
    );

    let prompt = fill_template(COMPLIANCE_TEMPLATE, &facts)?;
    Ok(PromptRequest {
        kind: PromptKind::Compliance,
        system: COMPLIANCE_SYSTEM_PROMPT.to_string(),
        prompt,
        temperature: COMPLIANCE_TEMPERATURE,
        max_tokens: COMPLIANCE_MAX_TOKENS,
        facts,
    })
}

pub fn listing_prompt(request: &ListingRequest) -> Result<PromptRequest, NarrativeError> {
    let or_unspecified = |value: Option<&str>| {
        value
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(NOT_SPECIFIED)
            .to_string()
    };

    let mut facts = BTreeMap::new();
    facts.insert(
        "property_type".to_string(),
        request.property_type.label().to_string(),
    );
    facts.insert("beds".to_string(), request.beds.to_string());
    facts.insert("baths".to_string(), format!("{:.1}", request.baths));
    facts.insert(
        "square_feet".to_string(),
        request
            .square_feet
            .map(|sqft| sqft.to_string())
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
    );
    facts.insert(
        "location".to_string(),
        or_unspecified(request.location.as_deref()),
    );
    let amenities: Vec<&str> = request.amenities.iter().map(|amenity| amenity.label()).collect();
    facts.insert(
        "amenities".to_string(),
        if amenities.is_empty() {
            "none listed".to_string()
        } else {
            amenities.join(", ")
        },
    );
    facts.insert(
        "nearby_attractions".to_string(),
        or_unspecified(request.nearby_attractions.as_deref()),
    );

    let prompt = fill_template(LISTING_TEMPLATE, &facts)?;
    Ok(PromptRequest {
        kind: PromptKind::Listing,
        system: LISTING_SYSTEM_PROMPT.to_string(),
        prompt,
        temperature: LISTING_TEMPERATURE,
        max_tokens: LISTING_MAX_TOKENS,
        facts,
    })
}
