use std::collections::BTreeMap;
use std::sync::Arc;

use crate::neighborhood::{Clock, SystemClock};

use super::{
    GeneratedText, NarrativeError, PromptKind, PromptRequest, TextGenerator, TokenUsage,
};

/// Offline generator that writes short plain-language text straight from the
/// prompt facts, shaped by the prompt kind. Token counts are whitespace word
/// counts.
#[derive(Clone)]
pub struct SummaryWriter {
    clock: Arc<dyn Clock>,
}

impl SummaryWriter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for SummaryWriter {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for SummaryWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryWriter").finish_non_exhaustive()
    }
}

impl TextGenerator for SummaryWriter {
    fn generate(&self, request: &PromptRequest) -> Result<GeneratedText, NarrativeError> {
        let text = match request.kind {
            PromptKind::Analysis => analysis_summary(&request.facts)?,
            PromptKind::Compliance => compliance_summary(&request.facts)?,
            PromptKind::Listing => listing_copy(&request.facts)?,
        };

        let prompt_tokens =
            word_count(&request.system).saturating_add(word_count(&request.prompt));
        let completion_tokens = word_count(&text).min(request.max_tokens);

        Ok(GeneratedText {
            text,
            usage: TokenUsage::new(prompt_tokens, completion_tokens),
            generated_at: self.clock.now(),
        })
    }
}

fn fact<'a>(facts: &'a BTreeMap<String, String>, key: &str) -> Result<&'a str, NarrativeError> {
    facts
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| NarrativeError::MissingFact(key.to_string()))
}

/// Optional fact, skipped when the prompt filled it with a placeholder phrase.
fn specified<'a>(facts: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    facts
        .get(key)
        .map(String::as_str)
        .filter(|value| !matches!(*value, "not specified" | "not available" | "none listed"))
}

fn analysis_summary(facts: &BTreeMap<String, String>) -> Result<String, NarrativeError> {
    let mut text = format!(
        "{} should list between ${} and ${} per month, with ${} as the suggested rent \
         ({}% confidence from {} comparables).",
        fact(facts, "address")?,
        fact(facts, "rent_low")?,
        fact(facts, "rent_high")?,
        fact(facts, "estimated_rent")?,
        fact(facts, "confidence")?,
        fact(facts, "comparables_used")?,
    );

    if let Some(score) = specified(facts, "neighborhood_score") {
        text.push_str(&format!(" The neighborhood scores {score}."));
    }

    if let Some(sentence) = requested_rent_sentence(facts) {
        text.push(' ');
        text.push_str(&sentence);
    }
    Ok(text)
}

fn compliance_summary(facts: &BTreeMap<String, String>) -> Result<String, NarrativeError> {
    let location = fact(facts, "location")?;
    let current = fact(facts, "current_rent")?;
    let proposed = fact(facts, "proposed_rent")?;
    let amount = fact(facts, "increase_amount")?;
    let percentage = fact(facts, "increase_percentage")?;

    let mut text = match amount.strip_prefix('-') {
        Some(decrease) => format!(
            "Rent in {location} drops by ${decrease} ({}%) from ${current} to ${proposed}.",
            percentage.trim_start_matches('-'),
        ),
        None => format!(
            "Rent in {location} rises by ${amount} ({percentage}%) from ${current} to ${proposed}."
        ),
    };
    if let Some(start) = specified(facts, "tenancy_start") {
        text.push_str(&format!(" The tenancy began on {start}."));
    }
    text.push_str(&format!(
        " Local rent control limits were not checked; confirm the allowed increase and \
         notice period for {location} before serving notice."
    ));
    Ok(text)
}

fn listing_copy(facts: &BTreeMap<String, String>) -> Result<String, NarrativeError> {
    let mut text = format!(
        "{} bed, {} bath {}",
        fact(facts, "beds")?,
        fact(facts, "baths")?,
        fact(facts, "property_type")?,
    );
    if let Some(sqft) = specified(facts, "square_feet") {
        text.push_str(&format!(" with {sqft} square feet"));
    }
    if let Some(location) = specified(facts, "location") {
        text.push_str(&format!(" in {location}"));
    }
    text.push('.');
    if let Some(amenities) = specified(facts, "amenities") {
        text.push_str(&format!(" Features include {amenities}."));
    }
    if let Some(nearby) = specified(facts, "nearby_attractions") {
        text.push_str(&format!(" Close to {nearby}."));
    }
    Ok(text)
}

fn requested_rent_sentence(facts: &BTreeMap<String, String>) -> Option<String> {
    let requested = dollars(facts.get("requested_rent")?)?;
    let low = dollars(facts.get("rent_low")?)?;
    let high = dollars(facts.get("rent_high")?)?;

    let position = if requested < low {
        "is below the suggested range"
    } else if requested > high {
        "is above the suggested range"
    } else {
        "falls within the suggested range"
    };
    Some(format!("The requested rent of ${requested:.0} {position}."))
}

fn dollars(raw: &str) -> Option<f64> {
    raw.trim().trim_start_matches('$').parse().ok()
}

fn word_count(text: &str) -> u32 {
    u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX)
}
