//! Free-text analysis around a priced property.
//!
//! The pricing core never depends on generated text. A [`TextGenerator`] gets a
//! filled prompt plus the facts it was filled from, and returns text with
//! token usage.

mod prompt;
mod requests;
mod writer;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use prompt::{
    analysis_prompt, compliance_prompt, fill_template, listing_prompt, ANALYSIS_SYSTEM_PROMPT,
    ANALYSIS_TEMPLATE, COMPLIANCE_SYSTEM_PROMPT, COMPLIANCE_TEMPLATE, LISTING_SYSTEM_PROMPT,
    LISTING_TEMPLATE,
};
pub use requests::{ComplianceRequest, ListingRequest};
pub use writer::SummaryWriter;

/// Which template a prompt was filled from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    #[default]
    Analysis,
    Compliance,
    Listing,
}

/// A filled prompt ready for a generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub kind: PromptKind,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Placeholder values the prompt was filled from.
    #[serde(default)]
    pub facts: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedText {
    pub text: String,
    pub usage: TokenUsage,
    pub generated_at: DateTime<Utc>,
}

pub trait TextGenerator: Send + Sync {
    fn generate(&self, request: &PromptRequest) -> Result<GeneratedText, NarrativeError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum NarrativeError {
    #[error("prompt is missing value for '{0}'")]
    MissingFact(String),
    #[error("text generator unavailable: {0}")]
    Unavailable(String),
}
