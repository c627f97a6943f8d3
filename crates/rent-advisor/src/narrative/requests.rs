use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::pricing::{Amenity, PropertyType};

/// A landlord's proposed rent change for an existing tenancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRequest {
    pub state: String,
    pub city: String,
    pub current_rent: f64,
    pub proposed_rent: f64,
    #[serde(default)]
    pub tenancy_start: Option<NaiveDate>,
    #[serde(default = "default_include_commentary")]
    pub include_commentary: bool,
}

fn default_include_commentary() -> bool {
    true
}

impl ComplianceRequest {
    pub fn new(
        state: impl Into<String>,
        city: impl Into<String>,
        current_rent: f64,
        proposed_rent: f64,
    ) -> Self {
        Self {
            state: state.into(),
            city: city.into(),
            current_rent,
            proposed_rent,
            tenancy_start: None,
            include_commentary: default_include_commentary(),
        }
    }

    /// "City, ST" as shown to the reader.
    pub fn location(&self) -> String {
        format!("{}, {}", self.city.trim(), self.state.trim())
    }

    /// First blank location field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.state.trim().is_empty() {
            Some("state")
        } else if self.city.trim().is_empty() {
            Some("city")
        } else {
            None
        }
    }
}

/// Facts a marketing description is written from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRequest {
    pub property_type: PropertyType,
    pub beds: u32,
    pub baths: f64,
    #[serde(default)]
    pub square_feet: Option<u32>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub amenities: BTreeSet<Amenity>,
    #[serde(default)]
    pub nearby_attractions: Option<String>,
}

impl ListingRequest {
    pub fn new(property_type: PropertyType, beds: u32, baths: f64) -> Self {
        Self {
            property_type,
            beds,
            baths,
            square_feet: None,
            location: None,
            amenities: BTreeSet::new(),
            nearby_attractions: None,
        }
    }
}
