use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::io::Read;

use crate::pricing::{Amenity, ComparableProperty, PropertyFeatures, PropertyType, QualityTier};

use super::ComparableSourceError;

/// Listing row plus the ZIP it was filed under, when the export carries one.
#[derive(Debug, Clone)]
pub(crate) struct ListingRecord {
    pub(crate) comparable: ComparableProperty,
    pub(crate) zip_code: Option<String>,
}

pub(crate) fn parse_listings<R: Read>(reader: R) -> Result<Vec<ListingRecord>, ComparableSourceError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, row) in csv_reader.deserialize::<ListingRow>().enumerate() {
        let row = row?;
        // Header is line 1.
        let line = index + 2;
        records.push(row.into_record(line)?);
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct ListingRow {
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "Property Type")]
    property_type: String,
    #[serde(rename = "Rent")]
    rent: f64,
    #[serde(rename = "Beds", default, deserialize_with = "empty_string_as_none")]
    beds: Option<String>,
    #[serde(rename = "Full Baths", default, deserialize_with = "empty_string_as_none")]
    full_baths: Option<String>,
    #[serde(rename = "Half Baths", default, deserialize_with = "empty_string_as_none")]
    half_baths: Option<String>,
    #[serde(rename = "Square Feet", default, deserialize_with = "empty_string_as_none")]
    square_feet: Option<String>,
    #[serde(rename = "Year Built", default, deserialize_with = "empty_string_as_none")]
    year_built: Option<String>,
    #[serde(rename = "Quality", default, deserialize_with = "empty_string_as_none")]
    quality: Option<String>,
    #[serde(rename = "Amenities", default, deserialize_with = "empty_string_as_none")]
    amenities: Option<String>,
    #[serde(rename = "Distance", default, deserialize_with = "empty_string_as_none")]
    distance: Option<String>,
    #[serde(rename = "Location Score", default, deserialize_with = "empty_string_as_none")]
    location_score: Option<String>,
    #[serde(rename = "Zip", default, deserialize_with = "empty_string_as_none")]
    zip_code: Option<String>,
}

impl ListingRow {
    fn into_record(self, line: usize) -> Result<ListingRecord, ComparableSourceError> {
        let property_type = PropertyType::parse(&self.property_type).ok_or_else(|| {
            ComparableSourceError::InvalidRow {
                line,
                reason: format!("unknown property type '{}'", self.property_type),
            }
        })?;

        let mut features = PropertyFeatures::new(self.address, property_type);
        features.beds = parse_field(self.beds.as_deref(), "Beds", line)?;
        features.full_baths = parse_field(self.full_baths.as_deref(), "Full Baths", line)?;
        features.half_baths = parse_field(self.half_baths.as_deref(), "Half Baths", line)?;
        features.square_feet = parse_field(self.square_feet.as_deref(), "Square Feet", line)?;
        features.year_built = parse_field(self.year_built.as_deref(), "Year Built", line)?;
        features.location_score =
            parse_field(self.location_score.as_deref(), "Location Score", line)?;
        features.quality = self
            .quality
            .as_deref()
            .map(QualityTier::parse)
            .unwrap_or_default();
        features.amenities = self
            .amenities
            .as_deref()
            .map(split_amenities)
            .unwrap_or_default();

        if !self.rent.is_finite() || self.rent <= 0.0 {
            return Err(ComparableSourceError::InvalidRow {
                line,
                reason: format!("Rent must be positive, got {}", self.rent),
            });
        }
        let distance: f64 = parse_field(self.distance.as_deref(), "Distance", line)?.unwrap_or(0.0);
        if !distance.is_finite() || distance < 0.0 {
            return Err(ComparableSourceError::InvalidRow {
                line,
                reason: format!("Distance must not be negative, got {distance}"),
            });
        }

        Ok(ListingRecord {
            comparable: ComparableProperty {
                features,
                rent: self.rent,
                distance,
            },
            zip_code: self.zip_code,
        })
    }
}

fn split_amenities(raw: &str) -> BTreeSet<Amenity> {
    raw.split(';')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(Amenity::parse)
        .collect()
}

fn parse_field<T: std::str::FromStr>(
    value: Option<&str>,
    column: &str,
    line: usize,
) -> Result<Option<T>, ComparableSourceError> {
    value
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| ComparableSourceError::InvalidRow {
                    line,
                    reason: format!("{column} '{raw}' is not a number"),
                })
        })
        .transpose()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
