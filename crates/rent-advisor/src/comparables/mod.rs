//! Sources of comparable listings for the adjustment engine.

mod parser;

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::pricing::heuristic::round_to_ten;
use crate::pricing::baseline_rent;
use crate::pricing::{Amenity, ComparableProperty, PropertyFeatures, SubjectProperty};

use parser::ListingRecord;

/// Anything that can find nearby rentals for a subject property.
pub trait ComparableSource: Send + Sync {
    fn comparables(
        &self,
        subject: &SubjectProperty,
    ) -> Result<Vec<ComparableProperty>, ComparableSourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ComparableSourceError {
    #[error("failed to read listing export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid listing CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("listing row {line}: {reason}")]
    InvalidRow { line: usize, reason: String },
    #[error("subject is missing {0}, which is needed to look up comparables")]
    InsufficientSubject(&'static str),
    #[error("comparable source unavailable: {0}")]
    Unavailable(String),
}

/// Synthesises three nearby listings around the subject's baseline rent.
/// Stands in for a property-data API in demos and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockComparableSource;

impl ComparableSource for MockComparableSource {
    fn comparables(
        &self,
        subject: &SubjectProperty,
    ) -> Result<Vec<ComparableProperty>, ComparableSourceError> {
        let features = &subject.features;
        let beds = features
            .beds
            .ok_or(ComparableSourceError::InsufficientSubject("beds"))?;
        let full_baths = features
            .full_baths
            .ok_or(ComparableSourceError::InsufficientSubject("full_baths"))?;
        let half_baths = features.half_baths.unwrap_or(0.0);
        let square_feet = features
            .square_feet
            .ok_or(ComparableSourceError::InsufficientSubject("square_feet"))?;

        let baths = full_baths + half_baths * 0.5;
        let base_rent = baseline_rent(square_feet, beds, baths);
        let zip = subject.zip_code.as_deref().unwrap_or("");

        let listing = |address: &str| {
            let mut comp = PropertyFeatures::new(
                format!("{address}, {zip}").trim_end_matches([',', ' ']).to_string(),
                features.property_type,
            );
            comp.beds = Some(beds);
            comp.full_baths = Some(full_baths);
            comp.half_baths = Some(half_baths);
            comp.square_feet = Some(square_feet);
            comp.year_built = features.year_built;
            comp
        };

        let mut similar = listing("123 Nearby St");
        similar.square_feet = Some(square_feet.saturating_sub(50).max(1));
        similar.amenities = [Amenity::Parking, Amenity::Dishwasher].into_iter().collect();

        let mut larger = listing("456 Similar Ave");
        larger.square_feet = Some(square_feet.saturating_add(100));
        if baths < 2.0 {
            larger.half_baths = Some(half_baths + 1.0);
        }
        larger.amenities = [
            Amenity::Parking,
            Amenity::Dishwasher,
            Amenity::Pool,
            Amenity::Gym,
        ]
        .into_iter()
        .collect();

        let mut mixed = listing("789 Close Blvd");
        if beds < 3 {
            mixed.beds = Some(beds.saturating_add(1));
        }
        if baths > 1.0 && full_baths >= 1.0 {
            // Trade a full bath for a half bath.
            mixed.full_baths = Some(full_baths - 1.0);
            mixed.half_baths = Some(half_baths + 1.0);
        }
        mixed.square_feet = Some(square_feet.saturating_add(25));
        mixed.amenities = [
            Amenity::InUnitWasherDryer,
            Amenity::Balcony,
            Amenity::Parking,
        ]
        .into_iter()
        .collect();

        Ok(vec![
            ComparableProperty {
                features: similar,
                rent: round_to_ten(base_rent * 0.95),
                distance: 0.5,
            },
            ComparableProperty {
                features: larger,
                rent: round_to_ten(base_rent * 1.1),
                distance: 0.8,
            },
            ComparableProperty {
                features: mixed,
                rent: round_to_ten(base_rent * 1.02),
                distance: 1.2,
            },
        ])
    }
}

/// Comparables loaded from a listing CSV export.
///
/// Rows filed under a different ZIP than the subject are left out; rows
/// without a ZIP always match. Results are ordered nearest first.
#[derive(Debug, Clone)]
pub struct CsvComparableSource {
    listings: Vec<ListingRecord>,
    max_distance: Option<f64>,
}

impl CsvComparableSource {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ComparableSourceError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let source = Self::from_reader(file)?;
        info!(path = %path.display(), listings = source.len(), "loaded comparable listings");
        Ok(source)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ComparableSourceError> {
        Ok(Self {
            listings: parser::parse_listings(reader)?,
            max_distance: None,
        })
    }

    pub fn with_max_distance(mut self, miles: f64) -> Self {
        self.max_distance = Some(miles);
        self
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

impl ComparableSource for CsvComparableSource {
    fn comparables(
        &self,
        subject: &SubjectProperty,
    ) -> Result<Vec<ComparableProperty>, ComparableSourceError> {
        let subject_zip = subject.zip_code.as_deref().map(str::trim);

        let mut matches: Vec<ComparableProperty> = self
            .listings
            .iter()
            .filter(|record| match (subject_zip, record.zip_code.as_deref()) {
                (Some(subject_zip), Some(zip)) => subject_zip == zip,
                _ => true,
            })
            .filter(|record| {
                self.max_distance
                    .map(|limit| record.comparable.distance <= limit)
                    .unwrap_or(true)
            })
            .map(|record| record.comparable.clone())
            .collect();

        matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(matches)
    }
}
