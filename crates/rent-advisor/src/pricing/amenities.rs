use serde::{Deserialize, Serialize};

/// Amenity tags recognised by the adjustment table.
///
/// Tags that do not match a known amenity are preserved as [`Amenity::Unknown`]
/// so they can be reported back instead of silently priced at zero.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Amenity {
    // Interior
    CentralAc,
    InUnitWasherDryer,
    Dishwasher,
    HardwoodFloors,
    UpdatedKitchen,
    UpdatedBathroom,
    WalkInCloset,
    Fireplace,
    // Exterior
    Parking,
    Garage,
    Pool,
    Gym,
    Elevator,
    Storage,
    Balcony,
    Patio,
    Yard,
    // Security
    GatedCommunity,
    SecuritySystem,
    Doorman,
    // Utilities
    WaterIncluded,
    HeatIncluded,
    ElectricIncluded,
    GasIncluded,
    InternetIncluded,
    CableTvIncluded,
    // Community
    PackageService,
    PetFriendly,
    DogPark,
    Playground,
    BbqArea,
    CommunityRoom,
    BusinessCenter,
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmenityGroup {
    Interior,
    Exterior,
    Security,
    Utilities,
    Community,
}

const KNOWN: [Amenity; 33] = [
    Amenity::CentralAc,
    Amenity::InUnitWasherDryer,
    Amenity::Dishwasher,
    Amenity::HardwoodFloors,
    Amenity::UpdatedKitchen,
    Amenity::UpdatedBathroom,
    Amenity::WalkInCloset,
    Amenity::Fireplace,
    Amenity::Parking,
    Amenity::Garage,
    Amenity::Pool,
    Amenity::Gym,
    Amenity::Elevator,
    Amenity::Storage,
    Amenity::Balcony,
    Amenity::Patio,
    Amenity::Yard,
    Amenity::GatedCommunity,
    Amenity::SecuritySystem,
    Amenity::Doorman,
    Amenity::WaterIncluded,
    Amenity::HeatIncluded,
    Amenity::ElectricIncluded,
    Amenity::GasIncluded,
    Amenity::InternetIncluded,
    Amenity::CableTvIncluded,
    Amenity::PackageService,
    Amenity::PetFriendly,
    Amenity::DogPark,
    Amenity::Playground,
    Amenity::BbqArea,
    Amenity::CommunityRoom,
    Amenity::BusinessCenter,
];

impl Amenity {
    pub fn known() -> &'static [Amenity] {
        &KNOWN
    }

    /// Monthly rent effect in cents of having this amenity when the other
    /// property does not. Unknown tags carry no value.
    pub const fn adjustment_cents(&self) -> i64 {
        match self {
            Self::CentralAc => 5_000,
            Self::InUnitWasherDryer => 7_500,
            Self::Dishwasher => 2_500,
            Self::HardwoodFloors => 3_000,
            Self::UpdatedKitchen => 5_000,
            Self::UpdatedBathroom => 4_000,
            Self::WalkInCloset => 2_500,
            Self::Fireplace => 3_000,
            Self::Parking => 5_000,
            Self::Garage => 10_000,
            Self::Pool => 7_500,
            Self::Gym => 5_000,
            Self::Elevator => 4_000,
            Self::Storage => 2_500,
            Self::Balcony => 3_500,
            Self::Patio => 3_500,
            Self::Yard => 5_000,
            Self::GatedCommunity => 4_000,
            Self::SecuritySystem => 3_000,
            Self::Doorman => 7_500,
            Self::WaterIncluded => 4_000,
            Self::HeatIncluded => 6_000,
            Self::ElectricIncluded => 5_000,
            Self::GasIncluded => 4_000,
            Self::InternetIncluded => 4_500,
            Self::CableTvIncluded => 3_500,
            Self::PackageService => 2_000,
            Self::PetFriendly => 3_500,
            Self::DogPark => 2_500,
            Self::Playground => 2_000,
            Self::BbqArea => 1_500,
            Self::CommunityRoom => 2_000,
            Self::BusinessCenter => 2_500,
            Self::Unknown(_) => 0,
        }
    }

    pub fn group(&self) -> Option<AmenityGroup> {
        let group = match self {
            Self::CentralAc
            | Self::InUnitWasherDryer
            | Self::Dishwasher
            | Self::HardwoodFloors
            | Self::UpdatedKitchen
            | Self::UpdatedBathroom
            | Self::WalkInCloset
            | Self::Fireplace => AmenityGroup::Interior,
            Self::Parking
            | Self::Garage
            | Self::Pool
            | Self::Gym
            | Self::Elevator
            | Self::Storage
            | Self::Balcony
            | Self::Patio
            | Self::Yard => AmenityGroup::Exterior,
            Self::GatedCommunity | Self::SecuritySystem | Self::Doorman => AmenityGroup::Security,
            Self::WaterIncluded
            | Self::HeatIncluded
            | Self::ElectricIncluded
            | Self::GasIncluded
            | Self::InternetIncluded
            | Self::CableTvIncluded => AmenityGroup::Utilities,
            Self::PackageService
            | Self::PetFriendly
            | Self::DogPark
            | Self::Playground
            | Self::BbqArea
            | Self::CommunityRoom
            | Self::BusinessCenter => AmenityGroup::Community,
            Self::Unknown(_) => return None,
        };
        Some(group)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::CentralAc => "Central AC",
            Self::InUnitWasherDryer => "In-Unit Washer/Dryer",
            Self::Dishwasher => "Dishwasher",
            Self::HardwoodFloors => "Hardwood Floors",
            Self::UpdatedKitchen => "Updated Kitchen",
            Self::UpdatedBathroom => "Updated Bathroom",
            Self::WalkInCloset => "Walk-in Closet",
            Self::Fireplace => "Fireplace",
            Self::Parking => "Parking",
            Self::Garage => "Garage",
            Self::Pool => "Pool",
            Self::Gym => "Gym",
            Self::Elevator => "Elevator",
            Self::Storage => "Storage",
            Self::Balcony => "Balcony",
            Self::Patio => "Patio",
            Self::Yard => "Yard",
            Self::GatedCommunity => "Gated Community",
            Self::SecuritySystem => "Security System",
            Self::Doorman => "Doorman",
            Self::WaterIncluded => "Water Included",
            Self::HeatIncluded => "Heat Included",
            Self::ElectricIncluded => "Electric Included",
            Self::GasIncluded => "Gas Included",
            Self::InternetIncluded => "Internet Included",
            Self::CableTvIncluded => "Cable TV Included",
            Self::PackageService => "Package Service",
            Self::PetFriendly => "Pet Friendly",
            Self::DogPark => "Dog Park",
            Self::Playground => "Playground",
            Self::BbqArea => "BBQ Area",
            Self::CommunityRoom => "Community Room",
            Self::BusinessCenter => "Business Center",
            Self::Unknown(raw) => raw.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }

    /// Matches labels loosely: case, punctuation and spacing are ignored, and
    /// a few common alternate spellings are accepted.
    pub fn parse(raw: &str) -> Self {
        let key = normalize(raw);
        let alias = match key.as_str() {
            "ac" | "airconditioning" | "centralair" => Some(Self::CentralAc),
            "washerdryer" | "inunitlaundry" | "washerdryerinunit" => {
                Some(Self::InUnitWasherDryer)
            }
            "fitnesscenter" => Some(Self::Gym),
            "bbq" | "grill" => Some(Self::BbqArea),
            _ => None,
        };
        if let Some(amenity) = alias {
            return amenity;
        }

        KNOWN
            .iter()
            .find(|amenity| normalize(amenity.label()) == key)
            .cloned()
            .unwrap_or_else(|| Self::Unknown(raw.trim().to_string()))
    }
}

fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl From<String> for Amenity {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for Amenity {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Amenity> for String {
    fn from(value: Amenity) -> Self {
        match value {
            Amenity::Unknown(raw) => raw,
            known => known.label().to_string(),
        }
    }
}
