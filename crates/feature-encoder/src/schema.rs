//! Schema Variant Descriptors
//!
//! Each trained price model was fit on its own column set and value
//! encodings. A `SchemaVariant` names exactly which columns, borough
//! spelling, amenity taxonomy and input bounds apply to one model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::EncodeError;

/// A model input column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    PropertyType,
    RoomType,
    Accommodates,
    Bedrooms,
    Bathrooms,
    Borough,
    CrimeRate,
    #[serde(rename = "distance_to_nearest_tube_station")]
    DistanceToStation,
    MinimumNights,
    #[serde(rename = "availability_365")]
    Availability365,
    DaysFromLastReview,
    FirstAmenity,
    SecondAmenity,
    ThirdAmenity,
}

impl Column {
    /// Column name as the model was trained on it
    pub fn name(&self) -> &'static str {
        match self {
            Column::PropertyType => "property_type",
            Column::RoomType => "room_type",
            Column::Accommodates => "accommodates",
            Column::Bedrooms => "bedrooms",
            Column::Bathrooms => "bathrooms",
            Column::Borough => "borough",
            Column::CrimeRate => "crime_rate",
            Column::DistanceToStation => "distance_to_nearest_tube_station",
            Column::MinimumNights => "minimum_nights",
            Column::Availability365 => "availability_365",
            Column::DaysFromLastReview => "days_from_last_review",
            Column::FirstAmenity => "first_amenity",
            Column::SecondAmenity => "second_amenity",
            Column::ThirdAmenity => "third_amenity",
        }
    }

    pub const ALL: [Column; 14] = [
        Column::PropertyType,
        Column::RoomType,
        Column::Accommodates,
        Column::Bedrooms,
        Column::Bathrooms,
        Column::Borough,
        Column::CrimeRate,
        Column::DistanceToStation,
        Column::MinimumNights,
        Column::Availability365,
        Column::DaysFromLastReview,
        Column::FirstAmenity,
        Column::SecondAmenity,
        Column::ThirdAmenity,
    ];

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Text-valued column; every other column encodes as a number
    pub fn is_categorical(&self) -> bool {
        matches!(
            self,
            Column::PropertyType
                | Column::RoomType
                | Column::Borough
                | Column::FirstAmenity
                | Column::SecondAmenity
                | Column::ThirdAmenity
        )
    }

    /// Index into the ordered amenity slots, if this is an amenity column
    pub fn amenity_slot(&self) -> Option<usize> {
        match self {
            Column::FirstAmenity => Some(0),
            Column::SecondAmenity => Some(1),
            Column::ThirdAmenity => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Category system used for the nearby-amenity slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmenityTaxonomy {
    /// 11 top-level venue categories
    VenueCategory,
    /// 17 finer-grained place types
    PlaceType,
}

impl AmenityTaxonomy {
    /// Selectable values, including "None"
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            AmenityTaxonomy::VenueCategory => VENUE_CATEGORIES,
            AmenityTaxonomy::PlaceType => PLACE_TYPES,
        }
    }
}

/// Inclusive bounds the input layer enforces for one variant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub bedrooms: (u32, u32),
    pub bathrooms: (u32, u32),
    pub accommodates: (u32, u32),
    pub distance_km: (f64, f64),
    pub minimum_nights: (u32, u32),
    pub availability_365: (u32, u32),
    pub days_from_last_review: (u32, u32),
}

/// Identifier of a schema variant, as it appears in configuration and
/// model artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaId {
    ShortTermFull,
    ShortTermCrime,
    ShortTermCompact,
    MidTerm,
}

impl SchemaId {
    pub const ALL: [SchemaId; 4] = [
        SchemaId::ShortTermFull,
        SchemaId::ShortTermCrime,
        SchemaId::ShortTermCompact,
        SchemaId::MidTerm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaId::ShortTermFull => "short-term-full",
            SchemaId::ShortTermCrime => "short-term-crime",
            SchemaId::ShortTermCompact => "short-term-compact",
            SchemaId::MidTerm => "mid-term",
        }
    }

    /// The static descriptor for this id
    pub fn variant(&self) -> &'static SchemaVariant {
        match self {
            SchemaId::ShortTermFull => &SHORT_TERM_FULL,
            SchemaId::ShortTermCrime => &SHORT_TERM_CRIME,
            SchemaId::ShortTermCompact => &SHORT_TERM_COMPACT,
            SchemaId::MidTerm => &MID_TERM,
        }
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaId {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchemaId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| EncodeError::UnknownOption {
                field: "schema",
                value: s.to_string(),
            })
    }
}

/// Declarative description of one model's input schema
#[derive(Debug, Clone, Serialize)]
pub struct SchemaVariant {
    pub id: SchemaId,
    /// Columns the model was fit on, in encoding order
    pub columns: &'static [Column],
    /// Replace whitespace runs in the borough with `_` before encoding
    pub normalize_borough_whitespace: bool,
    /// Selectable borough values, exactly as the form offers them
    pub boroughs: &'static [&'static str],
    pub amenities: AmenityTaxonomy,
    pub bounds: FieldBounds,
}

impl SchemaVariant {
    /// Whether the model takes the derived crime rate
    pub fn include_crime_rate(&self) -> bool {
        self.requires(Column::CrimeRate)
    }

    pub fn requires(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Column names in encoding order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Number of amenity slots the model expects
    pub fn amenity_slots(&self) -> usize {
        self.columns.iter().filter(|c| c.amenity_slot().is_some()).count()
    }
}

static SHORT_TERM_FULL: SchemaVariant = SchemaVariant {
    id: SchemaId::ShortTermFull,
    columns: &[
        Column::PropertyType,
        Column::RoomType,
        Column::Bathrooms,
        Column::Bedrooms,
        Column::Accommodates,
        Column::Borough,
        Column::CrimeRate,
        Column::DistanceToStation,
        Column::Availability365,
        Column::DaysFromLastReview,
        Column::FirstAmenity,
        Column::SecondAmenity,
        Column::ThirdAmenity,
    ],
    normalize_borough_whitespace: false,
    boroughs: LONDON_BOROUGHS,
    amenities: AmenityTaxonomy::VenueCategory,
    bounds: FieldBounds {
        bedrooms: (0, 20),
        bathrooms: (0, 20),
        accommodates: (0, 20),
        distance_km: (0.0, 10.0),
        minimum_nights: (1, 999),
        availability_365: (0, 365),
        days_from_last_review: (0, 182),
    },
};

static SHORT_TERM_CRIME: SchemaVariant = SchemaVariant {
    id: SchemaId::ShortTermCrime,
    columns: &[
        Column::PropertyType,
        Column::Bedrooms,
        Column::Bathrooms,
        Column::Borough,
        Column::CrimeRate,
        Column::DistanceToStation,
        Column::MinimumNights,
        Column::FirstAmenity,
        Column::SecondAmenity,
        Column::ThirdAmenity,
    ],
    normalize_borough_whitespace: true,
    boroughs: LONDON_BOROUGHS,
    amenities: AmenityTaxonomy::PlaceType,
    bounds: FieldBounds {
        bedrooms: (0, 20),
        bathrooms: (0, 20),
        accommodates: (0, 20),
        distance_km: (0.0, 20.0),
        minimum_nights: (1, 999),
        availability_365: (0, 365),
        days_from_last_review: (0, 182),
    },
};

static SHORT_TERM_COMPACT: SchemaVariant = SchemaVariant {
    id: SchemaId::ShortTermCompact,
    columns: &[
        Column::PropertyType,
        Column::Bedrooms,
        Column::Bathrooms,
        Column::Borough,
        Column::DistanceToStation,
        Column::MinimumNights,
        Column::FirstAmenity,
        Column::SecondAmenity,
        Column::ThirdAmenity,
    ],
    normalize_borough_whitespace: true,
    boroughs: LONDON_BOROUGHS,
    amenities: AmenityTaxonomy::VenueCategory,
    bounds: FieldBounds {
        bedrooms: (0, 20),
        bathrooms: (0, 20),
        accommodates: (0, 20),
        distance_km: (0.0, 10.0),
        minimum_nights: (1, 999),
        availability_365: (0, 365),
        days_from_last_review: (0, 182),
    },
};

static MID_TERM: SchemaVariant = SchemaVariant {
    id: SchemaId::MidTerm,
    columns: &[
        Column::PropertyType,
        Column::Bedrooms,
        Column::Bathrooms,
        Column::Borough,
        Column::DistanceToStation,
        Column::MinimumNights,
        Column::FirstAmenity,
        Column::SecondAmenity,
        Column::ThirdAmenity,
    ],
    // The borough list is already underscored, values pass through as-is
    normalize_borough_whitespace: false,
    boroughs: LONDON_BOROUGHS_UNDERSCORED,
    amenities: AmenityTaxonomy::PlaceType,
    bounds: FieldBounds {
        bedrooms: (0, 20),
        bathrooms: (0, 20),
        accommodates: (0, 20),
        distance_km: (0.0, 20.0),
        minimum_nights: (30, 999),
        availability_365: (0, 365),
        days_from_last_review: (0, 182),
    },
};

/// The 32 London boroughs as the short-term forms list them
pub const LONDON_BOROUGHS: &[&str] = &[
    "Barking and Dagenham",
    "Barnet",
    "Bexley",
    "Brent",
    "Bromley",
    "Camden",
    "City of London",
    "Croydon",
    "Ealing",
    "Enfield",
    "Greenwich",
    "Hackney",
    "Hammersmith and Fulham",
    "Haringey",
    "Harrow",
    "Havering",
    "Hillingdon",
    "Hounslow",
    "Islington",
    "Kensington and Chelsea",
    "Kingston upon Thames",
    "Lambeth",
    "Lewisham",
    "Merton",
    "Newham",
    "Redbridge",
    "Richmond upon Thames",
    "Southwark",
    "Tower Hamlets",
    "Waltham Forest",
    "Wandsworth",
    "Westminster",
];

/// The mid-term form's 31 boroughs, already underscored (no City of London)
pub const LONDON_BOROUGHS_UNDERSCORED: &[&str] = &[
    "Barking_and_Dagenham",
    "Barnet",
    "Bexley",
    "Brent",
    "Bromley",
    "Camden",
    "Croydon",
    "Ealing",
    "Enfield",
    "Greenwich",
    "Hackney",
    "Hammersmith_and_Fulham",
    "Haringey",
    "Harrow",
    "Havering",
    "Hillingdon",
    "Hounslow",
    "Islington",
    "Kensington_and_Chelsea",
    "Kingston_upon_Thames",
    "Lambeth",
    "Lewisham",
    "Merton",
    "Newham",
    "Redbridge",
    "Richmond_upon_Thames",
    "Southwark",
    "Tower_Hamlets",
    "Waltham_Forest",
    "Wandsworth",
    "Westminster",
];

const VENUE_CATEGORIES: &[&str] = &[
    "Dining and Drinking",
    "Community and Government",
    "None",
    "Health and Medicine",
    "Arts and Entertainment",
    "Retail",
    "Business and Professional Services",
    "Landmarks and Outdoors",
    "Sports and Recreation",
    "Travel and Transportation",
    "Event",
];

const PLACE_TYPES: &[&str] = &[
    "None",
    "Restaurant",
    "Cafe",
    "Pub",
    "Bar",
    "Fast Food",
    "Supermarket",
    "Convenience Store",
    "Pharmacy",
    "Hospital",
    "Park",
    "Museum",
    "Theatre",
    "Cinema",
    "Gym",
    "Bus Stop",
    "Train Station",
];
