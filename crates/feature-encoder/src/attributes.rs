//! Property Attributes
//!
//! Raw form input, before encoding. Variant-dependent fields are optional;
//! which of them a model needs is decided by its `SchemaVariant`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::EncodeError;

/// Listing type as offered by the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "Entire rental unit")]
    EntireRentalUnit,
    #[serde(rename = "Entire condo")]
    EntireCondo,
    #[serde(rename = "Private room in home")]
    PrivateRoomInHome,
    #[serde(rename = "Private room in rental unit")]
    PrivateRoomInRentalUnit,
    #[serde(rename = "Entire townhouse")]
    EntireTownhouse,
    #[serde(rename = "Private room in townhouse")]
    PrivateRoomInTownhouse,
    #[serde(rename = "Private room in condo")]
    PrivateRoomInCondo,
    #[serde(rename = "Private room in bed and breakfast")]
    PrivateRoomInBedAndBreakfast,
    #[serde(rename = "Entire home")]
    EntireHome,
    #[serde(rename = "Entire guest suite")]
    EntireGuestSuite,
    #[serde(rename = "Private room in serviced apartment")]
    PrivateRoomInServicedApartment,
    #[serde(rename = "Entire loft")]
    EntireLoft,
    #[serde(rename = "Private room in guesthouse")]
    PrivateRoomInGuesthouse,
    #[serde(rename = "Entire serviced apartment")]
    EntireServicedApartment,
    #[serde(rename = "Private room in loft")]
    PrivateRoomInLoft,
    #[serde(rename = "Private room in guest suite")]
    PrivateRoomInGuestSuite,
    #[serde(rename = "Entire guesthouse")]
    EntireGuesthouse,
    #[serde(rename = "Room in hotel")]
    RoomInHotel,
}

impl PropertyType {
    pub const ALL: [PropertyType; 18] = [
        PropertyType::EntireRentalUnit,
        PropertyType::EntireCondo,
        PropertyType::PrivateRoomInHome,
        PropertyType::PrivateRoomInRentalUnit,
        PropertyType::EntireTownhouse,
        PropertyType::PrivateRoomInTownhouse,
        PropertyType::PrivateRoomInCondo,
        PropertyType::PrivateRoomInBedAndBreakfast,
        PropertyType::EntireHome,
        PropertyType::EntireGuestSuite,
        PropertyType::PrivateRoomInServicedApartment,
        PropertyType::EntireLoft,
        PropertyType::PrivateRoomInGuesthouse,
        PropertyType::EntireServicedApartment,
        PropertyType::PrivateRoomInLoft,
        PropertyType::PrivateRoomInGuestSuite,
        PropertyType::EntireGuesthouse,
        PropertyType::RoomInHotel,
    ];

    /// Value the model was trained on
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::EntireRentalUnit => "Entire rental unit",
            PropertyType::EntireCondo => "Entire condo",
            PropertyType::PrivateRoomInHome => "Private room in home",
            PropertyType::PrivateRoomInRentalUnit => "Private room in rental unit",
            PropertyType::EntireTownhouse => "Entire townhouse",
            PropertyType::PrivateRoomInTownhouse => "Private room in townhouse",
            PropertyType::PrivateRoomInCondo => "Private room in condo",
            PropertyType::PrivateRoomInBedAndBreakfast => "Private room in bed and breakfast",
            PropertyType::EntireHome => "Entire home",
            PropertyType::EntireGuestSuite => "Entire guest suite",
            PropertyType::PrivateRoomInServicedApartment => "Private room in serviced apartment",
            PropertyType::EntireLoft => "Entire loft",
            PropertyType::PrivateRoomInGuesthouse => "Private room in guesthouse",
            PropertyType::EntireServicedApartment => "Entire serviced apartment",
            PropertyType::PrivateRoomInLoft => "Private room in loft",
            PropertyType::PrivateRoomInGuestSuite => "Private room in guest suite",
            PropertyType::EntireGuesthouse => "Entire guesthouse",
            PropertyType::RoomInHotel => "Room in hotel",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| EncodeError::UnknownOption {
                field: "property_type",
                value: s.to_string(),
            })
    }
}

/// Room type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    #[serde(rename = "Entire home/apt")]
    EntireHomeApt,
    #[serde(rename = "Private room")]
    PrivateRoom,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::EntireHomeApt => "Entire home/apt",
            RoomType::PrivateRoom => "Private room",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Entire home/apt" => Ok(RoomType::EntireHomeApt),
            "Private room" => Ok(RoomType::PrivateRoom),
            other => Err(EncodeError::UnknownOption {
                field: "room_type",
                value: other.to_string(),
            }),
        }
    }
}

/// Property attributes collected by the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAttributes {
    pub property_type: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_type: Option<RoomType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accommodates: Option<u32>,
    pub bedrooms: u32,
    pub bathrooms: u32,
    /// Borough exactly as selected; spelling depends on the variant's list
    pub borough: String,
    /// Distance to the nearest station in km
    #[serde(alias = "distance_to_nearest_tube_station")]
    pub distance_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_nights: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_365: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_from_last_review: Option<u32>,
    /// Ordered nearby-amenity slots (first, second, third)
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl PropertyAttributes {
    /// Attributes every variant shares
    pub fn new(
        property_type: PropertyType,
        bedrooms: u32,
        bathrooms: u32,
        borough: impl Into<String>,
        distance_km: f64,
    ) -> Self {
        Self {
            property_type,
            room_type: None,
            accommodates: None,
            bedrooms,
            bathrooms,
            borough: borough.into(),
            distance_km,
            minimum_nights: None,
            availability_365: None,
            days_from_last_review: None,
            amenities: Vec::new(),
        }
    }

    pub fn with_room_type(mut self, room_type: RoomType) -> Self {
        self.room_type = Some(room_type);
        self
    }

    pub fn with_accommodates(mut self, accommodates: u32) -> Self {
        self.accommodates = Some(accommodates);
        self
    }

    pub fn with_minimum_nights(mut self, nights: u32) -> Self {
        self.minimum_nights = Some(nights);
        self
    }

    pub fn with_availability_365(mut self, days: u32) -> Self {
        self.availability_365 = Some(days);
        self
    }

    pub fn with_days_from_last_review(mut self, days: u32) -> Self {
        self.days_from_last_review = Some(days);
        self
    }

    pub fn with_amenities<I, S>(mut self, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.amenities = amenities.into_iter().map(Into::into).collect();
        self
    }

    /// Amenity in a given slot, if supplied
    pub fn amenity(&self, slot: usize) -> Option<&str> {
        self.amenities.get(slot).map(String::as_str)
    }
}
