//! Rental Feature Encoder
//!
//! Turns form attributes into the exact single-row input a trained
//! nightly-price model expects, and inverts its log1p output.
//!
//! ```
//! use feature_encoder::{encode, PriceEstimate, PropertyAttributes, PropertyType, SchemaId};
//!
//! let attrs = PropertyAttributes::new(PropertyType::EntireCondo, 1, 1, "Camden", 0.5)
//!     .with_minimum_nights(2)
//!     .with_amenities(["Retail", "None", "Event"]);
//!
//! let record = encode(&attrs, SchemaId::ShortTermCompact.variant()).unwrap();
//! assert_eq!(record.len(), 9);
//!
//! let estimate = PriceEstimate::from_log(5.0).unwrap();
//! assert_eq!(estimate.to_string(), "Recommended Price: £147.41 per night");
//! ```

mod attributes;
mod crime;
mod error;
mod features;
mod schema;

pub use attributes::{PropertyAttributes, PropertyType, RoomType};
pub use crime::{CrimeRateTable, TableAudit, LONDON_CRIME_RATES};
pub use error::EncodeError;
pub use features::{
    encode, normalize_borough, to_price, ColumnDiff, EncodedRecord, FeatureEncoder, FeatureValue,
    PriceEstimate,
};
pub use schema::{
    AmenityTaxonomy, Column, FieldBounds, SchemaId, SchemaVariant, LONDON_BOROUGHS,
    LONDON_BOROUGHS_UNDERSCORED,
};
