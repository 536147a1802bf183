//! Feature Record Assembly

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use tracing::debug;

use crate::attributes::PropertyAttributes;
use crate::crime::CrimeRateTable;
use crate::schema::{Column, SchemaId, SchemaVariant};
use crate::EncodeError;

/// A single encoded cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FeatureValue {
    /// Numeric view of the value; text has none
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Integer(v) => Some(*v as f64),
            FeatureValue::Float(v) => Some(*v),
            FeatureValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Integer(v) => write!(f, "{v}"),
            FeatureValue::Float(v) => write!(f, "{v}"),
            FeatureValue::Text(s) => f.write_str(s),
        }
    }
}

/// Columns present on one side but not the other
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnDiff {
    /// Expected by the model, absent from the record
    pub missing: Vec<String>,
    /// Present in the record, unknown to the model
    pub unexpected: Vec<String>,
}

impl ColumnDiff {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }
}

/// One row of model input
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    schema: SchemaId,
    fields: Vec<(Column, FeatureValue)>,
}

impl EncodedRecord {
    /// Schema the record was encoded for
    pub fn schema(&self) -> SchemaId {
        self.schema
    }

    /// Column names in encoding order
    pub fn columns(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(c, _)| c.name()).collect()
    }

    /// Look up a value by column name
    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.fields
            .iter()
            .find(|(c, _)| c.name() == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FeatureValue)> {
        self.fields.iter().map(|(c, v)| (c.name(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Compare the record's columns with the set a model expects.
    /// Order is ignored.
    pub fn column_diff<S: AsRef<str>>(&self, expected: &[S]) -> ColumnDiff {
        let missing = expected
            .iter()
            .map(|s| s.as_ref())
            .filter(|name| self.get(name).is_none())
            .map(str::to_string)
            .collect();

        let unexpected = self
            .fields
            .iter()
            .map(|(c, _)| c.name())
            .filter(|name| !expected.iter().any(|e| e.as_ref() == *name))
            .map(str::to_string)
            .collect();

        ColumnDiff {
            missing,
            unexpected,
        }
    }
}

impl Serialize for EncodedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (column, value) in &self.fields {
            map.serialize_entry(column.name(), value)?;
        }
        map.end()
    }
}

/// Replace every whitespace run with a single underscore
pub fn normalize_borough(borough: &str) -> String {
    let mut out = String::with_capacity(borough.len());
    let mut in_space = false;
    for ch in borough.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Invert the log1p price target
pub fn to_price(log_price: f64) -> Result<f64, EncodeError> {
    if !log_price.is_finite() {
        return Err(EncodeError::NonFiniteResult(log_price));
    }
    let price = log_price.exp_m1();
    if !price.is_finite() {
        return Err(EncodeError::NonFiniteResult(log_price));
    }
    Ok(price)
}

/// Nightly price recovered from a model output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceEstimate {
    /// Raw model output, log1p scale
    pub log_price: f64,
    /// Price per night in GBP
    pub price: f64,
}

impl PriceEstimate {
    pub fn from_log(log_price: f64) -> Result<Self, EncodeError> {
        Ok(Self {
            log_price,
            price: to_price(log_price)?,
        })
    }
}

impl fmt::Display for PriceEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Recommended Price: £{:.2} per night", self.price)
    }
}

/// Encoder bound to one schema variant
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    schema: &'static SchemaVariant,
    crime_rates: CrimeRateTable,
}

impl FeatureEncoder {
    pub fn new(schema: &'static SchemaVariant) -> Self {
        Self {
            schema,
            crime_rates: CrimeRateTable::london(),
        }
    }

    pub fn schema(&self) -> &'static SchemaVariant {
        self.schema
    }

    /// Build the model row for a set of attributes
    pub fn encode(&self, attrs: &PropertyAttributes) -> Result<EncodedRecord, EncodeError> {
        let mut fields = Vec::with_capacity(self.schema.columns.len());

        for &column in self.schema.columns {
            let value = self.encode_column(column, attrs)?;
            fields.push((column, value));
        }

        debug!(
            "Encoded {} columns for schema {} (borough={:?})",
            fields.len(),
            self.schema.id,
            attrs.borough
        );

        Ok(EncodedRecord {
            schema: self.schema.id,
            fields,
        })
    }

    fn encode_column(
        &self,
        column: Column,
        attrs: &PropertyAttributes,
    ) -> Result<FeatureValue, EncodeError> {
        let missing = || EncodeError::MissingField { column };
        let integer = |v: Option<u32>| v.map(|n| FeatureValue::Integer(n.into())).ok_or_else(missing);

        let value = match column {
            Column::PropertyType => FeatureValue::Text(attrs.property_type.as_str().to_string()),
            Column::RoomType => attrs
                .room_type
                .map(|r| FeatureValue::Text(r.as_str().to_string()))
                .ok_or_else(missing)?,
            Column::Accommodates => integer(attrs.accommodates)?,
            Column::Bedrooms => FeatureValue::Integer(attrs.bedrooms.into()),
            Column::Bathrooms => FeatureValue::Integer(attrs.bathrooms.into()),
            Column::Borough => {
                if self.schema.normalize_borough_whitespace {
                    FeatureValue::Text(normalize_borough(&attrs.borough))
                } else {
                    FeatureValue::Text(attrs.borough.clone())
                }
            }
            // Always keyed by the borough as selected, never the normalized form
            Column::CrimeRate => self
                .crime_rates
                .lookup(&attrs.borough)
                .map(FeatureValue::Float)
                .ok_or_else(|| EncodeError::UnknownBorough(attrs.borough.clone()))?,
            Column::DistanceToStation => FeatureValue::Float(attrs.distance_km),
            Column::MinimumNights => integer(attrs.minimum_nights)?,
            Column::Availability365 => integer(attrs.availability_365)?,
            Column::DaysFromLastReview => integer(attrs.days_from_last_review)?,
            Column::FirstAmenity | Column::SecondAmenity | Column::ThirdAmenity => {
                let slot = column.amenity_slot().ok_or_else(missing)?;
                attrs
                    .amenity(slot)
                    .map(|a| FeatureValue::Text(a.to_string()))
                    .ok_or_else(missing)?
            }
        };

        Ok(value)
    }
}

/// Encode attributes against a schema variant
pub fn encode(
    attrs: &PropertyAttributes,
    schema: &'static SchemaVariant,
) -> Result<EncodedRecord, EncodeError> {
    FeatureEncoder::new(schema).encode(attrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{PropertyType, RoomType};
    use crate::schema::LONDON_BOROUGHS;
    use proptest::prelude::*;

    fn full_attrs(borough: &str) -> PropertyAttributes {
        PropertyAttributes::new(PropertyType::EntireCondo, 1, 1, borough, 0.5)
            .with_room_type(RoomType::EntireHomeApt)
            .with_accommodates(2)
            .with_availability_365(120)
            .with_days_from_last_review(14)
            .with_amenities(["Dining and Drinking", "Retail", "None"])
    }

    #[test]
    fn test_camden_crime_rate() {
        let record = encode(&full_attrs("Camden"), SchemaId::ShortTermFull.variant()).unwrap();
        assert_eq!(record.get("crime_rate"), Some(&FeatureValue::Float(108.07)));
        assert_eq!(record.get("borough"), Some(&FeatureValue::Text("Camden".into())));
        assert_eq!(
            record.get("distance_to_nearest_tube_station"),
            Some(&FeatureValue::Float(0.5))
        );
    }

    #[test]
    fn test_normalized_borough_keeps_lookup() {
        let attrs = PropertyAttributes::new(
            PropertyType::EntireRentalUnit,
            2,
            1,
            "Kensington and Chelsea",
            1.0,
        )
        .with_minimum_nights(2)
        .with_amenities(["Pub", "Park", "Museum"]);

        let record = encode(&attrs, SchemaId::ShortTermCrime.variant()).unwrap();
        assert_eq!(
            record.get("borough"),
            Some(&FeatureValue::Text("Kensington_and_Chelsea".into()))
        );
        assert_eq!(record.get("crime_rate"), Some(&FeatureValue::Float(118.02)));
    }

    #[test]
    fn test_unknown_borough_is_reported() {
        let err = encode(&full_attrs("Atlantis"), SchemaId::ShortTermFull.variant()).unwrap_err();
        assert!(matches!(err, EncodeError::UnknownBorough(ref b) if b == "Atlantis"));
    }

    #[test]
    fn test_every_borough_matches_table_or_fails() {
        let table = CrimeRateTable::london();
        for borough in LONDON_BOROUGHS {
            let result = encode(&full_attrs(borough), SchemaId::ShortTermFull.variant());
            match table.lookup(borough) {
                Some(rate) => {
                    let record = result.unwrap();
                    assert_eq!(record.get("crime_rate"), Some(&FeatureValue::Float(rate)));
                }
                None => {
                    assert_eq!(*borough, "Ealing");
                    assert!(matches!(result, Err(EncodeError::UnknownBorough(_))));
                }
            }
        }
    }

    #[test]
    fn test_no_crime_rate_when_not_required() {
        let attrs = PropertyAttributes::new(PropertyType::EntireHome, 3, 2, "Ealing", 4.0)
            .with_minimum_nights(1)
            .with_amenities(["Retail", "Event", "None"]);
        let record = encode(&attrs, SchemaId::ShortTermCompact.variant()).unwrap();
        assert!(record.get("crime_rate").is_none());
        assert_eq!(record.get("borough"), Some(&FeatureValue::Text("Ealing".into())));
    }

    #[test]
    fn test_missing_variant_field() {
        let attrs = PropertyAttributes::new(PropertyType::EntireHome, 3, 2, "Barnet", 4.0)
            .with_amenities(["Retail", "Event", "None"]);
        let err = encode(&attrs, SchemaId::ShortTermCompact.variant()).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::MissingField {
                column: Column::MinimumNights
            }
        ));
    }

    #[test]
    fn test_missing_amenity_slot() {
        let attrs = full_attrs("Camden").with_amenities(["Retail"]);
        let err = encode(&attrs, SchemaId::ShortTermFull.variant()).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::MissingField {
                column: Column::SecondAmenity
            }
        ));
    }

    #[test]
    fn test_pre_underscored_passes_through() {
        let attrs = PropertyAttributes::new(PropertyType::EntireHome, 1, 1, "Tower_Hamlets", 2.0)
            .with_minimum_nights(45)
            .with_amenities(["Gym", "None", "None"]);
        let record = encode(&attrs, SchemaId::MidTerm.variant()).unwrap();
        assert_eq!(
            record.get("borough"),
            Some(&FeatureValue::Text("Tower_Hamlets".into()))
        );
    }

    #[test]
    fn test_record_serializes_in_column_order() {
        let record = encode(&full_attrs("Camden"), SchemaId::ShortTermFull.variant()).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.starts_with(r#"{"property_type":"Entire condo","room_type":"Entire home/apt""#));
        assert!(json.contains(r#""crime_rate":108.07"#));
    }

    #[test]
    fn test_column_diff() {
        let record = encode(&full_attrs("Camden"), SchemaId::ShortTermFull.variant()).unwrap();
        let diff = record.column_diff(&SchemaId::ShortTermCrime.variant().column_names());
        assert_eq!(diff.missing, vec!["minimum_nights".to_string()]);
        assert!(diff.unexpected.contains(&"room_type".to_string()));
        assert!(record
            .column_diff(&SchemaId::ShortTermFull.variant().column_names())
            .is_empty());
    }

    #[test]
    fn test_normalize_borough() {
        assert_eq!(normalize_borough("Kensington and Chelsea"), "Kensington_and_Chelsea");
        assert_eq!(normalize_borough("City  of\tLondon"), "City_of_London");
        assert_eq!(normalize_borough("Camden"), "Camden");
        assert_eq!(normalize_borough("Ealing "), "Ealing_");
    }

    #[test]
    fn test_to_price() {
        assert_eq!(to_price(0.0).unwrap(), 0.0);
        let estimate = PriceEstimate::from_log(5.0).unwrap();
        assert!((estimate.price - 147.4132).abs() < 1e-3);
        assert_eq!(estimate.to_string(), "Recommended Price: £147.41 per night");
    }

    #[test]
    fn test_to_price_overflow() {
        assert!(matches!(to_price(1000.0), Err(EncodeError::NonFiniteResult(_))));
        assert!(to_price(f64::NAN).is_err());
        assert!(to_price(f64::INFINITY).is_err());
    }

    /// A schema plus a borough and three amenities drawn from its own lists
    fn schema_with_choices(
    ) -> impl Strategy<Value = (&'static SchemaVariant, &'static str, Vec<&'static str>)> {
        prop::sample::select(SchemaId::ALL.to_vec()).prop_flat_map(|id| {
            let schema = id.variant();
            (
                Just(schema),
                prop::sample::select(schema.boroughs),
                prop::collection::vec(prop::sample::select(schema.amenities.options()), 3),
            )
        })
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "[A-Za-z \t]{0,40}") {
            let once = normalize_borough(&s);
            prop_assert_eq!(normalize_borough(&once), once.clone());
            prop_assert!(!once.chars().any(char::is_whitespace));
        }

        #[test]
        fn to_price_is_monotonic(a in -20.0f64..20.0, b in -20.0f64..20.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(to_price(lo).unwrap() <= to_price(hi).unwrap());
        }

        #[test]
        fn encoding_yields_exactly_schema_columns(
            (schema, borough, amenities) in schema_with_choices(),
            property_type in prop::sample::select(PropertyType::ALL.to_vec()),
            room_type in prop::sample::select(vec![RoomType::EntireHomeApt, RoomType::PrivateRoom]),
        ) {
            // Only "Ealing" lacks an exact crime-rate key
            prop_assume!(!(schema.include_crime_rate() && borough == "Ealing"));

            let attrs = PropertyAttributes::new(property_type, 1, 1, borough, 1.5)
                .with_room_type(room_type)
                .with_accommodates(2)
                .with_minimum_nights(30)
                .with_availability_365(200)
                .with_days_from_last_review(10)
                .with_amenities(amenities);

            let record = encode(&attrs, schema).unwrap();
            prop_assert_eq!(record.columns(), schema.column_names());
            prop_assert!(record.column_diff(&schema.column_names()).is_empty());
        }
    }
}
