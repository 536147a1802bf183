//! Attribute Validator for Range and Option Checking

use crate::error::ValidationError;
use feature_encoder::{Column, PropertyAttributes, SchemaVariant};
use tracing::debug;

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }

    /// Collapse into the first error, if any
    pub fn into_result(self) -> Result<(), ValidationError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Validator for one schema variant's form constraints
pub struct Validator {
    schema: &'static SchemaVariant,
}

impl Validator {
    /// Create a validator for a schema variant
    pub fn for_schema(schema: &'static SchemaVariant) -> Self {
        Self { schema }
    }

    /// Validate a single value against an inclusive range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite(field));
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    fn validate_count(
        &self,
        field: &'static str,
        value: u32,
        range: (u32, u32),
    ) -> Result<(), ValidationError> {
        self.validate_range(field, value.into(), (range.0.into(), range.1.into()))
    }

    /// Validate a required variant field that may be absent
    fn validate_required(
        &self,
        column: Column,
        value: Option<u32>,
        range: (u32, u32),
    ) -> Result<(), ValidationError> {
        if !self.schema.requires(column) {
            return Ok(());
        }
        match value {
            Some(v) => self.validate_count(column.name(), v, range),
            None => Err(ValidationError::MissingField(column.name())),
        }
    }

    /// Check a value against a fixed option list
    pub fn validate_option(
        &self,
        field: &'static str,
        value: &str,
        options: &[&str],
    ) -> Result<(), ValidationError> {
        if options.contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::NotAnOption {
                field,
                value: value.to_string(),
            })
        }
    }

    /// Validate all attributes the schema uses, collecting every error
    pub fn validate(&self, attrs: &PropertyAttributes) -> ValidationResult {
        let bounds = &self.schema.bounds;
        let mut checks: Vec<Result<(), ValidationError>> = vec![
            self.validate_count("bedrooms", attrs.bedrooms, bounds.bedrooms),
            self.validate_count("bathrooms", attrs.bathrooms, bounds.bathrooms),
            self.validate_range(
                "distance_to_nearest_tube_station",
                attrs.distance_km,
                bounds.distance_km,
            ),
            self.validate_option("borough", &attrs.borough, self.schema.boroughs),
            self.validate_required(Column::Accommodates, attrs.accommodates, bounds.accommodates),
            self.validate_required(
                Column::MinimumNights,
                attrs.minimum_nights,
                bounds.minimum_nights,
            ),
            self.validate_required(
                Column::Availability365,
                attrs.availability_365,
                bounds.availability_365,
            ),
            self.validate_required(
                Column::DaysFromLastReview,
                attrs.days_from_last_review,
                bounds.days_from_last_review,
            ),
        ];

        if self.schema.requires(Column::RoomType) && attrs.room_type.is_none() {
            checks.push(Err(ValidationError::MissingField(Column::RoomType.name())));
        }

        let slots = self.schema.amenity_slots();
        if attrs.amenities.len() > slots {
            checks.push(Err(ValidationError::TooManyAmenities {
                max: slots,
                actual: attrs.amenities.len(),
            }));
        }

        let options = self.schema.amenities.options();
        for column in self.schema.columns.iter().filter(|c| c.amenity_slot().is_some()) {
            let check = match column.amenity_slot().and_then(|slot| attrs.amenity(slot)) {
                Some(amenity) => self.validate_option(column.name(), amenity, options),
                None => Err(ValidationError::MissingField(column.name())),
            };
            checks.push(check);
        }

        let fields_checked = checks.len();
        let errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();

        if errors.is_empty() {
            ValidationResult::valid(fields_checked)
        } else {
            debug!(
                "Validation failed for schema {}: {} error(s)",
                self.schema.id,
                errors.len()
            );
            ValidationResult::invalid(errors, fields_checked)
        }
    }
}
