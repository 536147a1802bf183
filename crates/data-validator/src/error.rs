//! Validation Error Types

use thiserror::Error;

/// Errors during input validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Value is not one of the selectable options
    #[error("{field} {value:?} is not a selectable option")]
    NotAnOption { field: &'static str, value: String },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// NaN or infinite number
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    /// More amenity slots than the form offers
    #[error("at most {max} amenities allowed, got {actual}")]
    TooManyAmenities { max: usize, actual: usize },
}
