//! Encoding Error Types

use thiserror::Error;

use crate::schema::Column;

/// Errors while turning attributes into a model row
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// Borough has no exact key in the crime-rate table
    #[error("no crime rate for borough {0:?}")]
    UnknownBorough(String),

    /// The schema needs a column whose source attribute was not supplied
    #[error("missing value for column {column}")]
    MissingField { column: Column },

    /// Model output cannot be turned into a finite price
    #[error("model output {0} does not map to a finite price")]
    NonFiniteResult(f64),

    /// A string is not one of the known options
    #[error("unknown {field}: {value:?}")]
    UnknownOption { field: &'static str, value: String },
}
