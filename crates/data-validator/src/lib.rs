//! Input Validation
//!
//! Applies the form's widget constraints (numeric bounds, option lists,
//! required variant fields) to property attributes before encoding.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationResult, Validator};
