//! Linear Model Artifact
//!
//! A log1p-price regression exported as JSON: an intercept, one
//! coefficient per numeric column and one per category level. Levels the
//! artifact does not know contribute nothing, as with a one-hot encoder
//! that ignores unknown categories.
//!
//! ```json
//! {
//!   "schema": "short-term-compact",
//!   "columns": ["property_type", "bedrooms", "..."],
//!   "intercept": 4.2,
//!   "numeric": { "bedrooms": 0.18 },
//!   "categorical": { "borough": { "Westminster": 0.41 } }
//! }
//! ```

use crate::engine::PriceModel;
use crate::InferenceError;
use feature_encoder::{Column, EncodedRecord, FeatureValue, SchemaId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Linear regression over numeric and one-hot encoded columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub schema: SchemaId,
    pub columns: Vec<String>,
    pub intercept: f64,
    #[serde(default)]
    pub numeric: HashMap<String, f64>,
    #[serde(default)]
    pub categorical: HashMap<String, HashMap<String, f64>>,
}

impl LinearModel {
    /// Parse and check an artifact
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        let model: LinearModel = serde_json::from_str(json)
            .map_err(|e| InferenceError::ModelLoadError(format!("invalid linear artifact: {e}")))?;
        model.check()?;
        Ok(model)
    }

    pub fn from_path(path: &Path) -> Result<Self, InferenceError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Every coefficient must belong to a declared column
    fn check(&self) -> Result<(), InferenceError> {
        if !self.intercept.is_finite() {
            return Err(InferenceError::ModelLoadError(
                "intercept is not finite".to_string(),
            ));
        }

        let undeclared = self
            .numeric
            .keys()
            .chain(self.categorical.keys())
            .find(|name| !self.columns.contains(name));
        if let Some(name) = undeclared {
            return Err(InferenceError::ModelLoadError(format!(
                "coefficient for undeclared column {name:?}"
            )));
        }

        if let Some(name) = self.numeric.keys().find(|k| self.categorical.contains_key(*k)) {
            return Err(InferenceError::ModelLoadError(format!(
                "column {name:?} is both numeric and categorical"
            )));
        }

        // Levels match the encoded text exactly, so numeric columns never carry one
        if let Some(name) = self
            .categorical
            .keys()
            .find(|k| Column::from_name(k).is_some_and(|c| !c.is_categorical()))
        {
            return Err(InferenceError::ModelLoadError(format!(
                "numeric column {name:?} cannot take categorical levels"
            )));
        }

        debug!(
            "Linear artifact: {} columns, {} numeric, {} categorical",
            self.columns.len(),
            self.numeric.len(),
            self.categorical.len()
        );
        Ok(())
    }

    fn term(&self, column: &str, value: &FeatureValue) -> Result<f64, InferenceError> {
        if let Some(coef) = self.numeric.get(column) {
            let x = value.as_f64().ok_or_else(|| {
                InferenceError::InferenceFailed(format!(
                    "column {column} expects a number, got {value:?}"
                ))
            })?;
            return Ok(coef * x);
        }

        if let Some(levels) = self.categorical.get(column) {
            let level = value.to_string();
            return Ok(levels.get(&level).copied().unwrap_or(0.0));
        }

        Ok(0.0)
    }
}

impl PriceModel for LinearModel {
    fn schema(&self) -> SchemaId {
        self.schema
    }

    fn expected_columns(&self) -> &[String] {
        &self.columns
    }

    fn predict_log(&self, record: &EncodedRecord) -> Result<f64, InferenceError> {
        record
            .iter()
            .try_fold(self.intercept, |acc, (column, value)| {
                Ok(acc + self.term(column, value)?)
            })
    }

    fn backend(&self) -> &'static str {
        "linear"
    }
}
