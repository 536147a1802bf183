//! ONNX Model Backend
//!
//! Runs an exported regression graph with tract. The graph takes a single
//! `[1, n]` f32 tensor; a sidecar `<model>.layout.json` says how each of the
//! `n` slots is filled from the encoded record.

use crate::engine::PriceModel;
use crate::InferenceError;
use feature_encoder::{Column, EncodedRecord, SchemaId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};
use tract_onnx::prelude::*;

type OnnxPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// One input slot: a numeric column, or a one-hot indicator for a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSlot {
    pub column: String,
    /// Category level this slot indicates; `None` for numeric passthrough
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<String>,
}

impl InputSlot {
    fn value(&self, record: &EncodedRecord) -> Result<f32, InferenceError> {
        let cell = record.get(&self.column).ok_or_else(|| {
            InferenceError::InferenceFailed(format!("column {} absent from record", self.column))
        })?;

        match &self.equals {
            Some(level) => Ok(if cell.to_string() == *level { 1.0 } else { 0.0 }),
            None => cell.as_f64().map(|v| v as f32).ok_or_else(|| {
                InferenceError::InferenceFailed(format!(
                    "column {} expects a number, got {:?}",
                    self.column, cell
                ))
            }),
        }
    }
}

/// Mapping from record columns to the graph's input tensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputLayout {
    pub schema: SchemaId,
    pub columns: Vec<String>,
    pub inputs: Vec<InputSlot>,
}

impl InputLayout {
    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        let layout: InputLayout = serde_json::from_str(json)
            .map_err(|e| InferenceError::ModelLoadError(format!("invalid input layout: {e}")))?;

        if layout.inputs.is_empty() {
            return Err(InferenceError::ModelLoadError(
                "input layout has no slots".to_string(),
            ));
        }
        if let Some(slot) = layout.inputs.iter().find(|s| !layout.columns.contains(&s.column)) {
            return Err(InferenceError::ModelLoadError(format!(
                "input slot refers to undeclared column {:?}",
                slot.column
            )));
        }
        if let Some(slot) = layout.inputs.iter().find(|s| {
            s.equals.is_some() && Column::from_name(&s.column).is_some_and(|c| !c.is_categorical())
        }) {
            return Err(InferenceError::ModelLoadError(format!(
                "numeric column {:?} cannot be one-hot encoded",
                slot.column
            )));
        }
        Ok(layout)
    }

    /// Build the input row for a record
    pub fn row(&self, record: &EncodedRecord) -> Result<Vec<f32>, InferenceError> {
        self.inputs.iter().map(|slot| slot.value(record)).collect()
    }
}

/// ONNX regression graph plus its input layout
pub struct OnnxModel {
    plan: OnnxPlan,
    layout: InputLayout,
}

impl OnnxModel {
    /// Load `model.onnx` together with `model.layout.json`
    pub fn from_path(path: &Path) -> Result<Self, InferenceError> {
        let layout_path = path.with_extension("layout.json");
        let json = std::fs::read_to_string(&layout_path).map_err(|e| {
            InferenceError::ModelLoadError(format!("{}: {e}", layout_path.display()))
        })?;
        let layout = InputLayout::from_json(&json)?;
        Self::load(path, layout)
    }

    pub fn load(path: &Path, layout: InputLayout) -> Result<Self, InferenceError> {
        let width = layout.inputs.len();
        let load_error =
            |e: TractError| InferenceError::ModelLoadError(format!("{}: {e}", path.display()));

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, width]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(load_error)?;

        info!("ONNX graph loaded from {} ({} input slots)", path.display(), width);
        Ok(Self { plan, layout })
    }
}

impl PriceModel for OnnxModel {
    fn schema(&self) -> SchemaId {
        self.layout.schema
    }

    fn expected_columns(&self) -> &[String] {
        &self.layout.columns
    }

    fn predict_log(&self, record: &EncodedRecord) -> Result<f64, InferenceError> {
        let row = self.layout.row(record)?;
        let width = row.len();

        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, width), row)
            .map_err(|e| InferenceError::InvalidInputShape {
                expected: format!("[1, {}]", self.layout.inputs.len()),
                actual: e.to_string(),
            })?
            .into();

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let view = outputs[0]
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let log_price = view
            .iter()
            .next()
            .copied()
            .ok_or_else(|| InferenceError::InferenceFailed("model returned no output".to_string()))?;

        debug!("ONNX output {}", log_price);
        Ok(log_price as f64)
    }

    fn backend(&self) -> &'static str {
        "onnx"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InferenceEngine;
    use feature_encoder::{encode, PropertyAttributes, PropertyType};
    use std::path::PathBuf;

    const LAYOUT: &str = r#"{
        "schema": "mid-term",
        "columns": [
            "property_type", "bedrooms", "bathrooms", "borough",
            "distance_to_nearest_tube_station", "minimum_nights",
            "first_amenity", "second_amenity", "third_amenity"
        ],
        "inputs": [
            { "column": "bedrooms" },
            { "column": "minimum_nights" },
            { "column": "borough", "equals": "Tower_Hamlets" },
            { "column": "borough", "equals": "Camden" }
        ]
    }"#;

    #[test]
    fn test_layout_row() {
        let layout = InputLayout::from_json(LAYOUT).unwrap();
        let attrs = PropertyAttributes::new(PropertyType::EntireLoft, 3, 1, "Tower_Hamlets", 2.0)
            .with_minimum_nights(60)
            .with_amenities(["Gym", "None", "Park"]);
        let record = encode(&attrs, SchemaId::MidTerm.variant()).unwrap();

        assert_eq!(layout.row(&record).unwrap(), vec![3.0, 60.0, 1.0, 0.0]);
    }

    #[test]
    fn test_layout_rejects_undeclared_slot() {
        let json = r#"{
            "schema": "mid-term",
            "columns": ["bedrooms"],
            "inputs": [{ "column": "crime_rate" }]
        }"#;
        assert!(InputLayout::from_json(json).is_err());
    }

    #[test]
    fn test_layout_rejects_one_hot_numeric_column() {
        let json = r#"{
            "schema": "mid-term",
            "columns": ["bedrooms"],
            "inputs": [{ "column": "bedrooms", "equals": "2" }]
        }"#;
        let err = InputLayout::from_json(json).unwrap_err();
        assert!(err.to_string().contains("bedrooms"));
    }

    /// `log_price = input · [0.25, 0.001, 0.5, 0.4] + 3.0`, fed by
    /// the same slots as `LAYOUT`
    fn fixture() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/mid_term_linear.onnx")
    }

    #[test]
    fn test_onnx_graph_runs() {
        let engine = InferenceEngine::load(fixture(), SchemaId::MidTerm.variant()).unwrap();
        assert_eq!(engine.backend(), "onnx");

        let tower_hamlets =
            PropertyAttributes::new(PropertyType::EntireLoft, 3, 1, "Tower_Hamlets", 2.0)
                .with_minimum_nights(60)
                .with_amenities(["Gym", "None", "Park"]);
        let record = encode(&tower_hamlets, SchemaId::MidTerm.variant()).unwrap();
        // 3*0.25 + 60*0.001 + 0.5 + 3.0
        assert!((engine.predict(&record).unwrap() - 4.31).abs() < 1e-5);

        let camden = PropertyAttributes::new(PropertyType::EntireHome, 1, 1, "Camden", 0.4)
            .with_minimum_nights(30)
            .with_amenities(["Museum", "Pub", "None"]);
        let record = encode(&camden, SchemaId::MidTerm.variant()).unwrap();
        // 0.25 + 30*0.001 + 0.4 + 3.0
        assert!((engine.predict(&record).unwrap() - 3.68).abs() < 1e-5);
    }

    #[test]
    fn test_onnx_graph_bound_to_its_schema() {
        let err = InferenceEngine::load(fixture(), SchemaId::ShortTermCompact.variant())
            .err()
            .unwrap();
        assert!(matches!(err, InferenceError::SchemaBinding { .. }));
    }

    #[test]
    fn test_missing_layout_file() {
        let err = OnnxModel::from_path(Path::new("/nonexistent/model.onnx"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("model.layout.json"));
    }
}
