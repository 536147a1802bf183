//! Schema Routes
//!
//! Describes the active schema variant so a form can offer exactly the
//! fields, bounds and options the loaded model accepts.

use axum::{extract::State, Json};
use feature_encoder::{AmenityTaxonomy, Column, FieldBounds, PropertyType, RoomType, SchemaId};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Response for the schema endpoint
#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub id: SchemaId,
    pub columns: Vec<&'static str>,
    pub normalize_borough_whitespace: bool,
    pub include_crime_rate: bool,
    pub bounds: FieldBounds,
    pub property_types: Vec<&'static str>,
    pub room_types: Vec<&'static str>,
    pub boroughs: &'static [&'static str],
    pub amenity_taxonomy: AmenityTaxonomy,
    pub amenities: &'static [&'static str],
}

/// Get the active schema
pub async fn get_schema(State(state): State<Arc<AppState>>) -> Json<SchemaResponse> {
    let schema = state.estimator.schema();

    Json(SchemaResponse {
        id: schema.id,
        columns: schema.column_names(),
        normalize_borough_whitespace: schema.normalize_borough_whitespace,
        include_crime_rate: schema.include_crime_rate(),
        bounds: schema.bounds,
        property_types: PropertyType::ALL.iter().map(PropertyType::as_str).collect(),
        room_types: if schema.requires(Column::RoomType) {
            vec![RoomType::EntireHomeApt.as_str(), RoomType::PrivateRoom.as_str()]
        } else {
            Vec::new()
        },
        boroughs: schema.boroughs,
        amenity_taxonomy: schema.amenities,
        amenities: schema.amenities.options(),
    })
}
