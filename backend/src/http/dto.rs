//! Data Transfer Objects for the HTTP API.
//!
//! Response bodies reuse the serializable domain types from [`crate::api`];
//! only request shapes and the health payload live here.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    District, GeocodeResult, NearbySchool, Program, SchoolDetail, SchoolProgram,
};
use crate::api::{GeoPoint, NearbyFilter, ProgramId, DEFAULT_LIMIT, DEFAULT_RADIUS_KM};

/// Query string of `GET /schools/nearby`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default)]
    pub district_type: Option<String>,
    #[serde(default)]
    pub program_id: Option<i64>,
    #[serde(default)]
    pub grade: Option<i32>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_radius_km() -> f64 {
    DEFAULT_RADIUS_KM
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl From<NearbyQuery> for NearbyFilter {
    fn from(query: NearbyQuery) -> Self {
        let mut filter = NearbyFilter::new(GeoPoint::new(query.lat, query.lng))
            .with_radius_km(query.radius_km)
            .with_limit(query.limit);
        if let Some(district_type) = query.district_type {
            filter = filter.with_district_type(district_type);
        }
        if let Some(program_id) = query.program_id {
            filter = filter.with_program(ProgramId::new(program_id));
        }
        if let Some(grade) = query.grade {
            filter = filter.with_grade(grade);
        }
        filter
    }
}

/// Body of `POST /geocode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeRequest {
    pub address: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    /// "connected", "disconnected" or "error: ..."
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_fill_filter() {
        let query: NearbyQuery = serde_json::from_str(r#"{"lat": 51.05, "lng": -114.07}"#).unwrap();
        let filter = NearbyFilter::from(query);

        assert_eq!(filter.radius_km, 5.0);
        assert_eq!(filter.limit, 50);
        assert!(filter.district_type.is_none());
        assert!(!filter.needs_offering());
    }

    #[test]
    fn test_empty_district_type_is_dropped() {
        let query = NearbyQuery {
            lat: 51.0,
            lng: -114.0,
            radius_km: 2.0,
            district_type: Some(String::new()),
            program_id: Some(7),
            grade: Some(3),
            limit: 10,
        };
        let filter = NearbyFilter::from(query);

        assert!(filter.district_type.is_none());
        assert_eq!(filter.program_id, Some(ProgramId(7)));
        assert_eq!(filter.grade, Some(3));
        assert_eq!(filter.limit, 10);
    }
}
