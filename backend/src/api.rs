//! Public API surface for the school finder backend.
//!
//! This file consolidates the DTO types for the HTTP API and the repository
//! layer. All types derive Serialize/Deserialize for JSON serialization.

use serde::{Deserialize, Serialize};

/// School identifier (database primary key).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SchoolId(pub i64);

/// District identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DistrictId(pub i64);

/// Program identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProgramId(pub i64);

impl SchoolId {
    pub fn new(value: i64) -> Self {
        SchoolId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl DistrictId {
    pub fn new(value: i64) -> Self {
        DistrictId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl ProgramId {
    pub fn new(value: i64) -> Self {
        ProgramId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for SchoolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for DistrictId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for ProgramId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SchoolId> for i64 {
    fn from(id: SchoolId) -> Self {
        id.0
    }
}

// =============================================================================
// Reference data
// =============================================================================

/// A governing school authority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub district_id: DistrictId,
    pub name: String,
    /// Enumerated category such as "public", "separate" or "charter"
    #[serde(rename = "type")]
    pub district_type: String,
    pub website_url: Option<String>,
}

/// A program that schools may offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub program_id: ProgramId,
    pub name: String,
    pub category: Option<String>,
}

/// Optional enrollment classification attached to a school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentStatus {
    pub status_id: i64,
    pub status_name: String,
}

// =============================================================================
// Schools
// =============================================================================

/// A school returned by the nearby search, ranked by distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbySchool {
    pub school_id: SchoolId,
    pub name: String,
    pub address_line: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub enrollment_status: Option<String>,
    /// Distance from the search point in kilometers; null when the store
    /// could not compute one.
    pub distance_km: Option<f64>,
    pub district: District,
}

/// A program offered by one school, with that school's grade range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolProgram {
    pub program_id: ProgramId,
    pub name: String,
    pub category: Option<String>,
    pub grade_min: Option<i32>,
    pub grade_max: Option<i32>,
    pub raw_label: Option<String>,
    pub details_url: Option<String>,
}

/// Full school record with its program offerings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolDetail {
    pub school_id: SchoolId,
    pub name: String,
    pub address_line: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub enrollment_status: Option<String>,
    pub district: District,
    /// Offerings ordered by program name
    pub programs: Vec<SchoolProgram>,
}

// =============================================================================
// Nearby search input
// =============================================================================

/// Lower grade bound assumed when an offering has none.
pub const OPEN_GRADE_MIN: i32 = -1;
/// Upper grade bound assumed when an offering has none.
pub const OPEN_GRADE_MAX: i32 = 99;

pub const DEFAULT_RADIUS_KM: f64 = 5.0;
pub const MIN_RADIUS_KM: f64 = 0.1;
pub const MAX_RADIUS_KM: f64 = 50.0;
pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 200;
pub const MIN_GRADE: i32 = 0;
pub const MAX_GRADE: i32 = 12;

/// Geographic point in decimal degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that the point is a real coordinate on the globe.
    pub fn validate(&self) -> Result<(), String> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err("lat must be between -90 and 90 degrees".to_string());
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err("lng must be between -180 and 180 degrees".to_string());
        }
        Ok(())
    }
}

/// Search parameters for the nearby-schools query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyFilter {
    pub point: GeoPoint,
    pub radius_km: f64,
    /// Exact match on the district's type
    pub district_type: Option<String>,
    /// Require an offering of this program
    pub program_id: Option<ProgramId>,
    /// Require an offering whose grade range contains this grade
    pub grade: Option<i32>,
    pub limit: i64,
}

impl NearbyFilter {
    pub fn new(point: GeoPoint) -> Self {
        Self {
            point,
            radius_km: DEFAULT_RADIUS_KM,
            district_type: None,
            program_id: None,
            grade: None,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    /// Empty strings are treated as no filter.
    pub fn with_district_type(mut self, district_type: impl Into<String>) -> Self {
        let district_type = district_type.into();
        self.district_type = (!district_type.is_empty()).then_some(district_type);
        self
    }

    pub fn with_program(mut self, program_id: ProgramId) -> Self {
        self.program_id = Some(program_id);
        self
    }

    pub fn with_grade(mut self, grade: i32) -> Self {
        self.grade = Some(grade);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Radius converted to meters for the containment predicate.
    pub fn radius_m(&self) -> f64 {
        self.radius_km * 1000.0
    }

    /// Whether the program-offering constraint takes part in the query.
    pub fn needs_offering(&self) -> bool {
        self.program_id.is_some() || self.grade.is_some()
    }

    /// District type to filter on, ignoring empty strings.
    pub fn district_type_filter(&self) -> Option<&str> {
        self.district_type.as_deref().filter(|t| !t.is_empty())
    }

    /// Check every numeric parameter against its declared range.
    pub fn validate(&self) -> Result<(), String> {
        self.point.validate()?;
        if !self.radius_km.is_finite() || !(MIN_RADIUS_KM..=MAX_RADIUS_KM).contains(&self.radius_km)
        {
            return Err(format!(
                "radius_km must be between {} and {}",
                MIN_RADIUS_KM, MAX_RADIUS_KM
            ));
        }
        if let Some(grade) = self.grade {
            if !(MIN_GRADE..=MAX_GRADE).contains(&grade) {
                return Err(format!(
                    "grade must be between {} and {}",
                    MIN_GRADE, MAX_GRADE
                ));
            }
        }
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(format!("limit must be between 1 and {}", MAX_LIMIT));
        }
        Ok(())
    }
}

/// True when `grade` falls inside an offering's inclusive range, treating
/// missing bounds as open.
pub fn grade_in_range(grade: i32, grade_min: Option<i32>, grade_max: Option<i32>) -> bool {
    let lo = grade_min.unwrap_or(OPEN_GRADE_MIN);
    let hi = grade_max.unwrap_or(OPEN_GRADE_MAX);
    lo <= grade && grade <= hi
}

// =============================================================================
// Geocoding
// =============================================================================

/// Top geocoding match for an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calgary() -> GeoPoint {
        GeoPoint::new(51.05, -114.07)
    }

    #[test]
    fn test_ids_serialize_as_plain_integers() {
        assert_eq!(serde_json::to_string(&SchoolId(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&DistrictId(3)).unwrap(), "3");
        let id: ProgramId = serde_json::from_str("7").unwrap();
        assert_eq!(id, ProgramId(7));
    }

    #[test]
    fn test_default_filter_is_valid() {
        let filter = NearbyFilter::new(calgary());
        assert_eq!(filter.radius_km, 5.0);
        assert_eq!(filter.limit, 50);
        assert!(filter.validate().is_ok());
        assert!(!filter.needs_offering());
    }

    #[test]
    fn test_radius_bounds() {
        assert!(NearbyFilter::new(calgary()).with_radius_km(0.1).validate().is_ok());
        assert!(NearbyFilter::new(calgary()).with_radius_km(50.0).validate().is_ok());
        assert!(NearbyFilter::new(calgary()).with_radius_km(0.09).validate().is_err());
        assert!(NearbyFilter::new(calgary()).with_radius_km(50.01).validate().is_err());
        assert!(NearbyFilter::new(calgary())
            .with_radius_km(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_radius_m_conversion() {
        let filter = NearbyFilter::new(calgary()).with_radius_km(2.5);
        assert_eq!(filter.radius_m(), 2500.0);
    }

    #[test]
    fn test_grade_and_limit_bounds() {
        assert!(NearbyFilter::new(calgary()).with_grade(0).validate().is_ok());
        assert!(NearbyFilter::new(calgary()).with_grade(12).validate().is_ok());
        assert!(NearbyFilter::new(calgary()).with_grade(13).validate().is_err());
        assert!(NearbyFilter::new(calgary()).with_grade(-1).validate().is_err());
        assert!(NearbyFilter::new(calgary()).with_limit(0).validate().is_err());
        assert!(NearbyFilter::new(calgary()).with_limit(200).validate().is_ok());
        assert!(NearbyFilter::new(calgary()).with_limit(201).validate().is_err());
    }

    #[test]
    fn test_coordinate_bounds() {
        assert!(GeoPoint::new(90.0, 180.0).validate().is_ok());
        assert!(GeoPoint::new(90.5, 0.0).validate().is_err());
        assert!(GeoPoint::new(0.0, -180.5).validate().is_err());
        assert!(GeoPoint::new(f64::INFINITY, 0.0).validate().is_err());
    }

    #[test]
    fn test_offering_needed_for_program_or_grade() {
        assert!(NearbyFilter::new(calgary())
            .with_program(ProgramId(3))
            .needs_offering());
        assert!(NearbyFilter::new(calgary()).with_grade(4).needs_offering());
    }

    #[test]
    fn test_empty_district_type_is_ignored() {
        let filter = NearbyFilter::new(calgary()).with_district_type("");
        assert!(filter.district_type.is_none());

        let mut raw = NearbyFilter::new(calgary());
        raw.district_type = Some(String::new());
        assert!(raw.district_type_filter().is_none());
    }

    #[test]
    fn test_grade_in_range_open_bounds() {
        assert!(grade_in_range(5, Some(1), Some(6)));
        assert!(grade_in_range(6, Some(1), Some(6)));
        assert!(!grade_in_range(7, Some(1), Some(6)));
        assert!(grade_in_range(0, None, Some(6)));
        assert!(grade_in_range(12, Some(10), None));
        assert!(grade_in_range(3, None, None));
    }

    #[test]
    fn test_district_serializes_type_key() {
        let district = District {
            district_id: DistrictId(1),
            name: "Calgary Board of Education".to_string(),
            district_type: "public".to_string(),
            website_url: None,
        };
        let value = serde_json::to_value(&district).unwrap();
        assert_eq!(value["type"], "public");
        assert_eq!(value["district_id"], 1);
        assert!(value["website_url"].is_null());
    }
}
