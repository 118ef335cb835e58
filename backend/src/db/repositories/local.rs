//! In-memory repository for unit testing and local development.
//!
//! Implements the same search semantics as the Postgres backend: inner join
//! to districts, optional enrollment status, one offering satisfying both
//! program and grade filters, great-circle distance on a spherical Earth,
//! ordering by distance then school id, and the result limit.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::api::{
    grade_in_range, District, DistrictId, EnrollmentStatus, GeoPoint, NearbyFilter, NearbySchool,
    Program, ProgramId, SchoolDetail, SchoolId, SchoolProgram,
};
use crate::db::models::SchoolRow;
use crate::db::repository::{
    ErrorContext, ReferenceRepository, RepositoryError, RepositoryResult, SchoolRepository,
};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance in meters between two points.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// A school as stored in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSchool {
    pub school_id: SchoolId,
    pub name: String,
    #[serde(default)]
    pub address_line: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Point geometry; derived from latitude/longitude when omitted in a seed file.
    #[serde(default)]
    pub geom: Option<GeoPoint>,
    #[serde(default)]
    pub enrollment_status_id: Option<i64>,
    pub district_id: DistrictId,
}

impl LocalSchool {
    /// A school without coordinates.
    pub fn new(school_id: i64, name: impl Into<String>, district_id: i64) -> Self {
        Self {
            school_id: SchoolId(school_id),
            name: name.into(),
            address_line: None,
            postal_code: None,
            phone: None,
            email: None,
            latitude: None,
            longitude: None,
            geom: None,
            enrollment_status_id: None,
            district_id: DistrictId(district_id),
        }
    }

    /// Place the school, keeping geometry consistent with latitude/longitude.
    pub fn at(mut self, lat: f64, lng: f64) -> Self {
        self.latitude = Some(lat);
        self.longitude = Some(lng);
        self.geom = Some(GeoPoint::new(lat, lng));
        self
    }

    pub fn with_address(
        mut self,
        address_line: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        self.address_line = Some(address_line.into());
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn with_contact(mut self, phone: impl Into<String>, email: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self.email = Some(email.into());
        self
    }

    pub fn with_enrollment_status(mut self, status_id: i64) -> Self {
        self.enrollment_status_id = Some(status_id);
        self
    }
}

/// A program offering of one school.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSchoolProgram {
    pub school_id: SchoolId,
    pub program_id: ProgramId,
    #[serde(default)]
    pub grade_min: Option<i32>,
    #[serde(default)]
    pub grade_max: Option<i32>,
    #[serde(default)]
    pub raw_label: Option<String>,
    #[serde(default)]
    pub details_url: Option<String>,
}

impl LocalSchoolProgram {
    pub fn new(school_id: i64, program_id: i64) -> Self {
        Self {
            school_id: SchoolId(school_id),
            program_id: ProgramId(program_id),
            grade_min: None,
            grade_max: None,
            raw_label: None,
            details_url: None,
        }
    }

    pub fn grades(mut self, grade_min: Option<i32>, grade_max: Option<i32>) -> Self {
        self.grade_min = grade_min;
        self.grade_max = grade_max;
        self
    }

    pub fn labelled(mut self, raw_label: impl Into<String>) -> Self {
        self.raw_label = Some(raw_label.into());
        self
    }
}

/// Serializable snapshot of the whole dataset, used for seed files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalDataset {
    #[serde(default)]
    pub districts: Vec<District>,
    #[serde(default)]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub enrollment_statuses: Vec<EnrollmentStatus>,
    #[serde(default)]
    pub schools: Vec<LocalSchool>,
    #[serde(default)]
    pub school_programs: Vec<LocalSchoolProgram>,
}

#[derive(Debug, Default)]
struct LocalState {
    districts: HashMap<DistrictId, District>,
    programs: HashMap<ProgramId, Program>,
    statuses: HashMap<i64, EnrollmentStatus>,
    schools: HashMap<SchoolId, LocalSchool>,
    offerings: HashMap<(SchoolId, ProgramId), LocalSchoolProgram>,
}

impl LocalState {
    fn school_row(&self, school: &LocalSchool, distance_km: Option<f64>) -> Option<SchoolRow> {
        let district = self.districts.get(&school.district_id)?;
        let enrollment_status = school
            .enrollment_status_id
            .and_then(|id| self.statuses.get(&id))
            .map(|s| s.status_name.clone());

        Some(SchoolRow {
            school_id: school.school_id.value(),
            name: school.name.clone(),
            address_line: school.address_line.clone(),
            postal_code: school.postal_code.clone(),
            phone: school.phone.clone(),
            email: school.email.clone(),
            latitude: school.latitude,
            longitude: school.longitude,
            district_id: district.district_id.value(),
            district_name: district.name.clone(),
            district_type: district.district_type.clone(),
            website_url: district.website_url.clone(),
            enrollment_status,
            distance_km,
        })
    }

    fn has_matching_offering(&self, school_id: SchoolId, filter: &NearbyFilter) -> bool {
        self.offerings.values().any(|o| {
            o.school_id == school_id
                && filter.program_id.map_or(true, |p| o.program_id == p)
                && filter
                    .grade
                    .map_or(true, |g| grade_in_range(g, o.grade_min, o.grade_max))
        })
    }

    fn school_programs(&self, school_id: SchoolId) -> Vec<SchoolProgram> {
        let mut programs: Vec<SchoolProgram> = self
            .offerings
            .values()
            .filter(|o| o.school_id == school_id)
            .filter_map(|o| {
                let program = self.programs.get(&o.program_id)?;
                Some(SchoolProgram {
                    program_id: program.program_id,
                    name: program.name.clone(),
                    category: program.category.clone(),
                    grade_min: o.grade_min,
                    grade_max: o.grade_max,
                    raw_label: o.raw_label.clone(),
                    details_url: o.details_url.clone(),
                })
            })
            .collect();
        programs.sort_by(|a, b| a.name.cmp(&b.name).then(a.program_id.cmp(&b.program_id)));
        programs
    }
}

/// In-memory repository guarded by a read/write lock.
#[derive(Debug, Clone, Default)]
pub struct LocalRepository {
    state: Arc<RwLock<LocalState>>,
}

impl LocalRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding `dataset`.
    pub fn from_dataset(dataset: LocalDataset) -> Self {
        let repo = Self::new();
        repo.load_dataset(dataset);
        repo
    }

    /// Create a repository from a JSON seed file.
    ///
    /// # Returns
    /// * `Ok(LocalRepository)` if the file was read and parsed
    /// * `Err(RepositoryError::ConfigurationError)` otherwise
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to read seed file: {}", e),
                ErrorContext::new("load_seed").with_details(path.display().to_string()),
            )
        })?;
        let dataset: LocalDataset = serde_json::from_str(&content).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to parse seed file: {}", e),
                ErrorContext::new("load_seed").with_details(path.display().to_string()),
            )
        })?;
        Ok(Self::from_dataset(dataset))
    }

    /// Insert every entity of `dataset`, replacing entries with the same id.
    pub fn load_dataset(&self, dataset: LocalDataset) {
        for district in dataset.districts {
            self.insert_district(district);
        }
        for program in dataset.programs {
            self.insert_program(program);
        }
        for status in dataset.enrollment_statuses {
            self.insert_enrollment_status(status);
        }
        for mut school in dataset.schools {
            if school.geom.is_none() {
                if let (Some(lat), Some(lng)) = (school.latitude, school.longitude) {
                    school.geom = Some(GeoPoint::new(lat, lng));
                }
            }
            self.insert_school(school);
        }
        for offering in dataset.school_programs {
            self.insert_offering(offering);
        }
    }

    pub fn insert_district(&self, district: District) {
        self.state.write().districts.insert(district.district_id, district);
    }

    pub fn insert_program(&self, program: Program) {
        self.state.write().programs.insert(program.program_id, program);
    }

    pub fn insert_enrollment_status(&self, status: EnrollmentStatus) {
        self.state.write().statuses.insert(status.status_id, status);
    }

    pub fn insert_school(&self, school: LocalSchool) {
        self.state.write().schools.insert(school.school_id, school);
    }

    pub fn insert_offering(&self, offering: LocalSchoolProgram) {
        self.state
            .write()
            .offerings
            .insert((offering.school_id, offering.program_id), offering);
    }

    /// Number of schools held, with or without geometry.
    pub fn school_count(&self) -> usize {
        self.state.read().schools.len()
    }
}

#[async_trait]
impl SchoolRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }

    async fn nearby_schools(&self, filter: &NearbyFilter) -> RepositoryResult<Vec<NearbySchool>> {
        let state = self.state.read();
        let radius_m = filter.radius_m();
        let district_type = filter.district_type_filter();

        let mut hits: Vec<(f64, SchoolRow)> = state
            .schools
            .values()
            .filter_map(|school| {
                let geom = school.geom?;
                let distance_m = haversine_m(geom, filter.point);
                if distance_m > radius_m {
                    return None;
                }
                if filter.needs_offering() && !state.has_matching_offering(school.school_id, filter)
                {
                    return None;
                }
                let row = state.school_row(school, Some(distance_m / 1000.0))?;
                if district_type.is_some_and(|t| row.district_type != t) {
                    return None;
                }
                Some((distance_m, row))
            })
            .collect();

        hits.sort_by(|(da, a), (db, b)| da.total_cmp(db).then(a.school_id.cmp(&b.school_id)));
        hits.truncate(usize::try_from(filter.limit).unwrap_or(0));

        Ok(hits.into_iter().map(|(_, row)| row.into_nearby()).collect())
    }

    async fn get_school(&self, school_id: SchoolId) -> RepositoryResult<SchoolDetail> {
        let state = self.state.read();
        let not_found = || {
            RepositoryError::not_found_with_context(
                "School not found",
                ErrorContext::new("get_school")
                    .with_entity("school")
                    .with_entity_id(school_id),
            )
        };

        let school = state.schools.get(&school_id).ok_or_else(not_found)?;
        let row = state.school_row(school, None).ok_or_else(not_found)?;
        Ok(row.into_detail(state.school_programs(school_id)))
    }

    async fn fetch_school_programs(
        &self,
        school_id: SchoolId,
    ) -> RepositoryResult<Vec<SchoolProgram>> {
        Ok(self.state.read().school_programs(school_id))
    }
}

#[async_trait]
impl ReferenceRepository for LocalRepository {
    async fn list_districts(&self) -> RepositoryResult<Vec<District>> {
        let mut districts: Vec<District> = self.state.read().districts.values().cloned().collect();
        districts.sort_by(|a, b| a.name.cmp(&b.name).then(a.district_id.cmp(&b.district_id)));
        Ok(districts)
    }

    async fn list_programs(&self) -> RepositoryResult<Vec<Program>> {
        let mut programs: Vec<Program> = self.state.read().programs.values().cloned().collect();
        programs.sort_by(|a, b| a.name.cmp(&b.name).then(a.program_id.cmp(&b.program_id)));
        Ok(programs)
    }
}
