//! Flat result rows and their mapping into the nested API shapes.
//!
//! Both repository backends produce these rows; the Postgres backend loads
//! them straight from `sql_query` results by column name.

pub use crate::api::{
    District, DistrictId, NearbySchool, Program, ProgramId, SchoolDetail, SchoolId, SchoolProgram,
};

/// One row of the nearby-search or school-detail query.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "postgres-repo", derive(diesel::QueryableByName))]
pub struct SchoolRow {
    #[cfg_attr(feature = "postgres-repo", diesel(sql_type = diesel::sql_types::BigInt))]
    pub school_id: i64,
    #[cfg_attr(feature = "postgres-repo", diesel(sql_type = diesel::sql_types::Text))]
    pub name: String,
    #[cfg_attr(
        feature = "postgres-repo",
        diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)
    )]
    pub address_line: Option<String>,
    #[cfg_attr(
        feature = "postgres-repo",
        diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)
    )]
    pub postal_code: Option<String>,
    #[cfg_attr(
        feature = "postgres-repo",
        diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)
    )]
    pub phone: Option<String>,
    #[cfg_attr(
        feature = "postgres-repo",
        diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)
    )]
    pub email: Option<String>,
    #[cfg_attr(
        feature = "postgres-repo",
        diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Double>)
    )]
    pub latitude: Option<f64>,
    #[cfg_attr(
        feature = "postgres-repo",
        diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Double>)
    )]
    pub longitude: Option<f64>,
    #[cfg_attr(feature = "postgres-repo", diesel(sql_type = diesel::sql_types::BigInt))]
    pub district_id: i64,
    #[cfg_attr(feature = "postgres-repo", diesel(sql_type = diesel::sql_types::Text))]
    pub district_name: String,
    #[cfg_attr(feature = "postgres-repo", diesel(sql_type = diesel::sql_types::Text))]
    pub district_type: String,
    #[cfg_attr(
        feature = "postgres-repo",
        diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)
    )]
    pub website_url: Option<String>,
    #[cfg_attr(
        feature = "postgres-repo",
        diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)
    )]
    pub enrollment_status: Option<String>,
    #[cfg_attr(
        feature = "postgres-repo",
        diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Double>)
    )]
    pub distance_km: Option<f64>,
}

impl SchoolRow {
    fn district(&self) -> District {
        District {
            district_id: DistrictId(self.district_id),
            name: self.district_name.clone(),
            district_type: self.district_type.clone(),
            website_url: self.website_url.clone(),
        }
    }

    /// Shape a nearby-search row. A null distance stays null.
    pub fn into_nearby(self) -> NearbySchool {
        let district = self.district();
        NearbySchool {
            school_id: SchoolId(self.school_id),
            name: self.name,
            address_line: self.address_line,
            postal_code: self.postal_code,
            phone: self.phone,
            email: self.email,
            latitude: self.latitude,
            longitude: self.longitude,
            enrollment_status: self.enrollment_status,
            distance_km: self.distance_km,
            district,
        }
    }

    /// Shape a detail row, embedding the already ordered program list.
    pub fn into_detail(self, programs: Vec<SchoolProgram>) -> SchoolDetail {
        let district = self.district();
        SchoolDetail {
            school_id: SchoolId(self.school_id),
            name: self.name,
            address_line: self.address_line,
            postal_code: self.postal_code,
            phone: self.phone,
            email: self.email,
            latitude: self.latitude,
            longitude: self.longitude,
            enrollment_status: self.enrollment_status,
            district,
            programs,
        }
    }
}

/// One program offering joined to its program metadata.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "postgres-repo", derive(diesel::QueryableByName))]
pub struct SchoolProgramRow {
    #[cfg_attr(feature = "postgres-repo", diesel(sql_type = diesel::sql_types::BigInt))]
    pub program_id: i64,
    #[cfg_attr(feature = "postgres-repo", diesel(sql_type = diesel::sql_types::Text))]
    pub name: String,
    #[cfg_attr(
        feature = "postgres-repo",
        diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)
    )]
    pub category: Option<String>,
    #[cfg_attr(
        feature = "postgres-repo",
        diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Integer>)
    )]
    pub grade_min: Option<i32>,
    #[cfg_attr(
        feature = "postgres-repo",
        diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Integer>)
    )]
    pub grade_max: Option<i32>,
    #[cfg_attr(
        feature = "postgres-repo",
        diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)
    )]
    pub raw_label: Option<String>,
    #[cfg_attr(
        feature = "postgres-repo",
        diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)
    )]
    pub details_url: Option<String>,
}

impl From<SchoolProgramRow> for SchoolProgram {
    fn from(row: SchoolProgramRow) -> Self {
        SchoolProgram {
            program_id: ProgramId(row.program_id),
            name: row.name,
            category: row.category,
            grade_min: row.grade_min,
            grade_max: row.grade_max,
            raw_label: row.raw_label,
            details_url: row.details_url,
        }
    }
}
