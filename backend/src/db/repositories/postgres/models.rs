use diesel::prelude::*;

use super::schema::{districts, programs};
use crate::api::{District, DistrictId, Program, ProgramId};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = districts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DistrictRow {
    pub district_id: i64,
    pub name: String,
    pub district_type: String,
    pub website_url: Option<String>,
}

impl From<DistrictRow> for District {
    fn from(row: DistrictRow) -> Self {
        District {
            district_id: DistrictId(row.district_id),
            name: row.name,
            district_type: row.district_type,
            website_url: row.website_url,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = programs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProgramRow {
    pub program_id: i64,
    pub name: String,
    pub category: Option<String>,
}

impl From<ProgramRow> for Program {
    fn from(row: ProgramRow) -> Self {
        Program {
            program_id: ProgramId(row.program_id),
            name: row.name,
            category: row.category,
        }
    }
}
