//! SQL composition for the spatial school queries.
//!
//! The nearby search is assembled from a fixed set of `&'static str`
//! fragments chosen by which optional filters are active. Values never reach
//! the SQL text: each one is recorded as a [`BindValue`] and referenced by a
//! positional placeholder (`$1`, `$2`, ...), in the order the placeholders
//! appear.
//!
//! # Schema contract
//!
//! ```text
//! schools(school_id, name, address_line, postal_code, phone, email,
//!         latitude, longitude, geom geography(Point, 4326),
//!         enrollment_status_id -> enrollment_statuses, district_id -> districts)
//! districts(district_id, name, type, website_url)
//! enrollment_statuses(status_id, status_name)
//! programs(program_id, name, category)
//! school_programs(school_id, program_id, grade_min, grade_max, raw_label, details_url)
//! ```
//!
//! Distances come back from the store in meters over the WGS84 geography and
//! are divided by 1000 in the select list.

use crate::api::NearbyFilter;

/// A value bound to one positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Float(f64),
    Int(i32),
    BigInt(i64),
    Text(String),
}

/// SQL text plus its binds in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedQuery {
    pub sql: String,
    pub binds: Vec<BindValue>,
}

impl ComposedQuery {
    /// Number of placeholders referenced by the SQL.
    pub fn placeholder_count(&self) -> usize {
        self.binds.len()
    }
}

/// Accumulates fragments and numbers placeholders as binds are pushed.
struct SqlBuilder {
    sql: String,
    binds: Vec<BindValue>,
}

impl SqlBuilder {
    fn new(base: &'static str) -> Self {
        Self {
            sql: base.to_string(),
            binds: Vec::new(),
        }
    }

    fn push(&mut self, fragment: &'static str) -> &mut Self {
        self.sql.push_str(fragment);
        self
    }

    fn push_bind(&mut self, value: BindValue) -> &mut Self {
        self.binds.push(value);
        self.sql.push('$');
        self.sql.push_str(&self.binds.len().to_string());
        self
    }

    fn finish(self) -> ComposedQuery {
        ComposedQuery {
            sql: self.sql,
            binds: self.binds,
        }
    }
}

const SCHOOL_COLUMNS: &str = "SELECT \
s.school_id, s.name, s.address_line, s.postal_code, s.phone, s.email, \
s.latitude, s.longitude, \
d.district_id, d.name AS district_name, d.type AS district_type, d.website_url, \
es.status_name AS enrollment_status";

const SCHOOL_JOINS: &str = " FROM schools s \
JOIN districts d ON d.district_id = s.district_id \
LEFT JOIN enrollment_statuses es ON es.status_id = s.enrollment_status_id";

/// Search point; binds are longitude then latitude.
const USER_POINT_OPEN: &str = " CROSS JOIN (SELECT ST_SetSRID(ST_MakePoint(";
const USER_POINT_CLOSE: &str = "), 4326)::geography AS user_pt) p";

const DISTANCE_COLUMN: &str = ", (ST_Distance(s.geom, p.user_pt) / 1000.0) AS distance_km";

const WITHIN_RADIUS: &str = " WHERE s.geom IS NOT NULL AND ST_DWithin(s.geom, p.user_pt, ";

const DISTRICT_TYPE_FILTER: &str = " AND d.type = ";

// A single offering must satisfy every offering-level condition.
const OFFERING_OPEN: &str = " AND EXISTS (SELECT 1 FROM school_programs sp \
WHERE sp.school_id = s.school_id";
const OFFERING_PROGRAM_FILTER: &str = " AND sp.program_id = ";
const OFFERING_GRADE_FILTER: &str =
    " BETWEEN COALESCE(sp.grade_min, -1) AND COALESCE(sp.grade_max, 99)";
const OFFERING_CLOSE: &str = ")";

const NEARBY_ORDER: &str = " ORDER BY distance_km ASC, s.school_id ASC LIMIT ";

/// Build the nearby-schools query for an already validated filter.
///
/// Placeholder order: longitude, latitude, radius in meters, then the
/// district type, program id and grade when present, and the limit last.
pub fn compose_nearby(filter: &NearbyFilter) -> ComposedQuery {
    let mut q = SqlBuilder::new(SCHOOL_COLUMNS);
    q.push(DISTANCE_COLUMN).push(SCHOOL_JOINS);

    q.push(USER_POINT_OPEN)
        .push_bind(BindValue::Float(filter.point.lng))
        .push(", ")
        .push_bind(BindValue::Float(filter.point.lat))
        .push(USER_POINT_CLOSE);

    q.push(WITHIN_RADIUS)
        .push_bind(BindValue::Float(filter.radius_m()))
        .push(")");

    if let Some(district_type) = filter.district_type_filter() {
        q.push(DISTRICT_TYPE_FILTER)
            .push_bind(BindValue::Text(district_type.to_string()));
    }

    if filter.needs_offering() {
        q.push(OFFERING_OPEN);
        if let Some(program_id) = filter.program_id {
            q.push(OFFERING_PROGRAM_FILTER)
                .push_bind(BindValue::BigInt(program_id.value()));
        }
        if let Some(grade) = filter.grade {
            q.push(" AND ")
                .push_bind(BindValue::Int(grade))
                .push(OFFERING_GRADE_FILTER);
        }
        q.push(OFFERING_CLOSE);
    }

    q.push(NEARBY_ORDER).push_bind(BindValue::BigInt(filter.limit));
    q.finish()
}

/// School row by id, without any spatial predicate. Bind: `$1` school id.
pub const SCHOOL_DETAIL_SQL: &str = concat!(
    "SELECT ",
    "s.school_id, s.name, s.address_line, s.postal_code, s.phone, s.email, ",
    "s.latitude, s.longitude, ",
    "d.district_id, d.name AS district_name, d.type AS district_type, d.website_url, ",
    "es.status_name AS enrollment_status, ",
    "CAST(NULL AS DOUBLE PRECISION) AS distance_km ",
    "FROM schools s ",
    "JOIN districts d ON d.district_id = s.district_id ",
    "LEFT JOIN enrollment_statuses es ON es.status_id = s.enrollment_status_id ",
    "WHERE s.school_id = $1"
);

/// Program offerings of one school ordered by program name. Bind: `$1` school id.
pub const SCHOOL_PROGRAMS_SQL: &str = concat!(
    "SELECT p.program_id, p.name, p.category, ",
    "sp.grade_min, sp.grade_max, sp.raw_label, sp.details_url ",
    "FROM school_programs sp ",
    "JOIN programs p ON p.program_id = sp.program_id ",
    "WHERE sp.school_id = $1 ",
    "ORDER BY p.name ASC, p.program_id ASC"
);

/// Short human-readable description of a filter for log lines.
pub fn describe_filter(filter: &NearbyFilter) -> String {
    let mut parts = vec![
        format!("lat={}", filter.point.lat),
        format!("lng={}", filter.point.lng),
        format!("radius_km={}", filter.radius_km),
    ];
    if let Some(t) = filter.district_type_filter() {
        parts.push(format!("district_type={}", t));
    }
    if let Some(p) = filter.program_id {
        parts.push(format!("program_id={}", p));
    }
    if let Some(g) = filter.grade {
        parts.push(format!("grade={}", g));
    }
    parts.push(format!("limit={}", filter.limit));
    parts.join(" ")
}
