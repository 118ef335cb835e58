#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use school_finder::api::{
    District, DistrictId, EnrollmentStatus, GeoPoint, Program, ProgramId,
};
use school_finder::db::{LocalRepository, LocalSchool, LocalSchoolProgram};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on unwind and serializes access to the
/// process environment across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

/// Runs an async block to completion on a fresh runtime, for use inside
/// [`with_scoped_env`].
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Fixture dataset
// =============================================================================

/// Search origin in downtown Calgary. Fixture schools sit due north of it, so
/// 0.009 degrees of latitude is roughly one kilometre.
pub const ORIGIN: GeoPoint = GeoPoint {
    lat: 51.0447,
    lng: -114.0719,
};

pub const FRENCH_IMMERSION: ProgramId = ProgramId(1);
pub const INTERNATIONAL_BACCALAUREATE: ProgramId = ProgramId(2);
pub const SPORTS_ACADEMY: ProgramId = ProgramId(3);

fn north_of_origin(km: f64) -> (f64, f64) {
    (ORIGIN.lat + km * 0.009, ORIGIN.lng)
}

fn district(id: i64, name: &str, district_type: &str, website_url: Option<&str>) -> District {
    District {
        district_id: DistrictId(id),
        name: name.to_string(),
        district_type: district_type.to_string(),
        website_url: website_url.map(str::to_string),
    }
}

fn program(id: ProgramId, name: &str, category: Option<&str>) -> Program {
    Program {
        program_id: id,
        name: name.to_string(),
        category: category.map(str::to_string),
    }
}

fn school_at(id: i64, name: &str, district_id: i64, km_north: f64) -> LocalSchool {
    let (lat, lng) = north_of_origin(km_north);
    LocalSchool::new(id, name, district_id).at(lat, lng)
}

/// Seeded repository shared by the integration tests.
///
/// | id  | school                 | district | km  | offerings                         |
/// |-----|------------------------|----------|-----|-----------------------------------|
/// | 100 | Central Memorial       | public   | 0   | French 0-6, IB 10-12              |
/// | 101 | St. Mary's High School | separate | 1   | French 7-9                        |
/// | 106 | Twin Site Elementary   | public   | 1   | French 0-3, Sports open           |
/// | 102 | Western Canada High    | public   | 2   | IB with no bounds                 |
/// | 103 | Foothills Academy      | charter  | 4   | Sports 4 and up                   |
/// | 104 | Bishop Carroll High    | separate | 10  | none                              |
/// | 105 | Unmapped School        | public   | -   | French 0-12 (no geometry)         |
pub fn seeded_repository() -> LocalRepository {
    let repo = LocalRepository::new();

    repo.insert_district(district(
        1,
        "Calgary Board of Education",
        "public",
        Some("https://cbe.ab.ca"),
    ));
    repo.insert_district(district(
        2,
        "Calgary Catholic School District",
        "separate",
        Some("https://www.cssd.ab.ca"),
    ));
    repo.insert_district(district(3, "Foothills Academy Society", "charter", None));

    repo.insert_program(program(FRENCH_IMMERSION, "French Immersion", Some("language")));
    repo.insert_program(program(
        INTERNATIONAL_BACCALAUREATE,
        "International Baccalaureate",
        Some("academic"),
    ));
    repo.insert_program(program(SPORTS_ACADEMY, "Sports Academy", None));

    repo.insert_enrollment_status(EnrollmentStatus {
        status_id: 1,
        status_name: "Open".to_string(),
    });
    repo.insert_enrollment_status(EnrollmentStatus {
        status_id: 2,
        status_name: "Waitlist".to_string(),
    });

    repo.insert_school(
        school_at(100, "Central Memorial", 1, 0.0)
            .with_address("5111 21 St SW", "T3E 1R9")
            .with_contact("403-777-6380", "centralmemorial@cbe.ab.ca")
            .with_enrollment_status(1),
    );
    repo.insert_school(school_at(101, "St. Mary's High School", 2, 1.0).with_enrollment_status(2));
    repo.insert_school(school_at(106, "Twin Site Elementary", 1, 1.0));
    repo.insert_school(school_at(102, "Western Canada High", 1, 2.0));
    repo.insert_school(school_at(103, "Foothills Academy", 3, 4.0));
    repo.insert_school(school_at(104, "Bishop Carroll High", 2, 10.0));
    repo.insert_school(LocalSchool::new(105, "Unmapped School", 1));

    repo.insert_offering(
        LocalSchoolProgram::new(100, FRENCH_IMMERSION.value())
            .grades(Some(0), Some(6))
            .labelled("French Immersion (K-6)"),
    );
    repo.insert_offering(
        LocalSchoolProgram::new(100, INTERNATIONAL_BACCALAUREATE.value())
            .grades(Some(10), Some(12)),
    );
    repo.insert_offering(
        LocalSchoolProgram::new(101, FRENCH_IMMERSION.value()).grades(Some(7), Some(9)),
    );
    repo.insert_offering(
        LocalSchoolProgram::new(106, FRENCH_IMMERSION.value()).grades(Some(0), Some(3)),
    );
    repo.insert_offering(LocalSchoolProgram::new(106, SPORTS_ACADEMY.value()));
    repo.insert_offering(LocalSchoolProgram::new(
        102,
        INTERNATIONAL_BACCALAUREATE.value(),
    ));
    repo.insert_offering(
        LocalSchoolProgram::new(103, SPORTS_ACADEMY.value()).grades(Some(4), None),
    );
    repo.insert_offering(
        LocalSchoolProgram::new(105, FRENCH_IMMERSION.value()).grades(Some(0), Some(12)),
    );

    repo
}
