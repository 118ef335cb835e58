//! Property tests for the nearby-search invariants over the in-memory backend.

mod support;

use std::collections::HashSet;

use proptest::prelude::*;
use school_finder::api::{
    grade_in_range, District, DistrictId, GeoPoint, NearbyFilter, Program, ProgramId,
};
use school_finder::db::{LocalRepository, LocalSchool, LocalSchoolProgram, SchoolRepository};

const DISTRICT_TYPES: [&str; 3] = ["public", "separate", "charter"];

type Offering = (i64, Option<i32>, Option<i32>);
type SchoolSpec = (f64, f64, i64, Vec<Offering>);

fn arb_school() -> impl Strategy<Value = SchoolSpec> {
    (
        -0.5f64..0.5,
        -0.7f64..0.7,
        1i64..=3,
        prop::collection::vec(
            (
                1i64..=3,
                prop::option::of(0i32..=12),
                prop::option::of(0i32..=12),
            ),
            0..3,
        ),
    )
}

fn arb_filter() -> impl Strategy<Value = NearbyFilter> {
    (
        0.1f64..=50.0,
        prop::option::of(0usize..3),
        prop::option::of(1i64..=3),
        prop::option::of(0i32..=12),
        1i64..=200,
    )
        .prop_map(|(radius_km, district_type, program_id, grade, limit)| {
            let mut filter = NearbyFilter::new(support::ORIGIN)
                .with_radius_km(radius_km)
                .with_limit(limit);
            if let Some(i) = district_type {
                filter = filter.with_district_type(DISTRICT_TYPES[i]);
            }
            if let Some(p) = program_id {
                filter = filter.with_program(ProgramId(p));
            }
            if let Some(g) = grade {
                filter = filter.with_grade(g);
            }
            filter
        })
}

fn build_repository(schools: &[SchoolSpec]) -> LocalRepository {
    let repo = LocalRepository::new();
    for (i, district_type) in DISTRICT_TYPES.iter().enumerate() {
        let id = i as i64 + 1;
        repo.insert_district(District {
            district_id: DistrictId(id),
            name: format!("District {}", id),
            district_type: district_type.to_string(),
            website_url: None,
        });
        repo.insert_program(Program {
            program_id: ProgramId(id),
            name: format!("Program {}", id),
            category: None,
        });
    }

    for (i, (dlat, dlng, district_id, offerings)) in schools.iter().enumerate() {
        let school_id = i as i64 + 1;
        let point = GeoPoint::new(support::ORIGIN.lat + dlat, support::ORIGIN.lng + dlng);
        repo.insert_school(
            LocalSchool::new(school_id, format!("School {}", school_id), *district_id)
                .at(point.lat, point.lng),
        );
        for (program_id, grade_min, grade_max) in offerings {
            repo.insert_offering(
                LocalSchoolProgram::new(school_id, *program_id).grades(*grade_min, *grade_max),
            );
        }
    }
    repo
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn nearby_results_respect_filter(
        schools in prop::collection::vec(arb_school(), 0..40),
        filter in arb_filter(),
    ) {
        let repo = build_repository(&schools);
        let results = support::block_on(repo.nearby_schools(&filter)).unwrap();

        prop_assert!(results.len() as i64 <= filter.limit);

        let mut seen = HashSet::new();
        let mut previous = 0.0f64;
        for school in &results {
            prop_assert!(seen.insert(school.school_id), "duplicate {}", school.school_id);

            let distance = school.distance_km.unwrap();
            prop_assert!(distance >= 0.0);
            prop_assert!(distance <= filter.radius_km + 1e-9);
            prop_assert!(distance >= previous);
            previous = distance;

            if let Some(district_type) = filter.district_type_filter() {
                prop_assert_eq!(school.district.district_type.as_str(), district_type);
            }

            if filter.needs_offering() {
                let programs =
                    support::block_on(repo.fetch_school_programs(school.school_id)).unwrap();
                let satisfied = programs.iter().any(|p| {
                    filter.program_id.map_or(true, |id| p.program_id == id)
                        && filter
                            .grade
                            .map_or(true, |g| grade_in_range(g, p.grade_min, p.grade_max))
                });
                prop_assert!(satisfied, "school {} has no matching offering", school.school_id);
            }
        }
    }

    #[test]
    fn limit_keeps_the_closest_prefix(
        schools in prop::collection::vec(arb_school(), 0..40),
        filter in arb_filter(),
    ) {
        let repo = build_repository(&schools);
        let limited = support::block_on(repo.nearby_schools(&filter)).unwrap();
        let unlimited =
            support::block_on(repo.nearby_schools(&filter.clone().with_limit(200))).unwrap();

        let expected = unlimited.len().min(filter.limit as usize);
        prop_assert_eq!(limited.len(), expected);
        prop_assert_eq!(&limited[..], &unlimited[..expected]);
    }

    #[test]
    fn equal_distances_are_ordered_by_id(
        copies in 2usize..6,
        dlat in -0.02f64..0.02,
    ) {
        let schools: Vec<SchoolSpec> = (0..copies).map(|_| (dlat, 0.0, 1, vec![])).collect();
        let repo = build_repository(&schools);

        let filter = NearbyFilter::new(support::ORIGIN).with_radius_km(5.0);
        let results = support::block_on(repo.nearby_schools(&filter)).unwrap();
        let ids: Vec<i64> = results.iter().map(|s| s.school_id.value()).collect();
        let expected: Vec<i64> = (1..=copies as i64).collect();
        prop_assert_eq!(ids, expected);
    }
}
