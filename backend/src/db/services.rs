//! Service layer: request validation and logging over any repository.
//!
//! HTTP handlers call these functions rather than the repository traits
//! directly, so both backends see identical input checks.

use tracing::{debug, info};

use crate::api::{District, NearbyFilter, NearbySchool, Program, SchoolDetail, SchoolId};
use crate::db::query::describe_filter;
use crate::db::repository::{
    ErrorContext, ReferenceRepository, RepositoryError, RepositoryResult, SchoolRepository,
};

/// Check that the backing store is reachable.
pub async fn health_check<R: SchoolRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

/// Find schools within the filter radius, nearest first.
///
/// # Errors
/// * `ValidationError` when coordinates, radius, grade or limit are out of range
/// * any repository failure, unchanged
pub async fn nearby_schools<R: SchoolRepository + ?Sized>(
    repo: &R,
    filter: &NearbyFilter,
) -> RepositoryResult<Vec<NearbySchool>> {
    filter.validate().map_err(|message| {
        RepositoryError::validation_with_context(
            message,
            ErrorContext::new("nearby_schools").with_details(describe_filter(filter)),
        )
    })?;

    let schools = repo.nearby_schools(filter).await?;
    info!(
        filter = %describe_filter(filter),
        results = schools.len(),
        "Nearby search complete"
    );
    Ok(schools)
}

/// Full profile of one school including its ordered program offerings.
pub async fn school_detail<R: SchoolRepository + ?Sized>(
    repo: &R,
    school_id: SchoolId,
) -> RepositoryResult<SchoolDetail> {
    let detail = repo.get_school(school_id).await?;
    debug!(
        school_id = %school_id,
        programs = detail.programs.len(),
        "Loaded school detail"
    );
    Ok(detail)
}

/// All districts ordered by name.
pub async fn list_districts<R: ReferenceRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Vec<District>> {
    repo.list_districts().await
}

/// All programs ordered by name.
pub async fn list_programs<R: ReferenceRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Vec<Program>> {
    repo.list_programs().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GeoPoint;
    use crate::db::repositories::LocalRepository;

    #[tokio::test]
    async fn test_invalid_filter_is_rejected_before_query() {
        let repo = LocalRepository::new();
        let filter = NearbyFilter::new(GeoPoint::new(51.0, -114.0)).with_radius_km(80.0);

        let err = nearby_schools(&repo, &filter).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.context().operation.as_deref(), Some("nearby_schools"));
    }

    #[tokio::test]
    async fn test_missing_school_is_not_found() {
        let repo = LocalRepository::new();
        let err = school_detail(&repo, SchoolId(404)).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message(), "School not found");
    }
}
