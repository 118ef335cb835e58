//! School repository trait for spatial search and detail lookups.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{NearbyFilter, NearbySchool, SchoolDetail, SchoolId, SchoolProgram};

/// Repository trait for school queries.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SchoolRepository: Send + Sync {
    /// Check that the store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Find schools within `filter.radius_km` of `filter.point`.
    ///
    /// Implementations assume the filter has already been validated.
    ///
    /// # Returns
    /// * `Ok(Vec<NearbySchool>)` - At most `filter.limit` schools, closest first
    ///   (ties broken by school id)
    /// * `Err(RepositoryError)` - If the store fails
    async fn nearby_schools(&self, filter: &NearbyFilter) -> RepositoryResult<Vec<NearbySchool>>;

    /// Fetch one school with its district, enrollment status and programs.
    ///
    /// # Returns
    /// * `Ok(SchoolDetail)` - The school, programs ordered by program name
    /// * `Err(RepositoryError::NotFound)` - If no school has this id
    async fn get_school(&self, school_id: SchoolId) -> RepositoryResult<SchoolDetail>;

    /// Fetch the program offerings of one school ordered by program name.
    ///
    /// An unknown school yields an empty list.
    async fn fetch_school_programs(
        &self,
        school_id: SchoolId,
    ) -> RepositoryResult<Vec<SchoolProgram>>;
}
