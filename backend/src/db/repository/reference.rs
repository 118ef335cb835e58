//! Reference data repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{District, Program};

/// Repository trait for the district and program listings.
///
/// Both listings are complete, unpaginated and ordered by name ascending.
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// List every district ordered by name.
    async fn list_districts(&self) -> RepositoryResult<Vec<District>>;

    /// List every program ordered by name.
    async fn list_programs(&self) -> RepositoryResult<Vec<Program>>;
}
