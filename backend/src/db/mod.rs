//! Database module for school, district and program data.
//!
//! Storage is reached through the Repository pattern so the PostGIS backend
//! and the in-memory backend are interchangeable.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers (crate::http)                            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - Filter validation                                    │
//! │  - Search logging                                       │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────┬───────────────────────────────┬─────────────┘
//!             │                               │
//! ┌───────────▼──────────────┐   ┌────────────▼─────────────┐
//! │  Postgres Repository     │   │  Local Repository        │
//! │  (query.rs + Diesel)     │   │  (in-memory, haversine)  │
//! └──────────────────────────┘   └──────────────────────────┘
//! ```
//!
//! # Usage
//! ```ignore
//! use school_finder::api::{GeoPoint, NearbyFilter};
//! use school_finder::db::{services, RepositoryFactory};
//!
//! let repo = RepositoryFactory::from_env().await?;
//! let filter = NearbyFilter::new(GeoPoint::new(51.05, -114.07)).with_grade(7);
//! let schools = services::nearby_schools(repo.as_ref(), &filter).await?;
//! ```

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod models;
pub mod query;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

// Postgres config is colocated with the repository implementation.
#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::PostgresConfig;
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

// ==================== Service Layer ====================

pub use services::{
    health_check, list_districts, list_programs, nearby_schools, school_detail,
};

// ==================== Repository Pattern Exports ====================

pub use factory::{RepositoryFactory, RepositoryType};
pub use query::{compose_nearby, BindValue, ComposedQuery};
pub use repo_config::RepositoryConfig;
pub use repositories::{LocalDataset, LocalRepository, LocalSchool, LocalSchoolProgram};
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    ErrorContext, FullRepository, ReferenceRepository, RepositoryError, RepositoryResult,
    SchoolRepository,
};
