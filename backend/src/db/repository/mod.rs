//! Repository traits for school data access.
//!
//! The traits are split by concern the same way the HTTP surface is:
//! - [`SchoolRepository`]: nearby search and school detail
//! - [`ReferenceRepository`]: district and program listings
//!
//! [`FullRepository`] combines both and is what the application holds.

mod error;
mod reference;
mod school;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use reference::ReferenceRepository;
pub use school::SchoolRepository;

/// Every capability the HTTP layer needs from a store.
pub trait FullRepository: SchoolRepository + ReferenceRepository {}

impl<T> FullRepository for T where T: SchoolRepository + ReferenceRepository {}
