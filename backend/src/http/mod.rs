//! HTTP server module for the school finder API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                              │
//! │  - Query/body extraction and rejection mapping           │
//! │  - CORS allow-list, compression, request tracing         │
//! └───────────────────┬──────────────────────────┬───────────┘
//!                     │                          │
//! ┌───────────────────▼──────────────┐  ┌────────▼───────────┐
//! │  Service Layer (db::services)    │  │  GeocodeClient     │
//! └───────────────────┬──────────────┘  └────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                  │
//! │  - LocalRepository / PostgresRepository                  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, AppError};
pub use router::create_router;
pub use state::AppState;
