//! # School Finder Backend
//!
//! Read-only geospatial query service over a small relational dataset of
//! schools, districts and programs.
//!
//! Clients submit a location and optional filters and get back nearby schools
//! ranked by distance, school detail records with their program offerings, and
//! the reference lists of districts and programs. The service also proxies
//! address lookups to an external geocoding provider.
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Domain types shared by every layer (serializable DTOs)
//! - [`db`]: Repository pattern, the nearby-search query composer and the
//!   row shaping that turns flat result rows into nested responses
//! - [`geocode`]: Outbound client for the geocoding provider
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Data flow
//!
//! ```text
//! HTTP request → NearbyFilter::validate → db::query::compose_nearby
//!              → repository executes → db::models shapes rows → JSON
//! ```

// Allow large error types - RepositoryError carries context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;

pub mod geocode;

#[cfg(feature = "http-server")]
pub mod http;
