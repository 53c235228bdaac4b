//! API client library for popcorn.
//!
//! Provides typed route controllers for the popcorn media catalog API.

/// Popcorn catalog API client.
pub mod catalog;
