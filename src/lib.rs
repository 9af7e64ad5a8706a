//! Community registration service.
//!
//! Accepts member submissions over HTTP, validates and normalizes them,
//! persists them in a record store, and exposes an authenticated admin
//! surface for listing, aggregate statistics, and CSV export.

pub mod config;
pub mod error;
pub mod registry;
pub mod telemetry;
