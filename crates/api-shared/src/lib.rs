//! # API Shared
//!
//! Shared response definitions for the SISREG consultation surfaces.
//!
//! Contains:
//! - JSON response carriers (`responses` module) with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `sisreg` CLI so both print byte-identical bodies.

pub mod health;
pub mod responses;

pub use health::HealthService;
pub use responses::*;
