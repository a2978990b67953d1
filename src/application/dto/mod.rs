//! Data Transfer Objects - For API boundaries
//!
//! DTOs live in the application layer so infrastructure (HTTP) can
//! serialize/deserialize without pulling wire concerns into the domain model.

pub mod creature;

pub use creature::*;
