//! Application layer - Use cases and orchestration
//!
//! This layer contains:
//! - Ports: generation backend and creature repository interfaces
//! - Services: creature management, asset directories, generation stages,
//!   sprite fan-out and the creation pipeline
//! - DTOs: request/response shapes shared with the HTTP layer

pub mod dto;
pub mod ports;
pub mod services;
