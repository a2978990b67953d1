//! Outbound ports - Interfaces that the application requires from external systems

mod generation_port;
mod repository_port;

pub use generation_port::{
    parse_structured, GeneratedImage, GenerationError, GenerationPort, ImageHandle,
    ResponseFormat, StructuredResponse,
};
pub use repository_port::{CreatureRepositoryPort, RepositoryError};
