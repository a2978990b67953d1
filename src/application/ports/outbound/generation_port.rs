//! Generation port - Interface to the external text and image models
//!
//! Text calls ask for a named JSON schema and hand back the raw JSON value;
//! turning that value into a typed artifact is the caller's job (see
//! [`parse_structured`]). Image calls hand back decoded image bytes plus an
//! optional handle that later calls can use to stay visually consistent.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A JSON schema the text model must answer with
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseFormat {
    pub name: &'static str,
    pub schema: Value,
}

/// Opaque reference to a previous image generation response
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageHandle(String);

impl ImageHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Raw output of one image generation
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub handle: Option<ImageHandle>,
}

/// Errors surfaced by the generation backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// The call failed or returned no usable data
    #[error("Generation failed: {0}")]
    Failed(String),
    /// The call succeeded but carried nothing
    #[error("Generation returned an empty response")]
    Empty,
    /// The response could not be parsed into the requested shape
    #[error("Response did not match the expected shape: {0}")]
    ShapeMismatch(String),
    #[error("Generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl GenerationError {
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Self::ShapeMismatch(_))
    }
}

#[async_trait]
pub trait GenerationPort: Send + Sync {
    /// Generate structured text matching `format`, optionally looking at a
    /// reference image (PNG bytes)
    async fn generate_text(
        &self,
        prompt: &str,
        format: &ResponseFormat,
        reference_image: Option<&[u8]>,
    ) -> Result<Value, GenerationError>;

    /// Generate one image, optionally continuing from a previous response
    async fn generate_image(
        &self,
        prompt: &str,
        reference: Option<&ImageHandle>,
    ) -> Result<GeneratedImage, GenerationError>;
}

/// A typed response shape with its schema and semantic checks
pub trait StructuredResponse: DeserializeOwned {
    /// What the caller expects beyond the schema, e.g. an item count
    type Expect: Copy + Send + Sync + 'static;

    fn response_format(expect: Self::Expect) -> ResponseFormat;

    fn validate(&self, expect: Self::Expect) -> Result<(), String>;
}

/// Strictly parse a generation response into `T`
///
/// `null`, an empty object or an empty string count as an empty response;
/// anything that fails to deserialize or validate is a shape mismatch.
pub fn parse_structured<T: StructuredResponse>(
    value: Value,
    expect: T::Expect,
) -> Result<T, GenerationError> {
    let value = match value {
        Value::Null => return Err(GenerationError::Empty),
        Value::Object(ref map) if map.is_empty() => return Err(GenerationError::Empty),
        Value::String(s) if s.trim().is_empty() => return Err(GenerationError::Empty),
        // Some backends return the JSON document as a string
        Value::String(s) => serde_json::from_str(&s)
            .map_err(|e| GenerationError::ShapeMismatch(format!("invalid JSON: {}", e)))?,
        other => other,
    };

    let parsed: T = serde_json::from_value(value)
        .map_err(|e| GenerationError::ShapeMismatch(e.to_string()))?;
    parsed.validate(expect).map_err(GenerationError::ShapeMismatch)?;
    Ok(parsed)
}
