//! OpenAI-compatible client for text and image generation

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::application::ports::outbound::{
    GeneratedImage, GenerationError, GenerationPort, ImageHandle, ResponseFormat,
};

/// Client for the chat completions and responses APIs
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, text_model: &str, image_model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            text_model: text_model.to_string(),
            image_model: image_model.to_string(),
        }
    }

    /// Request a completion constrained to a JSON schema
    ///
    /// Returns the message content as it was sent by the model.
    pub async fn structured_completion(
        &self,
        prompt: &str,
        format: &ResponseFormat,
        reference_image: Option<&[u8]>,
    ) -> Result<Option<String>, OpenAiError> {
        let mut content = vec![json!({ "type": "text", "text": prompt })];
        if let Some(image) = reference_image {
            content.push(json!({
                "type": "image_url",
                "image_url": { "url": format!("data:image/png;base64,{}", BASE64.encode(image)) },
            }));
        }

        let request = ChatCompletionRequest {
            model: &self.text_model,
            messages: vec![ChatMessage {
                role: "user",
                content: Value::Array(content),
            }],
            response_format: json!({
                "type": "json_schema",
                "json_schema": {
                    "name": format.name,
                    "schema": format.schema,
                    "strict": true,
                },
            }),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(OpenAiError::ApiError(format!("{}: {}", status, error_text)));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let message = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message);

        match message {
            Some(ChoiceMessage {
                refusal: Some(refusal),
                ..
            }) => Err(OpenAiError::Refused(refusal)),
            Some(message) => Ok(message.content),
            None => Ok(None),
        }
    }

    /// Generate an image through the image generation tool
    ///
    /// Returns the response id and the base64 payload of the first image.
    pub async fn image_generation(
        &self,
        prompt: &str,
        previous_response_id: Option<&str>,
    ) -> Result<(String, Option<String>), OpenAiError> {
        let request = ImageGenerationRequest {
            model: &self.image_model,
            input: prompt,
            tools: vec![json!({ "type": "image_generation" })],
            previous_response_id,
        };

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(OpenAiError::ApiError(format!("{}: {}", status, error_text)));
        }

        let body: ResponsesResponse = response.json().await?;
        let image = body
            .output
            .into_iter()
            .find(|item| item.r#type == "image_generation_call")
            .and_then(|item| item.result);
        Ok((body.id, image))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Model refused: {0}")]
    Refused(String),
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    response_format: Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    input: &'a str,
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    id: String,
    #[serde(default)]
    output: Vec<ResponseOutput>,
}

#[derive(Debug, Deserialize)]
struct ResponseOutput {
    r#type: String,
    #[serde(default)]
    result: Option<String>,
}

impl From<OpenAiError> for GenerationError {
    fn from(err: OpenAiError) -> Self {
        GenerationError::Failed(err.to_string())
    }
}

/// Decode the base64 image payload of a responses API call
fn decode_image(payload: &str) -> Result<Vec<u8>, GenerationError> {
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| GenerationError::ShapeMismatch(format!("invalid base64 image: {}", e)))?;
    if bytes.is_empty() {
        return Err(GenerationError::Empty);
    }
    Ok(bytes)
}

// =============================================================================
// GenerationPort Implementation
// =============================================================================

#[async_trait]
impl GenerationPort for OpenAiClient {
    async fn generate_text(
        &self,
        prompt: &str,
        format: &ResponseFormat,
        reference_image: Option<&[u8]>,
    ) -> Result<Value, GenerationError> {
        let content = self
            .structured_completion(prompt, format, reference_image)
            .await?;

        let content = match content {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Err(GenerationError::Empty),
        };

        serde_json::from_str(&content)
            .map_err(|e| GenerationError::ShapeMismatch(format!("invalid JSON: {}", e)))
    }

    async fn generate_image(
        &self,
        prompt: &str,
        reference: Option<&ImageHandle>,
    ) -> Result<GeneratedImage, GenerationError> {
        let (response_id, payload) = self
            .image_generation(prompt, reference.map(|handle| handle.as_str()))
            .await?;

        let payload = payload.ok_or(GenerationError::Empty)?;
        Ok(GeneratedImage {
            bytes: decode_image(&payload)?,
            handle: Some(ImageHandle::new(response_id)),
        })
    }
}
