//! Async HTTP client for hosted LLM APIs
//!
//! Model-agnostic: speaks the Anthropic messages API, OpenAI-compatible chat
//! completions (OpenAI, DeepSeek, ...) and Gemini `generateContent`.
//! HTTP 429 is reported as `BackendError::RateLimited` so the invoker can
//! back off; every other failure is `BackendError::Other`.

use crate::core::config::ModelConfig;
use crate::core::error::{BizError, Result};
use crate::llm::backend::{BackendError, GenerativeBackend};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SYSTEM_PROMPT: &str =
    "You convert business requests into structured JSON. Reply with JSON only.";

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
    Gemini,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else if url.contains("generativelanguage.googleapis.com") {
            ApiFormat::Gemini
        } else {
            // DeepSeek, OpenAI, and other compatible APIs use OpenAI format
            ApiFormat::OpenAI
        }
    }

    /// Create a client from the model section of the engine config
    ///
    /// The API key is read from the environment variable named by
    /// `api_key_env` (LLM_API_KEY by default).
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| BizError::LlmError(format!("{} not set", config.api_key_env)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BizError::LlmError(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            api_format: Self::detect_api_format(&config.api_url),
        })
    }

    async fn complete_anthropic(&self, prompt: &str) -> std::result::Result<String, BackendError> {
        // No JSON switch on this API; the prompt and extraction handle it
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 4096,
            system: SYSTEM_PROMPT.into(),
            messages: vec![Message {
                role: "user".into(),
                content: prompt.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::Other(e.to_string()))?;

        let completion: AnthropicResponse = read_json(response).await?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| BackendError::Other("Empty response".into()))
    }

    async fn complete_openai(
        &self,
        prompt: &str,
        demand_json: bool,
    ) -> std::result::Result<String, BackendError> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: 4096,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: SYSTEM_PROMPT.into(),
                },
                Message {
                    role: "user".into(),
                    content: prompt.into(),
                },
            ],
            response_format: demand_json.then(|| ResponseFormat {
                kind: "json_object".into(),
            }),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::Other(e.to_string()))?;

        let completion: OpenAIResponse = read_json(response).await?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| BackendError::Other("Empty response".into()))
    }

    async fn complete_gemini(
        &self,
        prompt: &str,
        demand_json: bool,
    ) -> std::result::Result<String, BackendError> {
        let url = format!(
            "{}/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        );
        let request = GeminiRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart {
                    text: SYSTEM_PROMPT.into(),
                }],
            },
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.into(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: demand_json.then(|| "application/json".to_string()),
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::Other(e.to_string()))?;

        let completion: GeminiResponse = read_json(response).await?;

        completion
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| BackendError::Other("Empty response".into()))
    }
}

#[async_trait]
impl GenerativeBackend for LlmClient {
    async fn generate(
        &self,
        prompt: &str,
        demand_json: bool,
    ) -> std::result::Result<String, BackendError> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(prompt).await,
            ApiFormat::OpenAI => self.complete_openai(prompt, demand_json).await,
            ApiFormat::Gemini => self.complete_gemini(prompt, demand_json).await,
        }
    }
}

/// Map the HTTP status, then decode the body
async fn read_json<T: serde::de::DeserializeOwned>(
    response: Response,
) -> std::result::Result<T, BackendError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(BackendError::RateLimited);
    }
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(BackendError::Other(format!(
            "API error ({}): {}",
            status, error_text
        )));
    }
    response
        .json()
        .await
        .map_err(|e| BackendError::Other(e.to_string()))
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format (DeepSeek, OpenAI, etc.)
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// Gemini generateContent format
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_api_format() {
        assert_eq!(
            LlmClient::detect_api_format("https://api.anthropic.com/v1/messages"),
            ApiFormat::Anthropic
        );
        assert_eq!(
            LlmClient::detect_api_format(
                "https://generativelanguage.googleapis.com/v1beta/models"
            ),
            ApiFormat::Gemini
        );
        assert_eq!(
            LlmClient::detect_api_format("https://api.deepseek.com/chat/completions"),
            ApiFormat::OpenAI
        );
    }

    #[test]
    fn test_from_config_missing_key() {
        let config = ModelConfig {
            api_key_env: "BIZDESK_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..ModelConfig::default()
        };
        assert!(LlmClient::from_config(&config).is_err());
    }

    #[test]
    fn test_openai_json_mode_serialization() {
        let request = OpenAIRequest {
            model: "m".into(),
            max_tokens: 10,
            messages: vec![],
            response_format: Some(ResponseFormat {
                kind: "json_object".into(),
            }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_gemini_request_uses_camel_case() {
        let request = GeminiRequest {
            system_instruction: GeminiContent { parts: vec![] },
            contents: vec![],
            generation_config: GeminiGenerationConfig {
                response_mime_type: Some("application/json".into()),
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!(json.get("systemInstruction").is_some());
    }
}
