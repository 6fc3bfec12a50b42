//! Structured model calls with bounded rate-limit retries
//!
//! The invoker knows nothing about intents. It renders one prompt, demands
//! JSON, retries only when the backend reports a rate limit, and hands back
//! an opaque `serde_json::Value` for the schema registry to judge.

use crate::core::config::RetryConfig;
use crate::llm::backend::{BackendError, GenerativeBackend};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvocationError {
    #[error("rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("backend error: {0}")]
    BackendError(String),

    #[error("malformed model output: {0}")]
    MalformedOutput(String),
}

/// Everything that goes into one prompt
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSpec {
    pub instruction: String,
    pub schema: String,
    pub grounding: String,
    pub input: String,
}

impl PromptSpec {
    pub fn render(&self) -> String {
        format!(
            "TASK:\n{}\n\nOUTPUT SCHEMA:\n{}\nCONTEXT:\n{}\nUSER INPUT:\n{}\n\n\
             Respond with a single JSON object and nothing else.",
            self.instruction.trim(),
            self.schema,
            self.grounding,
            self.input.trim()
        )
    }
}

/// Wraps a backend with the JSON contract and retry policy
pub struct ModelInvoker {
    backend: Arc<dyn GenerativeBackend>,
    retry: RetryConfig,
}

impl ModelInvoker {
    pub fn new(backend: Arc<dyn GenerativeBackend>, retry: RetryConfig) -> Self {
        Self { backend, retry }
    }

    pub async fn invoke(&self, spec: &PromptSpec) -> Result<Value, InvocationError> {
        let prompt = spec.render();
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.backend.generate(&prompt, true).await {
                Ok(text) => {
                    tracing::debug!(attempt, bytes = text.len(), "model responded");
                    return parse_output(&text);
                }
                Err(BackendError::RateLimited) if attempt < max_attempts => {
                    let delay = self.retry.delay_after(attempt - 1);
                    tracing::warn!(
                        "Rate limited on attempt {}/{}, retrying in {:?}",
                        attempt,
                        max_attempts,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(BackendError::RateLimited) => {
                    tracing::warn!("Rate limited on final attempt {}", attempt);
                    return Err(InvocationError::RateLimited { attempts: attempt });
                }
                Err(BackendError::Other(message)) => {
                    return Err(InvocationError::BackendError(message));
                }
            }
        }
    }
}

fn parse_output(response: &str) -> Result<Value, InvocationError> {
    let json_str = extract_json(response)?;
    serde_json::from_str(json_str).map_err(|e| {
        InvocationError::MalformedOutput(format!("{} - Response: {}", e, response))
    })
}

/// Extract JSON object from LLM response (handles surrounding text and fences)
fn extract_json(response: &str) -> Result<&str, InvocationError> {
    let start = response
        .find('{')
        .ok_or_else(|| InvocationError::MalformedOutput("No JSON found in response".into()))?;
    let end = response.rfind('}').ok_or_else(|| {
        InvocationError::MalformedOutput("No closing brace found in response".into())
    })?;
    if end < start {
        return Err(InvocationError::MalformedOutput(
            "No JSON object found in response".into(),
        ));
    }
    Ok(&response[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String, BackendError>>>,
        calls: AtomicUsize,
        last_prompt: Mutex<String>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<String, BackendError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(String::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerativeBackend for ScriptedBackend {
        async fn generate(&self, prompt: &str, demand_json: bool) -> Result<String, BackendError> {
            assert!(demand_json);
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock() = prompt.to_string();
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(BackendError::Other("script exhausted".into())))
        }
    }

    fn no_delay() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay_ms: 0,
        }
    }

    fn spec() -> PromptSpec {
        PromptSpec {
            instruction: "Extract a task.".into(),
            schema: "- title: string\n".into(),
            grounding: "Users (name: id):\n- 김철수: 7\n".into(),
            input: "내일까지 김철수에게 디자인 검토 맡겨줘".into(),
        }
    }

    #[tokio::test]
    async fn test_three_rate_limits_exhaust_retries() {
        let backend = ScriptedBackend::new(vec![
            Err(BackendError::RateLimited),
            Err(BackendError::RateLimited),
            Err(BackendError::RateLimited),
            Ok("{}".into()),
        ]);
        let invoker = ModelInvoker::new(backend.clone(), no_delay());

        let result = invoker.invoke(&spec()).await;
        assert_eq!(result, Err(InvocationError::RateLimited { attempts: 3 }));
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_one_rate_limit_then_success() {
        let backend = ScriptedBackend::new(vec![
            Err(BackendError::RateLimited),
            Ok(r#"{"title": "디자인 검토"}"#.into()),
        ]);
        let invoker = ModelInvoker::new(backend.clone(), no_delay());

        let value = invoker.invoke(&spec()).await.unwrap();
        assert_eq!(value["title"], "디자인 검토");
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_backend_error_is_not_retried() {
        let backend = ScriptedBackend::new(vec![
            Err(BackendError::Other("500".into())),
            Ok("{}".into()),
        ]);
        let invoker = ModelInvoker::new(backend.clone(), no_delay());

        let result = invoker.invoke(&spec()).await;
        assert!(matches!(result, Err(InvocationError::BackendError(_))));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_output_is_not_retried() {
        let backend = ScriptedBackend::new(vec![
            Ok("I could not understand the request".into()),
            Ok("{}".into()),
        ]);
        let invoker = ModelInvoker::new(backend.clone(), no_delay());

        let result = invoker.invoke(&spec()).await;
        assert!(matches!(result, Err(InvocationError::MalformedOutput(_))));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_single_attempt_policy() {
        let backend = ScriptedBackend::new(vec![Err(BackendError::RateLimited)]);
        let retry = RetryConfig {
            max_attempts: 1,
            base_delay_ms: 0,
        };
        let invoker = ModelInvoker::new(backend.clone(), retry);

        let result = invoker.invoke(&spec()).await;
        assert_eq!(result, Err(InvocationError::RateLimited { attempts: 1 }));
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_prompt_contains_every_part() {
        let backend = ScriptedBackend::new(vec![Ok("{}".into())]);
        let invoker = ModelInvoker::new(backend.clone(), no_delay());
        invoker.invoke(&spec()).await.unwrap();

        let prompt = backend.last_prompt.lock().clone();
        assert!(prompt.contains("Extract a task."));
        assert!(prompt.contains("- title: string"));
        assert!(prompt.contains("김철수: 7"));
        assert!(prompt.contains("디자인 검토 맡겨줘"));
    }

    #[test]
    fn test_extract_json_with_fences() {
        let response = "```json\n{\"title\": \"x\", \"tags\": {\"a\": 1}}\n```";
        let value = parse_output(response).unwrap();
        assert_eq!(value["tags"]["a"], 1);
    }

    #[test]
    fn test_extract_json_no_json() {
        assert!(extract_json("no braces here").is_err());
        assert!(extract_json("} backwards {").is_err());
    }

    #[test]
    fn test_truncated_json_is_malformed() {
        let result = parse_output(r#"{"title": "x", "due_date": "2026-0}"#);
        assert!(matches!(result, Err(InvocationError::MalformedOutput(_))));
        let result = parse_output(r#"{"title": "x", "#);
        assert!(matches!(result, Err(InvocationError::MalformedOutput(_))));
    }
}
