//! OpenRouter chat-completions client
//!
//! Speaks the OpenAI-compatible `/chat/completions` API. Every request is
//! bounded by the configured timeout so a stalled upstream cannot hold a
//! webhook request open.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tutor_common::config::LlmConfig;

use super::prompt::build_lesson_prompt;
use super::{LessonError, LessonGenerator, LessonRequest};

const USER_AGENT: &str = concat!("wa-tutor/", env!("CARGO_PKG_VERSION"));

/// Generated lessons shorter than this are treated as unusable
pub const MIN_LESSON_CHARS: usize = 50;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenRouter lesson generator
pub struct OpenRouterClient {
    http_client: reqwest::Client,
    config: LlmConfig,
}

impl OpenRouterClient {
    pub fn new(config: LlmConfig) -> Result<Self, LessonError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| LessonError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn map_send_error(&self, err: reqwest::Error) -> LessonError {
        if err.is_timeout() {
            LessonError::Timeout(self.config.timeout.as_secs())
        } else {
            LessonError::Network(err.to_string())
        }
    }

    /// Send one chat completion and return the first choice's text
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, LessonError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| LessonError::NotConfigured("OPENROUTER_API_KEY is not set".to_string()))?;

        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens,
            temperature,
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LessonError::Api(status.as_u16(), error_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LessonError::Timeout(self.config.timeout.as_secs())
            } else {
                LessonError::Parse(e.to_string())
            }
        })?;

        extract_content(parsed)
    }

    /// Startup connectivity check with a tiny completion
    pub async fn probe(&self) -> Result<String, LessonError> {
        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: "Hello, can you respond with just 'OK'?".to_string(),
        }];
        self.complete(messages, 10, 0.1).await
    }
}

/// First non-blank choice content, trimmed
fn extract_content(response: ChatCompletionResponse) -> Result<String, LessonError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| LessonError::EmptyContent("no content in response".to_string()))
}

#[async_trait]
impl LessonGenerator for OpenRouterClient {
    fn provider_id(&self) -> &'static str {
        "openrouter"
    }

    async fn generate_lesson(&self, request: &LessonRequest) -> Result<String, LessonError> {
        let (system_prompt, user_prompt) = build_lesson_prompt(request);

        tracing::debug!(
            topic = %request.topic,
            age = request.age,
            stage = request.stage,
            model = %self.config.model,
            "Requesting lesson"
        );

        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: system_prompt,
            },
            ChatMessage {
                role: "user".to_string(),
                content: user_prompt,
            },
        ];

        let content = self
            .complete(messages, self.config.max_tokens, self.config.temperature)
            .await?;

        let length = content.chars().count();
        if length < MIN_LESSON_CHARS {
            return Err(LessonError::EmptyContent(format!(
                "generated content too short ({} chars)",
                length
            )));
        }

        tracing::info!(topic = %request.topic, chars = length, "Lesson generated");
        Ok(content)
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn response(json: &str) -> ChatCompletionResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_content_trims() {
        let parsed = response(r#"{"choices":[{"message":{"role":"assistant","content":"  Hello  "}}]}"#);
        assert_eq!(extract_content(parsed).unwrap(), "Hello");
    }

    #[test]
    fn test_extract_content_rejects_empty_and_missing() {
        let no_choices = response(r#"{"choices":[]}"#);
        assert!(matches!(extract_content(no_choices), Err(LessonError::EmptyContent(_))));

        let blank = response(r#"{"choices":[{"message":{"content":"   "}}]}"#);
        assert!(matches!(extract_content(blank), Err(LessonError::EmptyContent(_))));

        let null_content = response(r#"{"choices":[{"message":{"content":null}}]}"#);
        assert!(matches!(extract_content(null_content), Err(LessonError::EmptyContent(_))));

        let missing_field = response(r#"{"id":"gen-1"}"#);
        assert!(matches!(extract_content(missing_field), Err(LessonError::EmptyContent(_))));
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let config = LlmConfig {
            base_url: "https://example.test/api/v1/".to_string(),
            ..Default::default()
        };
        let client = OpenRouterClient::new(config).unwrap();
        assert_eq!(client.endpoint(), "https://example.test/api/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_network() {
        let client = OpenRouterClient::new(LlmConfig::default()).unwrap();
        assert!(!client.is_configured());

        let result = client
            .generate_lesson(&LessonRequest::new("fractions", 10, "Ada"))
            .await;
        assert!(matches!(result, Err(LessonError::NotConfigured(_))));
    }

    fn client_for(base_url: String, timeout: Duration) -> OpenRouterClient {
        OpenRouterClient::new(LlmConfig {
            api_key: Some("test-key".to_string()),
            base_url,
            model: "test/model".to_string(),
            timeout,
            ..Default::default()
        })
        .unwrap()
    }

    const LESSON: &str =
        "Fractions describe parts of a whole. Cut a pizza into four slices and one slice is 1/4.";

    #[tokio::test]
    async fn test_successful_completion_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": LESSON } }]
        });
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "test/model",
                "max_tokens": 300
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = client_for(server.url(), Duration::from_secs(5));
        let lesson = client
            .generate_lesson(&LessonRequest::new("fractions", 10, "Ada"))
            .await
            .unwrap();

        assert_eq!(lesson, LESSON);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let client = client_for(server.url(), Duration::from_secs(5));
        let result = client
            .generate_lesson(&LessonRequest::new("fractions", 10, "Ada"))
            .await;

        match result {
            Err(LessonError::Api(status, body)) => {
                assert_eq!(status, 500);
                assert!(body.contains("upstream exploded"));
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_short_content_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!({
            "choices": [{ "message": { "content": "Too short." } }]
        });
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = client_for(server.url(), Duration::from_secs(5));
        let result = client
            .generate_lesson(&LessonRequest::new("fractions", 10, "Ada"))
            .await;

        assert!(matches!(result, Err(LessonError::EmptyContent(_))));
    }

    #[tokio::test]
    async fn test_stalled_upstream_times_out() {
        // Accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = client_for(format!("http://{}", addr), Duration::from_secs(1));
        let started = std::time::Instant::now();
        let result = client
            .generate_lesson(&LessonRequest::new("fractions", 10, "Ada"))
            .await;

        assert!(matches!(result, Err(LessonError::Timeout(1))));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_an_error() {
        let config = LlmConfig {
            api_key: Some("test-key".to_string()),
            // Reserved port on loopback; connection is refused immediately
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
            ..Default::default()
        };
        let client = OpenRouterClient::new(config).unwrap();

        let result = client
            .generate_lesson(&LessonRequest::new("fractions", 10, "Ada"))
            .await;
        assert!(matches!(
            result,
            Err(LessonError::Network(_)) | Err(LessonError::Timeout(_))
        ));
    }
}
