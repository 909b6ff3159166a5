//! OpenAI-compatible chat completions provider.
//!
//! Covers both the plain OpenAI API shape (`{base}/chat/completions`, bearer
//! token) and Azure OpenAI deployments
//! (`{endpoint}/openai/deployments/{deployment}/chat/completions?api-version=...`,
//! `api-key` header). For Azure the request's `model` names the deployment.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use mediaide_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AZURE_API_VERSION: &str = "2024-06-01";

/// Which URL and auth scheme to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAiFlavor {
    Standard,
    Azure { api_version: String },
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
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

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Client for OpenAI-compatible chat completion endpoints.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    flavor: OpenAiFlavor,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Client for the OpenAI API or any server speaking the same protocol.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            flavor: OpenAiFlavor::Standard,
            client: reqwest::Client::new(),
        }
    }

    /// Client for an Azure OpenAI resource endpoint.
    pub fn azure(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            flavor: OpenAiFlavor::Azure {
                api_version: api_version.into(),
            },
            ..Self::new(endpoint, api_key)
        }
    }

    /// Replace the HTTP client with one that times out after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> AppResult<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    fn completions_url(&self, model: &str) -> String {
        match &self.flavor {
            OpenAiFlavor::Standard => format!("{}/chat/completions", self.base_url),
            OpenAiFlavor::Azure { api_version } => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.base_url, model, api_version
            ),
        }
    }

    fn to_chat_request<'a>(&self, request: &'a LlmRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            // Azure routes by deployment in the URL
            model: match self.flavor {
                OpenAiFlavor::Standard => Some(request.model.as_str()),
                OpenAiFlavor::Azure { .. } => None,
            },
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        match self.flavor {
            OpenAiFlavor::Standard => "openai",
            OpenAiFlavor::Azure { .. } => "azure",
        }
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(
            provider = self.provider_name(),
            model = %request.model,
            "Sending chat completion request"
        );

        let url = self.completions_url(&request.model);
        let builder = self.client.post(&url).json(&self.to_chat_request(request));
        let builder = match self.flavor {
            OpenAiFlavor::Standard => builder.bearer_auth(&self.api_key),
            OpenAiFlavor::Azure { .. } => builder.header("api-key", &self.api_key),
        };

        let response = builder.send().await.map_err(|e| {
            AppError::Llm(format!(
                "Failed to send request to {}: {}",
                self.provider_name(),
                e
            ))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "{} API error ({}): {}",
                self.provider_name(),
                status,
                error_text
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse chat response: {}", e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Llm("Chat response contained no message".to_string()))?;

        let usage = chat
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: chat.model.unwrap_or_else(|| request.model.clone()),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_url() {
        let client = OpenAiClient::new("https://api.openai.com/v1/", "sk-test");
        assert_eq!(
            client.completions_url("gpt-4o-mini"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(client.provider_name(), "openai");
    }

    #[test]
    fn test_azure_url() {
        let client = OpenAiClient::azure("https://med.openai.azure.com", "key", "2024-06-01");
        assert_eq!(
            client.completions_url("gpt-4o"),
            "https://med.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-06-01"
        );
        assert_eq!(client.provider_name(), "azure");
    }

    #[test]
    fn test_chat_request_messages() {
        let client = OpenAiClient::new(DEFAULT_OPENAI_URL, "sk-test");
        let request = LlmRequest::new("question", "gpt-4o-mini").with_system("rules");
        let chat = client.to_chat_request(&request);

        assert_eq!(chat.model, Some("gpt-4o-mini"));
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert_eq!(chat.messages[1].content, "question");
    }

    #[test]
    fn test_azure_request_omits_model() {
        let client = OpenAiClient::azure("https://med.openai.azure.com", "key", "2024-06-01");
        let request = LlmRequest::new("question", "gpt-4o");
        assert_eq!(client.to_chat_request(&request).model, None);
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "model": "gpt-4o-mini",
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": "1500"}}],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 2, "total_tokens": 14}
                }"#,
            )
            .create_async()
            .await;

        let client = OpenAiClient::new(server.url(), "sk-test");
        let response = client
            .complete(&LlmRequest::new("How many records?", "gpt-4o-mini"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, "1500");
        assert_eq!(response.usage, LlmUsage::new(12, 2));
    }

    #[tokio::test]
    async fn test_empty_choices_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(server.url(), "sk-test");
        let err = client
            .complete(&LlmRequest::new("q", "gpt-4o-mini"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no message"));
    }
}
