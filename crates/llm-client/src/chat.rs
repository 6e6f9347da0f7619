use analysis_core::{AnalysisError, Summarizer};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, LlmResult};
use crate::LlmConfig;

const ANALYST_PERSONA: &str = "你是一位專業、言簡意賅的金融市場分析師。";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    pub fn parse(body: &str) -> LlmResult<Self> {
        serde_json::from_str(body).map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    /// Text of the first choice; missing, null or blank content is an error.
    pub fn into_text(self) -> LlmResult<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Chat-completions client. One call per `complete`, no retries.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ChatClient {
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Config("API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn complete(&self, messages: Vec<ChatMessage>) -> LlmResult<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ServiceUnavailable(format!(
                "Status: {} {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body = response.text().await?;
        ChatResponse::parse(&body)?.into_text()
    }
}

#[async_trait]
impl Summarizer for ChatClient {
    async fn summarize(&self, prompt: &str) -> Result<String, AnalysisError> {
        tracing::info!(model = %self.config.model, "Requesting AI summary");

        let messages = vec![ChatMessage::system(ANALYST_PERSONA), ChatMessage::user(prompt)];
        self.complete(messages).await.map_err(|e| {
            tracing::warn!(error = %e, "Chat completion failed");
            AnalysisError::Summarization(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> ChatResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_first_choice_text() {
        let response = parse(json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": "  台股盤整。 " } },
                { "index": 1, "message": { "role": "assistant", "content": "ignored" } }
            ]
        }));

        assert_eq!(response.into_text().unwrap(), "台股盤整。");
    }

    #[test]
    fn test_no_choices_is_empty() {
        let response = parse(json!({ "choices": [] }));
        assert!(matches!(response.into_text(), Err(LlmError::EmptyResponse)));

        let response = parse(json!({ "object": "chat.completion" }));
        assert!(matches!(response.into_text(), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn test_null_or_blank_content_is_empty() {
        let response = parse(json!({ "choices": [{ "message": { "content": null } }] }));
        assert!(matches!(response.into_text(), Err(LlmError::EmptyResponse)));

        let response = parse(json!({ "choices": [{ "message": { "content": "\n  " } }] }));
        assert!(matches!(response.into_text(), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn test_malformed_body_is_invalid_response() {
        assert!(matches!(
            ChatResponse::parse("<html>502 Bad Gateway</html>"),
            Err(LlmError::InvalidResponse(_))
        ));

        let response = ChatResponse::parse(r#"{"choices":[{"message":{"content":"ok"}}]}"#).unwrap();
        assert_eq!(response.into_text().unwrap(), "ok");
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage::system("persona"), ChatMessage::user("prompt")],
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "prompt");
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            ChatClient::new(LlmConfig::new("  ")),
            Err(LlmError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_maps_to_summarization_error() {
        let config = LlmConfig::new("test-key").with_base_url("http://127.0.0.1:9");
        let client = ChatClient::new(config).unwrap();

        let err = client.summarize("hello").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Summarization(_)));
    }
}
