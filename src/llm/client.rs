use super::types::*;
use crate::{Error, Result, config::LlmConfig};
use async_openai::{Client, config::OpenAIConfig, error::OpenAIError, types as openai_types};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse>;
}

/// Client for any OpenAI-compatible chat-completion endpoint (Groq by default).
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let mut openai_config = OpenAIConfig::new().with_api_key(config.api_key.clone());

        if !config.base_url.is_empty() {
            openai_config = openai_config.with_api_base(config.base_url.clone());
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        // One attempt per call: rate-limit and server errors surface immediately
        let no_retries = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(no_retries);

        Ok(Self {
            client,
            model: config.model.clone(),
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn timeout_error(&self) -> Error {
        Error::Timeout {
            seconds: self.timeout.as_secs(),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        debug!(
            "Creating chat completion with {} messages",
            request.messages.len()
        );

        let mut messages = Vec::new();
        for msg in &request.messages {
            messages.push(msg.to_openai_message()?);
        }

        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };

        let mut request_builder = openai_types::CreateChatCompletionRequestArgs::default();
        request_builder
            .model(model)
            .messages(messages)
            .temperature(request.temperature.unwrap_or(0.2));

        if let Some(max_tokens) = request.max_tokens {
            request_builder.max_tokens(max_tokens);
        }

        if let Some(top_p) = request.top_p {
            request_builder.top_p(top_p);
        }

        let openai_request = request_builder.build()?;

        let response =
            match tokio::time::timeout(self.timeout, self.client.chat().create(openai_request))
                .await
            {
                Ok(Ok(response)) => response,
                Ok(Err(OpenAIError::Reqwest(e))) if e.is_timeout() => {
                    return Err(self.timeout_error());
                }
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => return Err(self.timeout_error()),
            };

        debug!(
            "Received chat completion response with {} choices",
            response.choices.len()
        );

        let choices: Vec<Choice> = response
            .choices
            .into_iter()
            .map(|choice| Choice {
                message: ChatMessage {
                    role: choice.message.role.to_string(),
                    content: choice.message.content.unwrap_or_default(),
                },
            })
            .collect();

        let usage = response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ChatCompletionResponse {
            id: response.id,
            model: response.model,
            choices,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::types::ChatCompletionRequestMessage;
    use pretty_assertions::assert_eq;

    fn create_test_config() -> LlmConfig {
        LlmConfig {
            provider: "groq".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: "test-api-key".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_openai_client_creation() {
        let client = OpenAiClient::new(&create_test_config()).unwrap();

        assert_eq!(client.model(), "llama-3.3-70b-versatile");
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_openai_client_with_empty_base_url() {
        let mut config = create_test_config();
        config.base_url = String::new();

        let client = OpenAiClient::new(&config).unwrap();
        assert_eq!(client.model(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_chat_message_to_openai_system() {
        let msg = ChatMessage::system("You are a fraud detection expert");

        let openai_msg = msg.to_openai_message().unwrap();
        assert!(matches!(
            openai_msg,
            ChatCompletionRequestMessage::System(_)
        ));
    }

    #[test]
    fn test_chat_message_to_openai_user() {
        let msg = ChatMessage::user("Analyze this message");

        let openai_msg = msg.to_openai_message().unwrap();
        assert!(matches!(openai_msg, ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn test_chat_message_invalid_role() {
        let msg = ChatMessage {
            role: "assistant".to_string(),
            content: "This should fail".to_string(),
        };

        let result = msg.to_openai_message();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Unknown message role")
        );
    }

    #[test]
    fn test_first_content_skips_blank_completion() {
        let response = ChatCompletionResponse {
            id: "chatcmpl-1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            choices: vec![Choice {
                message: ChatMessage {
                    role: "assistant".to_string(),
                    content: "  ".to_string(),
                },
            }],
            usage: None,
        };

        assert_eq!(response.first_content(), None);
    }
}
