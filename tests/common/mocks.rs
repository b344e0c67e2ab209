use async_trait::async_trait;
use fraud_lens::{
    Error, Result,
    llm::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice, LlmClient, Usage},
};
use std::sync::{Arc, Mutex};

/// What the mock returns for its next call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Content(String),
    Error(String),
    Timeout,
}

/// Mock LLM client that records every request it receives
#[derive(Debug, Clone, Default)]
pub struct MockLlmClient {
    pub replies: Arc<Mutex<Vec<MockReply>>>,
    pub requests: Arc<Mutex<Vec<ChatCompletionRequest>>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(self, content: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Content(content.into()));
        self
    }

    pub fn with_error(self, error: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Error(error.into()));
        self
    }

    pub fn with_timeout(self) -> Self {
        self.replies.lock().unwrap().push(MockReply::Timeout);
        self
    }

    pub fn get_requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.requests.lock().unwrap().push(request);

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(Error::llm("No more mock responses available"));
            }
            replies.remove(0)
        };

        match reply {
            MockReply::Content(content) => Ok(create_mock_chat_response(&content)),
            MockReply::Error(error) => Err(Error::llm(error)),
            MockReply::Timeout => Err(Error::Timeout { seconds: 30 }),
        }
    }
}

/// Helper function to create a completion carrying `content`
pub fn create_mock_chat_response(content: &str) -> ChatCompletionResponse {
    ChatCompletionResponse {
        id: "chatcmpl-test".to_string(),
        model: "llama-3.3-70b-versatile".to_string(),
        choices: vec![Choice {
            message: ChatMessage {
                role: "assistant".to_string(),
                content: content.to_string(),
            },
        }],
        usage: Some(Usage {
            prompt_tokens: 600,
            completion_tokens: 250,
            total_tokens: 850,
        }),
    }
}
