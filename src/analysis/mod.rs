mod analyzer;
mod extract;
pub mod fsm;
mod prompt;
mod schema;

pub use analyzer::FraudAnalyzer;
pub use extract::extract_json_object;
pub use fsm::{AnalysisContext, AnalysisEvent, AnalysisState, AnalysisStateMachine};
pub use prompt::{
    NO_MESSAGE_PLACEHOLDER, NO_SENDER_PLACEHOLDER, NO_URL_PLACEHOLDER, PromptBuilder,
    PromptTemplate, RenderedPrompt, SYSTEM_PROMPT, sanitize_input,
};
pub use schema::*;

use crate::{Error, Result};
use serde_json::Value;

pub const EMPTY_REQUEST_ERROR: &str = "At least one of message or URL must be provided";

/// Caller input for one analysis. Holds at least one non-blank field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    message: Option<String>,
    url: Option<String>,
}

impl AnalysisRequest {
    pub fn new(message: Option<String>, url: Option<String>) -> Result<Self> {
        let message = message.filter(|m| !m.trim().is_empty());
        let url = url.filter(|u| !u.trim().is_empty());

        if message.is_none() && url.is_none() {
            return Err(Error::invalid_request(EMPTY_REQUEST_ERROR));
        }

        Ok(Self { message, url })
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub request_id: String,
    pub status: AnalysisStatus,
    pub template: PromptTemplate,
    /// The model's object on success, a fallback assessment otherwise.
    pub result: Value,
}
