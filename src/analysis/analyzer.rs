use super::{
    AnalysisEvent, AnalysisOutcome, AnalysisRequest, AnalysisStateMachine, AnalysisStatus,
    FraudAssessment, PromptBuilder, RenderedPrompt, SYSTEM_PROMPT, extract_json_object,
};
use crate::{
    Error, Result,
    config::{AnalysisConfig, Config},
    llm::{ChatCompletionRequest, ChatMessage, LlmClient, OpenAiClient},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Runs one prompt/completion cycle per request and always yields a
/// schema-shaped result.
pub struct FraudAnalyzer {
    llm_client: Arc<dyn LlmClient>,
    model: String,
    settings: AnalysisConfig,
    prompts: PromptBuilder,
}

impl FraudAnalyzer {
    pub fn new(
        llm_client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        settings: AnalysisConfig,
    ) -> Self {
        let prompts = PromptBuilder::new(settings.max_input_chars);
        Self {
            llm_client,
            model: model.into(),
            settings,
            prompts,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = OpenAiClient::new(&config.llm)?;
        info!(
            "Using {} model {} at {}",
            config.llm.provider, config.llm.model, config.llm.base_url
        );
        Ok(Self::new(
            Arc::new(client),
            config.llm.model.clone(),
            config.analysis.clone(),
        ))
    }

    pub fn build_prompt(&self, request: &AnalysisRequest) -> RenderedPrompt {
        self.prompts.build(request)
    }

    pub fn build_completion_request(&self, prompt: &RenderedPrompt) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(prompt.text.clone()),
            ],
            max_tokens: Some(self.settings.max_tokens),
            temperature: Some(self.settings.temperature),
            top_p: Some(self.settings.top_p),
        }
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisOutcome {
        let request_id = Uuid::new_v4().to_string();
        let prompt = self.build_prompt(request);
        let template = prompt.template;
        let mut fsm = AnalysisStateMachine::new(&request_id, template);

        info!(
            request_id = %request_id,
            template = %template,
            "Starting fraud analysis"
        );

        match self.complete(&mut fsm, &prompt).await {
            Ok(result) => {
                info!(request_id = %request_id, "Fraud analysis completed");
                AnalysisOutcome {
                    request_id,
                    status: AnalysisStatus::Ok,
                    template,
                    result,
                }
            }
            Err(e) => {
                let status = AnalysisStatus::from_error(&e);
                warn!(
                    request_id = %request_id,
                    status = %status,
                    "Fraud analysis fell back: {}", e
                );
                if let Err(fsm_err) = fsm.fail(&e) {
                    warn!(request_id = %request_id, "{}", fsm_err);
                }

                let fallback = FraudAssessment::fallback(status, &e.to_string());
                let result = serde_json::to_value(&fallback)
                    .unwrap_or_else(|err| json!({ "status": status, "error": err.to_string() }));

                AnalysisOutcome {
                    request_id,
                    status,
                    template,
                    result,
                }
            }
        }
    }

    async fn complete(
        &self,
        fsm: &mut AnalysisStateMachine,
        prompt: &RenderedPrompt,
    ) -> Result<Value> {
        let request = self.build_completion_request(prompt);
        fsm.transition(AnalysisEvent::CompletionRequested)?;

        let response = self.llm_client.create_chat_completion(request).await?;
        if let Some(usage) = &response.usage {
            debug!(
                "Completion used {} prompt and {} completion tokens",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        let content = response
            .first_content()
            .ok_or_else(|| Error::parse("completion contained no message content"))?;
        let mut value = extract_json_object(content)?;

        // `status` is reserved for fallbacks; the header carries `ok` on success
        if let Some(object) = value.as_object_mut() {
            if object.remove("status").is_some() {
                warn!("Dropped status field supplied by the model");
            }
        }

        if self.settings.strict_schema {
            FraudAssessment::validate(&value)?;
        }

        fsm.transition(AnalysisEvent::CompletionParsed)?;
        Ok(value)
    }
}
