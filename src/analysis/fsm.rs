use super::PromptTemplate;
use crate::{Error, Result};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisState {
    Idle,
    Sent,
    Parsed,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisEvent {
    CompletionRequested,
    CompletionParsed,
    CompletionFailed,
}

#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub request_id: String,
    pub template: PromptTemplate,
    pub last_error: Option<String>,
}

/// Lifecycle of one analysis call: `Idle -> Sent -> {Parsed | Fallback}`.
pub struct AnalysisStateMachine {
    state: AnalysisState,
    pub context: AnalysisContext,
}

impl AnalysisStateMachine {
    pub fn new(request_id: impl Into<String>, template: PromptTemplate) -> Self {
        Self {
            state: AnalysisState::Idle,
            context: AnalysisContext {
                request_id: request_id.into(),
                template,
                last_error: None,
            },
        }
    }

    pub fn current_state(&self) -> AnalysisState {
        self.state
    }

    pub fn transition(&mut self, event: AnalysisEvent) -> Result<()> {
        let old_state = self.state;
        debug!("FSM processing event {:?} in state {:?}", event, old_state);

        let new_state = match (self.state, event) {
            (AnalysisState::Idle, AnalysisEvent::CompletionRequested) => AnalysisState::Sent,
            (AnalysisState::Sent, AnalysisEvent::CompletionParsed) => AnalysisState::Parsed,
            (AnalysisState::Sent, AnalysisEvent::CompletionFailed) => AnalysisState::Fallback,
            _ => {
                warn!(
                    "Invalid FSM transition from {:?} with event {:?}",
                    self.state, event
                );
                return Err(Error::fsm(format!(
                    "Invalid transition from {:?} with event {:?}",
                    self.state, event
                )));
            }
        };

        info!(
            request_id = %self.context.request_id,
            "FSM state transition: {:?} -> {:?} (event: {:?})",
            old_state, new_state, event
        );

        self.state = new_state;
        Ok(())
    }

    /// Records the failure and moves to `Fallback`.
    pub fn fail(&mut self, error: &Error) -> Result<()> {
        self.context.last_error = Some(error.to_string());
        self.transition(AnalysisEvent::CompletionFailed)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, AnalysisState::Parsed | AnalysisState::Fallback)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.context.last_error.as_deref()
    }
}
