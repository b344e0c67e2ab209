//! Typed form of the "aggregated_analysis" assessment the model is asked to
//! produce, and the fallback assessments returned when it cannot be obtained.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const FAILED_DETAILS: &str = "Analysis failed";
pub const FALLBACK_HEURISTIC_SCORE: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Fraud,
    Legitimate,
    Error,
}

/// How a single analysis call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Ok,
    UpstreamError,
    Timeout,
    ParseError,
    InvalidSchema,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::UpstreamError => "upstream_error",
            Self::Timeout => "timeout",
            Self::ParseError => "parse_error",
            Self::InvalidSchema => "invalid_schema",
        }
    }

    /// Maps a pipeline failure onto the status reported to callers.
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::Timeout { .. } => Self::Timeout,
            Error::Schema(_) => Self::InvalidSchema,
            Error::Parse(_) | Error::Serialization(_) => Self::ParseError,
            _ => Self::UpstreamError,
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAssessment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AnalysisStatus>,
    pub aggregated_analysis: AggregatedAnalysis,
    pub final_decision: FinalDecision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedAnalysis {
    pub heuristic_score: u8,
    pub content_analysis: ContentAnalysis,
    pub financial_risk: FinancialRisk,
    pub domain_verification: Verification,
    pub sender_verification: Verification,
    pub technical_analysis: TechnicalAnalysis,
    pub behavioral_analysis: BehavioralAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalysis {
    pub label: Verdict,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRisk {
    pub financial_risk: bool,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub verified: bool,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalAnalysis {
    pub secure: bool,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralAnalysis {
    pub suspicious: bool,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalDecision {
    pub final_label: Verdict,
    pub final_explanation: String,
}

impl FraudAssessment {
    /// Checks a parsed completion against the assessment schema.
    pub fn validate(value: &Value) -> Result<Self> {
        let assessment: Self = serde_json::from_value(value.clone())
            .map_err(|e| Error::schema(e.to_string()))?;

        let score = assessment.aggregated_analysis.heuristic_score;
        if !(1..=10).contains(&score) {
            return Err(Error::schema(format!(
                "heuristic_score must be within 1..=10, got {score}"
            )));
        }

        Ok(assessment)
    }

    /// Same-shape substitute for an analysis that could not be completed.
    pub fn fallback(status: AnalysisStatus, detail: &str) -> Self {
        let explanation = match status {
            AnalysisStatus::ParseError | AnalysisStatus::InvalidSchema => {
                format!("Failed to parse analysis results: {detail}")
            }
            _ => format!("Error during analysis: {detail}"),
        };

        Self {
            status: Some(status),
            aggregated_analysis: AggregatedAnalysis {
                heuristic_score: FALLBACK_HEURISTIC_SCORE,
                content_analysis: ContentAnalysis {
                    label: Verdict::Error,
                    explanation,
                },
                financial_risk: FinancialRisk {
                    financial_risk: false,
                    details: FAILED_DETAILS.to_string(),
                },
                domain_verification: Verification {
                    verified: false,
                    details: FAILED_DETAILS.to_string(),
                },
                sender_verification: Verification {
                    verified: false,
                    details: FAILED_DETAILS.to_string(),
                },
                technical_analysis: TechnicalAnalysis {
                    secure: false,
                    details: FAILED_DETAILS.to_string(),
                },
                behavioral_analysis: BehavioralAnalysis {
                    suspicious: false,
                    details: FAILED_DETAILS.to_string(),
                },
            },
            final_decision: FinalDecision {
                final_label: Verdict::Error,
                final_explanation: "An error occurred during the analysis. Please try again."
                    .to_string(),
            },
        }
    }
}
