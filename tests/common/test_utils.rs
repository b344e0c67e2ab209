use crate::common::MockLlmClient;
use fraud_lens::{
    analysis::FraudAnalyzer,
    config::{AnalysisConfig, Config},
};
use serde_json::{Value, json};
use std::sync::Arc;

pub const TEST_MODEL: &str = "llama-3.3-70b-versatile";

/// Create a test configuration with sensible defaults
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.llm.api_key = "test-api-key".to_string();
    config.server.host = "127.0.0.1".to_string();
    config.server.logs.level = "debug".to_string();
    config
}

pub fn create_test_analyzer(mock: &MockLlmClient) -> FraudAnalyzer {
    create_test_analyzer_with(mock, AnalysisConfig::default())
}

pub fn create_test_analyzer_with(mock: &MockLlmClient, settings: AnalysisConfig) -> FraudAnalyzer {
    FraudAnalyzer::new(Arc::new(mock.clone()), TEST_MODEL, settings)
}

/// A well-formed assessment as the model is asked to return it
pub fn sample_assessment() -> Value {
    json!({
        "aggregated_analysis": {
            "heuristic_score": 9,
            "content_analysis": {
                "label": "fraud",
                "explanation": "Threatens account suspension to force a quick response"
            },
            "financial_risk": {
                "financial_risk": true,
                "details": "Likely credential harvesting leading to account takeover"
            },
            "domain_verification": {
                "verified": false,
                "details": "No URL provided for verification"
            },
            "sender_verification": {
                "verified": false,
                "details": "Sender identity cannot be confirmed"
            },
            "technical_analysis": {
                "secure": false,
                "details": "No technical metadata supplied"
            },
            "behavioral_analysis": {
                "suspicious": true,
                "details": "Artificial 24 hour deadline"
            }
        },
        "final_decision": {
            "final_label": "fraud",
            "final_explanation": "Classic account-verification phishing"
        }
    })
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
llm:
  provider: groq
  base_url: "https://api.groq.com/openai/v1"
  api_key: "file-key"
  model: "llama-3.1-8b-instant"
  timeout_secs: 10

analysis:
  temperature: 0.1
  max_tokens: 2000

server:
  host: "127.0.0.1"
  port: 9000
  logs:
    level: "debug"
  rate_limit:
    analyze_per_minute: 3
"#;
