use std::time::Duration;

use chrono::SecondsFormat;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{AiError, InsightProvider, RawCategorization};
use crate::config::AiSettings;
use crate::ledger::{Category, Transaction};

const SYSTEM_INSTRUCTION: &str = "You are a professional financial advisor. Your tips must be under 10 words each. Focus on spending reduction and savings. No conversational filler.";

/// Blocking client for the `generateContent` endpoint.
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl Content {
    fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part {
                text: Some(text.into()),
            }],
        }
    }
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(self) -> Option<String> {
        let candidate = self.candidates.into_iter().next()?;
        let text: String = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        Some(text)
    }
}

impl GeminiClient {
    /// `Ok(None)` when no API key is available.
    pub fn from_settings(settings: &AiSettings) -> Result<Option<Self>, AiError> {
        let Some(api_key) = settings.api_key() else {
            return Ok(None);
        };
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()?;
        Ok(Some(Self {
            http,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
        }))
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn generate(&self, request: &GenerateRequest) -> Result<String, AiError> {
        tracing::debug!(model = %self.model, "sending generateContent request");
        let res = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()?;

        let status = res.status();
        if !status.is_success() {
            let message = res
                .json::<ErrorEnvelope>()
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AiError::Status(status.as_u16(), message));
        }

        res.json::<GenerateResponse>()?
            .text()
            .ok_or_else(|| AiError::Malformed("response had no candidates".into()))
    }
}

fn categorize_prompt(text: &str) -> String {
    let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
    format!(
        "Extract spending details from this text: \"{text}\". If amount is not clear, use 0. Categories: {}.",
        labels.join(", ")
    )
}

fn insights_prompt(transactions: &[Transaction]) -> String {
    let data = transactions
        .iter()
        .map(|t| {
            format!(
                "{}: {} in {} ({})",
                t.date.to_rfc3339_opts(SecondsFormat::Millis, true),
                t.amount,
                t.category,
                t.note
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Analyze these transactions and provide 3 extremely concise, actionable financial \"pro-tips\" for a budgeting app.\n\
         Format the response as a simple list separated by pipe characters (|).\n\
         Example: Reduce dining out|Check for duplicate subs|Set a transport goal.\n\
         Transactions: \n{data}"
    )
}

fn categorize_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "amount": { "type": "NUMBER" },
            "category": { "type": "STRING" },
            "note": { "type": "STRING" }
        },
        "required": ["amount", "category", "note"]
    })
}

impl InsightProvider for GeminiClient {
    fn categorize(&self, text: &str) -> Result<RawCategorization, AiError> {
        let request = GenerateRequest {
            contents: vec![Content::text(categorize_prompt(text))],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
                response_schema: categorize_schema(),
            }),
        };
        let body = self.generate(&request)?;
        if body.trim().is_empty() {
            return Ok(RawCategorization::default());
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn insights(&self, transactions: &[Transaction]) -> Result<String, AiError> {
        let request = GenerateRequest {
            contents: vec![Content::text(insights_prompt(transactions))],
            system_instruction: Some(Content::text(SYSTEM_INSTRUCTION)),
            generation_config: None,
        };
        self.generate(&request)
    }
}
