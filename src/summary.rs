// AI-derived game summaries, suggestions and chat replies, and the parsing of
// structured data out of free-form model output.

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::constants::SUMMARY_ERROR_MARKER;
use crate::error::{SageError, SageResult};
use crate::llm_interaction::GeminiClient;
use crate::prompts;
use crate::ChatMessage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SummaryResponse {
    /// Placeholder for a game whose summary could not be produced.
    pub fn failed(title: impl Into<String>, error: impl ToString) -> Self {
        Self {
            title: title.into(),
            summary: SUMMARY_ERROR_MARKER.to_string(),
            positive: Vec::new(),
            negative: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

fn delimited_slice(text: &str, open: char, close: char) -> &str {
    match (text.find(open), text.rfind(close)) {
        (Some(start), Some(end)) if start <= end => &text[start..=end],
        _ => "",
    }
}

/// Everything from the first `{` to the last `}`, inclusive. Empty when there is no such pair.
pub fn json_object_slice(text: &str) -> &str {
    delimited_slice(text, '{', '}')
}

/// Everything from the first `[` to the last `]`, inclusive. Empty when there is no such pair.
pub fn json_array_slice(text: &str) -> &str {
    delimited_slice(text, '[', ']')
}

/// Parses model output into a summary. A blank title falls back to the requested one.
pub fn parse_summary(raw: &str, title: &str) -> SageResult<SummaryResponse> {
    let mut summary: SummaryResponse = serde_json::from_str(json_object_slice(raw))
        .map_err(|e| {
            error!("Error parsing JSON for {}: {}", title, e);
            SageError::Format("Error parsing JSON".to_string())
        })?;

    if summary.title.trim().is_empty() {
        summary.title = title.to_string();
    }
    summary.error = None;
    Ok(summary)
}

/// Accepts only a JSON array of exactly three strings.
pub fn parse_suggestions(raw: &str) -> SageResult<Vec<String>> {
    let invalid = || SageError::Format("Failed to parse AI response".to_string());

    let value: serde_json::Value = serde_json::from_str(json_array_slice(raw)).map_err(|e| {
        error!("Error parsing AI response: {}", e);
        invalid()
    })?;
    let items = value.as_array().ok_or_else(invalid)?;
    if items.len() != 3 {
        error!("Expected three suggestions, got {}", items.len());
        return Err(invalid());
    }

    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

/// Asks the model to summarize newline-joined reviews. Returns the JSON slice of the
/// reply; parsing it is the caller's job.
#[instrument(skip(ai, config, text))]
pub async fn fetch_ai_summary(
    ai: &GeminiClient,
    config: &Config,
    text: &str,
    title: &str,
) -> SageResult<String> {
    let prompt = prompts::summary_prompt(title, text);
    let output = ai
        .generate(&config.summary_model, &prompt)
        .await
        .map_err(|e| {
            error!("Error fetching AI summary: {}", e);
            e
        })?;
    Ok(json_object_slice(&output).to_string())
}

#[instrument(skip_all, fields(games = summaries.len()))]
pub async fn fetch_ai_suggestions(
    ai: &GeminiClient,
    config: &Config,
    summaries: &[SummaryResponse],
) -> SageResult<Vec<String>> {
    let prompt = prompts::suggestions_prompt(summaries);
    let output = ai.generate(&config.summary_model, &prompt).await?;
    let questions = parse_suggestions(&output)?;
    info!(?questions, "Received suggestions");
    Ok(questions)
}

/// The model keeps no memory between calls, so the whole history is replayed each time.
#[instrument(skip_all, fields(messages = history.len(), games = summaries.len()))]
pub async fn fetch_ai_chat_response(
    ai: &GeminiClient,
    config: &Config,
    history: &[ChatMessage],
    summaries: &[SummaryResponse],
) -> SageResult<String> {
    let prompt = prompts::chat_prompt(history, summaries);
    let output = ai.generate(&config.chat_model, &prompt).await.map_err(|e| {
        error!("Error fetching AI chat response: {}", e);
        e
    })?;
    Ok(output.trim().to_string())
}
