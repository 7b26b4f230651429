// Conversation flow on top of the chat requester: user turns are recorded, model
// failures turn into an apology instead of an error, and suggestions fall back to
// a fixed list.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info};

use crate::config::Config;
use crate::constants::{CHAT_APOLOGY, FALLBACK_SUGGESTIONS};
use crate::llm_interaction::GeminiClient;
use crate::summary::{fetch_ai_chat_response, fetch_ai_suggestions, SummaryResponse};
use crate::{ChatHistory, ChatMessage, Role};

/// Asks the model for the next assistant turn. Never fails: errors become an apology.
pub async fn respond(
    ai: &GeminiClient,
    config: &Config,
    history: &[ChatMessage],
    summaries: &[SummaryResponse],
) -> ChatMessage {
    match fetch_ai_chat_response(ai, config, history, summaries).await {
        Ok(reply) => ChatMessage::new(Role::Assistant, reply),
        Err(e) => {
            error!("Error fetching AI response: {}", e);
            ChatMessage::new(Role::Assistant, CHAT_APOLOGY)
        }
    }
}

/// Records the user's message and the assistant's reply. Blank input is ignored.
pub async fn send_message(
    ai: &GeminiClient,
    config: &Config,
    history: &mut ChatHistory,
    summaries: &[SummaryResponse],
    content: &str,
) -> Option<ChatMessage> {
    if content.trim().is_empty() {
        return None;
    }
    history.add_message(ChatMessage::new(Role::User, content));
    let reply = respond(ai, config, history.messages(), summaries).await;
    history.add_message(reply.clone());
    Some(reply)
}

pub fn fallback_suggestions() -> Vec<String> {
    FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

/// `None` when there is nothing to base suggestions on.
pub async fn load_suggestions(
    ai: &GeminiClient,
    config: &Config,
    summaries: &[SummaryResponse],
) -> Option<Vec<String>> {
    if summaries.is_empty() {
        return None;
    }
    match fetch_ai_suggestions(ai, config, summaries).await {
        Ok(suggestions) => Some(suggestions),
        Err(e) => {
            error!("Error fetching suggestions: {}", e);
            Some(fallback_suggestions())
        }
    }
}

/// Terminal chat about the summarized games. `/suggest`, `/clear` and `/quit` are
/// handled locally; end of input also quits.
pub async fn run_interactive_chat<R, W>(
    ai: &GeminiClient,
    config: &Config,
    summaries: &[SummaryResponse],
    input: R,
    output: &mut W,
) -> Result<ChatHistory>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    info!("Starting interactive chat...");
    let mut history = ChatHistory::new();
    let mut lines = input.lines();

    writeln!(output, "Ask about the games. Commands: /suggest, /clear, /quit")?;
    loop {
        write!(output, "> ")?;
        output.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" => break,
            "/clear" => {
                history.clear();
                writeln!(output, "(chat cleared)")?;
            }
            "/suggest" => {
                let suggestions = load_suggestions(ai, config, summaries)
                    .await
                    .unwrap_or_default();
                for suggestion in suggestions {
                    writeln!(output, "  - {}", suggestion)?;
                }
            }
            text => {
                if let Some(reply) = send_message(ai, config, &mut history, summaries, text).await {
                    writeln!(output, "assistant: {}", reply.content)?;
                }
            }
        }
    }

    info!("Chat session finished with {} messages", history.len());
    Ok(history)
}
