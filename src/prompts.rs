// Prompt templates sent to the text model.

use crate::summary::SummaryResponse;
use crate::ChatMessage;

pub fn summary_prompt(title: &str, reviews_text: &str) -> String {
    format!(
        r#"Summarize the following reviews.
Each review is separated by a line break.
Ignore any irrelevant reviews like ASCII art or jokes.
Besides the summary, enumerate at most five positive and negative points about the games.
Use the following JSON template for the summary.
EXPORT RAW, MINIFIED JSON. NO MARKDOWN OR ANYTHING ELSE.
{{
  "title": "[game title]",
  "summary": "[review summary]",
  "positive": ["[positive points]"],
  "negative": ["[negative points]"]
}}
Game title:
{title}
Review list:
{reviews_text}"#
    )
}

/// Renders summaries as `Game / Summary / Positive Points / Negative Points` blocks.
/// The error field is never rendered.
pub fn render_summaries(summaries: &[SummaryResponse]) -> String {
    summaries
        .iter()
        .map(|s| {
            format!(
                "Game: {}\nSummary: {}\nPositive Points: {}\nNegative Points: {}",
                s.title,
                s.summary,
                s.positive.join(", "),
                s.negative.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn chat_prompt(history: &[ChatMessage], summaries: &[SummaryResponse]) -> String {
    let history_text = history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a helpful assistant knowledgeable about video games.\n\
The user has provided summaries for the following games:\n\
{}\n\
\n\
Continue the conversation based on these summaries and the chat history below.\n\
If asked about other games not in the summary, do your best to answer based on your knowledge.\n\
Keep your answers concise and helpful.\n\
Only answer questions related to video games.\n\
Do not answer any other questions.\n\
\n\
Chat History:\n\
{}\n\
assistant:",
        render_summaries(summaries),
        history_text
    )
}

pub fn suggestions_prompt(summaries: &[SummaryResponse]) -> String {
    format!(
        "You are a helpful assistant knowledgeable about video games.\n\
The user has provided summaries, positive and negative points for the following games:\n\
{}\n\
Based on these summaries, and what you know as an expert, but mainly focusing on the summaries, \
write a list of three questions that the user can ask to get more information about the games.\n\
Try to keep questions below 10 words.\n\
Format the questions as a JSON array of strings, like this:\n\
[\"Question 1\", \"Question 2\", \"Question 3\"]",
        render_summaries(summaries)
    )
}
