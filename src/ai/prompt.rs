//! Prompt templates for the command parser, reply suggester and email analyzer

use crate::ai::types::{EmailDigest, ParsedCommand, SampleMessage};

/// System message sent with every completion
pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that returns only valid JSON responses without markdown formatting.";

/// How many messages the reply prompt samples
pub const MAX_SAMPLE_MESSAGES: usize = 5;

/// How many emails the analysis prompt lists
pub const MAX_ANALYZED_EMAILS: usize = 50;

const DEFAULT_COMMAND: &str = "Cleanup emails";

const PARSE_EXAMPLES: &str = r#"Examples:
Command: "Delete promotional emails older than 6 months"
Response: {"action": "delete", "query": "category:promotions older_than:6m"}

Command: "Archive newsletters from last year"
Response: {"action": "archive", "query": "category:updates older_than:1y"}

Command: "Mark all unread LinkedIn emails as read"
Response: {"action": "mark_read", "query": "from:linkedin.com is:unread"}

Command: "Mark everything from my manager as unread"
Response: {"action": "mark_unread", "query": "from:manager@example.com"}

Command: "Label all receipts from Amazon as Receipts"
Response: {"action": "label", "query": "from:amazon.com subject:(order OR receipt)", "label": "Receipts"}"#;

/// Prompt turning a cleanup instruction into `{action, query, label?}`.
pub fn parse_command_prompt(command: &str) -> String {
    format!(
        r#"You parse Gmail cleanup commands into structured actions.

Given a natural language command, extract:
1. action: one of "delete", "archive", "mark_read", "mark_unread", or "label"
2. query: Gmail search query string to match emails
3. label (optional): label name if action is "label"

Command: "{command}"

Return ONLY valid JSON in this exact format:
{{
  "action": "delete|archive|mark_read|mark_unread|label",
  "query": "gmail search query",
  "label": "label name (if applicable)"
}}

{PARSE_EXAMPLES}"#
    )
}

/// Prompt asking for short replies to send before cleaning up `messages`.
///
/// Only the first `MAX_SAMPLE_MESSAGES` messages are included.
pub fn suggest_replies_prompt(
    command: Option<&str>,
    parsed: Option<&ParsedCommand>,
    messages: &[SampleMessage],
) -> String {
    let command = command
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_COMMAND);

    let messages_text = messages
        .iter()
        .take(MAX_SAMPLE_MESSAGES)
        .enumerate()
        .map(|(idx, msg)| {
            format!(
                "Message {}:\nFrom: {}\nSubject: {}\nSnippet: {}\n---",
                idx + 1,
                msg.from,
                msg.subject,
                msg.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let planned = parsed
        .map(|p| format!("Planned action: {} (query: {})\n\n", p.action, p.query))
        .unwrap_or_default();

    format!(
        r#"You generate suggested email replies.

User Command: "{command}"

{planned}Sample Messages:
{messages_text}

Based on these sample messages, generate 3-5 brief, professional reply suggestions that users might want to send before cleaning up these emails. Suggestions should be polite decline/unsubscribe messages, acknowledgments, or quick responses.

Return ONLY valid JSON in this exact format (no markdown, no code blocks):
{{
  "suggestions": [
    {{ "text": "Thank you for reaching out. I'm currently managing my inbox and won't be able to respond to this email." }},
    {{ "text": "I appreciate your message, but I'd like to unsubscribe from future communications." }}
  ]
}}

Each suggestion should be 1-2 sentences maximum."#
    )
}

/// Prompt asking which of `emails` the instruction selects.
///
/// Only the first `MAX_ANALYZED_EMAILS` emails are listed; empty fields are
/// shown as placeholders.
pub fn analyze_emails_prompt(instruction: &str, emails: &[EmailDigest]) -> String {
    fn filled<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
        if value.trim().is_empty() {
            placeholder
        } else {
            value
        }
    }

    let emails_text = emails
        .iter()
        .take(MAX_ANALYZED_EMAILS)
        .map(|email| {
            format!(
                "ID: {}\nFrom: {}\nSubject: {}\nDate: {}\nSnippet: {}\n---",
                email.id,
                filled(&email.from, "Unknown sender"),
                filled(&email.subject, "No subject"),
                filled(&email.date, "Unknown date"),
                email.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You help clean up email inboxes.

User instruction: "{instruction}"

Recent emails (up to {MAX_ANALYZED_EMAILS}):
{emails_text}

Decide which of these emails match the instruction and which action to take: "delete", "archive" or "mark_read". Be conservative and only select emails that clearly match.

Return ONLY valid JSON in this exact format:
{{
  "action": "delete|archive|mark_read",
  "matchedEmailIds": ["id1", "id2"],
  "summary": "Brief explanation of the analysis",
  "reasoning": "Why these emails were selected"
}}"#
    )
}
