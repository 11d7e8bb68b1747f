//! AI proxy type definitions
//!
//! Request/response bodies of the proxy endpoints and the chat-completions
//! wire format of the upstream provider.

use serde::{Deserialize, Serialize};

use crate::error::{InvalidActionError, ParseError};
use crate::gmail::types::{ActionKind, MessageSummary};

/// Structured form of a natural-language cleanup instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommand {
    /// `delete`, `archive`, `mark_read`, `mark_unread` or `label`
    pub action: String,

    /// Gmail search query selecting the messages
    #[serde(default)]
    pub query: String,

    /// Label name for the `label` action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ParsedCommand {
    pub fn action_kind(&self) -> Result<ActionKind, InvalidActionError> {
        ActionKind::parse(&self.action, self.label.as_deref())
    }

    /// Reject model output naming an action we cannot execute.
    pub fn validate(&self) -> Result<(), ParseError> {
        self.action_kind().map(|_| ()).map_err(|e| ParseError::Schema {
            message: e.to_string(),
        })
    }
}

/// One suggested reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplySuggestion {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    #[serde(default)]
    pub suggestions: Vec<ReplySuggestion>,
}

/// Body of `POST /ai/parse`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseRequest {
    #[serde(default)]
    pub command: Option<String>,
}

/// Message fields the reply prompt looks at
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleMessage {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub snippet: String,
}

/// Body of `POST /ai/suggestReplies`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestRepliesRequest {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub parsed: Option<ParsedCommand>,
    #[serde(default)]
    pub messages: Option<Vec<SampleMessage>>,
}

/// Message fields an analysis looks at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailDigest {
    pub id: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub snippet: String,
}

impl From<&MessageSummary> for EmailDigest {
    fn from(message: &MessageSummary) -> Self {
        Self {
            id: message.id.clone(),
            from: message.from.clone(),
            subject: message.subject.clone(),
            date: message.date.clone(),
            snippet: message.snippet.clone(),
        }
    }
}

/// Body of `POST /ai/analyze`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub emails: Option<Vec<EmailDigest>>,
}

/// The model's pick of messages matching an instruction
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisVerdict {
    #[serde(default = "default_verdict_action")]
    pub action: String,
    #[serde(default)]
    pub matched_email_ids: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub reasoning: String,
}

fn default_verdict_action() -> String {
    "delete".to_string()
}

impl AnalysisVerdict {
    /// Stand-in used when the model reply cannot be read.
    pub fn unreadable() -> Self {
        Self {
            action: default_verdict_action(),
            matched_email_ids: Vec::new(),
            summary: "Unable to analyze emails automatically".to_string(),
            reasoning: "The AI response could not be parsed".to_string(),
        }
    }

    /// Keep the analyzed emails the verdict names, in their original order.
    /// Ids that were not analyzed are ignored.
    pub fn apply(self, emails: &[EmailDigest]) -> EmailAnalysis {
        let matched_emails = emails
            .iter()
            .filter(|email| self.matched_email_ids.contains(&email.id))
            .cloned()
            .collect();

        EmailAnalysis {
            total_emails: emails.len(),
            matched_emails,
            action: self.action,
            summary: self.summary,
            reasoning: Some(self.reasoning).filter(|r| !r.is_empty()),
        }
    }
}

/// Which of a set of emails an instruction selects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAnalysis {
    pub total_emails: usize,
    pub matched_emails: Vec<EmailDigest>,
    pub action: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

// ==================== Upstream wire format ====================

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub response_format: ResponseFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}
