//! Cleanup orchestration
//!
//! Sequences command interpretation, message lookup and the bulk actions for
//! one user request. State lives in an explicit [`Session`]; requests are a
//! [`Command`] dispatched through [`Orchestrator::dispatch`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::ai::local::analyze_locally;
use crate::ai::types::{
    AnalyzeRequest, EmailAnalysis, EmailDigest, ParseRequest, ParsedCommand, ReplySuggestion,
    SampleMessage, SuggestRepliesRequest, SuggestionsResponse,
};
use crate::ai::CommandInterpreter;
use crate::config::gmail::{
    ANALYSIS_LIMIT, DEFAULT_CHUNK_SIZE, DEFAULT_LIST_LIMIT, PREVIEW_DETAIL_LIMIT,
};
use crate::error::{AiError, AuthError, CleanerError, ParseError, Result};
use crate::gmail::client::GmailClient;
use crate::gmail::types::{ActionKind, BatchResult, MessageSummary};
use crate::server::types::ApiErrorBody;

/// How many previewed messages are sent for reply suggestions
const SUGGESTION_SAMPLE: usize = 5;

/// An authenticated user session
#[derive(Debug, Clone)]
pub struct Session {
    access_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Result<Self> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(AuthError::MissingToken.into());
        }
        Ok(Self { access_token })
    }

    pub fn token(&self) -> &str {
        &self.access_token
    }
}

/// Something that can interpret cleanup commands
#[async_trait]
pub trait Interpreter: Send + Sync {
    async fn parse(&self, command: &str) -> Result<ParsedCommand>;

    async fn suggest(&self, request: &SuggestRepliesRequest) -> Result<SuggestionsResponse>;

    async fn analyze(&self, instruction: &str, emails: &[EmailDigest]) -> Result<EmailAnalysis>;
}

#[async_trait]
impl Interpreter for CommandInterpreter {
    async fn parse(&self, command: &str) -> Result<ParsedCommand> {
        self.parse_command(command).await
    }

    async fn suggest(&self, request: &SuggestRepliesRequest) -> Result<SuggestionsResponse> {
        let messages = request.messages.as_deref().unwrap_or_default();
        self.suggest_replies(request.command.as_deref(), request.parsed.as_ref(), messages)
            .await
    }

    async fn analyze(&self, instruction: &str, emails: &[EmailDigest]) -> Result<EmailAnalysis> {
        self.analyze_emails(instruction, emails).await
    }
}

/// HTTP client for a running AI proxy
pub struct ProxyClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post<B, T>(&self, route: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, route))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| match b.message {
                    Some(detail) => format!("{}: {}", b.error, detail),
                    None => b.error,
                })
                .unwrap_or(text);
            return Err(AiError::Proxy {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        serde_json::from_str(&text).map_err(|e| {
            error!(route, content = %text, "proxy returned unexpected content");
            CleanerError::Parse(ParseError::Schema {
                message: e.to_string(),
            })
        })
    }
}

#[async_trait]
impl Interpreter for ProxyClient {
    async fn parse(&self, command: &str) -> Result<ParsedCommand> {
        let request = ParseRequest {
            command: Some(command.to_string()),
        };
        let parsed: ParsedCommand = self.post("/ai/parse", &request).await?;
        parsed.validate()?;
        Ok(parsed)
    }

    async fn suggest(&self, request: &SuggestRepliesRequest) -> Result<SuggestionsResponse> {
        self.post("/ai/suggestReplies", request).await
    }

    async fn analyze(&self, instruction: &str, emails: &[EmailDigest]) -> Result<EmailAnalysis> {
        let request = AnalyzeRequest {
            prompt: Some(instruction.to_string()),
            emails: Some(emails.to_vec()),
        };
        self.post("/ai/analyze", &request).await
    }
}

/// A user request to the cleanup core
#[derive(Debug, Clone)]
pub enum Command {
    /// Interpret `command` (or use the override) and show what it matches
    Preview {
        command: String,
        action_override: Option<String>,
        label_name: Option<String>,
    },
    /// Apply an action to chosen messages
    Execute {
        message_ids: Vec<String>,
        action: String,
        label_name: Option<String>,
    },
    /// Draft the same reply to chosen messages
    CreateDrafts {
        message_ids: Vec<String>,
        suggestion_text: String,
    },
    /// Pick which recent messages `command` refers to
    Analyze { command: String },
}

/// What a preview found
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub parsed: ParsedCommand,
    /// Ids matched by the query, before the detail limit
    pub message_count: usize,
    pub messages: Vec<MessageSummary>,
    pub suggestions: Vec<ReplySuggestion>,
}

/// Result of a dispatched command
#[derive(Debug, Clone)]
pub enum Outcome {
    Previewed(Preview),
    Executed(BatchResult),
    Drafted(BatchResult),
    Analyzed(EmailAnalysis),
}

/// Runs commands against Gmail and an interpreter
pub struct Orchestrator {
    gmail: GmailClient,
    interpreter: Arc<dyn Interpreter>,
}

impl Orchestrator {
    pub fn new(gmail: GmailClient, interpreter: Arc<dyn Interpreter>) -> Self {
        Self { gmail, interpreter }
    }

    /// Single entry point for every command
    pub async fn dispatch(&self, session: &Session, command: Command) -> Result<Outcome> {
        match command {
            Command::Preview {
                command,
                action_override,
                label_name,
            } => self
                .preview(session, &command, action_override, label_name)
                .await
                .map(Outcome::Previewed),
            Command::Execute {
                message_ids,
                action,
                label_name,
            } => self
                .execute(session, &message_ids, &action, label_name.as_deref())
                .await
                .map(Outcome::Executed),
            Command::CreateDrafts {
                message_ids,
                suggestion_text,
            } => self
                .gmail
                .create_drafts_for_messages(
                    session.token(),
                    &message_ids,
                    &suggestion_text,
                    DEFAULT_CHUNK_SIZE,
                )
                .await
                .map(Outcome::Drafted),
            Command::Analyze { command } => self
                .analyze(session, &command)
                .await
                .map(Outcome::Analyzed),
        }
    }

    async fn preview(
        &self,
        session: &Session,
        command: &str,
        action_override: Option<String>,
        label_name: Option<String>,
    ) -> Result<Preview> {
        let parsed = match action_override {
            Some(action) => {
                ActionKind::parse(&action, label_name.as_deref())?;
                ParsedCommand {
                    action,
                    query: String::new(),
                    label: label_name,
                }
            }
            None => self.interpreter.parse(non_empty(command)?).await?,
        };
        info!(action = %parsed.action, query = %parsed.query, "previewing command");

        let refs = self
            .gmail
            .list_message_ids(session.token(), &parsed.query, DEFAULT_LIST_LIMIT)
            .await?;
        let message_count = refs.len();

        let ids: Vec<String> = refs
            .into_iter()
            .take(PREVIEW_DETAIL_LIMIT)
            .map(|r| r.id)
            .collect();
        let messages = self
            .gmail
            .get_message_details(session.token(), &ids, DEFAULT_CHUNK_SIZE)
            .await?;

        let suggestions = if messages.is_empty() {
            Vec::new()
        } else {
            self.suggestions_for(command, &parsed, &messages).await
        };

        Ok(Preview {
            parsed,
            message_count,
            messages,
            suggestions,
        })
    }

    /// Suggestions are optional; a failure here only loses them.
    async fn suggestions_for(
        &self,
        command: &str,
        parsed: &ParsedCommand,
        messages: &[MessageSummary],
    ) -> Vec<ReplySuggestion> {
        let request = SuggestRepliesRequest {
            command: Some(command.to_string()),
            parsed: Some(parsed.clone()),
            messages: Some(
                messages
                    .iter()
                    .take(SUGGESTION_SAMPLE)
                    .map(|m| SampleMessage {
                        from: m.from.clone(),
                        subject: m.subject.clone(),
                        snippet: m.snippet.clone(),
                    })
                    .collect(),
            ),
        };

        match self.interpreter.suggest(&request).await {
            Ok(response) => response.suggestions,
            Err(e) => {
                warn!("Failed to get suggestions: {}", e);
                Vec::new()
            }
        }
    }

    /// Analyze the most recent messages. If the interpreter fails, keyword
    /// and timeframe matching is used instead.
    async fn analyze(&self, session: &Session, command: &str) -> Result<EmailAnalysis> {
        let command = non_empty(command)?;

        let ids: Vec<String> = self
            .gmail
            .list_message_ids(session.token(), "", ANALYSIS_LIMIT)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        let messages = self
            .gmail
            .get_message_details(session.token(), &ids, DEFAULT_CHUNK_SIZE)
            .await?;
        let emails: Vec<EmailDigest> = messages.iter().map(EmailDigest::from).collect();

        match self.interpreter.analyze(command, &emails).await {
            Ok(analysis) => Ok(analysis),
            Err(e) => {
                warn!("AI analysis failed, matching locally: {}", e);
                Ok(analyze_locally(command, &emails, Utc::now()))
            }
        }
    }

    async fn execute(
        &self,
        session: &Session,
        message_ids: &[String],
        action: &str,
        label_name: Option<&str>,
    ) -> Result<BatchResult> {
        let kind = ActionKind::parse(action, label_name)?;

        let label_id = match &kind {
            ActionKind::Label(name) => Some(self.gmail.ensure_label(session.token(), name).await?),
            _ => None,
        };

        self.gmail
            .apply_action(session.token(), message_ids, &kind, label_id.as_deref())
            .await
    }
}

fn non_empty(command: &str) -> Result<&str> {
    let command = command.trim();
    if command.is_empty() {
        return Err(ParseError::EmptyCommand.into());
    }
    Ok(command)
}
