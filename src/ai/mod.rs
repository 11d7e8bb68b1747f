//! LLM-backed command interpretation
//!
//! Turns cleanup instructions into structured commands, drafts reply
//! suggestions and picks the messages an instruction refers to. The proxy server and the orchestration layer both sit on top
//! of [`CommandInterpreter`].

pub mod json;
pub mod local;
pub mod mock;
pub mod prompt;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::config::ResolvedAiConfig;
use crate::error::{AiError, CleanerError, Result};
use types::{
    AnalysisVerdict, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, EmailAnalysis,
    EmailDigest, ParsedCommand, ResponseFormat, SampleMessage, SuggestionsResponse,
};

pub use mock::MockChatClient;

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 500;

/// Minimal async interface for a chat-completion provider.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Send one user prompt and return the raw reply content.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Azure OpenAI chat-completions client
pub struct AzureChatClient {
    http_client: reqwest::Client,
    config: ResolvedAiConfig,
}

impl AzureChatClient {
    pub fn new(http_client: reqwest::Client, config: ResolvedAiConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint,
            self.config.deployment,
            urlencoding::encode(&self.config.api_version)
        )
    }
}

#[async_trait]
impl ChatCompletion for AzureChatClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.to_string(),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .http_client
            .post(self.completions_url())
            .header("api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Upstream {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AiError::EmptyResponse.into())
    }
}

/// Parses commands and suggests replies through a chat provider.
#[derive(Clone)]
pub struct CommandInterpreter {
    chat: Arc<dyn ChatCompletion>,
}

impl CommandInterpreter {
    pub fn new(chat: Arc<dyn ChatCompletion>) -> Self {
        Self { chat }
    }

    /// Translate a natural-language instruction into a structured command.
    pub async fn parse_command(&self, command: &str) -> Result<ParsedCommand> {
        let content = self
            .chat
            .complete(&prompt::parse_command_prompt(command))
            .await?;
        debug!(%content, "parse completion");

        let parsed: ParsedCommand = decode(&content)?;
        parsed.validate().map_err(|e| {
            error!(%content, error = %e, "model returned an unusable command");
            CleanerError::Parse(e)
        })?;
        Ok(parsed)
    }

    /// Ask for short replies suited to the sampled messages.
    pub async fn suggest_replies(
        &self,
        command: Option<&str>,
        parsed: Option<&ParsedCommand>,
        messages: &[SampleMessage],
    ) -> Result<SuggestionsResponse> {
        let content = self
            .chat
            .complete(&prompt::suggest_replies_prompt(command, parsed, messages))
            .await?;
        debug!(%content, "suggestion completion");

        decode(&content)
    }

    /// Ask which of `emails` the instruction selects.
    ///
    /// A reply that cannot be read yields an empty selection rather than an
    /// error; provider failures are still returned.
    pub async fn analyze_emails(
        &self,
        instruction: &str,
        emails: &[EmailDigest],
    ) -> Result<EmailAnalysis> {
        let content = self
            .chat
            .complete(&prompt::analyze_emails_prompt(instruction, emails))
            .await?;
        debug!(%content, "analysis completion");

        let verdict = json::parse_model_json::<AnalysisVerdict>(&content).unwrap_or_else(|e| {
            warn!(%content, error = %e, "unreadable analysis, matching nothing");
            AnalysisVerdict::unreadable()
        });
        Ok(verdict.apply(emails))
    }
}

fn decode<T: serde::de::DeserializeOwned>(content: &str) -> Result<T> {
    json::parse_model_json(content).map_err(|e| {
        error!(%content, error = %e, "failed to parse model response");
        CleanerError::Parse(e)
    })
}
