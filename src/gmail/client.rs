//! Gmail API client
//!
//! Listing, chunked detail fetch, bulk actions, labels and reply drafts.
//! Every call takes the access token explicitly; the client never refreshes
//! or stores it.

use futures::future::join_all;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::config::gmail::{API_BASE_URL, USER_ID};
use crate::error::{AuthError, CleanerError, GmailApiError, Result};
use crate::gmail::drafts::DraftComposer;
use crate::gmail::labels::LabelManager;
use crate::gmail::types::*;
use crate::gmail::utils::summarize_message;

/// Gmail API client
#[derive(Clone)]
pub struct GmailClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// REST root, e.g. `https://gmail.googleapis.com/gmail/v1`
    api_base: String,
}

impl Default for GmailClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl GmailClient {
    /// Create a new Gmail client
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            api_base: API_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different REST root
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Base URL for messages
    fn messages_url(&self) -> String {
        format!("{}/users/{}/messages", self.api_base, USER_ID)
    }

    /// URL of one message, with the id escaped as a path segment
    fn message_url(&self, message_id: &str) -> String {
        format!("{}/{}", self.messages_url(), urlencoding::encode(message_id))
    }

    // ==================== Message Fetcher ====================

    /// List message references matching a Gmail search query.
    ///
    /// An empty query lists everything. `max_results` caps what is requested;
    /// the provider may return fewer.
    pub async fn list_message_ids(
        &self,
        token: &str,
        query: &str,
        max_results: u32,
    ) -> Result<Vec<MessageRef>> {
        let mut url = format!("{}?maxResults={}", self.messages_url(), max_results);
        if !query.is_empty() {
            url.push_str(&format!("&q={}", urlencoding::encode(query)));
        }
        debug!(query, max_results, "listing messages");

        let response = self.http_client.get(&url).bearer_auth(token).send().await?;
        let message_list: MessageList = check_response(response, "list messages")
            .await?
            .json()
            .await?;

        Ok(message_list.messages)
    }

    /// Get a message by ID
    pub async fn get_message(&self, token: &str, message_id: &str) -> Result<Message> {
        let url = self.message_url(message_id);
        debug!(message_id, "fetching message");

        let response = self.http_client.get(&url).bearer_auth(token).send().await?;
        Ok(check_response(response, "get message").await?.json().await?)
    }

    /// Fetch summaries for `ids`, returned in the same order.
    ///
    /// Ids are fetched in contiguous chunks of at most `chunk_size`. Requests
    /// inside a chunk run concurrently and the next chunk starts only after
    /// every request of the current one has finished. Any failure fails the
    /// whole call.
    pub async fn get_message_details(
        &self,
        token: &str,
        ids: &[String],
        chunk_size: usize,
    ) -> Result<Vec<MessageSummary>> {
        let chunk_size = chunk_size.max(1);
        let mut summaries = Vec::with_capacity(ids.len());

        for (round, chunk) in ids.chunks(chunk_size).enumerate() {
            debug!(round, size = chunk.len(), "fetching detail chunk");
            let results = join_all(chunk.iter().map(|id| self.get_message(token, id))).await;

            for message in results {
                summaries.push(summarize_message(message?));
            }
        }

        Ok(summaries)
    }

    // ==================== Batch Action Executor ====================

    /// Move a message to trash
    pub async fn trash_message(&self, token: &str, message_id: &str) -> Result<()> {
        let url = format!("{}/trash", self.message_url(message_id));

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .header("Content-Length", "0")
            .send()
            .await?;

        check_response(response, "trash message").await?;
        Ok(())
    }

    /// Modify message labels
    pub async fn modify_message(
        &self,
        token: &str,
        message_id: &str,
        request: &ModifyMessageRequest,
    ) -> Result<()> {
        let url = format!("{}/modify", self.message_url(message_id));

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        check_response(response, "modify message").await?;
        Ok(())
    }

    /// Apply `action` to every id, one message at a time.
    ///
    /// For `ActionKind::Label` the label must already be resolved and passed
    /// as `label_id`. An action that cannot be mapped fails before any request
    /// is sent; after that, failures are recorded per message and never stop
    /// the batch.
    pub async fn apply_action(
        &self,
        token: &str,
        ids: &[String],
        action: &ActionKind,
        label_id: Option<&str>,
    ) -> Result<BatchResult> {
        let resolved = ResolvedAction::new(action, label_id)?;
        let mut result = BatchResult::default();

        for message_id in ids {
            let outcome = match &resolved {
                ResolvedAction::Trash => self.trash_message(token, message_id).await,
                ResolvedAction::Modify(request) => {
                    self.modify_message(token, message_id, request).await
                }
            };

            match outcome {
                Ok(()) => result.record_success(message_id.as_str()),
                Err(e) => {
                    warn!(message_id = %message_id, action = action.as_str(), error = %e, "action failed");
                    result.record_failure(message_id.as_str(), e.to_string());
                }
            }
        }

        info!(
            action = action.as_str(),
            succeeded = result.success_count(),
            failed = result.failure_count(),
            "batch action finished"
        );
        Ok(result)
    }

    // ==================== Label Resolver ====================

    /// Resolve a label name to its id, creating the label if needed
    pub async fn ensure_label(&self, token: &str, name: &str) -> Result<String> {
        LabelManager::new(&self.http_client, &self.api_base, token)
            .ensure(name)
            .await
    }

    // ==================== Draft Composer ====================

    /// Create a reply draft in the thread of the source message
    pub async fn create_draft_reply(
        &self,
        token: &str,
        source_message_id: &str,
        thread_id: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<Draft> {
        DraftComposer::new(&self.http_client, &self.api_base, token)
            .create_reply(source_message_id, thread_id, to, subject, body)
            .await
    }

    /// Draft the same reply to each message, isolating per-draft failures.
    ///
    /// Details for every message are fetched first; if that fails nothing is
    /// drafted.
    pub async fn create_drafts_for_messages(
        &self,
        token: &str,
        ids: &[String],
        body: &str,
        chunk_size: usize,
    ) -> Result<BatchResult> {
        let messages = self.get_message_details(token, ids, chunk_size).await?;
        let composer = DraftComposer::new(&self.http_client, &self.api_base, token);

        let mut result = BatchResult::default();
        for message in &messages {
            match composer.reply_to(message, body).await {
                Ok(_) => result.record_success(message.id.as_str()),
                Err(e) => {
                    warn!(message_id = %message.id, error = %e, "draft failed");
                    result.record_failure(message.id.as_str(), e.to_string());
                }
            }
        }

        info!(
            succeeded = result.success_count(),
            failed = result.failure_count(),
            "drafts created"
        );
        Ok(result)
    }
}

/// Turn a non-2xx response into the matching error.
///
/// 401 becomes `AuthError`; anything else becomes `GmailApiError::Provider`
/// carrying the envelope message verbatim.
pub(crate) async fn check_response(
    response: reqwest::Response,
    context: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = error_message(status, &text);
    debug!(status = status.as_u16(), context, %message, "gmail request failed");

    if status == StatusCode::UNAUTHORIZED {
        return Err(CleanerError::Auth(AuthError::Unauthorized { message }));
    }

    Err(CleanerError::Gmail(GmailApiError::Provider {
        status: status.as_u16(),
        message,
    }))
}

fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
    }
}
