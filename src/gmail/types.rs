//! Gmail API type definitions
//!
//! The wire types mirror the Gmail API responses and are used for
//! serialization/deserialization. The projection and batch types at the
//! bottom are what the rest of the crate hands around.

use serde::{Deserialize, Serialize};

use crate::error::InvalidActionError;

/// A Gmail message part (only headers are needed here)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    /// MIME type of this part
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Headers for this part
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,
}

/// Header in a message part
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    /// Header name
    pub name: String,

    /// Header value
    pub value: String,
}

/// A Gmail message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message ID
    pub id: String,

    /// Thread ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,

    /// Label IDs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub label_ids: Vec<String>,

    /// Snippet of message content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,

    /// Message payload (MIME structure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<MessagePart>,
}

/// List of message references
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageList {
    /// Message references
    #[serde(default)]
    pub messages: Vec<MessageRef>,

    /// Next page token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,

    /// Estimated total results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_size_estimate: Option<u32>,
}

/// Reference to a message (ID and thread ID)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    /// Message ID
    pub id: String,

    /// Thread ID
    #[serde(default)]
    pub thread_id: String,
}

/// A Gmail label
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    /// Label ID
    pub id: String,

    /// Label name
    pub name: String,

    /// Label type (system or user)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub label_type: Option<String>,

    /// Message list visibility
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_list_visibility: Option<String>,

    /// Label list visibility
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_list_visibility: Option<String>,
}

/// List of labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelList {
    /// Labels
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Request to create a label
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLabelRequest {
    /// Label name
    pub name: String,

    /// Label list visibility
    pub label_list_visibility: String,

    /// Message list visibility
    pub message_list_visibility: String,
}

/// Request to modify message labels
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModifyMessageRequest {
    /// Labels to add
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_label_ids: Option<Vec<String>>,

    /// Labels to remove
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_label_ids: Option<Vec<String>>,
}

/// Raw message carried inside a draft
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftMessage {
    /// Base64url-encoded RFC 2822 message
    pub raw: String,

    /// Thread to attach the draft to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

/// Request to create a draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDraftRequest {
    /// Message content
    pub message: DraftMessage,
}

/// A Gmail draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    /// Draft ID
    pub id: String,

    /// Message stub returned by the API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageRef>,
}

/// Google API error envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Read projection of a message shown in previews
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub id: String,
    pub thread_id: String,
    pub from: String,
    pub subject: String,
    pub date: String,
    pub snippet: String,
    pub label_ids: Vec<String>,
}

/// A cleanup action as requested by the user or the command parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Delete,
    Archive,
    MarkRead,
    MarkUnread,
    Label(String),
}

impl ActionKind {
    /// Build an action from its wire name. `label` needs a non-empty label name.
    pub fn parse(action: &str, label: Option<&str>) -> Result<Self, InvalidActionError> {
        match action {
            "delete" | "trash" => Ok(ActionKind::Delete),
            "archive" => Ok(ActionKind::Archive),
            "mark_read" | "markRead" => Ok(ActionKind::MarkRead),
            "mark_unread" | "markUnread" => Ok(ActionKind::MarkUnread),
            "label" => match label.map(str::trim) {
                Some(name) if !name.is_empty() => Ok(ActionKind::Label(name.to_string())),
                _ => Err(InvalidActionError::MissingLabel),
            },
            other => Err(InvalidActionError::Unknown {
                action: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Delete => "delete",
            ActionKind::Archive => "archive",
            ActionKind::MarkRead => "mark_read",
            ActionKind::MarkUnread => "mark_unread",
            ActionKind::Label(_) => "label",
        }
    }
}

/// An action whose label, if any, has been resolved to a provider id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAction {
    Trash,
    Modify(ModifyMessageRequest),
}

impl ResolvedAction {
    /// Map an action onto the Gmail primitive that implements it.
    ///
    /// `label_id` must be the resolved id when `action` is `Label`.
    pub fn new(action: &ActionKind, label_id: Option<&str>) -> Result<Self, InvalidActionError> {
        use crate::config::gmail::labels::{INBOX, UNREAD};

        let modify = match action {
            ActionKind::Delete => return Ok(ResolvedAction::Trash),
            ActionKind::Archive => ModifyMessageRequest {
                add_label_ids: None,
                remove_label_ids: Some(vec![INBOX.to_string()]),
            },
            ActionKind::MarkRead => ModifyMessageRequest {
                add_label_ids: None,
                remove_label_ids: Some(vec![UNREAD.to_string()]),
            },
            ActionKind::MarkUnread => ModifyMessageRequest {
                add_label_ids: Some(vec![UNREAD.to_string()]),
                remove_label_ids: None,
            },
            ActionKind::Label(_) => {
                let id = label_id.ok_or(InvalidActionError::MissingLabel)?;
                ModifyMessageRequest {
                    add_label_ids: Some(vec![id.to_string()]),
                    remove_label_ids: None,
                }
            }
        };

        Ok(ResolvedAction::Modify(modify))
    }
}

/// One message the batch could not process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedItem {
    pub id: String,
    pub error_message: String,
}

/// Per-message outcome of a batch operation.
///
/// Every input id lands in exactly one of the two lists, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedItem>,
}

impl BatchResult {
    pub fn record_success(&mut self, id: impl Into<String>) {
        self.succeeded.push(id.into());
    }

    pub fn record_failure(&mut self, id: impl Into<String>, error_message: impl Into<String>) {
        self.failed.push(FailedItem {
            id: id.into(),
            error_message: error_message.into(),
        });
    }

    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}
