//! Gmail utility functions
//!
//! Header lookup, message projection and reply construction.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::gmail::types::{Message, MessagePart, MessageSummary};

/// Prefix marking a reply subject
pub const REPLY_PREFIX: &str = "Re:";

/// Encode a raw email message for Gmail API (base64url, no padding)
pub fn encode_raw_message(message: &str) -> String {
    URL_SAFE_NO_PAD.encode(message.as_bytes())
}

/// Find header value by name (case-insensitive)
pub fn find_header<'a>(part: &'a MessagePart, name: &str) -> Option<&'a str> {
    part.headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
}

/// Project a full message onto the fields shown in a preview.
pub fn summarize_message(message: Message) -> MessageSummary {
    let header = |name: &str| {
        message
            .payload
            .as_ref()
            .and_then(|p| find_header(p, name))
            .unwrap_or("")
            .to_string()
    };

    let from = header("From");
    let subject = header("Subject");
    let date = header("Date");

    MessageSummary {
        id: message.id,
        thread_id: message.thread_id.unwrap_or_default(),
        from,
        subject,
        date,
        snippet: message.snippet.unwrap_or_default(),
        label_ids: message.label_ids,
    }
}

/// Pick the reply address out of a `From` header.
///
/// `Jane Doe <jane@example.com>` yields the bracketed address; anything
/// without a complete `<...>` pair is returned verbatim.
pub fn extract_recipient(from: &str) -> &str {
    if let Some(start) = from.find('<') {
        let rest = &from[start + 1..];
        if let Some(end) = rest.find('>') {
            if end > 0 {
                return &rest[..end];
            }
        }
    }
    from
}

/// Subject for a reply, prefixed exactly once.
pub fn reply_subject(subject: &str) -> String {
    if subject.starts_with(REPLY_PREFIX) {
        subject.to_string()
    } else {
        format!("{} {}", REPLY_PREFIX, subject)
    }
}

/// Build a minimal plain-text RFC 2822 message.
pub fn create_reply_message(to: &str, subject: &str, body: &str) -> String {
    [
        format!("To: {}", to),
        format!("Subject: {}", subject),
        "Content-Type: text/plain; charset=utf-8".to_string(),
        String::new(),
        body.to_string(),
    ]
    .join("\r\n")
}
