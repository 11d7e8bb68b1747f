//! Reply drafts
//!
//! Builds plain-text replies and files them as drafts in the original thread.

use tracing::debug;

use crate::config::gmail::USER_ID;
use crate::error::Result;
use crate::gmail::client::check_response;
use crate::gmail::types::{CreateDraftRequest, Draft, DraftMessage, MessageSummary};
use crate::gmail::utils::{create_reply_message, encode_raw_message, extract_recipient, reply_subject};

/// Draft composer for Gmail operations
pub struct DraftComposer<'a> {
    client: &'a reqwest::Client,
    api_base: &'a str,
    access_token: &'a str,
}

impl<'a> DraftComposer<'a> {
    pub fn new(client: &'a reqwest::Client, api_base: &'a str, access_token: &'a str) -> Self {
        Self {
            client,
            api_base,
            access_token,
        }
    }

    fn drafts_url(&self) -> String {
        format!("{}/users/{}/drafts", self.api_base, USER_ID)
    }

    /// Submit a reply draft attached to `thread_id`.
    ///
    /// `subject` gets the reply prefix unless it already has one. `to` is
    /// passed through unvalidated; the provider rejects bad addresses. An
    /// empty `thread_id` leaves the draft unthreaded.
    pub async fn create_reply(
        &self,
        source_message_id: &str,
        thread_id: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<Draft> {
        let raw_message = create_reply_message(to, &reply_subject(subject), body);

        let request = CreateDraftRequest {
            message: DraftMessage {
                raw: encode_raw_message(&raw_message),
                thread_id: Some(thread_id)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string),
            },
        };
        debug!(source_message_id, thread_id, "creating reply draft");

        let response = self
            .client
            .post(self.drafts_url())
            .bearer_auth(self.access_token)
            .json(&request)
            .send()
            .await?;

        Ok(check_response(response, "create draft").await?.json().await?)
    }

    /// Reply to a fetched message, addressed to its sender.
    pub async fn reply_to(&self, message: &MessageSummary, body: &str) -> Result<Draft> {
        self.create_reply(
            &message.id,
            &message.thread_id,
            extract_recipient(&message.from),
            &message.subject,
            body,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn decode_raw(request: &wiremock::Request) -> (serde_json::Value, String) {
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        let raw = body["message"]["raw"].as_str().unwrap().to_string();
        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(raw).unwrap()).unwrap();
        (body, decoded)
    }

    #[tokio::test]
    async fn test_reply_draft_is_threaded_and_prefixed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/me/drafts"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "r-1",
                "message": {"id": "m-new", "threadId": "t-9"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let base = server.uri();
        let draft = DraftComposer::new(&http, &base, "tok")
            .create_reply("m-1", "t-9", "jane@example.com", "Lunch", "Sounds good")
            .await
            .unwrap();
        assert_eq!(draft.id, "r-1");

        let requests = server.received_requests().await.unwrap();
        let (body, raw) = decode_raw(&requests[0]);
        assert_eq!(body["message"]["threadId"], "t-9");
        assert!(raw.starts_with("To: jane@example.com\r\nSubject: Re: Lunch\r\n"));
        assert!(raw.contains("Content-Type: text/plain; charset=utf-8\r\n\r\nSounds good"));
    }

    #[tokio::test]
    async fn test_reply_to_uses_bracketed_sender_and_keeps_existing_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/me/drafts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "r-2"})))
            .mount(&server)
            .await;

        let message = MessageSummary {
            id: "m-2".to_string(),
            thread_id: "t-2".to_string(),
            from: "Jane Doe <jane@example.com>".to_string(),
            subject: "Re: Quarterly report".to_string(),
            date: String::new(),
            snippet: String::new(),
            label_ids: vec![],
        };

        let http = reqwest::Client::new();
        let base = server.uri();
        DraftComposer::new(&http, &base, "tok")
            .reply_to(&message, "Got it")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let (_, raw) = decode_raw(&requests[0]);
        assert!(raw.starts_with("To: jane@example.com\r\nSubject: Re: Quarterly report\r\n"));
        assert!(!raw.contains("Re: Re:"));
    }

    #[tokio::test]
    async fn test_missing_thread_id_is_omitted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/me/drafts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "r-3"})))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let base = server.uri();
        DraftComposer::new(&http, &base, "tok")
            .create_reply("m-3", "", "jane@example.com", "Hello", "Hi")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        let (body, _) = decode_raw(&requests[0]);
        assert!(body["message"].get("threadId").is_none());
        assert!(body["message"]["raw"].is_string());
    }
}
