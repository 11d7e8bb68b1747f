//! Proxy route handlers
//!
//! - POST /ai/parse - natural-language command to `{action, query, label?}`
//! - POST /ai/suggestReplies - reply suggestions for sampled messages
//! - POST /ai/analyze - which of the given emails an instruction selects
//! - GET /health - liveness

use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use tracing::error;

use crate::ai::types::{
    AnalyzeRequest, EmailAnalysis, ParseRequest, ParsedCommand, SuggestRepliesRequest,
    SuggestionsResponse,
};
use crate::server::types::{ApiError, HealthResponse};
use crate::server::AppState;

/// POST /ai/parse
pub async fn parse_command(
    State(state): State<AppState>,
    Json(request): Json<ParseRequest>,
) -> Result<Json<ParsedCommand>, ApiError> {
    let command = match request.command.as_deref().map(str::trim) {
        Some(command) if !command.is_empty() => command,
        _ => return Err(ApiError::bad_request("Command is required")),
    };

    match state.interpreter.parse_command(command).await {
        Ok(parsed) => Ok(Json(parsed)),
        Err(e) => {
            error!("Error parsing command: {}", e);
            Err(ApiError::internal("Failed to parse command", e.to_string()))
        }
    }
}

/// POST /ai/suggestReplies
pub async fn suggest_replies(
    State(state): State<AppState>,
    Json(request): Json<SuggestRepliesRequest>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let messages = match request.messages.as_deref() {
        Some(messages) if !messages.is_empty() => messages,
        _ => return Err(ApiError::bad_request("Messages array is required")),
    };

    match state
        .interpreter
        .suggest_replies(request.command.as_deref(), request.parsed.as_ref(), messages)
        .await
    {
        Ok(suggestions) => Ok(Json(suggestions)),
        Err(e) => {
            error!("Error generating suggestions: {}", e);
            Err(ApiError::internal("Failed to generate suggestions", e.to_string()))
        }
    }
}

/// POST /ai/analyze
pub async fn analyze_emails(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<EmailAnalysis>, ApiError> {
    let prompt = request.prompt.as_deref().map(str::trim).unwrap_or_default();
    let emails = match request.emails.as_deref() {
        Some(emails) if !prompt.is_empty() => emails,
        _ => return Err(ApiError::bad_request("Prompt and emails are required")),
    };

    match state.interpreter.analyze_emails(prompt, emails).await {
        Ok(analysis) => Ok(Json(analysis)),
        Err(e) => {
            error!("Error analyzing emails: {}", e);
            Err(ApiError::internal("Failed to analyze emails", e.to_string()))
        }
    }
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::ai::{CommandInterpreter, MockChatClient};
    use crate::server::{router, AppState};

    fn app(chat: &MockChatClient) -> axum::Router {
        router(AppState {
            interpreter: Arc::new(CommandInterpreter::new(Arc::new(chat.clone()))),
        })
    }

    async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_parse_returns_structured_command() {
        let chat = MockChatClient::new();
        chat.enqueue_ok(r#"{"action": "delete", "query": "category:promotions older_than:6m"}"#);

        let (status, body) = post_json(
            app(&chat),
            "/ai/parse",
            json!({"command": "Delete promotional emails older than 6 months"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"action": "delete", "query": "category:promotions older_than:6m"})
        );
    }

    #[tokio::test]
    async fn test_parse_requires_command() {
        let chat = MockChatClient::new();
        let (status, body) = post_json(app(&chat), "/ai/parse", json!({})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Command is required");
        assert_eq!(chat.call_count(), 0);
    }

    #[tokio::test]
    async fn test_parse_reports_unparseable_model_output() {
        let chat = MockChatClient::new();
        chat.enqueue_ok("not json at all");

        let (status, body) =
            post_json(app(&chat), "/ai/parse", json!({"command": "archive stuff"})).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to parse command");
        assert!(body["message"].as_str().unwrap().contains("no JSON object"));
    }

    #[tokio::test]
    async fn test_suggest_replies_requires_messages() {
        let chat = MockChatClient::new();
        let (status, body) = post_json(
            app(&chat),
            "/ai/suggestReplies",
            json!({"command": "cleanup", "messages": []}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Messages array is required");
    }

    #[tokio::test]
    async fn test_suggest_replies_returns_suggestions() {
        let chat = MockChatClient::new();
        chat.enqueue_ok(r#"{"suggestions": [{"text": "Thanks, noted."}]}"#);

        let (status, body) = post_json(
            app(&chat),
            "/ai/suggestReplies",
            json!({
                "command": "Archive newsletters",
                "parsed": {"action": "archive", "query": "category:updates"},
                "messages": [{"id": "m1", "from": "news@example.com", "subject": "Weekly", "snippet": "Hi"}]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"suggestions": [{"text": "Thanks, noted."}]}));
        assert!(chat.prompts()[0].contains("From: news@example.com"));
    }

    #[tokio::test]
    async fn test_suggest_replies_reports_upstream_failure() {
        let chat = MockChatClient::new();
        chat.enqueue_err("upstream down");

        let (status, body) = post_json(
            app(&chat),
            "/ai/suggestReplies",
            json!({"messages": [{"from": "a@b.co"}]}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to generate suggestions");
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let chat = MockChatClient::new();
        let response = app(&chat)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_analyze_returns_matched_emails() {
        let chat = MockChatClient::new();
        chat.enqueue_ok(r#"{"action": "delete", "matchedEmailIds": ["a2"], "summary": "One promo"}"#);

        let (status, body) = post_json(
            app(&chat),
            "/ai/analyze",
            json!({
                "prompt": "Delete promos",
                "emails": [
                    {"id": "a1", "from": "friend@example.com", "subject": "Dinner?"},
                    {"id": "a2", "from": "deals@shop.example", "subject": "Sale", "date": "Mon, 3 Mar 2025 09:00:00 +0000"}
                ]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalEmails"], 2);
        assert_eq!(body["action"], "delete");
        assert_eq!(body["matchedEmails"].as_array().unwrap().len(), 1);
        assert_eq!(body["matchedEmails"][0]["id"], "a2");
        assert!(body.get("reasoning").is_none());
    }

    #[tokio::test]
    async fn test_analyze_requires_prompt_and_emails() {
        let chat = MockChatClient::new();
        let (status, body) =
            post_json(app(&chat), "/ai/analyze", json!({"prompt": "Delete promos"})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Prompt and emails are required");

        let (status, _) =
            post_json(app(&chat), "/ai/analyze", json!({"prompt": " ", "emails": []})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(chat.call_count(), 0);
    }

    #[tokio::test]
    async fn test_analyze_reports_provider_failure() {
        let chat = MockChatClient::new();
        chat.enqueue_err("upstream down");

        let (status, body) = post_json(
            app(&chat),
            "/ai/analyze",
            json!({"prompt": "Delete promos", "emails": [{"id": "a1"}]}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to analyze emails");
    }
}
