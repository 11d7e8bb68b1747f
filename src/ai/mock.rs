use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::ChatCompletion;
use crate::error::{AiError, Result};

/// Scripted chat provider for tests and offline runs.
#[derive(Debug, Default, Clone)]
pub struct MockChatClient {
    responses: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue reply content for the next call.
    pub fn enqueue_ok(&self, content: impl Into<String>) {
        lock(&self.responses).push_back(Ok(content.into()));
    }

    /// Queue an upstream failure for the next call.
    pub fn enqueue_err(&self, message: impl Into<String>) {
        lock(&self.responses).push_back(Err(message.into()));
    }

    /// Returns the number of times `complete` has been called.
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

#[async_trait]
impl ChatCompletion for MockChatClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        lock(&self.prompts).push(prompt.to_string());
        let next = lock(&self.responses).pop_front();

        match next {
            Some(Ok(content)) => Ok(content),
            Some(Err(body)) => Err(AiError::Upstream { status: 500, body }.into()),
            None => Err(AiError::Upstream {
                status: 500,
                body: "mock response not provided".to_string(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_enqueued_responses_in_order() {
        let mock = MockChatClient::new();
        mock.enqueue_ok("first");
        mock.enqueue_err("boom");
        mock.enqueue_ok("second");

        assert_eq!(mock.complete("a").await.unwrap(), "first");
        assert!(mock.complete("b").await.is_err());
        assert_eq!(mock.complete("c").await.unwrap(), "second");
        assert!(mock.complete("d").await.is_err());

        assert_eq!(mock.call_count(), 4);
        assert_eq!(mock.prompts(), vec!["a", "b", "c", "d"]);
    }
}
