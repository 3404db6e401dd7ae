//! Outbound message channel traits.
//!
//! Both channels are best-effort, synchronous-call, boolean-outcome
//! interfaces: a `false` return means the attempt failed and the caller
//! records the outcome; nothing ever propagates as an error.

use std::sync::Mutex;

/// Email transport collaborator.
#[async_trait::async_trait]
pub trait EmailTransport: Send + Sync {
    /// Attempts to deliver one message. Returns true on success.
    async fn send(&self, to: &str, subject: &str, html: &str) -> bool;
}

/// Chat bot transport collaborator. Credentials are per-call because each
/// user configures their own bot.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Attempts to deliver one message. Returns true on success.
    async fn send(&self, bot_token: &str, chat_id: &str, text: &str) -> bool;
}

/// A recorded outbound email, for assertions in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// A recorded outbound chat message, for assertions in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentChatMessage {
    pub bot_token: String,
    pub chat_id: String,
    pub text: String,
}

/// Mock email transport that records messages instead of sending them.
#[derive(Debug, Default)]
pub struct MockEmailTransport {
    pub simulate_failure: bool,
    pub sent: Mutex<Vec<SentEmail>>,
}

impl MockEmailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_messages(&self) -> Vec<SentEmail> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl EmailTransport for MockEmailTransport {
    async fn send(&self, to: &str, subject: &str, html: &str) -> bool {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                html: html.to_string(),
            });
        }
        if self.simulate_failure {
            tracing::warn!(to = %to, "Mock email transport simulating failure");
            return false;
        }
        tracing::info!(to = %to, subject = %subject, "Mock: would send email");
        true
    }
}

/// Mock chat transport that records messages instead of sending them.
#[derive(Debug, Default)]
pub struct MockChatTransport {
    pub simulate_failure: bool,
    pub sent: Mutex<Vec<SentChatMessage>>,
}

impl MockChatTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent_messages(&self) -> Vec<SentChatMessage> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ChatTransport for MockChatTransport {
    async fn send(&self, bot_token: &str, chat_id: &str, text: &str) -> bool {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentChatMessage {
                bot_token: bot_token.to_string(),
                chat_id: chat_id.to_string(),
                text: text.to_string(),
            });
        }
        if self.simulate_failure {
            tracing::warn!(chat_id = %chat_id, "Mock chat transport simulating failure");
            return false;
        }
        tracing::info!(chat_id = %chat_id, "Mock: would send chat message");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_email_records_and_succeeds() {
        let transport = MockEmailTransport::new();
        assert!(transport.send("a@b.c", "Subject", "<p>Hi</p>").await);
        let sent = transport.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "a@b.c");
    }

    #[tokio::test]
    async fn test_failing_mock_email_still_records() {
        let transport = MockEmailTransport::failing();
        assert!(!transport.send("a@b.c", "Subject", "body").await);
        assert_eq!(transport.sent_messages().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_chat_records() {
        let transport = MockChatTransport::new();
        assert!(transport.send("token", "chat-1", "hello").await);
        let sent = transport.sent_messages();
        assert_eq!(sent[0].chat_id, "chat-1");
    }
}
