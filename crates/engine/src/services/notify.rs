//! Notification dispatcher.
//!
//! Delivery is best-effort over two independent channels, email and chat.
//! Every attempt, successful or not, leaves a NotificationLogEntry carrying
//! the rendered body, so delivery history survives template changes. The
//! dispatcher itself never surfaces an error to its caller.

use std::sync::Arc;

use chrono::Utc;
use domain::models::{
    DeliveryOutcome, NotificationKind, ReportRequest, RequestStatus, User,
};
use domain::services::{ChatTransport, EmailTransport};
use persistence::repositories::{NotificationLogRepository, UserRepository};
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::TelegramConfig;
use crate::error::EngineError;

/// Email address to deliver to, or None when the user has no address on file
/// or has opted out of email notifications.
fn email_route(user: &User) -> Option<&str> {
    if !user.email_notifications_enabled {
        return None;
    }
    user.email.as_deref()
}

/// Bot token and chat id to deliver to, or None when either half of the
/// Telegram configuration is missing or the user has opted out.
fn chat_route(user: &User) -> Option<(&str, &str)> {
    if !user.telegram_notifications_enabled {
        return None;
    }
    match (
        user.telegram_bot_token.as_deref(),
        user.telegram_chat_id.as_deref(),
    ) {
        (Some(bot_token), Some(chat_id)) => Some((bot_token, chat_id)),
        _ => None,
    }
}

/// Renders and delivers lifecycle notifications.
#[derive(Clone)]
pub struct NotificationDispatcher {
    users: UserRepository,
    log: NotificationLogRepository,
    email: Arc<dyn EmailTransport>,
    chat: Arc<dyn ChatTransport>,
    ops_bot_token: String,
    ops_chat_id: String,
}

impl NotificationDispatcher {
    pub fn new(
        users: UserRepository,
        log: NotificationLogRepository,
        email: Arc<dyn EmailTransport>,
        chat: Arc<dyn ChatTransport>,
        telegram: &TelegramConfig,
    ) -> Self {
        Self {
            users,
            log,
            email,
            chat,
            ops_bot_token: telegram.ops_bot_token.clone(),
            ops_chat_id: telegram.ops_chat_id.clone(),
        }
    }

    /// Tell the request owner their request changed status.
    pub async fn notify_status_change(&self, request: &ReportRequest) {
        let Some(owner) = self.load_user(request.requested_by).await else {
            return;
        };

        let subject = templates::status_change_subject(request);
        let html = templates::status_change_email(request);
        self.try_email(&owner, request, NotificationKind::StatusChange, &subject, &html)
            .await;

        let text = templates::status_change_chat(request);
        self.try_chat(&owner, request, NotificationKind::StatusChange, &text)
            .await;
    }

    /// Tell the request owner someone commented.
    pub async fn notify_new_comment(&self, request: &ReportRequest, author_name: &str) {
        let Some(owner) = self.load_user(request.requested_by).await else {
            return;
        };

        let subject = templates::new_comment_subject(request);
        let html = templates::new_comment_email(request, author_name);
        self.try_email(&owner, request, NotificationKind::NewComment, &subject, &html)
            .await;

        let text = templates::new_comment_chat(request, author_name);
        self.try_chat(&owner, request, NotificationKind::NewComment, &text)
            .await;
    }

    /// Announce a new request to every admin with a configured email, and to
    /// the fixed operations chat channel.
    pub async fn notify_new_request(&self, request: &ReportRequest, requester_name: &str) {
        let subject = templates::new_request_subject(request);
        let html = templates::new_request_email(request, requester_name);

        match self.users.list_admins().await {
            Ok(admins) => {
                for admin in &admins {
                    self.try_email(admin, request, NotificationKind::NewRequest, &subject, &html)
                        .await;
                }
            }
            Err(e) => error!("Failed to load admin recipients: {}", e),
        }

        if !self.ops_bot_token.is_empty() && !self.ops_chat_id.is_empty() {
            let text = templates::new_request_chat(request, requester_name);
            let sent = self
                .chat
                .send(&self.ops_bot_token, &self.ops_chat_id, &text)
                .await;
            // The ops channel has no owning user; the attempt is logged
            // against the requester the event is about.
            self.log_attempt(
                request.requested_by,
                request.id,
                NotificationKind::NewRequest,
                &text,
                sent,
                (!sent).then_some("Operations chat delivery failed"),
            )
            .await;
        }
    }

    /// Verify a user's bot settings by sending a test message.
    pub async fn test_connection(&self, bot_token: &str, chat_id: &str) -> bool {
        self.chat
            .send(bot_token, chat_id, templates::TEST_MESSAGE)
            .await
    }

    /// Delivery history for a request, newest first.
    pub async fn history(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<domain::models::NotificationLogEntry>, EngineError> {
        Ok(self.log.list_for_request(request_id).await?)
    }

    /// Update a user's email opt-in.
    pub async fn update_email_settings(
        &self,
        user_id: Uuid,
        enabled: bool,
    ) -> Result<User, EngineError> {
        self.users
            .update_email_opt_in(user_id, enabled)
            .await?
            .ok_or_else(|| EngineError::not_found("User"))
    }

    /// Update a user's Telegram opt-in.
    pub async fn update_telegram_settings(
        &self,
        user_id: Uuid,
        enabled: bool,
    ) -> Result<User, EngineError> {
        self.users
            .update_telegram_opt_in(user_id, enabled)
            .await?
            .ok_or_else(|| EngineError::not_found("User"))
    }

    async fn load_user(&self, user_id: Uuid) -> Option<User> {
        match self.users.find_by_id(user_id).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                error!(user_id = %user_id, "Notification recipient does not exist");
                None
            }
            Err(e) => {
                error!(user_id = %user_id, "Failed to load notification recipient: {}", e);
                None
            }
        }
    }

    async fn try_email(
        &self,
        recipient: &User,
        request: &ReportRequest,
        kind: NotificationKind,
        subject: &str,
        html: &str,
    ) {
        let Some(email) = email_route(recipient) else {
            debug!(user_id = %recipient.id, "No email route for user, skipping");
            return;
        };

        let sent = self.email.send(email, subject, html).await;
        self.log_attempt(
            recipient.id,
            request.id,
            kind,
            html,
            sent,
            (!sent).then_some("Email delivery failed"),
        )
        .await;
    }

    async fn try_chat(
        &self,
        recipient: &User,
        request: &ReportRequest,
        kind: NotificationKind,
        text: &str,
    ) {
        let Some((bot_token, chat_id)) = chat_route(recipient) else {
            debug!(user_id = %recipient.id, "No chat route for user, skipping");
            return;
        };

        let sent = self.chat.send(bot_token, chat_id, text).await;
        self.log_attempt(
            recipient.id,
            request.id,
            kind,
            text,
            sent,
            (!sent).then_some("Telegram delivery failed"),
        )
        .await;
    }

    async fn log_attempt(
        &self,
        user_id: Uuid,
        request_id: Uuid,
        kind: NotificationKind,
        message: &str,
        sent: bool,
        error_message: Option<&str>,
    ) {
        let outcome = if sent {
            DeliveryOutcome::Sent
        } else {
            DeliveryOutcome::Failed
        };
        let sent_at = sent.then(Utc::now);

        if let Err(e) = self
            .log
            .insert(user_id, request_id, kind, message, outcome, sent_at, error_message)
            .await
        {
            error!("Failed to record notification attempt: {}", e);
        }
    }
}

/// Message templates. Pure functions so rendering is testable without any
/// transport. Chat messages are HTML-escaped because Telegram parses them as
/// HTML.
pub mod templates {
    use super::{ReportRequest, RequestStatus};

    pub const TEST_MESSAGE: &str =
        "Report Desk: your Telegram notification settings are working.";

    /// Escape the characters Telegram's HTML parse mode treats specially.
    pub fn escape_html(input: &str) -> String {
        let mut escaped = String::with_capacity(input.len());
        for c in input.chars() {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                _ => escaped.push(c),
            }
        }
        escaped
    }

    fn status_label(status: RequestStatus) -> &'static str {
        match status {
            RequestStatus::Pending => "Pending",
            RequestStatus::InProgress => "In progress",
            RequestStatus::Completed => "Completed",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Cancelled => "Cancelled",
        }
    }

    pub fn status_change_subject(request: &ReportRequest) -> String {
        format!(
            "Report request \"{}\" is now {}",
            request.title,
            status_label(request.status).to_lowercase()
        )
    }

    pub fn status_change_email(request: &ReportRequest) -> String {
        let mut body = format!(
            "<p>Your report request <strong>{}</strong> is now <strong>{}</strong>.</p>",
            escape_html(&request.title),
            status_label(request.status)
        );
        if let Some(reason) = &request.rejection_reason {
            body.push_str(&format!(
                "<p>Reason: {}</p>",
                escape_html(reason)
            ));
        }
        body
    }

    pub fn status_change_chat(request: &ReportRequest) -> String {
        let mut text = format!(
            "Report request \"{}\" is now {}.",
            escape_html(&request.title),
            status_label(request.status).to_lowercase()
        );
        if let Some(reason) = &request.rejection_reason {
            text.push_str(&format!("\nReason: {}", escape_html(reason)));
        }
        text
    }

    pub fn new_comment_subject(request: &ReportRequest) -> String {
        format!("New comment on \"{}\"", request.title)
    }

    pub fn new_comment_email(request: &ReportRequest, author_name: &str) -> String {
        format!(
            "<p><strong>{}</strong> commented on your report request <strong>{}</strong>.</p>",
            escape_html(author_name),
            escape_html(&request.title)
        )
    }

    pub fn new_comment_chat(request: &ReportRequest, author_name: &str) -> String {
        format!(
            "{} commented on your report request \"{}\".",
            escape_html(author_name),
            escape_html(&request.title)
        )
    }

    pub fn new_request_subject(request: &ReportRequest) -> String {
        format!("New report request: {}", request.title)
    }

    pub fn new_request_email(request: &ReportRequest, requester_name: &str) -> String {
        format!(
            "<p><strong>{}</strong> submitted a new report request: <strong>{}</strong> (priority {}).</p>",
            escape_html(requester_name),
            escape_html(&request.title),
            request.priority
        )
    }

    pub fn new_request_chat(request: &ReportRequest, requester_name: &str) -> String {
        format!(
            "New report request from {}: \"{}\" (priority {}).",
            escape_html(requester_name),
            escape_html(&request.title),
            request.priority
        )
    }
}

#[cfg(test)]
mod tests {
    use super::templates::*;
    use super::{chat_route, email_route};
    use chrono::Utc;
    use domain::models::{
        DateRangeType, FileFormat, OutputType, Priority, ReportRequest, RequestStatus,
        SourceSystem, User, UserRole,
    };
    use uuid::Uuid;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            external_username: "jdoe".into(),
            name: Some("Jane Doe".into()),
            department: None,
            role: UserRole::User,
            password_hash: None,
            email: Some("jdoe@hospital.test".into()),
            email_notifications_enabled: true,
            telegram_bot_token: Some("123:token".into()),
            telegram_chat_id: Some("-100200".into()),
            telegram_notifications_enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request(status: RequestStatus) -> ReportRequest {
        ReportRequest {
            id: Uuid::new_v4(),
            title: "A < B study".into(),
            description: None,
            output_type: OutputType::File,
            file_format: Some(FileFormat::Excel),
            date_range_type: DateRangeType::Custom,
            start_date: None,
            end_date: None,
            fiscal_year_start: None,
            fiscal_year_end: None,
            priority: Priority::High,
            expected_deadline: None,
            source_system: SourceSystem::Hosxp,
            data_source: None,
            additional_notes: None,
            requested_by: Uuid::new_v4(),
            assigned_to: None,
            status,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_email_route_requires_address_and_opt_in() {
        let configured = user();
        assert_eq!(email_route(&configured), Some("jdoe@hospital.test"));

        let mut no_address = user();
        no_address.email = None;
        assert_eq!(email_route(&no_address), None);

        let mut opted_out = user();
        opted_out.email_notifications_enabled = false;
        assert_eq!(email_route(&opted_out), None);
    }

    #[test]
    fn test_chat_route_requires_full_config_and_opt_in() {
        let configured = user();
        assert_eq!(chat_route(&configured), Some(("123:token", "-100200")));

        // Half a Telegram configuration routes nowhere.
        let mut no_token = user();
        no_token.telegram_bot_token = None;
        assert_eq!(chat_route(&no_token), None);

        let mut no_chat = user();
        no_chat.telegram_chat_id = None;
        assert_eq!(chat_route(&no_chat), None);

        let mut opted_out = user();
        opted_out.telegram_notifications_enabled = false;
        assert_eq!(chat_route(&opted_out), None);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & c > \"d\""), "a &lt; b &amp; c &gt; &quot;d&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_status_change_chat_escapes_title() {
        let text = status_change_chat(&request(RequestStatus::Completed));
        assert!(text.contains("A &lt; B study"));
        assert!(text.contains("completed"));
    }

    #[test]
    fn test_status_change_includes_rejection_reason() {
        let mut req = request(RequestStatus::Rejected);
        req.rejection_reason = Some("Data source unavailable".into());
        let text = status_change_chat(&req);
        assert!(text.contains("Reason: Data source unavailable"));
        let html = status_change_email(&req);
        assert!(html.contains("Data source unavailable"));
    }

    #[test]
    fn test_new_request_templates_name_requester() {
        let req = request(RequestStatus::Pending);
        assert!(new_request_email(&req, "Jane Doe").contains("Jane Doe"));
        assert!(new_request_chat(&req, "Jane Doe").contains("priority high"));
    }

    #[test]
    fn test_new_comment_templates() {
        let req = request(RequestStatus::InProgress);
        assert!(new_comment_subject(&req).contains(&req.title));
        assert!(new_comment_chat(&req, "O'Brien & Co").contains("O'Brien &amp; Co"));
    }
}
