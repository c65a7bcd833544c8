// --- File: crates/slotwise_gcal/src/mail.rs ---
//! Plain-text notification emails through the Gmail API.

use crate::auth::GMAIL_SEND_SCOPE;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine as _;
use google_calendar3::common::GetToken;
use serde_json::{json, Value};
use slotwise_common::services::{BoxFuture, GatewayError, NotificationResult, NotificationService};
use slotwise_common::HTTP_CLIENT;
use tracing::{debug, info};

const SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

/// Sends mail as the delegated mailbox (`users/me`).
pub struct GmailNotificationService {
    token_source: Box<dyn GetToken>,
    sender: String,
}

impl GmailNotificationService {
    pub fn new(token_source: Box<dyn GetToken>, sender: impl Into<String>) -> Self {
        Self {
            token_source,
            sender: sender.into(),
        }
    }

    async fn access_token(&self) -> Result<String, GatewayError> {
        match self.token_source.get_token(&[GMAIL_SEND_SCOPE]).await {
            Ok(Some(token)) => Ok(token),
            Ok(None) => Err(GatewayError::Auth("No token issued for gmail.send".to_string())),
            Err(e) => Err(GatewayError::Auth(e.to_string())),
        }
    }
}

/// Header values must stay on one line.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// RFC 2047 encoded-word for non-ASCII subjects.
fn encode_subject(subject: &str) -> String {
    let subject = header_value(subject);
    if subject.is_ascii() {
        subject
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(subject.as_bytes()))
    }
}

/// The base64url RFC 822 message the Gmail `send` endpoint expects in `raw`.
pub(crate) fn build_raw_message(from: &str, to: &str, subject: &str, body: &str) -> String {
    let message = format!(
        "From: {}\r\nTo: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\n\
         Content-Type: text/plain; charset=\"UTF-8\"\r\n\
         Content-Transfer-Encoding: 8bit\r\n\r\n{}",
        header_value(from),
        header_value(to),
        encode_subject(subject),
        body
    );
    URL_SAFE.encode(message.as_bytes())
}

impl NotificationService for GmailNotificationService {
    fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> BoxFuture<'_, NotificationResult, GatewayError> {
        let raw = build_raw_message(&self.sender, to, subject, body);
        let to = to.to_string();

        Box::pin(async move {
            let token = self.access_token().await?;
            debug!("Sending notification to {}", to);

            let response = HTTP_CLIENT
                .post(SEND_URL)
                .bearer_auth(token)
                .json(&json!({ "raw": raw }))
                .send()
                .await
                .map_err(|e| GatewayError::Write(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(if status.as_u16() == 401 || status.as_u16() == 403 {
                    GatewayError::Auth(format!("Gmail returned {}: {}", status, text))
                } else {
                    GatewayError::Write(format!("Gmail returned {}: {}", status, text))
                });
            }

            let payload: Value = response
                .json()
                .await
                .map_err(|e| GatewayError::Write(e.to_string()))?;
            let id = payload
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            info!("Notification {} sent to {}", id, to);
            Ok(NotificationResult {
                id,
                status: "sent".to_string(),
            })
        })
    }
}
