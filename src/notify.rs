/// Transactional notifications
///
/// Notifications are dispatched after a mutation has committed and are
/// strictly best-effort: at-most-once, no retry, and a failure never rolls
/// back or surfaces into the operation that triggered it. Failures are
/// logged under the `eventhub::notify` target so they stay distinguishable
/// from store failures.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, warn};

use crate::config::EmailConfig;

/// A transactional notification to a single recipient
#[derive(Debug, Clone)]
pub enum Notification {
    /// Sent after registration while the account awaits verification
    EmailVerification {
        to: String,
        name: String,
        verify_url: String,
    },

    /// Sent after an account is soft-deleted
    AccountDeleted { to: String, name: String },

    /// Sent after a successful event registration
    RegistrationConfirmed {
        to: String,
        event_name: String,
        event_date: DateTime<Utc>,
    },

    /// Sent after a registration is cancelled
    RegistrationCancelled { to: String, event_name: String },
}

impl Notification {
    /// Recipient address
    pub fn recipient(&self) -> &str {
        match self {
            Notification::EmailVerification { to, .. }
            | Notification::AccountDeleted { to, .. }
            | Notification::RegistrationConfirmed { to, .. }
            | Notification::RegistrationCancelled { to, .. } => to,
        }
    }

    /// Subject line
    pub fn subject(&self) -> &'static str {
        match self {
            Notification::EmailVerification { .. } => "Verify Your Email Address",
            Notification::AccountDeleted { .. } => "Your Account Has Been Deleted",
            Notification::RegistrationConfirmed { .. } => "Registration Confirmed",
            Notification::RegistrationCancelled { .. } => "Registration Cancelled",
        }
    }

    fn body_text(&self) -> String {
        match self {
            Notification::EmailVerification {
                name, verify_url, ..
            } => format!(
                "Hello {name},\n\nThank you for registering. Please open the link below to verify your email address:\n{verify_url}\n\nIf you did not request this, please ignore this email."
            ),
            Notification::AccountDeleted { name, .. } => format!(
                "Hello {name}, your account has been deleted. If you did not request this, please contact us."
            ),
            Notification::RegistrationConfirmed {
                event_name,
                event_date,
                ..
            } => format!(
                "You are registered for \"{event_name}\" on {}.",
                event_date.to_rfc3339()
            ),
            Notification::RegistrationCancelled { event_name, .. } => {
                format!("Your registration for \"{event_name}\" has been cancelled.")
            }
        }
    }

    fn body_html(&self) -> String {
        format!(
            "<h1>{}</h1><p>{}</p>",
            self.subject(),
            self.body_text().replace('\n', "<br>")
        )
    }
}

/// Error type for notification dispatch
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The mail API could not be reached
    #[error("mail API request failed: {0}")]
    Transport(String),

    /// The mail API rejected the message
    #[error("mail API returned status {status}")]
    Rejected { status: u16 },
}

/// Outbound notification channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one notification
    async fn send(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Mailer posting messages to an HTTP mail API
///
/// Sends a JSON payload (`from`, `to`, `subject`, `html`, `text`) to the
/// configured endpoint with a bearer token, the shape most transactional
/// mail providers accept.
pub struct HttpMailer {
    client: reqwest::Client,
    config: EmailConfig,
}

impl HttpMailer {
    /// Creates a mailer from its configuration
    pub fn new(config: EmailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "from": self.config.mail_from,
            "to": [notification.recipient()],
            "subject": notification.subject(),
            "html": notification.body_html(),
            "text": notification.body_text(),
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

/// Dispatches a notification best-effort
///
/// `None` means mail is not configured: the notification is skipped with a
/// warning, mirroring how an unconfigured mailer behaves in production. A
/// send failure is logged and swallowed — the mutation that triggered the
/// notification has already committed and stays committed.
pub async fn dispatch(notifier: Option<&Arc<dyn Notifier>>, notification: Notification) {
    let recipient = notification.recipient().to_string();
    let subject = notification.subject();

    match notifier {
        None => {
            warn!(
                target: "eventhub::notify",
                %recipient,
                subject,
                "mailer not configured, skipping notification"
            );
        }
        Some(notifier) => {
            if let Err(err) = notifier.send(notification).await {
                error!(
                    target: "eventhub::notify",
                    %recipient,
                    subject,
                    error = %err,
                    "failed to dispatch notification"
                );
            }
        }
    }
}
