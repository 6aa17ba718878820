//! SMTP dispatcher built on `lettre`.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::domain::Notification;
use crate::domain::ports::{NotificationDispatcher, NotificationError};

use super::templates::render;

/// Relay settings for [`SmtpNotificationDispatcher`].
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// `From` header, e.g. `CarShare <noreply@carshare.example>`.
    pub from: String,
    pub frontend_url: String,
}

/// Sends HTML email through an authenticated STARTTLS relay.
#[derive(Clone)]
pub struct SmtpNotificationDispatcher {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    frontend_url: String,
}

impl SmtpNotificationDispatcher {
    /// Build the transport. No connection is opened until the first send.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Compose`] for an unparsable sender or an
    /// unusable relay host.
    pub fn new(settings: SmtpSettings) -> Result<Self, NotificationError> {
        let SmtpSettings {
            host,
            port,
            username,
            password,
            from,
            frontend_url,
        } = settings;

        let from = from
            .parse::<Mailbox>()
            .map_err(|err| NotificationError::compose(format!("invalid sender address: {err}")))?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
            .map_err(|err| NotificationError::compose(format!("invalid SMTP relay: {err}")))?
            .port(port);
        if let (Some(username), Some(password)) = (username, password) {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            frontend_url,
        })
    }

    fn compose(&self, notification: &Notification) -> Result<Message, NotificationError> {
        let email = render(notification, &self.frontend_url);
        let to = Mailbox::new(
            Some(notification.recipient.name.clone()),
            notification
                .recipient
                .email
                .as_ref()
                .parse()
                .map_err(|err| NotificationError::compose(format!("invalid recipient: {err}")))?,
        );

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html)
            .map_err(|err| NotificationError::compose(err.to_string()))
    }
}

#[async_trait]
impl NotificationDispatcher for SmtpNotificationDispatcher {
    async fn dispatch(&self, notification: Notification) -> Result<(), NotificationError> {
        let message = self.compose(&notification)?;
        self.transport
            .send(message)
            .await
            .map_err(|err| NotificationError::delivery(err.to_string()))?;
        debug!(kind = notification.kind.label(), "email delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::{EmailAddress, NotificationKind, Recipient, Role};

    fn settings(from: &str) -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_owned(),
            port: 587,
            username: Some("mailer".to_owned()),
            password: Some("secret".to_owned()),
            from: from.to_owned(),
            frontend_url: "https://carshare.example".to_owned(),
        }
    }

    #[rstest]
    fn rejects_unparsable_sender() {
        let error = SmtpNotificationDispatcher::new(settings("not an address"))
            .err()
            .expect("invalid sender");
        assert!(matches!(error, NotificationError::Compose { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn composes_html_message_for_recipient() {
        let dispatcher = SmtpNotificationDispatcher::new(settings(
            "CarShare <noreply@carshare.example>",
        ))
        .expect("valid settings");
        let notification = Notification {
            recipient: Recipient {
                email: EmailAddress::new("rita@example.com").expect("valid email"),
                name: "Rita".to_owned(),
            },
            kind: NotificationKind::Welcome { role: Role::Renter },
        };

        let message = dispatcher.compose(&notification).expect("composed");
        let raw = String::from_utf8(message.formatted()).expect("utf-8 message");

        assert!(raw.contains("To: \"Rita\" <rita@example.com>") || raw.contains("To: Rita <rita@example.com>"));
        assert!(raw.contains("Content-Type: text/html"));
    }
}
