// src/services/notify.rs

//! Notification rendering and delivery.

use std::time::Duration;

use askama::Template;
use async_trait::async_trait;
use chrono::Local;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};

use crate::error::{AppError, Result};
use crate::models::{MailConfig, NotificationTarget, Offer};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivers new offers to someone.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification for `offers`, linking back to `source_url`.
    async fn notify(&self, offers: &[Offer], source_url: &str) -> Result<()>;
}

/// A rendered notification message.
#[derive(Debug, Clone)]
pub struct Notification {
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl Notification {
    /// Render the message for a set of new offers.
    pub fn render(subject: &str, offers: &[Offer], source_url: &str) -> Result<Self> {
        Ok(Self {
            subject: subject.to_string(),
            html: render_html(offers, source_url)?,
            text: render_text(offers, source_url),
        })
    }
}

/// HTML body of a new-offers email. Fields are escaped by the template.
#[derive(Template)]
#[template(path = "new_offers.html")]
struct NewOffersHtml<'a> {
    offers: &'a [Offer],
    source_url: &'a str,
    checked_at: String,
}

/// Render offers as an HTML document with a table.
pub fn render_html(offers: &[Offer], source_url: &str) -> Result<String> {
    NewOffersHtml {
        offers,
        source_url,
        checked_at: Local::now().format("%Y-%m-%d %H:%M").to_string(),
    }
    .render()
    .map_err(|e| AppError::notify(format!("failed to render email: {e}")))
}

/// Render offers as plain text, one per line.
pub fn render_text(offers: &[Offer], source_url: &str) -> String {
    let mut text = String::from("Se han detectado las siguientes nuevas ofertas de trabajo:\n\n");
    for offer in offers {
        text.push_str(&offer.format(
            "- [{code}] {title} ({owner}) {start_date} - {end_date} [{status}]\n",
        ));
    }
    text.push_str(&format!("\nVer todas las ofertas: {source_url}\n"));
    text
}

/// Sends notifications through an authenticated SMTP relay.
pub struct SmtpNotifier {
    config: MailConfig,
    target: NotificationTarget,
}

impl SmtpNotifier {
    pub fn new(config: MailConfig, target: NotificationTarget) -> Self {
        Self { config, target }
    }

    /// Build the MIME message for a rendered notification.
    pub fn build_message(&self, notification: &Notification) -> Result<Message> {
        let sender: Address = self
            .target
            .sender
            .parse()
            .map_err(|e| AppError::notify(format!("invalid sender address: {e}")))?;
        let recipient: Address = self
            .target
            .recipient
            .parse()
            .map_err(|e| AppError::notify(format!("invalid recipient address: {e}")))?;

        Message::builder()
            .from(Mailbox::new(Some(self.config.sender_name.clone()), sender))
            .to(Mailbox::new(None, recipient))
            .subject(notification.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                notification.text.clone(),
                notification.html.clone(),
            ))
            .map_err(AppError::notify)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, offers: &[Offer], source_url: &str) -> Result<()> {
        let notification = Notification::render(&self.config.subject, offers, source_url)?;
        let message = self.build_message(&notification)?;

        let credentials =
            Credentials::new(self.target.sender.clone(), self.target.password.clone());
        let mailer = SmtpTransport::relay(&self.config.smtp_server)
            .map_err(AppError::notify)?
            .port(self.config.smtp_port)
            .timeout(Some(SMTP_TIMEOUT))
            .credentials(credentials)
            .build();

        log::debug!(
            "Sending notification to {} via {}:{}",
            self.target.recipient,
            self.config.smtp_server,
            self.config.smtp_port
        );

        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(|e| AppError::notify(format!("mail task failed: {e}")))?
            .map_err(AppError::notify)?;

        log::info!("Notification sent to {}", self.target.recipient);
        Ok(())
    }
}
