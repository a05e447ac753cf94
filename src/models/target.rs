//! Notification destination and credentials.

use std::fmt;

use lettre::Address;

use crate::error::{AppError, Result};

/// Credentials and destination needed to deliver a notification.
#[derive(Clone, PartialEq, Eq)]
pub struct NotificationTarget {
    /// Sender mailbox, also used as the SMTP login
    pub sender: String,

    /// SMTP password for the sender
    pub password: String,

    /// Recipient mailbox
    pub recipient: String,
}

impl NotificationTarget {
    pub fn new(
        sender: impl Into<String>,
        password: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            password: password.into(),
            recipient: recipient.into(),
        }
    }

    /// Check that both mailboxes are well-formed addresses.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("sender", &self.sender), ("recipient", &self.recipient)] {
            value
                .trim()
                .parse::<Address>()
                .map_err(|e| AppError::config(format!("invalid {name} address {value:?}: {e}")))?;
        }
        Ok(())
    }
}

// Keep the password out of logs.
impl fmt::Debug for NotificationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationTarget")
            .field("sender", &self.sender)
            .field("password", &"***")
            .field("recipient", &self.recipient)
            .finish()
    }
}
