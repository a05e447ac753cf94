// src/config.rs

//! Configuration loading utilities.
//!
//! File-based settings come from `config.toml`; mail credentials come from the
//! process environment, with a local `.env` file consulted outside CI.

use std::env;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::{Config, NotificationTarget};

/// Environment variable holding the sender mailbox.
pub const SENDER_VAR: &str = "SENDER_EMAIL";
/// Environment variable holding the sender's SMTP password.
pub const PASSWORD_VAR: &str = "PASSWORD";
/// Environment variable holding the recipient mailbox.
pub const RECIPIENT_VAR: &str = "RECIPIENT_EMAIL";
/// Older name for [`RECIPIENT_VAR`], still honoured.
pub const RECIPIENT_ALIAS_VAR: &str = "RECEIVER_EMAIL";

/// Load and validate the file configuration.
pub fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load_or_default(path)?;
    config.validate()?;
    Ok(config)
}

/// Load `.env` unless running under GitHub Actions.
pub fn load_dotenv() {
    if env::var_os("GITHUB_ACTIONS").is_some() {
        return;
    }
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => log::debug!("No .env file found"),
        Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
    }
}

/// Read notification credentials from the process environment.
pub fn target_from_env() -> Result<NotificationTarget> {
    target_from_lookup(|key| env::var(key).ok())
}

/// Read notification credentials through a lookup function.
///
/// Every missing or blank variable is reported in one error.
pub fn target_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<NotificationTarget> {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let sender = get(SENDER_VAR);
    let password = get(PASSWORD_VAR);
    let recipient = get(RECIPIENT_VAR).or_else(|| get(RECIPIENT_ALIAS_VAR));

    match (sender, password, recipient) {
        (Some(sender), Some(password), Some(recipient)) => {
            let target = NotificationTarget::new(sender.trim(), password, recipient.trim());
            target.validate()?;
            Ok(target)
        }
        (sender, password, recipient) => {
            let missing: Vec<&str> = [
                (sender.is_none(), SENDER_VAR),
                (password.is_none(), PASSWORD_VAR),
                (recipient.is_none(), RECIPIENT_VAR),
            ]
            .into_iter()
            .filter_map(|(absent, name)| absent.then_some(name))
            .collect();
            Err(AppError::config(format!(
                "missing mail credentials: {}",
                missing.join(", ")
            )))
        }
    }
}
