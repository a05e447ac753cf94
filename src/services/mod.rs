//! Services for fetching, extracting and notifying.
//!
//! - `fetch`: listing page sources
//! - `extract`: table rows to offers
//! - `notify`: rendering and mail delivery

pub mod extract;
pub mod fetch;
pub mod notify;

pub use extract::{OfferExtractor, StatusFilter};
pub use fetch::{HttpSource, PageSource, StaticSource};
pub use notify::{Notification, Notifier, SmtpNotifier};
