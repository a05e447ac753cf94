// src/pipeline/run.rs

//! Offer watch pipeline.
//!
//! One run walks `Fetching → Extracting → Diffing → (Notifying →) Persisting
//! → Done`. Any error moves the run to `Failed` before the snapshot is
//! touched. A failed notification is logged and the run carries on.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Config, NotificationTarget, Offer};
use crate::pipeline::diff::{Delta, detect};
use crate::services::{HttpSource, Notifier, OfferExtractor, PageSource, SmtpNotifier};
use crate::storage::{CsvSnapshotStore, SnapshotStore};

/// Pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Fetching,
    Extracting,
    Diffing,
    Notifying,
    Persisting,
    Done,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Fetching => "fetching",
            RunState::Extracting => "extracting",
            RunState::Diffing => "diffing",
            RunState::Notifying => "notifying",
            RunState::Persisting => "persisting",
            RunState::Done => "done",
            RunState::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to the notification step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum NotifyOutcome {
    /// Nothing new to report
    NotNeeded,
    /// New offers found but notifications are off
    Disabled,
    Sent,
    Failed { error: String },
}

/// Switches for side effects of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub notify: bool,
    pub persist: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            notify: true,
            persist: true,
        }
    }
}

impl RunOptions {
    /// Fetch and diff only.
    pub fn dry_run() -> Self {
        Self {
            notify: false,
            persist: false,
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub state: RunState,
    pub source: String,
    pub snapshot: String,
    /// Offers extracted from the page
    pub fetched: usize,
    /// Offers in the previous snapshot, if one existed
    pub previous: Option<usize>,
    pub delta: Delta,
    pub notification: NotifyOutcome,
    /// Whether the snapshot was rewritten
    pub persisted: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Sequences fetch, extraction, diffing, notification and persistence.
pub struct Orchestrator {
    source: Box<dyn PageSource>,
    extractor: OfferExtractor,
    store: Box<dyn SnapshotStore>,
    notifier: Option<Box<dyn Notifier>>,
    options: RunOptions,
    state: RunState,
}

impl Orchestrator {
    pub fn new(
        source: Box<dyn PageSource>,
        extractor: OfferExtractor,
        store: Box<dyn SnapshotStore>,
        notifier: Option<Box<dyn Notifier>>,
    ) -> Self {
        Self {
            source,
            extractor,
            store,
            notifier,
            options: RunOptions::default(),
            state: RunState::Fetching,
        }
    }

    /// Build the production pipeline from configuration.
    ///
    /// Notifications require a target with well-formed addresses; without one
    /// this fails before any network activity.
    pub fn from_config(
        config: &Config,
        target: Option<NotificationTarget>,
        options: RunOptions,
    ) -> Result<Self> {
        config.validate()?;

        let notifier: Option<Box<dyn Notifier>> = match (options.notify, target) {
            (true, Some(target)) => {
                target.validate()?;
                Some(Box::new(SmtpNotifier::new(config.mail.clone(), target)))
            }
            (true, None) => {
                return Err(AppError::config(
                    "notifications enabled but no mail credentials were provided",
                ));
            }
            (false, _) => None,
        };

        let source = Box::new(HttpSource::new(&config.source)?);
        let extractor = OfferExtractor::new(&config.extract)?;
        let store = Box::new(CsvSnapshotStore::new(&config.snapshot.path));

        Ok(Self::new(source, extractor, store, notifier).with_options(options))
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the page source, keeping everything else.
    pub fn with_source(mut self, source: Box<dyn PageSource>) -> Self {
        self.source = source;
        self
    }

    /// Current pipeline state.
    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        log::debug!("State: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Execute one run to completion.
    ///
    /// Errors are wrapped with the stage they happened in.
    pub async fn run(&mut self) -> Result<RunReport> {
        self.state = RunState::Fetching;
        let started_at = Utc::now();

        match self.execute(started_at).await {
            Ok(report) => Ok(report),
            Err(e) => {
                let stage = self.state;
                self.transition(RunState::Failed);
                log::error!("Run failed while {}: {}", stage, e);
                Err(AppError::at(stage.as_str(), e))
            }
        }
    }

    async fn execute(&mut self, started_at: DateTime<Utc>) -> Result<RunReport> {
        let html = self.source.fetch().await?;

        self.transition(RunState::Extracting);
        let current = self.extractor.extract(&html)?;
        log::info!("Extracted {} offers", current.len());

        self.transition(RunState::Diffing);
        let previous = self.store.load().await?;
        let delta = detect(&current, previous.as_deref());
        Self::log_delta(&delta);

        let notification = if delta.has_new {
            self.notify(&delta.new_offers).await
        } else {
            NotifyOutcome::NotNeeded
        };

        let persisted = if self.options.persist {
            self.transition(RunState::Persisting);
            self.store.save(&current).await?;
            true
        } else {
            log::info!("Persistence disabled, snapshot left untouched");
            false
        };

        self.transition(RunState::Done);

        Ok(RunReport {
            state: self.state,
            source: self.source.location().to_string(),
            snapshot: self.store.location(),
            fetched: current.len(),
            previous: previous.as_ref().map(Vec::len),
            delta,
            notification,
            persisted,
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn notify(&mut self, offers: &[Offer]) -> NotifyOutcome {
        if !self.options.notify {
            log::info!("Notifications disabled, {} new offers not sent", offers.len());
            return NotifyOutcome::Disabled;
        }
        if self.notifier.is_none() {
            log::warn!("No notifier configured, {} new offers not sent", offers.len());
            return NotifyOutcome::Disabled;
        }

        self.transition(RunState::Notifying);

        let result = match &self.notifier {
            Some(notifier) => notifier.notify(offers, self.source.location()).await,
            None => return NotifyOutcome::Disabled,
        };
        match result {
            Ok(()) => NotifyOutcome::Sent,
            Err(e) => {
                log::error!("Failed to send notification: {}", e);
                NotifyOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    fn log_delta(delta: &Delta) {
        if delta.has_new {
            log::info!("New offers detected: {}", delta.new_count());
            for offer in &delta.new_offers {
                log::info!("{}", offer.format("    [{code}] {title} ({status})"));
            }
        } else {
            log::info!("No new offers detected");
        }
        if !delta.removed.is_empty() {
            log::info!("{} offers no longer listed", delta.removed.len());
        }
        if !delta.changed.is_empty() {
            log::info!("{} offers changed details", delta.changed.len());
        }
    }
}
