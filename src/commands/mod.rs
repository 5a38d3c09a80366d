//! Command handlers for the tracker.
//!
//! A `Tracker` owns one ledger session: the ledger store, the current filter, the view
//! synchronizer and the notifier. Each user action maps to one `handle_*` method.

mod add;
mod delete;
mod filter;

use crate::ledger::LedgerStore;
use crate::model::{Filter, Transaction};
use crate::store::{FileStore, KeyValueStore};
use crate::view::{
    ChartDisplay, ListDisplay, NotificationKind, Notifier, SummaryDisplay, ViewSync,
};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, trace, warn};

pub use add::{ADDED_MESSAGE, INVALID_INPUT_MESSAGE, SAVE_FAILED_MESSAGE};
pub use delete::{DELETED_MESSAGE, DELETE_FAILED_MESSAGE};

/// The output type for a command. This allows a handler to return the same message it showed
/// the user along with, optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be shown to the user regarding the outcome of the command.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Take the structured data, dropping the message.
    pub fn into_structure(self) -> Option<T> {
        self.structure
    }

    /// Log the message to `debug!` and the structured data (if it exists) as JSON to `trace!`.
    pub fn log(&self) {
        debug!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                trace!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// One ledger session wired to its displays.
pub struct Tracker<S> {
    ledger: LedgerStore<S>,
    filter: Filter,
    view: ViewSync,
    notifier: Box<dyn Notifier>,
    notification_duration: Duration,
}

impl<S> Tracker<S>
where
    S: KeyValueStore,
{
    /// Loads the ledger from `store` and draws the initial view with filter `all`.
    ///
    /// An unreadable stored ledger does not stop the session: it starts empty and the problem is
    /// logged (see `LedgerStore::load`).
    ///
    /// # Errors
    /// A `Storage` error if `store` cannot be read at all.
    pub async fn start(
        store: S,
        view: ViewSync,
        notifier: Box<dyn Notifier>,
        notification_duration: Duration,
    ) -> Result<Self> {
        let ledger = LedgerStore::load(store).await?;
        Ok(Self::with_ledger(
            ledger,
            view,
            notifier,
            notification_duration,
        ))
    }

    fn with_ledger(
        ledger: LedgerStore<S>,
        view: ViewSync,
        notifier: Box<dyn Notifier>,
        notification_duration: Duration,
    ) -> Self {
        if let Some(e) = ledger.recovered() {
            warn!("Starting with an empty ledger after recovering from: {e}");
        }
        let mut tracker = Self {
            ledger,
            filter: Filter::All,
            view,
            notifier,
            notification_duration,
        };
        tracker.refresh();
        tracker
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn ledger(&self) -> &LedgerStore<S> {
        &self.ledger
    }

    /// The current ledger, in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.snapshot()
    }

    pub fn view(&self) -> &ViewSync {
        &self.view
    }

    fn refresh(&mut self) {
        self.view.refresh(self.ledger.snapshot(), &self.filter);
    }

    fn notify(&mut self, message: &str, kind: NotificationKind) {
        self.notifier
            .notify(message, kind, self.notification_duration);
    }
}

impl Tracker<FileStore> {
    /// Starts a session on the file store, display format and notification duration from
    /// `config`.
    pub async fn from_config(
        config: &Config,
        summary: Box<dyn SummaryDisplay>,
        list: Box<dyn ListDisplay>,
        chart: Box<dyn ChartDisplay>,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self> {
        let store = config.open_store().await?;
        let view = ViewSync::new(config.display_format(), summary, list, chart);
        Self::start(store, view, notifier, config.notification_duration()).await
    }
}
