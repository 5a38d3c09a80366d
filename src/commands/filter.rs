//! Filter-change handler.

use crate::commands::Tracker;
use crate::model::Filter;
use crate::store::KeyValueStore;
use tracing::debug;

impl<S> Tracker<S>
where
    S: KeyValueStore,
{
    /// Replaces the current filter and redraws the view. The ledger is not touched.
    pub fn handle_filter_change(&mut self, filter: Filter) {
        debug!("Filter changed from '{}' to '{filter}'", self.filter);
        self.filter = filter;
        self.refresh();
    }
}
