//! Delete-transaction handler.

use crate::commands::{Out, Tracker};
use crate::model::{Transaction, TransactionId};
use crate::store::KeyValueStore;
use crate::view::NotificationKind;
use crate::Result;

pub const DELETED_MESSAGE: &str = "Transaction deleted";
pub const DELETE_FAILED_MESSAGE: &str = "Unable to delete the transaction";

impl<S> Tracker<S>
where
    S: KeyValueStore,
{
    /// Removes the transaction with `id` and refreshes the view.
    ///
    /// Deleting an id that is not in the ledger is not an error: the ledger is unchanged, the view
    /// is still refreshed and the same notification is shown.
    ///
    /// # Returns
    ///
    /// An `Out` with the deleted message and the removed transaction, or `None` if there was no
    /// transaction with `id`.
    ///
    /// # Errors
    ///
    /// `Storage` if the ledger cannot be written. An error notification is shown and the
    /// transaction stays in the ledger.
    pub async fn handle_delete(&mut self, id: TransactionId) -> Result<Out<Option<Transaction>>> {
        let removed = match self.ledger.remove(id).await {
            Ok(removed) => removed,
            Err(e) => {
                self.notify(DELETE_FAILED_MESSAGE, NotificationKind::Error);
                return Err(e);
            }
        };
        self.refresh();
        self.notify(DELETED_MESSAGE, NotificationKind::Success);
        let out = Out::new(DELETED_MESSAGE, removed);
        out.log();
        Ok(out)
    }
}
