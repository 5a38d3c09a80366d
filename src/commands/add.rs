//! Add-transaction handler.

use crate::commands::{Out, Tracker};
use crate::model::{RawTransactionInput, Transaction};
use crate::store::KeyValueStore;
use crate::view::NotificationKind;
use crate::Result;
use tracing::debug;

pub const ADDED_MESSAGE: &str = "Transaction added successfully!";
pub const INVALID_INPUT_MESSAGE: &str = "Please fill in all fields correctly";
pub const SAVE_FAILED_MESSAGE: &str = "Unable to save the transaction";

impl<S> Tracker<S>
where
    S: KeyValueStore,
{
    /// Parses the form input, adds the transaction and refreshes the view with the current
    /// filter.
    ///
    /// # Returns
    ///
    /// On success, returns an `Out` containing the success message and the stored `Transaction`
    /// with its new id.
    ///
    /// # Errors
    ///
    /// - `Validation` if a field cannot be parsed, the description is empty or the amount is not
    ///   positive or out of bounds. An error notification is shown, nothing is stored and the view is not redrawn.
    /// - `Storage` if the ledger cannot be written. An error notification is shown and the ledger
    ///   is left as it was.
    pub async fn handle_add(&mut self, raw: &RawTransactionInput) -> Result<Out<Transaction>> {
        let added = match raw.parse() {
            Ok(draft) => self.ledger.add(draft).await,
            Err(e) => Err(e),
        };
        let transaction = match added {
            Ok(t) => t,
            Err(e) => {
                debug!("Rejected new transaction: {e}");
                let message = if e.is_validation() {
                    INVALID_INPUT_MESSAGE
                } else {
                    SAVE_FAILED_MESSAGE
                };
                self.notify(message, NotificationKind::Error);
                return Err(e);
            }
        };

        self.refresh();
        self.notify(ADDED_MESSAGE, NotificationKind::Success);
        let out = Out::new(ADDED_MESSAGE, transaction);
        out.log();
        Ok(out)
    }
}
