//! Types that represent the core data model, such as `Transaction`, `Amount` and `Filter`.
mod amount;
mod filter;
mod transaction;

pub use amount::{Amount, AmountError};
pub use filter::{Filter, ALL};
pub use transaction::{
    RawTransactionInput, Transaction, TransactionDraft, TransactionId, TransactionType, MAX_AMOUNT,
    MAX_DECIMAL_PLACES,
};
