//! The ledger and derived-view core of a personal income and expense tracker.
//!
//! Transactions are recorded through a `Tracker`, persisted as JSON in a `KeyValueStore` and
//! pushed as plain view-models to display collaborators after every change.

pub mod aggregate;
pub mod commands;
mod config;
mod error;
pub mod ledger;
pub mod logging;
pub mod model;
pub mod store;
mod utils;
pub mod view;


pub use commands::{Out, Tracker};
pub use config::{home_from_env, Config, HOME_ENV};
pub use error::{Error, ErrorType, Result};
pub use ledger::LedgerStore;
pub use model::{Amount, Filter, RawTransactionInput, Transaction, TransactionType};
