//! The ledger store: the single owner of the recorded transactions and the only path by which
//! they change.
//!
//! Every mutation rewrites the full ledger to the key-value store before it returns. If that
//! write fails the in-memory ledger is put back the way it was, so memory never runs ahead of
//! what is durable.

use crate::error::{Error, ErrorType, IntoResult, Result};
use crate::model::{Transaction, TransactionDraft, TransactionId};
use crate::store::KeyValueStore;
use anyhow::Context;
use std::collections::HashSet;
use tracing::{debug, warn};

/// The key the ledger is stored under.
pub const TRANSACTIONS_KEY: &str = "transactions";

/// The key an unreadable ledger payload is copied to before the ledger is reset.
pub const CORRUPT_BACKUP_KEY: &str = "transactions.corrupt";

/// Source of the current time in milliseconds since the Unix epoch.
pub(crate) type Clock = fn() -> i64;

fn system_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Mints transaction ids from the clock, never handing out the same id twice.
///
/// Two adds inside the same millisecond, or a clock that steps backwards, get `last + 1` instead
/// of the clock reading.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
struct IdMinter {
    last: Option<TransactionId>,
}

impl IdMinter {
    fn seeded(transactions: &[Transaction]) -> Self {
        Self {
            last: transactions.iter().map(Transaction::id).max(),
        }
    }

    /// Returns `None` once `last` is `i64::MAX` and no larger id exists.
    fn mint(&mut self, now: i64) -> Option<TransactionId> {
        let id = match self.last {
            Some(last) if now <= last => last.checked_add(1)?,
            _ => now,
        };
        self.last = Some(id);
        Some(id)
    }
}

/// Owns the ledger and persists it to `S` after every mutation.
///
/// All mutations take `&mut self`, so a load, add or remove and its persist always finish before
/// anything else can read the ledger.
pub struct LedgerStore<S> {
    store: S,
    transactions: Vec<Transaction>,
    ids: IdMinter,
    clock: Clock,
    recovered: Option<Error>,
}

impl<S> LedgerStore<S>
where
    S: KeyValueStore,
{
    /// Loads the ledger stored under `transactions` in `store`.
    ///
    /// A missing payload is an empty ledger. A payload that cannot be parsed is also loaded as an
    /// empty ledger: the `CorruptState` error is logged, kept for `recovered()`, and the raw payload
    /// is copied to `transactions.corrupt` so it is not lost when the next mutation overwrites it.
    ///
    /// # Errors
    /// Only returns a `Storage` error, when `store` itself fails to read.
    pub async fn load(store: S) -> Result<Self> {
        Self::load_with_clock(store, system_millis).await
    }

    pub(crate) async fn load_with_clock(mut store: S, clock: Clock) -> Result<Self> {
        let payload = store
            .get(TRANSACTIONS_KEY)
            .await
            .context("Unable to read the stored ledger")
            .pub_result(ErrorType::Storage)?;

        let (transactions, recovered) = match payload {
            None => {
                debug!("No stored ledger found, starting with an empty one");
                (Vec::new(), None)
            }
            Some(raw) => match parse_ledger(&raw) {
                Ok(transactions) => (transactions, None),
                Err(e) => {
                    warn!("The stored ledger is unreadable and has been reset: {e}");
                    if let Err(backup_err) = store.set(CORRUPT_BACKUP_KEY, &raw).await {
                        warn!("Unable to back up the unreadable ledger: {backup_err:#}");
                    }
                    (Vec::new(), Some(e))
                }
            },
        };

        debug!("Loaded {} transactions", transactions.len());
        Ok(Self {
            store,
            ids: IdMinter::seeded(&transactions),
            transactions,
            clock,
            recovered,
        })
    }

    /// Validates `draft`, gives it a fresh id, appends it and persists the ledger.
    ///
    /// # Errors
    /// - `Validation` if the description is empty or the amount is not positive. Nothing changes.
    /// - `Storage` if the ledger cannot be written. The append is undone.
    /// - `CorruptState` if no id larger than every existing one can be minted.
    pub async fn add(&mut self, draft: TransactionDraft) -> Result<Transaction> {
        draft.validate()?;
        let id = self.ids.mint((self.clock)()).ok_or_else(|| {
            Error::corrupt("No transaction id is left after the largest stored id")
        })?;
        let transaction = Transaction::new(id, draft);
        self.transactions.push(transaction.clone());
        if let Err(e) = self.persist().await {
            self.transactions.pop();
            return Err(e);
        }
        debug!(
            "Added {} transaction {id} '{}'",
            transaction.transaction_type(),
            transaction.description()
        );
        Ok(transaction)
    }

    /// Removes the transaction with `id` and persists the ledger. Returns what was removed.
    ///
    /// Removing an id that is not in the ledger is a no-op and returns `Ok(None)`.
    ///
    /// # Errors
    /// `Storage` if the ledger cannot be written. The transaction is put back where it was.
    pub async fn remove(&mut self, id: TransactionId) -> Result<Option<Transaction>> {
        let Some(ix) = self.transactions.iter().position(|t| t.id() == id) else {
            debug!("Transaction {id} is not in the ledger, nothing to remove");
            return Ok(None);
        };
        let removed = self.transactions.remove(ix);
        if let Err(e) = self.persist().await {
            self.transactions.insert(ix, removed);
            return Err(e);
        }
        debug!("Removed transaction {id}");
        Ok(Some(removed))
    }

    /// The current ledger, in insertion order.
    pub fn snapshot(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The `CorruptState` error the ledger recovered from while loading, if any.
    pub fn recovered(&self) -> Option<&Error> {
        self.recovered.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.transactions)
            .context("Unable to serialize the ledger")
            .pub_result(ErrorType::Storage)?;
        self.store
            .set(TRANSACTIONS_KEY, &json)
            .await
            .context("Unable to write the ledger")
            .pub_result(ErrorType::Storage)
    }
}

/// Parses a stored ledger payload.
///
/// `null` is read as an empty ledger. Anything that is not a sequence of transaction records, or
/// that breaks a ledger invariant (an empty description, an amount that is not positive or out of
/// bounds, two records with the same id, an id of `i64::MAX` that leaves no room for the next
/// one), is a `CorruptState` error.
pub fn parse_ledger(raw: &str) -> Result<Vec<Transaction>> {
    let parsed: Option<Vec<Transaction>> = serde_json::from_str(raw)
        .context("The stored ledger is not a sequence of transactions")
        .pub_result(ErrorType::CorruptState)?;
    let transactions = parsed.unwrap_or_default();

    let mut seen = HashSet::new();
    for t in &transactions {
        if let Err(e) = t.validate() {
            return Err(Error::corrupt(format!(
                "Stored transaction {} is invalid: {e}",
                t.id()
            )));
        }
        if t.id() == TransactionId::MAX {
            return Err(Error::corrupt(format!(
                "Stored transaction id {} is too large",
                t.id()
            )));
        }
        if !seen.insert(t.id()) {
            return Err(Error::corrupt(format!(
                "Stored transaction id {} appears more than once",
                t.id()
            )));
        }
    }
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, TransactionType};
    use crate::store::MemoryStore;
    use crate::test::{draft, FailingStore};

    fn frozen() -> i64 {
        1_000
    }

    async fn empty_ledger() -> LedgerStore<MemoryStore> {
        LedgerStore::load_with_clock(MemoryStore::new(), frozen)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_load_absent_is_empty() {
        let ledger = LedgerStore::load(MemoryStore::new()).await.unwrap();
        assert!(ledger.snapshot().is_empty());
        assert!(ledger.recovered().is_none());
    }

    #[tokio::test]
    async fn test_load_null_is_empty() {
        let ledger = LedgerStore::load(MemoryStore::with(TRANSACTIONS_KEY, "null"))
            .await
            .unwrap();
        assert!(ledger.snapshot().is_empty());
        assert!(ledger.recovered().is_none());
    }

    #[tokio::test]
    async fn test_load_corrupt_falls_back_to_empty_and_keeps_payload() {
        let raw = "{not json";
        let ledger = LedgerStore::load(MemoryStore::with(TRANSACTIONS_KEY, raw))
            .await
            .unwrap();
        assert!(ledger.snapshot().is_empty());
        assert!(ledger.recovered().unwrap().is_corrupt_state());
        assert_eq!(ledger.store().peek(CORRUPT_BACKUP_KEY), Some(raw));
    }

    #[test]
    fn test_parse_rejects_broken_invariants() {
        let negative = r#"[{"id":1,"description":"x","amount":-5,"type":"expense","category":"c","date":"2024-01-01"}]"#;
        let blank = r#"[{"id":1,"description":" ","amount":5,"type":"expense","category":"c","date":"2024-01-01"}]"#;
        let duplicate = r#"[
            {"id":1,"description":"a","amount":5,"type":"expense","category":"c","date":"2024-01-01"},
            {"id":1,"description":"b","amount":6,"type":"income","category":"c","date":"2024-01-02"}
        ]"#;
        let wrong_shape = r#"{"transactions":[]}"#;
        let bad_date = r#"[{"id":1,"description":"a","amount":5,"type":"expense","category":"c","date":"yesterday"}]"#;
        for raw in [negative, blank, duplicate, wrong_shape, bad_date] {
            assert!(parse_ledger(raw).unwrap_err().is_corrupt_state(), "{raw}");
        }
    }

    #[tokio::test]
    async fn test_add_persists_and_round_trips() {
        let mut ledger = empty_ledger().await;
        let salary = ledger
            .add(draft("Salary", "1000", TransactionType::Income, "Job", "2024-03-01"))
            .await
            .unwrap();
        let rent = ledger
            .add(draft("Rent", "400.25", TransactionType::Expense, "Housing", "2024-03-02"))
            .await
            .unwrap();

        let reloaded = LedgerStore::load(ledger.store().clone()).await.unwrap();
        assert_eq!(reloaded.snapshot(), &[salary, rent]);
        assert_eq!(reloaded.snapshot(), ledger.snapshot());
    }

    #[tokio::test]
    async fn test_add_invalid_does_not_mutate() {
        let mut ledger = empty_ledger().await;
        let err = ledger
            .add(draft("", "50", TransactionType::Expense, "Food", "2024-03-01"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        let zero = TransactionDraft::new(
            "Lunch",
            Amount::ZERO,
            TransactionType::Expense,
            "Food",
            chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        assert!(ledger.add(zero).await.unwrap_err().is_validation());
        assert!(ledger.snapshot().is_empty());
        assert_eq!(ledger.store().peek(TRANSACTIONS_KEY), None);
    }

    #[tokio::test]
    async fn test_ids_are_unique_within_one_millisecond() {
        let mut ledger = empty_ledger().await;
        let mut ids = Vec::new();
        for i in 0..5 {
            let t = ledger
                .add(draft(&format!("t{i}"), "1", TransactionType::Expense, "c", "2024-01-01"))
                .await
                .unwrap();
            ids.push(t.id());
        }
        assert_eq!(ids, vec![1_000, 1_001, 1_002, 1_003, 1_004]);
    }

    #[tokio::test]
    async fn test_ids_continue_past_loaded_ids() {
        let raw = r#"[{"id":5000,"description":"a","amount":5,"type":"expense","category":"c","date":"2024-01-01"}]"#;
        let store = MemoryStore::with(TRANSACTIONS_KEY, raw);
        let mut ledger = LedgerStore::load_with_clock(store, frozen).await.unwrap();
        let t = ledger
            .add(draft("b", "1", TransactionType::Income, "c", "2024-01-02"))
            .await
            .unwrap();
        assert_eq!(t.id(), 5001);
    }

    #[test]
    fn test_id_minter_follows_clock_when_ahead() {
        let mut ids = IdMinter::default();
        assert_eq!(ids.mint(10), Some(10));
        assert_eq!(ids.mint(10), Some(11));
        assert_eq!(ids.mint(9), Some(12));
        assert_eq!(ids.mint(50), Some(50));
    }

    #[test]
    fn test_id_minter_does_not_overflow() {
        let mut ids = IdMinter {
            last: Some(i64::MAX - 1),
        };
        assert_eq!(ids.mint(0), Some(i64::MAX));
        assert_eq!(ids.mint(0), None);
        assert_eq!(ids.mint(i64::MAX), None);
    }

    #[tokio::test]
    async fn test_largest_id_is_corrupt() {
        let raw = format!(
            r#"[{{"id":{},"description":"a","amount":5,"type":"expense","category":"c","date":"2024-01-01"}}]"#,
            i64::MAX
        );
        assert!(parse_ledger(&raw).unwrap_err().is_corrupt_state());

        let store = MemoryStore::with(TRANSACTIONS_KEY, raw);
        let mut ledger = LedgerStore::load_with_clock(store, frozen).await.unwrap();
        assert!(ledger.recovered().unwrap().is_corrupt_state());
        let t = ledger
            .add(draft("b", "1", TransactionType::Income, "c", "2024-01-02"))
            .await
            .unwrap();
        assert_eq!(t.id(), 1_000);
    }

    #[tokio::test]
    async fn test_amounts_at_the_bound_round_trip() {
        let mut ledger = empty_ledger().await;
        ledger
            .add(draft("Salary", "1000", TransactionType::Income, "Job", "2024-03-01"))
            .await
            .unwrap();
        for amount in ["999999999999.99", "1000000000000", "0.01", "1234567.89"] {
            ledger
                .add(draft("big", amount, TransactionType::Expense, "c", "2024-03-02"))
                .await
                .unwrap();
        }
        let reloaded = LedgerStore::load(ledger.store().clone()).await.unwrap();
        assert!(reloaded.recovered().is_none());
        assert_eq!(reloaded.snapshot(), ledger.snapshot());
        let amounts: Vec<String> = reloaded
            .snapshot()
            .iter()
            .map(|t| t.amount().value().normalize().to_string())
            .collect();
        assert_eq!(
            amounts,
            vec!["1000", "999999999999.99", "1000000000000", "0.01", "1234567.89"]
        );
    }

    #[tokio::test]
    async fn test_out_of_bound_amounts_are_never_stored() {
        let mut ledger = empty_ledger().await;
        ledger
            .add(draft("Salary", "1000", TransactionType::Income, "Job", "2024-03-01"))
            .await
            .unwrap();
        let before = ledger.store().peek(TRANSACTIONS_KEY).map(str::to_string);
        for amount in ["79228162514264337593543950335", "1234567.123456789012"] {
            let err = ledger
                .add(draft("big", amount, TransactionType::Expense, "c", "2024-03-02"))
                .await
                .unwrap_err();
            assert!(err.is_validation(), "{amount}");
        }
        assert_eq!(
            ledger.store().peek(TRANSACTIONS_KEY).map(str::to_string),
            before
        );

        let reloaded = LedgerStore::load(ledger.store().clone()).await.unwrap();
        assert_eq!(reloaded.snapshot().len(), 1);
        assert!(reloaded.recovered().is_none());
    }

    #[test]
    fn test_parse_rejects_out_of_bound_amounts() {
        let raw = r#"[{"id":1,"description":"x","amount":1000000000000.5,"type":"expense","category":"c","date":"2024-01-01"}]"#;
        assert!(parse_ledger(raw).unwrap_err().is_corrupt_state());
        let raw = r#"[{"id":1,"description":"x","amount":0.125,"type":"expense","category":"c","date":"2024-01-01"}]"#;
        assert!(parse_ledger(raw).unwrap_err().is_corrupt_state());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let mut ledger = empty_ledger().await;
        let keep = ledger
            .add(draft("keep", "1", TransactionType::Income, "c", "2024-01-01"))
            .await
            .unwrap();
        let gone = ledger
            .add(draft("gone", "2", TransactionType::Expense, "c", "2024-01-02"))
            .await
            .unwrap();

        let removed = ledger.remove(gone.id()).await.unwrap();
        assert_eq!(removed, Some(gone.clone()));
        let after_first = ledger.snapshot().to_vec();
        let persisted = ledger.store().peek(TRANSACTIONS_KEY).map(str::to_string);

        assert_eq!(ledger.remove(gone.id()).await.unwrap(), None);
        assert_eq!(ledger.snapshot(), after_first.as_slice());
        assert_eq!(ledger.snapshot(), &[keep]);
        assert_eq!(
            ledger.store().peek(TRANSACTIONS_KEY).map(str::to_string),
            persisted
        );
    }

    #[tokio::test]
    async fn test_remove_missing_id_is_not_an_error() {
        let mut ledger = empty_ledger().await;
        assert_eq!(ledger.remove(42).await.unwrap(), None);
        assert!(ledger.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_failed_persist_rolls_back() {
        let store = FailingStore::default();
        let switch = store.switch();
        let mut ledger = LedgerStore::load_with_clock(store, frozen).await.unwrap();
        let first = ledger
            .add(draft("first", "1", TransactionType::Income, "c", "2024-01-01"))
            .await
            .unwrap();
        let second = ledger
            .add(draft("second", "2", TransactionType::Expense, "c", "2024-01-02"))
            .await
            .unwrap();

        switch.fail_writes(true);
        let err = ledger
            .add(draft("third", "3", TransactionType::Expense, "c", "2024-01-03"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Storage);
        let err = ledger.remove(first.id()).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Storage);
        assert_eq!(ledger.snapshot(), &[first.clone(), second.clone()]);

        switch.fail_writes(false);
        let third = ledger
            .add(draft("third", "3", TransactionType::Expense, "c", "2024-01-03"))
            .await
            .unwrap();
        assert_ne!(third.id(), second.id());
        assert_eq!(ledger.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_read_is_a_storage_error() {
        let store = FailingStore::default();
        store.switch().fail_reads(true);
        let err = LedgerStore::load(store).await.err().unwrap();
        assert_eq!(err.error_type(), ErrorType::Storage);
    }
}
