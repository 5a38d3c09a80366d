use crate::error::{Error, Result};
use crate::model::Amount;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The identity key of a `Transaction`. Minted from the creation time in milliseconds.
pub type TransactionId = i64;

/// The format of dates in storage and in raw form input.
pub(crate) const ISO_DATE: &str = "%Y-%m-%d";

/// The largest amount a single transaction may have, in currency units.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Amounts are whole cents. Together with `MAX_AMOUNT` this keeps every amount within the digits
/// a JSON number carries exactly.
pub const MAX_DECIMAL_PLACES: u32 = 2;

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// A single recorded income or expense. Immutable once it is in the ledger.
///
/// The serialized form is the persisted record layout:
/// ```json
/// {"id":1709251200000,"description":"Salary","amount":1000.0,"type":"income","category":"Job","date":"2024-03-01"}
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    description: String,
    amount: Amount,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    category: String,
    date: NaiveDate,
}

impl Transaction {
    pub(crate) fn new(id: TransactionId, draft: TransactionDraft) -> Self {
        Self {
            id,
            description: draft.description,
            amount: draft.amount,
            transaction_type: draft.transaction_type,
            category: draft.category,
            date: draft.date,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Checks the field invariants every ledger entry must hold.
    pub(crate) fn validate(&self) -> Result<()> {
        validate_fields(&self.description, self.amount)
    }
}

/// The typed fields of a transaction that has not been given an id yet.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TransactionDraft {
    description: String,
    amount: Amount,
    transaction_type: TransactionType,
    category: String,
    date: NaiveDate,
}

impl TransactionDraft {
    pub fn new(
        description: impl Into<String>,
        amount: Amount,
        transaction_type: TransactionType,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            description: description.into().trim().to_string(),
            amount,
            transaction_type,
            category: category.into(),
            date,
        }
    }

    /// Fails with a `Validation` error if the description is empty, or the amount is not positive,
    /// exceeds `MAX_AMOUNT` or has more than `MAX_DECIMAL_PLACES` decimals.
    pub fn validate(&self) -> Result<()> {
        validate_fields(&self.description, self.amount)
    }
}

fn validate_fields(description: &str, amount: Amount) -> Result<()> {
    if description.trim().is_empty() {
        return Err(Error::validation("Description must not be empty"));
    }
    if !amount.is_positive() {
        return Err(Error::validation(format!(
            "Amount must be greater than zero, got {amount}"
        )));
    }
    if amount.value() > Decimal::from(MAX_AMOUNT) {
        return Err(Error::validation(format!(
            "Amount must not exceed {MAX_AMOUNT}, got {amount}"
        )));
    }
    if amount.value().normalize().scale() > MAX_DECIMAL_PLACES {
        return Err(Error::validation(format!(
            "Amount must have at most {MAX_DECIMAL_PLACES} decimal places, got {amount}"
        )));
    }
    Ok(())
}

/// Form-shaped input, every field exactly as the user typed or selected it.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RawTransactionInput {
    pub description: String,
    pub amount: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub category: String,
    pub date: String,
}

impl RawTransactionInput {
    /// Trims and parses each field into a `TransactionDraft`.
    ///
    /// # Errors
    /// Returns a `Validation` error naming the first field that cannot be parsed, or that breaks
    /// the draft invariants (empty description, amount not greater than zero).
    pub fn parse(&self) -> Result<TransactionDraft> {
        let amount = Amount::from_str(&self.amount).map_err(|e| {
            Error::validation(format!("Amount '{}' is not a number: {e}", self.amount))
        })?;
        let transaction_type = TransactionType::from_str(self.transaction_type.trim())
            .map_err(|_| {
                Error::validation(format!(
                    "Type '{}' must be 'income' or 'expense'",
                    self.transaction_type
                ))
            })?;
        let date = NaiveDate::parse_from_str(self.date.trim(), ISO_DATE).map_err(|e| {
            Error::validation(format!("Date '{}' is not a valid date: {e}", self.date))
        })?;
        let draft = TransactionDraft::new(
            self.description.as_str(),
            amount,
            transaction_type,
            self.category.as_str(),
            date,
        );
        draft.validate()?;
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;

    fn input(description: &str, amount: &str, kind: &str, date: &str) -> RawTransactionInput {
        RawTransactionInput {
            description: description.to_string(),
            amount: amount.to_string(),
            transaction_type: kind.to_string(),
            category: "Food".to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn test_parse_trims_description() {
        let draft = input("  Groceries \n", "42.10", "expense", "2024-03-05")
            .parse()
            .unwrap();
        assert_eq!(draft.description, "Groceries");
        assert_eq!(draft.transaction_type, TransactionType::Expense);
        assert_eq!(draft.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        let cases = [
            input("", "50", "expense", "2024-03-05"),
            input("   ", "50", "expense", "2024-03-05"),
            input("Lunch", "", "expense", "2024-03-05"),
            input("Lunch", "abc", "expense", "2024-03-05"),
            input("Lunch", "0", "expense", "2024-03-05"),
            input("Lunch", "-5", "expense", "2024-03-05"),
            input("Lunch", "5", "transfer", "2024-03-05"),
            input("Lunch", "5", "expense", ""),
            input("Lunch", "5", "expense", "2024-02-30"),
        ];
        for case in cases {
            let err = case.parse().unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Validation, "{case:?}");
        }
    }

    #[test]
    fn test_amount_bounds() {
        let largest = input("House", "$1,000,000,000,000", "expense", "2024-03-05");
        assert!(largest.parse().is_ok());
        let cents = input("House", "999999999999.99", "expense", "2024-03-05");
        assert!(cents.parse().is_ok());
        let trailing_zeros = input("House", "12.5000", "expense", "2024-03-05");
        assert!(trailing_zeros.parse().is_ok());

        for amount in [
            "1000000000000.01",
            "79228162514264337593543950335",
            "1234567.123456789012",
            "0.001",
        ] {
            let err = input("House", amount, "expense", "2024-03-05")
                .parse()
                .unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Validation, "{amount}");
        }
    }

    #[test]
    fn test_largest_amount_survives_storage() {
        let draft = input("House", "999999999999.99", "expense", "2024-03-05")
            .parse()
            .unwrap();
        let tx = Transaction::new(1, draft);
        let json = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tx);
        assert_eq!(back.amount().value().to_string(), "999999999999.99");
    }

    #[test]
    fn test_serialized_layout() {
        let draft = input("Salary", "1000", "income", "2024-03-01")
            .parse()
            .unwrap();
        let tx = Transaction::new(7, draft);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["type"], "income");
        assert_eq!(json["date"], "2024-03-01");
        assert_eq!(json["amount"], 1000.0);
        assert_eq!(json["category"], "Food");
    }

    #[test]
    fn test_deserialize_stored_record() {
        let json = r#"{"id":1709251200000,"description":"Rent","amount":400,"type":"expense","category":"Housing","date":"2024-03-02"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.id(), 1709251200000);
        assert!(!tx.is_income());
        assert_eq!(tx.amount().to_string(), "400");
        assert!(tx.validate().is_ok());
    }

    #[test]
    fn test_transaction_type_strings() {
        assert_eq!(TransactionType::Income.to_string(), "income");
        assert_eq!(
            TransactionType::from_str("expense").unwrap(),
            TransactionType::Expense
        );
        assert!(TransactionType::from_str("Expense").is_err());
    }
}
