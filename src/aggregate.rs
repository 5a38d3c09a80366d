//! Pure functions that derive figures and views from a ledger snapshot.

use crate::model::{Filter, Transaction, TransactionType};
use rust_decimal::Decimal;
use serde::Serialize;

/// Income, expense and balance across a whole ledger.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    /// Always `income - expense`.
    pub balance: Decimal,
}

/// Sums income and expense amounts. An empty ledger has all-zero totals.
///
/// Sums saturate at `Decimal::MAX` instead of overflowing.
pub fn totals(ledger: &[Transaction]) -> Totals {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    for t in ledger {
        let amount = t.amount().value();
        match t.transaction_type() {
            TransactionType::Income => income = income.saturating_add(amount),
            TransactionType::Expense => expense = expense.saturating_add(amount),
        }
    }
    Totals {
        income,
        expense,
        balance: income.saturating_sub(expense),
    }
}

/// The summed expense of one category.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

/// Expense sums grouped by category, in the order each category first appears in the ledger.
///
/// Only categories with at least one expense are present.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    entries: Vec<CategoryTotal>,
}

impl CategoryBreakdown {
    /// The summed expense for `category`, or `None` if it has no expenses.
    pub fn get(&self, category: &str) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.amount)
    }

    pub fn entries(&self) -> &[CategoryTotal] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn add(&mut self, category: &str, amount: Decimal) {
        match self.entries.iter_mut().find(|e| e.category == category) {
            Some(entry) => entry.amount = entry.amount.saturating_add(amount),
            None => self.entries.push(CategoryTotal {
                category: category.to_string(),
                amount,
            }),
        }
    }
}

/// Groups expense transactions by category and sums them. Income is ignored.
pub fn expense_by_category(ledger: &[Transaction]) -> CategoryBreakdown {
    let mut breakdown = CategoryBreakdown::default();
    for t in ledger.iter().filter(|t| !t.is_income()) {
        breakdown.add(t.category(), t.amount().value());
    }
    breakdown
}

/// The transactions that pass `filter`, in ledger order.
pub fn filtered<'a>(ledger: &'a [Transaction], filter: &Filter) -> Vec<&'a Transaction> {
    ledger
        .iter()
        .filter(|t| filter.matches(t.category()))
        .collect()
}

/// Sorts newest first. Transactions on the same date keep their relative order.
pub fn sorted_by_date_desc(mut transactions: Vec<&Transaction>) -> Vec<&Transaction> {
    // `sort_by` is stable
    transactions.sort_by(|a, b| b.date().cmp(&a.date()));
    transactions
}
