//! Deterministic currency and date formatting for everything the views display.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";
pub const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// How amounts and dates are turned into display text.
///
/// # Examples
/// ```
/// # use pocket_ledger::view::DisplayFormat;
/// # use rust_decimal::Decimal;
/// let format = DisplayFormat::default();
/// assert_eq!(format.currency(Decimal::new(-60000, 0)), "-$60,000.00");
/// assert_eq!(format.signed_currency(Decimal::new(1000, 0), true), "+$1,000.00");
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DisplayFormat {
    currency_symbol: String,
    date_format: String,
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SYMBOL, DEFAULT_DATE_FORMAT)
    }
}

impl DisplayFormat {
    pub fn new(currency_symbol: impl Into<String>, date_format: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
            date_format: date_format.into(),
        }
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Two decimals, thousands commas, symbol prefix and a leading `-` for negatives. Half cents
    /// round away from zero.
    pub fn currency(&self, value: Decimal) -> String {
        let rounded = round_cents(value);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}{}{}", self.currency_symbol, digits(rounded.abs()))
    }

    /// Like `currency` for a magnitude, with an explicit `+` for income and `-` for expense.
    pub fn signed_currency(&self, magnitude: Decimal, is_income: bool) -> String {
        let sign = if is_income { '+' } else { '-' };
        format!(
            "{sign}{}{}",
            self.currency_symbol,
            digits(round_cents(magnitude.abs()))
        )
    }

    /// Formats `date` with the configured `chrono` format string.
    ///
    /// A format string `chrono` cannot render falls back to ISO-8601 rather than failing.
    pub fn date(&self, date: NaiveDate) -> String {
        let mut out = String::new();
        match write!(out, "{}", date.format(&self.date_format)) {
            Ok(()) => out,
            Err(_) => date.format("%Y-%m-%d").to_string(),
        }
    }
}

fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `1234.5` -> `1,234.50`, computed from the decimal digits so no precision is lost.
fn digits(magnitude: Decimal) -> String {
    let text = format!("{magnitude:.2}");
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 3);
    for (ix, c) in whole.chars().enumerate() {
        if ix > 0 && (whole.len() - ix) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{grouped}.{cents}")
}
