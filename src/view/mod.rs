//! Keeps the summary, transaction list and chart consistent with the ledger.
//!
//! The `ViewSync` never renders anything itself. It derives plain view-models from a ledger
//! snapshot and pushes them to the display collaborators it was given, which may be a DOM, a
//! terminal UI or a test recorder.

mod format;

use crate::aggregate::{expense_by_category, filtered, sorted_by_date_desc, totals};
use crate::model::{Filter, Transaction, TransactionId};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::time::Duration;
use tracing::trace;

pub use format::{DisplayFormat, DEFAULT_CURRENCY_SYMBOL, DEFAULT_DATE_FORMAT};

/// Chart slice colors, assigned to categories in order and reused from the start when there are
/// more categories than colors.
pub const CHART_PALETTE: [&str; 8] = [
    "#4f46e5", "#10b981", "#ef4444", "#f59e0b", "#8b5cf6", "#ec4899", "#06b6d4", "#f97316",
];

/// The three summary figures, already formatted.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct SummaryView {
    pub balance: String,
    pub income: String,
    pub expense: String,
}

/// One row of the transaction list.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct TransactionRow {
    pub id: TransactionId,
    pub date_text: String,
    pub description: String,
    pub category_label: String,
    /// `+$1,000.00` for income, `-$400.00` for expense.
    pub signed_amount: String,
    pub is_income: bool,
}

/// The expense-by-category series handed to the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<&'static str>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Whether a notification reports a success or an error.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

serde_plain::derive_display_from_serialize!(NotificationKind);

/// Receives the formatted summary figures.
pub trait SummaryDisplay {
    fn show_summary(&mut self, summary: &SummaryView);
}

/// Receives the ordered transaction rows.
pub trait ListDisplay {
    /// Replaces the displayed rows with `rows`, which is never empty.
    fn show_rows(&mut self, rows: &[TransactionRow]);

    /// Shows the "no transactions found" state.
    fn show_empty(&mut self);
}

/// Receives the expense chart. Every call fully replaces what was displayed before.
pub trait ChartDisplay {
    /// Draws a new chart for `series`, which is never empty.
    fn plot(&mut self, series: &ChartSeries);

    /// Destroys the chart drawn by the last `plot`.
    fn clear(&mut self);

    /// Shows the "no data" state in place of a chart.
    fn show_no_data(&mut self);
}

/// Shows transient messages to the user. Fire-and-forget.
pub trait Notifier {
    /// Shows `message` and dismisses it after `duration`.
    fn notify(&mut self, message: &str, kind: NotificationKind, duration: Duration);
}

/// Derives everything observable from a ledger snapshot and pushes it to the displays.
pub struct ViewSync {
    format: DisplayFormat,
    summary: Box<dyn SummaryDisplay>,
    list: Box<dyn ListDisplay>,
    chart: Box<dyn ChartDisplay>,
    /// The series of the chart that is currently drawn, if one is.
    plotted: Option<ChartSeries>,
}

impl ViewSync {
    pub fn new(
        format: DisplayFormat,
        summary: Box<dyn SummaryDisplay>,
        list: Box<dyn ListDisplay>,
        chart: Box<dyn ChartDisplay>,
    ) -> Self {
        Self {
            format,
            summary,
            list,
            chart,
            plotted: None,
        }
    }

    pub fn format(&self) -> &DisplayFormat {
        &self.format
    }

    /// The series currently drawn on the chart, `None` when the chart shows no data.
    pub fn plotted(&self) -> Option<&ChartSeries> {
        self.plotted.as_ref()
    }

    /// Recomputes the summary, the list and the chart and pushes all three.
    ///
    /// The summary and the chart always cover the whole ledger. Only the list is narrowed by
    /// `filter`.
    pub fn refresh(&mut self, ledger: &[Transaction], filter: &Filter) {
        trace!("refresh {} transactions, filter '{filter}'", ledger.len());

        let summary = self.summary_view(ledger);
        self.summary.show_summary(&summary);

        let rows = self.rows(ledger, filter);
        if rows.is_empty() {
            self.list.show_empty();
        } else {
            self.list.show_rows(&rows);
        }

        // The previous chart is destroyed before anything new is drawn.
        if self.plotted.take().is_some() {
            self.chart.clear();
        }
        let series = chart_series(ledger);
        if series.is_empty() {
            self.chart.show_no_data();
        } else {
            self.chart.plot(&series);
            self.plotted = Some(series);
        }
    }

    pub fn summary_view(&self, ledger: &[Transaction]) -> SummaryView {
        let totals = totals(ledger);
        SummaryView {
            balance: self.format.currency(totals.balance),
            income: self.format.currency(totals.income),
            expense: self.format.currency(totals.expense),
        }
    }

    /// The list rows for `filter`, newest first.
    pub fn rows(&self, ledger: &[Transaction], filter: &Filter) -> Vec<TransactionRow> {
        sorted_by_date_desc(filtered(ledger, filter))
            .into_iter()
            .map(|t| TransactionRow {
                id: t.id(),
                date_text: self.format.date(t.date()),
                description: t.description().to_string(),
                category_label: t.category().to_string(),
                signed_amount: self
                    .format
                    .signed_currency(t.amount().value(), t.is_income()),
                is_income: t.is_income(),
            })
            .collect()
    }
}

/// Builds the chart series from the expense breakdown, one slice per category.
pub fn chart_series(ledger: &[Transaction]) -> ChartSeries {
    let breakdown = expense_by_category(ledger);
    let mut series = ChartSeries {
        labels: Vec::with_capacity(breakdown.len()),
        values: Vec::with_capacity(breakdown.len()),
        colors: Vec::with_capacity(breakdown.len()),
    };
    for (ix, entry) in breakdown.entries().iter().enumerate() {
        series.labels.push(entry.category.clone());
        series.values.push(entry.amount.to_f64().unwrap_or_default());
        series.colors.push(CHART_PALETTE[ix % CHART_PALETTE.len()]);
    }
    series
}
