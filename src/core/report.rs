//! Report and display formatting business logic.
//!
//! This module turns ledger data into the strings the dashboard shows: currency
//! amounts, display dates, chart labels, and the tabular transaction reports that a
//! renderer lays out as PDF. All functions are framework-agnostic and return
//! structured data; nothing here draws a page.

use crate::{
    core::dates,
    entities::{Project, Record, Transaction, transaction::NOT_AVAILABLE},
};
use chrono::{Datelike, NaiveDate};

/// Shown in place of a missing or unparsable date.
pub const MISSING_DATE: &str = "—";

/// Maximum chart label length before truncation.
pub const CHART_LABEL_WIDTH: usize = 16;

const ELLIPSIS: &str = "...";
const DISPLAY_DATE_FORMAT: &str = "%b %d, %Y";
const ROW_DATE_FORMAT: &str = "%m/%d/%Y";

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

fn is_zero_text(text: &str) -> bool {
    text.chars().all(|c| !c.is_ascii_digit() || c == '0')
}

fn with_sign(symbol: &str, amount: f64, body: &str) -> String {
    if amount.is_sign_negative() && !is_zero_text(body) {
        format!("-{symbol}{body}")
    } else {
        format!("{symbol}{body}")
    }
}

/// Formats a fixed two-decimal amount with `symbol`, e.g. `$1,234.50` or `-$7.00`.
#[must_use]
pub fn format_currency_with(symbol: &str, amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((&fixed, "00"));
    with_sign(symbol, amount, &format!("{}.{fraction}", group_thousands(whole)))
}

/// Formats a dollar amount with two decimals, e.g. `$1,234.50`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    format_currency_with("$", amount)
}

/// Formats a dollar amount the way table cells show it: thousands separators, up
/// to three fraction digits, trailing zeros dropped, e.g. `$1,234.5`.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let fixed = format!("{:.3}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((&fixed, ""));
    let fraction = fraction.trim_end_matches('0');

    let mut body = group_thousands(whole);
    if !fraction.is_empty() {
        body.push('.');
        body.push_str(fraction);
    }
    with_sign("$", amount, &body)
}

/// Formats a stored date as `Jan 02, 2024`, or [`MISSING_DATE`] when absent or
/// unparsable.
#[must_use]
pub fn format_display_date(value: Option<&str>) -> String {
    value
        .and_then(|v| dates::parse_timestamp(v).ok())
        .map_or_else(
            || MISSING_DATE.to_string(),
            |ts| ts.format(DISPLAY_DATE_FORMAT).to_string(),
        )
}

/// Long-form date with an ordinal day, e.g. `January 2nd, 2024`.
#[must_use]
pub fn format_long_date(day: NaiveDate) -> String {
    let n = day.day();
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {n}{suffix}, {}", day.format("%B"), day.year())
}

/// Cuts `text` to `max_chars` characters and appends `...` when it was longer.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Shortens an entity name for a chart axis.
#[must_use]
pub fn truncate_label(text: &str) -> String {
    truncate(text, CHART_LABEL_WIDTH)
}

/// The value, or `N/A` when absent.
#[must_use]
pub fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}

/// Replaces every run of whitespace with a single `-`.
#[must_use]
pub fn hyphenate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Generates a progress bar string for a due's paid percentage.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
///
/// # Arguments
/// * `progress_percent` - Paid percentage (0-100)
/// * `bar_length` - Length of the progress bar in characters (default 10)
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // clamped_progress is in [0, 100] and length is small, so the product fits a usize.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!(
        "[{}{}] {progress_percent:.1}%",
        "█".repeat(filled),
        "░".repeat(empty)
    )
}

/// Generates a one-line summary of a transaction: `amount | type | description`.
#[must_use]
pub fn format_transaction_summary(transaction: &Transaction) -> String {
    format!(
        "{} | {} | {}",
        format_currency(transaction.amount),
        transaction.kind,
        transaction.description_or_na()
    )
}

/// Which report is being produced, with the context its header needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportKind {
    /// General transactions table
    Transactions {
        /// Report title, also used for the file name
        title: String,
    },
    /// Transactions of one project
    Project {
        /// Project name
        name: String,
        /// Project status
        status: Option<String>,
        /// Project budget
        budget: Option<f64>,
        /// Project start date as stored
        start_date: Option<String>,
    },
    /// Transactions linked to one partner, vendor, or worker
    Entity {
        /// Entity kind, e.g. `Vendor`
        kind: String,
        /// Entity name
        name: String,
    },
}

impl Default for ReportKind {
    fn default() -> Self {
        Self::Transactions {
            title: "Transactions Report".to_string(),
        }
    }
}

impl ReportKind {
    /// Report for a project's transactions.
    #[must_use]
    pub fn for_project(project: &Project) -> Self {
        Self::Project {
            name: project.name.clone(),
            status: project.status.clone(),
            budget: project.budget,
            start_date: project.start_date.clone(),
        }
    }

    /// Report for the transactions linked to a partner, vendor, or worker.
    #[must_use]
    pub fn for_entity<R: Record>(record: &R) -> Self {
        Self::Entity {
            kind: R::KIND.to_string(),
            name: record.name().to_string(),
        }
    }

    /// Heading printed at the top of the report.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::Transactions { title } => title.clone(),
            Self::Project { name, .. } => format!("Project: {name}"),
            Self::Entity { kind, name } => format!("{kind}: {name}"),
        }
    }

    /// Line under the heading.
    #[must_use]
    pub fn subtitle(&self, generated_on: NaiveDate) -> String {
        let generated = format!("Generated on: {}", format_long_date(generated_on));
        match self {
            Self::Entity { .. } => format!("Transactions Report - {generated}"),
            _ => generated,
        }
    }

    /// Label/value lines shown above the table. Only project reports have any.
    #[must_use]
    pub fn details(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Project {
                status,
                budget,
                start_date,
                ..
            } => vec![
                ("Status", or_na(status.as_deref()).to_string()),
                (
                    "Budget",
                    budget.map_or_else(|| NOT_AVAILABLE.to_string(), format_amount),
                ),
                ("Start Date", or_na(start_date.as_deref()).to_string()),
            ],
            _ => Vec::new(),
        }
    }

    /// Output file name for a report generated on `date`.
    #[must_use]
    pub fn file_name(&self, date: NaiveDate) -> String {
        let stem = match self {
            Self::Transactions { title } => hyphenate(title),
            Self::Project { name, .. } => format!("Project-{}", hyphenate(name)),
            Self::Entity { kind, name } => format!("{kind}-{}", hyphenate(name)),
        };
        format!("{stem}-{}.pdf", date.format(dates::ISO_DATE))
    }

    /// Maximum description length in table rows.
    #[must_use]
    pub const fn description_width(&self) -> usize {
        match self {
            Self::Project { .. } => 25,
            _ => 30,
        }
    }

    /// Whether the table has a category column.
    #[must_use]
    pub const fn includes_category(&self) -> bool {
        matches!(self, Self::Transactions { .. })
    }

    /// Column headers of the table.
    #[must_use]
    pub fn headers(&self) -> Vec<&'static str> {
        let mut headers = vec!["Date", "Type", "Description", "Amount"];
        if self.includes_category() {
            headers.push("Category");
        }
        headers
    }
}

/// One table row, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// `MM/dd/yyyy`, or [`MISSING_DATE`]
    pub date: String,
    /// Type label
    pub kind: String,
    /// Truncated description
    pub description: String,
    /// Amount, e.g. `$1,234.5`
    pub amount: String,
    /// Category or `N/A`; `None` when the report has no category column
    pub category: Option<String>,
}

impl ReportRow {
    /// Cells in header order.
    #[must_use]
    pub fn cells(&self) -> Vec<&str> {
        let mut cells = vec![
            self.date.as_str(),
            self.kind.as_str(),
            self.description.as_str(),
            self.amount.as_str(),
        ];
        if let Some(category) = &self.category {
            cells.push(category);
        }
        cells
    }
}

/// Formats `transactions` as rows of a `kind` report, in input order.
#[must_use]
pub fn report_rows<'a>(
    kind: &ReportKind,
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<ReportRow> {
    transactions
        .into_iter()
        .map(|t| ReportRow {
            date: t.timestamp().map_or_else(
                |_| MISSING_DATE.to_string(),
                |ts| ts.format(ROW_DATE_FORMAT).to_string(),
            ),
            kind: t.kind.to_string(),
            description: truncate(
                t.description.as_deref().unwrap_or_default(),
                kind.description_width(),
            ),
            amount: format_amount(t.amount),
            category: kind
                .includes_category()
                .then(|| t.category_or_na().to_string()),
        })
        .collect()
}

/// Everything a renderer needs to lay out one report.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Heading
    pub title: String,
    /// Generation line under the heading
    pub subtitle: String,
    /// Label/value lines above the table
    pub details: Vec<(&'static str, String)>,
    /// Column headers
    pub headers: Vec<&'static str>,
    /// Table rows
    pub rows: Vec<ReportRow>,
    /// Suggested output file name
    pub file_name: String,
}

/// Builds a complete report generated on `generated_on`.
#[must_use]
pub fn build_report<'a>(
    kind: &ReportKind,
    transactions: impl IntoIterator<Item = &'a Transaction>,
    generated_on: NaiveDate,
) -> Report {
    Report {
        title: kind.title(),
        subtitle: kind.subtitle(generated_on),
        details: kind.details(),
        headers: kind.headers(),
        rows: report_rows(kind, transactions),
        file_name: kind.file_name(generated_on),
    }
}
