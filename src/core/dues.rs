//! Dues business logic - balances and status for transactions settled over time.
//!
//! A due carries a face value (`originalDueAmount`) and an append-only list of
//! payments. Everything here is derived from those two fields: nothing is cached on
//! the transaction, so the figures are always consistent with its payment list.
//! Overpayment is representable. The remaining balance simply goes negative and the
//! status stays "Partially Paid".

use crate::entities::{Payment, Transaction};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// Absolute tolerance used when deciding that a remaining balance is settled.
pub const BALANCE_TOLERANCE: f64 = 1e-6;

/// Settlement status of a due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DueStatus {
    /// Nothing has been paid
    #[serde(rename = "Pending")]
    Pending,
    /// Something has been paid and a balance remains (or was overpaid)
    #[serde(rename = "Partially Paid")]
    PartiallyPaid,
    /// The remaining balance is zero
    #[serde(rename = "Fully Paid")]
    FullyPaid,
}

impl DueStatus {
    /// Display label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::PartiallyPaid => "Partially Paid",
            Self::FullyPaid => "Fully Paid",
        }
    }
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when a payment exceeds the remaining balance of a due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverpaymentPolicy {
    /// Record the payment and log a warning
    #[default]
    Allow,
    /// Refuse the payment with [`crate::errors::Error::Overpayment`]
    Reject,
}

impl OverpaymentPolicy {
    /// Maps the `allow_overpayment` configuration flag to a policy.
    #[must_use]
    pub const fn from_flag(allow_overpayment: bool) -> Self {
        if allow_overpayment {
            Self::Allow
        } else {
            Self::Reject
        }
    }
}

/// Sum of all payments recorded against `due`. Zero when there are none.
#[must_use]
pub fn paid_amount(due: &Transaction) -> f64 {
    due.payments.iter().map(Payment::effective_amount).sum()
}

/// Face value minus payments. Negative when overpaid.
#[must_use]
pub fn remaining_amount(due: &Transaction) -> f64 {
    original_amount(due) - paid_amount(due)
}

/// Face value of `due`, zero when it was never set.
#[must_use]
pub fn original_amount(due: &Transaction) -> f64 {
    due.original_due_amount
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}

/// Derives the settlement status.
///
/// Pending when nothing was paid, even for a zero face value; Fully Paid when the
/// remaining balance is zero; Partially Paid otherwise.
#[must_use]
pub fn status(due: &Transaction) -> DueStatus {
    let paid = paid_amount(due);
    if paid == 0.0 {
        DueStatus::Pending
    } else if (original_amount(due) - paid).abs() <= BALANCE_TOLERANCE {
        DueStatus::FullyPaid
    } else {
        DueStatus::PartiallyPaid
    }
}

/// Percentage of the face value paid so far. Zero when the face value is not positive.
#[must_use]
pub fn progress_percent(due: &Transaction) -> f64 {
    let original = original_amount(due);
    if original > 0.0 {
        (paid_amount(due) / original) * 100.0
    } else {
        0.0
    }
}

/// All due-typed transactions, in store order.
pub fn dues<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Vec<&'a Transaction> {
    transactions.into_iter().filter(|t| t.is_due()).collect()
}

/// Totals across every due, as shown on the dues summary cards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DuesOverview {
    /// Sum of face values
    pub total_due: f64,
    /// Sum of payments
    pub total_paid: f64,
    /// `total_due - total_paid`
    pub total_remaining: f64,
    /// Number of pending dues
    pub pending: usize,
    /// Number of partially paid dues
    pub partially_paid: usize,
    /// Number of fully paid dues
    pub fully_paid: usize,
}

/// Builds the dues summary over every due in `transactions`.
pub fn dues_overview<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> DuesOverview {
    let mut overview = DuesOverview::default();
    for due in dues(transactions) {
        overview.total_due += original_amount(due);
        overview.total_paid += paid_amount(due);
        match status(due) {
            DueStatus::Pending => overview.pending += 1,
            DueStatus::PartiallyPaid => overview.partially_paid += 1,
            DueStatus::FullyPaid => overview.fully_paid += 1,
        }
    }
    overview.total_remaining = overview.total_due - overview.total_paid;
    overview
}

/// A payment flattened out of its due for the payment history listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentHistoryEntry<'a> {
    /// Id of the due the payment settles
    pub due_id: &'a str,
    /// Description of that due
    pub description: Option<&'a str>,
    /// Current status of that due
    pub status: DueStatus,
    /// The payment itself
    pub payment: &'a Payment,
}

/// Every payment of every due, newest payment date first.
///
/// Payments whose date cannot be parsed sort last; ties keep store order.
pub fn payment_history<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<PaymentHistoryEntry<'a>> {
    let mut keyed: Vec<(Option<NaiveDateTime>, PaymentHistoryEntry<'a>)> = dues(transactions)
        .into_iter()
        .flat_map(|due| {
            let due_status = status(due);
            due.payments.iter().map(move |payment| {
                (
                    super::dates::parse_timestamp(&payment.date).ok(),
                    PaymentHistoryEntry {
                        due_id: &due.id,
                        description: due.description.as_deref(),
                        status: due_status,
                        payment,
                    },
                )
            })
        })
        .collect();

    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    keyed.into_iter().map(|(_, entry)| entry).collect()
}

/// Everything the due detail view shows for one due.
#[derive(Debug, Clone, PartialEq)]
pub struct DueDetail<'a> {
    /// The due
    pub due: &'a Transaction,
    /// Face value
    pub original: f64,
    /// Paid so far
    pub paid: f64,
    /// Remaining balance
    pub remaining: f64,
    /// Settlement status
    pub status: DueStatus,
    /// Paid percentage
    pub progress_percent: f64,
    /// Payments, most recently recorded first
    pub payments: Vec<&'a Payment>,
}

impl<'a> DueDetail<'a> {
    /// Computes the detail view for `due`.
    #[must_use]
    pub fn of(due: &'a Transaction) -> Self {
        let paid = paid_amount(due);
        let original = original_amount(due);
        Self {
            due,
            original,
            paid,
            remaining: original - paid,
            status: status(due),
            progress_percent: progress_percent(due),
            payments: due.payments.iter().rev().collect(),
        }
    }
}
