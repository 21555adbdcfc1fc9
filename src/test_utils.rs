//! Shared test utilities for the ledger.
//!
//! Builders for transactions and reference records with sensible defaults, plus a
//! small populated store shaped like a real dashboard export.

use crate::{
    entities::{
        LinkField, Partner, Payment, PaymentMethod, Project, Transaction, TransactionType, Vendor,
        Worker,
    },
    store::Store,
};
use std::path::PathBuf;
use uuid::Uuid;

/// Unsaved credit with no date.
pub fn credit(amount: f64) -> Transaction {
    Transaction::new(TransactionType::Credit, amount)
}

/// Unsaved debit with no date.
pub fn debit(amount: f64) -> Transaction {
    Transaction::new(TransactionType::Debit, amount)
}

/// Unsaved loan with no date.
pub fn loan(amount: f64) -> Transaction {
    Transaction::new(TransactionType::Loan, amount)
}

/// Payment dated `date` with a bank-transfer method.
pub fn payment_on(amount: f64, date: &str) -> Payment {
    Payment {
        id: Uuid::new_v4().to_string(),
        amount,
        date: date.to_string(),
        method: PaymentMethod::BankTransfer,
        notes: None,
    }
}

/// Due with face value `original` and one payment per entry of `payments`.
///
/// # Defaults
/// * payment dates: consecutive days from `2024-01-01`
pub fn due_with_payments(original: f64, payments: &[f64]) -> Transaction {
    let mut due = Transaction::new_due(original);
    due.payments = payments
        .iter()
        .enumerate()
        .map(|(day, amount)| payment_on(*amount, &format!("2024-01-{:02}", day + 1)))
        .collect();
    due
}

/// Sets the stored date of `transaction`.
pub fn dated(transaction: Transaction, date: &str) -> Transaction {
    transaction.with_date(date)
}

/// Partner with a fixed id.
pub fn partner(id: &str, name: &str) -> Partner {
    Partner {
        id: id.to_string(),
        ..Partner::named(name)
    }
}

/// Project with a fixed id.
pub fn project(id: &str, name: &str) -> Project {
    Project {
        id: id.to_string(),
        ..Project::named(name)
    }
}

/// Vendor with a fixed id.
pub fn vendor(id: &str, name: &str) -> Vendor {
    Vendor {
        id: id.to_string(),
        ..Vendor::named(name)
    }
}

/// Worker with a fixed id.
pub fn worker(id: &str, name: &str) -> Worker {
    Worker {
        id: id.to_string(),
        ..Worker::named(name)
    }
}

/// A populated store with one of each entity and a handful of linked transactions.
pub fn sample_store() -> Store {
    let mut tower = project("pr1", "Residential Complex A");
    tower.status = Some("Active".to_string());
    tower.budget = Some(5_000_000.0);
    tower.start_date = Some("2024-01-01".to_string());

    let mut cement = due_with_payments(1000.0, &[400.0]);
    cement.id = "t3".to_string();

    Store {
        transactions: vec![
            Transaction {
                id: "t1".to_string(),
                ..dated(credit(250_000.0), "2024-01-15T10:00:00.000Z")
                    .with_description("Investment from John Smith")
                    .with_category("Partner Investment")
                    .linked_to(LinkField::Partner, "p1")
                    .linked_to(LinkField::Project, "pr1")
            },
            Transaction {
                id: "t2".to_string(),
                ..dated(debit(45_000.0), "2024-01-20")
                    .with_description("Steel rods")
                    .with_category("Raw Materials")
                    .linked_to(LinkField::Vendor, "v1")
                    .linked_to(LinkField::Project, "pr1")
            },
            dated(cement, "2024-02-01")
                .with_description("Cement supply")
                .linked_to(LinkField::Vendor, "v1"),
            Transaction {
                id: "t4".to_string(),
                ..dated(debit(1_500.0), "2024-02-03")
                    .with_description("Site labour")
                    .linked_to(LinkField::Worker, "w1")
                    .linked_to(LinkField::Project, "pr1")
            },
        ],
        projects: vec![tower],
        vendors: vec![vendor("v1", "Steel Suppliers India Ltd")],
        workers: vec![worker("w1", "Ramesh Kumar")],
        partners: vec![partner("p1", "John Smith")],
        ..Store::default()
    }
}

/// A fresh directory path under the system temp dir. Not created.
pub fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("site-ledger-{}", Uuid::new_v4()))
}
