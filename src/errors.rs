//! Unified error types for the ledger.
//!
//! Validation failures carry the offending value so callers can surface it
//! directly. Import failures are reported as [`Error::MalformedImport`] and never
//! leave a store half-replaced.

use thiserror::Error;

/// Everything that can go wrong in the ledger.
#[derive(Debug, Error)]
pub enum Error {
    /// config.toml could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A snapshot document was not valid JSON or had the wrong shape
    #[error("Malformed import document: {message}")]
    MalformedImport {
        /// What went wrong
        message: String,
    },

    /// A date string matched none of the accepted formats
    #[error("Invalid date: {value:?}")]
    InvalidDate {
        /// The rejected text
        value: String,
    },

    /// An amount was negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A transaction type outside Credit, Debit, Due, and Loan
    #[error("Unknown transaction type: {label:?}")]
    UnknownType {
        /// The rejected label
        label: String,
    },

    /// A due was added without a face value
    #[error("Due transaction is missing its original due amount")]
    MissingDueAmount,

    /// A payment targeted a transaction that is not a due
    #[error("Transaction {id} is not a due")]
    NotADue {
        /// Id of the targeted transaction
        id: String,
    },

    /// A payment exceeded the remaining balance under a rejecting policy
    #[error("Payment of {attempted:.2} exceeds remaining balance of {remaining:.2}")]
    Overpayment {
        /// Balance left on the due
        remaining: f64,
        /// Amount of the refused payment
        attempted: f64,
    },

    /// No transaction has the given id
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// The missing id
        id: String,
    },

    /// No reference record of `kind` has the given id
    #[error("{kind} not found: {id}")]
    EntityNotFound {
        /// Entity kind, e.g. `Vendor`
        kind: &'static str,
        /// The missing id
        id: String,
    },

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
