//! Entity module - the records the ledger stores and serializes.
//! Transactions own their payment sub-ledger; reference entities are flat and are
//! only reached through a transaction's linkage fields.

pub mod reference;
pub mod transaction;

pub use reference::{AccountCategory, Partner, Project, Record, User, Vendor, Worker};
pub use transaction::{LinkField, Payment, PaymentMethod, Transaction, TransactionType};
