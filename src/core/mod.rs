/// Cash-flow totals, calendar-day groups, and per-entity rollups
pub mod aggregate;

/// Parsing of stored ISO 8601 dates
pub mod dates;

/// Due balances, settlement status, and payment history
pub mod dues;

/// Transaction filtering for the transactions table
pub mod filter;

/// Display formatting and tabular report data
pub mod report;

/// Whole-state JSON export and import
pub mod snapshot;
