//! Ledger state container and its shared, single-writer handle.
//!
//! [`Store`] is the whole persisted shape of the dashboard: every domain collection
//! plus the current page. Mutators validate before they touch anything, so a failed
//! call leaves the store exactly as it was.
//!
//! [`SharedStore`] wraps a store in an `Arc<RwLock<_>>` so a multi-threaded host
//! still sees one mutation at a time. It also owns the file side of persistence:
//! loading the local state file, writing it back, and importing or exporting
//! backups. An import is read and parsed completely before the write lock is taken,
//! then swapped in with a single assignment.

use crate::{
    core::{
        dates,
        dues::{self, BALANCE_TOLERANCE, OverpaymentPolicy},
        snapshot,
    },
    entities::{
        AccountCategory, Partner, Payment, PaymentMethod, Project, Record, Transaction,
        TransactionType, User, Vendor, Worker,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

const DEFAULT_PAGE: &str = "dashboard";

fn default_page() -> String {
    DEFAULT_PAGE.to_string()
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Every domain collection of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// Page the dashboard was last showing
    #[serde(default = "default_page")]
    pub current_page: String,
    /// Transactions, newest insert first
    pub transactions: Vec<Transaction>,
    /// Projects
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Vendors
    #[serde(default)]
    pub vendors: Vec<Vendor>,
    /// Workers
    #[serde(default)]
    pub workers: Vec<Worker>,
    /// Partners
    #[serde(default)]
    pub partners: Vec<Partner>,
    /// Account categories
    #[serde(default)]
    pub account_categories: Vec<AccountCategory>,
    /// Users
    #[serde(default)]
    pub users: Vec<User>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            current_page: default_page(),
            transactions: Vec::new(),
            projects: Vec::new(),
            vendors: Vec::new(),
            workers: Vec::new(),
            partners: Vec::new(),
            account_categories: Vec::new(),
            users: Vec::new(),
        }
    }
}

/// Input for recording a payment against a due.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    /// Amount paid
    pub amount: f64,
    /// ISO date; today when `None` or blank
    pub date: Option<String>,
    /// Payment method
    pub method: PaymentMethod,
    /// Optional notes
    pub notes: Option<String>,
}

impl NewPayment {
    /// A bank-transfer payment made today.
    #[must_use]
    pub fn new(amount: f64) -> Self {
        Self {
            amount,
            date: None,
            method: PaymentMethod::default(),
            notes: None,
        }
    }

    /// Sets the payment date.
    #[must_use]
    pub fn on(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Sets the payment method.
    #[must_use]
    pub fn by(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

fn validate_kind(kind: &TransactionType) -> Result<()> {
    match kind {
        TransactionType::Other(label) => Err(Error::UnknownType {
            label: label.clone(),
        }),
        _ => Ok(()),
    }
}

fn validate_due_amount(transaction: &Transaction) -> Result<()> {
    let original = transaction
        .original_due_amount
        .ok_or(Error::MissingDueAmount)?;
    validate_amount(original)
}

fn validate_transaction(transaction: &Transaction) -> Result<()> {
    validate_amount(transaction.amount)?;
    validate_kind(&transaction.kind)?;
    if transaction.is_due() {
        validate_due_amount(transaction)?;
    }
    for payment in &transaction.payments {
        validate_amount(payment.amount)?;
    }
    Ok(())
}

/// Checks only what an edit touched, so records imported with legacy gaps stay editable.
fn validate_changes(current: &Transaction, updated: &Transaction) -> Result<()> {
    if updated.amount.to_bits() != current.amount.to_bits() {
        validate_amount(updated.amount)?;
    }
    let kind_changed = updated.kind != current.kind;
    if kind_changed {
        validate_kind(&updated.kind)?;
    }
    let original_changed = updated.original_due_amount.map(f64::to_bits)
        != current.original_due_amount.map(f64::to_bits);
    if updated.is_due() && (kind_changed || original_changed) {
        validate_due_amount(updated)?;
    }
    for (index, payment) in updated.payments.iter().enumerate() {
        if current.payments.get(index) != Some(payment) {
            validate_amount(payment.amount)?;
        }
    }
    if updated.date != current.date {
        dates::parse_timestamp(&updated.date)?;
    }
    Ok(())
}

fn insert_record<T: Record>(records: &mut Vec<T>, mut record: T) -> String {
    if record.id().trim().is_empty() {
        record.set_id(new_id());
    }
    let id = record.id().to_string();
    debug!(kind = T::KIND, %id, "Adding record");
    records.push(record);
    id
}

fn update_record<'a, T: Record>(
    records: &'a mut [T],
    id: &str,
    update: impl FnOnce(&mut T),
) -> Result<&'a T> {
    let record = records
        .iter_mut()
        .find(|r| r.id() == id)
        .ok_or_else(|| Error::EntityNotFound {
            kind: T::KIND,
            id: id.to_string(),
        })?;
    update(record);
    record.set_id(id.to_string());
    Ok(&*record)
}

fn delete_record<T: Record>(records: &mut Vec<T>, id: &str) -> Result<T> {
    let index = records
        .iter()
        .position(|r| r.id() == id)
        .ok_or_else(|| Error::EntityNotFound {
            kind: T::KIND,
            id: id.to_string(),
        })?;
    debug!(kind = T::KIND, %id, "Deleting record");
    Ok(records.remove(index))
}

fn find_record<'a, T: Record>(records: &'a [T], id: &str) -> Option<&'a T> {
    records.iter().find(|r| r.id() == id)
}

impl Store {
    /// Looks up a transaction by id.
    #[must_use]
    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    fn transaction_index(&self, id: &str) -> Result<usize> {
        self.transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::TransactionNotFound { id: id.to_string() })
    }

    /// Validates and inserts a transaction at the front of the list.
    ///
    /// An empty id is replaced with a fresh UUID and an empty date with the current
    /// time. Returns the id.
    ///
    /// # Errors
    /// - [`Error::InvalidAmount`] for a negative or non-finite amount
    /// - [`Error::UnknownType`] for a type outside Credit/Debit/Due/Loan
    /// - [`Error::MissingDueAmount`] for a due without a face value
    /// - [`Error::InvalidDate`] for a date that cannot be parsed
    pub fn add_transaction(&mut self, mut transaction: Transaction) -> Result<String> {
        transaction.normalize();
        validate_transaction(&transaction)?;

        if transaction.date.trim().is_empty() {
            transaction.date = dates::now_timestamp();
        } else {
            dates::parse_timestamp(&transaction.date)?;
        }
        if transaction.id.trim().is_empty() {
            transaction.id = new_id();
        }

        let id = transaction.id.clone();
        info!(%id, kind = %transaction.kind, amount = transaction.amount, "Adding transaction");
        self.transactions.insert(0, transaction);
        Ok(id)
    }

    /// Applies `update` to a copy of the transaction and commits it if the fields it
    /// changed validate. The id cannot be changed.
    ///
    /// Untouched fields are not re-checked, so an imported due without a face value
    /// or a record with a foreign type label can still have its description edited.
    ///
    /// # Errors
    /// [`Error::TransactionNotFound`], or the validation error from
    /// [`Store::add_transaction`] for a changed field. A changed date must parse.
    pub fn update_transaction(
        &mut self,
        id: &str,
        update: impl FnOnce(&mut Transaction),
    ) -> Result<&Transaction> {
        let index = self.transaction_index(id)?;
        let current = &self.transactions[index];

        let mut updated = current.clone();
        update(&mut updated);
        updated.id = id.to_string();
        updated.normalize();

        validate_changes(current, &updated)?;

        debug!(%id, "Updating transaction");
        self.transactions[index] = updated;
        Ok(&self.transactions[index])
    }

    /// Removes a transaction together with its payments.
    ///
    /// # Errors
    /// [`Error::TransactionNotFound`] when no transaction has `id`.
    pub fn delete_transaction(&mut self, id: &str) -> Result<Transaction> {
        let index = self.transaction_index(id)?;
        info!(%id, "Deleting transaction");
        Ok(self.transactions.remove(index))
    }

    /// Appends a payment to a due and returns the new payment's id.
    ///
    /// Under [`OverpaymentPolicy::Allow`] a payment larger than the remaining balance
    /// is recorded with a warning; under [`OverpaymentPolicy::Reject`] it is refused.
    ///
    /// # Errors
    /// - [`Error::InvalidAmount`] for a negative or non-finite amount
    /// - [`Error::InvalidDate`] for a date that cannot be parsed
    /// - [`Error::TransactionNotFound`] / [`Error::NotADue`] for a bad target
    /// - [`Error::Overpayment`] when rejected by policy
    pub fn add_payment_to_due(
        &mut self,
        due_id: &str,
        payment: NewPayment,
        policy: OverpaymentPolicy,
    ) -> Result<String> {
        validate_amount(payment.amount)?;
        let date = match payment.date {
            Some(date) if !date.trim().is_empty() => {
                dates::parse_timestamp(&date)?;
                date
            }
            _ => dates::today(),
        };

        let index = self.transaction_index(due_id)?;
        let due = &mut self.transactions[index];
        if !due.is_due() {
            return Err(Error::NotADue {
                id: due_id.to_string(),
            });
        }

        let remaining = dues::remaining_amount(due);
        if payment.amount > remaining + BALANCE_TOLERANCE {
            match policy {
                OverpaymentPolicy::Reject => {
                    return Err(Error::Overpayment {
                        remaining,
                        attempted: payment.amount,
                    });
                }
                OverpaymentPolicy::Allow => warn!(
                    %due_id,
                    remaining,
                    attempted = payment.amount,
                    "Recording payment larger than remaining balance"
                ),
            }
        }

        let id = new_id();
        due.payments.push(Payment {
            id: id.clone(),
            amount: payment.amount,
            date,
            method: payment.method.normalized(),
            notes: payment.notes,
        });
        info!(%due_id, payment_id = %id, amount = payment.amount, "Recorded payment");
        Ok(id)
    }

    /// Looks up a project by id.
    #[must_use]
    pub fn project(&self, id: &str) -> Option<&Project> {
        find_record(&self.projects, id)
    }

    /// Appends a project, assigning an id when empty. Returns the id.
    pub fn add_project(&mut self, project: Project) -> String {
        insert_record(&mut self.projects, project)
    }

    /// Edits a project in place. The id cannot be changed.
    ///
    /// # Errors
    /// [`Error::EntityNotFound`] when no project has `id`.
    pub fn update_project(&mut self, id: &str, update: impl FnOnce(&mut Project)) -> Result<&Project> {
        update_record(&mut self.projects, id, update)
    }

    /// Removes a project. Transactions linked to it keep their (now dangling) id.
    ///
    /// # Errors
    /// [`Error::EntityNotFound`] when no project has `id`.
    pub fn delete_project(&mut self, id: &str) -> Result<Project> {
        delete_record(&mut self.projects, id)
    }

    /// Looks up a vendor by id.
    #[must_use]
    pub fn vendor(&self, id: &str) -> Option<&Vendor> {
        find_record(&self.vendors, id)
    }

    /// Appends a vendor, assigning an id when empty. Returns the id.
    pub fn add_vendor(&mut self, vendor: Vendor) -> String {
        insert_record(&mut self.vendors, vendor)
    }

    /// Edits a vendor in place. The id cannot be changed.
    ///
    /// # Errors
    /// [`Error::EntityNotFound`] when no vendor has `id`.
    pub fn update_vendor(&mut self, id: &str, update: impl FnOnce(&mut Vendor)) -> Result<&Vendor> {
        update_record(&mut self.vendors, id, update)
    }

    /// Removes a vendor.
    ///
    /// # Errors
    /// [`Error::EntityNotFound`] when no vendor has `id`.
    pub fn delete_vendor(&mut self, id: &str) -> Result<Vendor> {
        delete_record(&mut self.vendors, id)
    }

    /// Looks up a worker by id.
    #[must_use]
    pub fn worker(&self, id: &str) -> Option<&Worker> {
        find_record(&self.workers, id)
    }

    /// Appends a worker, assigning an id when empty. Returns the id.
    pub fn add_worker(&mut self, worker: Worker) -> String {
        insert_record(&mut self.workers, worker)
    }

    /// Edits a worker in place. The id cannot be changed.
    ///
    /// # Errors
    /// [`Error::EntityNotFound`] when no worker has `id`.
    pub fn update_worker(&mut self, id: &str, update: impl FnOnce(&mut Worker)) -> Result<&Worker> {
        update_record(&mut self.workers, id, update)
    }

    /// Removes a worker.
    ///
    /// # Errors
    /// [`Error::EntityNotFound`] when no worker has `id`.
    pub fn delete_worker(&mut self, id: &str) -> Result<Worker> {
        delete_record(&mut self.workers, id)
    }

    /// Looks up a partner by id.
    #[must_use]
    pub fn partner(&self, id: &str) -> Option<&Partner> {
        find_record(&self.partners, id)
    }

    /// Appends a partner, assigning an id when empty. Returns the id.
    pub fn add_partner(&mut self, partner: Partner) -> String {
        insert_record(&mut self.partners, partner)
    }

    /// Edits a partner in place. The id cannot be changed.
    ///
    /// # Errors
    /// [`Error::EntityNotFound`] when no partner has `id`.
    pub fn update_partner(&mut self, id: &str, update: impl FnOnce(&mut Partner)) -> Result<&Partner> {
        update_record(&mut self.partners, id, update)
    }

    /// Removes a partner.
    ///
    /// # Errors
    /// [`Error::EntityNotFound`] when no partner has `id`.
    pub fn delete_partner(&mut self, id: &str) -> Result<Partner> {
        delete_record(&mut self.partners, id)
    }
}

/// Shared handle to a [`Store`]. Clones point at the same state.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<Store>>,
}

impl SharedStore {
    /// Wraps an existing store.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Loads the persisted state file, or starts empty when it does not exist yet.
    ///
    /// # Errors
    /// [`Error::Io`] when the file exists but cannot be read, and
    /// [`Error::MalformedImport`] when its contents are not a valid snapshot.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading ledger state from {:?}", path);
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(Self::new(snapshot::import_snapshot(&contents)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No ledger state at {:?}; starting empty", path);
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read access to the current state.
    pub async fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.inner.read().await
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> Store {
        self.inner.read().await.clone()
    }

    /// Runs one mutation under the write lock.
    ///
    /// # Errors
    /// Whatever `mutation` returns.
    pub async fn mutate<T>(&self, mutation: impl FnOnce(&mut Store) -> Result<T>) -> Result<T> {
        let mut store = self.inner.write().await;
        mutation(&mut store)
    }

    /// Replaces the whole state at once.
    pub async fn replace(&self, store: Store) {
        *self.inner.write().await = store;
    }

    /// Writes the current state to `path`, creating parent directories as needed.
    ///
    /// # Errors
    /// [`Error::Io`] or [`Error::Json`] on failure.
    pub async fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let document = snapshot::export_snapshot(&*self.read().await)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, document).await?;
        info!("Persisted ledger state to {:?}", path);
        Ok(())
    }

    /// Restores the state from a backup file.
    ///
    /// The file is read and parsed before anything is replaced; on any error the
    /// current state is untouched.
    ///
    /// # Errors
    /// [`Error::Io`] when the file cannot be read, [`Error::MalformedImport`] when
    /// it is not a valid snapshot.
    pub async fn import_from_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let imported = snapshot::import_snapshot(&contents)?;
        self.replace(imported).await;
        info!("Restored ledger state from {:?}", path);
        Ok(())
    }

    /// Writes a backup named `finance_tracker_backup_<date>.json` into `dir`.
    ///
    /// # Errors
    /// [`Error::Io`] or [`Error::Json`] on failure.
    pub async fn export_to_file(&self, dir: impl AsRef<Path>, date: NaiveDate) -> Result<PathBuf> {
        let path = dir.as_ref().join(snapshot::backup_file_name(date));
        self.persist(&path).await?;
        Ok(path)
    }
}
