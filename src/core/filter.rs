//! Transaction filtering for the transactions table.
//!
//! A filter is a set of optional constraints combined with AND. An unset or empty
//! constraint matches everything, so adding a constraint can only shrink the result.

use crate::entities::{LinkField, Transaction, TransactionType};
use crate::errors::Result;
use chrono::NaiveDate;

/// Optional constraints applied to a transaction list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Exact transaction type
    pub kind: Option<TransactionType>,
    /// Linked partner id
    pub partner_id: Option<String>,
    /// Linked project id
    pub project_id: Option<String>,
    /// Linked vendor id
    pub vendor_id: Option<String>,
    /// Linked worker id
    pub worker_id: Option<String>,
    /// Case-insensitive text searched in description and category, matched as typed
    pub search: Option<String>,
    /// First day included
    pub date_from: Option<NaiveDate>,
    /// Last day included
    pub date_to: Option<NaiveDate>,
}

impl TransactionFilter {
    /// An unconstrained filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one transaction type.
    #[must_use]
    pub fn with_type(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts to transactions linked to entity `id`.
    #[must_use]
    pub fn with_link(mut self, link: LinkField, id: impl Into<String>) -> Self {
        let id = Some(id.into());
        match link {
            LinkField::Partner => self.partner_id = id,
            LinkField::Project => self.project_id = id,
            LinkField::Vendor => self.vendor_id = id,
            LinkField::Worker => self.worker_id = id,
        }
        self
    }

    /// Restricts to transactions whose description or category contains `term`.
    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Restricts to transactions on or after `day`.
    #[must_use]
    pub const fn from_date(mut self, day: NaiveDate) -> Self {
        self.date_from = Some(day);
        self
    }

    /// Restricts to transactions on or before `day`.
    #[must_use]
    pub const fn to_date(mut self, day: NaiveDate) -> Self {
        self.date_to = Some(day);
        self
    }

    /// Parses a `YYYY-MM-DD` bound as typed into a date input.
    ///
    /// # Errors
    /// Returns [`crate::errors::Error::InvalidDate`] for any other shape.
    pub fn parse_date(value: &str) -> Result<NaiveDate> {
        super::dates::parse_day(value)
    }

    /// Removes every constraint.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether no constraint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && [LinkField::Partner, LinkField::Project, LinkField::Vendor, LinkField::Worker]
                .into_iter()
                .all(|link| self.link_id(link).is_none())
            && self.search_term().is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }

    fn link_id(&self, link: LinkField) -> Option<&str> {
        let id = match link {
            LinkField::Partner => &self.partner_id,
            LinkField::Project => &self.project_id,
            LinkField::Vendor => &self.vendor_id,
            LinkField::Worker => &self.worker_id,
        };
        id.as_deref().filter(|id| !id.is_empty())
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether `transaction` satisfies every set constraint.
    #[must_use]
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.matches_with_term(transaction, self.search_term().as_deref())
    }

    fn matches_with_term(&self, transaction: &Transaction, term: Option<&str>) -> bool {
        if self.kind.as_ref().is_some_and(|kind| &transaction.kind != kind) {
            return false;
        }

        for link in [LinkField::Partner, LinkField::Project, LinkField::Vendor, LinkField::Worker] {
            if let Some(id) = self.link_id(link) {
                if !transaction.is_linked_to(link, id) {
                    return false;
                }
            }
        }

        if let Some(term) = term {
            let haystack = format!(
                "{} {}",
                transaction.description.as_deref().unwrap_or_default(),
                transaction.category.as_deref().unwrap_or_default()
            )
            .to_lowercase();
            if !haystack.contains(term) {
                return false;
            }
        }

        if self.date_from.is_some() || self.date_to.is_some() {
            let Ok(day) = transaction.calendar_day() else {
                return false;
            };
            if self.date_from.is_some_and(|from| day < from)
                || self.date_to.is_some_and(|to| day > to)
            {
                return false;
            }
        }

        true
    }

    /// Keeps the matching transactions, in input order.
    #[must_use]
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        let term = self.search_term();
        transactions
            .iter()
            .filter(|t| self.matches_with_term(t, term.as_deref()))
            .collect()
    }
}
