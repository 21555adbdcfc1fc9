//! Transaction entity - Represents every financial event tracked by the ledger.
//!
//! Records arrive from two places: explicit inserts through the store, and whole
//! snapshots read back from disk. Snapshot ingestion is lenient. Type and method
//! labels are matched case-insensitively, numeric strings are accepted for amounts,
//! and the legacy `partnerId`/`projectId`/`vendorId`/`workerId` keys are folded into
//! the canonical `linked*` fields. Keys the model does not know are kept in `extra`
//! and written back unchanged on export.

use crate::errors::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Placeholder shown for missing description or category text.
pub const NOT_AVAILABLE: &str = "N/A";

/// Kind of a transaction. Determines which aggregation bucket its amount lands in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    /// Money received
    Credit,
    /// Money paid out
    Debit,
    /// Money owed, settled through a payment sub-ledger
    Due,
    /// Borrowed money
    Loan,
    /// A label from foreign data that matches none of the known kinds
    Other(String),
}

impl TransactionType {
    /// The four kinds that aggregation recognizes, in display order.
    pub const KNOWN: [Self; 4] = [Self::Credit, Self::Debit, Self::Due, Self::Loan];

    /// Parses a label case-insensitively. Unknown labels are preserved verbatim.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "credit" => Self::Credit,
            "debit" => Self::Debit,
            "due" => Self::Due,
            "loan" => Self::Loan,
            _ => Self::Other(label.to_string()),
        }
    }

    /// Canonical label, or the raw label for [`TransactionType::Other`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Credit => "Credit",
            Self::Debit => "Debit",
            Self::Due => "Due",
            Self::Loan => "Loan",
            Self::Other(label) => label,
        }
    }

    /// Whether this is one of the four recognized kinds.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Re-parses an [`TransactionType::Other`] label so it reads back the same after export.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Other(label) => Self::parse(&label),
            known => known,
        }
    }
}

impl From<String> for TransactionType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<TransactionType> for String {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a payment against a due was made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    /// Bank transfer (the form default)
    #[default]
    BankTransfer,
    /// Paper check
    Check,
    /// Credit card
    CreditCard,
    /// Cash
    Cash,
    /// Wire transfer
    WireTransfer,
    /// Any other method label
    Other(String),
}

impl PaymentMethod {
    /// Parses a label case-insensitively, ignoring surrounding whitespace.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "bank transfer" => Self::BankTransfer,
            "check" => Self::Check,
            "credit card" => Self::CreditCard,
            "cash" => Self::Cash,
            "wire transfer" => Self::WireTransfer,
            _ => Self::Other(label.to_string()),
        }
    }

    /// Display label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::BankTransfer => "Bank Transfer",
            Self::Check => "Check",
            Self::CreditCard => "Credit Card",
            Self::Cash => "Cash",
            Self::WireTransfer => "Wire Transfer",
            Self::Other(label) => label,
        }
    }

    /// Re-parses an [`PaymentMethod::Other`] label so it reads back the same after export.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Other(label) => Self::parse(&label),
            known => known,
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<PaymentMethod> for String {
    fn from(value: PaymentMethod) -> Self {
        match value {
            PaymentMethod::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One payment recorded against a due. Owned by its parent transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Identifier, unique within the parent's payment list
    #[serde(default)]
    pub id: String,
    /// Amount paid
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    /// ISO date the payment was made
    #[serde(default)]
    pub date: String,
    /// Payment method
    #[serde(default)]
    pub method: PaymentMethod,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Payment {
    /// The amount, with non-finite values counted as zero.
    #[must_use]
    pub const fn effective_amount(&self) -> f64 {
        finite_or_zero(self.amount)
    }
}

/// Which reference entity a linkage field points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkField {
    /// `linkedPartner`
    Partner,
    /// `linkedProject`
    Project,
    /// `linkedVendor`
    Vendor,
    /// `linkedWorker`
    Worker,
}

impl LinkField {
    /// Human-readable entity kind, as used in report titles.
    #[must_use]
    pub const fn entity_kind(self) -> &'static str {
        match self {
            Self::Partner => "Partner",
            Self::Project => "Project",
            Self::Vendor => "Vendor",
            Self::Worker => "Worker",
        }
    }
}

/// A financial event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawTransaction")]
pub struct Transaction {
    /// Unique identifier, assigned on insert when empty
    pub id: String,
    /// ISO 8601 timestamp, kept exactly as supplied
    pub date: String,
    /// Kind of transaction
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Amount of the transaction
    pub amount: f64,
    /// Free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Account category name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Display-only flow of parties, e.g. `"Partner → Project → Vendor"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<String>,
    /// Linked partner id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_partner: Option<String>,
    /// Linked project id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_project: Option<String>,
    /// Linked vendor id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_vendor: Option<String>,
    /// Linked worker id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_worker: Option<String>,
    /// Face value owed (dues only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_due_amount: Option<f64>,
    /// When the due is expected to be settled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Payment sub-ledger (dues only), oldest first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub payments: Vec<Payment>,
    /// Keys not modelled above, preserved for export
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Transaction {
    /// Creates an unsaved transaction. Id and date are filled in on insert.
    #[must_use]
    pub fn new(kind: TransactionType, amount: f64) -> Self {
        Self {
            id: String::new(),
            date: String::new(),
            kind,
            amount,
            description: None,
            category: None,
            entities: None,
            linked_partner: None,
            linked_project: None,
            linked_vendor: None,
            linked_worker: None,
            original_due_amount: None,
            due_date: None,
            payments: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Creates an unsaved due whose amount and face value are `original_amount`.
    #[must_use]
    pub fn new_due(original_amount: f64) -> Self {
        Self {
            original_due_amount: Some(original_amount),
            ..Self::new(TransactionType::Due, original_amount)
        }
    }

    /// Sets the date.
    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Links the transaction to a reference entity.
    #[must_use]
    pub fn linked_to(mut self, link: LinkField, id: impl Into<String>) -> Self {
        self.set_link(link, Some(id.into()));
        self
    }

    /// Reads a linkage field.
    #[must_use]
    pub fn linked(&self, link: LinkField) -> Option<&str> {
        match link {
            LinkField::Partner => self.linked_partner.as_deref(),
            LinkField::Project => self.linked_project.as_deref(),
            LinkField::Vendor => self.linked_vendor.as_deref(),
            LinkField::Worker => self.linked_worker.as_deref(),
        }
    }

    /// Replaces a linkage field. A blank id clears the link.
    pub fn set_link(&mut self, link: LinkField, id: Option<String>) {
        let slot = match link {
            LinkField::Partner => &mut self.linked_partner,
            LinkField::Project => &mut self.linked_project,
            LinkField::Vendor => &mut self.linked_vendor,
            LinkField::Worker => &mut self.linked_worker,
        };
        *slot = non_empty(id);
    }

    /// Brings a hand-built transaction into the shape ingestion produces: blank links
    /// become unset, and type and payment method labels are re-parsed.
    pub fn normalize(&mut self) {
        for slot in [
            &mut self.linked_partner,
            &mut self.linked_project,
            &mut self.linked_vendor,
            &mut self.linked_worker,
        ] {
            *slot = non_empty(slot.take());
        }
        self.kind = self.kind.clone().normalized();
        for payment in &mut self.payments {
            payment.method = std::mem::take(&mut payment.method).normalized();
        }
    }

    /// Whether the transaction is linked to the entity with `id`.
    #[must_use]
    pub fn is_linked_to(&self, link: LinkField, id: &str) -> bool {
        self.linked(link) == Some(id)
    }

    /// Whether this transaction is a due.
    #[must_use]
    pub fn is_due(&self) -> bool {
        self.kind == TransactionType::Due
    }

    /// The amount, with non-finite values counted as zero.
    #[must_use]
    pub const fn effective_amount(&self) -> f64 {
        finite_or_zero(self.amount)
    }

    /// Parses the stored date.
    pub fn timestamp(&self) -> Result<NaiveDateTime> {
        crate::core::dates::parse_timestamp(&self.date)
    }

    /// The calendar day the transaction falls on, as written in its timestamp.
    pub fn calendar_day(&self) -> Result<NaiveDate> {
        self.timestamp().map(|ts| ts.date())
    }

    /// Description, or `"N/A"`.
    #[must_use]
    pub fn description_or_na(&self) -> &str {
        self.description.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    /// Category, or `"N/A"`.
    #[must_use]
    pub fn category_or_na(&self) -> &str {
        self.category.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    /// Parties named in the entity flow string, split on `→`.
    #[must_use]
    pub fn flow_parties(&self) -> Vec<&str> {
        self.entities
            .as_deref()
            .map(|flow| {
                flow.split('→')
                    .map(str::trim)
                    .filter(|party| !party.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Wire shape accepted on ingestion, including the legacy linkage aliases.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    #[serde(default)]
    id: String,
    #[serde(default)]
    date: String,
    #[serde(rename = "type", default)]
    kind: Option<TransactionType>,
    #[serde(default, deserialize_with = "lenient_amount")]
    amount: f64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    entities: Option<String>,
    #[serde(default)]
    linked_partner: Option<String>,
    #[serde(default)]
    linked_project: Option<String>,
    #[serde(default)]
    linked_vendor: Option<String>,
    #[serde(default)]
    linked_worker: Option<String>,
    #[serde(default)]
    partner_id: Option<String>,
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    vendor_id: Option<String>,
    #[serde(default)]
    worker_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_amount")]
    original_due_amount: Option<f64>,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    payments: Option<Vec<Payment>>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawTransaction> for Transaction {
    fn from(raw: RawTransaction) -> Self {
        Self {
            id: raw.id,
            date: raw.date,
            kind: raw
                .kind
                .unwrap_or_else(|| TransactionType::Other(String::new())),
            amount: raw.amount,
            description: raw.description,
            category: raw.category,
            entities: raw.entities,
            linked_partner: non_empty(raw.linked_partner).or_else(|| non_empty(raw.partner_id)),
            linked_project: non_empty(raw.linked_project).or_else(|| non_empty(raw.project_id)),
            linked_vendor: non_empty(raw.linked_vendor).or_else(|| non_empty(raw.vendor_id)),
            linked_worker: non_empty(raw.linked_worker).or_else(|| non_empty(raw.worker_id)),
            original_due_amount: raw.original_due_amount,
            due_date: raw.due_date,
            payments: raw.payments.unwrap_or_default(),
            extra: raw.extra,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) const fn finite_or_zero(amount: f64) -> f64 {
    if amount.is_finite() { amount } else { 0.0 }
}

/// Coerces a JSON value to an amount: numbers pass through, numeric strings are
/// parsed, everything else is zero.
pub(crate) fn coerce_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount.filter(|amount| amount.is_finite())
}

pub(crate) fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_amount).unwrap_or(0.0))
}

pub(crate) fn lenient_optional_amount<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_amount))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_labels_are_case_insensitive() {
        assert_eq!(TransactionType::parse("credit"), TransactionType::Credit);
        assert_eq!(TransactionType::parse("DEBIT"), TransactionType::Debit);
        assert_eq!(TransactionType::parse(" Due "), TransactionType::Due);
        assert_eq!(
            TransactionType::parse("Income"),
            TransactionType::Other("Income".to_string())
        );
        assert!(!TransactionType::parse("Income").is_known());
    }

    #[test]
    fn test_legacy_link_fields_are_normalized() {
        let txn: Transaction = serde_json::from_value(json!({
            "id": "t1",
            "date": "2024-01-02",
            "type": "Debit",
            "amount": 250.0,
            "partnerId": "p1",
            "projectId": "pr1",
            "linkedVendor": "v1",
            "workerId": ""
        }))
        .unwrap();

        assert_eq!(txn.linked(LinkField::Partner), Some("p1"));
        assert_eq!(txn.linked(LinkField::Project), Some("pr1"));
        assert_eq!(txn.linked(LinkField::Vendor), Some("v1"));
        assert_eq!(txn.linked(LinkField::Worker), None);
        assert!(txn.extra.is_empty());

        let exported = serde_json::to_value(&txn).unwrap();
        assert_eq!(exported["linkedPartner"], "p1");
        assert!(exported.get("partnerId").is_none());
    }

    #[test]
    fn test_canonical_link_field_wins_over_alias() {
        let txn: Transaction = serde_json::from_value(json!({
            "type": "Credit",
            "amount": 1,
            "linkedPartner": "canonical",
            "partnerId": "legacy"
        }))
        .unwrap();
        assert_eq!(txn.linked_partner.as_deref(), Some("canonical"));
    }

    #[test]
    fn test_amounts_are_coerced() {
        let txn: Transaction = serde_json::from_value(json!({
            "type": "Due",
            "amount": "125.5",
            "originalDueAmount": "300",
            "payments": [{"id": "p", "amount": "abc", "date": "2024-01-01", "method": "cash"}]
        }))
        .unwrap();
        assert_eq!(txn.amount, 125.5);
        assert_eq!(txn.original_due_amount, Some(300.0));
        assert_eq!(txn.payments[0].amount, 0.0);
        assert_eq!(txn.payments[0].method, PaymentMethod::Cash);

        let nulls: Transaction =
            serde_json::from_value(json!({"type": "Credit", "amount": null, "payments": null}))
                .unwrap();
        assert_eq!(nulls.amount, 0.0);
        assert!(nulls.payments.is_empty());
    }

    #[test]
    fn test_unknown_keys_survive_export() {
        let input = json!({
            "id": "t1",
            "date": "2024-01-02",
            "type": "Credit",
            "amount": 10.0,
            "reference": "ADV-2024-012",
            "addedBy": {"name": "Finance Manager"}
        });
        let txn: Transaction = serde_json::from_value(input).unwrap();
        assert_eq!(txn.extra["reference"], "ADV-2024-012");

        let exported = serde_json::to_value(&txn).unwrap();
        assert_eq!(exported["addedBy"]["name"], "Finance Manager");
        assert_eq!(exported["type"], "Credit");
    }

    #[test]
    fn test_display_fallbacks_and_flow() {
        let txn = Transaction::new(TransactionType::Debit, 5.0);
        assert_eq!(txn.description_or_na(), "N/A");
        assert_eq!(txn.category_or_na(), "N/A");
        assert!(txn.flow_parties().is_empty());

        let mut flowing = txn.with_category("Raw Materials");
        flowing.entities = Some("John Smith → Residential Complex A → Steel Suppliers".into());
        assert_eq!(flowing.category_or_na(), "Raw Materials");
        assert_eq!(
            flowing.flow_parties(),
            vec!["John Smith", "Residential Complex A", "Steel Suppliers"]
        );
    }

    #[test]
    fn test_payment_method_labels() {
        assert_eq!(PaymentMethod::parse("Wire Transfer"), PaymentMethod::WireTransfer);
        assert_eq!(PaymentMethod::CreditCard.to_string(), "Credit Card");
        assert_eq!(String::from(PaymentMethod::Other("UPI".into())), "UPI");
        assert_eq!(PaymentMethod::default(), PaymentMethod::BankTransfer);
    }

    #[test]
    fn test_normalize_matches_what_ingestion_reads_back() {
        let mut txn = Transaction::new(TransactionType::Other("debit".into()), 10.0);
        txn.linked_partner = Some(String::new());
        txn.linked_vendor = Some("  ".into());
        txn.linked_project = Some("pr1".into());
        txn.payments.push(Payment {
            id: "pay1".into(),
            amount: 1.0,
            date: "2024-01-01".into(),
            method: PaymentMethod::Other("cash".into()),
            notes: None,
        });

        txn.normalize();
        assert_eq!(txn.kind, TransactionType::Debit);
        assert_eq!(txn.linked(LinkField::Partner), None);
        assert_eq!(txn.linked(LinkField::Vendor), None);
        assert_eq!(txn.linked(LinkField::Project), Some("pr1"));
        assert_eq!(txn.payments[0].method, PaymentMethod::Cash);

        let json = serde_json::to_string(&txn).unwrap();
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, txn);

        let mut foreign = Transaction::new(TransactionType::Other("Income".into()), 1.0);
        foreign.normalize();
        assert_eq!(foreign.kind, TransactionType::Other("Income".into()));
    }
}
