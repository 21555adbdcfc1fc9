//! Reference entities - partners, projects, vendors, workers, account categories, and users.
//!
//! These are flat records. Transactions point at them through linkage fields; they
//! never point back.

use super::transaction::lenient_optional_amount;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Common surface of every reference record held by the store.
pub trait Record {
    /// Entity kind used in messages and report titles.
    const KIND: &'static str;

    /// Identifier.
    fn id(&self) -> &str;

    /// Replaces the identifier.
    fn set_id(&mut self, id: String);

    /// Display name.
    fn name(&self) -> &str;
}

macro_rules! impl_record {
    ($ty:ty, $kind:literal) => {
        impl Record for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

/// A business partner who invests in or receives from projects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    /// Unique identifier, assigned on insert when empty
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// e.g. "Individual Partner", "Financial Partner"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub partner_type: Option<String>,
    /// Primary contact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Amount invested in the business
    #[serde(
        default,
        deserialize_with = "lenient_optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub investment_amount: Option<f64>,
    /// Date the partnership began
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partnership_date: Option<String>,
    /// Postal address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Keys not modelled above, preserved for export
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A construction project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier, assigned on insert when empty
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// "Active", "Planning", "Completed", "On Hold"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Planned budget
    #[serde(
        default,
        deserialize_with = "lenient_optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub budget: Option<f64>,
    /// Date work started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Client the project is built for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// Site location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Keys not modelled above, preserved for export
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A supplier of materials or services.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    /// Unique identifier, assigned on insert when empty
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Registered company name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Supply category, e.g. "Raw Materials"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Postal address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Tax registration number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    /// Area of specialization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speciality: Option<String>,
    /// Keys not modelled above, preserved for export
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An employee or contracted worker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    /// Unique identifier, assigned on insert when empty
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Job title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Daily wage
    #[serde(
        default,
        deserialize_with = "lenient_optional_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub daily_rate: Option<f64>,
    /// Department
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Date the worker joined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<String>,
    /// Area of specialization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speciality: Option<String>,
    /// Keys not modelled above, preserved for export
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A chart-of-accounts category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountCategory {
    /// Unique identifier, assigned on insert when empty
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// "Income", "Expense", "Asset"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub category_type: Option<String>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Keys not modelled above, preserved for export
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A dashboard user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier, assigned on insert when empty
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Job title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Department
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Keys not modelled above, preserved for export
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl_record!(Partner, "Partner");
impl_record!(Project, "Project");
impl_record!(Vendor, "Vendor");
impl_record!(Worker, "Worker");
impl_record!(AccountCategory, "Account category");
impl_record!(User, "User");

macro_rules! impl_named {
    ($($ty:ty),+) => {
        $(
            impl $ty {
                /// Creates a record with the given name and no id.
                #[must_use]
                pub fn named(name: impl Into<String>) -> Self {
                    Self {
                        name: name.into(),
                        ..Self::default()
                    }
                }
            }
        )+
    };
}

impl_named!(Partner, Project, Vendor, Worker, AccountCategory, User);
