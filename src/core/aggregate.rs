//! Aggregation business logic - totals, day groups, and entity rollups for dashboards.
//!
//! Every function borrows transactions and returns plain data. Transactions with an
//! unrecognized type contribute nothing. Dangling linkage ids simply match no
//! entity. A record whose date cannot be parsed is skipped from date-based views with
//! a warning instead of failing the whole computation.

use crate::entities::{LinkField, Partner, Record, Transaction, TransactionType, Vendor, Worker};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use tracing::warn;

/// Label format for day group headings, e.g. `Jan 02, 2024`.
pub const DAY_LABEL_FORMAT: &str = "%b %d, %Y";

/// Summed amounts per transaction type.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TypeTotals {
    /// Sum of credits
    pub credit: f64,
    /// Sum of debits
    pub debit: f64,
    /// Sum of dues
    pub due: f64,
    /// Sum of loans
    pub loan: f64,
}

impl TypeTotals {
    /// Total for one bucket. Unknown types have no bucket and report zero.
    #[must_use]
    pub fn get(&self, kind: &TransactionType) -> f64 {
        match kind {
            TransactionType::Credit => self.credit,
            TransactionType::Debit => self.debit,
            TransactionType::Due => self.due,
            TransactionType::Loan => self.loan,
            TransactionType::Other(_) => 0.0,
        }
    }

    /// Sum over all four buckets.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.credit + self.debit + self.due + self.loan
    }

    fn add(&mut self, kind: &TransactionType, amount: f64) {
        let bucket = match kind {
            TransactionType::Credit => &mut self.credit,
            TransactionType::Debit => &mut self.debit,
            TransactionType::Due => &mut self.due,
            TransactionType::Loan => &mut self.loan,
            TransactionType::Other(_) => return,
        };
        *bucket += amount;
    }
}

/// Sums transaction amounts into their type bucket.
pub fn totals_by_type<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> TypeTotals {
    let mut totals = TypeTotals::default();
    for transaction in transactions {
        totals.add(&transaction.kind, transaction.effective_amount());
    }
    totals
}

/// Dashboard cash-flow figures.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CashFlow {
    /// Credits
    pub inflow: f64,
    /// Debits plus dues
    pub outflow: f64,
    /// `inflow - outflow`
    pub net: f64,
    /// Loans
    pub loans: f64,
}

impl From<TypeTotals> for CashFlow {
    fn from(totals: TypeTotals) -> Self {
        let outflow = totals.debit + totals.due;
        Self {
            inflow: totals.credit,
            outflow,
            net: totals.credit - outflow,
            loans: totals.loan,
        }
    }
}

/// Computes the KPI cards: inflow, outflow, net cash flow, and loans.
pub fn cash_flow<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> CashFlow {
    totals_by_type(transactions).into()
}

/// Transactions falling on one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup<'a> {
    /// The day
    pub day: NaiveDate,
    /// Display heading, e.g. `Jan 02, 2024`
    pub label: String,
    /// Transactions on that day, in input order
    pub transactions: Vec<&'a Transaction>,
}

impl DayGroup<'_> {
    /// Day key in `YYYY-MM-DD` form.
    #[must_use]
    pub fn key(&self) -> String {
        self.day.format(super::dates::ISO_DATE).to_string()
    }

    /// Reorders the day's transactions by time, latest first. Ties keep input order.
    pub fn sort_newest_first(&mut self) {
        self.transactions
            .sort_by_key(|t| std::cmp::Reverse(t.timestamp().ok()));
    }
}

/// Groups transactions by calendar day, most recent day first.
///
/// Transactions with an unparsable date are left out and logged.
pub fn group_by_calendar_day<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> Vec<DayGroup<'a>> {
    let mut days: BTreeMap<NaiveDate, Vec<&'a Transaction>> = BTreeMap::new();
    for transaction in transactions {
        match transaction.calendar_day() {
            Ok(day) => days.entry(day).or_default().push(transaction),
            Err(e) => warn!(id = %transaction.id, "Skipping transaction in day grouping: {e}"),
        }
    }

    days.into_iter()
        .rev()
        .map(|(day, transactions)| DayGroup {
            day,
            label: day.format(DAY_LABEL_FORMAT).to_string(),
            transactions,
        })
        .collect()
}

/// The `limit` most recent transactions. Unparsable dates sort last.
pub fn recent_transactions<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    limit: usize,
) -> Vec<&'a Transaction> {
    let mut keyed: Vec<(Option<NaiveDateTime>, &'a Transaction)> = transactions
        .into_iter()
        .map(|t| (t.timestamp().ok(), t))
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    keyed.into_iter().take(limit).map(|(_, t)| t).collect()
}

/// A named amount, one bar in an activity chart.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityActivity {
    /// Entity name
    pub name: String,
    /// Summed amount
    pub amount: f64,
}

/// Transactions linked to the entity `id` through `link`, in input order.
#[must_use]
pub fn transactions_for<'a>(
    transactions: &'a [Transaction],
    link: LinkField,
    id: &str,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| t.is_linked_to(link, id))
        .collect()
}

fn linked_sum<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    link: LinkField,
    id: &str,
    kind: Option<&TransactionType>,
) -> f64 {
    transactions
        .into_iter()
        .filter(|t| t.is_linked_to(link, id))
        .filter(|t| kind.is_none_or(|k| &t.kind == k))
        .map(Transaction::effective_amount)
        .sum()
}

/// Sums each entity's linked transaction amounts. Entities with no positive total are
/// left out so charts do not render empty bars.
#[must_use]
pub fn activity_by_entity<R: Record>(
    entities: &[R],
    transactions: &[Transaction],
    link: LinkField,
) -> Vec<EntityActivity> {
    entities
        .iter()
        .map(|entity| EntityActivity {
            name: entity.name().to_string(),
            amount: linked_sum(transactions, link, entity.id(), None),
        })
        .filter(|activity| activity.amount > 0.0)
        .collect()
}

/// Income and expenses of one project.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProjectSummary {
    /// Credits linked to the project
    pub income: f64,
    /// Debits and dues linked to the project
    pub expenses: f64,
    /// `income - expenses`
    pub net: f64,
}

/// Summarizes the transactions linked to `project_id`.
#[must_use]
pub fn project_summary(transactions: &[Transaction], project_id: &str) -> ProjectSummary {
    let flow = cash_flow(transactions_for(transactions, LinkField::Project, project_id));
    ProjectSummary {
        income: flow.inflow,
        expenses: flow.outflow,
        net: flow.net,
    }
}

/// A partner's money flows within one project.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerContribution {
    /// Partner name
    pub name: String,
    /// Debits the partner made into the project
    pub investments: f64,
    /// Credits the partner received from the project
    pub receipts: f64,
}

/// Per-partner investments and receipts within `project_id`. Partners with neither
/// are left out.
#[must_use]
pub fn project_partner_breakdown(
    partners: &[Partner],
    transactions: &[Transaction],
    project_id: &str,
) -> Vec<PartnerContribution> {
    let in_project = transactions_for(transactions, LinkField::Project, project_id);
    partners
        .iter()
        .map(|partner| PartnerContribution {
            name: partner.name.clone(),
            investments: linked_sum(
                in_project.iter().copied(),
                LinkField::Partner,
                &partner.id,
                Some(&TransactionType::Debit),
            ),
            receipts: linked_sum(
                in_project.iter().copied(),
                LinkField::Partner,
                &partner.id,
                Some(&TransactionType::Credit),
            ),
        })
        .filter(|c| c.investments > 0.0 || c.receipts > 0.0)
        .collect()
}

fn project_debits_by<R: Record>(
    entities: &[R],
    transactions: &[Transaction],
    project_id: &str,
    link: LinkField,
) -> Vec<EntityActivity> {
    let in_project = transactions_for(transactions, LinkField::Project, project_id);
    entities
        .iter()
        .map(|entity| EntityActivity {
            name: entity.name().to_string(),
            amount: linked_sum(
                in_project.iter().copied(),
                link,
                entity.id(),
                Some(&TransactionType::Debit),
            ),
        })
        .filter(|activity| activity.amount > 0.0)
        .collect()
}

/// Per-vendor debits within `project_id`. Vendors with no expenses are left out.
#[must_use]
pub fn project_vendor_breakdown(
    vendors: &[Vendor],
    transactions: &[Transaction],
    project_id: &str,
) -> Vec<EntityActivity> {
    project_debits_by(vendors, transactions, project_id, LinkField::Vendor)
}

/// Per-worker debits within `project_id`. Workers with no payments are left out.
#[must_use]
pub fn project_worker_breakdown(
    workers: &[Worker],
    transactions: &[Transaction],
    project_id: &str,
) -> Vec<EntityActivity> {
    project_debits_by(workers, transactions, project_id, LinkField::Worker)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_totals_by_type() {
        let mut unknown = credit(999.0);
        unknown.kind = TransactionType::Other("Income".into());
        let transactions = vec![
            credit(100.0),
            credit(50.0),
            debit(40.0),
            due_with_payments(60.0, &[10.0]),
            loan(25.0),
            unknown,
        ];

        let totals = totals_by_type(&transactions);
        assert_eq!(totals.credit, 150.0);
        assert_eq!(totals.debit, 40.0);
        assert_eq!(totals.due, 60.0);
        assert_eq!(totals.loan, 25.0);
        assert_eq!(totals.get(&TransactionType::Other("Income".into())), 0.0);

        let known_sum: f64 = transactions
            .iter()
            .filter(|t| t.kind.is_known())
            .map(|t| t.amount)
            .sum();
        assert_eq!(totals.total(), known_sum);
    }

    #[test]
    fn test_lowercase_types_from_import_are_counted() {
        let transactions: Vec<Transaction> = serde_json::from_str(
            r#"[{"type": "credit", "amount": 10}, {"type": "CREDIT", "amount": "5"}]"#,
        )
        .unwrap();
        assert_eq!(totals_by_type(&transactions).credit, 15.0);
    }

    #[test]
    fn test_cash_flow() {
        let transactions = vec![
            credit(1000.0),
            debit(300.0),
            due_with_payments(200.0, &[]),
            loan(500.0),
        ];
        let flow = cash_flow(&transactions);
        assert_eq!(flow.inflow, 1000.0);
        assert_eq!(flow.outflow, 500.0);
        assert_eq!(flow.net, 500.0);
        assert_eq!(flow.loans, 500.0);
    }

    #[test]
    fn test_group_by_calendar_day() {
        let transactions = vec![
            dated(credit(1.0), "2024-01-02"),
            dated(debit(2.0), "2024-01-01"),
            dated(credit(3.0), "2024-01-02"),
        ];

        let groups = group_by_calendar_day(&transactions);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key(), "2024-01-02");
        assert_eq!(groups[0].label, "Jan 02, 2024");
        assert_eq!(groups[0].transactions.len(), 2);
        assert_eq!(groups[0].transactions[0].amount, 1.0);
        assert_eq!(groups[0].transactions[1].amount, 3.0);
        assert_eq!(groups[1].key(), "2024-01-01");
    }

    #[test]
    fn test_group_by_calendar_day_skips_bad_dates() {
        let transactions = vec![
            dated(credit(1.0), "not a date"),
            dated(credit(2.0), "2024-05-01T10:00:00Z"),
            dated(credit(3.0), ""),
        ];
        let groups = group_by_calendar_day(&transactions);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].transactions.len(), 1);
        assert_eq!(groups[0].transactions[0].amount, 2.0);
    }

    #[test]
    fn test_day_group_secondary_sort() {
        let transactions = vec![
            dated(credit(1.0), "2024-01-02T08:00:00"),
            dated(credit(2.0), "2024-01-02T18:00:00"),
        ];
        let mut groups = group_by_calendar_day(&transactions);
        groups[0].sort_newest_first();
        assert_eq!(groups[0].transactions[0].amount, 2.0);
    }

    #[test]
    fn test_recent_transactions() {
        let transactions = vec![
            dated(credit(1.0), "2024-01-01"),
            dated(credit(2.0), "bad"),
            dated(credit(3.0), "2024-03-01"),
            dated(credit(4.0), "2024-02-01"),
        ];
        let recent: Vec<f64> = recent_transactions(&transactions, 3)
            .iter()
            .map(|t| t.amount)
            .collect();
        assert_eq!(recent, vec![3.0, 4.0, 1.0]);
    }

    #[test]
    fn test_activity_by_entity_excludes_idle_entities() {
        let partners = vec![partner("p1", "John Smith"), partner("p2", "Jafar ms")];
        let transactions = vec![
            credit(100.0).linked_to(LinkField::Partner, "p1"),
            debit(50.0).linked_to(LinkField::Partner, "p1"),
            debit(75.0).linked_to(LinkField::Partner, "ghost"),
        ];

        let activity = activity_by_entity(&partners, &transactions, LinkField::Partner);
        assert_eq!(
            activity,
            vec![EntityActivity {
                name: "John Smith".into(),
                amount: 150.0
            }]
        );
    }

    #[test]
    fn test_project_summary_and_breakdowns() {
        let partners = vec![partner("p1", "John Smith"), partner("p2", "Idle Partner")];
        let vendors = vec![vendor("v1", "Steel Suppliers India Ltd"), vendor("v2", "Unused")];
        let workers = vec![worker("w1", "Ramesh Kumar")];
        let transactions = vec![
            debit(250.0)
                .linked_to(LinkField::Project, "pr1")
                .linked_to(LinkField::Partner, "p1")
                .linked_to(LinkField::Vendor, "v1"),
            credit(400.0)
                .linked_to(LinkField::Project, "pr1")
                .linked_to(LinkField::Partner, "p1"),
            debit(30.0)
                .linked_to(LinkField::Project, "pr1")
                .linked_to(LinkField::Worker, "w1"),
            due_with_payments(20.0, &[]).linked_to(LinkField::Project, "pr1"),
            debit(999.0)
                .linked_to(LinkField::Project, "other")
                .linked_to(LinkField::Vendor, "v1"),
        ];

        let summary = project_summary(&transactions, "pr1");
        assert_eq!(summary.income, 400.0);
        assert_eq!(summary.expenses, 300.0);
        assert_eq!(summary.net, 100.0);

        let partners_view = project_partner_breakdown(&partners, &transactions, "pr1");
        assert_eq!(partners_view.len(), 1);
        assert_eq!(partners_view[0].investments, 250.0);
        assert_eq!(partners_view[0].receipts, 400.0);

        let vendors_view = project_vendor_breakdown(&vendors, &transactions, "pr1");
        assert_eq!(vendors_view.len(), 1);
        assert_eq!(vendors_view[0].amount, 250.0);

        let workers_view = project_worker_breakdown(&workers, &transactions, "pr1");
        assert_eq!(workers_view[0].amount, 30.0);

        assert_eq!(transactions_for(&transactions, LinkField::Vendor, "v1").len(), 2);
    }
}
