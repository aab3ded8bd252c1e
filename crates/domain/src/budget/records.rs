//! Budget records served by the REST backend.
//!
//! Fields the server computes (`id`, totals, carryovers) are read but never
//! written back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Amount, Record};

/// A budgeting period, e.g. one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Server-assigned identifier
    #[serde(default, skip_serializing)]
    pub id: Option<u64>,
    /// Display name
    pub name: String,
    /// First day of the period
    pub start_date: NaiveDate,
    /// Last day of the period
    pub end_date: NaiveDate,
    /// Savings computed by the server
    #[serde(default, skip_serializing)]
    pub total_savings: Option<Amount>,
}

impl Record for Period {
    const COLLECTION: &'static str = "periods/";

    fn id(&self) -> Option<u64> {
        self.id
    }
}

/// Money received during a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Income {
    /// Server-assigned identifier
    #[serde(default, skip_serializing)]
    pub id: Option<u64>,
    /// Owning period
    pub period: u64,
    /// Where the money came from
    pub source: String,
    /// Amount of money
    pub amount: Amount,
    /// Day the money arrived
    pub date_received: NaiveDate,
}

impl Record for Income {
    const COLLECTION: &'static str = "incomes/";

    fn id(&self) -> Option<u64> {
        self.id
    }
}

/// A user-defined spending category (house, loans, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetCategory {
    /// Server-assigned identifier
    #[serde(default, skip_serializing)]
    pub id: Option<u64>,
    /// Display name
    pub name: String,
}

impl Record for BudgetCategory {
    const COLLECTION: &'static str = "categories/";

    fn id(&self) -> Option<u64> {
        self.id
    }
}

/// Payment status of a budget line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Settled
    Paid,
    /// Still open
    #[default]
    NotPaid,
}

/// An allocation of money to a category within a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Server-assigned identifier
    #[serde(default, skip_serializing)]
    pub id: Option<u64>,
    /// Owning period
    pub period: u64,
    /// Category to allocate to; write-only on the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    /// Category as returned by the server
    #[serde(default, skip_serializing)]
    pub category: Option<BudgetCategory>,
    /// Money set aside
    pub amount_allocated: Amount,
    /// Whether the line has been paid
    #[serde(default)]
    pub status: BudgetStatus,
    /// Payment deadline
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl Record for Budget {
    const COLLECTION: &'static str = "budgets/";

    fn id(&self) -> Option<u64> {
        self.id
    }
}

/// One day of household spending against a fixed daily limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySpending {
    /// Server-assigned identifier
    #[serde(default, skip_serializing)]
    pub id: Option<u64>,
    /// Day the money was spent
    pub date: NaiveDate,
    /// Owning period
    pub period: u64,
    /// Money spent that day
    pub spent_amount: Amount,
    /// Allowed spending per day
    pub fixed_daily_limit: Amount,
    /// Carried over from the previous day, computed by the server
    #[serde(default, skip_serializing)]
    pub carryover: Option<Amount>,
    /// Computed by the server
    #[serde(default, skip_serializing)]
    pub remaining_for_day: Option<Amount>,
    /// Computed by the server
    #[serde(default, skip_serializing)]
    pub is_over_limit: Option<bool>,
}

impl Record for DailySpending {
    const COLLECTION: &'static str = "daily-house-spendings/";

    fn id(&self) -> Option<u64> {
        self.id
    }
}

/// A one-off cost that does not belong to a budget line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiscellaneousCost {
    /// Server-assigned identifier
    #[serde(default, skip_serializing)]
    pub id: Option<u64>,
    /// Owning period
    pub period: u64,
    /// Short description
    pub title: String,
    /// Amount of money
    pub amount: Amount,
}

impl Record for MiscellaneousCost {
    const COLLECTION: &'static str = "misc-costs/";

    fn id(&self) -> Option<u64> {
        self.id
    }
}
