// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::monthkey::MonthKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransactionKind {
    Inflow,
    Outflow,
    DailyExpense,
}

impl std::str::FromStr for TransactionKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inflow" | "income" | "in" => Ok(Self::Inflow),
            "outflow" | "expense" | "out" => Ok(Self::Outflow),
            "daily" | "daily-expense" | "dailyexpense" => Ok(Self::DailyExpense),
            other => Err(anyhow::anyhow!(
                "Unknown transaction kind '{}', expected inflow|outflow|daily-expense",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Fixed step in days for the frequencies that have one.
    pub fn day_step(self) -> Option<i64> {
        match self {
            Self::Daily => Some(1),
            Self::Weekly => Some(7),
            Self::Biweekly => Some(14),
            _ => None,
        }
    }

    /// Step in months for the month-anchored frequencies.
    pub fn month_step(self) -> Option<u32> {
        match self {
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::Yearly => Some(12),
            _ => None,
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "biweekly" | "fortnightly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" | "annual" => Ok(Self::Yearly),
            other => Err(anyhow::anyhow!(
                "Unknown frequency '{}', expected daily|weekly|biweekly|monthly|quarterly|yearly",
                other
            )),
        }
    }
}

/// Schedule for a recurring transaction template. Monthly, quarterly and
/// yearly frequencies pin the occurrence day via `day_of_month` or
/// `use_last_day_of_month`; daily/weekly/biweekly step from `start_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrencePattern {
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub use_last_day_of_month: bool,
}

impl RecurrencePattern {
    /// Shape checks for callers constructing a pattern from user input.
    /// The expander assumes a validated pattern.
    pub fn validate(&self) -> Result<(), crate::error::LedgerError> {
        use crate::error::LedgerError;
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(LedgerError::InvalidPattern(
                    "end date is before start date".into(),
                ));
            }
        }
        if let Some(dom) = self.day_of_month {
            if !(1..=31).contains(&dom) {
                return Err(LedgerError::InvalidPattern(format!(
                    "day of month {} outside 1..=31",
                    dom
                )));
            }
        }
        if self.day_of_month.is_some() && self.use_last_day_of_month {
            return Err(LedgerError::InvalidPattern(
                "day-of-month and last-day-of-month are mutually exclusive".into(),
            ));
        }
        Ok(())
    }
}

/// A single ledger movement. Templates (recurrence set) live in the store's
/// registry; concrete occurrences carry `parent_recurring_id` instead.
/// `metadata` is opaque provenance (credit-card / investment linkage) that
/// the core round-trips but never interprets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<RecurrencePattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_recurring_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// Payload for creating a transaction through the store.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub description: String,
    pub amount: Decimal,
    pub category: Option<String>,
    pub recurrence: Option<RecurrencePattern>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl NewTransaction {
    pub fn new(kind: TransactionKind, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            kind,
            description: description.into(),
            amount,
            category: None,
            recurrence: None,
            metadata: BTreeMap::new(),
        }
    }
}

/// Partial update for a transaction or a recurring template. `None` fields
/// are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub kind: Option<TransactionKind>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<Option<String>>,
    pub recurrence: Option<RecurrencePattern>,
}

/// The three directly-editable flow fields of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayField {
    Inflow,
    Outflow,
    DailyExpense,
}

impl std::str::FromStr for DayField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inflow" => Ok(Self::Inflow),
            "outflow" => Ok(Self::Outflow),
            "expense" | "daily-expense" | "dailyexpense" => Ok(Self::DailyExpense),
            other => Err(anyhow::anyhow!(
                "Unknown field '{}', expected inflow|outflow|expense",
                other
            )),
        }
    }
}

/// One calendar day of a month. `inflow`/`outflow`/`daily_expense` are
/// derived from `transactions` whenever any exist for that day; `balance` is
/// always written by propagation, never directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    pub day: u32,
    pub inflow: Decimal,
    pub outflow: Decimal,
    pub daily_expense: Decimal,
    pub balance: Decimal,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl DailyEntry {
    pub fn empty(day: u32) -> Self {
        Self {
            day,
            inflow: Decimal::ZERO,
            outflow: Decimal::ZERO,
            daily_expense: Decimal::ZERO,
            balance: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotals {
    pub total_inflow: Decimal,
    pub total_outflow: Decimal,
    pub final_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyLedger {
    pub month: MonthKey,
    pub display_name: String,
    pub entries: Vec<DailyEntry>,
    pub totals: MonthTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSnapshot {
    pub total_loan_amount: Decimal,
    pub total_paid: Decimal,
    pub total_remaining: Decimal,
}
