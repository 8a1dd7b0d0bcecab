// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The ledger store: owns the month map, the recurring-template registry and
//! the current-month cursor, and orchestrates the calculation engine and the
//! recurrence expander on every mutation.
//!
//! Corruption policy: detection is opportunistic (on access and on every
//! propagation) and the remedy is always to discard the smallest unit of
//! state that removes the symptom: a corrupted month is quarantined
//! (deleted), never value-patched, because there is no audit trail to repair
//! against. Quarantine happens only here and is always logged.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use rust_decimal::Decimal;
use tracing::{error, warn};
use uuid::Uuid;

use crate::calc;
use crate::error::LedgerError;
use crate::models::{
    DayField, MonthTotals, MonthlyLedger, NewTransaction, Transaction, TransactionUpdate,
};
use crate::monthkey::MonthKey;
use crate::recurrence;
use crate::sanitize::{self, ANOMALY_THRESHOLD, BALANCE_CEILING};

pub struct LedgerStore {
    months: BTreeMap<MonthKey, MonthlyLedger>,
    templates: BTreeMap<String, Transaction>,
    cursor: MonthKey,
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

/// True when the month's stored balances are beyond the corruption ceiling.
pub fn month_is_corrupted(ledger: &MonthlyLedger) -> bool {
    ledger.totals.final_balance.abs() > *BALANCE_CEILING
        || ledger
            .entries
            .iter()
            .any(|e| e.balance.abs() > *BALANCE_CEILING)
}

impl LedgerStore {
    pub fn new() -> Self {
        Self {
            months: BTreeMap::new(),
            templates: BTreeMap::new(),
            cursor: MonthKey::current(),
        }
    }

    /// Rebuild a store from persisted state. The cursor is always re-derived
    /// as today's month, never loaded.
    pub fn from_parts(
        months: BTreeMap<MonthKey, MonthlyLedger>,
        templates: BTreeMap<String, Transaction>,
    ) -> Self {
        Self {
            months,
            templates,
            cursor: MonthKey::current(),
        }
    }

    pub fn months(&self) -> &BTreeMap<MonthKey, MonthlyLedger> {
        &self.months
    }

    pub fn templates(&self) -> &BTreeMap<String, Transaction> {
        &self.templates
    }

    pub fn cursor(&self) -> MonthKey {
        self.cursor
    }

    /// Move the cursor, lazily creating the target month.
    pub fn go_to(&mut self, key: MonthKey) {
        self.ensure_month(key);
        self.cursor = key;
    }

    pub fn get_month(&self, key: MonthKey) -> Option<&MonthlyLedger> {
        self.months.get(&key)
    }

    pub fn recurring_templates(&self) -> Vec<&Transaction> {
        self.templates.values().collect()
    }

    /// Initial balance of `key`: its predecessor's final balance. A
    /// predecessor showing corruption symptoms is quarantined and 0 returned
    /// instead, so corruption never propagates forward silently. An absent
    /// predecessor also yields 0.
    pub fn initial_balance(&mut self, key: MonthKey) -> Decimal {
        let prev = key.previous();
        match self.months.get(&prev) {
            None => Decimal::ZERO,
            Some(ledger) if month_is_corrupted(ledger) => {
                error!(month = %prev, final_balance = %ledger.totals.final_balance,
                    "corrupted month quarantined during initial-balance lookup");
                self.months.remove(&prev);
                Decimal::ZERO
            }
            Some(ledger) => ledger.totals.final_balance,
        }
    }

    /// Lazily create `key`, or re-validate it if it already exists. A stored
    /// month whose balances breach the ceiling is fully re-propagated from a
    /// freshly recomputed initial balance, on the theory that the stored
    /// initial balance itself was corrupted upstream.
    pub fn ensure_month(&mut self, key: MonthKey) {
        if let Some(ledger) = self.months.get(&key) {
            if month_is_corrupted(ledger) {
                warn!(month = %key, "stored month failed validation, re-propagating");
                self.recalculate_from(key);
            }
            return;
        }

        let entries = calc::build_empty_month(key);
        self.months.insert(
            key,
            MonthlyLedger {
                month: key,
                display_name: key.display_name(),
                entries,
                totals: MonthTotals::default(),
            },
        );

        let template_ids: Vec<String> = self
            .templates
            .iter()
            .filter(|(_, t)| {
                t.recurrence
                    .as_ref()
                    .is_some_and(|p| recurrence::overlaps_month(p, key))
            })
            .map(|(id, _)| id.clone())
            .collect();
        for id in template_ids {
            self.materialize_template_into(&id, key);
        }

        self.recalculate_from(key);
    }

    /// Directly set one flow field of one day. Only legal while the day has
    /// no transactions; once it does, the field is derived and direct writes
    /// would desynchronize it from its source.
    pub fn set_day_field(
        &mut self,
        key: MonthKey,
        day: u32,
        field: DayField,
        value: Decimal,
    ) -> Result<(), LedgerError> {
        self.ensure_month(key);
        let value = sanitize::clamp_value(sanitize::safe_decimal(value));
        let ledger = self.months.get_mut(&key).ok_or_else(|| Self::missing(key, day))?;
        let max = ledger.entries.len() as u32;
        if day < 1 || day > max {
            return Err(LedgerError::DayOutOfRange {
                month: key.to_string(),
                day,
                max,
            });
        }
        let entry = &mut ledger.entries[(day - 1) as usize];
        if !entry.transactions.is_empty() {
            return Err(LedgerError::DayHasTransactions {
                month: key.to_string(),
                day,
            });
        }
        match field {
            DayField::Inflow => entry.inflow = value,
            DayField::Outflow => entry.outflow = value,
            DayField::DailyExpense => entry.daily_expense = value,
        }
        self.recalculate_from(key);
        Ok(())
    }

    /// Add a transaction on a day, or register a recurring template when the
    /// payload carries a recurrence pattern. A recurring add puts nothing on
    /// the originating day directly; the occurrence for that day, if any,
    /// arrives through materialization like every other one. Returns the
    /// created id.
    pub fn add_transaction(
        &mut self,
        key: MonthKey,
        day: u32,
        new: NewTransaction,
    ) -> Result<String, LedgerError> {
        self.ensure_month(key);
        let id = Uuid::new_v4().to_string();
        let amount = sanitize::clamp_value(sanitize::safe_decimal(new.amount));

        if let Some(pattern) = new.recurrence {
            let template = Transaction {
                id: id.clone(),
                kind: new.kind,
                description: new.description,
                amount,
                category: new.category,
                created_at: chrono::Utc::now(),
                recurrence: Some(pattern),
                parent_recurring_id: None,
                metadata: new.metadata,
            };
            self.templates.insert(id.clone(), template);
            let touched = self.materialize_template_everywhere(&id);
            self.recalculate_each(touched);
            return Ok(id);
        }

        {
            let ledger = self.months.get_mut(&key).ok_or_else(|| Self::missing(key, day))?;
            let max = ledger.entries.len() as u32;
            if day < 1 || day > max {
                return Err(LedgerError::DayOutOfRange {
                    month: key.to_string(),
                    day,
                    max,
                });
            }
            let entry = &mut ledger.entries[(day - 1) as usize];
            entry.transactions.push(Transaction {
                id: id.clone(),
                kind: new.kind,
                description: new.description,
                amount,
                category: new.category,
                created_at: chrono::Utc::now(),
                recurrence: None,
                parent_recurring_id: None,
                metadata: new.metadata,
            });
            let totals = calc::derive_day_totals(&entry.transactions);
            entry.inflow = totals.inflow;
            entry.outflow = totals.outflow;
            entry.daily_expense = totals.daily_expense;
        }
        self.recalculate_from(key);
        Ok(id)
    }

    /// Partially update a transaction on a day, then recompute.
    pub fn update_transaction(
        &mut self,
        key: MonthKey,
        day: u32,
        id: &str,
        update: TransactionUpdate,
    ) -> Result<(), LedgerError> {
        self.ensure_month(key);
        {
            let entry = self.day_entry_mut(key, day)?;
            let tx = entry
                .transactions
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| LedgerError::TransactionNotFound(id.to_string()))?;
            if let Some(kind) = update.kind {
                tx.kind = kind;
            }
            if let Some(description) = update.description {
                tx.description = description;
            }
            if let Some(amount) = update.amount {
                tx.amount = sanitize::clamp_value(sanitize::safe_decimal(amount));
            }
            if let Some(category) = update.category {
                tx.category = category;
            }
            let totals = calc::derive_day_totals(&entry.transactions);
            entry.inflow = totals.inflow;
            entry.outflow = totals.outflow;
            entry.daily_expense = totals.daily_expense;
        }
        self.recalculate_from(key);
        Ok(())
    }

    /// Delete one transaction from a day, then recompute.
    pub fn delete_transaction(
        &mut self,
        key: MonthKey,
        day: u32,
        id: &str,
    ) -> Result<(), LedgerError> {
        self.ensure_month(key);
        {
            let entry = self.day_entry_mut(key, day)?;
            let before = entry.transactions.len();
            entry.transactions.retain(|t| t.id != id);
            if entry.transactions.len() == before {
                return Err(LedgerError::TransactionNotFound(id.to_string()));
            }
            let totals = calc::derive_day_totals(&entry.transactions);
            entry.inflow = totals.inflow;
            entry.outflow = totals.outflow;
            entry.daily_expense = totals.daily_expense;
        }
        self.recalculate_from(key);
        Ok(())
    }

    /// Drop a template and strip every materialized occurrence of it (plus
    /// legacy direct id hits) across all months, recomputing only what was
    /// touched.
    pub fn delete_recurring_series(&mut self, recurring_id: &str) -> Result<(), LedgerError> {
        let had_template = self.templates.remove(recurring_id).is_some();
        let touched = self.strip_series(recurring_id);
        if !had_template && touched.is_empty() {
            return Err(LedgerError::TemplateNotFound(recurring_id.to_string()));
        }
        self.recalculate_each(touched);
        Ok(())
    }

    /// Update a template and regenerate the whole series: every previously
    /// materialized occurrence is stripped and re-materialized from the
    /// updated template, since a period or anchor change can move every
    /// future occurrence date.
    pub fn update_recurring_template(
        &mut self,
        recurring_id: &str,
        update: TransactionUpdate,
    ) -> Result<(), LedgerError> {
        let template = self
            .templates
            .get_mut(recurring_id)
            .ok_or_else(|| LedgerError::TemplateNotFound(recurring_id.to_string()))?;
        if let Some(kind) = update.kind {
            template.kind = kind;
        }
        if let Some(description) = update.description {
            template.description = description;
        }
        if let Some(amount) = update.amount {
            template.amount = sanitize::clamp_value(sanitize::safe_decimal(amount));
        }
        if let Some(category) = update.category {
            template.category = category;
        }
        if let Some(pattern) = update.recurrence {
            template.recurrence = Some(pattern);
        }

        let mut touched: BTreeSet<MonthKey> =
            self.strip_series(recurring_id).into_iter().collect();
        touched.extend(self.materialize_template_everywhere(recurring_id));
        self.recalculate_each(touched);
        Ok(())
    }

    /// "As of day N" totals for a month, without mutating stored data.
    pub fn totals_up_to_day(&self, key: MonthKey, day: u32) -> Option<MonthTotals> {
        self.months
            .get(&key)
            .map(|l| calc::totals_up_to_day(&l.entries, day))
    }

    /// Months whose balances exceed the advisory anomaly threshold. Report
    /// material for the doctor command; never mutates.
    pub fn anomalous_months(&self) -> Vec<(MonthKey, Decimal)> {
        self.months
            .iter()
            .filter(|(_, l)| l.totals.final_balance.abs() > *ANOMALY_THRESHOLD)
            .map(|(k, l)| (*k, l.totals.final_balance))
            .collect()
    }

    fn missing(key: MonthKey, day: u32) -> LedgerError {
        // ensure_month ran first, so this only fires on a day out of range
        // of a month that failed to build.
        LedgerError::DayOutOfRange {
            month: key.to_string(),
            day,
            max: 0,
        }
    }

    fn day_entry_mut(
        &mut self,
        key: MonthKey,
        day: u32,
    ) -> Result<&mut crate::models::DailyEntry, LedgerError> {
        let ledger = self.months.get_mut(&key).ok_or_else(|| Self::missing(key, day))?;
        let max = ledger.entries.len() as u32;
        if day < 1 || day > max {
            return Err(LedgerError::DayOutOfRange {
                month: key.to_string(),
                day,
                max,
            });
        }
        Ok(&mut ledger.entries[(day - 1) as usize])
    }

    /// Re-propagate `start` from a freshly computed initial balance, then
    /// carry each recomputed final balance forward through contiguous
    /// existing months. The cascade halts at the first gap, or when a
    /// recomputed month still ends beyond the ceiling despite the per-day
    /// reset, so a known-bad value is never written into a successor.
    /// Returns the first month the cascade left untouched.
    fn recalculate_from(&mut self, start: MonthKey) -> MonthKey {
        let mut key = start;
        let mut carry = self.initial_balance(start);
        while let Some(ledger) = self.months.get_mut(&key) {
            let entries = calc::propagate_month_balances(&ledger.entries, carry);
            ledger.totals = calc::aggregate_month_totals(&entries);
            ledger.entries = entries;
            carry = ledger.totals.final_balance;
            key = key.next();
            if carry.abs() > *BALANCE_CEILING {
                error!(month = %key, carry = %carry,
                    "carry-forward balance beyond ceiling, halting cascade");
                break;
            }
        }
        key
    }

    /// Recompute every month in an ascending set of touched keys. Each key
    /// starts its own cascade unless a previous cascade already reached it,
    /// so months sitting beyond a gap in the month map are recomputed too
    /// instead of keeping stale balances.
    fn recalculate_each(&mut self, touched: impl IntoIterator<Item = MonthKey>) {
        let mut covered_until: Option<MonthKey> = None;
        for key in touched {
            if covered_until.is_some_and(|end| key < end) {
                continue;
            }
            covered_until = Some(self.recalculate_from(key));
        }
    }

    /// Insert missing occurrences of one template into one existing month.
    /// Idempotent: occurrences already present (by id) are skipped. Returns
    /// whether anything changed.
    fn materialize_template_into(&mut self, recurring_id: &str, key: MonthKey) -> bool {
        let Some(template) = self.templates.get(recurring_id).cloned() else {
            return false;
        };
        let occurrences = recurrence::materialize_occurrences(&template, key, recurring_id);
        if occurrences.is_empty() {
            return false;
        }
        let Some(ledger) = self.months.get_mut(&key) else {
            return false;
        };
        let mut touched = false;
        for (date, tx) in occurrences {
            let idx = (date.day() - 1) as usize;
            let Some(entry) = ledger.entries.get_mut(idx) else {
                continue;
            };
            if entry.transactions.iter().any(|t| t.id == tx.id) {
                continue;
            }
            entry.transactions.push(tx);
            let totals = calc::derive_day_totals(&entry.transactions);
            entry.inflow = totals.inflow;
            entry.outflow = totals.outflow;
            entry.daily_expense = totals.daily_expense;
            touched = true;
        }
        touched
    }

    /// Materialize a template into every existing month it overlaps.
    /// Returns the touched months in ascending order, for recomputation.
    fn materialize_template_everywhere(&mut self, recurring_id: &str) -> Vec<MonthKey> {
        let Some(pattern) = self
            .templates
            .get(recurring_id)
            .and_then(|t| t.recurrence.clone())
        else {
            return Vec::new();
        };
        let keys: Vec<MonthKey> = self
            .months
            .keys()
            .copied()
            .filter(|k| recurrence::overlaps_month(&pattern, *k))
            .collect();
        let mut touched = Vec::new();
        for key in keys {
            if self.materialize_template_into(recurring_id, key) {
                touched.push(key);
            }
        }
        touched
    }

    /// Remove every transaction belonging to a series from every month,
    /// re-deriving the days it vacated. Returns the touched months in
    /// ascending order.
    fn strip_series(&mut self, recurring_id: &str) -> Vec<MonthKey> {
        let mut stripped = Vec::new();
        for (key, ledger) in self.months.iter_mut() {
            let mut touched = false;
            for entry in ledger.entries.iter_mut() {
                let before = entry.transactions.len();
                entry.transactions.retain(|t| {
                    t.parent_recurring_id.as_deref() != Some(recurring_id)
                        && t.id != recurring_id
                });
                if entry.transactions.len() != before {
                    let totals = calc::derive_day_totals(&entry.transactions);
                    entry.inflow = totals.inflow;
                    entry.outflow = totals.outflow;
                    entry.daily_expense = totals.daily_expense;
                    touched = true;
                }
            }
            if touched {
                stripped.push(*key);
            }
        }
        stripped
    }
}
