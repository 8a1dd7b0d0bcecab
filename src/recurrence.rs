// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The recurrence expander: turns a recurring template into concrete
//! occurrence dates for one month at a time. Pure date arithmetic, no store
//! access.
//!
//! Anchor policy: a `day_of_month` that does not exist in the target month
//! clamps to that month's last day (the 31st in February lands on the
//! 28th/29th). An occurrence never rolls into the following month.

use chrono::{Datelike, Duration, NaiveDate};

use crate::models::{RecurrencePattern, Transaction};
use crate::monthkey::MonthKey;

/// The anchored occurrence date inside one specific month.
fn pin_in_month(key: MonthKey, pattern: &RecurrencePattern) -> NaiveDate {
    if pattern.use_last_day_of_month {
        return key.last_day();
    }
    let anchor = pattern
        .day_of_month
        .unwrap_or_else(|| pattern.start_date.day());
    let day = anchor.min(key.days_in_month()).max(1);
    NaiveDate::from_ymd_opt(key.year(), key.month(), day).unwrap_or_else(|| key.last_day())
}

fn months_between(from: MonthKey, to: MonthKey) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month())
}

fn advance_months(key: MonthKey, months: i64) -> MonthKey {
    let total = i64::from(key.year()) * 12 + i64::from(key.month()) - 1 + months;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) + 1;
    MonthKey::new(year as i32, month as u32).unwrap_or(key)
}

/// Advance one period. `None` signals series termination (past `end_date`),
/// not an error.
pub fn next_occurrence(current: NaiveDate, pattern: &RecurrencePattern) -> Option<NaiveDate> {
    let next = if let Some(step) = pattern.frequency.day_step() {
        current + Duration::days(step)
    } else {
        let step = i64::from(pattern.frequency.month_step().unwrap_or(1));
        pin_in_month(advance_months(MonthKey::from_date(current), step), pattern)
    };
    match pattern.end_date {
        Some(end) if next > end => None,
        _ => Some(next),
    }
}

/// Cheap window pre-check so the store can skip templates that cannot apply
/// to a month at all.
pub fn overlaps_month(pattern: &RecurrencePattern, key: MonthKey) -> bool {
    pattern.start_date <= key.last_day()
        && pattern.end_date.is_none_or(|end| end >= key.first_day())
}

/// All occurrence dates falling inside `key`, in ascending order. The series
/// starts at `start_date` itself; periods before the target month are
/// skipped arithmetically rather than walked one by one. Bounded by the
/// month length (at most 31 dates even for a daily series).
pub fn occurrences_in_month(pattern: &RecurrencePattern, key: MonthKey) -> Vec<NaiveDate> {
    let window_start = key.first_day();
    let window_end = key.last_day();
    if !overlaps_month(pattern, key) {
        return Vec::new();
    }

    // Fast-forward to the first candidate at or after the window start.
    let mut current = if let Some(step) = pattern.frequency.day_step() {
        let mut date = pattern.start_date;
        if date < window_start {
            let gap = (window_start - date).num_days();
            let periods = gap / step + i64::from(gap % step != 0);
            date = date + Duration::days(periods * step);
        }
        date
    } else {
        let step = i64::from(pattern.frequency.month_step().unwrap_or(1));
        let start_key = MonthKey::from_date(pattern.start_date);
        let diff = months_between(start_key, key);
        if diff <= 0 {
            pattern.start_date
        } else {
            let periods = diff / step + i64::from(diff % step != 0);
            pin_in_month(advance_months(start_key, periods * step), pattern)
        }
    };

    let mut out = Vec::new();
    while current <= window_end {
        if pattern.end_date.is_some_and(|end| current > end) {
            break;
        }
        if current >= window_start {
            out.push(current);
        }
        match next_occurrence(current, pattern) {
            Some(next) => current = next,
            None => break,
        }
    }
    out
}

/// Deterministic occurrence id. Re-materializing the same month yields the
/// same ids, which is what makes materialization idempotent.
pub fn occurrence_id(recurring_id: &str, date: NaiveDate) -> String {
    format!("{}@{}", recurring_id, date)
}

/// One concrete transaction per occurrence of `template` inside `key`,
/// tagged back to its template via `parent_recurring_id` and paired with the
/// day it lands on.
pub fn materialize_occurrences(
    template: &Transaction,
    key: MonthKey,
    recurring_id: &str,
) -> Vec<(NaiveDate, Transaction)> {
    let Some(pattern) = template.recurrence.as_ref() else {
        return Vec::new();
    };
    occurrences_in_month(pattern, key)
        .into_iter()
        .map(|date| {
            let tx = Transaction {
                id: occurrence_id(recurring_id, date),
                kind: template.kind,
                description: template.description.clone(),
                amount: template.amount,
                category: template.category.clone(),
                created_at: template.created_at,
                recurrence: None,
                parent_recurring_id: Some(recurring_id.to_string()),
                metadata: template.metadata.clone(),
            };
            (date, tx)
        })
        .collect()
}
