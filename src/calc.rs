// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The calculation engine: pure functions over daily entries. This module is
//! the only writer of `DailyEntry::balance` and of month totals; the store
//! orchestrates calls but never does balance arithmetic of its own.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::error;

use crate::models::{DailyEntry, LoanSnapshot, MonthTotals, Transaction, TransactionKind};
use crate::monthkey::MonthKey;
use crate::sanitize::{self, BALANCE_CEILING};

/// Round to 2 decimals with the midpoint away from zero, so 0.005 of either
/// sign moves to the next cent. Every monetary figure the engine emits goes
/// through here; banker's rounding would silently shave half-cent midpoints.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Derived flow totals for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayTotals {
    pub inflow: Decimal,
    pub outflow: Decimal,
    pub daily_expense: Decimal,
}

/// Sum a day's transactions by kind, each total rounded to 2 decimals.
pub fn derive_day_totals(transactions: &[Transaction]) -> DayTotals {
    let mut totals = DayTotals::default();
    for tx in transactions {
        match tx.kind {
            TransactionKind::Inflow => totals.inflow += tx.amount,
            TransactionKind::Outflow => totals.outflow += tx.amount,
            TransactionKind::DailyExpense => totals.daily_expense += tx.amount,
        }
    }
    totals.inflow = round_money(totals.inflow);
    totals.outflow = round_money(totals.outflow);
    totals.daily_expense = round_money(totals.daily_expense);
    totals
}

/// One step of the balance recurrence. Inputs pass through the sanitizer so
/// an upstream glitch degrades to zero instead of spreading.
pub fn compute_daily_balance(
    inflow: Decimal,
    outflow: Decimal,
    daily_expense: Decimal,
    previous_balance: Decimal,
) -> Decimal {
    round_money(
        sanitize::safe_decimal(previous_balance) + sanitize::safe_decimal(inflow)
            - sanitize::safe_decimal(outflow)
            - sanitize::safe_decimal(daily_expense),
    )
}

/// Walk a month's entries in day order, carrying the running balance from
/// `initial_balance`. Each flow field is clamped to the per-field cap first.
/// A running balance beyond [`BALANCE_CEILING`] is corruption: the carry-in
/// is dropped for that day (balance = that day's net flow alone) so the bad
/// value stops propagating. Returns fresh entries; the input, including each
/// entry's transaction list, is left untouched.
pub fn propagate_month_balances(entries: &[DailyEntry], initial_balance: Decimal) -> Vec<DailyEntry> {
    let mut running = sanitize::safe_decimal(initial_balance);
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let inflow = sanitize::clamp_value(sanitize::safe_decimal(entry.inflow));
        let outflow = sanitize::clamp_value(sanitize::safe_decimal(entry.outflow));
        let daily_expense = sanitize::clamp_value(sanitize::safe_decimal(entry.daily_expense));

        running = compute_daily_balance(inflow, outflow, daily_expense, running);
        if running.abs() > *BALANCE_CEILING {
            error!(
                day = entry.day,
                balance = %running,
                "running balance beyond ceiling, dropping carry-in for this day"
            );
            running = round_money(inflow - outflow - daily_expense);
        }

        let mut updated = entry.clone();
        updated.inflow = inflow;
        updated.outflow = outflow;
        updated.daily_expense = daily_expense;
        updated.balance = running;
        out.push(updated);
    }
    out
}

/// Month totals. `final_balance` is the last entry's balance verbatim, which
/// is what keeps the ledger invariant checkable.
pub fn aggregate_month_totals(entries: &[DailyEntry]) -> MonthTotals {
    let mut totals = MonthTotals::default();
    for entry in entries {
        totals.total_inflow += entry.inflow;
        totals.total_outflow += entry.outflow;
    }
    totals.total_inflow = round_money(totals.total_inflow);
    totals.total_outflow = round_money(totals.total_outflow);
    totals.final_balance = entries.last().map(|e| e.balance).unwrap_or_default();
    totals
}

/// Same aggregation restricted to `entry.day <= day`, for "as of today"
/// figures without touching stored data.
pub fn totals_up_to_day(entries: &[DailyEntry], day: u32) -> MonthTotals {
    let mut totals = MonthTotals::default();
    let mut last_balance = Decimal::ZERO;
    let mut seen = false;
    for entry in entries.iter().filter(|e| e.day <= day) {
        totals.total_inflow += entry.inflow;
        totals.total_outflow += entry.outflow;
        last_balance = entry.balance;
        seen = true;
    }
    totals.total_inflow = round_money(totals.total_inflow);
    totals.total_outflow = round_money(totals.total_outflow);
    totals.final_balance = if seen { last_balance } else { Decimal::ZERO };
    totals
}

/// Zeroed entries for every calendar day of the month, leap years included.
pub fn build_empty_month(key: MonthKey) -> Vec<DailyEntry> {
    (1..=key.days_in_month()).map(DailyEntry::empty).collect()
}

/// Loan figures from installment terms. Unrelated to balance propagation but
/// held to the same numeric-safety discipline.
pub fn loan_snapshot(
    installment_amount: Decimal,
    total_installments: Decimal,
    paid_installments: Decimal,
) -> LoanSnapshot {
    let installment = sanitize::safe_decimal(installment_amount);
    let total = sanitize::safe_decimal(total_installments);
    let paid = sanitize::safe_decimal(paid_installments);

    let total_loan_amount = round_money(installment * total);
    let total_paid = round_money(installment * paid);
    LoanSnapshot {
        total_loan_amount,
        total_paid,
        total_remaining: total_loan_amount - total_paid,
    }
}
