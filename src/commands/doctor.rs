// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::store::{LedgerStore, month_is_corrupted};
use crate::utils::{fmt_money, pretty_table};

/// Read-only health scan. Quarantine itself only ever happens inside the
/// store; this just tells the user what it would act on.
pub fn handle(store: &LedgerStore) -> Result<()> {
    let mut rows = Vec::new();

    // 1) Months beyond the corruption ceiling (would be quarantined on access)
    for (key, ledger) in store.months() {
        if month_is_corrupted(ledger) {
            rows.push(vec![
                "corrupted_month".into(),
                format!("{} final balance {}", key, fmt_money(&ledger.totals.final_balance)),
            ]);
        }
    }

    // 2) Months beyond the advisory anomaly threshold
    for (key, balance) in store.anomalous_months() {
        rows.push(vec![
            "unusual_balance".into(),
            format!("{} final balance {}", key, fmt_money(&balance)),
        ]);
    }

    // 3) Occurrences whose template no longer exists
    for (key, ledger) in store.months() {
        for entry in &ledger.entries {
            for tx in &entry.transactions {
                if let Some(parent) = &tx.parent_recurring_id {
                    if !store.templates().contains_key(parent) {
                        rows.push(vec![
                            "orphaned_occurrence".into(),
                            format!("{} day {} tx {}", key, entry.day, tx.id),
                        ]);
                    }
                }
            }
        }
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
