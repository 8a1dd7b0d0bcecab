// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::commands::tx::pattern_from_args;
use crate::models::{Transaction, TransactionUpdate};
use crate::store::LedgerStore;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};

/// Returns whether the store was mutated and should be saved.
pub fn handle(store: &mut LedgerStore, m: &clap::ArgMatches) -> Result<bool> {
    match m.subcommand() {
        Some(("list", sub)) => list(store, sub),
        Some(("rm", sub)) => rm(store, sub),
        Some(("edit", sub)) => edit(store, sub),
        _ => Ok(false),
    }
}

fn list(store: &LedgerStore, sub: &clap::ArgMatches) -> Result<bool> {
    let templates: Vec<&Transaction> = store.recurring_templates();
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    if maybe_print_json(json_flag, jsonl_flag, &templates)? {
        return Ok(false);
    }

    let rows: Vec<Vec<String>> = templates
        .iter()
        .map(|t| {
            let pattern = t.recurrence.as_ref();
            vec![
                t.id.clone(),
                t.description.clone(),
                fmt_money(&t.amount),
                pattern
                    .map(|p| format!("{:?}", p.frequency).to_lowercase())
                    .unwrap_or_default(),
                pattern.map(|p| p.start_date.to_string()).unwrap_or_default(),
                pattern
                    .and_then(|p| p.end_date)
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".into()),
                pattern
                    .map(|p| {
                        if p.use_last_day_of_month {
                            "last".into()
                        } else {
                            p.day_of_month
                                .map(|d| d.to_string())
                                .unwrap_or_else(|| "-".into())
                        }
                    })
                    .unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Id", "Description", "Amount", "Frequency", "Start", "End", "Anchor"],
            rows,
        )
    );
    Ok(false)
}

fn rm(store: &mut LedgerStore, sub: &clap::ArgMatches) -> Result<bool> {
    let id = sub.get_one::<String>("id").unwrap();
    store.delete_recurring_series(id)?;
    println!("Deleted recurring series {}", id);
    Ok(true)
}

fn edit(store: &mut LedgerStore, sub: &clap::ArgMatches) -> Result<bool> {
    let id = sub.get_one::<String>("id").unwrap();
    let update = TransactionUpdate {
        kind: sub.get_one::<String>("kind").map(|s| s.parse()).transpose()?,
        description: sub.get_one::<String>("description").cloned(),
        amount: sub
            .get_one::<String>("amount")
            .map(|s| parse_decimal(s))
            .transpose()?,
        category: sub.get_one::<String>("category").map(|c| Some(c.clone())),
        recurrence: pattern_from_args(sub)?,
    };
    store.update_recurring_template(id, update)?;
    println!("Updated recurring template {}; occurrences regenerated", id);
    Ok(true)
}
