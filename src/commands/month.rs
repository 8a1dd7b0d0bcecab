// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::models::DayField;
use crate::sanitize;
use crate::store::LedgerStore;
use crate::utils::{fmt_money, maybe_print_json, parse_month, pretty_table};

/// Returns whether the store was mutated and should be saved.
pub fn handle(store: &mut LedgerStore, m: &clap::ArgMatches) -> Result<bool> {
    match m.subcommand() {
        Some(("show", sub)) => show(store, sub),
        Some(("set", sub)) => set(store, sub),
        _ => Ok(false),
    }
}

fn show(store: &mut LedgerStore, sub: &clap::ArgMatches) -> Result<bool> {
    let key = match sub.get_one::<String>("month") {
        Some(s) => parse_month(s)?,
        None => store.cursor(),
    };
    let existed = store.get_month(key).is_some();
    store.go_to(key);

    let ledger = store
        .get_month(key)
        .ok_or_else(|| anyhow::anyhow!("Month {} unavailable", key))?;

    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    if maybe_print_json(json_flag, jsonl_flag, ledger)? {
        return Ok(!existed);
    }

    let rows: Vec<Vec<String>> = ledger
        .entries
        .iter()
        .map(|e| {
            vec![
                e.day.to_string(),
                fmt_money(&e.inflow),
                fmt_money(&e.outflow),
                fmt_money(&e.daily_expense),
                fmt_money(&e.balance),
                e.transactions.len().to_string(),
            ]
        })
        .collect();
    println!("{}", ledger.display_name);
    println!(
        "{}",
        pretty_table(&["Day", "Inflow", "Outflow", "Expense", "Balance", "Txns"], rows)
    );

    let totals = match sub.get_one::<u32>("as-of-day") {
        Some(day) => {
            let t = store
                .totals_up_to_day(key, *day)
                .unwrap_or_default();
            println!("Totals as of day {}:", day);
            t
        }
        None => ledger.totals,
    };
    println!(
        "Inflow {}  Outflow {}  Final balance {}",
        fmt_money(&totals.total_inflow),
        fmt_money(&totals.total_outflow),
        fmt_money(&totals.final_balance)
    );
    Ok(!existed)
}

fn set(store: &mut LedgerStore, sub: &clap::ArgMatches) -> Result<bool> {
    let key = parse_month(sub.get_one::<String>("month").unwrap())?;
    let day = *sub.get_one::<u32>("day").unwrap();
    let field: DayField = sub.get_one::<String>("field").unwrap().parse()?;
    let value = sanitize::parse_loose(sub.get_one::<String>("value").unwrap());

    store.set_day_field(key, day, field, value)?;
    let balance = store
        .get_month(key)
        .and_then(|l| l.entries.get((day - 1) as usize))
        .map(|e| e.balance)
        .unwrap_or_default();
    println!("Set day {} of {}; balance now {}", day, key, fmt_money(&balance));
    Ok(true)
}
