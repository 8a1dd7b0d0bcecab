// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::models::{NewTransaction, RecurrencePattern, TransactionUpdate};
use crate::store::LedgerStore;
use crate::utils::{parse_date, parse_decimal, parse_month};

/// Returns whether the store was mutated and should be saved.
pub fn handle(store: &mut LedgerStore, m: &clap::ArgMatches) -> Result<bool> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub),
        Some(("edit", sub)) => edit(store, sub),
        Some(("rm", sub)) => rm(store, sub),
        _ => Ok(false),
    }
}

/// Parse the recurrence flags into a validated pattern, when present.
/// Pattern shape is the caller's responsibility: the store does not
/// re-validate.
pub fn pattern_from_args(sub: &clap::ArgMatches) -> Result<Option<RecurrencePattern>> {
    let Some(freq) = sub.get_one::<String>("recur") else {
        return Ok(None);
    };
    let start = sub
        .get_one::<String>("start")
        .ok_or_else(|| anyhow::anyhow!("--recur requires --start"))?;
    let pattern = RecurrencePattern {
        frequency: freq.parse()?,
        start_date: parse_date(start)?,
        end_date: sub.get_one::<String>("end").map(|s| parse_date(s)).transpose()?,
        day_of_month: sub.get_one::<u32>("day-of-month").copied(),
        use_last_day_of_month: sub.get_flag("last-day"),
    };
    pattern.validate()?;
    Ok(Some(pattern))
}

fn metadata_from_args(sub: &clap::ArgMatches) -> Result<BTreeMap<String, serde_json::Value>> {
    let mut meta = BTreeMap::new();
    if let Some(pairs) = sub.get_many::<String>("meta") {
        for pair in pairs {
            let (k, v) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Invalid --meta '{}', expected KEY=VALUE", pair))?;
            meta.insert(k.to_string(), serde_json::Value::String(v.to_string()));
        }
    }
    Ok(meta)
}

fn add(store: &mut LedgerStore, sub: &clap::ArgMatches) -> Result<bool> {
    let key = parse_month(sub.get_one::<String>("month").unwrap())?;
    let day = *sub.get_one::<u32>("day").unwrap();
    let recurrence = pattern_from_args(sub)?;
    let recurring = recurrence.is_some();

    let new = NewTransaction {
        kind: sub.get_one::<String>("kind").unwrap().parse()?,
        description: sub.get_one::<String>("description").unwrap().clone(),
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        category: sub.get_one::<String>("category").cloned(),
        recurrence,
        metadata: metadata_from_args(sub)?,
    };
    let id = store.add_transaction(key, day, new)?;
    if recurring {
        println!("Registered recurring template {}", id);
    } else {
        println!("Added transaction {} on {} day {}", id, key, day);
    }
    Ok(true)
}

fn edit(store: &mut LedgerStore, sub: &clap::ArgMatches) -> Result<bool> {
    let key = parse_month(sub.get_one::<String>("month").unwrap())?;
    let day = *sub.get_one::<u32>("day").unwrap();
    let id = sub.get_one::<String>("id").unwrap();

    let update = TransactionUpdate {
        kind: sub.get_one::<String>("kind").map(|s| s.parse()).transpose()?,
        description: sub.get_one::<String>("description").cloned(),
        amount: sub
            .get_one::<String>("amount")
            .map(|s| parse_decimal(s))
            .transpose()?,
        category: sub.get_one::<String>("category").map(|c| Some(c.clone())),
        recurrence: None,
    };
    store.update_transaction(key, day, id, update)?;
    println!("Updated transaction {}", id);
    Ok(true)
}

fn rm(store: &mut LedgerStore, sub: &clap::ArgMatches) -> Result<bool> {
    let key = parse_month(sub.get_one::<String>("month").unwrap())?;
    let day = *sub.get_one::<u32>("day").unwrap();
    let id = sub.get_one::<String>("id").unwrap();
    store.delete_transaction(key, day, id)?;
    println!("Deleted transaction {}", id);
    Ok(true)
}
