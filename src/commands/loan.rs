// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::calc;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};

pub fn handle(sub: &clap::ArgMatches) -> Result<()> {
    let installment = parse_decimal(sub.get_one::<String>("installment").unwrap())?;
    let total = parse_decimal(sub.get_one::<String>("total").unwrap())?;
    let paid = parse_decimal(sub.get_one::<String>("paid").unwrap())?;

    let snapshot = calc::loan_snapshot(installment, total, paid);

    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    if maybe_print_json(json_flag, jsonl_flag, &snapshot)? {
        return Ok(());
    }
    println!(
        "{}",
        pretty_table(
            &["Total loan", "Paid", "Remaining"],
            vec![vec![
                fmt_money(&snapshot.total_loan_amount),
                fmt_money(&snapshot.total_paid),
                fmt_money(&snapshot.total_remaining),
            ]],
        )
    );
    Ok(())
}
