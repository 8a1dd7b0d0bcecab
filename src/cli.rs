// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn month_arg(required: bool) -> Arg {
    Arg::new("month")
        .long("month")
        .value_name("YYYY-MM")
        .required(required)
}

fn day_arg() -> Arg {
    Arg::new("day")
        .long("day")
        .value_name("1-31")
        .value_parser(clap::value_parser!(u32))
        .required(true)
}

fn recurrence_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("recur")
            .long("recur")
            .value_name("FREQ")
            .help("daily|weekly|biweekly|monthly|quarterly|yearly"),
    )
    .arg(Arg::new("start").long("start").value_name("YYYY-MM-DD"))
    .arg(Arg::new("end").long("end").value_name("YYYY-MM-DD"))
    .arg(
        Arg::new("day-of-month")
            .long("day-of-month")
            .value_name("1-31")
            .value_parser(clap::value_parser!(u32)),
    )
    .arg(
        Arg::new("last-day")
            .long("last-day")
            .action(ArgAction::SetTrue)
            .help("Anchor on the last calendar day of each month"),
    )
}

pub fn build_cli() -> Command {
    Command::new("cashline")
        .version(crate_version!())
        .about("Personal cash-flow ledger: daily balances, recurring transactions, loans")
        .subcommand(Command::new("init").about("Create or locate the ledger data file"))
        .subcommand(
            Command::new("month")
                .about("Show or edit a monthly ledger")
                .subcommand(json_flags(
                    Command::new("show")
                        .about("Daily balances and totals for a month")
                        .arg(month_arg(false))
                        .arg(
                            Arg::new("as-of-day")
                                .long("as-of-day")
                                .value_name("1-31")
                                .value_parser(clap::value_parser!(u32))
                                .help("Totals up to this day only"),
                        ),
                ))
                .subcommand(
                    Command::new("set")
                        .about("Directly set a day's flow field (only while the day has no transactions)")
                        .arg(month_arg(true))
                        .arg(day_arg())
                        .arg(
                            Arg::new("field")
                                .long("field")
                                .value_name("inflow|outflow|expense")
                                .required(true),
                        )
                        .arg(Arg::new("value").long("value").value_name("AMOUNT").required(true)),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Manage transactions")
                .subcommand(recurrence_args(
                    Command::new("add")
                        .about("Add a transaction, or a recurring template with --recur")
                        .arg(month_arg(true))
                        .arg(day_arg())
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .value_name("inflow|outflow|daily-expense")
                                .required(true),
                        )
                        .arg(
                            Arg::new("description")
                                .long("description")
                                .value_name("TEXT")
                                .required(true),
                        )
                        .arg(Arg::new("amount").long("amount").value_name("AMOUNT").required(true))
                        .arg(Arg::new("category").long("category").value_name("NAME"))
                        .arg(
                            Arg::new("meta")
                                .long("meta")
                                .value_name("KEY=VALUE")
                                .action(ArgAction::Append)
                                .help("Opaque provenance tag, repeatable"),
                        ),
                ))
                .subcommand(
                    Command::new("edit")
                        .about("Edit a transaction in place")
                        .arg(month_arg(true))
                        .arg(day_arg())
                        .arg(Arg::new("id").long("id").value_name("ID").required(true))
                        .arg(Arg::new("kind").long("kind").value_name("KIND"))
                        .arg(Arg::new("description").long("description").value_name("TEXT"))
                        .arg(Arg::new("amount").long("amount").value_name("AMOUNT"))
                        .arg(Arg::new("category").long("category").value_name("NAME")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete a transaction")
                        .arg(month_arg(true))
                        .arg(day_arg())
                        .arg(Arg::new("id").long("id").value_name("ID").required(true)),
                ),
        )
        .subcommand(
            Command::new("recurring")
                .about("Manage recurring templates")
                .subcommand(json_flags(Command::new("list").about("List registered templates")))
                .subcommand(
                    Command::new("rm")
                        .about("Delete a template and every materialized occurrence")
                        .arg(Arg::new("id").long("id").value_name("ID").required(true)),
                )
                .subcommand(recurrence_args(
                    Command::new("edit")
                        .about("Update a template and regenerate its occurrences")
                        .arg(Arg::new("id").long("id").value_name("ID").required(true))
                        .arg(Arg::new("kind").long("kind").value_name("KIND"))
                        .arg(Arg::new("description").long("description").value_name("TEXT"))
                        .arg(Arg::new("amount").long("amount").value_name("AMOUNT"))
                        .arg(Arg::new("category").long("category").value_name("NAME")),
                )),
        )
        .subcommand(json_flags(
            Command::new("loan")
                .about("Loan amortization snapshot from installment terms")
                .arg(
                    Arg::new("installment")
                        .long("installment")
                        .value_name("AMOUNT")
                        .required(true),
                )
                .arg(Arg::new("total").long("total").value_name("N").required(true))
                .arg(Arg::new("paid").long("paid").value_name("N").required(true)),
        ))
        .subcommand(Command::new("doctor").about("Scan the ledger for anomalies and corruption"))
}
