// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use cashline::{cli, commands, persist};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut store = persist::load_or_init()?;

    match matches.subcommand() {
        Some(("init", _)) => {
            persist::save(&store)?;
            println!("Ledger initialized at {}", persist::data_path()?.display());
        }
        Some(("month", sub)) => {
            if commands::month::handle(&mut store, sub)? {
                persist::save(&store)?;
            }
        }
        Some(("tx", sub)) => {
            if commands::tx::handle(&mut store, sub)? {
                persist::save(&store)?;
            }
        }
        Some(("recurring", sub)) => {
            if commands::recurring::handle(&mut store, sub)? {
                persist::save(&store)?;
            }
        }
        Some(("loan", sub)) => commands::loan::handle(sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&store)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
