// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistence of the ledger as a schema-versioned JSON blob in the platform
//! data directory. The current-month cursor is deliberately not part of the
//! blob; it is re-derived as today's month on every load.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::models::{MonthlyLedger, Transaction};
use crate::monthkey::MonthKey;
use crate::store::{LedgerStore, month_is_corrupted};

pub const SCHEMA_VERSION: u32 = 2;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("dev.cashline", "Cashline", "cashline"));

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateBlob {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub months: BTreeMap<MonthKey, MonthlyLedger>,
    #[serde(default)]
    pub recurring_templates: BTreeMap<String, Transaction>,
}

pub fn data_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("cashline.json"))
}

/// One-time migration on load: quarantine months whose stored balances are
/// beyond the corruption ceiling, and stamp the current schema version.
/// Missing `transactions` arrays on legacy entries are backfilled to empty
/// lists by deserialization defaults before this runs.
pub fn migrate(mut blob: StateBlob) -> StateBlob {
    blob.months.retain(|key, ledger| {
        if month_is_corrupted(ledger) {
            error!(month = %key, final_balance = %ledger.totals.final_balance,
                "dropping corrupted month during migration");
            false
        } else {
            true
        }
    });
    blob.schema_version = SCHEMA_VERSION;
    blob
}

pub fn load_from(path: &Path) -> Result<LedgerStore> {
    if !path.exists() {
        return Ok(LedgerStore::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Read ledger state at {}", path.display()))?;
    let blob: StateBlob = serde_json::from_str(&raw)
        .with_context(|| format!("Parse ledger state at {}", path.display()))?;
    let blob = migrate(blob);
    Ok(LedgerStore::from_parts(blob.months, blob.recurring_templates))
}

pub fn save_to(store: &LedgerStore, path: &Path) -> Result<()> {
    let blob = StateBlob {
        schema_version: SCHEMA_VERSION,
        months: store.months().clone(),
        recurring_templates: store.templates().clone(),
    };
    let raw = serde_json::to_string_pretty(&blob)?;
    fs::write(path, raw).with_context(|| format!("Write ledger state at {}", path.display()))?;
    Ok(())
}

pub fn load_or_init() -> Result<LedgerStore> {
    load_from(&data_path()?)
}

pub fn save(store: &LedgerStore) -> Result<()> {
    save_to(store, &data_path()?)
}
