// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Typed failures surfaced by the ledger store. Numeric garbage is never an
/// error at this level: the sanitizer degrades it and the store carries on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("day {day} is out of range for {month} (1..={max})")]
    DayOutOfRange { month: String, day: u32, max: u32 },

    #[error("day {day} of {month} has transactions; edit them instead of the field")]
    DayHasTransactions { month: String, day: u32 },

    #[error("transaction '{0}' not found")]
    TransactionNotFound(String),

    #[error("recurring template '{0}' not found")]
    TemplateNotFound(String),

    #[error("invalid recurrence pattern: {0}")]
    InvalidPattern(String),
}
