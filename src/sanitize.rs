// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Numeric intake guards. Every amount entering the ledger crosses one of
//! these functions, so downstream code only ever sees finite, bounded
//! decimals. Nothing here returns an error or panics; bad input degrades to
//! zero (or a signed clamp) with a diagnostic.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::{error, warn};

/// Sanitizer-layer ceiling: magnitudes above this are reset to zero.
pub static INPUT_CEILING: Lazy<Decimal> = Lazy::new(|| Decimal::from(999_999_999_i64));

/// Per-field cap in the mutation/propagation path: values above this are
/// clamped to the signed cap, preserving direction of intent.
pub static VALUE_CAP: Lazy<Decimal> = Lazy::new(|| Decimal::from(10_000_000_i64));

/// Accumulated-balance corruption ceiling. A running balance beyond this is
/// treated as corrupted state, not a large number.
pub static BALANCE_CEILING: Lazy<Decimal> = Lazy::new(|| Decimal::from(10_000_000_i64));

/// Advisory threshold for user-facing anomaly warnings (doctor, warn logs).
/// Never mutates data.
pub static ANOMALY_THRESHOLD: Lazy<Decimal> = Lazy::new(|| Decimal::from(100_000_i64));

/// Bound an already-decimal value: anything beyond [`INPUT_CEILING`] in
/// magnitude is reset to zero, not clamped, because a value that large at
/// the intake layer is garbage rather than intent.
pub fn safe_decimal(value: Decimal) -> Decimal {
    if value.abs() > *INPUT_CEILING {
        error!(%value, "value beyond input ceiling, resetting to 0");
        return Decimal::ZERO;
    }
    value
}

/// Coerce a float: NaN and infinities become zero.
pub fn safe_f64(value: f64) -> Decimal {
    match Decimal::from_f64(value) {
        Some(d) => safe_decimal(d),
        None => {
            warn!(value, "non-finite number coerced to 0");
            Decimal::ZERO
        }
    }
}

/// Loose string parse: keep digits, comma, dot and minus, treat the comma as
/// a decimal separator, and degrade anything unparseable to zero.
pub fn parse_loose(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    match cleaned.parse::<Decimal>() {
        Ok(d) => safe_decimal(d),
        Err(_) => {
            if !raw.trim().is_empty() {
                warn!(raw, "unparseable amount coerced to 0");
            }
            Decimal::ZERO
        }
    }
}

/// Signed clamp at [`VALUE_CAP`]. Runs after input has been accepted, so it
/// preserves the user's direction instead of zeroing.
pub fn clamp_value(value: Decimal) -> Decimal {
    if value.abs() > *VALUE_CAP {
        error!(%value, "value beyond per-field cap, clamping");
        if value.is_sign_negative() {
            -*VALUE_CAP
        } else {
            *VALUE_CAP
        }
    } else {
        value
    }
}
