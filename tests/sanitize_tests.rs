// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashline::sanitize;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

#[test]
fn floats_always_come_out_finite() {
    assert_eq!(sanitize::safe_f64(f64::NAN), Decimal::ZERO);
    assert_eq!(sanitize::safe_f64(f64::INFINITY), Decimal::ZERO);
    assert_eq!(sanitize::safe_f64(f64::NEG_INFINITY), Decimal::ZERO);
    assert_eq!(sanitize::safe_f64(42.5), d("42.5"));
    assert_eq!(sanitize::safe_f64(-0.01), d("-0.01"));
}

#[test]
fn strings_degrade_to_zero_never_panic() {
    assert_eq!(sanitize::parse_loose("abc"), Decimal::ZERO);
    assert_eq!(sanitize::parse_loose(""), Decimal::ZERO);
    assert_eq!(sanitize::parse_loose("   "), Decimal::ZERO);
    assert_eq!(sanitize::parse_loose("--5"), Decimal::ZERO);
    assert_eq!(sanitize::parse_loose("1.2.3"), Decimal::ZERO);
}

#[test]
fn comma_is_a_decimal_separator() {
    assert_eq!(sanitize::parse_loose("1234,56"), d("1234.56"));
    assert_eq!(sanitize::parse_loose("R$ 99,90"), d("99.90"));
    assert_eq!(sanitize::parse_loose("-42.5"), d("-42.5"));
    assert_eq!(sanitize::parse_loose("  1000 "), d("1000"));
}

#[test]
fn input_ceiling_resets_to_zero() {
    assert_eq!(sanitize::safe_decimal(d("1000000000")), Decimal::ZERO);
    assert_eq!(sanitize::safe_decimal(d("-1000000000")), Decimal::ZERO);
    assert_eq!(sanitize::safe_decimal(d("999999999")), d("999999999"));
    assert_eq!(sanitize::parse_loose("9999999999"), Decimal::ZERO);
}

#[test]
fn per_field_cap_clamps_with_sign() {
    assert_eq!(sanitize::clamp_value(d("20000000")), d("10000000"));
    assert_eq!(sanitize::clamp_value(d("-20000000")), d("-10000000"));
    assert_eq!(sanitize::clamp_value(d("10000000")), d("10000000"));
    assert_eq!(sanitize::clamp_value(d("9999.99")), d("9999.99"));
}
