// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cashline::monthkey::MonthKey;
use chrono::NaiveDate;

fn key(s: &str) -> MonthKey {
    s.parse().unwrap()
}

#[test]
fn parses_and_formats_year_month() {
    let k = key("2025-07");
    assert_eq!(k.year(), 2025);
    assert_eq!(k.month(), 7);
    assert_eq!(k.to_string(), "2025-07");
    assert_eq!(key(" 2025-07 "), k);

    assert!("2025".parse::<MonthKey>().is_err());
    assert!("2025-13".parse::<MonthKey>().is_err());
    assert!("2025-00".parse::<MonthKey>().is_err());
    assert!("abcd-ef".parse::<MonthKey>().is_err());
}

#[test]
fn next_and_previous_cross_year_boundaries() {
    assert_eq!(key("2024-12").next(), key("2025-01"));
    assert_eq!(key("2025-01").previous(), key("2024-12"));
    assert_eq!(key("2025-06").next(), key("2025-07"));
    assert_eq!(key("2025-06").previous(), key("2025-05"));
}

#[test]
fn month_length_accounts_for_leap_years() {
    assert_eq!(key("2025-01").days_in_month(), 31);
    assert_eq!(key("2025-02").days_in_month(), 28);
    assert_eq!(key("2024-02").days_in_month(), 29);
    assert_eq!(key("2100-02").days_in_month(), 28);
    assert_eq!(key("2000-02").days_in_month(), 29);
    assert_eq!(key("2025-04").days_in_month(), 30);
}

#[test]
fn window_and_containment() {
    let k = key("2025-02");
    assert_eq!(k.first_day(), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    assert_eq!(k.last_day(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    assert!(k.contains(NaiveDate::from_ymd_opt(2025, 2, 15).unwrap()));
    assert!(!k.contains(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()));
    assert_eq!(k.display_name(), "February 2025");
}

#[test]
fn keys_order_chronologically() {
    let mut keys = vec![key("2025-02"), key("2024-12"), key("2025-01")];
    keys.sort();
    assert_eq!(keys, vec![key("2024-12"), key("2025-01"), key("2025-02")]);
}

#[test]
fn serde_round_trips_as_a_string() {
    let k = key("2025-09");
    assert_eq!(serde_json::to_string(&k).unwrap(), "\"2025-09\"");
    let back: MonthKey = serde_json::from_str("\"2025-09\"").unwrap();
    assert_eq!(back, k);
}
