// Copyright (c) 2025 Cashline contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;

use cashline::error::LedgerError;
use cashline::models::{
    DayField, Frequency, MonthTotals, MonthlyLedger, NewTransaction, RecurrencePattern,
    TransactionKind, TransactionUpdate,
};
use cashline::monthkey::MonthKey;
use cashline::store::LedgerStore;
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn key(s: &str) -> MonthKey {
    s.parse().unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn new_tx(kind: TransactionKind, description: &str, amount: &str) -> NewTransaction {
    NewTransaction::new(kind, description, d(amount))
}

fn monthly_pattern(start: &str, day_of_month: u32) -> RecurrencePattern {
    RecurrencePattern {
        frequency: Frequency::Monthly,
        start_date: date(start),
        end_date: None,
        day_of_month: Some(day_of_month),
        use_last_day_of_month: false,
    }
}

#[test]
fn ensure_month_builds_a_full_zeroed_month() {
    let mut store = LedgerStore::new();
    store.ensure_month(key("2025-02"));
    let ledger = store.get_month(key("2025-02")).unwrap();
    assert_eq!(ledger.entries.len(), 28);
    assert_eq!(ledger.display_name, "February 2025");
    assert!(ledger.totals.final_balance.is_zero());
}

#[test]
fn set_day_field_updates_balances_and_totals() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    store.set_day_field(jan, 1, DayField::Inflow, d("1000")).unwrap();
    store.set_day_field(jan, 2, DayField::Outflow, d("300")).unwrap();
    store.set_day_field(jan, 2, DayField::DailyExpense, d("50")).unwrap();

    let ledger = store.get_month(jan).unwrap();
    assert_eq!(ledger.entries[0].balance, d("1000"));
    assert_eq!(ledger.entries[1].balance, d("650"));
    assert_eq!(ledger.entries[30].balance, d("650"));
    assert_eq!(ledger.totals.total_inflow, d("1000"));
    assert_eq!(ledger.totals.total_outflow, d("300"));
    assert_eq!(ledger.totals.final_balance, d("650"));
}

#[test]
fn final_balance_carries_into_the_next_month() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    let feb = key("2025-02");
    store.ensure_month(jan);
    store.ensure_month(feb);

    store.set_day_field(jan, 10, DayField::Inflow, d("2500")).unwrap();

    assert_eq!(store.initial_balance(feb), d("2500"));
    let feb_ledger = store.get_month(feb).unwrap();
    assert_eq!(feb_ledger.entries[0].balance, d("2500"));
    assert_eq!(feb_ledger.totals.final_balance, d("2500"));
}

#[test]
fn cascade_stops_at_a_month_gap() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    let mar = key("2025-03");
    store.ensure_month(jan);
    store.ensure_month(mar);

    store.set_day_field(jan, 1, DayField::Inflow, d("400")).unwrap();

    // February does not exist, so March keeps its own chain (initial 0).
    assert!(store.get_month(key("2025-02")).is_none());
    assert!(store.get_month(mar).unwrap().totals.final_balance.is_zero());
}

#[test]
fn series_mutations_recompute_months_beyond_a_gap() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    let mar = key("2025-03");
    store.ensure_month(jan);
    store.ensure_month(mar);

    let mut new = new_tx(TransactionKind::Outflow, "Gym", "50");
    new.recurrence = Some(monthly_pattern("2025-01-10", 10));
    let rec_id = store.add_transaction(jan, 10, new).unwrap();

    // March sits past the February gap, so its own chain starts at zero,
    // but its totals and balances must still reflect the new occurrence.
    let mar_ledger = store.get_month(mar).unwrap();
    assert_eq!(mar_ledger.entries[9].outflow, d("50"));
    assert_eq!(mar_ledger.entries[9].balance, d("-50"));
    assert_eq!(mar_ledger.totals.total_outflow, d("50"));
    assert_eq!(mar_ledger.totals.final_balance, d("-50"));
    assert_eq!(store.get_month(jan).unwrap().totals.final_balance, d("-50"));

    // Stripping the series recomputes past the gap too.
    store.delete_recurring_series(&rec_id).unwrap();
    let mar_ledger = store.get_month(mar).unwrap();
    assert!(mar_ledger.entries[9].transactions.is_empty());
    assert!(mar_ledger.totals.total_outflow.is_zero());
    assert!(mar_ledger.totals.final_balance.is_zero());
}

#[test]
fn over_ceiling_month_halts_the_cascade_into_its_successor() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    let feb = key("2025-02");
    store.set_day_field(feb, 1, DayField::Inflow, d("100")).unwrap();

    // Opposite-sign extremes on the last day: each field is within the
    // per-field cap, but the day's net flow ends beyond the balance
    // ceiling even after the carry-in drop.
    store
        .set_day_field(jan, 31, DayField::Inflow, d("10000000"))
        .unwrap();
    store
        .set_day_field(jan, 31, DayField::Outflow, d("-10000000"))
        .unwrap();
    assert_eq!(store.get_month(jan).unwrap().totals.final_balance, d("20000000"));

    // February keeps its own chain instead of inheriting the bad carry.
    let feb_ledger = store.get_month(feb).unwrap();
    assert_eq!(feb_ledger.entries[0].balance, d("100"));
    assert_eq!(feb_ledger.totals.final_balance, d("100"));
}

#[test]
fn direct_write_is_rejected_once_the_day_has_transactions() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    store
        .add_transaction(jan, 5, new_tx(TransactionKind::Inflow, "Salary", "3000"))
        .unwrap();

    let err = store
        .set_day_field(jan, 5, DayField::Inflow, d("1"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::DayHasTransactions { day: 5, .. }));

    // The derived value is untouched.
    let entry = &store.get_month(jan).unwrap().entries[4];
    assert_eq!(entry.inflow, d("3000"));
}

#[test]
fn day_out_of_range_is_an_error() {
    let mut store = LedgerStore::new();
    let feb = key("2025-02");
    let err = store
        .set_day_field(feb, 30, DayField::Inflow, d("1"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::DayOutOfRange { day: 30, max: 28, .. }));
}

#[test]
fn transaction_lifecycle_rederives_day_fields() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    let id1 = store
        .add_transaction(jan, 3, new_tx(TransactionKind::Outflow, "Rent", "900"))
        .unwrap();
    let _id2 = store
        .add_transaction(jan, 3, new_tx(TransactionKind::Outflow, "Internet", "60"))
        .unwrap();

    let entry = &store.get_month(jan).unwrap().entries[2];
    assert_eq!(entry.outflow, d("960"));
    assert_eq!(entry.balance, d("-960"));

    store
        .update_transaction(
            jan,
            3,
            &id1,
            TransactionUpdate {
                amount: Some(d("950")),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(store.get_month(jan).unwrap().entries[2].outflow, d("1010"));

    store.delete_transaction(jan, 3, &id1).unwrap();
    let entry = &store.get_month(jan).unwrap().entries[2];
    assert_eq!(entry.outflow, d("60"));
    assert_eq!(entry.transactions.len(), 1);

    let missing = store.delete_transaction(jan, 3, &id1).unwrap_err();
    assert!(matches!(missing, LedgerError::TransactionNotFound(_)));
}

#[test]
fn oversized_input_is_clamped_before_propagation() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    store
        .set_day_field(jan, 1, DayField::Inflow, d("20000000"))
        .unwrap();
    let entry = &store.get_month(jan).unwrap().entries[0];
    assert_eq!(entry.inflow, d("10000000"));
    assert_eq!(entry.balance, d("10000000"));
}

#[test]
fn corrupted_previous_month_is_quarantined_on_lookup() {
    let jan = key("2025-01");
    let mut entries = cashline::calc::build_empty_month(jan);
    entries[30].balance = d("50000000");
    let ledger = MonthlyLedger {
        month: jan,
        display_name: jan.display_name(),
        entries,
        totals: MonthTotals {
            total_inflow: Decimal::ZERO,
            total_outflow: Decimal::ZERO,
            final_balance: d("50000000"),
        },
    };
    let mut months = BTreeMap::new();
    months.insert(jan, ledger);
    let mut store = LedgerStore::from_parts(months, BTreeMap::new());

    assert_eq!(store.initial_balance(key("2025-02")), Decimal::ZERO);
    assert!(store.get_month(jan).is_none());
}

#[test]
fn stored_corrupted_month_is_repropagated_on_revisit() {
    let jan = key("2025-01");
    let feb = key("2025-02");

    let mut jan_entries = cashline::calc::build_empty_month(jan);
    jan_entries[0].inflow = d("100");
    for e in jan_entries.iter_mut() {
        e.balance = d("100");
    }
    let jan_ledger = MonthlyLedger {
        month: jan,
        display_name: jan.display_name(),
        entries: jan_entries,
        totals: MonthTotals {
            total_inflow: d("100"),
            total_outflow: Decimal::ZERO,
            final_balance: d("100"),
        },
    };

    // February's flow fields are sane but its stored balances are garbage.
    let mut feb_entries = cashline::calc::build_empty_month(feb);
    feb_entries[0].inflow = d("50");
    feb_entries[0].balance = d("99999999");
    let feb_ledger = MonthlyLedger {
        month: feb,
        display_name: feb.display_name(),
        entries: feb_entries,
        totals: MonthTotals {
            total_inflow: d("50"),
            total_outflow: Decimal::ZERO,
            final_balance: d("99999999"),
        },
    };

    let mut months = BTreeMap::new();
    months.insert(jan, jan_ledger);
    months.insert(feb, feb_ledger);
    let mut store = LedgerStore::from_parts(months, BTreeMap::new());

    store.ensure_month(feb);

    // Re-propagated from January's healthy final balance; January untouched.
    let feb_ledger = store.get_month(feb).unwrap();
    assert_eq!(feb_ledger.entries[0].balance, d("150"));
    assert_eq!(feb_ledger.totals.final_balance, d("150"));
    assert_eq!(store.get_month(jan).unwrap().totals.final_balance, d("100"));
}

#[test]
fn recurring_add_registers_a_template_and_materializes_existing_months() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    let feb = key("2025-02");
    store.ensure_month(feb);

    let mut new = new_tx(TransactionKind::Outflow, "Gym", "49.90");
    new.recurrence = Some(monthly_pattern("2025-01-10", 10));
    let rec_id = store.add_transaction(jan, 10, new).unwrap();

    assert_eq!(store.recurring_templates().len(), 1);

    // The originating day got its occurrence via materialization, tagged to
    // the template; no template transaction sits in the ledger itself.
    let jan_entry = &store.get_month(jan).unwrap().entries[9];
    assert_eq!(jan_entry.transactions.len(), 1);
    assert_eq!(
        jan_entry.transactions[0].parent_recurring_id.as_deref(),
        Some(rec_id.as_str())
    );
    assert!(jan_entry.transactions[0].recurrence.is_none());

    // February existed already, so it was materialized too.
    let feb_entry = &store.get_month(feb).unwrap().entries[9];
    assert_eq!(feb_entry.transactions.len(), 1);
    assert_eq!(feb_entry.outflow, d("49.90"));

    // Balances flow across both months.
    assert_eq!(store.get_month(jan).unwrap().totals.final_balance, d("-49.90"));
    assert_eq!(store.get_month(feb).unwrap().totals.final_balance, d("-99.80"));
}

#[test]
fn new_months_materialize_overlapping_templates_on_creation() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    let mut new = new_tx(TransactionKind::Inflow, "Salary", "3000");
    new.recurrence = Some(monthly_pattern("2025-01-05", 5));
    store.add_transaction(jan, 5, new).unwrap();

    store.ensure_month(key("2025-03"));
    let mar_entry = &store.get_month(key("2025-03")).unwrap().entries[4];
    assert_eq!(mar_entry.transactions.len(), 1);
    assert_eq!(mar_entry.inflow, d("3000"));
}

#[test]
fn materialization_is_idempotent() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    let mut new = new_tx(TransactionKind::Outflow, "Streaming", "12");
    new.recurrence = Some(monthly_pattern("2025-01-20", 20));
    let rec_id = store.add_transaction(jan, 20, new).unwrap();

    store.ensure_month(jan);
    store.ensure_month(jan);
    // A no-op template update strips and regenerates the series too.
    store
        .update_recurring_template(&rec_id, TransactionUpdate::default())
        .unwrap();

    let entry = &store.get_month(jan).unwrap().entries[19];
    assert_eq!(entry.transactions.len(), 1);
    assert_eq!(entry.outflow, d("12"));
}

#[test]
fn deleting_a_series_strips_occurrences_and_recomputes() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    let feb = key("2025-02");
    store.ensure_month(feb);

    let mut new = new_tx(TransactionKind::Outflow, "Gym", "50");
    new.recurrence = Some(monthly_pattern("2025-01-10", 10));
    let rec_id = store.add_transaction(jan, 10, new).unwrap();
    assert_eq!(store.get_month(feb).unwrap().totals.final_balance, d("-100"));

    store.delete_recurring_series(&rec_id).unwrap();
    assert!(store.recurring_templates().is_empty());
    assert!(store.get_month(jan).unwrap().entries[9].transactions.is_empty());
    assert!(store.get_month(jan).unwrap().totals.final_balance.is_zero());
    assert!(store.get_month(feb).unwrap().totals.final_balance.is_zero());

    let missing = store.delete_recurring_series(&rec_id).unwrap_err();
    assert!(matches!(missing, LedgerError::TemplateNotFound(_)));
}

#[test]
fn template_update_regenerates_every_occurrence() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    let feb = key("2025-02");
    store.ensure_month(feb);

    let mut new = new_tx(TransactionKind::Outflow, "Insurance", "80");
    new.recurrence = Some(monthly_pattern("2025-01-10", 10));
    let rec_id = store.add_transaction(jan, 10, new).unwrap();

    store
        .update_recurring_template(
            &rec_id,
            TransactionUpdate {
                amount: Some(d("95")),
                recurrence: Some(monthly_pattern("2025-01-10", 20)),
                ..Default::default()
            },
        )
        .unwrap();

    // Old anchor day vacated, new anchor day populated, in both months.
    // January keeps the start date itself as its occurrence.
    let jan_ledger = store.get_month(jan).unwrap();
    assert_eq!(jan_ledger.entries[9].transactions.len(), 1);
    assert_eq!(jan_ledger.entries[9].outflow, d("95"));
    let feb_ledger = store.get_month(feb).unwrap();
    assert!(feb_ledger.entries[9].transactions.is_empty());
    assert_eq!(feb_ledger.entries[19].outflow, d("95"));
    assert_eq!(feb_ledger.totals.final_balance, d("-190"));
}

#[test]
fn provenance_metadata_round_trips_untouched() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    let mut new = new_tx(TransactionKind::Outflow, "Card invoice", "420");
    new.metadata.insert(
        "creditCardId".into(),
        serde_json::Value::String("cc-7".into()),
    );
    new.metadata
        .insert("isConsolidatedInvoice".into(), serde_json::Value::Bool(true));
    let id = store.add_transaction(jan, 15, new).unwrap();

    let tx = store.get_month(jan).unwrap().entries[14]
        .transactions
        .iter()
        .find(|t| t.id == id)
        .unwrap();
    assert_eq!(
        tx.metadata.get("creditCardId"),
        Some(&serde_json::Value::String("cc-7".into()))
    );
    assert_eq!(
        tx.metadata.get("isConsolidatedInvoice"),
        Some(&serde_json::Value::Bool(true))
    );
}

#[test]
fn as_of_totals_do_not_mutate_the_ledger() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    store.set_day_field(jan, 1, DayField::Inflow, d("100")).unwrap();
    store.set_day_field(jan, 20, DayField::Inflow, d("100")).unwrap();

    let t = store.totals_up_to_day(jan, 10).unwrap();
    assert_eq!(t.total_inflow, d("100"));
    assert_eq!(t.final_balance, d("100"));
    assert_eq!(store.get_month(jan).unwrap().totals.total_inflow, d("200"));
}

#[test]
fn anomalous_months_are_reported_not_touched() {
    let mut store = LedgerStore::new();
    let jan = key("2025-01");
    store
        .set_day_field(jan, 1, DayField::Inflow, d("250000"))
        .unwrap();

    let anomalies = store.anomalous_months();
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].0, jan);
    assert_eq!(anomalies[0].1, d("250000"));
    // Still present, still intact.
    assert_eq!(store.get_month(jan).unwrap().totals.final_balance, d("250000"));
}
