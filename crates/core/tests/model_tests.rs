use chrono::NaiveDate;
use fund_ledger_core::errors::CoreError;
use fund_ledger_core::models::calendar::CalendarDay;
use fund_ledger_core::models::client::{find_client, Client};
use fund_ledger_core::models::ledger::RawLedgerState;
use fund_ledger_core::models::movement::{Movement, MovementField};
use fund_ledger_core::models::settings::Settings;
use fund_ledger_core::models::snapshot::{ClientDayRow, DailyRow, Snapshot};
use fund_ledger_core::models::twr::TwrRow;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
//  Movement
// ═══════════════════════════════════════════════════════════════════

mod movement {
    use super::*;

    #[test]
    fn default_is_empty() {
        assert!(Movement::default().is_empty());
    }

    #[test]
    fn zero_increment_is_not_empty() {
        let m = Movement::deposit(0.0);
        assert!(!m.is_empty());
        assert_eq!(m.increment, Some(0.0));
    }

    #[test]
    fn net_treats_missing_sides_as_zero() {
        assert_eq!(Movement::deposit(100.0).net(), 100.0);
        assert_eq!(Movement::withdrawal(40.0).net(), -40.0);
        assert_eq!(Movement::new(Some(100.0), Some(40.0)).net(), 60.0);
    }

    #[test]
    fn get_and_set_by_field() {
        let mut m = Movement::default();
        m.set(MovementField::Decrement, Some(5.0));
        assert_eq!(m.get(MovementField::Decrement), Some(5.0));
        assert_eq!(m.get(MovementField::Increment), None);
        m.set(MovementField::Decrement, None);
        assert!(m.is_empty());
    }

    #[test]
    fn field_display() {
        assert_eq!(MovementField::Increment.to_string(), "increment");
        assert_eq!(MovementField::Decrement.to_string(), "decrement");
    }

    #[test]
    fn serde_keeps_absent_distinct_from_zero() {
        let json = serde_json::to_string(&Movement::deposit(0.0)).unwrap();
        let back: Movement = serde_json::from_str(&json).unwrap();
        assert_eq!(back.increment, Some(0.0));
        assert_eq!(back.decrement, None);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Client
// ═══════════════════════════════════════════════════════════════════

mod client {
    use super::*;

    #[test]
    fn new_trims_id() {
        let c = Client::new("  alice ", "Alice");
        assert_eq!(c.id, "alice");
    }

    #[test]
    fn equality_ignores_name() {
        assert_eq!(Client::new("a", "Alice"), Client::new("a", "Alice Smith"));
        assert_ne!(Client::new("a", "Alice"), Client::new("b", "Alice"));
    }

    #[test]
    fn find_in_roster() {
        let roster = vec![Client::new("a", "Alice"), Client::new("b", "Bob")];
        assert_eq!(find_client(&roster, "b").map(|c| c.name.as_str()), Some("Bob"));
        assert!(find_client(&roster, "z").is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  RawLedgerState
// ═══════════════════════════════════════════════════════════════════

mod raw_ledger_state {
    use super::*;

    #[test]
    fn empty_by_default() {
        let s = RawLedgerState::new();
        assert!(s.is_empty());
        assert_eq!(s.last_recorded_final_day(), None);
        assert_eq!(s.movement_count(), 0);
    }

    #[test]
    fn last_recorded_final_day_is_max_date() {
        let mut s = RawLedgerState::new();
        s.final_by_day.insert(d(2025, 3, 1), 10.0);
        s.final_by_day.insert(d(2025, 1, 5), 10.0);
        assert_eq!(s.last_recorded_final_day(), Some(d(2025, 3, 1)));
    }

    #[test]
    fn nan_close_is_ignored() {
        let mut s = RawLedgerState::new();
        s.final_by_day.insert(d(2025, 1, 5), 10.0);
        s.final_by_day.insert(d(2025, 2, 5), f64::NAN);
        assert_eq!(s.last_recorded_final_day(), Some(d(2025, 1, 5)));
        assert_eq!(s.recorded_final(d(2025, 2, 5)), None);
    }

    #[test]
    fn zero_close_is_recorded() {
        let mut s = RawLedgerState::new();
        s.final_by_day.insert(d(2025, 1, 5), 0.0);
        assert_eq!(s.recorded_final(d(2025, 1, 5)), Some(0.0));
    }

    #[test]
    fn movement_lookup() {
        let mut s = RawLedgerState::new();
        s.movements_by_client
            .entry("a".into())
            .or_default()
            .insert(d(2025, 1, 2), Movement::deposit(50.0));
        assert_eq!(s.movement("a", d(2025, 1, 2)), Some(&Movement::deposit(50.0)));
        assert!(s.movement("a", d(2025, 1, 3)).is_none());
        assert!(s.movement("b", d(2025, 1, 2)).is_none());
        assert_eq!(s.client_ids().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(s.movement_count(), 1);
    }

    #[test]
    fn json_roundtrip() {
        let mut s = RawLedgerState::new();
        s.final_by_day.insert(d(2025, 1, 2), 1000.0);
        s.movements_by_client
            .entry("a".into())
            .or_default()
            .insert(d(2025, 1, 2), Movement::new(Some(1.0), Some(2.0)));
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("2025-01-02"));
        let back: RawLedgerState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn missing_fields_deserialize_to_empty() {
        let s: RawLedgerState = serde_json::from_str("{}").unwrap();
        assert!(s.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.year, 2025);
        assert!(s.clients.is_empty());
        assert_eq!(s.autosave_debounce_ms, 1000);
        assert_eq!(s.debounce(), std::time::Duration::from_secs(1));
    }

    #[test]
    fn from_json_fills_defaults() {
        let s = Settings::from_json(r#"{"clients":[{"id":"a","name":"Alice"}]}"#).unwrap();
        assert_eq!(s.year, 2025);
        assert_eq!(s.clients.len(), 1);
        assert_eq!(s.autosave_debounce_ms, 1000);
    }

    #[test]
    fn from_json_rejects_garbage() {
        let err = Settings::from_json("nope").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn rejects_year_out_of_range() {
        let err = Settings::new(1800, vec![]).validate().unwrap_err();
        assert!(matches!(err, CoreError::Config(ref m) if m.contains("1800")));
    }

    #[test]
    fn rejects_duplicate_client_ids() {
        let s = Settings::new(2025, vec![Client::new("a", "A"), Client::new("a", "B")]);
        assert!(matches!(s.validate(), Err(CoreError::Config(_))));
    }

    #[test]
    fn rejects_empty_client_id() {
        let s = Settings::new(2025, vec![Client::new("  ", "Nobody")]);
        assert!(matches!(s.validate(), Err(CoreError::Config(_))));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Calendar / Snapshot / TWR rows
// ═══════════════════════════════════════════════════════════════════

mod rows {
    use super::*;

    fn daily(initial: Option<f64>, final_balance: Option<f64>) -> DailyRow {
        DailyRow {
            iso: d(2025, 1, 2),
            label: "02 Jan".into(),
            weekday: "Thursday".into(),
            is_weekend: false,
            increment: Some(300.0),
            decrement: Some(100.0),
            initial,
            final_balance,
            profit: None,
            profit_pct: None,
            cumulative_profit: None,
        }
    }

    #[test]
    fn calendar_day_month_key() {
        let day = CalendarDay {
            iso: d(2025, 3, 5),
            label: "05 Mar".into(),
            weekday: "Wednesday".into(),
            is_weekend: false,
        };
        assert_eq!(day.month_key(), "2025-03");
    }

    #[test]
    fn twr_row_from_daily_row() {
        let row = TwrRow::from(&daily(Some(1200.0), Some(1250.0)));
        assert_eq!(row.start_value, Some(1200.0));
        assert_eq!(row.end_value, Some(1250.0));
        assert_eq!(row.flow, 200.0);
        assert_eq!(row.label, "02 Jan");
    }

    #[test]
    fn twr_row_from_client_row() {
        let row = ClientDayRow {
            iso: d(2025, 1, 2),
            label: "02 Jan".into(),
            weekday: "Thursday".into(),
            is_weekend: false,
            increment: None,
            decrement: Some(10.0),
            base_balance: Some(90.0),
            final_balance: Some(95.0),
            profit: Some(5.0),
            profit_pct: None,
            cumulative_profit: Some(5.0),
            share_pct: Some(1.0),
            share_amount: Some(95.0),
        };
        let twr = TwrRow::from(&row);
        assert_eq!(twr.start_value, Some(90.0));
        assert_eq!(twr.end_value, Some(95.0));
        assert_eq!(twr.flow, -10.0);
    }

    #[test]
    fn empty_snapshot_lookups() {
        let s = Snapshot::default();
        assert!(s.day(d(2025, 1, 1)).is_none());
        assert!(s.client_rows("a").is_none());
        assert!(s.client_day("a", d(2025, 1, 1)).is_none());
        assert!(!s.is_beyond_horizon(d(2025, 12, 31)));
    }
}
