use crate::business_hours::BusinessCalendar;
use crate::classify::{classify, elapsed_hours};
use crate::rules::{RuleTable, SlaRule};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use doctrack_common::types::{EntityKind, SlaSeverity};
use std::collections::HashMap;

fn utc_calendar() -> BusinessCalendar {
    // Tests use a UTC calendar so wall times in assertions line up with the
    // 08:00-17:00 window without timezone arithmetic.
    BusinessCalendar::new(chrono_tz::UTC)
}

fn rule(warn: Option<f64>, escalate: Option<f64>) -> SlaRule {
    SlaRule {
        warn_after_hours: warn,
        escalate_after_hours: escalate,
        ..Default::default()
    }
}

// 2026-01-05 is a Monday, 2026-01-09 a Friday.

#[test]
fn business_hours_same_day() {
    let cal = utc_calendar();
    let start = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 1, 5, 11, 30, 0).unwrap();
    assert_eq!(cal.elapsed(start, end), Duration::minutes(150));
}

#[test]
fn business_hours_clamps_to_window_start() {
    let cal = utc_calendar();
    let start = Utc.with_ymd_and_hms(2026, 1, 5, 6, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
    assert_eq!(cal.elapsed(start, end), Duration::hours(1));
}

#[test]
fn business_hours_outside_window_is_zero() {
    let cal = utc_calendar();
    let start = Utc.with_ymd_and_hms(2026, 1, 5, 18, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 1, 5, 22, 0, 0).unwrap();
    assert_eq!(cal.elapsed(start, end), Duration::zero());
}

#[test]
fn business_hours_skip_weekend() {
    let cal = utc_calendar();
    // Friday 16:00 -> Monday 09:00: one hour Friday + one hour Monday.
    let start = Utc.with_ymd_and_hms(2026, 1, 9, 16, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 1, 12, 9, 0, 0).unwrap();
    assert_eq!(cal.elapsed(start, end), Duration::hours(2));
}

#[test]
fn business_hours_skip_holiday() {
    let holiday = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(); // Tuesday
    let cal = utc_calendar().with_holidays([holiday]);
    let start = Utc.with_ymd_and_hms(2026, 1, 5, 16, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 1, 7, 9, 0, 0).unwrap();
    // Monday 16:00-17:00 plus Wednesday 08:00-09:00; Tuesday contributes zero.
    assert_eq!(cal.elapsed(start, end), Duration::hours(2));
}

#[test]
fn business_hours_zero_for_reversed_interval() {
    let cal = utc_calendar();
    let start = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
    let end = start - Duration::hours(3);
    assert_eq!(cal.elapsed(start, end), Duration::zero());
    assert_eq!(cal.elapsed(start, start), Duration::zero());
}

#[test]
fn business_hours_multi_year_span_terminates() {
    let cal = utc_calendar();
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let elapsed = cal.elapsed(start, end);
    // 2024+2025 hold 523 weekdays -> 4707 business hours.
    assert_eq!(elapsed, Duration::hours(4707));
}

#[test]
fn business_hours_default_zone_is_manila() {
    let cal = BusinessCalendar::default();
    // 01:00-03:30 UTC is 09:00-11:30 in Manila (UTC+8) on Monday.
    let start = Utc.with_ymd_and_hms(2026, 1, 5, 1, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 1, 5, 3, 30, 0).unwrap();
    assert_eq!(cal.elapsed(start, end), Duration::minutes(150));
}

#[test]
fn classify_severity_monotonicity() {
    let rule = rule(Some(8.0), Some(16.0));
    assert_eq!(classify(7.0, &rule), None);
    assert_eq!(classify(8.0, &rule), Some(SlaSeverity::Warn));
    assert_eq!(classify(15.9, &rule), Some(SlaSeverity::Warn));
    assert_eq!(classify(16.0, &rule), Some(SlaSeverity::Escalate));
    assert_eq!(classify(200.0, &rule), Some(SlaSeverity::Escalate));
}

#[test]
fn classify_with_only_one_threshold() {
    let warn_only = rule(Some(4.0), None);
    assert_eq!(classify(100.0, &warn_only), Some(SlaSeverity::Warn));

    let escalate_only = rule(None, Some(4.0));
    assert_eq!(classify(3.9, &escalate_only), None);
    assert_eq!(classify(4.0, &escalate_only), Some(SlaSeverity::Escalate));
}

#[test]
fn classify_without_thresholds_never_fires() {
    let silent = rule(None, None);
    assert_eq!(classify(f64::MAX, &silent), None);
}

#[test]
fn elapsed_hours_never_negative() {
    let cal = utc_calendar();
    let now = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
    let future_anchor = now + Duration::hours(5);
    assert_eq!(elapsed_hours(future_anchor, now, false, &cal), 0.0);
    assert_eq!(elapsed_hours(future_anchor, now, true, &cal), 0.0);
}

#[test]
fn elapsed_hours_wall_clock_counts_everything() {
    let cal = utc_calendar();
    let now = Utc.with_ymd_and_hms(2026, 1, 12, 9, 0, 0).unwrap();
    let anchor = now - Duration::hours(48);
    assert_eq!(elapsed_hours(anchor, now, false, &cal), 48.0);
    // Business mode over the same weekend span counts far less.
    assert!(elapsed_hours(anchor, now, true, &cal) < 48.0);
}

#[test]
fn dedupe_window_fallbacks() {
    let explicit = SlaRule {
        dedupe_hours: Some(3.0),
        escalation_dedupe_hours: Some(9.0),
        ..Default::default()
    };
    assert_eq!(explicit.dedupe_window(SlaSeverity::Warn), 3.0);
    assert_eq!(explicit.dedupe_window(SlaSeverity::Escalate), 9.0);

    let fallback = SlaRule {
        dedupe_hours: Some(3.0),
        ..Default::default()
    };
    assert_eq!(fallback.dedupe_window(SlaSeverity::Escalate), 3.0);

    let defaults = SlaRule::default();
    assert_eq!(defaults.dedupe_window(SlaSeverity::Warn), 6.0);
    assert_eq!(defaults.dedupe_window(SlaSeverity::Escalate), 12.0);
}

#[test]
fn rule_table_absent_kind_or_status_never_alerts() {
    let mut table = RuleTable::new();
    table.insert(EntityKind::Document, "Pending", rule(Some(1.0), None));

    assert!(table.rules_for(EntityKind::LeaveRequest).is_none());
    assert!(table.rule_for(EntityKind::Document, "Draft").is_none());
    assert!(table.rule_for(EntityKind::Document, "Pending").is_some());
    assert!(table.statuses_for(EntityKind::EwpRecord).is_empty());
}

#[test]
fn rule_table_env_overrides() {
    let mut vars: HashMap<&str, &str> = HashMap::new();
    vars.insert("SLA_DOCUMENT_PENDING_WARN_HOURS", "2.5");
    vars.insert("SLA_DOCUMENT_FOR_COMPUTATION_ESCALATE_HOURS", "99");
    vars.insert("SLA_LEAVE_REQUEST_PENDING_DEDUPE_HOURS", "1");
    vars.insert("SLA_EWP_RECORD_PENDING_ESC_DEDUPE_HOURS", "not-a-number");

    let table =
        RuleTable::builtin().with_overrides(|name| vars.get(name).map(|v| v.to_string()));

    let doc = table.rule_for(EntityKind::Document, "Pending").unwrap();
    assert_eq!(doc.warn_after_hours, Some(2.5));
    // Untouched fields keep their builtin values.
    assert_eq!(doc.escalate_after_hours, Some(16.0));

    let comp = table
        .rule_for(EntityKind::Document, "For Computation")
        .unwrap();
    assert_eq!(comp.escalate_after_hours, Some(99.0));

    let leave = table.rule_for(EntityKind::LeaveRequest, "Pending").unwrap();
    assert_eq!(leave.dedupe_hours, Some(1.0));

    // Unparsable values are ignored rather than clobbering the default.
    let ewp = table.rule_for(EntityKind::EwpRecord, "Pending").unwrap();
    assert_eq!(ewp.escalation_dedupe_hours, Some(24.0));
}

#[test]
fn reset_actions_only_for_pending() {
    let actions = crate::anchor::reset_actions("Pending").unwrap();
    assert!(actions.contains(&"Forwarded"));
    assert!(actions.contains(&"Batch Forwarded"));
    assert!(actions.contains(&"Resubmitted"));
    assert!(actions.contains(&"Created"));
    assert!(crate::anchor::reset_actions("Released").is_none());
    assert!(crate::anchor::reset_actions("For Computation").is_none());
}
