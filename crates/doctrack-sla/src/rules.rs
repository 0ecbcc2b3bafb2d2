use doctrack_common::types::{EntityKind, SlaSeverity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const DEFAULT_DEDUPE_HOURS: f64 = 6.0;
const DEFAULT_ESCALATION_DEDUPE_HOURS: f64 = 12.0;

/// SLA thresholds and notification targets for one (entity kind, status)
/// tuple. Immutable for the lifetime of a monitor pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlaRule {
    pub warn_after_hours: Option<f64>,
    pub escalate_after_hours: Option<f64>,
    pub use_business_hours: bool,
    pub notify_creator: bool,
    pub notify_recipient: bool,
    pub escalate_to_admins: bool,
    pub dedupe_hours: Option<f64>,
    pub escalation_dedupe_hours: Option<f64>,
}

impl SlaRule {
    /// Lookback window for suppressing a repeat alert of the given severity.
    ///
    /// Escalations use `escalation_dedupe_hours`, falling back to
    /// `dedupe_hours`, defaulting to 12; warnings use `dedupe_hours`,
    /// defaulting to 6.
    pub fn dedupe_window(&self, severity: SlaSeverity) -> f64 {
        match severity {
            SlaSeverity::Escalate => self
                .escalation_dedupe_hours
                .or(self.dedupe_hours)
                .unwrap_or(DEFAULT_ESCALATION_DEDUPE_HOURS),
            SlaSeverity::Warn => self.dedupe_hours.unwrap_or(DEFAULT_DEDUPE_HOURS),
        }
    }
}

/// Static mapping from (entity kind, status) to an [`SlaRule`].
///
/// Statuses absent from the table are never evaluated, so there is no
/// accidental default alerting. Built once at startup and passed into the
/// monitor; never mutated during a pass.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<EntityKind, HashMap<String, SlaRule>>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The code-fixed default rule set: documents are measured in business
    /// hours and alert both sides of the routing plus admins on escalation;
    /// leave and EWP records run on wall-clock hours and alert their creator.
    pub fn builtin() -> Self {
        let mut table = Self::new();

        table.insert(
            EntityKind::Document,
            "Pending",
            SlaRule {
                warn_after_hours: Some(8.0),
                escalate_after_hours: Some(16.0),
                use_business_hours: true,
                notify_creator: true,
                notify_recipient: true,
                escalate_to_admins: true,
                dedupe_hours: Some(6.0),
                escalation_dedupe_hours: Some(12.0),
            },
        );
        table.insert(
            EntityKind::Document,
            "For Computation",
            SlaRule {
                warn_after_hours: Some(16.0),
                escalate_after_hours: Some(32.0),
                use_business_hours: true,
                notify_creator: false,
                notify_recipient: true,
                escalate_to_admins: true,
                dedupe_hours: Some(6.0),
                escalation_dedupe_hours: Some(12.0),
            },
        );
        table.insert(
            EntityKind::LeaveRequest,
            "Pending",
            SlaRule {
                warn_after_hours: Some(24.0),
                escalate_after_hours: Some(48.0),
                use_business_hours: false,
                notify_creator: true,
                notify_recipient: false,
                escalate_to_admins: true,
                dedupe_hours: Some(12.0),
                escalation_dedupe_hours: Some(24.0),
            },
        );
        table.insert(
            EntityKind::EwpRecord,
            "Pending",
            SlaRule {
                warn_after_hours: Some(24.0),
                escalate_after_hours: Some(48.0),
                use_business_hours: false,
                notify_creator: true,
                notify_recipient: false,
                escalate_to_admins: true,
                dedupe_hours: Some(12.0),
                escalation_dedupe_hours: Some(24.0),
            },
        );

        table
    }

    pub fn insert(&mut self, kind: EntityKind, status: impl Into<String>, rule: SlaRule) {
        self.rules
            .entry(kind)
            .or_default()
            .insert(status.into(), rule);
    }

    /// All rules for one kind; `None` when the kind has no table at all.
    pub fn rules_for(&self, kind: EntityKind) -> Option<&HashMap<String, SlaRule>> {
        self.rules.get(&kind).filter(|m| !m.is_empty())
    }

    pub fn rule_for(&self, kind: EntityKind, status: &str) -> Option<&SlaRule> {
        self.rules.get(&kind)?.get(status)
    }

    /// The statuses worth fetching for a kind (the rule table's keys).
    pub fn statuses_for(&self, kind: EntityKind) -> Vec<String> {
        self.rules
            .get(&kind)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Applies threshold overrides from the process environment.
    ///
    /// Recognized variables, per configured (kind, status) pair:
    /// `SLA_<KIND>_<STATUS>_WARN_HOURS`, `..._ESCALATE_HOURS`,
    /// `..._DEDUPE_HOURS`, `..._ESC_DEDUPE_HOURS` — hours as floats, with the
    /// status uppercased and spaces replaced by underscores
    /// (e.g. `SLA_DOCUMENT_FOR_COMPUTATION_WARN_HOURS=12`).
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::with_env_overrides`] but with an injectable lookup so
    /// tests can pass a synthetic variable map.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for (kind, by_status) in self.rules.iter_mut() {
            for (status, rule) in by_status.iter_mut() {
                let prefix = format!(
                    "SLA_{}_{}",
                    kind.env_token(),
                    status.to_uppercase().replace(' ', "_")
                );
                override_hours(&lookup, &prefix, "WARN_HOURS", &mut rule.warn_after_hours);
                override_hours(
                    &lookup,
                    &prefix,
                    "ESCALATE_HOURS",
                    &mut rule.escalate_after_hours,
                );
                override_hours(&lookup, &prefix, "DEDUPE_HOURS", &mut rule.dedupe_hours);
                override_hours(
                    &lookup,
                    &prefix,
                    "ESC_DEDUPE_HOURS",
                    &mut rule.escalation_dedupe_hours,
                );
            }
        }
        self
    }
}

fn override_hours(
    lookup: &impl Fn(&str) -> Option<String>,
    prefix: &str,
    suffix: &str,
    slot: &mut Option<f64>,
) {
    let name = format!("{prefix}_{suffix}");
    if let Some(raw) = lookup(&name) {
        match raw.trim().parse::<f64>() {
            Ok(hours) => *slot = Some(hours),
            Err(_) => tracing::warn!(var = %name, value = %raw, "Ignoring unparsable SLA override"),
        }
    }
}
