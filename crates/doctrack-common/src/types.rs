use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of workflow entity kinds the SLA monitor evaluates.
///
/// # Examples
///
/// ```
/// use doctrack_common::types::EntityKind;
///
/// let kind: EntityKind = "Document".parse().unwrap();
/// assert_eq!(kind, EntityKind::Document);
/// assert_eq!(kind.preference_key(), "documents");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Document,
    LeaveRequest,
    EwpRecord,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Document,
        EntityKind::LeaveRequest,
        EntityKind::EwpRecord,
    ];

    /// Key under which the per-kind enable flag is persisted.
    pub fn preference_key(&self) -> &'static str {
        match self {
            EntityKind::Document => "documents",
            EntityKind::LeaveRequest => "leave_requests",
            EntityKind::EwpRecord => "ewp_records",
        }
    }

    /// Token used in threshold override environment variable names
    /// (e.g. `SLA_DOCUMENT_PENDING_WARN_HOURS`).
    pub fn env_token(&self) -> &'static str {
        match self {
            EntityKind::Document => "DOCUMENT",
            EntityKind::LeaveRequest => "LEAVE_REQUEST",
            EntityKind::EwpRecord => "EWP_RECORD",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Document => write!(f, "Document"),
            EntityKind::LeaveRequest => write!(f, "LeaveRequest"),
            EntityKind::EwpRecord => write!(f, "EWPRecord"),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Document" => Ok(EntityKind::Document),
            "LeaveRequest" => Ok(EntityKind::LeaveRequest),
            "EWPRecord" => Ok(EntityKind::EwpRecord),
            _ => Err(format!("unknown entity kind: {s}")),
        }
    }
}

/// SLA severity, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use doctrack_common::types::SlaSeverity;
///
/// let sev: SlaSeverity = "escalate".parse().unwrap();
/// assert_eq!(sev, SlaSeverity::Escalate);
/// assert!(SlaSeverity::Escalate > SlaSeverity::Warn);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlaSeverity {
    Warn,
    Escalate,
}

impl SlaSeverity {
    /// Action tag written to the document activity log.
    pub fn audit_action(&self) -> &'static str {
        match self {
            SlaSeverity::Warn => "SLA Warning",
            SlaSeverity::Escalate => "SLA Escalation",
        }
    }

    /// Label used in user-facing notification messages.
    pub fn title(&self) -> &'static str {
        match self {
            SlaSeverity::Warn => "Warning",
            SlaSeverity::Escalate => "Escalation",
        }
    }
}

impl std::fmt::Display for SlaSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlaSeverity::Warn => write!(f, "warn"),
            SlaSeverity::Escalate => write!(f, "escalate"),
        }
    }
}

impl std::str::FromStr for SlaSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warn" => Ok(SlaSeverity::Warn),
            "escalate" => Ok(SlaSeverity::Escalate),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// Minimal view of a user account as the monitor needs it: identity for
/// addressing notifications, `active` for the account-status gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub id: i32,
    pub username: String,
    pub active: bool,
}

/// Read-only snapshot of one workflow entity in an alert-eligible status.
///
/// The monitor never mutates the entity itself; it only reads this shape and
/// writes adjacent notification/audit rows.
#[derive(Debug, Clone)]
pub struct EntitySnapshot {
    pub kind: EntityKind,
    pub id: i32,
    pub status: String,
    /// Document title or employee name, used in message wording.
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub creator: Option<UserRef>,
    pub assignee: Option<UserRef>,
}

/// Structured dedupe key identifying one (entity, status, severity) alert.
///
/// Stored in `notifications.dedupe_key` and matched by equality.
///
/// # Examples
///
/// ```
/// use doctrack_common::types::{dedupe_key, EntityKind, SlaSeverity};
///
/// let key = dedupe_key(EntityKind::Document, 42, "Pending", SlaSeverity::Escalate);
/// assert_eq!(key, "Document#42:Pending:escalate");
/// ```
pub fn dedupe_key(kind: EntityKind, id: i32, status: &str, severity: SlaSeverity) -> String {
    format!("{kind}#{id}:{status}:{severity}")
}

/// Counters for one entity kind in one monitor pass.
///
/// `checked` counts entities that reached classification with a severity (and,
/// for documents, passed the audit gate); `warnings`/`escalations` are
/// mutually exclusive and only increment when a notification was actually
/// created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSummary {
    pub checked: u32,
    pub warnings: u32,
    pub escalations: u32,
    pub alerts: u32,
}

/// Aggregate result of one full monitor pass, keyed by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub documents: KindSummary,
    pub leave_requests: KindSummary,
    pub ewp_records: KindSummary,
}

impl RunSummary {
    pub fn kind(&self, kind: EntityKind) -> &KindSummary {
        match kind {
            EntityKind::Document => &self.documents,
            EntityKind::LeaveRequest => &self.leave_requests,
            EntityKind::EwpRecord => &self.ewp_records,
        }
    }

    pub fn kind_mut(&mut self, kind: EntityKind) -> &mut KindSummary {
        match kind {
            EntityKind::Document => &mut self.documents,
            EntityKind::LeaveRequest => &mut self.leave_requests,
            EntityKind::EwpRecord => &mut self.ewp_records,
        }
    }

    pub fn total_alerts(&self) -> u32 {
        self.documents.alerts + self.leave_requests.alerts + self.ewp_records.alerts
    }
}

/// Present elapsed time in user-friendly terms. Business hours treat 8 hours
/// as a day; wall-clock mode uses 24.
///
/// # Examples
///
/// ```
/// use doctrack_common::types::format_elapsed_duration;
///
/// assert_eq!(format_elapsed_duration(0.0, true), "less than an hour");
/// assert_eq!(format_elapsed_duration(11.0, true), "1 business day and 3 hours");
/// assert_eq!(format_elapsed_duration(26.0, false), "1 day and 2 hours");
/// ```
pub fn format_elapsed_duration(hours: f64, use_business_hours: bool) -> String {
    if hours <= 0.0 {
        return "less than an hour".to_string();
    }

    let hours_per_day = if use_business_hours { 8.0 } else { 24.0 };
    let days = (hours / hours_per_day).floor() as i64;
    let remaining_hours = ((hours - days as f64 * hours_per_day) * 100.0).round() / 100.0;

    let mut parts: Vec<String> = Vec::new();
    if days > 0 {
        let day_label = if use_business_hours { "business day" } else { "day" };
        let plural = if days != 1 { "s" } else { "" };
        parts.push(format!("{days} {day_label}{plural}"));
    }

    if remaining_hours >= 0.01 {
        if remaining_hours >= 1.0 || parts.is_empty() {
            let mut rounded = (remaining_hours * 10.0).round() / 10.0;
            if (rounded - rounded.round()).abs() < 0.05 {
                rounded = rounded.round();
            }
            let plural = if (rounded - 1.0).abs() > f64::EPSILON { "s" } else { "" };
            if rounded.fract() == 0.0 {
                parts.push(format!("{} hour{plural}", rounded as i64));
            } else {
                parts.push(format!("{rounded} hour{plural}"));
            }
        } else {
            let minutes = (remaining_hours * 60.0).round() as i64;
            if minutes > 0 {
                let plural = if minutes != 1 { "s" } else { "" };
                parts.push(format!("{minutes} minute{plural}"));
            }
        }
    }

    if parts.is_empty() {
        return "less than an hour".to_string();
    }

    parts.join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_display() {
        for kind in EntityKind::ALL {
            let parsed: EntityKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn dedupe_key_shape() {
        let key = dedupe_key(EntityKind::LeaveRequest, 7, "Pending", SlaSeverity::Warn);
        assert_eq!(key, "LeaveRequest#7:Pending:warn");
    }

    #[test]
    fn elapsed_formatting_business_days() {
        assert_eq!(format_elapsed_duration(8.0, true), "1 business day");
        assert_eq!(
            format_elapsed_duration(20.0, true),
            "2 business days and 4 hours"
        );
        assert_eq!(format_elapsed_duration(1.0, true), "1 hour");
        assert_eq!(format_elapsed_duration(-3.0, false), "less than an hour");
    }

    #[test]
    fn elapsed_formatting_minutes_when_under_an_hour_remains() {
        // 1 business day plus half an hour: the fraction is shown as minutes
        assert_eq!(
            format_elapsed_duration(8.5, true),
            "1 business day and 30 minutes"
        );
    }
}
