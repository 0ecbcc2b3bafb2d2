use crate::business_hours::BusinessCalendar;
use crate::rules::SlaRule;
use chrono::{DateTime, Utc};
use doctrack_common::types::SlaSeverity;

/// Decides whether an elapsed duration breaches a rule. Escalate takes
/// priority over warn; a rule with both thresholds unset never fires.
///
/// # Examples
///
/// ```
/// use doctrack_common::types::SlaSeverity;
/// use doctrack_sla::{classify, SlaRule};
///
/// let rule = SlaRule {
///     warn_after_hours: Some(8.0),
///     escalate_after_hours: Some(16.0),
///     ..Default::default()
/// };
/// assert_eq!(classify(7.9, &rule), None);
/// assert_eq!(classify(8.0, &rule), Some(SlaSeverity::Warn));
/// assert_eq!(classify(16.0, &rule), Some(SlaSeverity::Escalate));
/// ```
pub fn classify(elapsed_hours: f64, rule: &SlaRule) -> Option<SlaSeverity> {
    if let Some(threshold) = rule.escalate_after_hours {
        if elapsed_hours >= threshold {
            return Some(SlaSeverity::Escalate);
        }
    }
    if let Some(threshold) = rule.warn_after_hours {
        if elapsed_hours >= threshold {
            return Some(SlaSeverity::Warn);
        }
    }
    None
}

/// Hours between `anchor` and `now` under the rule's calendar mode, clamped
/// to be non-negative.
pub fn elapsed_hours(
    anchor: DateTime<Utc>,
    now: DateTime<Utc>,
    use_business_hours: bool,
    calendar: &BusinessCalendar,
) -> f64 {
    let delta = if use_business_hours {
        calendar.elapsed(anchor, now)
    } else {
        now - anchor
    };
    let seconds = delta.num_milliseconds() as f64 / 1000.0;
    seconds.max(0.0) / 3600.0
}
