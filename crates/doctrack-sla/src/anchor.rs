/// Document statuses whose SLA clock restarts when the document is handed
/// off. For these, the anchor is the newest activity-log entry whose action
/// is in the returned set, falling back to the creation timestamp; for every
/// other status (and for leave/EWP records, which have no reassignment
/// concept) the anchor is always the creation timestamp.
pub fn reset_actions(status: &str) -> Option<&'static [&'static str]> {
    match status {
        "Pending" => Some(&["Forwarded", "Batch Forwarded", "Resubmitted", "Created"]),
        _ => None,
    }
}
