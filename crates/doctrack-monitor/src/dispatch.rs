use chrono::{DateTime, Duration, Utc};
use doctrack_common::types::UserRef;
use doctrack_storage::store;
use sea_orm::{ConnectionTrait, DbErr};
use std::collections::HashSet;

/// Fans one alert out to a recipient list.
///
/// Recipients are deduplicated by user id (first occurrence wins) and
/// inactive accounts are skipped. Each remaining recipient is checked
/// against the notification dedupe window before a row is written. Returns
/// whether any notification was created.
pub async fn notify_users<C: ConnectionTrait>(
    db: &C,
    recipients: &[UserRef],
    message: &str,
    dedupe_key: &str,
    dedupe_hours: f64,
    now: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let cutoff = now - Duration::milliseconds((dedupe_hours * 3_600_000.0) as i64);
    let mut sent_any = false;
    let mut seen = HashSet::new();

    for user in recipients {
        if !seen.insert(user.id) {
            continue;
        }
        if !user.active {
            continue;
        }

        if store::notification_exists_within(db, user.id, dedupe_key, cutoff).await? {
            tracing::debug!(
                user_id = user.id,
                key = %dedupe_key,
                "Notification suppressed (dedupe window)"
            );
            continue;
        }

        store::insert_notification(db, user.id, message, dedupe_key, now).await?;
        sent_any = true;
    }

    Ok(sent_any)
}
