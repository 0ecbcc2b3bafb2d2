//! Query and insert operations the SLA monitor performs.
//!
//! Every function takes `&C where C: ConnectionTrait`, so the runner can
//! hand in either the pooled connection or the pass transaction. Reads are
//! bounded filtered queries; writes append rows and never mutate workflow
//! entities.

use chrono::{DateTime, Utc};
use doctrack_common::types::{EntityKind, EntitySnapshot, UserRef};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use std::collections::{HashMap, HashSet};

use crate::entities::activity_log::{self, Column as LogCol, Entity as LogEntity};
use crate::entities::document::{Column as DocCol, Entity as DocEntity};
use crate::entities::ewp_record::{Column as EwpCol, Entity as EwpEntity};
use crate::entities::leave_request::{Column as LeaveCol, Entity as LeaveEntity};
use crate::entities::notification::{self, Column as NotifCol, Entity as NotifEntity};
use crate::entities::sla_preference::{self, Entity as PrefEntity};
use crate::entities::user::{self, Column as UserCol, Entity as UserEntity};

fn model_to_user_ref(m: user::Model) -> UserRef {
    UserRef {
        id: m.id,
        username: m.username,
        active: m.status == "Active",
    }
}

/// All users with admin privilege and an active account. Recomputed fresh
/// each pass.
pub async fn active_admins<C: ConnectionTrait>(db: &C) -> Result<Vec<UserRef>, DbErr> {
    let rows = UserEntity::find()
        .filter(UserCol::IsAdmin.eq(true))
        .filter(UserCol::Status.eq("Active"))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(model_to_user_ref).collect())
}

/// Per-kind enable flags, creating missing rows with `enabled = true`.
pub async fn preference_map<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
) -> Result<HashMap<String, bool>, DbErr> {
    let rows = PrefEntity::find().all(db).await?;
    let mut map: HashMap<String, bool> = rows
        .into_iter()
        .map(|row| (row.category, row.enabled))
        .collect();

    for kind in EntityKind::ALL {
        let key = kind.preference_key();
        if !map.contains_key(key) {
            sla_preference::ActiveModel {
                category: Set(key.to_string()),
                enabled: Set(true),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
            tracing::debug!(category = key, "Created missing SLA preference (enabled)");
            map.insert(key.to_string(), true);
        }
    }

    Ok(map)
}

async fn load_user_refs<C: ConnectionTrait>(
    db: &C,
    ids: HashSet<i32>,
) -> Result<HashMap<i32, UserRef>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = UserEntity::find()
        .filter(UserCol::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|m| (m.id, model_to_user_ref(m)))
        .collect())
}

/// Snapshots of all entities of `kind` currently sitting in one of
/// `statuses` — a single filtered fetch, not a full scan.
pub async fn entity_snapshots<C: ConnectionTrait>(
    db: &C,
    kind: EntityKind,
    statuses: &[String],
) -> Result<Vec<EntitySnapshot>, DbErr> {
    if statuses.is_empty() {
        return Ok(Vec::new());
    }
    match kind {
        EntityKind::Document => document_snapshots(db, statuses).await,
        EntityKind::LeaveRequest => leave_snapshots(db, statuses).await,
        EntityKind::EwpRecord => ewp_snapshots(db, statuses).await,
    }
}

async fn document_snapshots<C: ConnectionTrait>(
    db: &C,
    statuses: &[String],
) -> Result<Vec<EntitySnapshot>, DbErr> {
    let docs = DocEntity::find()
        .filter(DocCol::Status.is_in(statuses.iter().map(String::as_str)))
        .all(db)
        .await?;

    let mut ids = HashSet::new();
    for doc in &docs {
        ids.insert(doc.creator_id);
        ids.insert(doc.recipient_id);
    }
    let users = load_user_refs(db, ids).await?;

    Ok(docs
        .into_iter()
        .map(|doc| EntitySnapshot {
            kind: EntityKind::Document,
            id: doc.id,
            status: doc.status,
            label: doc.title,
            created_at: doc.created_at,
            creator: users.get(&doc.creator_id).cloned(),
            assignee: users.get(&doc.recipient_id).cloned(),
        })
        .collect())
}

async fn leave_snapshots<C: ConnectionTrait>(
    db: &C,
    statuses: &[String],
) -> Result<Vec<EntitySnapshot>, DbErr> {
    let leaves = LeaveEntity::find()
        .filter(LeaveCol::Status.is_in(statuses.iter().map(String::as_str)))
        .all(db)
        .await?;

    let ids = leaves.iter().filter_map(|l| l.created_by_id).collect();
    let users = load_user_refs(db, ids).await?;

    Ok(leaves
        .into_iter()
        .map(|leave| EntitySnapshot {
            kind: EntityKind::LeaveRequest,
            id: leave.id,
            status: leave.status,
            label: leave.employee_name,
            created_at: leave.created_at,
            creator: leave.created_by_id.and_then(|id| users.get(&id).cloned()),
            assignee: None,
        })
        .collect())
}

async fn ewp_snapshots<C: ConnectionTrait>(
    db: &C,
    statuses: &[String],
) -> Result<Vec<EntitySnapshot>, DbErr> {
    let records = EwpEntity::find()
        .filter(EwpCol::Status.is_in(statuses.iter().map(String::as_str)))
        .all(db)
        .await?;

    let ids = records.iter().filter_map(|r| r.created_by_id).collect();
    let users = load_user_refs(db, ids).await?;

    Ok(records
        .into_iter()
        .map(|record| EntitySnapshot {
            kind: EntityKind::EwpRecord,
            id: record.id,
            status: record.status,
            label: record.employee_name,
            created_at: record.created_at,
            creator: record.created_by_id.and_then(|id| users.get(&id).cloned()),
            assignee: None,
        })
        .collect())
}

/// Timestamp of the most recent activity-log entry for `document_id` whose
/// action is in `actions` — the document's SLA anchor when its status has a
/// reset-action set.
pub async fn latest_reset_activity<C: ConnectionTrait>(
    db: &C,
    document_id: i32,
    actions: &[&str],
) -> Result<Option<DateTime<Utc>>, DbErr> {
    let row = LogEntity::find()
        .filter(LogCol::DocumentId.eq(document_id))
        .filter(LogCol::Action.is_in(actions.iter().copied()))
        .order_by_desc(LogCol::CreatedAt)
        .one(db)
        .await?;
    Ok(row.map(|r| r.created_at))
}

/// Whether an SLA audit entry with this action already exists for the
/// document at or after the current anchor. Once the anchor moves, older
/// entries no longer block a fresh alert.
pub async fn sla_activity_exists_since<C: ConnectionTrait>(
    db: &C,
    document_id: i32,
    action: &str,
    anchor: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let row = LogEntity::find()
        .filter(LogCol::DocumentId.eq(document_id))
        .filter(LogCol::Action.eq(action))
        .filter(LogCol::CreatedAt.gte(anchor))
        .order_by_desc(LogCol::CreatedAt)
        .one(db)
        .await?;
    Ok(row.is_some())
}

/// Whether the recipient already has a notification carrying this dedupe key
/// with a timestamp inside `[cutoff, now]`.
pub async fn notification_exists_within<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    dedupe_key: &str,
    cutoff: DateTime<Utc>,
) -> Result<bool, DbErr> {
    let row = NotifEntity::find()
        .filter(NotifCol::UserId.eq(user_id))
        .filter(NotifCol::DedupeKey.eq(dedupe_key))
        .filter(NotifCol::CreatedAt.gte(cutoff))
        .order_by_desc(NotifCol::CreatedAt)
        .one(db)
        .await?;
    Ok(row.is_some())
}

/// Appends an unread notification row.
pub async fn insert_notification<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    message: &str,
    dedupe_key: &str,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    notification::ActiveModel {
        user_id: Set(user_id),
        message: Set(message.to_string()),
        dedupe_key: Set(Some(dedupe_key.to_string())),
        is_read: Set(false),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Appends a document activity-log entry on behalf of `user_id`.
pub async fn insert_activity<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    document_id: i32,
    action: &str,
    remarks: &str,
    now: DateTime<Utc>,
) -> Result<(), DbErr> {
    activity_log::ActiveModel {
        document_id: Set(document_id),
        user_id: Set(user_id),
        action: Set(action.to_string()),
        remarks: Set(Some(remarks.to_string())),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}
