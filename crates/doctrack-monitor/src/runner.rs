use chrono::{DateTime, Utc};
use doctrack_common::types::{
    dedupe_key, format_elapsed_duration, EntityKind, EntitySnapshot, KindSummary, RunSummary,
    SlaSeverity, UserRef,
};
use doctrack_sla::{classify, elapsed_hours, reset_actions, BusinessCalendar, RuleTable};
use doctrack_storage::store;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};

use crate::dispatch::notify_users;
use crate::error::MonitorError;
use crate::guard::RunGuard;

/// Drives one SLA sweep over every monitored entity kind.
///
/// The rule table and calendar are fixed at construction; a pass reads and
/// writes through a single transaction, so a failure anywhere rolls back
/// every notification and audit entry of that pass.
pub struct SlaMonitor {
    db: DatabaseConnection,
    rules: RuleTable,
    calendar: BusinessCalendar,
    guard: RunGuard,
}

impl SlaMonitor {
    pub fn new(db: DatabaseConnection, rules: RuleTable, calendar: BusinessCalendar) -> Self {
        Self {
            db,
            rules,
            calendar,
            guard: RunGuard::new(),
        }
    }

    pub fn guard(&self) -> &RunGuard {
        &self.guard
    }

    /// Runs one pass anchored at the current instant.
    pub async fn run_sla_checks(&self) -> Result<RunSummary, MonitorError> {
        self.run_at(Utc::now()).await
    }

    /// Runs one pass with an injected clock.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunSummary, MonitorError> {
        let Some(_token) = self.guard.try_acquire() else {
            return Err(MonitorError::PassInProgress);
        };

        let txn = self.db.begin().await?;
        match self.run_pass(&txn, now).await {
            Ok(summary) => {
                txn.commit().await?;
                log_summary(&summary);
                Ok(summary)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!(error = %rollback_err, "SLA monitor rollback failed");
                }
                tracing::error!(error = %err, "SLA monitor run failed");
                Err(err)
            }
        }
    }

    async fn run_pass<C: ConnectionTrait>(
        &self,
        db: &C,
        now: DateTime<Utc>,
    ) -> Result<RunSummary, MonitorError> {
        let admins = store::active_admins(db).await?;
        let preferences = store::preference_map(db, now).await?;

        let mut summary = RunSummary::default();
        for kind in EntityKind::ALL {
            let enabled = preferences
                .get(kind.preference_key())
                .copied()
                .unwrap_or(true);
            if !enabled {
                tracing::debug!(kind = %kind, "SLA monitoring disabled by preference");
                continue;
            }
            *summary.kind_mut(kind) = self.monitor_kind(db, kind, &admins, now).await?;
        }
        Ok(summary)
    }

    /// Evaluates every entity of `kind` sitting in a rule-covered status:
    /// anchor, elapsed, classify, dedupe, notify.
    async fn monitor_kind<C: ConnectionTrait>(
        &self,
        db: &C,
        kind: EntityKind,
        admins: &[UserRef],
        now: DateTime<Utc>,
    ) -> Result<KindSummary, MonitorError> {
        let mut summary = KindSummary::default();
        let Some(rules) = self.rules.rules_for(kind) else {
            return Ok(summary);
        };

        let statuses = self.rules.statuses_for(kind);
        let snapshots = store::entity_snapshots(db, kind, &statuses).await?;

        for snapshot in snapshots {
            let Some(rule) = rules.get(&snapshot.status) else {
                continue;
            };

            let anchor = self.resolve_anchor(db, &snapshot).await?;
            let elapsed = elapsed_hours(anchor, now, rule.use_business_hours, &self.calendar);
            let Some(severity) = classify(elapsed, rule) else {
                continue;
            };

            let elapsed_label = format_elapsed_duration(elapsed, rule.use_business_hours);

            // A document whose audit entry is already on record since the
            // anchor stays silent this pass, notifications included.
            if snapshot.kind == EntityKind::Document
                && !self
                    .record_document_audit(db, &snapshot, severity, anchor, &elapsed_label, now)
                    .await?
            {
                continue;
            }

            let message = alert_message(&snapshot, severity, &elapsed_label);
            let key = dedupe_key(kind, snapshot.id, &snapshot.status, severity);
            let window = rule.dedupe_window(severity);

            let mut recipients: Vec<UserRef> = Vec::new();
            if rule.notify_recipient {
                recipients.extend(snapshot.assignee.clone());
            }
            if rule.notify_creator {
                recipients.extend(snapshot.creator.clone());
            }
            if severity == SlaSeverity::Escalate && rule.escalate_to_admins {
                recipients.extend(admins.iter().cloned());
            }

            if notify_users(db, &recipients, &message, &key, window, now).await? {
                summary.alerts += 1;
                match severity {
                    SlaSeverity::Escalate => summary.escalations += 1,
                    SlaSeverity::Warn => summary.warnings += 1,
                }
            }

            summary.checked += 1;
        }

        Ok(summary)
    }

    /// SLA anchor for one snapshot: the newest reset-action activity entry
    /// for documents in a reset-tracked status, otherwise creation time.
    async fn resolve_anchor<C: ConnectionTrait>(
        &self,
        db: &C,
        snapshot: &EntitySnapshot,
    ) -> Result<DateTime<Utc>, MonitorError> {
        if snapshot.kind == EntityKind::Document {
            if let Some(actions) = reset_actions(&snapshot.status) {
                if let Some(anchor) = store::latest_reset_activity(db, snapshot.id, actions).await?
                {
                    return Ok(anchor);
                }
            }
        }
        Ok(snapshot.created_at)
    }

    /// Writes the document audit entry unless one already exists at or after
    /// the anchor. Returns whether alerting should proceed for the document.
    async fn record_document_audit<C: ConnectionTrait>(
        &self,
        db: &C,
        snapshot: &EntitySnapshot,
        severity: SlaSeverity,
        anchor: DateTime<Utc>,
        elapsed_label: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, MonitorError> {
        let action = severity.audit_action();
        if store::sla_activity_exists_since(db, snapshot.id, action, anchor).await? {
            return Ok(false);
        }

        let actor = snapshot.assignee.as_ref().or(snapshot.creator.as_ref());
        let Some(actor) = actor else {
            // Nobody to attribute the entry to; notifications still go out.
            tracing::debug!(
                document_id = snapshot.id,
                "Skipping audit entry without an actor"
            );
            return Ok(true);
        };

        let remarks = format!(
            "Automated SLA monitor flagged status '{}' after {elapsed_label}.",
            snapshot.status
        );
        store::insert_activity(db, actor.id, snapshot.id, action, &remarks, now).await?;
        Ok(true)
    }
}

fn alert_message(snapshot: &EntitySnapshot, severity: SlaSeverity, elapsed_label: &str) -> String {
    let title = severity.title();
    match snapshot.kind {
        EntityKind::Document => {
            let assignee = snapshot
                .assignee
                .as_ref()
                .map(|u| u.username.as_str())
                .unwrap_or("N/A");
            format!(
                "SLA {title}: Document #{} ('{}') assigned to {assignee} has been '{}' for {elapsed_label}.",
                snapshot.id, snapshot.label, snapshot.status
            )
        }
        EntityKind::LeaveRequest => format!(
            "SLA {title}: Leave request #{} for {} has been '{}' for {elapsed_label}.",
            snapshot.id, snapshot.label, snapshot.status
        ),
        EntityKind::EwpRecord => format!(
            "SLA {title}: EWP record #{} for {} has been '{}' for {elapsed_label}.",
            snapshot.id, snapshot.label, snapshot.status
        ),
    }
}

fn log_summary(summary: &RunSummary) {
    if summary.total_alerts() == 0 {
        tracing::debug!("SLA monitor completed: no new alerts");
        return;
    }
    tracing::info!(
        documents = ?summary.documents,
        leave_requests = ?summary.leave_requests,
        ewp_records = ?summary.ewp_records,
        "SLA monitor alerts summary"
    );
}
