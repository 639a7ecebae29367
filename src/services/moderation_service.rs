//! Report disposition: validation, authorization, target resolution, then
//! the enforcement saga (strike, sanction, remediation, report resolution)
//! followed by best-effort audit and notification side effects.
//!
//! The saga writes are independent store calls with no transaction. Double
//! application is prevented by a decision key `(report_id, action)` claimed
//! before the first write: a completed key replays its stored outcome, an
//! incomplete one is a conflict. When a step fails after something was
//! written the key is kept and the completed steps are logged; there is no
//! compensation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::audit_service::AuditService;
use super::dispatcher::SideEffectDispatcher;
use super::notification_service::NotificationService;
use super::remediation::{self, ContentRemediator, RemediationSummary};
use super::report_resolver::ReportResolver;
use super::sanctions::{Sanction, SanctionService};
use super::severity::SeverityPolicy;
use super::strike_ledger::StrikeLedger;
use super::target_resolver::{Target, TargetResolver};
use super::validation::{validate_request, ActionCommand, TakeActionRequest};
use crate::db::ModerationStore;
use crate::error::{AppError, Result};
use crate::models::{
    ActionOutcome, ModerationAction, NewStrikeRecord, Report, ReportStatus, ReportType, Severity,
};
use crate::utils::{with_retry, RetryPolicy};

/// Everything computed for one actioned report; feeds audit and notifications.
#[derive(Debug, Clone)]
pub struct Decision {
    pub report_id: Uuid,
    pub report_type: ReportType,
    pub reason: String,
    pub reporter_id: Uuid,
    pub admin_id: Uuid,
    pub action: ModerationAction,
    pub target_id: Uuid,
    pub listing_id: Option<Uuid>,
    pub listing_title: Option<String>,
    pub severity: Severity,
    pub strike_weight: i32,
    pub new_strike_total: i64,
    pub suspension_until: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// Present when the reported listing was taken down
    pub remediation: Option<RemediationSummary>,
}

impl Decision {
    pub fn outcome(&self) -> ActionOutcome {
        ActionOutcome {
            action: self.action,
            severity: Some(self.severity),
            new_strike_total: Some(self.new_strike_total),
            suspension_until: self.suspension_until,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaStep {
    StrikeRecorded,
    SanctionApplied,
    ContentRemoved,
    ReportResolved,
}

#[derive(Debug, Default)]
struct SagaProgress {
    completed: Vec<SagaStep>,
}

impl SagaProgress {
    fn done(&mut self, step: SagaStep) {
        self.completed.push(step);
    }

    fn nothing_written(&self) -> bool {
        self.completed.is_empty()
    }
}

pub struct ModerationService {
    store: Arc<dyn ModerationStore>,
    policy: Arc<SeverityPolicy>,
    default_suspension_days: i64,
    completion_retry: RetryPolicy,
    targets: TargetResolver,
    ledger: StrikeLedger,
    sanctions: SanctionService,
    remediator: ContentRemediator,
    reports: ReportResolver,
    audit: AuditService,
    notifications: NotificationService,
}

impl ModerationService {
    pub fn new(
        store: Arc<dyn ModerationStore>,
        policy: Arc<SeverityPolicy>,
        dispatcher: SideEffectDispatcher,
        default_suspension_days: i64,
    ) -> Self {
        Self {
            targets: TargetResolver::new(store.clone()),
            ledger: StrikeLedger::new(store.clone()),
            sanctions: SanctionService::new(store.clone()),
            remediator: ContentRemediator::new(store.clone()),
            reports: ReportResolver::new(store.clone()),
            audit: AuditService::new(dispatcher.clone()),
            notifications: NotificationService::new(dispatcher),
            store,
            policy,
            default_suspension_days,
            completion_retry: RetryPolicy::default(),
        }
    }

    /// Retry policy for storing a decision's outcome once it is fully applied.
    pub fn with_completion_retry(mut self, policy: RetryPolicy) -> Self {
        self.completion_retry = policy;
        self
    }

    pub async fn take_action(&self, request: &TakeActionRequest) -> Result<ActionOutcome> {
        let command = validate_request(request)?;
        self.execute(command).await
    }

    pub async fn execute(&self, command: ActionCommand) -> Result<ActionOutcome> {
        self.authorize(command.admin_id).await?;

        if !command.action.is_dismiss() {
            if let Some(outcome) = self.replay(&command).await? {
                return Ok(outcome);
            }
        }

        let report = self
            .store
            .find_report(command.report_id, command.report_type)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", command.report_id)))?;

        if report.status != ReportStatus::Pending {
            tracing::info!(
                report_id = %report.id,
                previous_status = report.status.as_str(),
                reviewed_by = ?report.reviewed_by,
                reviewed_at = ?report.reviewed_at,
                "Acting on an already reviewed report"
            );
        }

        let target = self.targets.resolve(&report).await?;

        if command.action.is_dismiss() {
            return self.dismiss(&command).await;
        }

        let target = target.ok_or_else(|| {
            AppError::NotFound(format!(
                "Target account for report {} could not be resolved",
                command.report_id
            ))
        })?;

        let severity = self.policy.classify(&report.reason);
        let now = Utc::now();
        let sanction = Sanction::plan(
            command.action,
            command.suspension_days,
            self.default_suspension_days,
            now,
        )?;

        let claimed = self
            .store
            .claim_decision(command.report_id, command.report_type, command.action)
            .await?;
        if !claimed {
            return Err(in_flight(&command));
        }

        let mut progress = SagaProgress::default();
        let decision = match self
            .enforce(&command, &report, &target, severity, sanction, now, &mut progress)
            .await
        {
            Ok(decision) => decision,
            Err(e) => {
                self.abandon(&command, &progress).await;
                return Err(e);
            }
        };

        let outcome = decision.outcome();
        self.complete(&command, &outcome).await;

        self.audit.log_decision(&decision).await;
        self.notifications.notify_decision(&decision).await;

        tracing::info!(
            report_id = %decision.report_id,
            admin_id = %decision.admin_id,
            target_id = %decision.target_id,
            action = %decision.action,
            severity = %decision.severity,
            new_strike_total = decision.new_strike_total,
            "Report action taken"
        );

        Ok(outcome)
    }

    async fn authorize(&self, admin_id: Uuid) -> Result<()> {
        match self.store.find_account(admin_id).await? {
            Some(account) if account.is_admin => Ok(()),
            _ => {
                tracing::warn!(admin_id = %admin_id, "Non-admin attempted a report action");
                Err(AppError::Forbidden)
            }
        }
    }

    async fn replay(&self, command: &ActionCommand) -> Result<Option<ActionOutcome>> {
        let Some(record) = self
            .store
            .find_decision(command.report_id, command.action)
            .await?
        else {
            return Ok(None);
        };

        match record.completed_outcome() {
            Some(outcome) => {
                tracing::info!(
                    report_id = %command.report_id,
                    action = %command.action,
                    "Replaying completed decision"
                );
                Ok(Some(outcome))
            }
            None => Err(in_flight(command)),
        }
    }

    async fn dismiss(&self, command: &ActionCommand) -> Result<ActionOutcome> {
        self.reports
            .resolve(
                command.report_id,
                command.report_type,
                command.action,
                command.admin_id,
                Utc::now(),
            )
            .await?;

        tracing::info!(
            report_id = %command.report_id,
            admin_id = %command.admin_id,
            "Report dismissed"
        );

        Ok(ActionOutcome::dismissed())
    }

    async fn enforce(
        &self,
        command: &ActionCommand,
        report: &Report,
        target: &Target,
        severity: Severity,
        sanction: Sanction,
        now: DateTime<Utc>,
        progress: &mut SagaProgress,
    ) -> Result<Decision> {
        let strike = self
            .ledger
            .append(NewStrikeRecord {
                user_id: target.user_id(),
                report_id: report.id,
                report_type: command.report_type,
                severity,
                action: command.action,
                admin_id: command.admin_id,
                notes: command.notes.clone(),
            })
            .await?;
        progress.done(SagaStep::StrikeRecorded);

        self.sanctions.apply(&target.account, sanction, now).await?;
        progress.done(SagaStep::SanctionApplied);

        let mut removed = None;
        if remediation::applies(command.report_type, command.action) {
            if let Some(listing_id) = report.listing_id() {
                removed = Some(self.remediator.remove_listing(listing_id).await?);
                progress.done(SagaStep::ContentRemoved);
            }
        }

        self.reports
            .resolve(report.id, command.report_type, command.action, command.admin_id, now)
            .await?;
        progress.done(SagaStep::ReportResolved);

        Ok(Decision {
            report_id: report.id,
            report_type: command.report_type,
            reason: report.reason.clone(),
            reporter_id: report.reporter_id,
            admin_id: command.admin_id,
            action: command.action,
            target_id: target.user_id(),
            listing_id: report.listing_id(),
            listing_title: target.listing_title().map(String::from),
            severity,
            strike_weight: strike.record.strike_weight,
            new_strike_total: strike.new_total,
            suspension_until: sanction.suspension_until(),
            notes: command.notes.clone(),
            remediation: removed,
        })
    }

    /// Stores the outcome for replay. A key left incomplete turns identical
    /// retries into conflicts, so transient store errors are retried.
    async fn complete(&self, command: &ActionCommand, outcome: &ActionOutcome) {
        let store = self.store.as_ref();
        let result = with_retry(&self.completion_retry, || {
            store.complete_decision(command.report_id, command.action, outcome)
        })
        .await;

        if let Err(e) = result {
            tracing::error!(
                report_id = %command.report_id,
                action = %command.action,
                error = %e,
                "Decision applied but its outcome could not be stored"
            );
        }
    }

    /// Releases the decision key when nothing was written, so the admin can retry.
    async fn abandon(&self, command: &ActionCommand, progress: &SagaProgress) {
        if progress.nothing_written() {
            if let Err(e) = self
                .store
                .release_decision(command.report_id, command.action)
                .await
            {
                tracing::warn!(
                    report_id = %command.report_id,
                    error = %e,
                    "Failed to release decision key"
                );
            }
            return;
        }

        tracing::error!(
            report_id = %command.report_id,
            action = %command.action,
            completed_steps = ?progress.completed,
            "Decision partially applied"
        );
    }
}

fn in_flight(command: &ActionCommand) -> AppError {
    AppError::Conflict(format!(
        "A {} decision for report {} is already in progress or was partially applied",
        command.action, command.report_id
    ))
}
