mod audit_service;
mod dispatcher;
mod moderation_service;
mod notification_service;
mod remediation;
mod report_resolver;
mod sanctions;
mod severity;
mod strike_ledger;
mod target_resolver;
mod validation;

pub use audit_service::{decision_entry, AuditService};
pub use dispatcher::{DispatchWorker, SideEffect, SideEffectDispatcher};
pub use moderation_service::{Decision, ModerationService, SagaStep};
pub use notification_service::{decision_notices, NotificationService};
pub use remediation::{ContentRemediator, RemediationSummary};
pub use report_resolver::ReportResolver;
pub use sanctions::{suspension_days, Sanction, SanctionService, Standing};
pub use severity::SeverityPolicy;
pub use strike_ledger::{total_weight, StrikeEntry, StrikeLedger};
pub use target_resolver::{Target, TargetResolver};
pub use validation::{validate_request, ActionCommand, TakeActionRequest, MAX_NOTES_LEN};
