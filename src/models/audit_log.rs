use serde::Serialize;
use uuid::Uuid;

use super::decision::ModerationAction;

/// Entry for `admin_audit_logs`
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub admin_id: Uuid,
    pub action: AuditAction,
    pub target_id: Option<Uuid>,
    pub details: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    ReportActionWarn,
    ReportActionTempSuspend,
    ReportActionBan,
    ReportActionDismiss,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::ReportActionWarn => "report_action_warn",
            AuditAction::ReportActionTempSuspend => "report_action_temp_suspend",
            AuditAction::ReportActionBan => "report_action_ban",
            AuditAction::ReportActionDismiss => "report_action_dismiss",
        }
    }
}

impl From<ModerationAction> for AuditAction {
    fn from(action: ModerationAction) -> Self {
        match action {
            ModerationAction::Warn => AuditAction::ReportActionWarn,
            ModerationAction::TempSuspend => AuditAction::ReportActionTempSuspend,
            ModerationAction::Ban => AuditAction::ReportActionBan,
            ModerationAction::Dismiss => AuditAction::ReportActionDismiss,
        }
    }
}
