// Audit service - records admin decisions through the side-effect dispatcher
use serde_json::json;

use super::dispatcher::{SideEffect, SideEffectDispatcher};
use super::moderation_service::Decision;
use crate::models::{AuditAction, CreateAuditLog};

pub struct AuditService {
    dispatcher: SideEffectDispatcher,
}

impl AuditService {
    pub fn new(dispatcher: SideEffectDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Best-effort: delivery failures are logged by the dispatcher and never returned.
    pub async fn log(&self, entry: CreateAuditLog) {
        self.dispatcher.dispatch(vec![SideEffect::Audit(entry)]).await;
    }

    pub async fn log_decision(&self, decision: &Decision) {
        self.log(decision_entry(decision)).await;
    }
}

pub fn decision_entry(decision: &Decision) -> CreateAuditLog {
    CreateAuditLog {
        admin_id: decision.admin_id,
        action: AuditAction::from(decision.action),
        target_id: Some(decision.target_id),
        details: json!({
            "reportId": decision.report_id,
            "reportType": decision.report_type,
            "reason": decision.reason,
            "severity": decision.severity,
            "strikeWeight": decision.strike_weight,
            "newStrikeTotal": decision.new_strike_total,
            "suspensionUntil": decision.suspension_until.map(|t| t.to_rfc3339()),
            "notes": decision.notes,
            "listingRemoval": decision.remediation.as_ref().map(|removal| json!({
                "favoritesRemoved": removal.favorites_removed,
                "reportsRemoved": removal.reports_removed,
                "listingRemoved": removal.listing_removed,
            })),
        }),
    }
}
