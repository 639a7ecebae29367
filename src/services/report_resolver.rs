use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::ModerationStore;
use crate::error::Result;
use crate::models::{ModerationAction, ReportStatus, ReportType};

pub struct ReportResolver {
    store: Arc<dyn ModerationStore>,
}

impl ReportResolver {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    /// Marks the report reviewed. A missing row (already removed with its
    /// listing) is not an error.
    pub async fn resolve(
        &self,
        report_id: Uuid,
        report_type: ReportType,
        action: ModerationAction,
        admin_id: Uuid,
        reviewed_at: DateTime<Utc>,
    ) -> Result<ReportStatus> {
        let status = if action.is_dismiss() {
            ReportStatus::Dismissed
        } else {
            ReportStatus::Resolved
        };

        let rows = self
            .store
            .review_report(report_id, report_type, status, admin_id, reviewed_at)
            .await?;

        if rows == 0 {
            tracing::debug!(report_id = %report_id, "Report already removed, nothing to mark");
        } else {
            tracing::info!(
                report_id = %report_id,
                admin_id = %admin_id,
                status = status.as_str(),
                "Report reviewed"
            );
        }

        Ok(status)
    }
}
