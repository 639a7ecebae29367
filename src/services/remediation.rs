// Content remediation - removes a sanctioned listing and the rows that point at it
use std::sync::Arc;

use uuid::Uuid;

use crate::db::ModerationStore;
use crate::error::Result;
use crate::models::{ModerationAction, ReportType};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemediationSummary {
    pub favorites_removed: u64,
    pub reports_removed: u64,
    pub listing_removed: bool,
}

/// Listing reports resolved by suspension or ban take the listing down.
pub fn applies(report_type: ReportType, action: ModerationAction) -> bool {
    report_type == ReportType::Listing && action.removes_content()
}

pub struct ContentRemediator {
    store: Arc<dyn ModerationStore>,
}

impl ContentRemediator {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    /// Favorites, then reports, then the listing itself.
    pub async fn remove_listing(&self, listing_id: Uuid) -> Result<RemediationSummary> {
        let favorites_removed = self.store.delete_listing_favorites(listing_id).await?;
        let reports_removed = self.store.delete_listing_reports(listing_id).await?;
        let listing_removed = self.store.delete_listing(listing_id).await? > 0;

        tracing::info!(
            listing_id = %listing_id,
            favorites_removed,
            reports_removed,
            listing_removed,
            "Listing removed"
        );

        Ok(RemediationSummary {
            favorites_removed,
            reports_removed,
            listing_removed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applies_only_to_listing_takedowns() {
        assert!(applies(ReportType::Listing, ModerationAction::TempSuspend));
        assert!(applies(ReportType::Listing, ModerationAction::Ban));
        assert!(!applies(ReportType::Listing, ModerationAction::Warn));
        assert!(!applies(ReportType::Listing, ModerationAction::Dismiss));
        assert!(!applies(ReportType::User, ModerationAction::Ban));
    }
}
