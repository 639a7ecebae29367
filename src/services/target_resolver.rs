// Target resolver - finds the account a decision applies to
use std::sync::Arc;

use uuid::Uuid;

use crate::db::ModerationStore;
use crate::error::Result;
use crate::models::{Account, Listing, Report, ReportSubject};

/// Account under enforcement, plus the reported listing when there is one
#[derive(Debug, Clone)]
pub struct Target {
    pub account: Account,
    pub listing: Option<Listing>,
}

impl Target {
    pub fn user_id(&self) -> Uuid {
        self.account.id
    }

    pub fn listing_title(&self) -> Option<&str> {
        self.listing.as_ref().map(|l| l.title.as_str())
    }
}

pub struct TargetResolver {
    store: Arc<dyn ModerationStore>,
}

impl TargetResolver {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    /// `Ok(None)` when the report's subject (listing, owner or user) no longer exists.
    pub async fn resolve(&self, report: &Report) -> Result<Option<Target>> {
        let (user_id, listing) = match report.subject {
            ReportSubject::User { reported_user_id } => match reported_user_id {
                Some(user_id) => (user_id, None),
                None => return Ok(None),
            },
            ReportSubject::Listing { listing_id } => match self.store.find_listing(listing_id).await? {
                Some(listing) => (listing.owner_id, Some(listing)),
                None => {
                    tracing::debug!(report_id = %report.id, listing_id = %listing_id, "Reported listing not found");
                    return Ok(None);
                }
            },
        };

        let Some(account) = self.store.find_account(user_id).await? else {
            tracing::debug!(report_id = %report.id, user_id = %user_id, "Target account not found");
            return Ok(None);
        };

        Ok(Some(Target { account, listing }))
    }
}
