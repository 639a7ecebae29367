mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::models::{
    Account, ActionOutcome, CreateAuditLog, DecisionRecord, Listing, ModerationAction,
    NewNotification, NewStrikeRecord, Report, ReportStatus, ReportType, StrikeRecord,
};

/// Keyed operations the engine performs against the marketplace store.
///
/// Every call is an independent write or read; nothing here opens a transaction.
#[async_trait]
pub trait ModerationStore: Send + Sync {
    async fn find_account(&self, account_id: Uuid) -> Result<Option<Account>>;

    /// Sets `is_suspended` and `suspension_until`; returns rows affected.
    async fn suspend_account(&self, account_id: Uuid, until: DateTime<Utc>) -> Result<u64>;

    /// Sets `is_banned` and clears both suspension fields; returns rows affected.
    async fn ban_account(&self, account_id: Uuid) -> Result<u64>;

    async fn find_report(&self, report_id: Uuid, report_type: ReportType) -> Result<Option<Report>>;

    /// Returns rows affected; zero when the report row no longer exists.
    async fn review_report(
        &self,
        report_id: Uuid,
        report_type: ReportType,
        status: ReportStatus,
        reviewed_by: Uuid,
        reviewed_at: DateTime<Utc>,
    ) -> Result<u64>;

    async fn find_listing(&self, listing_id: Uuid) -> Result<Option<Listing>>;

    async fn delete_listing_favorites(&self, listing_id: Uuid) -> Result<u64>;

    async fn delete_listing_reports(&self, listing_id: Uuid) -> Result<u64>;

    async fn delete_listing(&self, listing_id: Uuid) -> Result<u64>;

    async fn insert_strike(&self, strike: &NewStrikeRecord) -> Result<StrikeRecord>;

    async fn list_strikes(&self, user_id: Uuid) -> Result<Vec<StrikeRecord>>;

    async fn find_decision(
        &self,
        report_id: Uuid,
        action: ModerationAction,
    ) -> Result<Option<DecisionRecord>>;

    /// Inserts the decision key; `false` when another request already holds it.
    async fn claim_decision(
        &self,
        report_id: Uuid,
        report_type: ReportType,
        action: ModerationAction,
    ) -> Result<bool>;

    async fn complete_decision(
        &self,
        report_id: Uuid,
        action: ModerationAction,
        outcome: &ActionOutcome,
    ) -> Result<()>;

    async fn release_decision(&self, report_id: Uuid, action: ModerationAction) -> Result<()>;
}

/// Destination for best-effort side effects (notifications, audit entries)
#[async_trait]
pub trait SideEffectSink: Send + Sync {
    async fn insert_notification(&self, notification: &NewNotification) -> Result<()>;

    async fn insert_audit_log(&self, entry: &CreateAuditLog) -> Result<()>;
}

#[derive(Clone)]
pub struct Database {
    pub pg: PgPool,
}

impl Database {
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let pg = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");

        Ok(Self { pg })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pg).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }
}
