//! PostgreSQL implementation of the store traits.
//!
//! `profiles`, `listings`, `favorites`, `listing_reports`, `user_reports` and
//! `notifications` belong to the marketplace; only `strike_records`,
//! `moderation_decisions` and `admin_audit_logs` are created by our migrations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Database, ModerationStore, SideEffectSink};
use crate::error::Result;
use crate::models::{
    Account, ActionOutcome, CreateAuditLog, DecisionRecord, Listing, ListingReportRow,
    ModerationAction, NewNotification, NewStrikeRecord, Report, ReportStatus, ReportType,
    StrikeRecord, UserReportRow,
};

fn report_table(report_type: ReportType) -> &'static str {
    match report_type {
        ReportType::Listing => "listing_reports",
        ReportType::User => "user_reports",
    }
}

#[async_trait]
impl ModerationStore for Database {
    async fn find_account(&self, account_id: Uuid) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id,
                   COALESCE(is_admin, false) AS is_admin,
                   COALESCE(is_banned, false) AS is_banned,
                   COALESCE(is_suspended, false) AS is_suspended,
                   suspension_until
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pg)
        .await?;

        Ok(account)
    }

    async fn suspend_account(&self, account_id: Uuid, until: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET is_suspended = true,
                suspension_until = $2
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .bind(until)
        .execute(&self.pg)
        .await?;

        Ok(result.rows_affected())
    }

    async fn ban_account(&self, account_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET is_banned = true,
                is_suspended = false,
                suspension_until = NULL
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .execute(&self.pg)
        .await?;

        Ok(result.rows_affected())
    }

    async fn find_report(&self, report_id: Uuid, report_type: ReportType) -> Result<Option<Report>> {
        let report = match report_type {
            ReportType::Listing => sqlx::query_as::<_, ListingReportRow>(
                r#"
                SELECT id, listing_id, reporter_id, reason, status,
                       reviewed_at, reviewed_by
                FROM listing_reports
                WHERE id = $1
                "#,
            )
            .bind(report_id)
            .fetch_optional(&self.pg)
            .await?
            .map(Report::from),
            ReportType::User => sqlx::query_as::<_, UserReportRow>(
                r#"
                SELECT id, reported_user_id, reporter_id, reason, status,
                       reviewed_at, reviewed_by
                FROM user_reports
                WHERE id = $1
                "#,
            )
            .bind(report_id)
            .fetch_optional(&self.pg)
            .await?
            .map(Report::from),
        };

        Ok(report)
    }

    async fn review_report(
        &self,
        report_id: Uuid,
        report_type: ReportType,
        status: ReportStatus,
        reviewed_by: Uuid,
        reviewed_at: DateTime<Utc>,
    ) -> Result<u64> {
        let query = format!(
            r#"
            UPDATE {}
            SET status = $2,
                reviewed_at = $3,
                reviewed_by = $4
            WHERE id = $1
            "#,
            report_table(report_type)
        );

        let result = sqlx::query(&query)
            .bind(report_id)
            .bind(status.as_str())
            .bind(reviewed_at)
            .bind(reviewed_by)
            .execute(&self.pg)
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_listing(&self, listing_id: Uuid) -> Result<Option<Listing>> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            SELECT id, user_id AS owner_id, COALESCE(title, '') AS title
            FROM listings
            WHERE id = $1
            "#,
        )
        .bind(listing_id)
        .fetch_optional(&self.pg)
        .await?;

        Ok(listing)
    }

    async fn delete_listing_favorites(&self, listing_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM favorites WHERE listing_id = $1")
            .bind(listing_id)
            .execute(&self.pg)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_listing_reports(&self, listing_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM listing_reports WHERE listing_id = $1")
            .bind(listing_id)
            .execute(&self.pg)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_listing(&self, listing_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(listing_id)
            .execute(&self.pg)
            .await?;

        Ok(result.rows_affected())
    }

    async fn insert_strike(&self, strike: &NewStrikeRecord) -> Result<StrikeRecord> {
        let record = sqlx::query_as::<_, StrikeRecord>(
            r#"
            INSERT INTO strike_records (
                id,
                user_id,
                report_id,
                report_type,
                severity,
                strike_weight,
                action,
                admin_id,
                notes,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING id, user_id, report_id, report_type, severity, strike_weight,
                      action, admin_id, notes, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(strike.user_id)
        .bind(strike.report_id)
        .bind(strike.report_type.as_str())
        .bind(strike.severity.as_str())
        .bind(strike.strike_weight())
        .bind(strike.action.as_str())
        .bind(strike.admin_id)
        .bind(&strike.notes)
        .fetch_one(&self.pg)
        .await?;

        Ok(record)
    }

    async fn list_strikes(&self, user_id: Uuid) -> Result<Vec<StrikeRecord>> {
        let records = sqlx::query_as::<_, StrikeRecord>(
            r#"
            SELECT id, user_id, report_id, report_type, severity, strike_weight,
                   action, admin_id, notes, created_at
            FROM strike_records
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pg)
        .await?;

        Ok(records)
    }

    async fn find_decision(
        &self,
        report_id: Uuid,
        action: ModerationAction,
    ) -> Result<Option<DecisionRecord>> {
        let record = sqlx::query_as::<_, DecisionRecord>(
            r#"
            SELECT report_id, action, report_type, outcome, created_at, completed_at
            FROM moderation_decisions
            WHERE report_id = $1 AND action = $2
            "#,
        )
        .bind(report_id)
        .bind(action.as_str())
        .fetch_optional(&self.pg)
        .await?;

        Ok(record)
    }

    async fn claim_decision(
        &self,
        report_id: Uuid,
        report_type: ReportType,
        action: ModerationAction,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO moderation_decisions (report_id, action, report_type, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (report_id, action) DO NOTHING
            "#,
        )
        .bind(report_id)
        .bind(action.as_str())
        .bind(report_type.as_str())
        .execute(&self.pg)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn complete_decision(
        &self,
        report_id: Uuid,
        action: ModerationAction,
        outcome: &ActionOutcome,
    ) -> Result<()> {
        let outcome = serde_json::to_value(outcome).map_err(anyhow::Error::from)?;

        sqlx::query(
            r#"
            UPDATE moderation_decisions
            SET outcome = $3,
                completed_at = NOW()
            WHERE report_id = $1 AND action = $2
            "#,
        )
        .bind(report_id)
        .bind(action.as_str())
        .bind(outcome)
        .execute(&self.pg)
        .await?;

        Ok(())
    }

    async fn release_decision(&self, report_id: Uuid, action: ModerationAction) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM moderation_decisions
            WHERE report_id = $1 AND action = $2 AND completed_at IS NULL
            "#,
        )
        .bind(report_id)
        .bind(action.as_str())
        .execute(&self.pg)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl SideEffectSink for Database {
    async fn insert_notification(&self, notification: &NewNotification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, type, title, message, related_id, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, false, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(notification.user_id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.related_id)
        .execute(&self.pg)
        .await?;

        Ok(())
    }

    async fn insert_audit_log(&self, entry: &CreateAuditLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_audit_logs (id, admin_id, action, target_id, details, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.admin_id)
        .bind(entry.action.as_str())
        .bind(entry.target_id)
        .bind(&entry.details)
        .execute(&self.pg)
        .await?;

        Ok(())
    }
}
