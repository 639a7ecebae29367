//! In-memory store used by the integration tests.
//!
//! Mirrors the row semantics of the PostgreSQL implementation closely enough
//! for the engine: rows-affected counts, decision-key conflicts, cascading
//! listing removal. Individual calls can be made to fail.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use moderation_api::db::{ModerationStore, SideEffectSink};
use moderation_api::error::{AppError, Result};
use moderation_api::models::{
    Account, ActionOutcome, CreateAuditLog, DecisionRecord, Listing, ModerationAction,
    NewNotification, NewStrikeRecord, Report, ReportStatus, ReportSubject, ReportType,
    StrikeRecord,
};
use moderation_api::services::{ModerationService, SeverityPolicy, SideEffectDispatcher, TakeActionRequest};
use moderation_api::utils::RetryPolicy;

#[derive(Default)]
struct State {
    accounts: HashMap<Uuid, Account>,
    listings: HashMap<Uuid, Listing>,
    /// (user_id, listing_id)
    favorites: Vec<(Uuid, Uuid)>,
    listing_reports: HashMap<Uuid, Report>,
    user_reports: HashMap<Uuid, Report>,
    strikes: Vec<StrikeRecord>,
    decisions: HashMap<(Uuid, ModerationAction), DecisionRecord>,
    notifications: Vec<NewNotification>,
    audit_logs: Vec<CreateAuditLog>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    calls: AtomicUsize,
    pub fail_insert_strike: AtomicBool,
    pub fail_sanction: AtomicBool,
    pub fail_side_effects: AtomicBool,
    /// Number of upcoming `complete_decision` calls that fail.
    pub complete_failures_left: AtomicUsize,
}

fn injected(what: &str) -> AppError {
    AppError::Internal(anyhow!("injected failure: {}", what))
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of `ModerationStore` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn add_account(&self, is_admin: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().accounts.insert(
            id,
            Account {
                id,
                is_admin,
                is_banned: false,
                is_suspended: false,
                suspension_until: None,
            },
        );
        id
    }

    pub fn add_admin(&self) -> Uuid {
        self.add_account(true)
    }

    pub fn add_user(&self) -> Uuid {
        self.add_account(false)
    }

    pub fn set_suspension(&self, user_id: Uuid, until: DateTime<Utc>) {
        let mut state = self.state.lock().unwrap();
        if let Some(account) = state.accounts.get_mut(&user_id) {
            account.is_suspended = true;
            account.suspension_until = Some(until);
        }
    }

    pub fn add_listing(&self, owner_id: Uuid, title: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().listings.insert(
            id,
            Listing {
                id,
                owner_id,
                title: title.to_string(),
            },
        );
        id
    }

    pub fn add_favorite(&self, user_id: Uuid, listing_id: Uuid) {
        self.state.lock().unwrap().favorites.push((user_id, listing_id));
    }

    pub fn add_listing_report(&self, listing_id: Uuid, reporter_id: Uuid, reason: &str) -> Uuid {
        let report = new_report(reporter_id, reason, ReportSubject::Listing { listing_id });
        let id = report.id;
        self.state.lock().unwrap().listing_reports.insert(id, report);
        id
    }

    pub fn add_user_report(&self, reported_user_id: Option<Uuid>, reporter_id: Uuid, reason: &str) -> Uuid {
        let report = new_report(reporter_id, reason, ReportSubject::User { reported_user_id });
        let id = report.id;
        self.state.lock().unwrap().user_reports.insert(id, report);
        id
    }

    /// Leaves a claimed but incomplete decision key behind.
    pub fn add_pending_decision(&self, report_id: Uuid, report_type: ReportType, action: ModerationAction) {
        self.state.lock().unwrap().decisions.insert(
            (report_id, action),
            DecisionRecord {
                report_id,
                action: action.as_str().to_string(),
                report_type: report_type.as_str().to_string(),
                outcome: None,
                created_at: Utc::now(),
                completed_at: None,
            },
        );
    }

    pub fn account(&self, user_id: Uuid) -> Account {
        self.state.lock().unwrap().accounts[&user_id].clone()
    }

    pub fn listing_exists(&self, listing_id: Uuid) -> bool {
        self.state.lock().unwrap().listings.contains_key(&listing_id)
    }

    pub fn favorites_for(&self, listing_id: Uuid) -> usize {
        let state = self.state.lock().unwrap();
        state.favorites.iter().filter(|(_, l)| *l == listing_id).count()
    }

    pub fn report(&self, report_id: Uuid) -> Option<Report> {
        let state = self.state.lock().unwrap();
        state
            .listing_reports
            .get(&report_id)
            .or_else(|| state.user_reports.get(&report_id))
            .cloned()
    }

    pub fn strikes_for(&self, user_id: Uuid) -> Vec<StrikeRecord> {
        let state = self.state.lock().unwrap();
        state.strikes.iter().filter(|s| s.user_id == user_id).cloned().collect()
    }

    pub fn strike_count(&self) -> usize {
        self.state.lock().unwrap().strikes.len()
    }

    pub fn decision(&self, report_id: Uuid, action: ModerationAction) -> Option<DecisionRecord> {
        self.state.lock().unwrap().decisions.get(&(report_id, action)).cloned()
    }

    pub fn notifications(&self) -> Vec<NewNotification> {
        self.state.lock().unwrap().notifications.clone()
    }

    pub fn audit_logs(&self) -> Vec<CreateAuditLog> {
        self.state.lock().unwrap().audit_logs.clone()
    }
}

fn new_report(reporter_id: Uuid, reason: &str, subject: ReportSubject) -> Report {
    Report {
        id: Uuid::new_v4(),
        reporter_id,
        reason: reason.to_string(),
        status: ReportStatus::Pending,
        subject,
        reviewed_at: None,
        reviewed_by: None,
    }
}

#[async_trait]
impl ModerationStore for MemoryStore {
    async fn find_account(&self, account_id: Uuid) -> Result<Option<Account>> {
        self.touch();
        Ok(self.state.lock().unwrap().accounts.get(&account_id).cloned())
    }

    async fn suspend_account(&self, account_id: Uuid, until: DateTime<Utc>) -> Result<u64> {
        self.touch();
        if self.fail_sanction.load(Ordering::SeqCst) {
            return Err(injected("suspend_account"));
        }
        let mut state = self.state.lock().unwrap();
        Ok(match state.accounts.get_mut(&account_id) {
            Some(account) => {
                account.is_suspended = true;
                account.suspension_until = Some(until);
                1
            }
            None => 0,
        })
    }

    async fn ban_account(&self, account_id: Uuid) -> Result<u64> {
        self.touch();
        if self.fail_sanction.load(Ordering::SeqCst) {
            return Err(injected("ban_account"));
        }
        let mut state = self.state.lock().unwrap();
        Ok(match state.accounts.get_mut(&account_id) {
            Some(account) => {
                account.is_banned = true;
                account.is_suspended = false;
                account.suspension_until = None;
                1
            }
            None => 0,
        })
    }

    async fn find_report(&self, report_id: Uuid, report_type: ReportType) -> Result<Option<Report>> {
        self.touch();
        let state = self.state.lock().unwrap();
        let table = match report_type {
            ReportType::Listing => &state.listing_reports,
            ReportType::User => &state.user_reports,
        };
        Ok(table.get(&report_id).cloned())
    }

    async fn review_report(
        &self,
        report_id: Uuid,
        report_type: ReportType,
        status: ReportStatus,
        reviewed_by: Uuid,
        reviewed_at: DateTime<Utc>,
    ) -> Result<u64> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        let table = match report_type {
            ReportType::Listing => &mut state.listing_reports,
            ReportType::User => &mut state.user_reports,
        };
        Ok(match table.get_mut(&report_id) {
            Some(report) => {
                report.status = status;
                report.reviewed_by = Some(reviewed_by);
                report.reviewed_at = Some(reviewed_at);
                1
            }
            None => 0,
        })
    }

    async fn find_listing(&self, listing_id: Uuid) -> Result<Option<Listing>> {
        self.touch();
        Ok(self.state.lock().unwrap().listings.get(&listing_id).cloned())
    }

    async fn delete_listing_favorites(&self, listing_id: Uuid) -> Result<u64> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        let before = state.favorites.len();
        state.favorites.retain(|(_, l)| *l != listing_id);
        Ok((before - state.favorites.len()) as u64)
    }

    async fn delete_listing_reports(&self, listing_id: Uuid) -> Result<u64> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        let before = state.listing_reports.len();
        state
            .listing_reports
            .retain(|_, r| r.subject != ReportSubject::Listing { listing_id });
        Ok((before - state.listing_reports.len()) as u64)
    }

    async fn delete_listing(&self, listing_id: Uuid) -> Result<u64> {
        self.touch();
        Ok(self.state.lock().unwrap().listings.remove(&listing_id).map_or(0, |_| 1))
    }

    async fn insert_strike(&self, strike: &NewStrikeRecord) -> Result<StrikeRecord> {
        self.touch();
        if self.fail_insert_strike.load(Ordering::SeqCst) {
            return Err(injected("insert_strike"));
        }
        let record = StrikeRecord {
            id: Uuid::new_v4(),
            user_id: strike.user_id,
            report_id: strike.report_id,
            report_type: strike.report_type.as_str().to_string(),
            severity: strike.severity.as_str().to_string(),
            strike_weight: strike.strike_weight(),
            action: strike.action.as_str().to_string(),
            admin_id: strike.admin_id,
            notes: strike.notes.clone(),
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().strikes.push(record.clone());
        Ok(record)
    }

    async fn list_strikes(&self, user_id: Uuid) -> Result<Vec<StrikeRecord>> {
        self.touch();
        Ok(self.strikes_for(user_id))
    }

    async fn find_decision(
        &self,
        report_id: Uuid,
        action: ModerationAction,
    ) -> Result<Option<DecisionRecord>> {
        self.touch();
        Ok(self.decision(report_id, action))
    }

    async fn claim_decision(
        &self,
        report_id: Uuid,
        report_type: ReportType,
        action: ModerationAction,
    ) -> Result<bool> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        if state.decisions.contains_key(&(report_id, action)) {
            return Ok(false);
        }
        state.decisions.insert(
            (report_id, action),
            DecisionRecord {
                report_id,
                action: action.as_str().to_string(),
                report_type: report_type.as_str().to_string(),
                outcome: None,
                created_at: Utc::now(),
                completed_at: None,
            },
        );
        Ok(true)
    }

    async fn complete_decision(
        &self,
        report_id: Uuid,
        action: ModerationAction,
        outcome: &ActionOutcome,
    ) -> Result<()> {
        self.touch();
        let failing = self
            .complete_failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(injected("complete_decision"));
        }
        let value = serde_json::to_value(outcome).map_err(|e| AppError::Internal(e.into()))?;
        let mut state = self.state.lock().unwrap();
        if let Some(record) = state.decisions.get_mut(&(report_id, action)) {
            record.outcome = Some(value);
            record.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn release_decision(&self, report_id: Uuid, action: ModerationAction) -> Result<()> {
        self.touch();
        let mut state = self.state.lock().unwrap();
        let pending = state
            .decisions
            .get(&(report_id, action))
            .is_some_and(|record| record.completed_at.is_none());
        if pending {
            state.decisions.remove(&(report_id, action));
        }
        Ok(())
    }
}

#[async_trait]
impl SideEffectSink for MemoryStore {
    async fn insert_notification(&self, notification: &NewNotification) -> Result<()> {
        if self.fail_side_effects.load(Ordering::SeqCst) {
            return Err(injected("insert_notification"));
        }
        self.state.lock().unwrap().notifications.push(notification.clone());
        Ok(())
    }

    async fn insert_audit_log(&self, entry: &CreateAuditLog) -> Result<()> {
        if self.fail_side_effects.load(Ordering::SeqCst) {
            return Err(injected("insert_audit_log"));
        }
        self.state.lock().unwrap().audit_logs.push(entry.clone());
        Ok(())
    }
}

pub const DEFAULT_SUSPENSION_DAYS: i64 = 7;

/// Engine over `store` with inline side-effect delivery, so effects are
/// visible as soon as `take_action` returns.
pub fn engine_with_policy(store: &Arc<MemoryStore>, policy: SeverityPolicy) -> ModerationService {
    let moderation: Arc<dyn ModerationStore> = store.clone();
    let sink: Arc<dyn SideEffectSink> = store.clone();
    ModerationService::new(
        moderation,
        Arc::new(policy),
        SideEffectDispatcher::inline(sink, RetryPolicy::no_retry()),
        DEFAULT_SUSPENSION_DAYS,
    )
    .with_completion_retry(RetryPolicy {
        max_retries: 2,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
        ..RetryPolicy::default()
    })
}

pub fn engine(store: &Arc<MemoryStore>) -> ModerationService {
    engine_with_policy(store, SeverityPolicy::default())
}

pub fn request(report_id: Uuid, report_type: &str, admin_id: Uuid, action: &str) -> TakeActionRequest {
    TakeActionRequest {
        report_id: Some(report_id.to_string()),
        report_type: Some(report_type.to_string()),
        admin_id: Some(admin_id.to_string()),
        action: Some(action.to_string()),
        suspension_days: None,
        notes: None,
    }
}
