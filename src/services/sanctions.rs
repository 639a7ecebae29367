//! Account sanctions.
//!
//! The standing of an account is never stored as a state enum; it is derived
//! from `is_banned`, `is_suspended` and `suspension_until`. A ban always wins
//! over a suspension and clears it.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::db::ModerationStore;
use crate::error::{AppError, Result};
use crate::models::{Account, ModerationAction};

/// Standing derived from the account's enforcement columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    Active,
    Suspended { until: Option<DateTime<Utc>> },
    Banned,
}

impl Standing {
    pub fn of(account: &Account, now: DateTime<Utc>) -> Self {
        if account.is_banned {
            return Standing::Banned;
        }
        match (account.is_suspended, account.suspension_until) {
            (true, Some(until)) if until <= now => Standing::Active,
            (true, until) => Standing::Suspended { until },
            (false, _) => Standing::Active,
        }
    }
}

/// Account mutation selected by an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanction {
    None,
    Suspend { until: DateTime<Utc> },
    Ban,
}

impl Sanction {
    /// Fails with a validation error when the suspension end is not representable.
    pub fn plan(
        action: ModerationAction,
        requested_days: Option<i64>,
        default_days: i64,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        match action {
            ModerationAction::Dismiss | ModerationAction::Warn => Ok(Sanction::None),
            ModerationAction::TempSuspend => {
                let days = suspension_days(requested_days, default_days);
                let until = Duration::try_days(days)
                    .and_then(|span| now.checked_add_signed(span))
                    .ok_or_else(|| {
                        AppError::BadRequest(format!("A suspension of {} days is out of range", days))
                    })?;
                Ok(Sanction::Suspend { until })
            }
            ModerationAction::Ban => Ok(Sanction::Ban),
        }
    }

    pub fn suspension_until(&self) -> Option<DateTime<Utc>> {
        match self {
            Sanction::Suspend { until } => Some(*until),
            _ => None,
        }
    }
}

/// Caller-supplied days when positive, otherwise the configured default.
pub fn suspension_days(requested: Option<i64>, default_days: i64) -> i64 {
    requested.filter(|&days| days > 0).unwrap_or(default_days)
}

pub struct SanctionService {
    store: Arc<dyn ModerationStore>,
}

impl SanctionService {
    pub fn new(store: Arc<dyn ModerationStore>) -> Self {
        Self { store }
    }

    pub async fn apply(&self, account: &Account, sanction: Sanction, now: DateTime<Utc>) -> Result<()> {
        let previous = Standing::of(account, now);

        let rows = match sanction {
            Sanction::None => return Ok(()),
            Sanction::Suspend { until } => self.store.suspend_account(account.id, until).await?,
            Sanction::Ban => self.store.ban_account(account.id).await?,
        };

        if rows == 0 {
            return Err(missing_account(account.id));
        }

        tracing::warn!(
            user_id = %account.id,
            previous = ?previous,
            sanction = ?sanction,
            "Account sanctioned"
        );

        Ok(())
    }
}

fn missing_account(account_id: Uuid) -> AppError {
    AppError::Internal(anyhow!("account {} disappeared before the sanction was applied", account_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn account(is_banned: bool, is_suspended: bool, until: Option<DateTime<Utc>>) -> Account {
        Account {
            id: Uuid::new_v4(),
            is_admin: false,
            is_banned,
            is_suspended,
            suspension_until: until,
        }
    }

    #[test]
    fn test_temp_suspend_uses_requested_days() {
        let sanction = Sanction::plan(ModerationAction::TempSuspend, Some(10), 7, now()).unwrap();
        assert_eq!(sanction, Sanction::Suspend { until: now() + Duration::days(10) });
    }

    #[test]
    fn test_temp_suspend_defaults_when_missing_or_non_positive() {
        let expected = Sanction::Suspend { until: now() + Duration::days(7) };
        for days in [None, Some(0), Some(-4)] {
            assert_eq!(Sanction::plan(ModerationAction::TempSuspend, days, 7, now()).unwrap(), expected);
        }
    }

    #[test]
    fn test_warn_and_dismiss_do_not_touch_account() {
        assert_eq!(Sanction::plan(ModerationAction::Warn, Some(10), 7, now()).unwrap(), Sanction::None);
        assert_eq!(Sanction::plan(ModerationAction::Dismiss, None, 7, now()).unwrap(), Sanction::None);
        assert_eq!(Sanction::plan(ModerationAction::Ban, Some(10), 7, now()).unwrap(), Sanction::Ban);
        assert_eq!(Sanction::Ban.suspension_until(), None);
    }

    #[test]
    fn test_out_of_range_suspension_is_rejected() {
        for days in [1_000_000_000, i64::MAX] {
            match Sanction::plan(ModerationAction::TempSuspend, Some(days), 7, now()) {
                Err(AppError::BadRequest(_)) => {}
                other => panic!("expected BadRequest, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_standing() {
        let later = now() + Duration::days(2);
        let earlier = now() - Duration::days(2);

        assert_eq!(Standing::of(&account(false, false, None), now()), Standing::Active);
        assert_eq!(
            Standing::of(&account(false, true, Some(later)), now()),
            Standing::Suspended { until: Some(later) }
        );
        assert_eq!(Standing::of(&account(false, true, Some(earlier)), now()), Standing::Active);
        assert_eq!(Standing::of(&account(true, true, Some(later)), now()), Standing::Banned);
    }
}
