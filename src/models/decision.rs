use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::strike::Severity;

/// Admin disposition of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Warn,
    TempSuspend,
    Ban,
    Dismiss,
}

impl ModerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::Warn => "warn",
            ModerationAction::TempSuspend => "temp_suspend",
            ModerationAction::Ban => "ban",
            ModerationAction::Dismiss => "dismiss",
        }
    }

    pub fn is_dismiss(&self) -> bool {
        matches!(self, ModerationAction::Dismiss)
    }

    /// Actions that take the reported listing down.
    pub fn removes_content(&self) -> bool {
        matches!(self, ModerationAction::TempSuspend | ModerationAction::Ban)
    }
}

impl fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warn" => Ok(ModerationAction::Warn),
            "temp_suspend" => Ok(ModerationAction::TempSuspend),
            "ban" => Ok(ModerationAction::Ban),
            "dismiss" => Ok(ModerationAction::Dismiss),
            other => Err(format!("unknown action '{}'", other)),
        }
    }
}

/// Result of one decision, returned to the caller and persisted for replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub action: ModerationAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_strike_total: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspension_until: Option<DateTime<Utc>>,
}

impl ActionOutcome {
    pub fn dismissed() -> Self {
        Self {
            action: ModerationAction::Dismiss,
            severity: None,
            new_strike_total: None,
            suspension_until: None,
        }
    }
}

/// Row from `moderation_decisions`, keyed by (report_id, action)
#[derive(Debug, Clone, FromRow)]
pub struct DecisionRecord {
    pub report_id: Uuid,
    pub action: String,
    pub report_type: String,
    pub outcome: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl DecisionRecord {
    /// Stored outcome of a completed decision; `None` while in flight.
    pub fn completed_outcome(&self) -> Option<ActionOutcome> {
        self.outcome
            .clone()
            .and_then(|value| serde_json::from_value(value).ok())
    }
}
