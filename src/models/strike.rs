use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::decision::ModerationAction;
use super::report::ReportType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Strike weight is fixed per tier: low=1, medium=2, high=3.
    pub fn strike_weight(&self) -> i32 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row from `strike_records`
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StrikeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub report_id: Uuid,
    pub report_type: String,
    pub severity: String,
    pub strike_weight: i32,
    pub action: String,
    pub admin_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for appending a strike
#[derive(Debug, Clone)]
pub struct NewStrikeRecord {
    pub user_id: Uuid,
    pub report_id: Uuid,
    pub report_type: ReportType,
    pub severity: Severity,
    pub action: ModerationAction,
    pub admin_id: Uuid,
    pub notes: Option<String>,
}

impl NewStrikeRecord {
    pub fn strike_weight(&self) -> i32 {
        self.severity.strike_weight()
    }
}
