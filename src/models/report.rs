//! Report models for the two report tables (`listing_reports`, `user_reports`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Listing,
    User,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Listing => "listing",
            ReportType::User => "user",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "listing" => Ok(ReportType::Listing),
            "user" => Ok(ReportType::User),
            other => Err(format!("unknown report type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Dismissed,
    Resolved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Dismissed => "dismissed",
            ReportStatus::Resolved => "resolved",
        }
    }

    /// Unrecognised values are treated as still pending.
    pub fn from_db(value: &str) -> Self {
        match value {
            "dismissed" => ReportStatus::Dismissed,
            "resolved" => ReportStatus::Resolved,
            _ => ReportStatus::Pending,
        }
    }
}

/// What a report points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSubject {
    Listing { listing_id: Uuid },
    User { reported_user_id: Option<Uuid> },
}

#[derive(Debug, Clone)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub reason: String,
    pub status: ReportStatus,
    pub subject: ReportSubject,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
}

impl Report {
    pub fn listing_id(&self) -> Option<Uuid> {
        match self.subject {
            ReportSubject::Listing { listing_id } => Some(listing_id),
            ReportSubject::User { .. } => None,
        }
    }
}

/// Row from `listing_reports`
#[derive(Debug, Clone, FromRow)]
pub struct ListingReportRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub reporter_id: Uuid,
    pub reason: String,
    pub status: String,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
}

impl From<ListingReportRow> for Report {
    fn from(row: ListingReportRow) -> Self {
        Self {
            id: row.id,
            reporter_id: row.reporter_id,
            reason: row.reason,
            status: ReportStatus::from_db(&row.status),
            subject: ReportSubject::Listing {
                listing_id: row.listing_id,
            },
            reviewed_at: row.reviewed_at,
            reviewed_by: row.reviewed_by,
        }
    }
}

/// Row from `user_reports`
#[derive(Debug, Clone, FromRow)]
pub struct UserReportRow {
    pub id: Uuid,
    pub reported_user_id: Option<Uuid>,
    pub reporter_id: Uuid,
    pub reason: String,
    pub status: String,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
}

impl From<UserReportRow> for Report {
    fn from(row: UserReportRow) -> Self {
        Self {
            id: row.id,
            reporter_id: row.reporter_id,
            reason: row.reason,
            status: ReportStatus::from_db(&row.status),
            subject: ReportSubject::User {
                reported_user_id: row.reported_user_id,
            },
            reviewed_at: row.reviewed_at,
            reviewed_by: row.reviewed_by,
        }
    }
}
