use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ReportUpdate,
    AccountWarning,
    AccountSuspended,
    AccountBanned,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::ReportUpdate => "report_update",
            NotificationType::AccountWarning => "account_warning",
            NotificationType::AccountSuspended => "account_suspended",
            NotificationType::AccountBanned => "account_banned",
        }
    }
}

/// Notification row to insert; `is_read` is left to the table default (false).
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub related_id: Option<Uuid>,
}
