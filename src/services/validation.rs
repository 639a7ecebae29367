//! Input validation for take-action requests. Runs before any store access.

use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::error::{AppError, Result};
use crate::models::{ModerationAction, ReportType};

pub const MAX_NOTES_LEN: u64 = 2000;
pub const MAX_SUSPENSION_DAYS: i64 = 3650;

/// Raw request body; every field is optional so that missing fields are
/// reported as validation errors instead of extractor rejections.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TakeActionRequest {
    pub report_id: Option<String>,
    pub report_type: Option<String>,
    pub admin_id: Option<String>,
    pub action: Option<String>,
    #[validate(range(max = 3650))]
    pub suspension_days: Option<i64>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ActionCommand {
    pub report_id: Uuid,
    pub report_type: ReportType,
    pub admin_id: Uuid,
    pub action: ModerationAction,
    pub suspension_days: Option<i64>,
    pub notes: Option<String>,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{} is required", field)))
}

fn parse_id(value: &Option<String>, field: &str) -> Result<Uuid> {
    let raw = required(value, field)?;
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {}", field)))
}

fn describe(errors: &ValidationErrors) -> String {
    if errors.field_errors().contains_key("suspension_days") {
        format!("suspensionDays must be at most {}", MAX_SUSPENSION_DAYS)
    } else {
        format!("notes must be at most {} characters", MAX_NOTES_LEN)
    }
}

pub fn validate_request(request: &TakeActionRequest) -> Result<ActionCommand> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(describe(&e)))?;

    let report_id = parse_id(&request.report_id, "reportId")?;
    let admin_id = parse_id(&request.admin_id, "adminId")?;

    let report_type = required(&request.report_type, "reportType")?
        .parse::<ReportType>()
        .map_err(|_| AppError::BadRequest("reportType must be one of: listing, user".to_string()))?;

    let action = required(&request.action, "action")?
        .parse::<ModerationAction>()
        .map_err(|_| {
            AppError::BadRequest("action must be one of: warn, temp_suspend, ban, dismiss".to_string())
        })?;

    let notes = request
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(String::from);

    Ok(ActionCommand {
        report_id,
        report_type,
        admin_id,
        action,
        suspension_days: request.suspension_days,
        notes,
    })
}
