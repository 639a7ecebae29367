pub mod account;
pub mod audit_log;
pub mod decision;
pub mod notification;
pub mod report;
pub mod strike;

pub use account::{Account, Listing};
pub use audit_log::{AuditAction, CreateAuditLog};
pub use decision::{ActionOutcome, DecisionRecord, ModerationAction};
pub use notification::{NewNotification, NotificationType};
pub use report::{ListingReportRow, Report, ReportStatus, ReportSubject, ReportType, UserReportRow};
pub use strike::{NewStrikeRecord, Severity, StrikeRecord};
