//! Notices sent after a decision: one to the reporter, one to the target.
//! Dismissals send nothing.

use super::dispatcher::{SideEffect, SideEffectDispatcher};
use super::moderation_service::Decision;
use crate::models::{ModerationAction, NewNotification, NotificationType};

pub struct NotificationService {
    dispatcher: SideEffectDispatcher,
}

impl NotificationService {
    pub fn new(dispatcher: SideEffectDispatcher) -> Self {
        Self { dispatcher }
    }

    pub async fn notify_decision(&self, decision: &Decision) {
        let notices = decision_notices(decision);
        if notices.is_empty() {
            return;
        }

        tracing::debug!(
            report_id = %decision.report_id,
            count = notices.len(),
            "Dispatching decision notices"
        );

        self.dispatcher
            .dispatch(notices.into_iter().map(SideEffect::Notification).collect())
            .await;
    }
}

pub fn decision_notices(decision: &Decision) -> Vec<NewNotification> {
    if decision.action.is_dismiss() {
        return Vec::new();
    }

    let mut notices = vec![reporter_notice(decision)];
    notices.extend(target_notice(decision));
    notices
}

pub fn reporter_notice(decision: &Decision) -> NewNotification {
    NewNotification {
        user_id: decision.reporter_id,
        kind: NotificationType::ReportUpdate,
        title: "Action taken on your report".to_string(),
        message: "Thanks for your report. Our moderation team reviewed it and took action."
            .to_string(),
        related_id: Some(decision.report_id),
    }
}

pub fn target_notice(decision: &Decision) -> Option<NewNotification> {
    let (kind, title, message) = match decision.action {
        ModerationAction::Dismiss => return None,
        ModerationAction::Warn => {
            let subject = match &decision.listing_title {
                Some(title) => format!("Your listing \"{}\" was reported", title),
                None => "Your account was reported".to_string(),
            };
            (
                NotificationType::AccountWarning,
                "Warning from the moderation team",
                format!(
                    "{} and reviewed by our moderation team. Please review the community \
                     guidelines; further violations may lead to restrictions on your account.",
                    subject
                ),
            )
        }
        ModerationAction::TempSuspend => {
            let until = decision
                .suspension_until
                .map(|t| t.format("%B %-d, %Y at %H:%M UTC").to_string())
                .unwrap_or_else(|| "further notice".to_string());
            (
                NotificationType::AccountSuspended,
                "Your account has been temporarily restricted",
                format!(
                    "Following a review of a report, your account is restricted until {}. \
                     You will not be able to post or message until then.",
                    until
                ),
            )
        }
        ModerationAction::Ban => (
            NotificationType::AccountBanned,
            "Your account has been permanently removed",
            "Following a review of a report, your account has been permanently removed from \
             the marketplace for violating the community guidelines."
                .to_string(),
        ),
    };

    Some(NewNotification {
        user_id: decision.target_id,
        kind,
        title: title.to_string(),
        message,
        related_id: decision.listing_id.filter(|_| decision.action == ModerationAction::Warn),
    })
}
