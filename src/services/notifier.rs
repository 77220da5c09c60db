use std::sync::Arc;

use uuid::Uuid;

use crate::database::models::{Notification, NotificationType, VacationRequest};
use crate::database::store::NotificationStore;

/// Records informational notifications. Failures are logged and swallowed so
/// they never undo the transition that triggered them.
#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn NotificationStore>,
}

impl Notifier {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub async fn notify(
        &self,
        user_id: Uuid,
        notification_type: NotificationType,
        title: &str,
        message: String,
    ) {
        let notification = Notification::new(user_id, notification_type, title, message);
        match self.store.create_notification(&notification).await {
            Ok(_) => log::debug!(
                "Recorded {} notification for user {}",
                notification_type,
                user_id
            ),
            Err(e) => log::warn!(
                "Failed to record {} notification for user {}: {}",
                notification_type,
                user_id,
                e
            ),
        }
    }

    pub async fn request_submitted(
        &self,
        manager_id: Uuid,
        requester_name: &str,
        request: &VacationRequest,
    ) {
        self.notify(
            manager_id,
            NotificationType::Request,
            "New vacation request",
            format!(
                "{} requested {} business days off from {} to {}",
                requester_name, request.business_days, request.start_date, request.end_date
            ),
        )
        .await;
    }

    pub async fn request_approved(&self, request: &VacationRequest) {
        self.notify(
            request.user_id,
            NotificationType::Approval,
            "Vacation request approved",
            format!(
                "Your vacation from {} to {} was approved",
                request.start_date, request.end_date
            ),
        )
        .await;
    }

    pub async fn request_rejected(&self, request: &VacationRequest) {
        self.notify(
            request.user_id,
            NotificationType::Rejection,
            "Vacation request rejected",
            format!(
                "Your vacation from {} to {} was rejected: {}",
                request.start_date,
                request.end_date,
                request.approval_comment.as_deref().unwrap_or_default()
            ),
        )
        .await;
    }
}
