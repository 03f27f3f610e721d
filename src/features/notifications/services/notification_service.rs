use std::sync::Arc;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::notifications::models::NotificationRow;
use crate::features::notifications::services::channel_decider::NotificationChannel;
use crate::features::threads::models::{ThreadMessage, ThreadRecord};
use crate::modules::notifier::{DispatchRequest, NotifierClient};
use crate::shared::constants::NOTIFICATION_PREVIEW_CHARS;
use crate::shared::types::PaginationQuery;

/// Persists decided notifications and hands them to the external dispatcher.
pub struct NotificationService {
    pool: PgPool,
    notifier: Arc<NotifierClient>,
}

impl NotificationService {
    pub fn new(pool: PgPool, notifier: Arc<NotifierClient>) -> Self {
        Self { pool, notifier }
    }

    /// Record a channel decision for a new message and forward it to the
    /// dispatcher.
    ///
    /// The row insert is the operation of record; a dispatcher failure is
    /// logged and swallowed so a recorded in-app notification is never
    /// retracted because email delivery broke.
    pub async fn notify_new_message(
        &self,
        recipient_id: &str,
        thread: &ThreadRecord,
        message: &ThreadMessage,
        channels: &[NotificationChannel],
    ) -> Result<()> {
        let preview: String = message.body.chars().take(NOTIFICATION_PREVIEW_CHARS).collect();
        let channel_names: Vec<String> = channels.iter().map(|c| c.as_str().to_string()).collect();

        sqlx::query(
            "INSERT INTO notifications (recipient_id, thread_id, message_id, thread_kind, channels, preview) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(recipient_id)
        .bind(thread.id)
        .bind(message.id)
        .bind(thread.kind.as_str())
        .bind(&channel_names)
        .bind(&preview)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record notification for thread {}: {:?}", thread.id, e);
            AppError::Database(e)
        })?;

        let request = DispatchRequest {
            recipient_id: recipient_id.to_string(),
            channels: channel_names,
            payload: serde_json::json!({
                "type": "message.created",
                "threadId": thread.id,
                "threadKind": thread.kind,
                "messageId": message.id,
                "senderId": message.sender_id,
                "preview": preview,
            }),
        };

        if let Err(e) = self.notifier.dispatch(&request).await {
            tracing::warn!(
                "Notification dispatch failed for thread {}, recipient {}: {}",
                thread.id,
                recipient_id,
                e
            );
        }

        Ok(())
    }

    /// Recent notifications for the caller, newest first
    pub async fn list_for_user(
        &self,
        account_id: &str,
        page: &PaginationQuery,
    ) -> Result<(Vec<NotificationRow>, i64)> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1",
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count notifications: {:?}", e);
            AppError::Database(e)
        })?;

        let rows = sqlx::query_as::<_, NotificationRow>(
            "SELECT id, thread_id, message_id, thread_kind, channels, preview, created_at \
             FROM notifications WHERE recipient_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
        )
        .bind(account_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list notifications: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((rows, total))
    }
}
