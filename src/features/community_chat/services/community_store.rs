use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::community_chat::models::{
    CommunityAttachmentRow, CommunityMessageRow, CommunityThreadRow,
};
use crate::features::threads::models::{
    AppendOutcome, DeletedThread, MessageAttachment, NewAttachment, ThreadConvention,
    ThreadMessage, ThreadRecord,
};
use crate::features::threads::services::ThreadStore;

const UNIQUE_VIOLATION: &str = "23505";

/// Thread storage over the community chat tables, which follow the current
/// schema conventions (`created_at`, `read_at`, `last_message_at`).
pub struct CommunityThreadStore {
    pool: PgPool,
}

impl CommunityThreadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThreadStore for CommunityThreadStore {
    fn convention(&self) -> ThreadConvention {
        ThreadConvention::Modern
    }

    async fn probe(&self, thread_id: Uuid) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM community_threads WHERE id = $1)",
        )
        .bind(thread_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_thread(&self, thread_id: Uuid) -> Result<Option<ThreadRecord>> {
        let row = sqlx::query_as::<_, CommunityThreadRow>(
            "SELECT id, initiator_id, partner_id, created_at, last_message_at \
             FROM community_threads WHERE id = $1",
        )
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch community thread {}: {:?}", thread_id, e);
            AppError::Database(e)
        })?;

        Ok(row.map(CommunityThreadRow::into_record))
    }

    async fn find_by_participants(&self, a: &str, b: &str) -> Result<Option<ThreadRecord>> {
        let row = sqlx::query_as::<_, CommunityThreadRow>(
            "SELECT id, initiator_id, partner_id, created_at, last_message_at \
             FROM community_threads \
             WHERE (initiator_id = $1 AND partner_id = $2) OR (initiator_id = $2 AND partner_id = $1) \
             LIMIT 1",
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up community thread by participants: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(row.map(CommunityThreadRow::into_record))
    }

    async fn create_thread(
        &self,
        starter_id: &str,
        recipient_id: &str,
        _listing_id: Option<Uuid>,
    ) -> Result<ThreadRecord> {
        let inserted = sqlx::query_as::<_, CommunityThreadRow>(
            "INSERT INTO community_threads (initiator_id, partner_id) \
             VALUES ($1, $2) \
             RETURNING id, initiator_id, partner_id, created_at, last_message_at",
        )
        .bind(starter_id)
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(row) => Ok(row.into_record()),
            Err(sqlx::Error::Database(ref db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                tracing::warn!(
                    "Concurrent community thread creation for the same pair, reusing existing thread"
                );
                self.find_by_participants(starter_id, recipient_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal("Thread vanished after unique pair conflict".to_string())
                    })
            }
            Err(e) => {
                tracing::error!("Failed to create community thread: {:?}", e);
                Err(AppError::Database(e))
            }
        }
    }

    async fn count_messages(&self, thread_id: Uuid) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM community_messages WHERE thread_id = $1",
        )
        .bind(thread_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count community messages: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn messages_page(
        &self,
        thread_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ThreadMessage>> {
        let rows = sqlx::query_as::<_, CommunityMessageRow>(
            "SELECT id, thread_id, sender_id, body, created_at, read_at \
             FROM community_messages WHERE thread_id = $1 \
             ORDER BY created_at ASC, id ASC LIMIT $2 OFFSET $3",
        )
        .bind(thread_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch community messages: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(CommunityMessageRow::into_message).collect())
    }

    async fn attachments_for_messages(
        &self,
        message_ids: &[Uuid],
    ) -> Result<Vec<MessageAttachment>> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CommunityAttachmentRow>(
            "SELECT id, message_id, storage_key, mime_type, size_bytes \
             FROM community_attachments WHERE message_id = ANY($1) \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(message_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch community attachments: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows
            .into_iter()
            .map(CommunityAttachmentRow::into_attachment)
            .collect())
    }

    async fn append_message(
        &self,
        thread_id: Uuid,
        sender_id: &str,
        recipient_id: &str,
        body: &str,
        attachments: &[NewAttachment],
    ) -> Result<AppendOutcome> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin append transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM community_threads WHERE id = $1 FOR UPDATE",
        )
        .bind(thread_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to lock community thread {}: {:?}", thread_id, e);
            AppError::Database(e)
        })?;

        if locked.is_none() {
            return Err(AppError::NotFound("Thread not found".to_string()));
        }

        let message = sqlx::query_as::<_, CommunityMessageRow>(
            "INSERT INTO community_messages (thread_id, sender_id, body) \
             VALUES ($1, $2, $3) \
             RETURNING id, thread_id, sender_id, body, created_at, read_at",
        )
        .bind(thread_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert community message: {:?}", e);
            AppError::Database(e)
        })?;

        let mut inserted = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            let row = sqlx::query_as::<_, CommunityAttachmentRow>(
                "INSERT INTO community_attachments (message_id, storage_key, mime_type, size_bytes) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING id, message_id, storage_key, mime_type, size_bytes",
            )
            .bind(message.id)
            .bind(&attachment.storage_key)
            .bind(&attachment.mime_type)
            .bind(attachment.size_bytes)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert community attachment: {:?}", e);
                AppError::Database(e)
            })?;
            inserted.push(row.into_attachment());
        }

        let recipient_unread_after = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM community_messages \
             WHERE thread_id = $1 AND sender_id <> $2 AND read_at IS NULL",
        )
        .bind(thread_id)
        .bind(recipient_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count recipient unread: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit append transaction: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(AppendOutcome {
            message: message.into_message(),
            attachments: inserted,
            recipient_unread_after,
        })
    }

    async fn mark_read(&self, thread_id: Uuid, reader_id: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE community_messages SET read_at = NOW() \
             WHERE thread_id = $1 AND sender_id <> $2 AND read_at IS NULL",
        )
        .bind(thread_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark community messages read: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected())
    }

    async fn touch_last_activity(&self, thread_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE community_threads SET last_message_at = $2 WHERE id = $1")
            .bind(thread_id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to touch community thread activity: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(())
    }

    async fn delete_thread(&self, thread_id: Uuid) -> Result<DeletedThread> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin delete transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let attachment_keys = sqlx::query_scalar::<_, String>(
            "SELECT a.storage_key FROM community_attachments a \
             JOIN community_messages m ON m.id = a.message_id \
             WHERE m.thread_id = $1",
        )
        .bind(thread_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to collect attachment keys: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query(
            "DELETE FROM community_attachments a USING community_messages m \
             WHERE a.message_id = m.id AND m.thread_id = $1",
        )
        .bind(thread_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete community attachments: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query("DELETE FROM community_messages WHERE thread_id = $1")
            .bind(thread_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete community messages: {:?}", e);
                AppError::Database(e)
            })?;

        sqlx::query("DELETE FROM community_threads WHERE id = $1")
            .bind(thread_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete community thread: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit delete transaction: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(DeletedThread { attachment_keys })
    }
}
