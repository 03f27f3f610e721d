use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::property_chat::models::{
    PropertyAttachmentRow, PropertyMessageRow, PropertyThreadRow,
};
use crate::features::threads::models::{
    AppendOutcome, DeletedThread, MessageAttachment, NewAttachment, ThreadConvention,
    ThreadMessage, ThreadRecord,
};
use crate::features::threads::services::ThreadStore;

const UNIQUE_VIOLATION: &str = "23505";

/// Thread storage over the original property chat tables.
///
/// The schema here uses the legacy column names (`created`, `seen_at`,
/// `last_activity`) and the owner/seeker participant pair. Everything is
/// translated to the unified thread model at this boundary.
pub struct PropertyThreadStore {
    pool: PgPool,
}

impl PropertyThreadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ThreadStore for PropertyThreadStore {
    fn convention(&self) -> ThreadConvention {
        ThreadConvention::Legacy
    }

    async fn probe(&self, thread_id: Uuid) -> Result<bool> {
        // No error logging here: callers use probe results to tell the two
        // schema generations apart, so a missing-table error is expected.
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM property_threads WHERE id = $1)",
        )
        .bind(thread_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn find_thread(&self, thread_id: Uuid) -> Result<Option<ThreadRecord>> {
        let row = sqlx::query_as::<_, PropertyThreadRow>(
            "SELECT id, listing_id, owner_id, seeker_id, created, last_activity \
             FROM property_threads WHERE id = $1",
        )
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch property thread {}: {:?}", thread_id, e);
            AppError::Database(e)
        })?;

        Ok(row.map(PropertyThreadRow::into_record))
    }

    async fn find_by_participants(&self, a: &str, b: &str) -> Result<Option<ThreadRecord>> {
        let row = sqlx::query_as::<_, PropertyThreadRow>(
            "SELECT id, listing_id, owner_id, seeker_id, created, last_activity \
             FROM property_threads \
             WHERE (owner_id = $1 AND seeker_id = $2) OR (owner_id = $2 AND seeker_id = $1) \
             LIMIT 1",
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up property thread by participants: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(row.map(PropertyThreadRow::into_record))
    }

    async fn create_thread(
        &self,
        starter_id: &str,
        recipient_id: &str,
        listing_id: Option<Uuid>,
    ) -> Result<ThreadRecord> {
        // The starter of a property thread is always the seeker; the listing
        // owner is the recipient.
        let inserted = sqlx::query_as::<_, PropertyThreadRow>(
            "INSERT INTO property_threads (listing_id, owner_id, seeker_id) \
             VALUES ($1, $2, $3) \
             RETURNING id, listing_id, owner_id, seeker_id, created, last_activity",
        )
        .bind(listing_id)
        .bind(recipient_id)
        .bind(starter_id)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(row) => Ok(row.into_record()),
            // Two first messages racing for the same pair: the unique pair
            // index rejects the loser, which then reuses the winner's thread.
            Err(sqlx::Error::Database(ref db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                tracing::warn!(
                    "Concurrent property thread creation for the same pair, reusing existing thread"
                );
                self.find_by_participants(starter_id, recipient_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Internal("Thread vanished after unique pair conflict".to_string())
                    })
            }
            Err(e) => {
                tracing::error!("Failed to create property thread: {:?}", e);
                Err(AppError::Database(e))
            }
        }
    }

    async fn count_messages(&self, thread_id: Uuid) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM property_messages WHERE thread_id = $1",
        )
        .bind(thread_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count property messages: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn messages_page(
        &self,
        thread_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ThreadMessage>> {
        let rows = sqlx::query_as::<_, PropertyMessageRow>(
            "SELECT id, thread_id, sender_id, body, created, seen_at \
             FROM property_messages WHERE thread_id = $1 \
             ORDER BY created ASC, id ASC LIMIT $2 OFFSET $3",
        )
        .bind(thread_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch property messages: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(PropertyMessageRow::into_message).collect())
    }

    async fn attachments_for_messages(
        &self,
        message_ids: &[Uuid],
    ) -> Result<Vec<MessageAttachment>> {
        if message_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PropertyAttachmentRow>(
            "SELECT id, message_id, storage_key, mime_type, size_bytes \
             FROM property_attachments WHERE message_id = ANY($1) \
             ORDER BY created ASC, id ASC",
        )
        .bind(message_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch property attachments: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows
            .into_iter()
            .map(PropertyAttachmentRow::into_attachment)
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

        // Lock the thread row so concurrent sends to the same thread are
        // serialized and the unread count below is exact.
        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM property_threads WHERE id = $1 FOR UPDATE",
        )
        .bind(thread_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to lock property thread {}: {:?}", thread_id, e);
            AppError::Database(e)
        })?;

        if locked.is_none() {
            return Err(AppError::NotFound("Thread not found".to_string()));
        }

        let message = sqlx::query_as::<_, PropertyMessageRow>(
            "INSERT INTO property_messages (thread_id, sender_id, body) \
             VALUES ($1, $2, $3) \
             RETURNING id, thread_id, sender_id, body, created, seen_at",
        )
        .bind(thread_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert property message: {:?}", e);
            AppError::Database(e)
        })?;

        let mut inserted = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            let row = sqlx::query_as::<_, PropertyAttachmentRow>(
                "INSERT INTO property_attachments (message_id, storage_key, mime_type, size_bytes) \
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
                tracing::error!("Failed to insert property attachment: {:?}", e);
                AppError::Database(e)
            })?;
            inserted.push(row.into_attachment());
        }

        // Counted inside the transaction, while the thread lock is held, so
        // the new message is included and no concurrent send can interleave.
        let recipient_unread_after = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM property_messages \
             WHERE thread_id = $1 AND sender_id <> $2 AND seen_at IS NULL",
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
            "UPDATE property_messages SET seen_at = NOW() \
             WHERE thread_id = $1 AND sender_id <> $2 AND seen_at IS NULL",
        )
        .bind(thread_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark property messages read: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected())
    }

    async fn touch_last_activity(&self, thread_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE property_threads SET last_activity = $2 WHERE id = $1")
            .bind(thread_id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to touch property thread activity: {:?}", e);
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
            "SELECT a.storage_key FROM property_attachments a \
             JOIN property_messages m ON m.id = a.message_id \
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
            "DELETE FROM property_attachments a USING property_messages m \
             WHERE a.message_id = m.id AND m.thread_id = $1",
        )
        .bind(thread_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete property attachments: {:?}", e);
            AppError::Database(e)
        })?;

        sqlx::query("DELETE FROM property_messages WHERE thread_id = $1")
            .bind(thread_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete property messages: {:?}", e);
                AppError::Database(e)
            })?;

        sqlx::query("DELETE FROM property_threads WHERE id = $1")
            .bind(thread_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete property thread: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit delete transaction: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(DeletedThread { attachment_keys })
    }
}
