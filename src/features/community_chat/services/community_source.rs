use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::community_chat::models::{CommunityLastMessageRow, CommunityThreadRow};
use crate::features::inbox::models::{LastMessageSummary, UnifiedConversation};
use crate::features::inbox::services::{ConversationSource, ProfileDirectory};
use crate::features::threads::models::ThreadKind;

/// Projects community chat threads into unified inbox conversations.
pub struct CommunityConversationSource {
    pool: PgPool,
    profiles: Arc<ProfileDirectory>,
}

impl CommunityConversationSource {
    pub fn new(pool: PgPool, profiles: Arc<ProfileDirectory>) -> Self {
        Self { pool, profiles }
    }
}

#[async_trait]
impl ConversationSource for CommunityConversationSource {
    fn kind(&self) -> ThreadKind {
        ThreadKind::Community
    }

    async fn list_for_user(
        &self,
        account_id: &str,
        window: i64,
    ) -> Result<Vec<UnifiedConversation>> {
        let threads = sqlx::query_as::<_, CommunityThreadRow>(
            "SELECT id, initiator_id, partner_id, created_at, last_message_at \
             FROM community_threads \
             WHERE initiator_id = $1 OR partner_id = $1 \
             ORDER BY COALESCE(last_message_at, created_at) DESC \
             LIMIT $2",
        )
        .bind(account_id)
        .bind(window)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list community threads for inbox: {:?}", e);
            AppError::Database(e)
        })?;

        if threads.is_empty() {
            return Ok(Vec::new());
        }

        let thread_ids: Vec<Uuid> = threads.iter().map(|t| t.id).collect();

        let unread_by_thread: HashMap<Uuid, i64> = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT thread_id, COUNT(*) FROM community_messages \
             WHERE thread_id = ANY($1) AND sender_id <> $2 AND read_at IS NULL \
             GROUP BY thread_id",
        )
        .bind(&thread_ids)
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count community unread messages: {:?}", e);
            AppError::Database(e)
        })?
        .into_iter()
        .collect();

        let last_by_thread: HashMap<Uuid, CommunityLastMessageRow> =
            sqlx::query_as::<_, CommunityLastMessageRow>(
                "SELECT DISTINCT ON (thread_id) thread_id, sender_id, body, created_at \
                 FROM community_messages WHERE thread_id = ANY($1) \
                 ORDER BY thread_id, created_at DESC, id DESC",
            )
            .bind(&thread_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch last community messages: {:?}", e);
                AppError::Database(e)
            })?
            .into_iter()
            .map(|row| (row.thread_id, row))
            .collect();

        let counterpart_ids: Vec<String> = threads
            .iter()
            .map(|t| {
                if t.initiator_id == account_id {
                    t.partner_id.clone()
                } else {
                    t.initiator_id.clone()
                }
            })
            .collect();

        let identities = match self.profiles.identities_for(&counterpart_ids).await {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(
                    "Profile enrichment failed for community inbox, using placeholders: {:?}",
                    e
                );
                HashMap::new()
            }
        };

        let conversations = threads
            .into_iter()
            .map(|thread| {
                let counterpart_id = if thread.initiator_id == account_id {
                    &thread.partner_id
                } else {
                    &thread.initiator_id
                };

                let counterpart = identities
                    .get(counterpart_id)
                    .cloned()
                    .unwrap_or_else(|| ProfileDirectory::placeholder(counterpart_id));

                let last_message = last_by_thread.get(&thread.id).map(|row| LastMessageSummary {
                    body: row.body.clone(),
                    created_at: row.created_at,
                    is_mine: row.sender_id == account_id,
                });

                let updated_at = last_message
                    .as_ref()
                    .map(|m| m.created_at)
                    .map_or(thread.created_at, |t| t.max(thread.created_at));

                UnifiedConversation {
                    id: thread.id,
                    kind: ThreadKind::Community,
                    counterpart,
                    last_message,
                    unread_count: unread_by_thread.get(&thread.id).copied().unwrap_or(0),
                    updated_at,
                    related_listing: None,
                }
            })
            .collect();

        Ok(conversations)
    }
}
