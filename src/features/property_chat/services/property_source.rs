use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::inbox::models::{LastMessageSummary, UnifiedConversation};
use crate::features::inbox::services::{ConversationSource, ProfileDirectory};
use crate::features::property_chat::models::{PropertyLastMessageRow, PropertyThreadRow};
use crate::features::property_chat::services::ListingDirectory;
use crate::features::threads::models::ThreadKind;

/// Projects property chat threads into unified inbox conversations.
pub struct PropertyConversationSource {
    pool: PgPool,
    profiles: Arc<ProfileDirectory>,
    listings: Arc<ListingDirectory>,
}

impl PropertyConversationSource {
    pub fn new(pool: PgPool, profiles: Arc<ProfileDirectory>, listings: Arc<ListingDirectory>) -> Self {
        Self {
            pool,
            profiles,
            listings,
        }
    }
}

#[async_trait]
impl ConversationSource for PropertyConversationSource {
    fn kind(&self) -> ThreadKind {
        ThreadKind::Property
    }

    async fn list_for_user(
        &self,
        account_id: &str,
        window: i64,
    ) -> Result<Vec<UnifiedConversation>> {
        let threads = sqlx::query_as::<_, PropertyThreadRow>(
            "SELECT id, listing_id, owner_id, seeker_id, created, last_activity \
             FROM property_threads \
             WHERE owner_id = $1 OR seeker_id = $1 \
             ORDER BY COALESCE(last_activity, created) DESC \
             LIMIT $2",
        )
        .bind(account_id)
        .bind(window)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list property threads for inbox: {:?}", e);
            AppError::Database(e)
        })?;

        if threads.is_empty() {
            return Ok(Vec::new());
        }

        let thread_ids: Vec<Uuid> = threads.iter().map(|t| t.id).collect();

        let unread_by_thread: HashMap<Uuid, i64> = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT thread_id, COUNT(*) FROM property_messages \
             WHERE thread_id = ANY($1) AND sender_id <> $2 AND seen_at IS NULL \
             GROUP BY thread_id",
        )
        .bind(&thread_ids)
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count property unread messages: {:?}", e);
            AppError::Database(e)
        })?
        .into_iter()
        .collect();

        let last_by_thread: HashMap<Uuid, PropertyLastMessageRow> =
            sqlx::query_as::<_, PropertyLastMessageRow>(
                "SELECT DISTINCT ON (thread_id) thread_id, sender_id, body, created \
                 FROM property_messages WHERE thread_id = ANY($1) \
                 ORDER BY thread_id, created DESC, id DESC",
            )
            .bind(&thread_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch last property messages: {:?}", e);
                AppError::Database(e)
            })?
            .into_iter()
            .map(|row| (row.thread_id, row))
            .collect();

        let counterpart_ids: Vec<String> = threads
            .iter()
            .map(|t| {
                if t.owner_id == account_id {
                    t.seeker_id.clone()
                } else {
                    t.owner_id.clone()
                }
            })
            .collect();

        // Identity and listing enrichment degrade per row: a lookup failure
        // leaves placeholders in place rather than dropping conversations.
        let identities = match self.profiles.identities_for(&counterpart_ids).await {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(
                    "Profile enrichment failed for property inbox, using placeholders: {:?}",
                    e
                );
                HashMap::new()
            }
        };

        let listing_ids: Vec<Uuid> = threads.iter().filter_map(|t| t.listing_id).collect();
        let listing_cards = match self.listings.summaries_for(&listing_ids).await {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(
                    "Listing enrichment failed for property inbox, omitting listing cards: {:?}",
                    e
                );
                HashMap::new()
            }
        };

        let conversations = threads
            .into_iter()
            .map(|thread| {
                let counterpart_id = if thread.owner_id == account_id {
                    &thread.seeker_id
                } else {
                    &thread.owner_id
                };

                let counterpart = identities
                    .get(counterpart_id)
                    .cloned()
                    .unwrap_or_else(|| ProfileDirectory::placeholder(counterpart_id));

                let last_message = last_by_thread.get(&thread.id).map(|row| LastMessageSummary {
                    body: row.body.clone(),
                    created_at: row.created,
                    is_mine: row.sender_id == account_id,
                });

                let updated_at = last_message
                    .as_ref()
                    .map(|m| m.created_at)
                    .map_or(thread.created, |t| t.max(thread.created));

                let related_listing = thread
                    .listing_id
                    .and_then(|id| listing_cards.get(&id).cloned());

                UnifiedConversation {
                    id: thread.id,
                    kind: ThreadKind::Property,
                    counterpart,
                    last_message,
                    unread_count: unread_by_thread.get(&thread.id).copied().unwrap_or(0),
                    updated_at,
                    related_listing,
                }
            })
            .collect();

        Ok(conversations)
    }
}
