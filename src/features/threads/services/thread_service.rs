use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::inbox::services::ProfileDirectory;
use crate::features::notifications::services::{BurstState, NotificationService};
use crate::features::property_chat::services::ListingDirectory;
use crate::features::threads::models::{
    AttachmentLink, MessageAttachment, MessageWithAttachments, NewAttachment, SentMessage,
    StartedThread, ThreadConvention, ThreadRecord, ThreadView,
};
use crate::features::threads::services::schema_resolver::{ResolutionCache, SchemaResolver};
use crate::features::threads::services::store::ThreadStore;
use crate::modules::storage::MinIOClient;
use crate::shared::constants::{MAX_MESSAGE_ATTACHMENTS, MESSAGE_BODY_MAX_CHARS};
use crate::shared::types::PaginationQuery;
use crate::shared::validation::{is_safe_storage_key, ACCOUNT_ID_REGEX, MIME_TYPE_REGEX};

/// Schema-aware thread lifecycle: open, send, mark-read, delete, and the two
/// start-conversation entry points.
///
/// All thread-id operations go through the resolver; this service never knows
/// which physical layout it is talking to. Participant checks yield
/// `Forbidden`, which thread-scoped handlers downgrade to `NotFound` so
/// non-participants cannot probe for thread existence.
pub struct ThreadService {
    resolver: Arc<SchemaResolver>,
    profiles: Arc<ProfileDirectory>,
    listings: Arc<ListingDirectory>,
    storage: Arc<MinIOClient>,
    notifications: Arc<NotificationService>,
}

impl ThreadService {
    pub fn new(
        resolver: Arc<SchemaResolver>,
        profiles: Arc<ProfileDirectory>,
        listings: Arc<ListingDirectory>,
        storage: Arc<MinIOClient>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            resolver,
            profiles,
            listings,
            storage,
            notifications,
        }
    }

    /// Open a thread: one page of messages oldest first, with the side
    /// effect of marking the viewer's unread messages read.
    pub async fn open_thread(
        &self,
        cache: &mut ResolutionCache,
        thread_id: Uuid,
        viewer_id: &str,
        page: &PaginationQuery,
    ) -> Result<ThreadView> {
        let store = self.resolver.resolve(thread_id, cache).await?;
        let thread = store
            .find_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Thread not found".to_string()))?;

        let counterpart_id = thread
            .counterpart_of(viewer_id)
            .ok_or_else(|| AppError::Forbidden("Not a participant in this thread".to_string()))?
            .to_string();

        // Read receipt first so the page below already reflects it
        let marked = store.mark_read(thread_id, viewer_id).await?;
        if marked > 0 {
            tracing::debug!("Marked {} messages read in thread {}", marked, thread_id);
        }

        let total_messages = store.count_messages(thread_id).await?;
        let messages = store
            .messages_page(thread_id, page.limit(), page.offset())
            .await?;

        let message_ids: Vec<Uuid> = messages.iter().map(|m| m.id).collect();
        let attachment_rows = store.attachments_for_messages(&message_ids).await?;
        let mut links_by_message: HashMap<Uuid, Vec<AttachmentLink>> = HashMap::new();
        for link in self.with_download_urls(attachment_rows).await {
            links_by_message
                .entry(link.attachment.message_id)
                .or_default()
                .push(link);
        }

        let messages = messages
            .into_iter()
            .map(|message| {
                let attachments = links_by_message.remove(&message.id).unwrap_or_default();
                MessageWithAttachments {
                    message,
                    attachments,
                }
            })
            .collect();

        // Identity enrichment degrades to a placeholder, never a failed open
        let counterpart = match self.profiles.identities_for(&[counterpart_id.clone()]).await {
            Ok(mut identities) => identities
                .remove(&counterpart_id)
                .unwrap_or_else(|| ProfileDirectory::placeholder(&counterpart_id)),
            Err(e) => {
                tracing::warn!(
                    "Counterpart profile lookup failed for thread {}, using placeholder: {:?}",
                    thread_id,
                    e
                );
                ProfileDirectory::placeholder(&counterpart_id)
            }
        };

        let related_listing = match thread.listing_id {
            Some(listing_id) => match self.listings.summaries_for(&[listing_id]).await {
                Ok(mut cards) => cards.remove(&listing_id),
                Err(e) => {
                    tracing::warn!(
                        "Listing lookup failed for thread {}, omitting listing card: {:?}",
                        thread_id,
                        e
                    );
                    None
                }
            },
            None => None,
        };

        Ok(ThreadView {
            thread,
            counterpart,
            related_listing,
            messages,
            total_messages,
        })
    }

    /// Append a message to an existing thread
    pub async fn send_message(
        &self,
        cache: &mut ResolutionCache,
        thread_id: Uuid,
        sender_id: &str,
        body: &str,
        attachments: Vec<NewAttachment>,
    ) -> Result<SentMessage> {
        let body = normalized_body(body)?;
        let attachments = validated_attachments(attachments)?;

        let store = self.resolver.resolve(thread_id, cache).await?;
        let thread = store
            .find_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Thread not found".to_string()))?;

        self.deliver(store, &thread, sender_id, &body, &attachments)
            .await
    }

    /// Mark every unread message not authored by the reader as read
    pub async fn mark_read(
        &self,
        cache: &mut ResolutionCache,
        thread_id: Uuid,
        reader_id: &str,
    ) -> Result<u64> {
        let store = self.resolver.resolve(thread_id, cache).await?;
        let thread = store
            .find_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Thread not found".to_string()))?;

        if !thread.involves(reader_id) {
            return Err(AppError::Forbidden(
                "Not a participant in this thread".to_string(),
            ));
        }

        store.mark_read(thread_id, reader_id).await
    }

    /// Delete a thread with its messages and attachments.
    ///
    /// Attachment blobs are removed best-effort after the rows are gone: a
    /// storage failure leaves an orphaned blob, never a half-deleted thread.
    pub async fn delete_thread(
        &self,
        cache: &mut ResolutionCache,
        thread_id: Uuid,
        requester_id: &str,
    ) -> Result<()> {
        let store = self.resolver.resolve(thread_id, cache).await?;
        let thread = store
            .find_thread(thread_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Thread not found".to_string()))?;

        if !thread.involves(requester_id) {
            return Err(AppError::Forbidden(
                "Not a participant in this thread".to_string(),
            ));
        }

        let deleted = store.delete_thread(thread_id).await?;
        tracing::info!(
            "Deleted {} thread {} with {} attachment blobs to clean up",
            thread.kind,
            thread_id,
            deleted.attachment_keys.len()
        );

        for key in &deleted.attachment_keys {
            if let Err(e) = self.storage.delete_object(key).await {
                tracing::warn!("Failed to delete attachment blob '{}': {}", key, e);
            }
        }

        Ok(())
    }

    /// Start (or resume) a property inquiry from a listing page.
    ///
    /// The participant pair has at most one property thread; a repeat inquiry
    /// reuses it, keeping the thread's original listing context.
    pub async fn start_property_thread(
        &self,
        sender_id: &str,
        listing_id: Uuid,
        body: &str,
    ) -> Result<StartedThread> {
        let body = normalized_body(body)?;

        let listing = self
            .listings
            .find(listing_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Listing not found".to_string()))?;

        if listing.owner_id == sender_id {
            return Err(AppError::Validation(
                "You cannot inquire about your own listing".to_string(),
            ));
        }

        let store = self.resolver.store(ThreadConvention::Legacy);
        let thread = match store
            .find_by_participants(sender_id, &listing.owner_id)
            .await?
        {
            Some(existing) => existing,
            None => {
                store
                    .create_thread(sender_id, &listing.owner_id, Some(listing_id))
                    .await?
            }
        };

        let sent = self.deliver(store, &thread, sender_id, &body, &[]).await?;
        Ok(StartedThread { thread, sent })
    }

    /// Start (or resume) a community conversation with another member
    pub async fn start_community_thread(
        &self,
        sender_id: &str,
        recipient_id: &str,
        body: &str,
    ) -> Result<StartedThread> {
        let body = normalized_body(body)?;

        if !ACCOUNT_ID_REGEX.is_match(recipient_id) {
            return Err(AppError::Validation(
                "Invalid recipient account id".to_string(),
            ));
        }
        if recipient_id == sender_id {
            return Err(AppError::Validation(
                "You cannot start a conversation with yourself".to_string(),
            ));
        }

        if !self.profiles.exists(recipient_id).await? {
            return Err(AppError::NotFound("Recipient not found".to_string()));
        }

        let store = self.resolver.store(ThreadConvention::Modern);
        let thread = match store.find_by_participants(sender_id, recipient_id).await? {
            Some(existing) => existing,
            None => store.create_thread(sender_id, recipient_id, None).await?,
        };

        let sent = self.deliver(store, &thread, sender_id, &body, &[]).await?;
        Ok(StartedThread { thread, sent })
    }

    /// The common send path: serialized append, burst decision, notification,
    /// last-activity write-through.
    ///
    /// The message is the operation of record. Notification recording and the
    /// write-through are logged and never fail the send.
    async fn deliver(
        &self,
        store: Arc<dyn ThreadStore>,
        thread: &ThreadRecord,
        sender_id: &str,
        body: &str,
        attachments: &[NewAttachment],
    ) -> Result<SentMessage> {
        let recipient_id = thread
            .counterpart_of(sender_id)
            .ok_or_else(|| AppError::Forbidden("Not a participant in this thread".to_string()))?
            .to_string();

        let outcome = store
            .append_message(thread.id, sender_id, &recipient_id, body, attachments)
            .await?;

        // The append's row lock serialized this count; subtracting the new
        // message yields the recipient's unread count immediately before it,
        // which is what the burst rule is defined over.
        let state = BurstState::from_unread(outcome.recipient_unread_after - 1);
        let (_, channels) = state.on_message();

        if let Err(e) = self
            .notifications
            .notify_new_message(&recipient_id, thread, &outcome.message, &channels)
            .await
        {
            tracing::warn!(
                "Notification recording failed for thread {}: {}",
                thread.id,
                e
            );
        }

        if let Err(e) = store
            .touch_last_activity(thread.id, outcome.message.created_at)
            .await
        {
            tracing::warn!(
                "Last-activity write-through failed for thread {}: {}",
                thread.id,
                e
            );
        }

        // Attachment rows come out of the append transaction itself; once
        // the append commits nothing else can fail the send.
        let attachments = self.with_download_urls(outcome.attachments).await;

        Ok(SentMessage {
            message: outcome.message,
            attachments,
            channels,
        })
    }

    /// Pair attachment rows with presigned download URLs. Presign failures
    /// degrade to a missing URL, never a failed read.
    async fn with_download_urls(&self, rows: Vec<MessageAttachment>) -> Vec<AttachmentLink> {
        let mut links = Vec::with_capacity(rows.len());
        for attachment in rows {
            let download_url = match self
                .storage
                .presigned_download_url(&attachment.storage_key)
                .await
            {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(
                        "Failed to presign attachment {}: {}",
                        attachment.id,
                        e
                    );
                    None
                }
            };
            links.push(AttachmentLink {
                attachment,
                download_url,
            });
        }
        links
    }
}

/// Canonical message body rule: trimmed, 1 to 1000 characters
fn normalized_body(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "Message body cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MESSAGE_BODY_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "Message body cannot exceed {} characters",
            MESSAGE_BODY_MAX_CHARS
        )));
    }
    Ok(trimmed.to_string())
}

fn validated_attachments(attachments: Vec<NewAttachment>) -> Result<Vec<NewAttachment>> {
    if attachments.len() > MAX_MESSAGE_ATTACHMENTS {
        return Err(AppError::Validation(format!(
            "A message can include at most {} attachments",
            MAX_MESSAGE_ATTACHMENTS
        )));
    }
    for attachment in &attachments {
        if !is_safe_storage_key(&attachment.storage_key) {
            return Err(AppError::Validation(
                "Invalid attachment storage key".to_string(),
            ));
        }
        if !MIME_TYPE_REGEX.is_match(&attachment.mime_type) {
            return Err(AppError::Validation(
                "Invalid attachment MIME type".to_string(),
            ));
        }
        if attachment.size_bytes <= 0 {
            return Err(AppError::Validation(
                "Attachment size must be positive".to_string(),
            ));
        }
    }
    Ok(attachments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::notifications::services::NotificationChannel;
    use crate::shared::constants::PLACEHOLDER_DISPLAY_NAME;
    use crate::shared::test_helpers::thread_harness;
    use chrono::{Duration as ChronoDuration, Utc};

    #[test]
    fn body_is_trimmed_to_its_canonical_form() {
        assert_eq!(normalized_body("  hi there  ").unwrap(), "hi there");
        assert_eq!(
            normalized_body(&"x".repeat(MESSAGE_BODY_MAX_CHARS)).unwrap().len(),
            MESSAGE_BODY_MAX_CHARS
        );
    }

    #[test]
    fn blank_and_overlong_bodies_are_rejected() {
        assert!(matches!(normalized_body(""), Err(AppError::Validation(_))));
        assert!(matches!(
            normalized_body("   \n\t "),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            normalized_body(&"x".repeat(MESSAGE_BODY_MAX_CHARS + 1)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn attachment_metadata_is_checked_before_any_write() {
        let good = NewAttachment {
            storage_key: "chat/2026/08/photo.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size_bytes: 1024,
        };

        assert!(validated_attachments(vec![good.clone()]).is_ok());

        let too_many = vec![good.clone(); MAX_MESSAGE_ATTACHMENTS + 1];
        assert!(matches!(
            validated_attachments(too_many),
            Err(AppError::Validation(_))
        ));

        let traversal = NewAttachment {
            storage_key: "../secrets/dump.bin".to_string(),
            ..good.clone()
        };
        assert!(matches!(
            validated_attachments(vec![traversal]),
            Err(AppError::Validation(_))
        ));

        let bad_mime = NewAttachment {
            mime_type: "notamime".to_string(),
            ..good.clone()
        };
        assert!(matches!(
            validated_attachments(vec![bad_mime]),
            Err(AppError::Validation(_))
        ));

        let empty_blob = NewAttachment {
            size_bytes: 0,
            ..good
        };
        assert!(matches!(
            validated_attachments(vec![empty_blob]),
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn open_pages_oldest_first_and_marks_unread_read() {
        let h = thread_harness();
        let thread = h.legacy.seed_thread("seeker-1", "owner-1", None);
        let base = Utc::now();
        for i in 0..3 {
            h.legacy.seed_message(
                thread.id,
                "owner-1",
                &format!("m{}", i),
                base + ChronoDuration::seconds(i),
                None,
            );
        }

        let mut cache = ResolutionCache::new();
        let view = h
            .service
            .open_thread(&mut cache, thread.id, "seeker-1", &PaginationQuery::default())
            .await
            .unwrap();

        assert_eq!(view.total_messages, 3);
        let bodies: Vec<&str> = view
            .messages
            .iter()
            .map(|m| m.message.body.as_str())
            .collect();
        assert_eq!(bodies, vec!["m0", "m1", "m2"]);
        assert!(view.messages.iter().all(|m| m.message.read_at.is_some()));
        // Profile lookup cannot succeed here, so the open degrades to a
        // placeholder identity instead of failing
        assert_eq!(view.counterpart.id, "owner-1");
        assert_eq!(view.counterpart.display_name, PLACEHOLDER_DISPLAY_NAME);

        // Everything was read by the open; a later mark-read changes nothing
        let mut cache = ResolutionCache::new();
        let changed = h
            .service
            .mark_read(&mut cache, thread.id, "seeker-1")
            .await
            .unwrap();
        assert_eq!(changed, 0);
    }

    #[tokio::test]
    async fn open_rejects_outsiders_before_any_side_effect() {
        let h = thread_harness();
        let thread = h.legacy.seed_thread("seeker-1", "owner-1", None);
        h.legacy
            .seed_message(thread.id, "owner-1", "hello", Utc::now(), None);

        let mut cache = ResolutionCache::new();
        let err = h
            .service
            .open_thread(&mut cache, thread.id, "mallory", &PaginationQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        // The outsider's open must not have produced a read receipt
        assert!(h
            .legacy
            .messages_in(thread.id)
            .iter()
            .all(|m| m.read_at.is_none()));
    }

    #[tokio::test]
    async fn open_of_an_unknown_thread_is_not_found() {
        let h = thread_harness();
        let mut cache = ResolutionCache::new();
        let err = h
            .service
            .open_thread(
                &mut cache,
                Uuid::new_v4(),
                "anyone",
                &PaginationQuery::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn send_decides_email_only_for_the_burst_opener() {
        let h = thread_harness();
        let thread = h.modern.seed_thread("alice", "bob", None);
        let mut cache = ResolutionCache::new();

        let first = h
            .service
            .send_message(&mut cache, thread.id, "alice", "hello bob", Vec::new())
            .await
            .unwrap();
        assert_eq!(
            first.channels,
            vec![NotificationChannel::InApp, NotificationChannel::Email]
        );

        let second = h
            .service
            .send_message(&mut cache, thread.id, "alice", "are you there?", Vec::new())
            .await
            .unwrap();
        assert_eq!(second.channels, vec![NotificationChannel::InApp]);

        // Bob reads, closing the burst; the next message emails again
        let mut bob_cache = ResolutionCache::new();
        h.service
            .mark_read(&mut bob_cache, thread.id, "bob")
            .await
            .unwrap();

        let third = h
            .service
            .send_message(&mut cache, thread.id, "alice", "ping", Vec::new())
            .await
            .unwrap();
        assert!(third.channels.contains(&NotificationChannel::Email));
    }

    #[tokio::test]
    async fn send_stores_the_trimmed_body_and_touches_activity() {
        let h = thread_harness();
        let thread = h.modern.seed_thread("alice", "bob", None);
        let mut cache = ResolutionCache::new();

        let sent = h
            .service
            .send_message(&mut cache, thread.id, "alice", "  hi  ", Vec::new())
            .await
            .unwrap();
        assert_eq!(sent.message.body, "hi");

        let stored = h.modern.thread(thread.id).unwrap();
        assert_eq!(stored.last_activity_at, Some(sent.message.created_at));
    }

    #[tokio::test]
    async fn persisted_sends_are_never_reported_as_failures() {
        let h = thread_harness();
        let thread = h.modern.seed_thread("alice", "bob", None);
        // Reads against the attachment table fail from here on; only the
        // append transaction itself may decide the send's fate
        h.modern.poison_attachment_reads();

        let mut cache = ResolutionCache::new();
        let sent = h
            .service
            .send_message(
                &mut cache,
                thread.id,
                "alice",
                "see the photo",
                vec![NewAttachment {
                    storage_key: "chat/2026/08/photo.jpg".to_string(),
                    mime_type: "image/jpeg".to_string(),
                    size_bytes: 2048,
                }],
            )
            .await
            .unwrap();

        // The attachment still comes back, carried out of the append itself
        assert_eq!(sent.attachments.len(), 1);
        assert_eq!(
            sent.attachments[0].attachment.storage_key,
            "chat/2026/08/photo.jpg"
        );
        assert_eq!(h.modern.messages_in(thread.id).len(), 1);
    }

    #[tokio::test]
    async fn send_from_an_outsider_is_forbidden() {
        let h = thread_harness();
        let thread = h.modern.seed_thread("alice", "bob", None);
        let mut cache = ResolutionCache::new();

        let err = h
            .service
            .send_message(&mut cache, thread.id, "mallory", "let me in", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(h.modern.messages_in(thread.id).is_empty());
    }

    #[tokio::test]
    async fn delete_requires_a_participant_and_is_gone_afterwards() {
        let h = thread_harness();
        let thread = h.legacy.seed_thread("seeker-1", "owner-1", None);
        let message = h
            .legacy
            .seed_message(thread.id, "seeker-1", "hello", Utc::now(), None);
        h.legacy
            .seed_attachment(message.id, "chat/a.png", "image/png", 10);

        let mut cache = ResolutionCache::new();
        let err = h
            .service
            .delete_thread(&mut cache, thread.id, "mallory")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(h.legacy.thread(thread.id).is_some());

        let mut cache = ResolutionCache::new();
        h.service
            .delete_thread(&mut cache, thread.id, "owner-1")
            .await
            .unwrap();
        assert!(h.legacy.thread(thread.id).is_none());
        assert!(h.legacy.messages_in(thread.id).is_empty());

        // Already gone: a repeat delete resolves nowhere
        let mut cache = ResolutionCache::new();
        let err = h
            .service
            .delete_thread(&mut cache, thread.id, "owner-1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn start_community_validates_without_touching_storage() {
        let h = thread_harness();

        let err = h
            .service
            .start_community_thread("alice", "alice", "hey me")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = h
            .service
            .start_community_thread("alice", "not a valid id!", "hey")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = h
            .service
            .start_community_thread("alice", "bob", "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn start_property_checks_the_body_before_the_listing() {
        let h = thread_harness();
        let err = h
            .service
            .start_property_thread("alice", Uuid::new_v4(), "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
