use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::core::error::Result;
use crate::features::inbox::dtos::InboxScope;
use crate::features::inbox::models::{InboxPage, UnifiedConversation, UnreadCounts};
use crate::features::inbox::services::source::ConversationSource;
use crate::features::threads::models::ThreadKind;
use crate::shared::constants::SOURCE_FETCH_WINDOW;
use crate::shared::types::PaginationQuery;

struct SourceOutcome {
    kind: ThreadKind,
    conversations: Vec<UnifiedConversation>,
    failed: bool,
}

/// Merges both chat subsystems into one chronological inbox.
///
/// Sources are queried concurrently under a deadline. A source that fails or
/// times out contributes nothing for that read and the response is flagged
/// partial; one subsystem's outage never fails the whole inbox.
pub struct InboxService {
    sources: Vec<Arc<dyn ConversationSource>>,
    source_deadline: Duration,
}

impl InboxService {
    pub fn new(sources: Vec<Arc<dyn ConversationSource>>, source_deadline: Duration) -> Self {
        Self {
            sources,
            source_deadline,
        }
    }

    pub async fn get_inbox(
        &self,
        account_id: &str,
        scope: InboxScope,
        page: &PaginationQuery,
    ) -> Result<InboxPage> {
        let deadline = self.source_deadline;

        let fetches = self.sources.iter().map(|source| {
            let source = Arc::clone(source);
            let account_id = account_id.to_string();
            async move {
                let kind = source.kind();
                match tokio::time::timeout(
                    deadline,
                    source.list_for_user(&account_id, SOURCE_FETCH_WINDOW),
                )
                .await
                {
                    Ok(Ok(conversations)) => SourceOutcome {
                        kind,
                        conversations,
                        failed: false,
                    },
                    Ok(Err(e)) => {
                        tracing::warn!(
                            "Conversation source '{}' failed, treating as empty for this read: {}",
                            kind,
                            e
                        );
                        SourceOutcome {
                            kind,
                            conversations: Vec::new(),
                            failed: true,
                        }
                    }
                    Err(_) => {
                        tracing::warn!(
                            "Conversation source '{}' missed the {}ms deadline, treating as empty for this read",
                            kind,
                            deadline.as_millis()
                        );
                        SourceOutcome {
                            kind,
                            conversations: Vec::new(),
                            failed: true,
                        }
                    }
                }
            }
        });

        let outcomes = join_all(fetches).await;
        let partial = outcomes.iter().any(|o| o.failed);

        // Merge. Id namespaces are disjoint by kind; a collision is corrupt
        // data and is logged, never silently deduplicated.
        let mut seen: HashSet<uuid::Uuid> = HashSet::new();
        let mut merged: Vec<UnifiedConversation> = Vec::new();
        for outcome in outcomes {
            for conversation in outcome.conversations {
                if !seen.insert(conversation.id) {
                    tracing::warn!(
                        "Duplicate thread id {} surfaced by the '{}' source",
                        conversation.id,
                        outcome.kind
                    );
                }
                merged.push(conversation);
            }
        }

        // Unread totals come from the unfiltered merged set so the badge on
        // every scope tab stays consistent with the "all" view
        let mut counts = UnreadCounts::default();
        for conversation in &merged {
            counts.add(conversation.kind, conversation.unread_count);
        }

        merged.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let scoped: Vec<UnifiedConversation> = merged
            .into_iter()
            .filter(|c| scope.matches(c.kind))
            .collect();
        let total_in_scope = scoped.len() as i64;

        let conversations = scoped
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();

        Ok(InboxPage {
            conversations,
            counts,
            partial,
            total_in_scope,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{test_conversation, StaticConversationSource};
    use chrono::{Duration as ChronoDuration, Utc};
    use uuid::Uuid;

    fn service(sources: Vec<Arc<dyn ConversationSource>>) -> InboxService {
        InboxService::new(sources, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn merges_sources_newest_first_regardless_of_source_order() {
        let base = Utc::now();
        let x = test_conversation(ThreadKind::Property, base, 0);
        let y = test_conversation(ThreadKind::Property, base + ChronoDuration::seconds(20), 0);
        let z = test_conversation(ThreadKind::Community, base + ChronoDuration::seconds(10), 0);

        let property = Arc::new(StaticConversationSource::new(
            ThreadKind::Property,
            vec![x.clone(), y.clone()],
        ));
        let community = Arc::new(StaticConversationSource::new(
            ThreadKind::Community,
            vec![z.clone()],
        ));

        for sources in [
            vec![
                property.clone() as Arc<dyn ConversationSource>,
                community.clone() as Arc<dyn ConversationSource>,
            ],
            vec![
                community.clone() as Arc<dyn ConversationSource>,
                property.clone() as Arc<dyn ConversationSource>,
            ],
        ] {
            let page = service(sources)
                .get_inbox("viewer", InboxScope::All, &PaginationQuery::default())
                .await
                .unwrap();

            let ids: Vec<Uuid> = page.conversations.iter().map(|c| c.id).collect();
            assert_eq!(ids, vec![y.id, z.id, x.id]);
            assert!(!page.partial);
        }
    }

    #[tokio::test]
    async fn equal_timestamps_break_ties_by_id_for_determinism() {
        let at = Utc::now();
        let mut a = test_conversation(ThreadKind::Property, at, 0);
        let mut b = test_conversation(ThreadKind::Community, at, 0);
        a.id = Uuid::from_u128(1);
        b.id = Uuid::from_u128(2);

        let sources: Vec<Arc<dyn ConversationSource>> = vec![
            Arc::new(StaticConversationSource::new(
                ThreadKind::Community,
                vec![b.clone()],
            )),
            Arc::new(StaticConversationSource::new(
                ThreadKind::Property,
                vec![a.clone()],
            )),
        ];

        let page = service(sources)
            .get_inbox("viewer", InboxScope::All, &PaginationQuery::default())
            .await
            .unwrap();

        let ids: Vec<Uuid> = page.conversations.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn failed_source_degrades_to_partial_response() {
        let now = Utc::now();
        let kept = test_conversation(ThreadKind::Property, now, 2);

        let sources: Vec<Arc<dyn ConversationSource>> = vec![
            Arc::new(StaticConversationSource::new(
                ThreadKind::Property,
                vec![kept.clone()],
            )),
            Arc::new(StaticConversationSource::failing(ThreadKind::Community)),
        ];

        let page = service(sources)
            .get_inbox("viewer", InboxScope::All, &PaginationQuery::default())
            .await
            .unwrap();

        assert!(page.partial);
        assert_eq!(page.conversations.len(), 1);
        assert_eq!(page.conversations[0].id, kept.id);
        assert_eq!(page.counts.property, 2);
        assert_eq!(page.counts.community, 0);
        assert_eq!(page.counts.all, 2);
    }

    #[tokio::test]
    async fn slow_source_is_cut_off_at_the_deadline() {
        let now = Utc::now();
        let fast = test_conversation(ThreadKind::Property, now, 1);
        let slow = test_conversation(ThreadKind::Community, now, 5);

        let sources: Vec<Arc<dyn ConversationSource>> = vec![
            Arc::new(StaticConversationSource::new(
                ThreadKind::Property,
                vec![fast.clone()],
            )),
            Arc::new(StaticConversationSource::slow(
                ThreadKind::Community,
                vec![slow],
                Duration::from_secs(5),
            )),
        ];

        let service = InboxService::new(sources, Duration::from_millis(50));
        let page = service
            .get_inbox("viewer", InboxScope::All, &PaginationQuery::default())
            .await
            .unwrap();

        assert!(page.partial);
        assert_eq!(page.conversations.len(), 1);
        assert_eq!(page.counts.community, 0);
    }

    #[tokio::test]
    async fn scope_filters_rows_but_counts_stay_global() {
        let now = Utc::now();
        let property = test_conversation(ThreadKind::Property, now, 3);
        let community =
            test_conversation(ThreadKind::Community, now + ChronoDuration::seconds(5), 4);

        let sources: Vec<Arc<dyn ConversationSource>> = vec![
            Arc::new(StaticConversationSource::new(
                ThreadKind::Property,
                vec![property.clone()],
            )),
            Arc::new(StaticConversationSource::new(
                ThreadKind::Community,
                vec![community.clone()],
            )),
        ];

        let page = service(sources)
            .get_inbox(
                "viewer",
                InboxScope::Property,
                &PaginationQuery::default(),
            )
            .await
            .unwrap();

        assert_eq!(page.conversations.len(), 1);
        assert_eq!(page.conversations[0].kind, ThreadKind::Property);
        assert_eq!(page.total_in_scope, 1);
        // Badges reflect the unfiltered merge
        assert_eq!(page.counts.property, 3);
        assert_eq!(page.counts.community, 4);
        assert_eq!(page.counts.all, 7);
    }

    #[tokio::test]
    async fn paginates_after_sorting_and_scoping() {
        let base = Utc::now();
        let conversations: Vec<_> = (0..5)
            .map(|i| {
                test_conversation(
                    ThreadKind::Property,
                    base + ChronoDuration::seconds(i),
                    0,
                )
            })
            .collect();

        let sources: Vec<Arc<dyn ConversationSource>> = vec![Arc::new(
            StaticConversationSource::new(ThreadKind::Property, conversations.clone()),
        )];

        let page = service(sources)
            .get_inbox(
                "viewer",
                InboxScope::All,
                &PaginationQuery {
                    page: 2,
                    page_size: 2,
                },
            )
            .await
            .unwrap();

        assert_eq!(page.total_in_scope, 5);
        assert_eq!(page.conversations.len(), 2);
        // Newest-first: page 2 holds the 3rd and 4th most recent
        assert_eq!(page.conversations[0].id, conversations[2].id);
        assert_eq!(page.conversations[1].id, conversations[1].id);
    }

    #[tokio::test]
    async fn conflicting_ids_across_sources_are_kept_not_deduplicated() {
        let now = Utc::now();
        let mut from_property = test_conversation(ThreadKind::Property, now, 1);
        let mut from_community = test_conversation(ThreadKind::Community, now, 1);
        from_community.id = from_property.id;
        from_property.unread_count = 1;
        from_community.unread_count = 2;

        let sources: Vec<Arc<dyn ConversationSource>> = vec![
            Arc::new(StaticConversationSource::new(
                ThreadKind::Property,
                vec![from_property],
            )),
            Arc::new(StaticConversationSource::new(
                ThreadKind::Community,
                vec![from_community],
            )),
        ];

        let page = service(sources)
            .get_inbox("viewer", InboxScope::All, &PaginationQuery::default())
            .await
            .unwrap();

        assert_eq!(page.conversations.len(), 2);
        assert_eq!(page.counts.all, 3);
    }
}
