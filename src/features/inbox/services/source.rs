use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::inbox::models::UnifiedConversation;
use crate::features::threads::models::ThreadKind;

/// One chat subsystem as seen by the inbox. Implementations own their
/// physical layout and return fully enriched conversations; the inbox never
/// touches subsystem tables directly.
#[async_trait]
pub trait ConversationSource: Send + Sync {
    fn kind(&self) -> ThreadKind;

    /// The viewer's most recently active conversations, up to `window` rows,
    /// in no particular order. Identity enrichment degrades per row (a
    /// conversation is returned with a placeholder counterpart rather than
    /// dropped); only a whole-query failure surfaces as an error.
    async fn list_for_user(
        &self,
        account_id: &str,
        window: i64,
    ) -> Result<Vec<UnifiedConversation>>;
}
