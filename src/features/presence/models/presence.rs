use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Canonical presence row. `profiles.is_online` and `profiles.last_seen_at`
/// mirror this table so the chat read paths get presence without a join.
#[derive(Debug, Clone, FromRow)]
pub struct PresenceRecord {
    pub account_id: String,
    pub is_online: bool,
    /// Set when the account last went offline; null while online or for
    /// accounts that never completed a session
    pub last_seen_at: Option<DateTime<Utc>>,
    /// Bumped on every ping; internal staleness bookkeeping, not exposed
    #[allow(dead_code)]
    pub last_activity_at: DateTime<Utc>,
}
