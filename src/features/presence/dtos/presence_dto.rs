use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::presence::models::PresenceRecord;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresenceDto {
    pub account_id: String,
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl From<PresenceRecord> for PresenceDto {
    fn from(record: PresenceRecord) -> Self {
        Self {
            account_id: record.account_id,
            is_online: record.is_online,
            last_seen_at: record.last_seen_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn dto_drops_the_internal_activity_timestamp() {
        let record = PresenceRecord {
            account_id: "acct_1".to_string(),
            is_online: true,
            last_seen_at: None,
            last_activity_at: Utc::now(),
        };

        let dto = PresenceDto::from(record);
        let value = serde_json::to_value(&dto).unwrap();

        assert_eq!(value["accountId"], "acct_1");
        assert_eq!(value["isOnline"], true);
        assert!(value.get("lastActivityAt").is_none());
    }
}
