use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::features::inbox::models::CounterpartIdentity;
use crate::shared::constants::PLACEHOLDER_DISPLAY_NAME;

/// Profile columns consumed when resolving a counterpart's identity
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub account_id: String,
    pub full_name: Option<String>,
    pub org_name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl ProfileRow {
    /// Accounts operating as an organization are shown under the
    /// organization name; the personal name is the fallback.
    pub fn into_identity(self) -> CounterpartIdentity {
        let display_name = pick_display_name(self.org_name, self.full_name);
        CounterpartIdentity {
            id: self.account_id,
            display_name,
            avatar_url: self.avatar_url,
            is_online: self.is_online,
            last_seen_at: self.last_seen_at,
        }
    }
}

fn pick_display_name(org_name: Option<String>, full_name: Option<String>) -> String {
    org_name
        .filter(|s| !s.trim().is_empty())
        .or_else(|| full_name.filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| PLACEHOLDER_DISPLAY_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(full: Option<&str>, org: Option<&str>) -> ProfileRow {
        ProfileRow {
            account_id: "acc-1".to_string(),
            full_name: full.map(String::from),
            org_name: org.map(String::from),
            avatar_url: None,
            is_online: false,
            last_seen_at: None,
        }
    }

    #[test]
    fn org_name_wins_over_personal_name() {
        let identity = row(Some("Budi Santoso"), Some("Kos Mawar Group")).into_identity();
        assert_eq!(identity.display_name, "Kos Mawar Group");
    }

    #[test]
    fn personal_name_used_when_org_absent_or_blank() {
        assert_eq!(
            row(Some("Budi Santoso"), None).into_identity().display_name,
            "Budi Santoso"
        );
        assert_eq!(
            row(Some("Budi Santoso"), Some("  "))
                .into_identity()
                .display_name,
            "Budi Santoso"
        );
    }

    #[test]
    fn placeholder_when_both_missing() {
        assert_eq!(
            row(None, None).into_identity().display_name,
            PLACEHOLDER_DISPLAY_NAME
        );
    }
}
