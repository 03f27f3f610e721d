use std::collections::HashMap;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::inbox::models::{CounterpartIdentity, ProfileRow};
use crate::shared::constants::PLACEHOLDER_DISPLAY_NAME;

/// Read-side lookup of member profiles for identity enrichment
pub struct ProfileDirectory {
    pool: PgPool,
}

impl ProfileDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Batched identity fetch. Accounts without a profile row are simply
    /// absent from the map; callers substitute [`ProfileDirectory::placeholder`].
    pub async fn identities_for(
        &self,
        account_ids: &[String],
    ) -> Result<HashMap<String, CounterpartIdentity>> {
        if account_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT account_id, full_name, org_name, avatar_url, is_online, last_seen_at
            FROM profiles
            WHERE account_id = ANY($1)
            "#,
        )
        .bind(account_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load profiles for identity enrichment: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|row| (row.account_id.clone(), row.into_identity()))
            .collect())
    }

    /// Identity used when a counterpart cannot be resolved; the conversation
    /// still renders instead of being dropped.
    pub fn placeholder(account_id: &str) -> CounterpartIdentity {
        CounterpartIdentity {
            id: account_id.to_string(),
            display_name: PLACEHOLDER_DISPLAY_NAME.to_string(),
            avatar_url: None,
            is_online: false,
            last_seen_at: None,
        }
    }

    pub async fn exists(&self, account_id: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM profiles WHERE account_id = $1)",
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check profile existence: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(exists)
    }
}
