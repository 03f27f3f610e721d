use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::presence::models::PresenceRecord;

/// Maintains the canonical `presence_records` table and keeps the
/// denormalized projection on `profiles` in step with it.
pub struct PresenceService {
    pool: PgPool,
}

impl PresenceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record activity: the account is online and was active just now.
    /// First activity for an account inserts its record.
    pub async fn ping(&self, account_id: &str) -> Result<PresenceRecord> {
        let record = sqlx::query_as::<_, PresenceRecord>(
            r#"
            INSERT INTO presence_records (account_id, is_online, last_activity_at)
            VALUES ($1, TRUE, NOW())
            ON CONFLICT (account_id)
            DO UPDATE SET is_online = TRUE, last_activity_at = NOW()
            RETURNING account_id, is_online, last_seen_at, last_activity_at
            "#,
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record presence ping: {:?}", e);
            AppError::Database(e)
        })?;

        self.project_to_profile(account_id, true, false).await;

        Ok(record)
    }

    /// End the account's session: offline, with `last_seen_at` stamped now
    pub async fn end_session(&self, account_id: &str) -> Result<PresenceRecord> {
        let record = sqlx::query_as::<_, PresenceRecord>(
            r#"
            INSERT INTO presence_records (account_id, is_online, last_seen_at, last_activity_at)
            VALUES ($1, FALSE, NOW(), NOW())
            ON CONFLICT (account_id)
            DO UPDATE SET is_online = FALSE, last_seen_at = NOW()
            RETURNING account_id, is_online, last_seen_at, last_activity_at
            "#,
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record session end: {:?}", e);
            AppError::Database(e)
        })?;

        self.project_to_profile(account_id, false, true).await;

        Ok(record)
    }

    /// Read the canonical record for one account
    pub async fn get(&self, account_id: &str) -> Result<Option<PresenceRecord>> {
        sqlx::query_as::<_, PresenceRecord>(
            r#"
            SELECT account_id, is_online, last_seen_at, last_activity_at
            FROM presence_records
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch presence record: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Write-through to the projection on `profiles`. The canonical record is
    /// already committed at this point, so a failure here is logged and
    /// swallowed; the projection catches up on the next transition.
    async fn project_to_profile(&self, account_id: &str, is_online: bool, stamp_last_seen: bool) {
        let query = if stamp_last_seen {
            "UPDATE profiles SET is_online = $2, last_seen_at = NOW() WHERE account_id = $1"
        } else {
            "UPDATE profiles SET is_online = $2 WHERE account_id = $1"
        };

        if let Err(e) = sqlx::query(query)
            .bind(account_id)
            .bind(is_online)
            .execute(&self.pool)
            .await
        {
            tracing::warn!(
                "Failed to project presence for {} onto profiles: {:?}",
                account_id,
                e
            );
        }
    }
}
