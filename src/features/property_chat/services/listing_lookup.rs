use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::inbox::models::ListingSummary;
use crate::features::property_chat::models::ListingRow;

/// Read-only access to listings for chat purposes.
///
/// Chat never owns listing data; it only resolves the listing a thread was
/// started from so the conversation can carry a listing card.
pub struct ListingDirectory {
    pool: PgPool,
}

impl ListingDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, listing_id: Uuid) -> Result<Option<ListingRow>> {
        sqlx::query_as::<_, ListingRow>(
            "SELECT id, owner_id, title, monthly_rent, cover_url FROM listings WHERE id = $1",
        )
        .bind(listing_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch listing {}: {:?}", listing_id, e);
            AppError::Database(e)
        })
    }

    /// Batch lookup keyed by listing id. Ids with no surviving listing are
    /// simply absent from the map.
    pub async fn summaries_for(&self, listing_ids: &[Uuid]) -> Result<HashMap<Uuid, ListingSummary>> {
        if listing_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ListingRow>(
            "SELECT id, owner_id, title, monthly_rent, cover_url FROM listings WHERE id = ANY($1)",
        )
        .bind(listing_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to batch-fetch listings: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|row| (row.id, row.into_summary()))
            .collect())
    }
}
