use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::inbox::models::{
    CounterpartIdentity, InboxPage, LastMessageSummary, ListingSummary, UnifiedConversation,
    UnreadCounts,
};
use crate::features::threads::models::ThreadKind;
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::types::PaginationQuery;

/// Which conversation kinds an inbox read includes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InboxScope {
    #[default]
    All,
    Property,
    Community,
}

impl InboxScope {
    pub fn matches(&self, kind: ThreadKind) -> bool {
        match self {
            InboxScope::All => true,
            InboxScope::Property => kind == ThreadKind::Property,
            InboxScope::Community => kind == ThreadKind::Community,
        }
    }
}

/// Query parameters for the inbox listing
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct InboxQuery {
    /// Conversation kinds to include (default: all)
    #[serde(default)]
    pub scope: InboxScope,

    /// Page number (1-indexed, default: 1)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Number of items per page (default: 10, max: 100)
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl InboxQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CounterpartDto {
    pub id: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl From<CounterpartIdentity> for CounterpartDto {
    fn from(identity: CounterpartIdentity) -> Self {
        Self {
            id: identity.id,
            display_name: identity.display_name,
            avatar_url: identity.avatar_url,
            is_online: identity.is_online,
            last_seen_at: identity.last_seen_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LastMessageDto {
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub is_mine: bool,
}

impl From<LastMessageSummary> for LastMessageDto {
    fn from(summary: LastMessageSummary) -> Self {
        Self {
            body: summary.body,
            created_at: summary.created_at,
            is_mine: summary.is_mine,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingSummaryDto {
    pub id: Uuid,
    pub title: String,
    pub monthly_rent: Option<f64>,
    pub cover_url: Option<String>,
}

impl From<ListingSummary> for ListingSummaryDto {
    fn from(listing: ListingSummary) -> Self {
        use rust_decimal::prelude::ToPrimitive;

        Self {
            id: listing.id,
            title: listing.title,
            monthly_rent: listing.monthly_rent.and_then(|rent| rent.to_f64()),
            cover_url: listing.cover_url,
        }
    }
}

/// One inbox row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDto {
    pub id: Uuid,
    pub kind: ThreadKind,
    pub counterpart: CounterpartDto,
    pub last_message: Option<LastMessageDto>,
    pub unread_count: i64,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_listing: Option<ListingSummaryDto>,
}

impl From<UnifiedConversation> for ConversationDto {
    fn from(conversation: UnifiedConversation) -> Self {
        Self {
            id: conversation.id,
            kind: conversation.kind,
            counterpart: conversation.counterpart.into(),
            last_message: conversation.last_message.map(Into::into),
            unread_count: conversation.unread_count,
            updated_at: conversation.updated_at,
            related_listing: conversation.related_listing.map(Into::into),
        }
    }
}

/// Unread totals per scope tab, always computed over the full merge
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountsDto {
    pub all: i64,
    pub property: i64,
    pub community: i64,
}

impl From<UnreadCounts> for UnreadCountsDto {
    fn from(counts: UnreadCounts) -> Self {
        Self {
            all: counts.all,
            property: counts.property,
            community: counts.community,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InboxResponseDto {
    pub conversations: Vec<ConversationDto>,
    pub counts: UnreadCountsDto,
    /// True when one source failed or timed out and its conversations are
    /// missing from this response
    pub partial: bool,
}

impl From<InboxPage> for InboxResponseDto {
    fn from(page: InboxPage) -> Self {
        Self {
            conversations: page.conversations.into_iter().map(Into::into).collect(),
            counts: page.counts.into(),
            partial: page.partial,
        }
    }
}
