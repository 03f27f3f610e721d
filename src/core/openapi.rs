use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::inbox::{dtos as inbox_dtos, handlers as inbox_handlers};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
    services as notifications_services,
};
use crate::features::presence::{dtos as presence_dtos, handlers as presence_handlers};
use crate::features::threads::{
    dtos as threads_dtos, handlers as threads_handlers, models as threads_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Inbox
        inbox_handlers::get_inbox,
        // Threads
        threads_handlers::start_property_thread,
        threads_handlers::start_community_thread,
        threads_handlers::list_thread_messages,
        threads_handlers::send_message,
        threads_handlers::mark_thread_read,
        threads_handlers::delete_thread,
        // Notifications
        notifications_handlers::get_notifications,
        // Presence
        presence_handlers::record_ping,
        presence_handlers::go_offline,
        presence_handlers::get_presence,
    ),
    components(
        schemas(
            // Shared
            Meta,
            auth::model::AuthenticatedUser,
            // Inbox
            inbox_dtos::InboxScope,
            inbox_dtos::CounterpartDto,
            inbox_dtos::LastMessageDto,
            inbox_dtos::ListingSummaryDto,
            inbox_dtos::ConversationDto,
            inbox_dtos::UnreadCountsDto,
            inbox_dtos::InboxResponseDto,
            ApiResponse<inbox_dtos::InboxResponseDto>,
            // Threads
            threads_models::ThreadKind,
            threads_dtos::AttachmentUploadDto,
            threads_dtos::SendMessageDto,
            threads_dtos::StartPropertyThreadDto,
            threads_dtos::StartCommunityThreadDto,
            threads_dtos::AttachmentDto,
            threads_dtos::MessageDto,
            threads_dtos::ThreadViewDto,
            threads_dtos::StartedThreadDto,
            threads_dtos::MarkReadResponseDto,
            threads_dtos::DeleteThreadResponseDto,
            ApiResponse<threads_dtos::ThreadViewDto>,
            ApiResponse<threads_dtos::MessageDto>,
            ApiResponse<threads_dtos::StartedThreadDto>,
            ApiResponse<threads_dtos::MarkReadResponseDto>,
            // Notifications
            notifications_services::NotificationChannel,
            notifications_dtos::NotificationDto,
            ApiResponse<Vec<notifications_dtos::NotificationDto>>,
            // Presence
            presence_dtos::PresenceDto,
            ApiResponse<presence_dtos::PresenceDto>,
        )
    ),
    tags(
        (name = "inbox", description = "Unified inbox across property and community chat"),
        (name = "threads", description = "Thread messaging: open, send, read receipts, delete"),
        (name = "notifications", description = "Recorded message notifications"),
        (name = "presence", description = "Online/offline presence tracking"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Serumah Messaging API",
        version = "0.1.0",
        description = "API documentation for the Serumah messaging subsystem",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
