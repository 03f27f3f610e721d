/// Default page size for pagination
#[allow(dead_code)]
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
#[allow(dead_code)]
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// MESSAGING CONSTANTS
// =============================================================================

/// Maximum message body length in characters (counted after trimming)
pub const MESSAGE_BODY_MAX_CHARS: usize = 1000;

/// Maximum number of attachments accepted on a single message
pub const MAX_MESSAGE_ATTACHMENTS: usize = 10;

/// How many conversations each source contributes to an inbox read.
/// The inbox paginates over the merged window, not over full history.
pub const SOURCE_FETCH_WINDOW: i64 = 200;

/// Number of leading characters of a message body carried into a notification
pub const NOTIFICATION_PREVIEW_CHARS: usize = 140;

/// Display name used when a counterpart's profile cannot be resolved
pub const PLACEHOLDER_DISPLAY_NAME: &str = "Unknown user";
