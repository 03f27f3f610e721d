//! Notifier module
//!
//! Client for the channel-agnostic notification dispatcher. This core only
//! decides which channels a notification goes to; the dispatcher owns push
//! and email delivery.

mod dispatch_client;

pub use dispatch_client::{DispatchRequest, NotifierClient};
