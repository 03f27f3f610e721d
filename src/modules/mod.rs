//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients for external services: attachment blob storage and the
//! notification dispatcher.

pub mod notifier;
pub mod storage;
