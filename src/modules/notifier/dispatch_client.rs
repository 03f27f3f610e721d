use std::time::Duration;

use serde::Serialize;

use crate::core::config::NotifierConfig;
use crate::core::error::{AppError, Result};

/// Payload posted to the dispatcher for one decided notification
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    pub recipient_id: String,
    /// Channel names the decider selected, e.g. ["in_app", "email"]
    pub channels: Vec<String>,
    pub payload: serde_json::Value,
}

/// Client for the external notification dispatcher
pub struct NotifierClient {
    config: NotifierConfig,
    http_client: reqwest::Client,
}

impl NotifierClient {
    pub fn new(config: NotifierConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.endpoint.is_some()
    }

    /// Post one decided notification to the dispatcher.
    ///
    /// A dispatcher outage must never affect the message write that produced
    /// the notification; callers treat errors from here as log-and-continue.
    pub async fn dispatch(&self, request: &DispatchRequest) -> Result<()> {
        let Some(endpoint) = self.config.endpoint.as_deref() else {
            tracing::debug!(
                "Notifier endpoint not configured, skipping dispatch for recipient {}",
                request.recipient_id
            );
            return Ok(());
        };

        let mut req = self.http_client.post(endpoint).json(request);
        if let Some(token) = self.config.auth_token.as_deref() {
            req = req.bearer_auth(token);
        }

        let response = req.send().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Notifier dispatch failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Notifier dispatch failed: HTTP {}",
                response.status()
            )));
        }

        Ok(())
    }
}
