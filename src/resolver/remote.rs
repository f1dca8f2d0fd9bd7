use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{EventId, IssuanceResponse};
use crate::resolver::RequestContext;

/// Token fields returned by the issuance service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub server_url: String,
    pub token: String,
    pub participant_name: Option<String>,
}

/// Client for the remote credential issuance service
#[derive(Debug, Clone)]
pub struct RemoteIssuer {
    client: Client,
    template: String,
}

impl RemoteIssuer {
    pub fn new(template: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::UpstreamUnavailable(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            template: template.to_string(),
        })
    }

    pub fn url_for(&self, event_id: &EventId) -> String {
        event_id.fill_template(&self.template)
    }

    /// POST to the issuance URL, forwarding the caller's cookie and
    /// authorization so the service can authorize them for the event.
    pub async fn issue(&self, event_id: &EventId, ctx: &RequestContext) -> Result<IssuedToken> {
        let url = self.url_for(event_id);

        tracing::debug!(event_id = %event_id, "Requesting credential from issuance service");

        let res = self
            .client
            .post(&url)
            .header(COOKIE, ctx.cookie.as_deref().unwrap_or_default())
            .header(AUTHORIZATION, ctx.authorization.as_deref().unwrap_or_default())
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_else(|e| {
                tracing::warn!(event_id = %event_id, error = %e, "Failed to read issuance error body");
                String::new()
            });
            tracing::warn!(
                event_id = %event_id,
                status = status.as_u16(),
                "Issuance service rejected request"
            );
            return Err(AppError::UpstreamIssuanceError {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = res.bytes().await?;
        let data: IssuanceResponse = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::MalformedIssuanceResponse(format!("invalid JSON: {}", e)))?;

        let server_url = data
            .server_url
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::MalformedIssuanceResponse("missing serverUrl".to_string()))?;
        let token = data
            .token
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::MalformedIssuanceResponse("missing token".to_string()))?;

        Ok(IssuedToken {
            server_url,
            token,
            participant_name: data.participant_name.filter(|s| !s.trim().is_empty()),
        })
    }
}
