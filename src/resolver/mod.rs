//! Credential resolution: turns a room name and participant name into a
//! server URL plus signed token.
//!
//! The issuance strategy is picked once from configuration. Remote issuance
//! wins over local signing whenever `TOKEN_ENDPOINT` is set.

pub mod remote;

use axum::http::{header, HeaderMap};

use crate::auth::LocalSigner;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{ConnectionCredential, RoomIdentifier};

pub use remote::{IssuedToken, RemoteIssuer};

/// Caller authentication forwarded to the issuance service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub cookie: Option<String>,
    pub authorization: Option<String>,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Self {
            cookie: read(header::COOKIE),
            authorization: read(header::AUTHORIZATION),
        }
    }
}

/// How credentials get issued, fixed at startup.
#[derive(Debug, Clone)]
pub enum IssuanceStrategy {
    Remote(RemoteIssuer),
    LocalSigning(LocalSigner),
    /// Some but not all local signing settings are present.
    IncompleteSigning,
    Unconfigured,
}

impl IssuanceStrategy {
    pub fn from_config(config: &Config) -> Result<Self> {
        if let Some(template) = &config.token_endpoint {
            return Ok(Self::Remote(RemoteIssuer::new(
                template,
                config.issuance_timeout,
            )?));
        }

        match (
            &config.livekit_url,
            &config.livekit_api_key,
            &config.livekit_api_secret,
        ) {
            (Some(url), Some(key), Some(secret)) => {
                Ok(Self::LocalSigning(LocalSigner::new(url, key, secret)))
            }
            _ if config.has_signing_settings() => Ok(Self::IncompleteSigning),
            _ => Ok(Self::Unconfigured),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Remote(_) => "remote",
            Self::LocalSigning(_) => "local_signing",
            Self::IncompleteSigning => "incomplete_signing",
            Self::Unconfigured => "unconfigured",
        }
    }
}

/// Produces [`ConnectionCredential`]s. Holds no state between calls.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    strategy: IssuanceStrategy,
}

impl CredentialResolver {
    pub fn new(strategy: IssuanceStrategy) -> Self {
        Self { strategy }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let strategy = IssuanceStrategy::from_config(config)?;
        tracing::info!(strategy = strategy.name(), "Credential issuance strategy selected");
        Ok(Self::new(strategy))
    }

    pub fn strategy(&self) -> &IssuanceStrategy {
        &self.strategy
    }

    /// Resolve a credential for `participant_name` in `room_name`.
    ///
    /// Validation and configuration errors are returned before any network
    /// call. Upstream failures are passed through without retrying.
    pub async fn resolve(
        &self,
        room_name: &str,
        participant_name: &str,
        ctx: &RequestContext,
    ) -> Result<ConnectionCredential> {
        let room = RoomIdentifier::parse(room_name)?;
        if participant_name.trim().is_empty() {
            return Err(AppError::MissingParticipant);
        }

        match &self.strategy {
            IssuanceStrategy::Remote(issuer) => {
                let issued = issuer.issue(&room.event_id(), ctx).await?;
                tracing::info!(room = %room, "Credential issued by remote service");

                Ok(ConnectionCredential {
                    server_url: issued.server_url,
                    room_name: room.into(),
                    participant_name: issued
                        .participant_name
                        .unwrap_or_else(|| participant_name.to_string()),
                    participant_token: issued.token,
                })
            }
            IssuanceStrategy::LocalSigning(signer) => {
                let token = signer.sign(&room, participant_name)?;
                tracing::info!(room = %room, "Credential signed locally");

                Ok(ConnectionCredential {
                    server_url: signer.server_url().to_string(),
                    room_name: room.into(),
                    participant_name: participant_name.to_string(),
                    participant_token: token,
                })
            }
            IssuanceStrategy::IncompleteSigning => Err(AppError::SigningNotConfigured),
            IssuanceStrategy::Unconfigured => Err(AppError::ResolverNotConfigured),
        }
    }
}
