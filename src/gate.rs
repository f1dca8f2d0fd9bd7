//! Pre-join gate: collects participant choices and a credential before a
//! session may start.
//!
//! A room page opened with `token` and `serverUrl` in its query string is
//! already authenticated and skips credential resolution entirely.

use std::sync::Arc;

use serde::Deserialize;

use crate::auth::decode_name_from_token;
use crate::error::Result;
use crate::models::{ConnectionCredential, ParticipantChoices};
use crate::resolver::{CredentialResolver, RequestContext};

/// Query parameters of an already-authenticated room link.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepLinkParams {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub participant_name: Option<String>,
}

impl DeepLinkParams {
    fn non_empty(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.is_empty())
    }

    /// Both token and server URL, when present and non-empty.
    pub fn credential_pair(&self) -> Option<(&str, &str)> {
        Some((
            Self::non_empty(&self.token)?,
            Self::non_empty(&self.server_url)?,
        ))
    }

    /// Explicit name, else the token's embedded name, else empty.
    pub fn display_name(&self) -> String {
        Self::non_empty(&self.participant_name)
            .map(str::to_string)
            .or_else(|| {
                Self::non_empty(&self.token).and_then(decode_name_from_token)
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Collecting,
    Ready,
}

/// Credential and choices handed to the session controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadySession {
    pub credential: ConnectionCredential,
    pub choices: ParticipantChoices,
}

pub struct PreJoinGate {
    room_name: String,
    resolver: Arc<CredentialResolver>,
    ctx: RequestContext,
    defaults: ParticipantChoices,
    deep_link: bool,
    credential: Option<ConnectionCredential>,
    choices: Option<ParticipantChoices>,
}

impl PreJoinGate {
    pub fn new(
        room_name: &str,
        params: &DeepLinkParams,
        resolver: Arc<CredentialResolver>,
        ctx: RequestContext,
    ) -> Self {
        let mut defaults = ParticipantChoices::with_defaults("");
        if let Some(name) = DeepLinkParams::non_empty(&params.participant_name) {
            defaults.display_name = name.to_string();
        }

        let mut gate = Self {
            room_name: room_name.to_string(),
            resolver,
            ctx,
            defaults,
            deep_link: false,
            credential: None,
            choices: None,
        };

        if let Some((token, server_url)) = params.credential_pair() {
            let name = params.display_name();
            gate.deep_link = true;
            gate.choices = Some(ParticipantChoices::with_defaults(name.clone()));
            gate.credential = Some(ConnectionCredential {
                server_url: server_url.to_string(),
                room_name: room_name.to_string(),
                participant_name: name,
                participant_token: token.to_string(),
            });
            tracing::info!(room = %room_name, "Joining with deep-link credential");
        }

        gate
    }

    pub fn state(&self) -> GateState {
        if self.credential.is_some() && self.choices.is_some() {
            GateState::Ready
        } else {
            GateState::Collecting
        }
    }

    /// Choices to prefill the pre-join form with.
    pub fn defaults(&self) -> &ParticipantChoices {
        &self.defaults
    }

    pub fn credential(&self) -> Option<&ConnectionCredential> {
        self.credential.as_ref()
    }

    pub fn choices(&self) -> Option<&ParticipantChoices> {
        self.choices.as_ref()
    }

    /// Submit the participant's choices.
    ///
    /// With a deep-link credential the choices replace the synthesized ones
    /// and nothing is resolved. Otherwise a credential is resolved first;
    /// on failure the gate stays in [`GateState::Collecting`].
    pub async fn submit(&mut self, values: ParticipantChoices) -> Result<GateState> {
        let values = values.normalized();

        if self.deep_link {
            self.choices = Some(values);
            return Ok(self.state());
        }

        if self.state() == GateState::Ready {
            tracing::debug!(room = %self.room_name, "Gate already ready, ignoring submission");
            return Ok(GateState::Ready);
        }

        let credential = self
            .resolver
            .resolve(&self.room_name, &values.display_name, &self.ctx)
            .await
            .inspect_err(|e| {
                tracing::warn!(room = %self.room_name, error = %e, "Credential resolution failed");
            })?;

        self.choices = Some(values);
        self.credential = Some(credential);
        tracing::info!(room = %self.room_name, "Pre-join gate ready");

        Ok(self.state())
    }

    /// Hand the credential and choices over, consuming the gate.
    pub fn into_ready(self) -> Option<ReadySession> {
        match (self.credential, self.choices) {
            (Some(credential), Some(choices)) => Some(ReadySession {
                credential,
                choices,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::resolver::{IssuanceStrategy, RemoteIssuer};
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn remote_resolver(base_url: &str) -> Arc<CredentialResolver> {
        let template = format!("{}/events/{{id}}/token", base_url);
        Arc::new(CredentialResolver::new(IssuanceStrategy::Remote(
            RemoteIssuer::new(&template, Duration::from_secs(5)).unwrap(),
        )))
    }

    fn deep_link(token: &str, server_url: &str) -> DeepLinkParams {
        DeepLinkParams {
            token: Some(token.to_string()),
            server_url: Some(server_url.to_string()),
            participant_name: None,
        }
    }

    fn submission(name: &str) -> ParticipantChoices {
        ParticipantChoices {
            display_name: name.to_string(),
            video_enabled: true,
            audio_enabled: false,
            video_device_id: None,
            audio_device_id: Some("mic-1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_deep_link_ready_without_resolver() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let gate = PreJoinGate::new(
            "event-42",
            &deep_link("abc.def.ghi", "wss://x"),
            remote_resolver(&mock_server.uri()),
            RequestContext::default(),
        );

        assert_eq!(gate.state(), GateState::Ready);
        let ready = gate.into_ready().unwrap();
        assert_eq!(
            ready.credential,
            ConnectionCredential {
                server_url: "wss://x".to_string(),
                room_name: "event-42".to_string(),
                participant_name: String::new(),
                participant_token: "abc.def.ghi".to_string(),
            }
        );
        assert!(ready.choices.video_enabled);
        assert!(ready.choices.audio_enabled);
    }

    #[tokio::test]
    async fn test_deep_link_name_from_token() {
        let payload = URL_SAFE_NO_PAD.encode(r#"{"name":"Grace"}"#);
        let token = format!("h.{}.s", payload);
        let gate = PreJoinGate::new(
            "event-1",
            &deep_link(&token, "wss://x"),
            Arc::new(CredentialResolver::new(IssuanceStrategy::Unconfigured)),
            RequestContext::default(),
        );

        assert_eq!(gate.credential().unwrap().participant_name, "Grace");
        assert_eq!(gate.choices().unwrap().display_name, "Grace");
    }

    #[tokio::test]
    async fn test_deep_link_explicit_name_wins() {
        let mut params = deep_link("abc.def.ghi", "wss://x");
        params.participant_name = Some("Linus".to_string());
        let gate = PreJoinGate::new(
            "event-1",
            &params,
            Arc::new(CredentialResolver::new(IssuanceStrategy::Unconfigured)),
            RequestContext::default(),
        );

        assert_eq!(gate.defaults().display_name, "Linus");
        assert_eq!(gate.credential().unwrap().participant_name, "Linus");
    }

    #[tokio::test]
    async fn test_deep_link_submission_skips_resolution() {
        // An unconfigured resolver would fail if it were consulted.
        let mut gate = PreJoinGate::new(
            "event-1",
            &deep_link("abc.def.ghi", "wss://x"),
            Arc::new(CredentialResolver::new(IssuanceStrategy::Unconfigured)),
            RequestContext::default(),
        );

        let state = gate.submit(submission("")).await.unwrap();
        assert_eq!(state, GateState::Ready);

        let ready = gate.into_ready().unwrap();
        assert!(!ready.choices.audio_enabled);
        assert_eq!(ready.choices.video_device_id.as_deref(), Some(""));
        assert_eq!(ready.credential.participant_token, "abc.def.ghi");
    }

    #[tokio::test]
    async fn test_partial_deep_link_is_ignored() {
        let params = DeepLinkParams {
            token: Some("abc".to_string()),
            server_url: Some(String::new()),
            participant_name: Some("Ada".to_string()),
        };
        let gate = PreJoinGate::new(
            "event-1",
            &params,
            Arc::new(CredentialResolver::new(IssuanceStrategy::Unconfigured)),
            RequestContext::default(),
        );

        assert_eq!(gate.state(), GateState::Collecting);
        assert_eq!(gate.defaults().display_name, "Ada");
        assert!(gate.into_ready().is_none());
    }

    #[tokio::test]
    async fn test_submission_resolves_credential() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/events/42/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "serverUrl": "wss://y",
                "token": "T"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut gate = PreJoinGate::new(
            "event-42",
            &DeepLinkParams::default(),
            remote_resolver(&mock_server.uri()),
            RequestContext::default(),
        );
        assert_eq!(gate.state(), GateState::Collecting);

        let state = gate.submit(submission("Ada")).await.unwrap();
        assert_eq!(state, GateState::Ready);

        // A second submission must not resolve again.
        gate.submit(submission("Someone else")).await.unwrap();

        let ready = gate.into_ready().unwrap();
        assert_eq!(
            ready.credential,
            ConnectionCredential {
                server_url: "wss://y".to_string(),
                room_name: "event-42".to_string(),
                participant_name: "Ada".to_string(),
                participant_token: "T".to_string(),
            }
        );
        assert_eq!(ready.choices.display_name, "Ada");
    }

    #[tokio::test]
    async fn test_malformed_response_keeps_collecting() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "serverUrl": "wss://y" })),
            )
            .mount(&mock_server)
            .await;

        let mut gate = PreJoinGate::new(
            "event-42",
            &DeepLinkParams::default(),
            remote_resolver(&mock_server.uri()),
            RequestContext::default(),
        );

        let result = gate.submit(submission("Ada")).await;
        assert!(matches!(result, Err(AppError::MalformedIssuanceResponse(_))));
        assert_eq!(gate.state(), GateState::Collecting);
    }

    #[tokio::test]
    async fn test_empty_name_rejected_on_submission() {
        let mut gate = PreJoinGate::new(
            "event-42",
            &DeepLinkParams::default(),
            Arc::new(CredentialResolver::new(IssuanceStrategy::Unconfigured)),
            RequestContext::default(),
        );

        let result = gate.submit(submission("")).await;
        assert_eq!(result, Err(AppError::MissingParticipant));
        assert_eq!(gate.state(), GateState::Collecting);
    }

    #[tokio::test]
    async fn test_handoff_starts_session() {
        use crate::session::provider::mock::{Call, MockProvider};
        use crate::config::Config;
        use crate::session::{
            LogReporter, RoomOptions, SessionConfigBuilder, SessionController, VideoCodec,
        };

        let gate = PreJoinGate::new(
            "event-42",
            &deep_link("abc.def.ghi", "wss://x"),
            Arc::new(CredentialResolver::new(IssuanceStrategy::Unconfigured)),
            RequestContext::default(),
        );
        let provider = MockProvider::new();
        let config = Config {
            default_codec: VideoCodec::H264,
            ..Config::default()
        };
        let mut controller = SessionController::new(
            Arc::new(provider.clone()),
            SessionConfigBuilder::from_config(&config),
            RoomOptions::default(),
            Arc::new(LogReporter),
        );

        controller.start(gate.into_ready().unwrap()).await.unwrap();

        assert_eq!(
            provider.count(|c| matches!(
                c,
                Call::Connect { server_url, token, .. }
                    if server_url == "wss://x" && token == "abc.def.ghi"
            )),
            1
        );
        assert_eq!(
            controller.configuration().map(|c| c.publish.video_codec),
            Some(VideoCodec::H264)
        );
    }
}
