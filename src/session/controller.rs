use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::gate::ReadySession;
use crate::session::config::{RoomOptions, SessionConfigBuilder, SessionConfiguration};
use crate::session::provider::{
    ConnectOptions, MediaSession, MediaSessionProvider, RoomEvent, RoomEventKind, SubscriptionId,
};

/// Observers registered on every session, in registration order.
const OBSERVED: [RoomEventKind; 3] = [
    RoomEventKind::Disconnected,
    RoomEventKind::EncryptionError,
    RoomEventKind::MediaDevicesError,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Active,
    Terminated,
}

/// Receives what the participant should be told about.
pub trait SessionReporter: Send + Sync {
    /// A user-visible error. Only [`AppError::ConnectFailure`] is fatal.
    fn report(&self, error: &AppError);

    /// The session ended; return the participant to the landing page.
    fn left(&self);
}

/// Reporter that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl SessionReporter for LogReporter {
    fn report(&self, error: &AppError) {
        tracing::error!(error = %error, fatal = error.is_session_fatal(), "Session error");
    }

    fn left(&self) {
        tracing::info!("Participant left the room");
    }
}

/// Owns one media session from connect to teardown.
///
/// A controller runs at most once. Teardown (detach observers, then force
/// disconnect) happens on every exit path, including drop.
pub struct SessionController {
    id: Uuid,
    state: SessionState,
    provider: Arc<dyn MediaSessionProvider>,
    builder: SessionConfigBuilder,
    options: RoomOptions,
    reporter: Arc<dyn SessionReporter>,
    session: Option<Box<dyn MediaSession>>,
    subscriptions: Vec<SubscriptionId>,
    events: Option<mpsc::UnboundedReceiver<RoomEvent>>,
    configuration: Option<SessionConfiguration>,
}

impl SessionController {
    pub fn new(
        provider: Arc<dyn MediaSessionProvider>,
        builder: SessionConfigBuilder,
        options: RoomOptions,
        reporter: Arc<dyn SessionReporter>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            provider,
            builder,
            options,
            reporter,
            session: None,
            subscriptions: Vec::new(),
            events: None,
            configuration: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn configuration(&self) -> Option<&SessionConfiguration> {
        self.configuration.as_ref()
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(session_id = %self.id, from = ?self.state, to = ?next, "Session state change");
        self.state = next;
    }

    /// Connect with the handed-off credential and publish per the choices.
    ///
    /// Connect failures are reported, the session is torn down and the
    /// controller ends in [`SessionState::Terminated`].
    pub async fn start(&mut self, ready: ReadySession) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(AppError::ConnectFailure(
                "session controller has already been used".to_string(),
            ));
        }

        let ReadySession {
            credential,
            choices,
        } = ready;

        let configuration = self.builder.build(&choices, self.options);
        let mut session = self.provider.create_session(&configuration);
        self.configuration = Some(configuration);
        self.transition(SessionState::Connecting);

        let (tx, rx) = mpsc::unbounded_channel();
        for kind in OBSERVED {
            self.subscriptions.push(session.on(kind, tx.clone()));
        }
        self.events = Some(rx);
        let session = self.session.insert(session);

        tracing::info!(
            session_id = %self.id,
            room = %credential.room_name,
            server_url = %credential.server_url,
            "Connecting to room"
        );

        let connected = session
            .connect(
                &credential.server_url,
                &credential.participant_token,
                ConnectOptions::default(),
            )
            .await;
        if let Err(e) = connected {
            let error = AppError::ConnectFailure(e.to_string());
            self.reporter.report(&error);
            self.teardown();
            return Err(error);
        }

        self.transition(SessionState::Active);

        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        // Camera and microphone are independent; one failing never skips the other.
        if choices.video_enabled {
            if let Err(e) = session.set_camera_enabled(true).await {
                self.reporter
                    .report(&AppError::MediaDeviceFailure(e.to_string()));
            }
        }
        if choices.audio_enabled {
            if let Err(e) = session.set_microphone_enabled(true).await {
                self.reporter
                    .report(&AppError::MediaDeviceFailure(e.to_string()));
            }
        }

        Ok(())
    }

    /// Supervise the session until it disconnects.
    ///
    /// Encryption and device errors are reported and the session stays up.
    pub async fn run(&mut self) {
        while self.state == SessionState::Active {
            let event = match self.events.as_mut() {
                Some(events) => events.recv().await,
                None => None,
            };

            match event {
                Some(RoomEvent::EncryptionError(message)) => {
                    self.reporter.report(&AppError::EncryptionFailure(message));
                }
                Some(RoomEvent::MediaDevicesError(message)) => {
                    self.reporter.report(&AppError::MediaDeviceFailure(message));
                }
                Some(RoomEvent::Disconnected { reason }) => {
                    tracing::info!(session_id = %self.id, reason = ?reason, "Room disconnected");
                    self.reporter.left();
                    self.teardown();
                }
                None => {
                    tracing::warn!(session_id = %self.id, "Room event stream closed");
                    self.reporter.left();
                    self.teardown();
                }
            }
        }
    }

    /// Local exit: leave the room now.
    pub fn leave(&mut self) {
        self.teardown();
    }

    /// Detach every observer, then force the session closed. Idempotent.
    fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            for id in self.subscriptions.drain(..) {
                session.off(id);
            }
            session.disconnect(true);
            tracing::debug!(session_id = %self.id, "Session torn down");
        }
        self.events = None;
        if self.state != SessionState::Terminated && self.state != SessionState::Idle {
            self.transition(SessionState::Terminated);
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.teardown();
    }
}
