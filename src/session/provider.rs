//! Seam to the real-time media engine.
//!
//! The engine itself (transport, codecs, device capture) lives outside this
//! crate. A [`MediaSessionProvider`] hands out one [`MediaSession`] per
//! session attempt; the controller owns it exclusively.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::session::config::SessionConfiguration;

/// Room events the controller listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomEventKind {
    Disconnected,
    EncryptionError,
    MediaDevicesError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    Disconnected { reason: Option<String> },
    EncryptionError(String),
    MediaDevicesError(String),
}

impl RoomEvent {
    pub fn kind(&self) -> RoomEventKind {
        match self {
            RoomEvent::Disconnected { .. } => RoomEventKind::Disconnected,
            RoomEvent::EncryptionError(_) => RoomEventKind::EncryptionError,
            RoomEvent::MediaDevicesError(_) => RoomEventKind::MediaDevicesError,
        }
    }
}

pub type EventSink = mpsc::UnboundedSender<RoomEvent>;

/// Handle returned by [`MediaSession::on`], used to detach the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions {
    pub auto_subscribe: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            auto_subscribe: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// A live media session with a room server.
#[async_trait]
pub trait MediaSession: Send {
    /// Register an observer for `kind`; events are pushed into `sink`.
    fn on(&mut self, kind: RoomEventKind, sink: EventSink) -> SubscriptionId;

    fn off(&mut self, id: SubscriptionId);

    async fn connect(
        &mut self,
        server_url: &str,
        token: &str,
        options: ConnectOptions,
    ) -> Result<(), ProviderError>;

    async fn set_camera_enabled(&mut self, enabled: bool) -> Result<(), ProviderError>;

    async fn set_microphone_enabled(&mut self, enabled: bool) -> Result<(), ProviderError>;

    /// Leave the room immediately. Must not block.
    fn disconnect(&mut self, stop_tracks: bool);
}

pub trait MediaSessionProvider: Send + Sync {
    fn create_session(&self, config: &SessionConfiguration) -> Box<dyn MediaSession>;
}

/// Recording provider for tests.
pub mod mock {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex, MutexGuard};

    use super::*;

    /// One call made against a mock session, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Created(Box<SessionConfiguration>),
        On(RoomEventKind),
        Off(RoomEventKind),
        Connect {
            server_url: String,
            token: String,
            auto_subscribe: bool,
        },
        Camera(bool),
        Microphone(bool),
        Disconnect { stop_tracks: bool },
    }

    #[derive(Default)]
    struct Shared {
        calls: Vec<Call>,
        observers: HashMap<SubscriptionId, (RoomEventKind, EventSink)>,
        next_id: u64,
        /// Events emitted from inside `connect`, before it returns.
        during_connect: Vec<RoomEvent>,
    }

    /// Provider whose sessions record every call and can be told to fail.
    #[derive(Clone, Default)]
    pub struct MockProvider {
        shared: Arc<Mutex<Shared>>,
        pub fail_connect: Option<String>,
        pub fail_camera: Option<String>,
        pub fail_microphone: Option<String>,
        /// `connect` stays pending forever.
        pub hang_connect: bool,
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_connect(message: &str) -> Self {
            Self {
                fail_connect: Some(message.to_string()),
                ..Self::default()
            }
        }

        pub fn failing_camera(message: &str) -> Self {
            Self {
                fail_camera: Some(message.to_string()),
                ..Self::default()
            }
        }

        pub fn failing_microphone(message: &str) -> Self {
            Self {
                fail_microphone: Some(message.to_string()),
                ..Self::default()
            }
        }

        pub fn hanging_connect() -> Self {
            Self {
                hang_connect: true,
                ..Self::default()
            }
        }

        fn lock(&self) -> MutexGuard<'_, Shared> {
            match self.shared.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.lock().calls.clone()
        }

        pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.lock().calls.iter().filter(|&c| pred(c)).count()
        }

        pub fn active_observers(&self) -> usize {
            self.lock().observers.len()
        }

        /// Deliver `event` to every attached observer of its kind.
        pub fn emit(&self, event: RoomEvent) -> usize {
            let shared = self.lock();
            shared
                .observers
                .values()
                .filter(|(kind, _)| *kind == event.kind())
                .filter(|(_, sink)| sink.send(event.clone()).is_ok())
                .count()
        }

        /// Queue `event` to be emitted while `connect` is in flight.
        pub fn emit_during_connect(&self, event: RoomEvent) {
            self.lock().during_connect.push(event);
        }
    }

    impl MediaSessionProvider for MockProvider {
        fn create_session(&self, config: &SessionConfiguration) -> Box<dyn MediaSession> {
            self.lock().calls.push(Call::Created(Box::new(config.clone())));
            Box::new(MockSession {
                provider: self.clone(),
            })
        }
    }

    struct MockSession {
        provider: MockProvider,
    }

    #[async_trait]
    impl MediaSession for MockSession {
        fn on(&mut self, kind: RoomEventKind, sink: EventSink) -> SubscriptionId {
            let mut shared = self.provider.lock();
            shared.next_id += 1;
            let id = SubscriptionId(shared.next_id);
            shared.observers.insert(id, (kind, sink));
            shared.calls.push(Call::On(kind));
            id
        }

        fn off(&mut self, id: SubscriptionId) {
            let mut shared = self.provider.lock();
            if let Some((kind, _)) = shared.observers.remove(&id) {
                shared.calls.push(Call::Off(kind));
            }
        }

        async fn connect(
            &mut self,
            server_url: &str,
            token: &str,
            options: ConnectOptions,
        ) -> Result<(), ProviderError> {
            let pending = {
                let mut shared = self.provider.lock();
                shared.calls.push(Call::Connect {
                    server_url: server_url.to_string(),
                    token: token.to_string(),
                    auto_subscribe: options.auto_subscribe,
                });
                std::mem::take(&mut shared.during_connect)
            };
            for event in pending {
                self.provider.emit(event);
            }

            if self.provider.hang_connect {
                std::future::pending::<()>().await;
            }

            match &self.provider.fail_connect {
                Some(message) => Err(ProviderError(message.clone())),
                None => Ok(()),
            }
        }

        async fn set_camera_enabled(&mut self, enabled: bool) -> Result<(), ProviderError> {
            self.provider.lock().calls.push(Call::Camera(enabled));
            match &self.provider.fail_camera {
                Some(message) => Err(ProviderError(message.clone())),
                None => Ok(()),
            }
        }

        async fn set_microphone_enabled(&mut self, enabled: bool) -> Result<(), ProviderError> {
            self.provider.lock().calls.push(Call::Microphone(enabled));
            match &self.provider.fail_microphone {
                Some(message) => Err(ProviderError(message.clone())),
                None => Ok(()),
            }
        }

        fn disconnect(&mut self, stop_tracks: bool) {
            self.provider
                .lock()
                .calls
                .push(Call::Disconnect { stop_tracks });
        }
    }
}
