pub mod config;
pub mod controller;
pub mod provider;

pub use config::{
    CaptureConstraints, PublishConstraints, RoomOptions, SessionConfigBuilder,
    SessionConfiguration, VideoCodec, VideoPreset,
};
pub use controller::{LogReporter, SessionController, SessionReporter, SessionState};
pub use provider::{
    ConnectOptions, MediaSession, MediaSessionProvider, ProviderError, RoomEvent, RoomEventKind,
    SubscriptionId,
};
