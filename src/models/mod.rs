pub mod credential;
pub mod participant;
pub mod room;

pub use credential::{ConnectionCredential, ConnectionDetailsQuery, IssuanceResponse};
pub use participant::ParticipantChoices;
pub use room::{EventId, RoomIdentifier, ROOM_PREFIX};
