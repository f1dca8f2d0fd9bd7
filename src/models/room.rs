use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Namespace prefix every event room name carries.
pub const ROOM_PREFIX: &str = "event-";

/// Validated room name of the form `event-<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomIdentifier(String);

/// Suffix of a [`RoomIdentifier`], used to address the issuance service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventId(String);

impl RoomIdentifier {
    pub fn parse(raw: &str) -> Result<Self> {
        if !raw.starts_with(ROOM_PREFIX) {
            return Err(AppError::InvalidRoomIdentifier);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn event_id(&self) -> EventId {
        EventId(self.0[ROOM_PREFIX.len()..].to_string())
    }
}

impl TryFrom<String> for RoomIdentifier {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<RoomIdentifier> for String {
    fn from(room: RoomIdentifier) -> Self {
        room.0
    }
}

impl fmt::Display for RoomIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl EventId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute this id into an issuance URL template.
    pub fn fill_template(&self, template: &str) -> String {
        template.replacen("{id}", &self.0, 1)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
