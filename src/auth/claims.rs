use serde::{Deserialize, Serialize};

/// Room-server access token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// API key the token was signed with.
    pub iss: String,
    /// Participant identity.
    pub sub: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub nbf: i64,
    pub exp: i64,
    pub jti: String,
    pub video: VideoGrant,
}

/// Permissions scoped to a single room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    pub room: String,
    pub room_join: bool,
    pub can_publish: bool,
    pub can_publish_data: bool,
    pub can_subscribe: bool,
}

impl VideoGrant {
    /// Join, publish audio/video, publish data and subscribe in `room` only.
    pub fn participant(room: &str) -> Self {
        Self {
            room: room.to_string(),
            room_join: true,
            can_publish: true,
            can_publish_data: true,
            can_subscribe: true,
        }
    }
}
