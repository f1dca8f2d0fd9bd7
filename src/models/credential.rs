use serde::{Deserialize, Serialize};

/// Server address plus signed token for one session attempt.
///
/// Also the JSON body returned by `GET /connection-details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionCredential {
    pub server_url: String,
    pub room_name: String,
    pub participant_name: String,
    pub participant_token: String,
}

/// Success body of the remote issuance service.
///
/// Fields are optional here so that a missing one can be reported as a
/// malformed response rather than a generic decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceResponse {
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub participant_name: Option<String>,
}

/// Query string of `GET /connection-details`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetailsQuery {
    #[serde(default)]
    pub room_name: String,
    #[serde(default)]
    pub participant_name: String,
}
