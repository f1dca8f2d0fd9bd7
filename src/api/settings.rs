use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::session::VideoCodec;
use crate::state::AppState;

/// Cosmetic client settings
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub show_settings_menu: bool,
    pub default_codec: VideoCodec,
}

pub fn settings_routes() -> Router<AppState> {
    Router::new().route("/settings", get(settings))
}

/// GET /api/v1/settings
async fn settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    Json(SettingsResponse {
        show_settings_menu: state.config.show_settings_menu,
        default_codec: state.config.default_codec,
    })
}
