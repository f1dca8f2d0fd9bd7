use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};

use crate::error::Result;
use crate::models::{ConnectionCredential, ConnectionDetailsQuery};
use crate::resolver::RequestContext;
use crate::state::AppState;

pub fn connection_details_routes() -> Router<AppState> {
    Router::new().route("/connection-details", get(connection_details))
}

/// GET /connection-details?roomName=event-<id>&participantName=<name>
async fn connection_details(
    State(state): State<AppState>,
    Query(query): Query<ConnectionDetailsQuery>,
    headers: HeaderMap,
) -> Result<Json<ConnectionCredential>> {
    let ctx = RequestContext::from_headers(&headers);

    let credential = state
        .resolver
        .resolve(&query.room_name, &query.participant_name, &ctx)
        .await?;

    Ok(Json(credential))
}
