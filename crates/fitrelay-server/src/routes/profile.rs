//! Authenticated profile read.

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::error::{Result, ServerError, UpstreamOperation};
use crate::routes::oauth::non_empty;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProfileParams {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// GET /user/profile?access_token=...
///
/// Pure forward: the token is not inspected locally and the resource API's
/// JSON body is returned unmodified.
pub async fn profile_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<ProfileParams>, QueryRejection>,
) -> Result<Response> {
    let Query(params) = query?;
    let access_token = non_empty(params.access_token)
        .ok_or_else(|| ServerError::BadRequest("Access token is required.".to_string()))?;

    let profile = state
        .oauth
        .fetch_profile(&access_token)
        .await
        .map_err(|e| ServerError::upstream(UpstreamOperation::ProfileFetch, e))?;

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        profile.into_bytes(),
    )
        .into_response())
}
