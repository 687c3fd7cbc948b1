//! Authorization redirect, code exchange and token refresh endpoints.

use std::convert::Infallible;

use axum::{
    Form, Json,
    extract::{FromRequest, Query, Request, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use fitrelay_oauth::TokenPair;
use serde::Deserialize;
use tracing::info;

use crate::error::{Result, ServerError, UpstreamOperation};
use crate::state::AppState;

/// Query parameters of the provider callback.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
}

/// Body of `POST /refresh_token`.
///
/// Accepts JSON or form-encoded bodies; the media type is matched
/// case-insensitively. Anything that fails to parse is
/// treated as an empty request so the handler answers with a 400.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl<S> FromRequest<S> for RefreshRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| {
                ct.to_ascii_lowercase()
                    .starts_with("application/x-www-form-urlencoded")
            });

        let parsed = if is_form {
            Form::<RefreshRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .ok()
        } else {
            Json::<RefreshRequest>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .ok()
        };

        Ok(parsed.unwrap_or_default())
    }
}

/// GET /auth
///
/// Redirects (302) to the provider consent page. No `state` parameter is
/// generated, so the callback cannot detect forged requests.
pub async fn authorize_handler(State(state): State<AppState>) -> Response {
    let url = state.oauth.authorization_url();
    (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
}

/// GET /callback?code=...
pub async fn callback_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<CallbackParams>, QueryRejection>,
) -> Result<Json<TokenPair>> {
    let Query(params) = query?;
    let code = non_empty(params.code)
        .ok_or_else(|| ServerError::BadRequest("Authorization code missing.".to_string()))?;

    let tokens = state
        .oauth
        .exchange_code(&code)
        .await
        .map_err(|e| ServerError::upstream(UpstreamOperation::CodeExchange, e))?
        .into_pair();

    info!("Authorization code exchanged for tokens");
    state.store_tokens(&tokens).await;

    Ok(Json(tokens))
}

/// POST /refresh_token
///
/// Returns the provider's new refresh token; the submitted one is never
/// echoed back.
pub async fn refresh_handler(
    State(state): State<AppState>,
    body: RefreshRequest,
) -> Result<Json<TokenPair>> {
    let refresh_token = non_empty(body.refresh_token)
        .ok_or_else(|| ServerError::BadRequest("Refresh token is required.".to_string()))?;

    let tokens = state
        .oauth
        .refresh_access_token(&refresh_token)
        .await
        .map_err(|e| ServerError::upstream(UpstreamOperation::TokenRefresh, e))?
        .into_pair();

    info!("Access token refreshed");
    state.store_tokens(&tokens).await;

    Ok(Json(tokens))
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
