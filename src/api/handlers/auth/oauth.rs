//! Google OAuth2 endpoints: authorization redirect and code-exchange callback.

use crate::oauth::GoogleOAuth;
use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, instrument};

use super::error_response;

#[derive(Deserialize, Debug)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

#[utoipa::path(
    get,
    path = "/v1/auth/google",
    responses(
        (status = 200, description = "Provider authorization URL", body = String),
        (status = 500, description = "Failed to build authorization URL", body = super::types::ErrorResponse),
    ),
    tag = "oauth"
)]
#[instrument(skip(oauth))]
pub async fn google(oauth: Extension<Arc<GoogleOAuth>>) -> impl IntoResponse {
    match oauth.authorize_url().await {
        Ok(url) => (StatusCode::OK, url).into_response(),
        Err(e) => {
            error!("Error building authorization URL: {:?}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error building authorization URL",
            )
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/auth/google/callback",
    params(
        ("code" = String, Query, description = "Authorization code from the provider"),
        ("state" = String, Query, description = "Anti-forgery state issued by /v1/auth/google"),
    ),
    responses(
        (status = 200, description = "External profile payload"),
        (status = 400, description = "Bad state, code, or provider rejection", body = super::types::ErrorResponse),
        (status = 500, description = "Provider profile fetch failure", body = super::types::ErrorResponse),
    ),
    tag = "oauth"
)]
#[instrument(skip(oauth, query))]
pub async fn google_callback(
    oauth: Extension<Arc<GoogleOAuth>>,
    query: Query<CallbackQuery>,
) -> impl IntoResponse {
    // The state was issued by us and is single-use; anything else is forged,
    // replayed, or expired.
    let Some(state) = query.state.as_deref().filter(|state| !state.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing state");
    };
    if !oauth.take_state(state).await {
        return error_response(StatusCode::BAD_REQUEST, "Unknown or expired state");
    }

    let Some(code) = query.code.as_deref().filter(|code| !code.is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing code");
    };

    let provider_token = match oauth.exchange_code(code).await {
        Ok(token) => token,
        Err(e) => {
            error!("Error exchanging authorization code: {:?}", e);
            return error_response(
                StatusCode::BAD_REQUEST,
                "Error exchanging authorization code",
            );
        }
    };

    match oauth.fetch_profile(&provider_token).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => {
            error!("Error fetching profile: {:?}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error fetching profile")
        }
    }
}
