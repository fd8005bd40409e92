use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::instrument;

use super::{ACCESS_TOKEN_COOKIE, AuthState, REFRESH_TOKEN_COOKIE, clear_session_cookie};

#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    responses(
        (status = 204, description = "Session cookies cleared")
    ),
    tag = "auth"
)]
// Clears the session cookies only. Issued tokens stay valid until expiry:
// real revocation needs a denylist or refresh rotation, which is a future
// extension.
#[instrument(skip(auth_state))]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let secure = auth_state.config().cookie_secure();

    let mut headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(ACCESS_TOKEN_COOKIE, false, secure) {
        headers.append(SET_COOKIE, cookie);
    }
    if let Ok(cookie) = clear_session_cookie(REFRESH_TOKEN_COOKIE, true, secure) {
        headers.append(SET_COOKIE, cookie);
    }

    (StatusCode::NO_CONTENT, headers)
}
