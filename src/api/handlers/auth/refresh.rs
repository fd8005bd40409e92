use crate::token::TokenKind;
use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::{
    AuthState, error_response,
    types::{RefreshTokenRequest, RefreshTokenResponse, ValidationErrorResponse},
};

#[utoipa::path(
    post,
    path = "/v1/auth/refresh-token",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access token issued", body = RefreshTokenResponse),
        (status = 400, description = "Validation failure", body = ValidationErrorResponse),
        (status = 401, description = "Refresh token missing, invalid, or expired", body = super::types::ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state, payload))]
pub async fn refresh_token(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RefreshTokenRequest>>,
) -> impl IntoResponse {
    let request: RefreshTokenRequest = match payload {
        Some(Json(payload)) => payload,
        None => return error_response(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    if request.refresh_token.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ValidationErrorResponse::new(vec![
                super::types::FieldError {
                    field: "refresh_token".to_string(),
                    error: "This field is required".to_string(),
                },
            ])),
        )
            .into_response();
    }

    // Any validation failure collapses to 401; the client learns nothing
    // about which check failed.
    let claims = match auth_state
        .signer()
        .validate(&request.refresh_token, TokenKind::Refresh)
    {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Refresh token rejected: {:?}", e);
            return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
        }
    };

    let user_id = match claims.user_id() {
        Ok(user_id) => user_id,
        Err(e) => {
            debug!("Refresh token subject rejected: {:?}", e);
            return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
        }
    };

    // New access token with fresh iat/nbf/exp; the refresh token itself is
    // not rotated.
    let access_token = match auth_state.signer().issue(
        user_id,
        auth_state.config().access_ttl_seconds(),
        TokenKind::Access,
    ) {
        Ok(token) => token,
        Err(e) => {
            error!("Error generating token: {:?}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error generating token");
        }
    };

    (
        StatusCode::OK,
        Json(RefreshTokenResponse { access_token }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::AuthConfig;
    use crate::token::TokenSigner;
    use axum::response::IntoResponse;
    use secrecy::SecretString;

    fn auth_state() -> Extension<Arc<AuthState>> {
        let config = AuthConfig::new("monujo".to_string());
        let signer = TokenSigner::new(
            SecretString::from("sekreto".to_string()),
            "monujo".to_string(),
            "monujo".to_string(),
        );
        Extension(Arc::new(AuthState::new(config, signer)))
    }

    fn request(token: &str) -> Option<Json<RefreshTokenRequest>> {
        Some(Json(RefreshTokenRequest {
            refresh_token: token.to_string(),
        }))
    }

    async fn response_token(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        let parsed: RefreshTokenResponse = serde_json::from_slice(&bytes).expect("json body");
        parsed.access_token
    }

    #[tokio::test]
    async fn refresh_missing_payload() {
        let response = refresh_token(auth_state(), None).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn refresh_empty_token_is_validation_error() {
        let response = refresh_token(auth_state(), request("")).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn refresh_issues_new_access_token() -> anyhow::Result<()> {
        let state = auth_state();
        let refresh = state.signer().issue(42, 3600, TokenKind::Refresh)?;

        let response = refresh_token(state.clone(), request(&refresh))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let access = response_token(response).await;
        let claims = state.signer().validate(&access, TokenKind::Access)?;
        assert_eq!(claims.sub, "42");
        Ok(())
    }

    #[tokio::test]
    async fn refresh_twice_yields_two_valid_access_tokens() -> anyhow::Result<()> {
        let state = auth_state();
        let refresh = state.signer().issue(42, 3600, TokenKind::Refresh)?;

        let first = refresh_token(state.clone(), request(&refresh))
            .await
            .into_response();
        // Second use of the same refresh token succeeds; it is not rotated.
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        let second = refresh_token(state.clone(), request(&refresh))
            .await
            .into_response();

        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::OK);

        let first_token = response_token(first).await;
        let second_token = response_token(second).await;
        assert_ne!(first_token, second_token);
        assert!(state.signer().validate(&first_token, TokenKind::Access).is_ok());
        assert!(state.signer().validate(&second_token, TokenKind::Access).is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn refresh_rejects_access_token() -> anyhow::Result<()> {
        let state = auth_state();
        let access = state.signer().issue(42, 3600, TokenKind::Access)?;

        let response = refresh_token(state, request(&access)).await.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn refresh_rejects_expired_token() -> anyhow::Result<()> {
        let state = auth_state();
        let expired = state.signer().issue(42, -60, TokenKind::Refresh)?;

        let response = refresh_token(state, request(&expired)).await.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn refresh_rejects_garbage_token() {
        let response = refresh_token(auth_state(), request("not-a-token"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
