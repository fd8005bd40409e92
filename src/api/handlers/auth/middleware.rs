//! Request gates for protected routes.
//!
//! [`auth_token`] reads a bearer access token from the `Authorization`
//! header, validates it, loads the user, and attaches it to the request for
//! downstream handlers. [`refresh_cookie`] protects the refresh endpoint by
//! requiring a valid refresh token cookie.

use crate::{store::UserStore, token::TokenKind};
use axum::{
    extract::{Extension, Request},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, error};

use super::{AuthState, REFRESH_TOKEN_COOKIE, cookie_value, error_response};

/// The user resolved by [`auth_token`], available to handlers via
/// `Extension<AuthenticatedUser>`.
#[derive(Clone)]
pub struct AuthenticatedUser(pub crate::store::User);

pub async fn auth_token(
    Extension(auth_state): Extension<Arc<AuthState>>,
    Extension(store): Extension<Arc<dyn UserStore>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(header) = request.headers().get(AUTHORIZATION) else {
        return error_response(StatusCode::UNAUTHORIZED, "Authorization header is missing");
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.trim().strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    let Some(token) = token else {
        return error_response(StatusCode::UNAUTHORIZED, "Authorization header is malformed");
    };

    let claims = match auth_state.signer().validate(token, TokenKind::Access) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Access token rejected: {:?}", e);
            return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
        }
    };

    let user_id = match claims.user_id() {
        Ok(user_id) => user_id,
        Err(e) => {
            debug!("Access token subject rejected: {:?}", e);
            return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
        }
    };

    let user = match store.find_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!("User {} not found", user_id);
            return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
        }
        Err(e) => {
            error!("Error fetching user: {:?}", e);
            return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
        }
    };

    request.extensions_mut().insert(AuthenticatedUser(user));
    next.run(request).await
}

pub async fn refresh_cookie(
    Extension(auth_state): Extension<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(token) = cookie_value(request.headers(), REFRESH_TOKEN_COOKIE) else {
        return error_response(StatusCode::UNAUTHORIZED, "Refresh token cookie is missing");
    };

    if let Err(e) = auth_state.signer().validate(&token, TokenKind::Refresh) {
        debug!("Refresh cookie rejected: {:?}", e);
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::AuthConfig;
    use crate::store::memory::InMemoryUserStore;
    use crate::store::NewUser;
    use crate::token::TokenSigner;
    use axum::{
        Router,
        body::Body,
        http::{Request as HttpRequest, StatusCode, header::COOKIE},
        middleware,
        routing::get,
    };
    use secrecy::SecretString;
    use tower::ServiceExt;

    async fn whoami(Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>) -> String {
        user.email
    }

    fn auth_state() -> Arc<AuthState> {
        let config = AuthConfig::new("monujo".to_string());
        let signer = TokenSigner::new(
            SecretString::from("sekreto".to_string()),
            "monujo".to_string(),
            "monujo".to_string(),
        );
        Arc::new(AuthState::new(config, signer))
    }

    async fn seeded_store() -> (Arc<dyn UserStore>, i64) {
        let store = InMemoryUserStore::new();
        let user = store
            .create(NewUser {
                email: "alice@example.com".to_string(),
                password_hash: "$2b$12$hash".to_string(),
                first_name: "Alice".to_string(),
                last_name: "Example".to_string(),
            })
            .await
            .expect("seed user");
        (Arc::new(store) as Arc<dyn UserStore>, user.id)
    }

    async fn bearer_router() -> (Router, Arc<AuthState>, i64) {
        let state = auth_state();
        let (store, user_id) = seeded_store().await;
        let router = Router::new()
            .route("/v1/dashboard", get(whoami))
            .layer(middleware::from_fn(auth_token))
            .layer(Extension(state.clone()))
            .layer(Extension(store));
        (router, state, user_id)
    }

    #[tokio::test]
    async fn missing_authorization_header_unauthorized() {
        let (router, _state, _user_id) = bearer_router().await;
        let response = router
            .oneshot(
                HttpRequest::get("/v1/dashboard")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_authorization_header_unauthorized() {
        let (router, _state, _user_id) = bearer_router().await;
        let response = router
            .oneshot(
                HttpRequest::get("/v1/dashboard")
                    .header(AUTHORIZATION, "Token abc")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_bearer_token_passes() -> anyhow::Result<()> {
        let (router, state, user_id) = bearer_router().await;
        let token = state.signer().issue(user_id, 60, TokenKind::Access)?;

        let response = router
            .oneshot(
                HttpRequest::get("/v1/dashboard")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn refresh_token_rejected_as_bearer() -> anyhow::Result<()> {
        let (router, state, user_id) = bearer_router().await;
        let token = state.signer().issue(user_id, 60, TokenKind::Refresh)?;

        let response = router
            .oneshot(
                HttpRequest::get("/v1/dashboard")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_subject_unauthorized() -> anyhow::Result<()> {
        let (router, state, _user_id) = bearer_router().await;
        let token = state.signer().issue(9999, 60, TokenKind::Access)?;

        let response = router
            .oneshot(
                HttpRequest::get("/v1/dashboard")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn refresh_cookie_gate() -> anyhow::Result<()> {
        let state = auth_state();
        let router = Router::new()
            .route("/v1/auth/refresh-token", get(|| async { "ok" }))
            .layer(middleware::from_fn(refresh_cookie))
            .layer(Extension(state.clone()));

        // No cookie
        let response = router
            .clone()
            .oneshot(
                HttpRequest::get("/v1/auth/refresh-token").body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Valid refresh cookie
        let token = state.signer().issue(42, 60, TokenKind::Refresh)?;
        let response = router
            .oneshot(
                HttpRequest::get("/v1/auth/refresh-token")
                    .header(COOKIE, format!("refresh_token={token}"))
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        Ok(())
    }
}
