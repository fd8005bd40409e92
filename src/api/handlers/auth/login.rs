use crate::{
    api::handlers::normalize_email,
    password,
    store::UserStore,
    token::TokenKind,
};
use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::{
    ACCESS_TOKEN_COOKIE, AuthState, REFRESH_TOKEN_COOKIE, check_email, check_password,
    error_response, session_cookie,
    types::{LoginRequest, LoginResponse, UserResponse, ValidationErrorResponse},
};

fn validate(payload: &LoginRequest) -> Vec<super::types::FieldError> {
    let mut errors = Vec::new();
    check_email(&mut errors, &payload.email);
    check_password(&mut errors, &payload.password);
    errors
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookies set", body = LoginResponse),
        (status = 400, description = "Validation failure", body = ValidationErrorResponse),
        (status = 401, description = "Invalid credentials", body = super::types::ErrorResponse),
        (status = 500, description = "Internal failure", body = super::types::ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(store, auth_state, payload))]
pub async fn login(
    store: Extension<Arc<dyn UserStore>>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let credentials: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return error_response(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    let errors = validate(&credentials);
    if !errors.is_empty() {
        debug!("Validation failed: {:?}", errors);

        return (
            StatusCode::BAD_REQUEST,
            Json(ValidationErrorResponse::new(errors)),
        )
            .into_response();
    }

    let email = normalize_email(&credentials.email);

    // Unknown email and wrong password produce the same response so neither
    // field leaks which one was wrong.
    let user = match store.find_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!("User not found");
            return error_response(StatusCode::UNAUTHORIZED, "Invalid credentials");
        }
        Err(e) => {
            error!("Error fetching user: {:?}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error processing request");
        }
    };

    match password::verify(&user.password_hash, &credentials.password) {
        Ok(true) => (),
        Ok(false) => {
            debug!("Password mismatch");
            return error_response(StatusCode::UNAUTHORIZED, "Invalid credentials");
        }
        Err(e) => {
            error!("Error verifying password: {:?}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error processing request");
        }
    }

    let config = auth_state.config();
    let access_token = match auth_state.signer().issue(
        user.id,
        config.access_ttl_seconds(),
        TokenKind::Access,
    ) {
        Ok(token) => token,
        Err(e) => {
            error!("Error generating token: {:?}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error generating token");
        }
    };
    let refresh_token = match auth_state.signer().issue(
        user.id,
        config.refresh_ttl_seconds(),
        TokenKind::Refresh,
    ) {
        Ok(token) => token,
        Err(e) => {
            error!("Error generating token: {:?}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error generating token");
        }
    };

    let access_cookie = session_cookie(
        ACCESS_TOKEN_COOKIE,
        &access_token,
        config.access_ttl_seconds(),
        false,
        config.cookie_secure(),
    );
    let refresh_cookie = session_cookie(
        REFRESH_TOKEN_COOKIE,
        &refresh_token,
        config.refresh_ttl_seconds(),
        true,
        config.cookie_secure(),
    );
    let (Ok(access_cookie), Ok(refresh_cookie)) = (access_cookie, refresh_cookie) else {
        error!("Error building session cookies");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error processing request");
    };

    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, access_cookie);
    headers.append(SET_COOKIE, refresh_cookie);

    (
        StatusCode::OK,
        headers,
        Json(LoginResponse {
            user: UserResponse::from(user),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::AuthConfig;
    use crate::store::memory::InMemoryUserStore;
    use crate::store::NewUser;
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

    async fn seeded_store(email: &str, password: &str) -> Extension<Arc<dyn UserStore>> {
        let store = InMemoryUserStore::new();
        let password_hash = crate::password::hash(password).expect("bcrypt hash");
        store
            .create(NewUser {
                email: email.to_string(),
                password_hash,
                first_name: "Alice".to_string(),
                last_name: "Example".to_string(),
            })
            .await
            .expect("seed user");
        Extension(Arc::new(store) as Arc<dyn UserStore>)
    }

    fn request(email: &str, password: &str) -> Option<Json<LoginRequest>> {
        Some(Json(LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }))
    }

    #[tokio::test]
    async fn login_missing_payload() {
        let store = seeded_store("a@x.com", "secret123").await;
        let response = login(store, auth_state(), None).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_success_sets_both_cookies() {
        let store = seeded_store("a@x.com", "secret123").await;
        let response = login(store, auth_state(), request("a@x.com", "secret123"))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let cookies: Vec<_> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok().map(ToString::to_string))
            .collect();
        assert_eq!(cookies.len(), 2);

        let access = cookies
            .iter()
            .find(|cookie| cookie.starts_with("access_token="))
            .expect("access cookie");
        assert!(!access.contains("HttpOnly"));
        assert!(access.contains("SameSite=None"));

        let refresh = cookies
            .iter()
            .find(|cookie| cookie.starts_with("refresh_token="))
            .expect("refresh cookie");
        assert!(refresh.contains("HttpOnly"));
        assert!(refresh.contains("SameSite=None"));
    }

    #[tokio::test]
    async fn login_wrong_password_unauthorized() {
        let store = seeded_store("a@x.com", "secret123").await;
        let response = login(store, auth_state(), request("a@x.com", "wrong-password"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_unknown_email_indistinguishable_from_wrong_password() {
        let store = seeded_store("a@x.com", "secret123").await;
        let wrong_password = login(
            store.clone(),
            auth_state(),
            request("a@x.com", "wrong-password"),
        )
        .await
        .into_response();
        let unknown_email = login(store, auth_state(), request("b@x.com", "secret123"))
            .await
            .into_response();

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

        let body = |response: axum::response::Response| async {
            axum::body::to_bytes(response.into_body(), 1024).await
        };
        let first = body(wrong_password).await.expect("body");
        let second = body(unknown_email).await.expect("body");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn login_invalid_payload_rejected() {
        let store = seeded_store("a@x.com", "secret123").await;
        let response = login(store, auth_state(), request("not-an-email", "ab"))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
