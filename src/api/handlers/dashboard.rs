use axum::{Json, extract::Extension, response::IntoResponse};
use tracing::instrument;

use super::auth::{middleware::AuthenticatedUser, types::UserResponse};

#[utoipa::path(
    get,
    path = "/v1/dashboard",
    responses(
        (status = 200, description = "The authenticated user", body = UserResponse),
        (status = 401, description = "Missing or invalid access token", body = super::auth::types::ErrorResponse),
    ),
    security(("bearer_token" = [])),
    tag = "dashboard"
)]
#[instrument(skip(user))]
pub async fn dashboard(Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>) -> impl IntoResponse {
    Json(UserResponse::from(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::User;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use chrono::Utc;

    #[tokio::test]
    async fn dashboard_returns_authenticated_user() {
        let now = Utc::now();
        let user = User {
            id: 7,
            email: "alice@example.com".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Example".to_string(),
            created_at: now,
            updated_at: now,
        };

        let response = dashboard(Extension(AuthenticatedUser(user)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        let value: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(
            value.get("email").and_then(serde_json::Value::as_str),
            Some("alice@example.com")
        );
        assert!(value.get("password").is_none());
        assert!(value.get("password_hash").is_none());
    }
}
