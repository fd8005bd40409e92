use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use super::handlers::{auth, dashboard, health};

/// `OpenAPI` document served at `/api-docs/openapi.json` and rendered by the
/// Swagger UI under `/docs`.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::register::register,
        auth::login::login,
        auth::logout::logout,
        auth::refresh::refresh_token,
        auth::oauth::google,
        auth::oauth::google_callback,
        dashboard::dashboard,
    ),
    components(schemas(
        health::Health,
        auth::types::RegisterRequest,
        auth::types::LoginRequest,
        auth::types::LoginResponse,
        auth::types::RefreshTokenRequest,
        auth::types::RefreshTokenResponse,
        auth::types::UserResponse,
        auth::types::ErrorResponse,
        auth::types::FieldError,
        auth::types::ValidationErrorResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login, and session tokens"),
        (name = "oauth", description = "Google OAuth2 delegation"),
        (name = "health", description = "Service health"),
        (name = "dashboard", description = "Routes requiring a bearer access token"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
