//! Session flow: register, login, refresh, logout, and the request gates.
//!
//! Tokens travel in two cookies with split visibility: `access_token` is
//! client-readable, `refresh_token` is `HttpOnly`. Both are `SameSite=None`
//! with a lifetime matching the token TTL.

pub mod login;
pub mod logout;
pub mod middleware;
pub mod oauth;
pub mod refresh;
pub mod register;
pub mod state;
pub mod types;

pub use state::{AuthConfig, AuthState};

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header::InvalidHeaderValue},
    response::{IntoResponse, Response},
};

use self::types::{ErrorResponse, FieldError};
use super::valid_email;

pub(crate) const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub(crate) const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

const PASSWORD_MIN_LEN: usize = 3;
const PASSWORD_MAX_LEN: usize = 72;
const NAME_MAX_LEN: usize = 100;
const EMAIL_MAX_LEN: usize = 255;

/// Single-message JSON error body: `{"error": message}`.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Build a session cookie. `http_only` splits the client-readable access
/// token from the server-only refresh token.
pub(crate) fn session_cookie(
    name: &str,
    token: &str,
    ttl_seconds: i64,
    http_only: bool,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}={token}; Path=/; SameSite=None; Max-Age={ttl_seconds}");
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(crate) fn clear_session_cookie(
    name: &str,
    http_only: bool,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    session_cookie(name, "", 0, http_only, secure)
}

/// Read a cookie value from the `Cookie` request header.
pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name {
            return Some(val.to_string());
        }
    }
    None
}

fn field_error(field: &str, error: &str) -> FieldError {
    FieldError {
        field: field.to_string(),
        error: error.to_string(),
    }
}

pub(crate) fn check_name(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(field_error(field, "This field is required"));
    } else if value.len() > NAME_MAX_LEN {
        errors.push(field_error(field, "Must not exceed 100 characters"));
    }
}

pub(crate) fn check_email(errors: &mut Vec<FieldError>, email: &str) {
    if email.trim().is_empty() {
        errors.push(field_error("email", "This field is required"));
    } else if email.len() > EMAIL_MAX_LEN || !valid_email(email.trim()) {
        errors.push(field_error("email", "Invalid email format"));
    }
}

pub(crate) fn check_password(errors: &mut Vec<FieldError>, password: &str) {
    if password.is_empty() {
        errors.push(field_error("password", "This field is required"));
    } else if password.len() < PASSWORD_MIN_LEN {
        errors.push(field_error("password", "Must be at least 3 characters long"));
    } else if password.len() > PASSWORD_MAX_LEN {
        errors.push(field_error("password", "Must not exceed 72 characters"));
    }
}
