use crate::{
    api::handlers::normalize_email,
    password,
    store::{self, NewUser, UserStore},
};
use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use super::{
    check_email, check_name, check_password, error_response,
    types::{RegisterRequest, UserResponse, ValidationErrorResponse},
};

fn validate(payload: &RegisterRequest) -> Vec<super::types::FieldError> {
    let mut errors = Vec::new();
    check_name(&mut errors, "first_name", &payload.first_name);
    check_name(&mut errors, "last_name", &payload.last_name);
    check_email(&mut errors, &payload.email);
    check_password(&mut errors, &payload.password);
    errors
}

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = UserResponse),
        (status = 400, description = "Validation failure", body = ValidationErrorResponse),
        (status = 409, description = "User with the specified email already exists", body = super::types::ErrorResponse),
        (status = 500, description = "Internal failure", body = super::types::ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(store, payload))]
pub async fn register(
    store: Extension<Arc<dyn UserStore>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let user: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return error_response(StatusCode::BAD_REQUEST, "Missing payload"),
    };

    let errors = validate(&user);
    if !errors.is_empty() {
        debug!("Validation failed: {:?}", errors);

        return (
            StatusCode::BAD_REQUEST,
            Json(ValidationErrorResponse::new(errors)),
        )
            .into_response();
    }

    let email = normalize_email(&user.email);

    // Pre-check keeps the common case a clean 409; the unique constraint
    // still decides a concurrent race below.
    match store.find_by_email(&email).await {
        Ok(Some(_)) => {
            error!("User already exists");
            return error_response(StatusCode::CONFLICT, "User already exists");
        }
        Ok(None) => (),
        Err(e) => {
            error!("Error checking if user exists: {:?}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error checking if user exists",
            );
        }
    }

    let password_hash = match password::hash(&user.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Error hashing password: {:?}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error processing request");
        }
    };

    match store
        .create(NewUser {
            email,
            password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
        })
        .await
    {
        Ok(created) => (StatusCode::CREATED, Json(UserResponse::from(created))).into_response(),
        Err(store::Error::Conflict) => {
            error!("User already exists");
            error_response(StatusCode::CONFLICT, "User already exists")
        }
        Err(e) => {
            error!("Error inserting user: {:?}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error creating user")
        }
    }
}
