use axum::response::IntoResponse;

// Undocumented banner route; health lives under /v1/health.
pub async fn root() -> impl IntoResponse {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"))
}
