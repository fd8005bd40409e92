use crate::{
    api,
    cli::actions::Action,
    oauth::GoogleOAuth,
    token::TokenSigner,
};
use anyhow::Result;
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};

/// Fully resolved server configuration.
#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub cors_origin: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_idle_timeout_seconds: u64,
    pub jwt_secret: String,
    pub token_issuer: String,
    pub access_token_ttl_seconds: i64,
    pub refresh_token_ttl_seconds: i64,
    pub cookie_secure: bool,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub oauth_redirect_url: String,
    pub oauth_state_ttl_seconds: u64,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the OAuth client cannot be built or the server fails
/// to start.
pub async fn handle(action: Action) -> Result<()> {
    let Action::Server(args) = action;

    let auth_config = api::AuthConfig::new(args.token_issuer.clone())
        .with_access_ttl_seconds(args.access_token_ttl_seconds)
        .with_refresh_ttl_seconds(args.refresh_token_ttl_seconds)
        .with_cookie_secure(args.cookie_secure);

    // The issuer string doubles as the audience, matching what validation
    // expects on every presented token.
    let signer = TokenSigner::new(
        SecretString::from(args.jwt_secret),
        args.token_issuer.clone(),
        args.token_issuer,
    );
    let auth_state = Arc::new(api::AuthState::new(auth_config, signer));

    let google = Arc::new(GoogleOAuth::new(
        args.google_client_id,
        SecretString::from(args.google_client_secret),
        args.oauth_redirect_url,
        Duration::from_secs(args.oauth_state_ttl_seconds),
    )?);

    let pool_settings = api::PoolSettings {
        max_connections: args.db_max_connections,
        min_connections: args.db_min_connections,
        idle_timeout: Duration::from_secs(args.db_idle_timeout_seconds),
    };

    api::new(
        args.port,
        args.dsn,
        pool_settings,
        &args.cors_origin,
        auth_state,
        google,
    )
    .await
}
