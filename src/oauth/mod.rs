//! Google OAuth2 delegate flow.
//!
//! The authorization URL carries a fresh random anti-forgery `state` for each
//! request. Pending states live in-process with a TTL and are consumed on
//! callback, so each one is single-use. The code exchange and profile fetch
//! are plain HTTPS calls to the provider; linking the external identity to a
//! local user record is out of scope.

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{RngCore, rngs::OsRng};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::error;
use url::Url;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to build authorization URL")]
    Url(#[from] url::ParseError),
    #[error("failed to generate state: {0}")]
    State(String),
    #[error("unknown or expired state")]
    UnknownState,
    #[error("failed to exchange authorization code: {0}")]
    Exchange(String),
    #[error("failed to fetch external profile: {0}")]
    ProfileFetch(String),
}

pub struct GoogleOAuth {
    client_id: String,
    client_secret: SecretString,
    redirect_url: String,
    state_ttl: Duration,
    pending_states: Mutex<HashMap<String, Instant>>,
    client: Client,
}

impl GoogleOAuth {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        client_id: String,
        client_secret: SecretString,
        redirect_url: String,
        state_ttl: Duration,
    ) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .map_err(|err| Error::Exchange(err.to_string()))?;

        Ok(Self {
            client_id,
            client_secret,
            redirect_url,
            state_ttl,
            pending_states: Mutex::new(HashMap::new()),
            client,
        })
    }

    /// Build the provider authorization URL with a fresh anti-forgery state.
    ///
    /// # Errors
    /// Returns an error if state generation or URL construction fails.
    pub async fn authorize_url(&self) -> Result<String, Error> {
        let state = generate_state()?;

        let mut states = self.pending_states.lock().await;
        states.retain(|_, created_at| created_at.elapsed() < self.state_ttl);
        states.insert(state.clone(), Instant::now());
        drop(states);

        let mut url = Url::parse(GOOGLE_AUTH_URL)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", "email profile")
            .append_pair("access_type", "offline")
            .append_pair("state", &state);

        Ok(url.to_string())
    }

    /// Consume a pending state. Each state verifies at most once.
    pub async fn take_state(&self, state: &str) -> bool {
        let mut states = self.pending_states.lock().await;
        states.retain(|_, created_at| created_at.elapsed() < self.state_ttl);
        states.remove(state).is_some()
    }

    /// Exchange an authorization code for a provider access token.
    ///
    /// # Errors
    /// Returns [`Error::Exchange`] if the provider rejects the code or the
    /// response carries no access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, Error> {
        let mut form = HashMap::new();
        form.insert("grant_type", "authorization_code");
        form.insert("code", code);
        form.insert("client_id", self.client_id.as_str());
        let client_secret = self.client_secret.expose_secret();
        form.insert("client_secret", client_secret);
        form.insert("redirect_uri", self.redirect_url.as_str());

        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&form)
            .send()
            .await
            .map_err(|err| Error::Exchange(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let json_response: Value = response.json().await.unwrap_or_default();

            let error_message = json_response["error"].as_str().unwrap_or_default();

            error!("Failed to exchange code: {}", error_message);

            return Err(Error::Exchange(format!("{status}, {error_message}")));
        }

        let json_response: Value = response
            .json()
            .await
            .map_err(|err| Error::Exchange(err.to_string()))?;

        json_response["access_token"].as_str().map_or_else(
            || {
                error!("Failed to exchange code, no access token in response");

                Err(Error::Exchange("no access token in response".to_string()))
            },
            |access_token| Ok(access_token.to_string()),
        )
    }

    /// Fetch the external profile with a provider access token.
    ///
    /// # Errors
    /// Returns [`Error::ProfileFetch`] if the provider call fails or the body
    /// is not JSON.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<Value, Error> {
        let response = self
            .client
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|err| Error::ProfileFetch(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();

            error!("Failed to fetch profile: {}", status);

            return Err(Error::ProfileFetch(status.to_string()));
        }

        response
            .json()
            .await
            .map_err(|err| Error::ProfileFetch(err.to_string()))
    }
}

/// Random URL-safe state for the authorization request.
/// The value is single-use; verification removes it from the pending set.
fn generate_state() -> Result<String, Error> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| Error::State(err.to_string()))?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}
