//! # Monujo (Finance Tracker API)
//!
//! `monujo` is the backend API for the Monujo personal finance tracker. It
//! handles user registration, password-based login, JWT session issuance and
//! refresh, and Google OAuth2 sign-in delegation.
//!
//! ## Authentication
//!
//! Passwords are stored as bcrypt hashes; plaintext never touches the
//! database. Sessions are a pair of HS256 JWTs bound to the user id: a
//! short-lived access token (client-readable cookie, also accepted as a
//! bearer token) and a long-lived refresh token (`HttpOnly` cookie) used only
//! to mint new access tokens. Each token carries a `kind` claim and is
//! rejected where the other kind is expected.
//!
//! ## Storage
//!
//! User records live behind the [`store::UserStore`] trait, with a PostgreSQL
//! implementation for production and an in-memory double for tests. Email
//! uniqueness is enforced by the database constraint, so concurrent
//! registrations for the same address resolve to a single winner.

pub mod api;
pub mod cli;
pub mod oauth;
pub mod password;
pub mod store;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
