use clap::{Arg, Command};

pub const ARG_GOOGLE_CLIENT_ID: &str = "google-client-id";
pub const ARG_GOOGLE_CLIENT_SECRET: &str = "google-client-secret";
pub const ARG_OAUTH_REDIRECT_URL: &str = "oauth-redirect-url";
pub const ARG_OAUTH_STATE_TTL: &str = "oauth-state-ttl-seconds";

/// Parsed Google OAuth2 options.
#[derive(Debug)]
pub struct Options {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub state_ttl_seconds: u64,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &clap::ArgMatches) -> Self {
        Self {
            client_id: matches
                .get_one::<String>(ARG_GOOGLE_CLIENT_ID)
                .cloned()
                .unwrap_or_default(),
            client_secret: matches
                .get_one::<String>(ARG_GOOGLE_CLIENT_SECRET)
                .cloned()
                .unwrap_or_default(),
            redirect_url: matches
                .get_one::<String>(ARG_OAUTH_REDIRECT_URL)
                .cloned()
                .unwrap_or_else(|| {
                    "http://localhost:8080/v1/auth/google/callback".to_string()
                }),
            state_ttl_seconds: matches
                .get_one::<u64>(ARG_OAUTH_STATE_TTL)
                .copied()
                .unwrap_or(600),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_GOOGLE_CLIENT_ID)
                .long(ARG_GOOGLE_CLIENT_ID)
                .help("Google OAuth2 client id")
                .env("MONUJO_GOOGLE_CLIENT_ID")
                .default_value(""),
        )
        .arg(
            Arg::new(ARG_GOOGLE_CLIENT_SECRET)
                .long(ARG_GOOGLE_CLIENT_SECRET)
                .help("Google OAuth2 client secret")
                .env("MONUJO_GOOGLE_CLIENT_SECRET")
                .default_value(""),
        )
        .arg(
            Arg::new(ARG_OAUTH_REDIRECT_URL)
                .long(ARG_OAUTH_REDIRECT_URL)
                .help("Redirect URL registered with the OAuth2 provider")
                .env("MONUJO_OAUTH_REDIRECT_URL")
                .default_value("http://localhost:8080/v1/auth/google/callback"),
        )
        .arg(
            Arg::new(ARG_OAUTH_STATE_TTL)
                .long(ARG_OAUTH_STATE_TTL)
                .help("TTL for pending OAuth2 anti-forgery states in seconds")
                .env("MONUJO_OAUTH_STATE_TTL_SECONDS")
                .default_value("600")
                .value_parser(clap::value_parser!(u64)),
        )
}
