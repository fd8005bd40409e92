use clap::{Arg, Command};

pub const ARG_DB_MAX_CONNECTIONS: &str = "db-max-connections";
pub const ARG_DB_MIN_CONNECTIONS: &str = "db-min-connections";
pub const ARG_DB_IDLE_TIMEOUT: &str = "db-idle-timeout-seconds";

/// Parsed database pool options. The DSN itself lives with the top-level args.
#[derive(Debug)]
pub struct Options {
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout_seconds: u64,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &clap::ArgMatches) -> Self {
        Self {
            max_connections: matches
                .get_one::<u32>(ARG_DB_MAX_CONNECTIONS)
                .copied()
                .unwrap_or(30),
            min_connections: matches
                .get_one::<u32>(ARG_DB_MIN_CONNECTIONS)
                .copied()
                .unwrap_or(1),
            idle_timeout_seconds: matches
                .get_one::<u64>(ARG_DB_IDLE_TIMEOUT)
                .copied()
                .unwrap_or(900),
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DB_MAX_CONNECTIONS)
                .long(ARG_DB_MAX_CONNECTIONS)
                .help("Maximum number of pooled database connections")
                .env("MONUJO_DB_MAX_CONNECTIONS")
                .default_value("30")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_DB_MIN_CONNECTIONS)
                .long(ARG_DB_MIN_CONNECTIONS)
                .help("Minimum number of pooled database connections")
                .env("MONUJO_DB_MIN_CONNECTIONS")
                .default_value("1")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_DB_IDLE_TIMEOUT)
                .long(ARG_DB_IDLE_TIMEOUT)
                .help("Seconds an idle database connection is kept before being closed")
                .env("MONUJO_DB_IDLE_TIMEOUT_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(u64)),
        )
}
