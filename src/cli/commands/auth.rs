use clap::{Arg, Command};

pub fn with_args(command: Command) -> Command {
    let command = with_session_args(command);
    with_two_factor_args(command)
}

fn with_session_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("frontend-base-url")
                .long("frontend-base-url")
                .help("Frontend base URL, used for CORS and cookie security")
                .env("PARCO_FRONTEND_BASE_URL")
                .default_value("http://localhost:5000"),
        )
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Session cookie TTL in seconds")
                .env("PARCO_SESSION_TTL_SECONDS")
                .default_value("2592000")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("session-reap-interval-seconds")
                .long("session-reap-interval-seconds")
                .help("Interval between sweeps of expired session rows")
                .env("PARCO_SESSION_REAP_INTERVAL_SECONDS")
                .default_value("300")
                .value_parser(clap::value_parser!(u64)),
        )
}

fn with_two_factor_args(command: Command) -> Command {
    command.arg(
        Arg::new("two-factor-ttl-seconds")
            .long("two-factor-ttl-seconds")
            .help("Lifetime of an emailed two-factor code in seconds")
            .env("PARCO_TWO_FACTOR_TTL_SECONDS")
            .default_value("600")
            .value_parser(clap::value_parser!(i64)),
    )
}

#[derive(Debug)]
pub struct Options {
    pub frontend_base_url: String,
    pub session_ttl_seconds: i64,
    pub session_reap_interval_seconds: u64,
    pub two_factor_ttl_seconds: i64,
}

impl Options {
    /// Extract auth options from validated CLI matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is somehow missing.
    pub fn parse(matches: &clap::ArgMatches) -> anyhow::Result<Self> {
        use anyhow::Context;

        Ok(Self {
            frontend_base_url: matches
                .get_one::<String>("frontend-base-url")
                .cloned()
                .context("missing required argument: --frontend-base-url")?,
            session_ttl_seconds: matches
                .get_one::<i64>("session-ttl-seconds")
                .copied()
                .context("missing required argument: --session-ttl-seconds")?,
            session_reap_interval_seconds: matches
                .get_one::<u64>("session-reap-interval-seconds")
                .copied()
                .context("missing required argument: --session-reap-interval-seconds")?,
            two_factor_ttl_seconds: matches
                .get_one::<i64>("two-factor-ttl-seconds")
                .copied()
                .context("missing required argument: --two-factor-ttl-seconds")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_product_settings() {
        let command = with_args(Command::new("test"));
        let matches = command.get_matches_from(vec!["test"]);
        let options = Options::parse(&matches).expect("defaults should parse");

        // 30 days for sessions, 10 minutes for codes.
        assert_eq!(options.session_ttl_seconds, 30 * 24 * 60 * 60);
        assert_eq!(options.two_factor_ttl_seconds, 10 * 60);
        assert_eq!(options.session_reap_interval_seconds, 300);
        assert_eq!(options.frontend_base_url, "http://localhost:5000");
    }
}
