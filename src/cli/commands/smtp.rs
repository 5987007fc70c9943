use clap::{Arg, Command};
use secrecy::SecretString;

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("smtp-host")
                .long("smtp-host")
                .help("SMTP server used to deliver two-factor codes (log-only sender when unset)")
                .env("PARCO_SMTP_HOST"),
        )
        .arg(
            Arg::new("smtp-port")
                .long("smtp-port")
                .help("SMTP server port")
                .env("PARCO_SMTP_PORT")
                .default_value("465")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("smtp-username")
                .long("smtp-username")
                .help("SMTP authentication username")
                .env("PARCO_SMTP_USERNAME"),
        )
        .arg(
            Arg::new("smtp-password")
                .long("smtp-password")
                .help("SMTP authentication password")
                .env("PARCO_SMTP_PASSWORD"),
        )
        .arg(
            Arg::new("smtp-from")
                .long("smtp-from")
                .help("From address for outbound mail, e.g. \"Parco <no-reply@parco.dev>\"")
                .env("PARCO_SMTP_FROM"),
        )
        .arg(
            Arg::new("smtp-timeout-seconds")
                .long("smtp-timeout-seconds")
                .help("Timeout for SMTP delivery attempts")
                .env("PARCO_SMTP_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
}

/// SMTP settings; present only when a host was configured.
#[derive(Debug)]
pub struct Options {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: SecretString,
    pub from: String,
    pub timeout_seconds: u64,
}

impl Options {
    /// Extract SMTP options from validated CLI matches.
    ///
    /// Returns `Ok(None)` when no host is configured, in which case the
    /// server falls back to the log-only sender.
    ///
    /// # Errors
    /// Returns an error if a host is set but the from address is missing.
    pub fn parse(matches: &clap::ArgMatches) -> anyhow::Result<Option<Self>> {
        use anyhow::Context;

        let Some(host) = matches.get_one::<String>("smtp-host").cloned() else {
            return Ok(None);
        };

        let from = matches
            .get_one::<String>("smtp-from")
            .cloned()
            .context("missing required argument: --smtp-from (required with --smtp-host)")?;

        Ok(Some(Self {
            host,
            port: matches.get_one::<u16>("smtp-port").copied().unwrap_or(465),
            username: matches.get_one::<String>("smtp-username").cloned(),
            password: matches
                .get_one::<String>("smtp-password")
                .cloned()
                .map_or_else(|| SecretString::from(""), SecretString::from),
            from,
            timeout_seconds: matches
                .get_one::<u64>("smtp-timeout-seconds")
                .copied()
                .unwrap_or(10),
        }))
    }
}
