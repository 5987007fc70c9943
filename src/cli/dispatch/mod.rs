//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the
//! appropriate action, such as starting the API server with its full
//! configuration state.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, smtp};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;
    let smtp_opts = smtp::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        frontend_base_url: auth_opts.frontend_base_url,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        session_reap_interval_seconds: auth_opts.session_reap_interval_seconds,
        two_factor_ttl_seconds: auth_opts.two_factor_ttl_seconds,
        smtp: smtp_opts,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::actions::Action;

    #[test]
    fn dsn_required() {
        temp_env::with_vars([("PARCO_DSN", None::<&str>)], || {
            let command = crate::cli::commands::new();
            let matches = command
                .try_get_matches_from(vec!["parco"])
                .err()
                .map(|err| err.to_string());
            // clap rejects the missing required --dsn before dispatch runs.
            assert!(matches.is_some());
        });
    }

    #[test]
    fn server_args_built_from_matches() {
        temp_env::with_vars([("PARCO_DSN", None::<&str>)], || {
            let command = crate::cli::commands::new();
            let matches = command.get_matches_from(vec![
                "parco",
                "--dsn",
                "postgres://user@localhost:5432/parco",
                "--session-ttl-seconds",
                "3600",
                "--two-factor-ttl-seconds",
                "120",
            ]);
            let action = handler(&matches).expect("handler should build an action");
            let Action::Server(args) = action;
            assert_eq!(args.port, 8080);
            assert_eq!(args.session_ttl_seconds, 3600);
            assert_eq!(args.two_factor_ttl_seconds, 120);
            assert!(args.smtp.is_none());
        });
    }
}
