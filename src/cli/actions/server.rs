use crate::{
    api,
    api::email::{EmailSender, LogEmailSender, SmtpSender},
    cli::commands::smtp,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub frontend_base_url: String,
    pub session_ttl_seconds: i64,
    pub session_reap_interval_seconds: u64,
    pub two_factor_ttl_seconds: i64,
    pub smtp: Option<smtp::Options>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the email sender cannot be built or the server fails
/// to start.
pub async fn execute(args: Args) -> Result<()> {
    let sender: Arc<dyn EmailSender> = match args.smtp {
        Some(options) => {
            info!(host = %options.host, "Using SMTP sender for two-factor codes");
            Arc::new(SmtpSender::new(&options).context("Failed to build SMTP transport")?)
        }
        None => {
            info!("No SMTP host configured, two-factor codes are logged only");
            Arc::new(LogEmailSender)
        }
    };

    let auth_config = api::handlers::auth::AuthConfig::new(args.frontend_base_url)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_session_reap_interval_seconds(args.session_reap_interval_seconds)
        .with_two_factor_ttl_seconds(args.two_factor_ttl_seconds);

    api::new(args.port, args.dsn, auth_config, sender).await
}
