//! Background sweep for expired sessions.
//!
//! Lookups already refuse expired rows; this task only keeps the table from
//! growing without bound.

use sqlx::PgPool;
use std::time::Duration;
use tracing::{debug, error, info};

use super::storage::purge_expired_sessions;

pub(crate) fn spawn_session_reaper(pool: PgPool, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds.max(1)));
        // First tick fires immediately; skip it so startup stays quiet.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match purge_expired_sessions(&pool).await {
                Ok(0) => debug!("Session sweep found nothing to purge"),
                Ok(purged) => info!(purged, "Purged expired sessions"),
                Err(err) => error!("Session sweep failed: {err}"),
            }
        }
    });
}
