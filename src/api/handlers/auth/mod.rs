//! Authentication flows: registration, password login with a mandatory
//! emailed second factor, and cookie sessions.

pub mod login;
pub(crate) mod password;
pub mod principal;
pub mod rate_limit;
pub mod register;
pub mod session;
pub mod state;
pub(crate) mod storage;
pub mod types;
pub(crate) mod utils;

mod reaper;

#[cfg(test)]
mod tests;

pub use rate_limit::NoopRateLimiter;
pub use state::{AuthConfig, AuthState};

pub(crate) use reaper::spawn_session_reaper;
