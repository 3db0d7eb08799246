//! Policy-gradient agent.
mod base;
mod config;
pub use base::Pg;
pub use config::PgConfig;
