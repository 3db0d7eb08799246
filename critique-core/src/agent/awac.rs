//! Advantage-weighted actor-critic agent with exploration bonus.
mod base;
mod config;
pub use base::Awac;
pub use config::AwacConfig;
