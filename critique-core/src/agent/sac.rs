//! Soft actor-critic agent.
mod base;
mod config;
pub use base::Sac;
pub use config::SacConfig;
