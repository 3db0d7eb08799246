//! Action-value network with a target copy.
mod base;
mod config;
pub use base::QNetwork;
pub use config::QNetworkConfig;
