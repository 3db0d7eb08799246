//! Stochastic MLP policy with an optional value baseline.
mod base;
mod config;
pub use base::MlpPolicy;
pub use config::MlpPolicyConfig;
