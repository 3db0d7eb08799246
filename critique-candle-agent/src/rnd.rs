//! Random network distillation.
mod base;
mod config;
pub use base::RndModel;
pub use config::RndConfig;
