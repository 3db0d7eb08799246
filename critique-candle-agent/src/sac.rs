//! Actor of SAC with a learned temperature.
mod actor;
mod config;
mod temperature;
pub use actor::SacActor;
pub use config::SacActorConfig;
pub use temperature::{Temperature, TemperatureMode};
