//! Return and advantage estimation.
//!
//! [`ReturnEstimator`] turns the rewards of each trajectory into one Q-value
//! estimate per transition. [`AdvantageEstimator`] turns Q-values, optionally with
//! a learned value baseline, into advantages, either directly or with generalized
//! advantage estimation.
mod advantage;
mod returns;
pub use advantage::{gae, AdvantageConfig, AdvantageEstimator};
pub use returns::{discounted_cumsum, discounted_return, ReturnEstimator};
