//! Agent orchestrators.
//!
//! Each agent composes the estimators, buffers and target computations of this
//! crate with networks supplied through the collaborator traits in
//! [`crate::base`]:
//!
//! * [`Pg`]: policy gradient on recent whole trajectories, with an optional
//!   value baseline and generalized advantage estimation.
//! * [`Sac`]: soft actor-critic with two Q-functions and a learned temperature.
//! * [`Awac`]: advantage-weighted actor-critic exploring with a novelty bonus,
//!   with separate exploration and exploitation critics.
mod awac;
mod pg;
mod sac;
pub use awac::{Awac, AwacConfig};
pub use pg::{Pg, PgConfig};
pub use sac::{Sac, SacConfig};
