//! Core traits and data types.
//!
//! Environments implement [`Env`]. Networks are supplied through the collaborator
//! traits [`PgPolicy`], [`SacPolicy`], [`AwacPolicy`], [`ActionValueFunction`] and
//! [`NoveltyModel`]; the agent orchestrators in [`crate::agent`] are generic over
//! them and implement [`Agent`].
mod act;
mod agent;
mod batch;
mod env;
mod model;
mod policy;
pub use act::{Act, ActionSpace, Obs};
pub use agent::Agent;
pub use batch::{RolloutBatch, Trajectory, Transition, TransitionBatch};
pub use env::{Env, Step};
pub use model::{ActionValueFunction, NoveltyModel, Persistent};
pub use policy::{AwacPolicy, PgPolicy, Policy, SacPolicy};
