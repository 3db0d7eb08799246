#![warn(missing_docs)]
//! Core of the critique reinforcement learning agents.
//!
//! This crate holds everything that does not depend on a neural network backend:
//!
//! * return and advantage estimation ([`estimator`]),
//! * replay buffers for whole trajectories and for raw frames ([`replay_buffer`]),
//! * target computations shared by the critics and actors ([`target`]),
//! * the agent orchestrators [`Pg`](agent::Pg), [`Sac`](agent::Sac) and
//!   [`Awac`](agent::Awac), generic over the network traits in [`base`],
//! * records, recorders, the [`Trainer`] loop and the [`DefaultEvaluator`].
//!
//! Networks are supplied by a backend crate that implements the traits in [`base`].
pub mod agent;
pub mod base;
pub mod dummy;
pub mod error;
pub mod estimator;
mod evaluator;
pub mod record;
pub mod replay_buffer;
pub mod rollout;
pub mod schedule;
pub mod stats;
pub mod target;
mod trainer;

pub use base::{
    Act, ActionSpace, ActionValueFunction, Agent, AwacPolicy, Env, NoveltyModel, Obs, Persistent,
    PgPolicy, Policy, RolloutBatch, SacPolicy, Step, Trajectory, Transition, TransitionBatch,
};
pub use error::CritiqueError;
pub use evaluator::{DefaultEvaluator, Evaluator};
pub use trainer::{Trainer, TrainerConfig};
