//! Evaluate [`Agent`].
use crate::{base::Env, record::Record, Agent};
use anyhow::Result;
mod default_evaluator;
pub use default_evaluator::DefaultEvaluator;

/// Evaluate [`Agent`].
pub trait Evaluator<E: Env> {
    /// Evaluate [`Agent`].
    ///
    /// The caller of this method needs to handle the mode of `agent`, see
    /// [`Policy::set_train`](crate::Policy::set_train).
    fn evaluate<A: Agent<E>>(&mut self, agent: &mut A) -> Result<Record>;
}
