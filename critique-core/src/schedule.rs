//! Values that change with the number of steps.
use serde::{Deserialize, Serialize};

/// A value as a function of the step.
///
/// ```rust
/// use critique_core::schedule::Schedule;
///
/// let s = Schedule::Piecewise {
///     endpoints: vec![(0, 1.0), (100, 0.0)],
///     outside_value: 0.0,
/// };
/// assert_eq!(s.value(50), 0.5);
/// assert_eq!(s.value(1000), 0.0);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum Schedule {
    /// Always the same value.
    Constant(f32),

    /// Linear interpolation from `initial` to `last` over `steps` steps, then `last`.
    Linear {
        /// Number of steps of the interpolation.
        steps: usize,
        /// Value at step 0.
        initial: f32,
        /// Value from `steps` on.
        last: f32,
    },

    /// Linear interpolation between `(step, value)` endpoints sorted by step.
    ///
    /// Steps outside the endpoints take `outside_value`.
    Piecewise {
        /// Endpoints sorted by step.
        endpoints: Vec<(usize, f32)>,
        /// Value outside of the endpoints.
        outside_value: f32,
    },
}

impl Default for Schedule {
    fn default() -> Self {
        Self::Constant(1.0)
    }
}

impl Schedule {
    /// Value at the given step.
    pub fn value(&self, step: usize) -> f32 {
        match self {
            Self::Constant(v) => *v,
            Self::Linear {
                steps,
                initial,
                last,
            } => {
                let frac = if *steps == 0 {
                    1.0
                } else {
                    (step as f32 / *steps as f32).min(1.0)
                };
                initial + frac * (last - initial)
            }
            Self::Piecewise {
                endpoints,
                outside_value,
            } => endpoints
                .windows(2)
                .find(|w| w[0].0 <= step && step < w[1].0)
                .map(|w| {
                    let ((l, lv), (r, rv)) = (w[0], w[1]);
                    let alpha = (step - l) as f32 / (r - l) as f32;
                    lv + alpha * (rv - lv)
                })
                .unwrap_or(*outside_value),
        }
    }
}
