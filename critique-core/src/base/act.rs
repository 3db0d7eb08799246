//! Observations, actions and action spaces.
use crate::error::CritiqueError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Observation, a flat vector of features.
pub type Obs = Vec<f32>;

/// Action taken in an environment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum Act {
    /// Index of a discrete action.
    Discrete(usize),

    /// Continuous action vector.
    Continuous(Vec<f32>),
}

impl Act {
    /// Index of a discrete action.
    pub fn discrete(&self) -> Result<usize, CritiqueError> {
        match self {
            Self::Discrete(a) => Ok(*a),
            Self::Continuous(_) => Err(CritiqueError::InvalidConfig(
                "expected a discrete action".into(),
            )),
        }
    }

    /// Vector of a continuous action.
    pub fn continuous(&self) -> Result<&[f32], CritiqueError> {
        match self {
            Self::Continuous(a) => Ok(a),
            Self::Discrete(_) => Err(CritiqueError::InvalidConfig(
                "expected a continuous action".into(),
            )),
        }
    }
}

/// Set of valid actions of an environment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum ActionSpace {
    /// `n` discrete actions `0..n`.
    Discrete(usize),

    /// Box of continuous actions.
    Continuous {
        /// Lower bound of each dimension.
        low: Vec<f32>,
        /// Upper bound of each dimension.
        high: Vec<f32>,
    },
}

impl ActionSpace {
    /// A box `[low, high]^dim`.
    pub fn continuous(dim: usize, low: f32, high: f32) -> Self {
        Self::Continuous {
            low: vec![low; dim],
            high: vec![high; dim],
        }
    }

    /// Returns `true` for a discrete space.
    pub fn is_discrete(&self) -> bool {
        matches!(self, Self::Discrete(_))
    }

    /// Number of actions of a discrete space, dimension of a continuous one.
    pub fn dim(&self) -> usize {
        match self {
            Self::Discrete(n) => *n,
            Self::Continuous { low, .. } => low.len(),
        }
    }

    /// Samples an action uniformly.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Act {
        match self {
            Self::Discrete(n) => Act::Discrete(rng.gen_range(0..*n)),
            Self::Continuous { low, high } => Act::Continuous(
                low.iter()
                    .zip(high.iter())
                    .map(|(l, h)| l + (h - l) * rng.gen::<f32>())
                    .collect(),
            ),
        }
    }

    /// Returns `true` if the action belongs to the space.
    pub fn contains(&self, act: &Act) -> bool {
        match (self, act) {
            (Self::Discrete(n), Act::Discrete(a)) => a < n,
            (Self::Continuous { low, high }, Act::Continuous(a)) => {
                a.len() == low.len()
                    && a.iter()
                        .zip(low.iter().zip(high.iter()))
                        .all(|(v, (l, h))| l <= v && v <= h)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_sample_in_space() {
        let mut rng = StdRng::seed_from_u64(42);
        let spaces = [ActionSpace::Discrete(3), ActionSpace::continuous(2, -1.0, 1.0)];
        for space in spaces.iter() {
            for _ in 0..100 {
                assert!(space.contains(&space.sample(&mut rng)));
            }
        }
        assert!(!spaces[0].contains(&Act::Discrete(3)));
        assert!(!spaces[1].contains(&Act::Continuous(vec![0.0])));
    }
}
