//! Collaborators with fixed outputs that log what the agents feed them.
#![allow(dead_code)]
use anyhow::Result;
use critique_core::{
    target::SyncMode, Act, ActionValueFunction, AwacPolicy, NoveltyModel, Obs, Persistent,
    PgPolicy, Policy, SacPolicy,
};
use critique_core::record::{Record, RecordValue};
use std::{cell::RefCell, fs, path::Path, rc::Rc};

pub type Log<T> = Rc<RefCell<Vec<T>>>;

fn save_marker(path: &Path) -> Result<()> {
    fs::write(path, b"mock")?;
    Ok(())
}

fn load_marker(path: &Path) -> Result<()> {
    fs::read(path)?;
    Ok(())
}

/// Always takes action 0.
#[derive(Default)]
pub struct MockPgPolicy {
    pub with_baseline: bool,
    /// `(advantages, q_values)` of each update.
    pub updates: Log<(Vec<f32>, Vec<f32>)>,
}

impl Policy for MockPgPolicy {
    fn sample_action(&mut self, _obs: &Obs) -> Result<Act> {
        Ok(Act::Discrete(0))
    }
}

impl Persistent for MockPgPolicy {
    fn save(&self, path: &Path) -> Result<()> {
        save_marker(path)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        load_marker(path)
    }
}

impl PgPolicy for MockPgPolicy {
    fn update(
        &mut self,
        _obs: &[Obs],
        _act: &[Act],
        advantages: &[f32],
        q_values: &[f32],
    ) -> Result<Record> {
        self.updates
            .borrow_mut()
            .push((advantages.to_vec(), q_values.to_vec()));
        Ok(Record::from_scalar("actor_loss", 1.0))
    }

    fn baseline(&self, obs: &[Obs]) -> Result<Option<Vec<f32>>> {
        Ok(if self.with_baseline {
            Some(vec![0.0; obs.len()])
        } else {
            None
        })
    }
}

/// Critic over two discrete actions with `Q(s, a) = q[a]`, and
/// `Q(s, a) = q[0] + a[0]` for a continuous action.
pub struct MockCritic {
    pub q: [f32; 2],
    pub target_q: f32,
    /// Growth of the fitting loss with each call.
    pub fit_loss_step: f32,
    pub targets: Log<Vec<f32>>,
    pub syncs: Log<SyncMode>,
}

impl MockCritic {
    pub fn new(q: [f32; 2], target_q: f32) -> Self {
        Self {
            q,
            target_q,
            fit_loss_step: 0.0,
            targets: Rc::default(),
            syncs: Rc::default(),
        }
    }
}

impl Persistent for MockCritic {
    fn save(&self, path: &Path) -> Result<()> {
        save_marker(path)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        load_marker(path)
    }
}

impl ActionValueFunction for MockCritic {
    fn q_values(&self, _obs: &[Obs], act: &[Act]) -> Result<Vec<f32>> {
        act.iter()
            .map(|a| match a {
                Act::Discrete(i) => Ok(self.q[*i]),
                Act::Continuous(a) => Ok(self.q[0] + a[0]),
            })
            .collect()
    }

    fn target_q_values(&self, obs: &[Obs], _act: &[Act]) -> Result<Vec<f32>> {
        Ok(vec![self.target_q; obs.len()])
    }

    fn all_q_values(&self, obs: &[Obs], _target: bool) -> Result<Vec<Vec<f32>>> {
        Ok(vec![self.q.to_vec(); obs.len()])
    }

    fn fit(&mut self, _obs: &[Obs], _act: &[Act], target: &[f32]) -> Result<f32> {
        let n_fits = self.targets.borrow().len();
        self.targets.borrow_mut().push(target.to_vec());
        Ok(0.5 + self.fit_loss_step * n_fits as f32)
    }

    fn sync_target(&mut self, mode: &SyncMode) -> Result<()> {
        self.syncs.borrow_mut().push(mode.clone());
        Ok(())
    }
}

/// Actor with log-probability `-1` for every action and temperature `0.5`.
#[derive(Default)]
pub struct MockSacActor {
    pub n_updates: Rc<RefCell<usize>>,
}

impl Policy for MockSacActor {
    fn sample_action(&mut self, _obs: &Obs) -> Result<Act> {
        Ok(Act::Discrete(1))
    }
}

impl Persistent for MockSacActor {
    fn save(&self, path: &Path) -> Result<()> {
        save_marker(path)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        load_marker(path)
    }
}

impl SacPolicy for MockSacActor {
    type Critic = MockCritic;

    fn sample_with_log_prob(&mut self, obs: &[Obs]) -> Result<(Vec<Act>, Vec<f32>)> {
        Ok((vec![Act::Discrete(1); obs.len()], vec![-1.0; obs.len()]))
    }

    fn alpha(&self) -> Result<f32> {
        Ok(0.5)
    }

    fn update(&mut self, _obs: &[Obs], critics: &[MockCritic]) -> Result<(f32, f32)> {
        assert_eq!(critics.len(), 2);
        *self.n_updates.borrow_mut() += 1;
        Ok((1.0, 2.0))
    }
}

/// Actor with uniform probabilities over two actions.
#[derive(Default)]
pub struct MockAwacActor {
    /// `(actions, weights)` of each update.
    pub updates: Log<(Vec<Act>, Vec<f32>)>,
}

impl Policy for MockAwacActor {
    fn sample_action(&mut self, _obs: &Obs) -> Result<Act> {
        Ok(Act::Discrete(1))
    }
}

impl Persistent for MockAwacActor {
    fn save(&self, path: &Path) -> Result<()> {
        save_marker(path)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        load_marker(path)
    }
}

impl AwacPolicy for MockAwacActor {
    fn action_probs(&self, obs: &[Obs]) -> Result<Vec<Vec<f32>>> {
        Ok(vec![vec![0.5, 0.5]; obs.len()])
    }

    fn sample_actions(&mut self, obs: &[Obs]) -> Result<Vec<Act>> {
        Ok(vec![Act::Discrete(1); obs.len()])
    }

    fn update(&mut self, _obs: &[Obs], act: &[Act], weights: &[f32]) -> Result<f32> {
        self.updates
            .borrow_mut()
            .push((act.to_vec(), weights.to_vec()));
        Ok(0.25)
    }
}

/// Continuous actor whose `k`-th call of `sample_actions` returns `[k]` for
/// every observation.
#[derive(Default)]
pub struct MockCountingActor {
    pub n_calls: usize,
}

impl Policy for MockCountingActor {
    fn sample_action(&mut self, _obs: &Obs) -> Result<Act> {
        Ok(Act::Continuous(vec![0.0]))
    }
}

impl Persistent for MockCountingActor {
    fn save(&self, path: &Path) -> Result<()> {
        save_marker(path)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        load_marker(path)
    }
}

impl AwacPolicy for MockCountingActor {
    fn sample_actions(&mut self, obs: &[Obs]) -> Result<Vec<Act>> {
        let k = self.n_calls as f32;
        self.n_calls += 1;
        Ok(vec![Act::Continuous(vec![k]); obs.len()])
    }

    fn update(&mut self, _obs: &[Obs], _act: &[Act], _weights: &[f32]) -> Result<f32> {
        Ok(0.0)
    }
}

/// Novelty equal to the first feature of the observation.
#[derive(Default)]
pub struct MockNovelty {
    pub n_updates: Rc<RefCell<usize>>,
}

impl Persistent for MockNovelty {
    fn save(&self, path: &Path) -> Result<()> {
        save_marker(path)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        load_marker(path)
    }
}

impl NoveltyModel for MockNovelty {
    fn bonus(&self, obs: &[Obs]) -> Result<Vec<f32>> {
        Ok(obs.iter().map(|o| o[0]).collect())
    }

    fn update(&mut self, _obs: &[Obs]) -> Result<f32> {
        *self.n_updates.borrow_mut() += 1;
        Ok(0.1)
    }
}

pub fn scalar(record: &Record, k: &str) -> f32 {
    match record.get(k) {
        Some(RecordValue::Scalar(v)) => *v,
        _ => panic!("no scalar {}", k),
    }
}
