mod mock;
use anyhow::Result;
use critique_core::{
    agent::{Awac, AwacConfig, Pg, PgConfig, Sac, SacConfig},
    dummy::{DummyEnv, DummyEnvConfig},
    record::Record,
    replay_buffer::FrameBufferConfig,
    rollout::RolloutConfig,
    schedule::Schedule,
    target::{AwacWeighting, SyncMode, TargetSync},
    Act, ActionSpace, Agent, CritiqueError, Env, Trajectory, Transition, TransitionBatch,
};
use mock::{
    scalar, MockAwacActor, MockCountingActor, MockCritic, MockNovelty, MockPgPolicy,
    MockSacActor,
};
use tempdir::TempDir;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn env(episode_len: usize) -> Result<DummyEnv> {
    DummyEnv::build(&DummyEnvConfig::default().episode_len(episode_len), 0)
}

/// Samples a batch and trains on it if one is available.
fn train_step<A: Agent<DummyEnv>>(agent: &mut A, batch_size: usize) -> Result<Option<Record>> {
    match agent.sample(batch_size)? {
        Some(batch) => Ok(Some(agent.train(batch)?)),
        None => Ok(None),
    }
}

fn path(rewards: &[f32]) -> Trajectory {
    rewards
        .iter()
        .enumerate()
        .map(|(t, r)| Transition {
            obs: vec![t as f32, 0.0],
            act: Act::Discrete(t % 2),
            reward: *r,
            next_obs: vec![t as f32 + 1.0, 0.0],
            terminal: t + 1 == rewards.len(),
        })
        .collect()
}

#[test]
fn test_pg_reward_to_go_without_baseline() -> Result<()> {
    init();
    let policy = MockPgPolicy::default();
    let updates = policy.updates.clone();
    let config = PgConfig::default().standardize_advantages(false);
    let mut agent = Pg::new(config, policy);
    let mut env = env(3)?;

    let rollout = RolloutConfig {
        min_timesteps: 6,
        max_path_length: 10,
    };
    let info = agent.collect(&mut env, &rollout)?;
    assert_eq!(info.env_steps, 6);
    assert_eq!(info.episode_returns, vec![2.0, 2.0]);

    // action 0 is rewarded at t = 0 and t = 2
    let record = train_step(&mut agent, 4)?.expect("batch");
    assert_eq!(scalar(&record, "n_trajectories"), 2.0);
    let updates = updates.borrow();
    let (adv, q) = &updates[0];
    assert_eq!(q, &vec![2.0, 1.0, 1.0, 2.0, 1.0, 1.0]);
    assert_eq!(adv, q);
    Ok(())
}

#[test]
fn test_pg_gae_requires_baseline() -> Result<()> {
    let config = PgConfig::default().gae_lambda(Some(0.95));
    let mut agent = Pg::new(config, MockPgPolicy::default());
    assert!(train_step(&mut agent, 1)?.is_none());
    Agent::<DummyEnv>::add_to_replay_buffer(&mut agent, vec![path(&[1.0, 0.0, 1.0])])?;

    let err = train_step(&mut agent, 1).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CritiqueError>(),
        Some(CritiqueError::NotImplemented(_))
    ));

    let policy = MockPgPolicy {
        with_baseline: true,
        ..Default::default()
    };
    let updates = policy.updates.clone();
    let mut agent = Pg::new(PgConfig::default().gae_lambda(Some(0.95)), policy);
    Agent::<DummyEnv>::add_to_replay_buffer(&mut agent, vec![path(&[1.0, 0.0, 1.0])])?;
    train_step(&mut agent, 3)?;
    let (adv, _) = &updates.borrow()[0];
    assert_eq!(adv.len(), 3);
    assert!(adv.iter().sum::<f32>().abs() < 1e-5);
    Ok(())
}

#[test]
fn test_sac_entropy_regularized_critic_update() -> Result<()> {
    init();
    let actor = MockSacActor::default();
    let n_actor_updates = actor.n_updates.clone();
    let critics = [MockCritic::new([0.0, 0.0], 1.0), MockCritic::new([0.0, 0.0], 2.0)];
    let targets = critics[0].targets.clone();
    let syncs = critics[1].syncs.clone();
    assert!(syncs.borrow().is_empty());

    let config = SacConfig::default()
        .gamma(0.9)
        .actor_update_frequency(2)
        .critic_target_sync(TargetSync::soft(1, 0.01));
    let mut agent = Sac::new(config, actor, critics)?;
    assert_eq!(*syncs.borrow(), vec![SyncMode::Hard]);

    Agent::<DummyEnv>::add_to_replay_buffer(&mut agent, vec![path(&[1.0; 4])])?;
    assert!(train_step(&mut agent, 5)?.is_none());

    let record = train_step(&mut agent, 4)?.expect("batch");
    assert_eq!(scalar(&record, "critic_loss"), 1.0);
    assert_eq!(scalar(&record, "actor_loss"), 1.0);
    assert_eq!(scalar(&record, "alpha_loss"), 2.0);
    assert_eq!(scalar(&record, "temperature"), 0.5);

    // 1 + 0.9 * (min(1, 2) - 0.5 * (-1)) unless terminal
    let target = targets.borrow()[0].clone();
    assert_eq!(target.iter().filter(|t| **t == 1.0).count(), 1);
    assert!(target
        .iter()
        .all(|t| *t == 1.0 || (*t - 2.35).abs() < 1e-6));

    let record = train_step(&mut agent, 4)?.expect("batch");
    assert!(record.get("actor_loss").is_none());
    assert_eq!(*n_actor_updates.borrow(), 1);
    assert_eq!(agent.n_train_steps(), 2);
    assert_eq!(
        *syncs.borrow(),
        vec![
            SyncMode::Hard,
            SyncMode::Soft { tau: 0.01 },
            SyncMode::Soft { tau: 0.01 }
        ]
    );
    Ok(())
}

#[test]
fn test_sac_critic_loss_is_averaged_over_updates() -> Result<()> {
    let mut critics = [MockCritic::new([0.0, 0.0], 1.0), MockCritic::new([0.0, 0.0], 1.0)];
    critics.iter_mut().for_each(|c| c.fit_loss_step = 1.0);
    let config = SacConfig::default().num_critic_updates_per_agent_update(3);
    let mut agent = Sac::new(config, MockSacActor::default(), critics)?;
    Agent::<DummyEnv>::add_to_replay_buffer(&mut agent, vec![path(&[1.0; 4])])?;

    // summed losses of the two critics are 1, 3 and 5
    let record = train_step(&mut agent, 2)?.expect("batch");
    assert!((scalar(&record, "critic_loss") - 3.0).abs() < 1e-6);
    assert_eq!(agent.critics()[0].targets.borrow().len(), 3);
    Ok(())
}

#[test]
fn test_sac_save_and_load_params() -> Result<()> {
    let critics = [MockCritic::new([0.0, 0.0], 1.0), MockCritic::new([0.0, 0.0], 1.0)];
    let mut agent = Sac::new(SacConfig::default(), MockSacActor::default(), critics)?;
    let dir = TempDir::new("sac_params")?;
    let path = dir.path().join("best");

    assert!(Agent::<DummyEnv>::load_params(&mut agent, &path).is_err());
    Agent::<DummyEnv>::save_params(&agent, &path)?;
    for file in ["actor", "critic_0", "critic_1"] {
        assert!(path.join(format!("{}.safetensors", file)).is_file());
    }
    Agent::<DummyEnv>::load_params(&mut agent, &path)?;
    Ok(())
}

type MockAwac = Awac<MockAwacActor, MockCritic, MockNovelty>;

fn awac(config: AwacConfig) -> Result<(MockAwac, MockCritic)> {
    let exploitation = MockCritic::new([1.0, 3.0], 2.0);
    let probe = MockCritic {
        targets: exploitation.targets.clone(),
        syncs: exploitation.syncs.clone(),
        ..MockCritic::new([1.0, 3.0], 2.0)
    };
    let agent = Awac::new(
        config,
        ActionSpace::Discrete(2),
        MockAwacActor::default(),
        MockCritic::new([1.0, 3.0], 0.0),
        exploitation,
        MockNovelty::default(),
    )?;
    Ok((agent, probe))
}

#[test]
fn test_awac_collect_and_train() -> Result<()> {
    init();
    let config = AwacConfig::default()
        .eps(0.0)
        .learning_starts(3)
        .learning_freq(1)
        .target_sync(TargetSync::hard(2))
        .replay_buffer(FrameBufferConfig::default().capacity(100));
    let (mut agent, exploitation) = awac(config)?;
    let mut env = env(5)?;
    let rollout = RolloutConfig::default();

    for _ in 0..3 {
        agent.collect(&mut env, &rollout)?;
        assert!(train_step(&mut agent, 2)?.is_none());
    }

    let mut returns = vec![];
    let mut records = vec![];
    for _ in 0..7 {
        let info = agent.collect(&mut env, &rollout)?;
        assert_eq!(info.env_steps, 1);
        returns.extend(info.episode_returns);
        records.extend(train_step(&mut agent, 2)?);
    }
    assert_eq!(agent.t(), 10);
    assert_eq!(agent.buffer_len(), 10);
    assert_eq!(returns.len(), 2);
    assert_eq!(records.len(), 7);
    assert_eq!(agent.num_param_updates(), 7);

    let record = &records[0];
    assert_eq!(scalar(record, "exploration_critic_loss"), 0.5);
    assert_eq!(scalar(record, "exploitation_critic_loss"), 0.5);
    assert_eq!(scalar(record, "exploration_model_loss"), 0.1);
    assert_eq!(scalar(record, "actor_loss"), 0.25);

    // exploitation target is r + 0.99 * 2 unless terminal
    for target in exploitation.targets.borrow().iter() {
        assert!(target.iter().all(|t| [0.0, 1.0].iter().any(|r| (t - r).abs() < 1e-6
            || (t - r - 1.98).abs() < 1e-6)));
    }
    // hard copy at construction and at updates 0, 2, 4 and 6
    assert_eq!(exploitation.syncs.borrow().len(), 5);
    Ok(())
}

#[test]
fn test_awac_advantage_weights() -> Result<()> {
    let (mut agent, _) = awac(AwacConfig::default())?;

    // V(s) = 0.5 * 1 + 0.5 * 3 = 2
    let obs = vec![vec![0.0, 0.0]; 2];
    let adv = agent.estimate_advantage(&obs, &[Act::Discrete(0), Act::Discrete(1)])?;
    assert_eq!(adv, vec![-1.0, 1.0]);
    Ok(())
}

#[test]
fn test_awac_offline_exploitation_stops_storing() -> Result<()> {
    let config = AwacConfig::default()
        .offline_exploitation(true)
        .num_exploration_steps(2)
        .learning_starts(0)
        .replay_buffer(FrameBufferConfig::default().capacity(100));
    let (mut agent, _) = awac(config)?;
    let mut env = env(5)?;

    for _ in 0..6 {
        agent.collect(&mut env, &RolloutConfig::default())?;
    }
    assert_eq!(agent.t(), 6);
    assert_eq!(agent.buffer_len(), 3);
    Ok(())
}

#[test]
fn test_awac_mixed_reward_targets_and_actor_weights() -> Result<()> {
    let exploration = MockCritic::new([1.0, 3.0], 2.0);
    let exploitation = MockCritic::new([1.0, 3.0], 2.0);
    let exploration_targets = exploration.targets.clone();
    let exploitation_targets = exploitation.targets.clone();
    let actor = MockAwacActor::default();
    let updates = actor.updates.clone();
    let config = AwacConfig::default()
        .gamma(0.9)
        .awac_lambda(2.0)
        .weighting(AwacWeighting::Exp { max_weight: 1.5 })
        .explore_weight(Schedule::Constant(1.0))
        .exploit_weight(Schedule::Constant(0.5))
        .exploit_rew_shift(1.0)
        .exploit_rew_scale(2.0)
        .normalize_bonus(true)
        .bonus_std_decay(0.5);
    let mut agent = Awac::new(
        config,
        ActionSpace::Discrete(2),
        actor,
        exploration,
        exploitation,
        MockNovelty::default(),
    )?;

    let batch = vec![
        Transition {
            obs: vec![0.0, 0.0],
            act: Act::Discrete(0),
            reward: 1.0,
            next_obs: vec![1.0, 0.0],
            terminal: false,
        },
        Transition {
            obs: vec![0.0, 0.0],
            act: Act::Discrete(1),
            reward: 0.0,
            next_obs: vec![3.0, 0.0],
            terminal: true,
        },
    ]
    .into_iter()
    .collect::<TransitionBatch>();
    Agent::<DummyEnv>::train(&mut agent, batch)?;

    // bonus [1, 3] normalizes to [-1, 1], mixed with the reward to [-0.5, 1]
    let close = |xs: &[f32], ys: &[f32]| {
        xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| (x - y).abs() < 1e-5)
    };
    assert!(close(&exploration_targets.borrow()[0], &[1.3, 1.0]));
    // (r + 1) * 2 plus 0.9 * 2 unless terminal
    assert!(close(&exploitation_targets.borrow()[0], &[5.8, 2.0]));

    // advantages [-1, 1] against V = 2
    let updates = updates.borrow();
    let (act, weights) = &updates[0];
    assert_eq!(act, &vec![Act::Discrete(0), Act::Discrete(1)]);
    assert!(close(weights, &[(-0.5f32).exp(), 1.5]));
    Ok(())
}

#[test]
fn test_awac_continuous_advantage_samples_actions() -> Result<()> {
    let config = AwacConfig::default().n_value_samples(4);
    let mut agent = Awac::new(
        config,
        ActionSpace::continuous(1, -1.0, 1.0),
        MockCountingActor::default(),
        MockCritic::new([1.0, 0.0], 0.0),
        MockCritic::new([1.0, 0.0], 0.0),
        MockNovelty::default(),
    )?;

    // Q(s, a) = 1 + a, V(s) = mean(1, 2, 3, 4)
    let obs = vec![vec![0.0, 0.0]; 2];
    let act = vec![Act::Continuous(vec![3.0]); 2];
    let adv = agent.estimate_advantage(&obs, &act)?;
    assert_eq!(adv, vec![1.5, 1.5]);
    assert_eq!(agent.actor().n_calls, 4);
    Ok(())
}
