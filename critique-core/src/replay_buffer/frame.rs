//! Memory-optimized replay buffer of frames.
use super::FrameBufferConfig;
use crate::{
    base::{Act, Obs, TransitionBatch},
    error::{check_len, CritiqueError},
};
use rand::{rngs::StdRng, SeedableRng};

/// Circular buffer storing every frame once.
///
/// Interaction goes in two calls per environment step:
///
/// 1. [`FrameBuffer::store_frame`] with the latest frame, which returns its index,
/// 2. [`FrameBuffer::store_effect`] with the action taken on it, the reward and
///    the done flag.
///
/// In between, [`FrameBuffer::encode_recent_observation`] gives the stacked
/// observation the action should be chosen on. An observation stacks the last
/// `frame_history_len` frames; frames of a previous episode or older than the
/// oldest stored frame are replaced by zeros.
pub struct FrameBuffer<T> {
    capacity: usize,
    frame_history_len: usize,
    next_idx: usize,
    num_in_buffer: usize,
    frame_len: Option<usize>,
    frames: Vec<Vec<T>>,
    act: Vec<Option<Act>>,
    reward: Vec<f32>,
    done: Vec<bool>,
    rng: StdRng,
}

impl<T> FrameBuffer<T>
where
    T: Copy + Default + Into<f32>,
{
    /// Builds an empty buffer.
    pub fn build(config: &FrameBufferConfig) -> Result<Self, CritiqueError> {
        if config.capacity < 2 || config.frame_history_len == 0 {
            return Err(CritiqueError::InvalidConfig(format!(
                "capacity must be at least 2 and frame_history_len positive, got {} and {}",
                config.capacity, config.frame_history_len
            )));
        }
        Ok(Self {
            capacity: config.capacity,
            frame_history_len: config.frame_history_len,
            next_idx: 0,
            num_in_buffer: 0,
            frame_len: None,
            frames: Vec::with_capacity(config.capacity),
            act: Vec::with_capacity(config.capacity),
            reward: Vec::with_capacity(config.capacity),
            done: Vec::with_capacity(config.capacity),
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Number of stored frames.
    pub fn len(&self) -> usize {
        self.num_in_buffer
    }

    /// Returns `true` if no frame is stored.
    pub fn is_empty(&self) -> bool {
        self.num_in_buffer == 0
    }

    /// Returns `true` if `batch_size` distinct transitions can be sampled.
    pub fn can_sample(&self, batch_size: usize) -> bool {
        batch_size < self.num_in_buffer
    }

    fn oldest(&self) -> usize {
        if self.num_in_buffer == self.capacity {
            self.next_idx
        } else {
            0
        }
    }

    /// Stores a frame, overwriting the oldest one when full, and returns its index.
    ///
    /// The action, reward and done flag of the overwritten slot are cleared.
    pub fn store_frame(&mut self, frame: Vec<T>) -> Result<usize, CritiqueError> {
        match self.frame_len {
            Some(n) => check_len("frame", n, frame.len())?,
            None => self.frame_len = Some(frame.len()),
        }

        let idx = self.next_idx;
        if idx < self.frames.len() {
            self.frames[idx] = frame;
            self.act[idx] = None;
            self.reward[idx] = 0.0;
            self.done[idx] = false;
        } else {
            self.frames.push(frame);
            self.act.push(None);
            self.reward.push(0.0);
            self.done.push(false);
        }
        self.next_idx = (self.next_idx + 1) % self.capacity;
        self.num_in_buffer = (self.num_in_buffer + 1).min(self.capacity);

        Ok(idx)
    }

    /// Stores the action taken on the frame at `idx`, the reward and the done flag.
    pub fn store_effect(
        &mut self,
        idx: usize,
        act: Act,
        reward: f32,
        done: bool,
    ) -> Result<(), CritiqueError> {
        if idx >= self.frames.len() {
            return Err(CritiqueError::InsufficientSamples {
                requested: idx + 1,
                available: self.frames.len(),
            });
        }
        self.act[idx] = Some(act);
        self.reward[idx] = reward;
        self.done[idx] = done;
        Ok(())
    }

    /// Stacked observation ending at the most recently stored frame.
    pub fn encode_recent_observation(&self) -> Result<Vec<T>, CritiqueError> {
        if self.is_empty() {
            return Err(CritiqueError::InsufficientSamples {
                requested: 1,
                available: 0,
            });
        }
        Ok(self.encode_observation((self.next_idx + self.capacity - 1) % self.capacity))
    }

    fn encode_observation(&self, idx: usize) -> Vec<T> {
        let frame_len = self.frame_len.unwrap_or(0);
        let oldest = self.oldest();
        let end = (idx + self.capacity - oldest) % self.capacity;
        let slot = |o: usize| (oldest + o) % self.capacity;

        // First frame of the stack, not crossing an episode boundary
        let start = (end.saturating_sub(self.frame_history_len - 1)..end)
            .filter(|o| self.done[slot(*o)])
            .last()
            .map_or(end.saturating_sub(self.frame_history_len - 1), |o| o + 1);

        let missing = self.frame_history_len - (end + 1 - start);
        let mut obs = vec![T::default(); missing * frame_len];
        (start..=end).for_each(|o| obs.extend_from_slice(&self.frames[slot(o)]));
        obs
    }

    /// Samples `batch_size` distinct transitions uniformly at random.
    ///
    /// Only transitions whose next frame is stored are candidates, so a sample
    /// never spans the write position of the circular buffer.
    pub fn sample(&mut self, batch_size: usize) -> Result<TransitionBatch, CritiqueError> {
        if !self.can_sample(batch_size) {
            return Err(CritiqueError::InsufficientSamples {
                requested: batch_size,
                available: self.num_in_buffer.saturating_sub(1),
            });
        }

        let oldest = self.oldest();
        let offsets = rand::seq::index::sample(&mut self.rng, self.num_in_buffer - 1, batch_size);
        let mut batch = TransitionBatch::default();

        for o in offsets.iter() {
            let idx = (oldest + o) % self.capacity;
            let act = self.act[idx]
                .clone()
                .ok_or(CritiqueError::MissingEffect(idx))?;
            batch.obs.push(to_obs(&self.encode_observation(idx)));
            batch.act.push(act);
            batch.reward.push(self.reward[idx]);
            batch
                .next_obs
                .push(to_obs(&self.encode_observation((idx + 1) % self.capacity)));
            batch.terminal.push(self.done[idx]);
        }

        Ok(batch)
    }
}

/// Converts a stacked frame to an observation vector.
pub fn to_obs<T: Copy + Into<f32>>(frames: &[T]) -> Obs {
    frames.iter().map(|v| (*v).into()).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn buffer(capacity: usize, frame_history_len: usize) -> FrameBuffer<u8> {
        let config = FrameBufferConfig::default()
            .capacity(capacity)
            .frame_history_len(frame_history_len);
        FrameBuffer::build(&config).unwrap()
    }

    fn step(buffer: &mut FrameBuffer<u8>, frame: u8, done: bool) -> usize {
        let idx = buffer.store_frame(vec![frame]).unwrap();
        buffer
            .store_effect(idx, Act::Discrete(frame as usize), frame as f32, done)
            .unwrap();
        idx
    }

    #[test]
    fn test_stacking_zero_pads_episode_start() -> Result<(), CritiqueError> {
        let mut b = buffer(10, 3);
        step(&mut b, 1, false);
        assert_eq!(b.encode_recent_observation()?, vec![0, 0, 1]);
        step(&mut b, 2, true);
        assert_eq!(b.encode_recent_observation()?, vec![0, 1, 2]);
        b.store_frame(vec![3])?;
        assert_eq!(b.encode_recent_observation()?, vec![0, 0, 3]);
        Ok(())
    }

    #[test]
    fn test_wraparound_keeps_alignment() -> Result<(), CritiqueError> {
        let mut b = buffer(4, 2);
        for f in 1..=6 {
            step(&mut b, f, false);
        }
        assert_eq!(b.len(), 4);
        // frames 3, 4, 5, 6 are stored; 3 is the oldest and has no predecessor
        assert_eq!(b.encode_recent_observation()?, vec![5, 6]);
        assert_eq!(b.encode_observation(2), vec![0, 3]);

        for _ in 0..20 {
            let batch = b.sample(3)?;
            for i in 0..batch.len() {
                let frame = batch.obs[i][1];
                assert!((3.0..=5.0).contains(&frame));
                assert_eq!(batch.act[i], Act::Discrete(frame as usize));
                assert_eq!(batch.reward[i], frame);
                assert_eq!(batch.next_obs[i][1], frame + 1.0);
            }
        }
        Ok(())
    }

    #[test]
    fn test_sample_limits() -> Result<(), CritiqueError> {
        let mut b = buffer(8, 1);
        assert!(!b.can_sample(1));
        for f in 0..5 {
            step(&mut b, f, f == 2);
        }
        assert!(b.can_sample(4));
        assert!(!b.can_sample(5));
        assert!(b.sample(5).is_err());

        let batch = b.sample(4)?;
        let mut frames = batch.obs.iter().map(|o| o[0] as u8).collect::<Vec<_>>();
        frames.sort_unstable();
        assert_eq!(frames, vec![0, 1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_missing_effect() -> Result<(), CritiqueError> {
        let mut b = buffer(8, 1);
        b.store_frame(vec![0])?;
        b.store_frame(vec![1])?;
        assert!(matches!(b.sample(1), Err(CritiqueError::MissingEffect(0))));
        assert!(b.store_frame(vec![1, 2]).is_err());
        Ok(())
    }
}
