//! Replay buffers.
//!
//! [`TrajectoryBuffer`] stores whole trajectories and serves both the most recent
//! data (on-policy algorithms) and uniform random transitions (off-policy ones).
//! [`FrameBuffer`] stores each frame once and rebuilds stacked observations when
//! sampled, which keeps memory low for image observations.
mod config;
mod frame;
mod trajectory;
pub use config::{FrameBufferConfig, TrajectoryBufferConfig};
pub use frame::{to_obs, FrameBuffer};
pub use trajectory::TrajectoryBuffer;
