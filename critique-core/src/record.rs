//! Types and traits for recording values obtained during training and evaluation.
//!
//! A [`Record`] is a set of key-value pairs produced by agents, the trainer and the
//! evaluator. Values are [`RecordValue`]s, most commonly scalars such as loss values.
//!
//! ```rust
//! use critique_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("critic_loss", 0.25);
//! record.insert("train_env_steps", RecordValue::Scalar(1000.0));
//! assert_eq!(record.get_scalar("critic_loss").unwrap(), 0.25);
//! ```
//!
//! Recorders consume records. [`AggregateRecorder`]s store records for a while and
//! aggregate them on [`AggregateRecorder::flush`], see [`RecordStorage`].
mod base;
mod buffered_recorder;
mod log_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use log_recorder::LogRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
