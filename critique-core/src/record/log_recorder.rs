//! A recorder writing aggregated records to the log.
use super::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use log::info;

/// Writes records through [`log::info!`].
///
/// Scalars are printed with four decimals; keys are sorted so consecutive lines
/// line up.
#[derive(Default)]
pub struct LogRecorder {
    storage: RecordStorage,
}

impl LogRecorder {
    /// Creates a recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn format(record: &Record) -> String {
        let mut items = record
            .iter()
            .map(|(k, v)| match v {
                RecordValue::Scalar(v) => format!("{}: {:.4}", k, v),
                RecordValue::String(s) => format!("{}: {}", k, s),
                RecordValue::DateTime(t) => format!("{}: {}", k, t),
                RecordValue::Array1(v) => format!("{}: {:?}", k, v),
                RecordValue::Array2(_, shape) => format!("{}: array{:?}", k, shape),
            })
            .collect::<Vec<_>>();
        items.sort();
        items.join(", ")
    }
}

impl Recorder for LogRecorder {
    fn write(&mut self, record: Record) {
        info!("{}", Self::format(&record));
    }
}

impl AggregateRecorder for LogRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        let record = self.storage.aggregate();
        if !record.is_empty() {
            info!("step {}: {}", step, Self::format(&record));
        }
    }
}
