//! Traits of recorders.
use super::Record;

/// Writes records immediately.
pub trait Recorder {
    /// Writes a record.
    fn write(&mut self, record: Record);
}

/// Stores records and writes their aggregation on [`AggregateRecorder::flush`].
pub trait AggregateRecorder {
    /// Stores a record for later aggregation.
    fn store(&mut self, record: Record);

    /// Aggregates the stored records and writes the result tagged with `step`.
    fn flush(&mut self, step: i64);
}
