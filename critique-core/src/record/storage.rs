//! Record storage and aggregation.
use super::{Record, RecordValue};
use std::collections::HashMap;
use xxhash_rust::xxh3::Xxh3Builder;

/// Stores records and aggregates them.
///
/// Scalars stored more than once under the same key are reduced to
/// `{key}_min`, `{key}_max`, `{key}_mean` and `{key}_median`. A scalar stored once
/// is kept as is. For any other value the most recent one is kept.
#[derive(Default)]
pub struct RecordStorage {
    data: Vec<Record>,
}

fn min(vs: &[f32]) -> f32 {
    vs.iter().copied().fold(f32::INFINITY, f32::min)
}

fn max(vs: &[f32]) -> f32 {
    vs.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

fn mean(vs: &[f32]) -> f32 {
    vs.iter().sum::<f32>() / vs.len() as f32
}

fn median(mut vs: Vec<f32>) -> f32 {
    vs.sort_by(|x, y| x.total_cmp(y));
    vs[vs.len() / 2]
}

enum Collected {
    Scalars(Vec<f32>),
    Latest(RecordValue),
}

impl RecordStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self { data: vec![] }
    }

    /// Stores a record.
    pub fn store(&mut self, record: Record) {
        self.data.push(record);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no record is stored.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Aggregates all stored records and clears the storage.
    pub fn aggregate(&mut self) -> Record {
        let mut collected = HashMap::<String, Collected, Xxh3Builder>::default();

        for record in self.data.drain(..) {
            for (k, v) in record.into_iter_in_record() {
                match v {
                    RecordValue::Scalar(x) => match collected
                        .entry(k)
                        .or_insert_with(|| Collected::Scalars(vec![]))
                    {
                        Collected::Scalars(vs) => vs.push(x),
                        c => *c = Collected::Scalars(vec![x]),
                    },
                    v => {
                        collected.insert(k, Collected::Latest(v));
                    }
                }
            }
        }

        let mut record = Record::empty();
        for (k, c) in collected.into_iter() {
            match c {
                Collected::Scalars(vs) if vs.len() == 1 => {
                    record.insert(k, RecordValue::Scalar(vs[0]));
                }
                Collected::Scalars(vs) => {
                    record.insert(format!("{}_min", k), RecordValue::Scalar(min(&vs)));
                    record.insert(format!("{}_max", k), RecordValue::Scalar(max(&vs)));
                    record.insert(format!("{}_mean", k), RecordValue::Scalar(mean(&vs)));
                    record.insert(format!("{}_median", k), RecordValue::Scalar(median(vs)));
                }
                Collected::Latest(v) => record.insert(k, v),
            }
        }

        record
    }
}
