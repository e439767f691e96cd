//! Key-value records returned by training calls.
use crate::error::A2cError;
use chrono::prelude::{DateTime, Local};
use std::collections::{hash_map::Iter, HashMap};

/// A value stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single value, e.g. a loss.
    Scalar(f32),

    /// A timestamp.
    DateTime(DateTime<Local>),

    /// A sequence of values, e.g. the normalized rewards of a batch.
    Array1(Vec<f32>),

    /// A label.
    String(String),
}

/// Named values produced by a training call or an episode.
///
/// ```rust
/// use a2c_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_scalar("loss_actor", 0.25);
/// record.insert("rewards", RecordValue::Array1(vec![1.0, -0.5]));
///
/// assert_eq!(record.get_scalar("loss_actor").unwrap(), 0.25);
/// assert!(record.get_scalar("rewards").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record holding one scalar.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Inserts a value, replacing any value under the same key.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns the value under `k`, if any.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Iterates over key-value pairs in arbitrary order.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the record holds nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merges two records. Values of `record` win on key collisions.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Returns a scalar value.
    pub fn get_scalar(&self, k: &str) -> Result<f32, A2cError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(A2cError::RecordValueTypeError("Scalar".to_string())),
            None => Err(A2cError::RecordKeyError(k.to_string())),
        }
    }

    /// Returns a 1-dimensional array.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, A2cError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v.clone()),
            Some(_) => Err(A2cError::RecordValueTypeError("Array1".to_string())),
            None => Err(A2cError::RecordKeyError(k.to_string())),
        }
    }

    /// Returns a string.
    pub fn get_string(&self, k: &str) -> Result<String, A2cError> {
        match self.0.get(k) {
            Some(RecordValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(A2cError::RecordValueTypeError("String".to_string())),
            None => Err(A2cError::RecordKeyError(k.to_string())),
        }
    }
}
