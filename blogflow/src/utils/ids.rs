//! Injectable source of run id suffixes.

use parking_lot::Mutex;
use std::collections::VecDeque;
use uuid::Uuid;

/// Produces the random part of a run id.
pub trait IdSource: Send + Sync {
    /// Returns the next 8-character suffix.
    fn next_suffix(&self) -> String;
}

/// Random suffixes taken from a v4 UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_suffix(&self) -> String {
        let mut simple = Uuid::new_v4().simple().to_string();
        simple.truncate(8);
        simple
    }
}

/// Hands out preset suffixes in order, repeating the last one.
#[derive(Debug)]
pub struct FixedIds {
    suffixes: Mutex<VecDeque<String>>,
}

impl FixedIds {
    /// Creates a source yielding `suffixes` in order.
    #[must_use]
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: Mutex::new(suffixes.into_iter().map(Into::into).collect()),
        }
    }
}

impl IdSource for FixedIds {
    fn next_suffix(&self) -> String {
        let mut suffixes = self.suffixes.lock();
        if suffixes.len() > 1 {
            suffixes.pop_front().unwrap_or_default()
        } else {
            suffixes.front().cloned().unwrap_or_default()
        }
    }
}
