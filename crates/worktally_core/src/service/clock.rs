//! Store-owned timestamp source.
//!
//! # Invariants
//! - Issued timestamps have microsecond precision, matching storage.
//! - Every issued timestamp is strictly greater than the previous one, even
//!   when the wall clock stalls or steps backwards.

use crate::model::common::Timestamp;
use chrono::{Duration, SubsecRound, Utc};

type TimeSource = Box<dyn FnMut() -> Timestamp + Send>;

/// Monotonic wall-clock wrapper used for `created_at`/`updated_at`.
pub struct MonotonicClock {
    source: TimeSource,
    last: Option<Timestamp>,
}

impl MonotonicClock {
    /// Clock backed by `Utc::now()`.
    pub fn system() -> Self {
        Self::with_source(Utc::now)
    }

    /// Clock backed by a caller-provided source. Used for deterministic tests.
    pub fn with_source(source: impl FnMut() -> Timestamp + Send + 'static) -> Self {
        Self {
            source: Box::new(source),
            last: None,
        }
    }

    /// Next timestamp, strictly after any previously issued one.
    pub fn now(&mut self) -> Timestamp {
        let floor = self.last;
        self.issue(floor)
    }

    /// Next timestamp, also strictly after `floor`.
    ///
    /// Guards records loaded from storage whose `updated_at` came from an
    /// earlier process with a faster clock.
    pub fn now_after(&mut self, floor: Timestamp) -> Timestamp {
        let floor = match self.last {
            Some(last) if last > floor => last,
            _ => floor,
        };
        self.issue(Some(floor))
    }

    fn issue(&mut self, floor: Option<Timestamp>) -> Timestamp {
        let mut value = (self.source)().trunc_subsecs(6);
        if let Some(floor) = floor {
            if value <= floor {
                value = floor + Duration::microseconds(1);
            }
        }
        self.last = Some(value);
        value
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::system()
    }
}
