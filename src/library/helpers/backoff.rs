//! Bounded retry schedule

use std::{iter::Iterator, time::Duration};

/// Fixed-delay retry schedule
///
/// This struct implements the iterator trait and yields the delay to wait before each retry.
/// The first attempt is not part of the schedule, thus an instance permitting `attempts` tries
/// yields exactly `attempts - 1` delays before returning `None`.
#[derive(Debug, Clone)]
pub struct Backoff {
    attempts: u32,
    limit: u32,
    delay: Duration,
}

impl Backoff {
    /// Creates a schedule permitting `limit` attempts in total, spaced `delay` apart
    pub fn fixed(limit: u32, delay: Duration) -> Self {
        Self {
            attempts: 1,
            limit,
            delay,
        }
    }

    /// Total number of permitted attempts
    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        if self.attempts >= self.limit {
            None
        } else {
            self.attempts += 1;
            Some(self.delay)
        }
    }
}
