//! services/client/src/engine/clock.rs
//!
//! Issues the instants stamped onto new documents.

use chrono::{DateTime, Duration, DurationRound, Utc};
use std::sync::Mutex;

/// Hands out strictly increasing, microsecond-aligned instants.
///
/// A user message and the reply written right after it must never share a
/// timestamp, otherwise their relative order would fall to the id tie-break.
#[derive(Debug, Default)]
pub struct Clock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now();
        let wall = wall.duration_trunc(Duration::microseconds(1)).unwrap_or(wall);
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let next = match *last {
            Some(prev) if wall <= prev => prev + Duration::microseconds(1),
            _ => wall,
        };
        *last = Some(next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instants_strictly_increase() {
        let clock = Clock::new();
        let stamps: Vec<_> = (0..1000).map(|_| clock.now()).collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
        assert!(stamps.iter().all(|t| t.timestamp_subsec_nanos() % 1000 == 0));
    }
}
