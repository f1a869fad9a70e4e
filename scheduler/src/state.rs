//! Per-task due-time bookkeeping.

use std::time::Duration;

/// `Idle -> Running -> Idle` for one task, reduced to the time it last
/// started. A task that never ran is due immediately.
#[derive(Debug, Clone)]
pub struct Schedule {
    interval_ms: u64,
    last_run_ms: Option<u64>,
}

impl Schedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ms: interval.as_millis() as u64,
            last_run_ms: None,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn last_run_ms(&self) -> Option<u64> {
        self.last_run_ms
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_run_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        }
    }

    /// Records a run start. Success and failure both count.
    pub fn mark_run(&mut self, now_ms: u64) {
        self.last_run_ms = Some(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_first_tick_then_waits_full_interval() {
        let mut s = Schedule::new(Duration::from_secs(300));

        let fired: Vec<u64> = (0..=600u64)
            .filter(|secs| {
                let now_ms = secs * 1_000;
                if s.is_due(now_ms) {
                    s.mark_run(now_ms);
                    true
                } else {
                    false
                }
            })
            .collect();

        assert_eq!(fired, vec![0, 300, 600]);
    }

    #[test]
    fn clock_going_backwards_is_not_due() {
        let mut s = Schedule::new(Duration::from_secs(60));
        s.mark_run(100_000);

        assert!(!s.is_due(50_000));
        assert_eq!(s.last_run_ms(), Some(100_000));
    }
}
