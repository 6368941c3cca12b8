//! Launch-cadence limiting for port probes.
//!
//! A [`LaunchGate`] admits at most `budget` launches in any window of one
//! period. It bounds how many probes are *started* and says nothing about
//! how many are still running; use a semaphore on top when in-flight
//! concurrency must be capped too.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Sliding-window launch gate.
///
/// The first `budget` launches go through immediately. Every later launch
/// waits until the launch `budget` places before it is a full period old, so
/// a caller that stalls mid-batch cannot catch up with a burst.
pub struct LaunchGate {
    budget: usize,
    period: Duration,
    recent: VecDeque<Instant>,
}

impl LaunchGate {
    /// Gate allowing `rate` launches per second.
    pub fn per_second(rate: usize) -> Self {
        Self::new(rate, Duration::from_secs(1))
    }

    /// Gate allowing `budget` launches every `period`.
    pub fn new(budget: usize, period: Duration) -> Self {
        let budget = budget.max(1);
        Self {
            budget,
            period,
            recent: VecDeque::with_capacity(budget),
        }
    }

    /// Wait until one more launch fits in the window, then record it.
    ///
    /// Cancel-safe: dropping the future before it completes records nothing.
    pub async fn admit(&mut self) {
        if self.recent.len() >= self.budget {
            if let Some(&oldest) = self.recent.front() {
                sleep_until(oldest + self.period).await;
            }
            self.recent.pop_front();
        }
        self.recent.push_back(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Largest number of `times` falling in any half-open window of `period`.
    fn busiest_window(times: &[Instant], period: Duration) -> usize {
        times
            .iter()
            .map(|&start| {
                times
                    .iter()
                    .filter(|&&t| t >= start && t < start + period)
                    .count()
            })
            .max()
            .unwrap_or(0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_budget_is_immediate() {
        let mut gate = LaunchGate::per_second(5);
        let start = Instant::now();
        for _ in 0..5 {
            gate.admit().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);

        gate.admit().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_are_spaced() {
        let mut gate = LaunchGate::per_second(10);
        let start = Instant::now();

        for _ in 0..30 {
            gate.admit().await;
        }

        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stall_mid_batch_does_not_burst() {
        let period = Duration::from_millis(100);
        let mut gate = LaunchGate::new(3, period);
        let mut times = Vec::new();

        gate.admit().await;
        times.push(Instant::now());

        // The rest of the batch is held up past the next period.
        tokio::time::sleep(Duration::from_millis(150)).await;
        for _ in 0..5 {
            gate.admit().await;
            times.push(Instant::now());
        }

        assert!(busiest_window(&times, period) <= 3);
        // The 0ms launch has expired by 150ms, so a full budget fits there.
        assert_eq!(times[1], times[2]);
        assert_eq!(times[3] - times[1], Duration::from_millis(0));
        assert_eq!(times[4] - times[1], period);
    }

    #[tokio::test(start_paused = true)]
    async fn test_uneven_caller_keeps_window_bound() {
        let period = Duration::from_secs(1);
        let mut gate = LaunchGate::new(4, period);
        let mut times = Vec::new();

        for i in 0..40u64 {
            gate.admit().await;
            times.push(Instant::now());
            tokio::time::sleep(Duration::from_millis((i * 37) % 450)).await;
        }

        assert!(busiest_window(&times, period) <= 4);
    }
}
