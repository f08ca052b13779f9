//! Event rates and rate-gated production
//!
//! Two counter models exist and each metric picks one:
//! - `Periodic`: the count drops to zero at every window boundary
//!   (enzyme reactions, reset every 5 s).
//! - `Sliding`: the count covers the trailing window `(t - window, t]`
//!   (mRNA and mutation rates).

use std::collections::VecDeque;

use serde::Serialize;

use super::router::Millis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CounterModel {
    Periodic,
    Sliding,
}

/// Count of events over a time window, plus a cumulative total
#[derive(Debug, Clone)]
pub struct WindowedCounter {
    model: CounterModel,
    window: Millis,
    /// Sliding model: timestamps still inside the window
    events: VecDeque<Millis>,
    /// Periodic model: count since `window_start`
    count: u64,
    window_start: Millis,
    total: u64,
}

impl WindowedCounter {
    pub fn new(model: CounterModel, window: Millis) -> Self {
        Self {
            model,
            window,
            events: VecDeque::new(),
            count: 0,
            window_start: 0,
            total: 0,
        }
    }

    pub fn periodic(window: Millis) -> Self {
        Self::new(CounterModel::Periodic, window)
    }

    pub fn sliding(window: Millis) -> Self {
        Self::new(CounterModel::Sliding, window)
    }

    #[inline]
    fn bucket(&self, t: Millis) -> Millis {
        t / self.window.max(1)
    }

    /// Record one event at `t`. Timestamps are expected in clock order.
    pub fn record(&mut self, t: Millis) {
        self.total += 1;
        match self.model {
            CounterModel::Periodic => {
                if self.bucket(t) != self.bucket(self.window_start) {
                    self.count = 0;
                    self.window_start = self.bucket(t) * self.window.max(1);
                }
                self.count += 1;
            }
            CounterModel::Sliding => {
                self.events.push_back(t);
                while self
                    .events
                    .front()
                    .is_some_and(|&e| e + self.window <= t)
                {
                    self.events.pop_front();
                }
            }
        }
    }

    /// Events counted at query time `t`
    pub fn count(&self, t: Millis) -> u64 {
        match self.model {
            CounterModel::Periodic => {
                if self.bucket(t) == self.bucket(self.window_start) {
                    self.count
                } else {
                    0
                }
            }
            CounterModel::Sliding => self
                .events
                .iter()
                .filter(|&&e| e <= t && e + self.window > t)
                .count() as u64,
        }
    }

    /// Events per second at `t`; a zero window reports zero
    pub fn rate(&self, t: Millis) -> f32 {
        if self.window == 0 {
            return 0.0;
        }
        self.count(t) as f32 / (self.window as f32 / 1000.0)
    }

    /// Every event ever recorded
    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Fires every `k / rate` milliseconds while `rate` is above `threshold`
#[derive(Debug, Clone, Serialize)]
pub struct RateGatedProducer {
    pub threshold: f32,
    /// Interval numerator (ms · rate units)
    pub k: f64,
    elapsed_ms: f64,
    produced: u64,
}

impl RateGatedProducer {
    pub fn new(threshold: f32, k: f64) -> Self {
        Self {
            threshold,
            k,
            elapsed_ms: 0.0,
            produced: 0,
        }
    }

    /// Whether `rate` opens the gate
    pub fn is_open(&self, rate: f32) -> bool {
        rate.is_finite() && rate > self.threshold && rate > 0.0
    }

    /// Advance by `dt_ms` at the given rate. Returns true if one unit was
    /// produced this tick (never more than one).
    pub fn update(&mut self, rate: f32, dt_ms: f64) -> bool {
        if !self.is_open(rate) {
            self.elapsed_ms = 0.0;
            return false;
        }
        let interval = self.k / f64::from(rate);
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms >= interval {
            self.elapsed_ms = (self.elapsed_ms - interval).min(interval);
            self.produced += 1;
            return true;
        }
        false
    }

    /// Cumulative production
    pub fn produced(&self) -> u64 {
        self.produced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_periodic_window_example() {
        let mut counter = WindowedCounter::periodic(5000);
        for t in [100, 2000, 4900] {
            counter.record(t);
        }
        assert_eq!(counter.count(4901), 3);
        assert_eq!(counter.count(5001), 0);
        assert!((counter.rate(4901) - 0.6).abs() < 1e-6);
        assert_eq!(counter.total(), 3);

        // Next window starts from zero
        counter.record(5200);
        assert_eq!(counter.count(5300), 1);
        assert_eq!(counter.total(), 4);
    }

    #[test]
    fn test_sliding_window_example() {
        let mut counter = WindowedCounter::sliding(5000);
        for t in [100, 2000, 4900] {
            counter.record(t);
        }
        assert_eq!(counter.count(4901), 3);
        // (1, 5001] still holds all three; the event at 100 leaves at 5100
        assert_eq!(counter.count(5001), 3);
        assert_eq!(counter.count(5100), 2);
        assert_eq!(counter.count(9900), 0);
    }

    #[test]
    fn test_zero_window_is_zero_rate() {
        let mut counter = WindowedCounter::sliding(0);
        counter.record(10);
        assert_eq!(counter.rate(10), 0.0);
        let mut counter = WindowedCounter::periodic(0);
        counter.record(10);
        assert_eq!(counter.rate(10), 0.0);
    }

    #[test]
    fn test_producer_interval() {
        let mut producer = RateGatedProducer::new(10.0, 5000.0);
        let dt = 1000.0 / 120.0;
        let fired = (0..120).filter(|_| producer.update(20.0, dt)).count();
        assert!((3..=4).contains(&fired), "fired {fired}");
        assert_eq!(producer.produced(), fired as u64);
    }

    #[test]
    fn test_producer_gate_closed_below_threshold() {
        let mut producer = RateGatedProducer::new(10.0, 5000.0);
        for rate in [0.0, 5.0, 10.0, f32::NAN, f32::INFINITY] {
            for _ in 0..1000 {
                assert!(!producer.update(rate, 100.0));
            }
        }
        assert_eq!(producer.produced(), 0);
    }

    #[test]
    fn test_producer_at_most_once_per_tick() {
        let mut producer = RateGatedProducer::new(0.0, 1.0);
        // Interval of 1 µs against 100 ms ticks: still one per tick
        for _ in 0..10 {
            assert!(producer.update(1000.0, 100.0));
        }
        assert_eq!(producer.produced(), 10);
    }

    proptest! {
        #[test]
        fn prop_periodic_counts_current_window(
            window in 1u64..10_000,
            mut events in proptest::collection::vec(0u64..50_000, 0..200),
            mut queries in proptest::collection::vec(0u64..60_000, 1..50),
        ) {
            events.sort_unstable();
            queries.sort_unstable();
            let mut counter = WindowedCounter::periodic(window);
            let mut next = 0;
            for &t in &queries {
                while next < events.len() && events[next] <= t {
                    counter.record(events[next]);
                    next += 1;
                }
                let expected = events[..next]
                    .iter()
                    .filter(|&&e| e / window == t / window)
                    .count() as u64;
                prop_assert_eq!(counter.count(t), expected);
            }
            prop_assert_eq!(counter.total(), next as u64);
        }

        #[test]
        fn prop_sliding_matches_brute_force(
            window in 1u64..10_000,
            mut events in proptest::collection::vec(0u64..50_000, 0..200),
            mut queries in proptest::collection::vec(0u64..60_000, 1..50),
        ) {
            events.sort_unstable();
            queries.sort_unstable();
            let mut counter = WindowedCounter::sliding(window);
            let mut next = 0;
            for &t in &queries {
                while next < events.len() && events[next] <= t {
                    counter.record(events[next]);
                    next += 1;
                }
                let expected = events
                    .iter()
                    .filter(|&&e| e + window > t && e <= t)
                    .count() as u64;
                prop_assert_eq!(counter.count(t), expected);
            }
        }
    }
}
