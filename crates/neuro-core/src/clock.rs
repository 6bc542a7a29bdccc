//! Fixed-frequency tick generator.
//!
//! Nodes that must emit samples at a constant rate regardless of when their
//! input arrives drive their output from a [`Clock`]. Tick `i` falls due at
//! `start + (i + 1) / frequency`, matching the timestamp of sample `i` in a
//! [`Channel`](crate::Channel) with the same start time and rate.
//!
//! ```rust
//! use neuro_core::Clock;
//!
//! let mut clock = Clock::new(4.0);
//! clock.start(10.0);
//! clock.update(10.6);
//! assert_eq!(clock.num_new_ticks(), 2);
//! assert_eq!(clock.pop_oldest_tick(), Some(0));
//! assert_eq!(clock.pop_oldest_tick(), Some(1));
//! assert_eq!(clock.pop_oldest_tick(), None);
//! ```

use libm::floor;

/// Queues ticks at a fixed frequency.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    frequency: f64,
    start_time: f64,
    running: bool,
    tick_counter: u64,
    num_new_ticks: u64,
}

impl Clock {
    /// Creates a stopped clock.
    pub fn new(frequency: f64) -> Self {
        Self {
            frequency,
            ..Self::default()
        }
    }

    /// Ticks per second.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Changes the frequency. Takes effect relative to the start time.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    /// Whether the clock is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Time of tick zero's period start.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Starts counting at `time`.
    pub fn start(&mut self, time: f64) {
        self.start_time = time;
        self.running = true;
    }

    /// Stops queueing ticks. Pending ticks are kept.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Stops and forgets every tick.
    pub fn reset(&mut self) {
        self.running = false;
        self.tick_counter = 0;
        self.num_new_ticks = 0;
    }

    /// Queues every tick that fell due by `elapsed`.
    pub fn update(&mut self, elapsed: f64) {
        if !self.running || self.frequency <= 0.0 || elapsed < self.start_time {
            return;
        }
        let due = floor((elapsed - self.start_time) * self.frequency) as u64;
        if due > self.tick_counter {
            self.num_new_ticks += due - self.tick_counter;
            self.tick_counter = due;
        }
    }

    /// Total ticks that fell due since start.
    pub fn tick_counter(&self) -> u64 {
        self.tick_counter
    }

    /// Queued, unconsumed ticks.
    pub fn num_new_ticks(&self) -> u64 {
        self.num_new_ticks
    }

    /// Consumes the oldest queued tick and returns its index.
    pub fn pop_oldest_tick(&mut self) -> Option<u64> {
        if self.num_new_ticks == 0 {
            return None;
        }
        let index = self.tick_counter - self.num_new_ticks;
        self.num_new_ticks -= 1;
        Some(index)
    }

    /// Drops every queued tick.
    pub fn clear_new_ticks(&mut self) {
        self.num_new_ticks = 0;
    }

    /// Due time of tick `index`.
    pub fn tick_time(&self, index: u64) -> f64 {
        if self.frequency <= 0.0 {
            return self.start_time;
        }
        self.start_time + (index + 1) as f64 / self.frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_clock_does_not_tick() {
        let mut clock = Clock::new(10.0);
        clock.update(5.0);
        assert_eq!(clock.num_new_ticks(), 0);
    }

    #[test]
    fn test_ticks_accumulate_across_updates() {
        let mut clock = Clock::new(2.0);
        clock.start(0.0);
        clock.update(0.4);
        assert_eq!(clock.num_new_ticks(), 0);
        clock.update(1.0);
        assert_eq!(clock.num_new_ticks(), 2);
        clock.update(2.0);
        assert_eq!(clock.num_new_ticks(), 4);
        assert_eq!(clock.tick_counter(), 4);
    }

    #[test]
    fn test_pop_returns_monotonic_indices() {
        let mut clock = Clock::new(1.0);
        clock.start(0.0);
        clock.update(3.0);
        let ticks: Vec<u64> = core::iter::from_fn(|| clock.pop_oldest_tick()).collect();
        assert_eq!(ticks, vec![0, 1, 2]);
        clock.update(5.0);
        assert_eq!(clock.pop_oldest_tick(), Some(3));
    }

    #[test]
    fn test_clear_new_ticks_keeps_counter() {
        let mut clock = Clock::new(1.0);
        clock.start(0.0);
        clock.update(3.0);
        clock.clear_new_ticks();
        assert_eq!(clock.num_new_ticks(), 0);
        clock.update(4.0);
        assert_eq!(clock.pop_oldest_tick(), Some(3));
    }

    #[test]
    fn test_reset_and_restart() {
        let mut clock = Clock::new(1.0);
        clock.start(0.0);
        clock.update(3.0);
        clock.reset();
        assert!(!clock.is_running());
        clock.start(10.0);
        clock.update(11.0);
        assert_eq!(clock.pop_oldest_tick(), Some(0));
        assert_eq!(clock.tick_time(0), 11.0);
    }

    #[test]
    fn test_zero_frequency_never_ticks() {
        let mut clock = Clock::new(0.0);
        clock.start(0.0);
        clock.update(100.0);
        assert_eq!(clock.num_new_ticks(), 0);
    }
}
