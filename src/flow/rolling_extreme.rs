//! Rolling max/min over a trailing time window.
//!
//! Two monotonic deques of `(ts, value)`: the max deque is kept strictly
//! decreasing and the min deque strictly increasing, so each front is the
//! current extreme. Each value is pushed and popped at most once per deque,
//! giving amortized O(1) updates and O(1) reads.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RollingExtreme {
    window_sec: f64,
    max_q: VecDeque<(f64, f64)>,
    min_q: VecDeque<(f64, f64)>,
}

impl RollingExtreme {
    pub fn new(window_sec: f64) -> Self {
        Self {
            window_sec,
            max_q: VecDeque::new(),
            min_q: VecDeque::new(),
        }
    }

    /// Add a value observed at `ts`, then expire anything older than the window.
    pub fn add(&mut self, ts: f64, value: f64) {
        while self.max_q.back().is_some_and(|&(_, v)| v <= value) {
            self.max_q.pop_back();
        }
        self.max_q.push_back((ts, value));

        while self.min_q.back().is_some_and(|&(_, v)| v >= value) {
            self.min_q.pop_back();
        }
        self.min_q.push_back((ts, value));

        self.evict(ts);
    }

    /// Drop entries whose age at `ts_now` exceeds the window.
    pub fn evict(&mut self, ts_now: f64) {
        while self
            .max_q
            .front()
            .is_some_and(|&(ts, _)| ts_now - ts > self.window_sec)
        {
            self.max_q.pop_front();
        }
        while self
            .min_q
            .front()
            .is_some_and(|&(ts, _)| ts_now - ts > self.window_sec)
        {
            self.min_q.pop_front();
        }
    }

    /// True unless both deques hold at least one entry.
    pub fn is_empty(&self) -> bool {
        self.max_q.is_empty() || self.min_q.is_empty()
    }

    pub fn current_max(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        self.max_q.front().map(|&(_, v)| v)
    }

    pub fn current_min(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        self.min_q.front().map(|&(_, v)| v)
    }

    pub fn window_sec(&self) -> f64 {
        self.window_sec
    }

    pub fn clear(&mut self) {
        self.max_q.clear();
        self.min_q.clear();
    }
}
