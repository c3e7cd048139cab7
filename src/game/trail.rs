//! Bounded position history used for motion trails

use std::collections::VecDeque;

/// Number of recent positions kept per agent
pub const MAX_TRAIL_LENGTH: usize = 30;

/// FIFO of recent `(x, y)` positions, oldest first
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<(f64, f64)>,
    capacity: usize,
}

impl Trail {
    pub fn new() -> Self {
        Self::with_capacity(MAX_TRAIL_LENGTH)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a position, evicting the oldest once over capacity
    pub fn push(&mut self, point: (f64, f64)) {
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &(f64, f64)> {
        self.points.iter()
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_last_thirty_in_order() {
        let mut trail = Trail::new();
        for i in 0..31 {
            trail.push((i as f64, 0.0));
        }
        assert_eq!(trail.len(), MAX_TRAIL_LENGTH);
        let xs: Vec<f64> = trail.iter().map(|p| p.0).collect();
        assert_eq!(xs.first(), Some(&1.0));
        assert_eq!(xs.last(), Some(&30.0));
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut trail = Trail::with_capacity(3);
        for i in 0..100 {
            trail.push((0.0, i as f64));
            assert!(trail.len() <= 3);
        }
        trail.clear();
        assert!(trail.is_empty());
    }
}
