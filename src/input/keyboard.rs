//! Arrow-key direction tracking

use std::collections::BTreeSet;

use super::ActionAngle;

/// Movement keys the client listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

impl ArrowKey {
    /// Unit contribution `(dx, dy)` with y growing upward
    fn delta(self) -> (i32, i32) {
        match self {
            ArrowKey::Up => (0, 1),
            ArrowKey::Down => (0, -1),
            ArrowKey::Left => (-1, 0),
            ArrowKey::Right => (1, 0),
        }
    }
}

/// Set of currently held arrow keys
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: BTreeSet<ArrowKey>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: ArrowKey) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: ArrowKey) {
        self.held.remove(&key);
    }

    /// Replace the held set with a single key (terminals without release events)
    pub fn press_exclusive(&mut self, key: ArrowKey) {
        self.held.clear();
        self.held.insert(key);
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// Direction of the held keys, `None` when nothing (or only opposing keys) is held
    pub fn direction(&self) -> Option<ActionAngle> {
        let (dx, dy) = self
            .held
            .iter()
            .map(|k| k.delta())
            .fold((0, 0), |(ax, ay), (x, y)| (ax + x, ay + y));
        if dx == 0 && dy == 0 {
            return None;
        }
        Some((dy as f64).atan2(dx as f64))
    }

    /// Held-key direction, or `previous` when there is none
    pub fn compute_direction(&self, previous: ActionAngle) -> ActionAngle {
        self.direction().unwrap_or(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn held(keys: &[ArrowKey]) -> KeyboardState {
        let mut state = KeyboardState::new();
        for key in keys {
            state.press(*key);
        }
        state
    }

    #[test]
    fn single_keys() {
        assert_eq!(held(&[ArrowKey::Right]).direction(), Some(0.0));
        assert_eq!(held(&[ArrowKey::Up]).direction(), Some(FRAC_PI_2));
        assert_eq!(held(&[ArrowKey::Down]).direction(), Some(-FRAC_PI_2));
        assert_eq!(held(&[ArrowKey::Left]).direction(), Some(PI));
    }

    #[test]
    fn diagonals() {
        let angle = held(&[ArrowKey::Up, ArrowKey::Right]).direction().unwrap();
        assert!((angle - FRAC_PI_4).abs() < 1e-12);
        let angle = held(&[ArrowKey::Down, ArrowKey::Left]).direction().unwrap();
        assert!((angle + 3.0 * FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn every_combination_matches_atan2() {
        let keys = [ArrowKey::Up, ArrowKey::Down, ArrowKey::Left, ArrowKey::Right];
        for mask in 1u8..16 {
            let combo: Vec<ArrowKey> = (0..4)
                .filter(|bit| mask & (1 << bit) != 0)
                .map(|bit| keys[bit])
                .collect();
            let state = held(&combo);
            let dy = combo.contains(&ArrowKey::Up) as i32 - combo.contains(&ArrowKey::Down) as i32;
            let dx = combo.contains(&ArrowKey::Right) as i32 - combo.contains(&ArrowKey::Left) as i32;
            let expected = if dx == 0 && dy == 0 {
                0.75
            } else {
                (dy as f64).atan2(dx as f64)
            };
            assert_eq!(state.compute_direction(0.75), expected, "keys {combo:?}");
        }
    }

    #[test]
    fn nothing_held_keeps_previous() {
        let mut state = held(&[ArrowKey::Left]);
        state.release(ArrowKey::Left);
        assert!(state.is_empty());
        assert_eq!(state.compute_direction(1.25), 1.25);
    }

    #[test]
    fn exclusive_press_drops_other_keys() {
        let mut state = held(&[ArrowKey::Up, ArrowKey::Left]);
        state.press_exclusive(ArrowKey::Right);
        assert_eq!(state.direction(), Some(0.0));
    }
}
