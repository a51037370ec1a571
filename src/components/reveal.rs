//! Visibility-triggered effects: entrance animations and numeric counters
//!
//! Each observer fires at most once per element and then stops watching it.

use crate::types::Observed;
use std::collections::HashSet;

/// Fraction of an element's box inside the viewport, in `0.0..=1.0`
pub fn visibility_ratio(top: f64, height: f64, viewport_top: f64, viewport_height: f64) -> f64 {
    if height <= 0.0 {
        return 0.0;
    }
    let visible_top = top.max(viewport_top);
    let visible_bottom = (top + height).min(viewport_top + viewport_height);
    ((visible_bottom - visible_top).max(0.0) / height).clamp(0.0, 1.0)
}

#[derive(Debug, Clone)]
pub struct VisibilityObserver {
    threshold: f64,
    watched: HashSet<Observed>,
}

impl VisibilityObserver {
    pub fn new(threshold: f64) -> Self {
        VisibilityObserver {
            threshold,
            watched: HashSet::new(),
        }
    }

    pub fn observe(&mut self, target: Observed) {
        self.watched.insert(target);
    }

    pub fn is_watching(&self, target: Observed) -> bool {
        self.watched.contains(&target)
    }

    /// Report a visibility change. Returns true exactly once per target,
    /// the first time at least `threshold` of it is visible.
    pub fn notify(&mut self, target: Observed, ratio: f64) -> bool {
        if ratio <= 0.0 || ratio < self.threshold {
            return false;
        }
        self.watched.remove(&target)
    }
}

/// Linear count-up from zero to a target
///
/// The per-frame increment is `target / (duration / frame)`; the displayed
/// value is the floor of the running total until it reaches the target,
/// which is then shown exactly.
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    target: u64,
    step: f64,
    current: f64,
    finished: bool,
}

impl CounterAnimation {
    pub fn new(target: u64, duration_ms: u64, frame_ms: u64) -> Self {
        let frames = duration_ms as f64 / frame_ms.max(1) as f64;
        let step = if frames > 0.0 {
            target as f64 / frames
        } else {
            target as f64
        };

        CounterAnimation {
            target,
            step,
            current: 0.0,
            finished: false,
        }
    }

    /// Advance one frame and return the value to display
    pub fn advance(&mut self) -> u64 {
        if self.finished {
            return self.target;
        }

        self.current += self.step;
        if self.current < self.target as f64 {
            self.current.floor() as u64
        } else {
            self.finished = true;
            self.target
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn target(&self) -> u64 {
        self.target
    }
}

/// A `.stat-number` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    pub target: u64,
    pub displayed: u64,
    pub started: bool,
    /// The animation has landed on `target`
    pub finished: bool,
}

impl Counter {
    pub fn new(target: u64) -> Self {
        Counter {
            target,
            displayed: 0,
            started: false,
            finished: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_ratio() {
        assert_eq!(visibility_ratio(0.0, 100.0, 0.0, 500.0), 1.0);
        assert_eq!(visibility_ratio(450.0, 100.0, 0.0, 500.0), 0.5);
        assert_eq!(visibility_ratio(600.0, 100.0, 0.0, 500.0), 0.0);
        assert_eq!(visibility_ratio(-90.0, 100.0, 0.0, 500.0), 0.1);
        assert_eq!(visibility_ratio(0.0, 0.0, 0.0, 500.0), 0.0);
    }

    #[test]
    fn test_observer_fires_once() {
        let mut observer = VisibilityObserver::new(0.1);
        let target = Observed::Reveal(3);
        observer.observe(target);

        assert!(!observer.notify(target, 0.05));
        assert!(observer.notify(target, 0.1));
        assert!(!observer.is_watching(target));
        assert!(!observer.notify(target, 1.0));
    }

    #[test]
    fn test_observer_ignores_unwatched() {
        let mut observer = VisibilityObserver::new(0.5);
        assert!(!observer.notify(Observed::Counter(0), 1.0));
    }

    #[test]
    fn test_counter_reaches_target_exactly() {
        let mut animation = CounterAnimation::new(100, 2000, 16);
        let mut last = 0;
        let mut frames = 0;

        while !animation.is_finished() {
            let value = animation.advance();
            assert!(value >= last, "counter went backwards");
            assert!(value <= 100, "counter overshot: {}", value);
            last = value;
            frames += 1;
            assert!(frames <= 130, "counter never finished");
        }

        assert_eq!(last, 100);
        assert!(frames >= 120);
        assert_eq!(animation.advance(), 100);
    }

    #[test]
    fn test_zero_target_finishes_immediately() {
        let mut animation = CounterAnimation::new(0, 2000, 16);
        assert_eq!(animation.advance(), 0);
        assert!(animation.is_finished());
    }
}
