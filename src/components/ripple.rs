//! Button ripple: a short-lived marker at the click position

use crate::types::Point;

#[derive(Debug, Clone, PartialEq)]
pub struct Ripple {
    pub id: u64,
    pub button: usize,
    /// Position relative to the button
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Ripples {
    next_id: u64,
    active: Vec<Ripple>,
}

impl Ripples {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ripple where `pointer` hit the button at `origin`
    pub fn spawn(&mut self, button: usize, pointer: Point, origin: Point) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.active.push(Ripple {
            id,
            button,
            x: pointer.x - origin.x,
            y: pointer.y - origin.y,
        });
        id
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.active.len();
        self.active.retain(|r| r.id != id);
        self.active.len() != before
    }

    pub fn active(&self) -> &[Ripple] {
        &self.active
    }

    pub fn on_button(&self, button: usize) -> impl Iterator<Item = &Ripple> {
        self.active.iter().filter(move |r| r.button == button)
    }
}
