//! Slide carousels
//!
//! A carousel is nothing more than an index into an ordered list of slides.
//! What the page shows is derived from that index by [`Carousel::slide_view`];
//! the autoplay timer lives with the controller.

use crate::types::CarouselKind;

/// Render state of a single slide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlideView {
    /// Carries the `active` class
    pub active: bool,
    /// Carries the transitional `prev` class
    pub prev: bool,
    /// Laid out at all (`display: block`)
    pub displayed: bool,
    /// Faded in (`opacity: 1`)
    pub opaque: bool,
}

#[derive(Debug, Clone)]
pub struct Carousel {
    kind: CarouselKind,
    slide_count: usize,
    current: usize,
    // Hero slides fade in shortly after being shown
    revealed: bool,
}

impl Carousel {
    pub fn new(kind: CarouselKind, slide_count: usize) -> Self {
        Carousel {
            kind,
            slide_count,
            current: 0,
            revealed: kind == CarouselKind::Text,
        }
    }

    pub fn kind(&self) -> CarouselKind {
        self.kind
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub fn is_empty(&self) -> bool {
        self.slide_count == 0
    }

    /// Whether showing a slide schedules a delayed fade-in
    pub fn fades_in(&self) -> bool {
        self.kind == CarouselKind::Hero
    }

    /// Advance one slide, wrapping to the first. Returns the new index.
    pub fn next(&mut self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        self.show((self.current + 1) % self.slide_count)
    }

    /// Go back one slide, wrapping to the last. Returns the new index.
    pub fn prev(&mut self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        self.show((self.current + self.slide_count - 1) % self.slide_count)
    }

    /// Jump straight to `index`. Out-of-range indices are ignored.
    pub fn show(&mut self, index: usize) -> Option<usize> {
        if index >= self.slide_count {
            tracing::warn!(
                "{:?} carousel: slide {} out of range ({} slides)",
                self.kind,
                index,
                self.slide_count
            );
            return None;
        }

        self.current = index;
        self.revealed = !self.fades_in();
        tracing::debug!("{:?} carousel: showing slide {}", self.kind, index);
        Some(index)
    }

    /// Complete the fade-in of `index` if it is still the current slide
    pub fn reveal(&mut self, index: usize) -> bool {
        if index != self.current || self.revealed {
            return false;
        }
        self.revealed = true;
        true
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    fn prev_index(&self) -> Option<usize> {
        if self.slide_count < 2 {
            return None;
        }
        Some((self.current + self.slide_count - 1) % self.slide_count)
    }

    pub fn slide_view(&self, index: usize) -> SlideView {
        if index >= self.slide_count {
            return SlideView::default();
        }

        let is_current = index == self.current;
        let prev = self.prev_index() == Some(index);

        match self.kind {
            CarouselKind::Text => SlideView {
                active: is_current,
                prev,
                displayed: true,
                opaque: is_current,
            },
            CarouselKind::Hero => SlideView {
                active: is_current && self.revealed,
                prev,
                displayed: is_current,
                opaque: is_current && self.revealed,
            },
        }
    }

    pub fn views(&self) -> Vec<SlideView> {
        (0..self.slide_count).map(|i| self.slide_view(i)).collect()
    }

    /// Indicator dots mirror the current slide directly, without the fade
    pub fn indicator_active(&self, index: usize) -> bool {
        index == self.current && index < self.slide_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_full_cycle_returns_to_start() {
        let mut carousel = Carousel::new(CarouselKind::Text, 4);
        for _ in 0..4 {
            carousel.next();
        }
        assert_eq!(carousel.current(), 0);
    }

    #[test]
    fn test_prev_wraps_to_last() {
        let mut carousel = Carousel::new(CarouselKind::Text, 4);
        assert_eq!(carousel.prev(), Some(3));
    }

    #[test]
    fn test_six_steps_on_five_slides() {
        let mut carousel = Carousel::new(CarouselKind::Hero, 5);
        for _ in 0..6 {
            carousel.next();
        }
        assert_eq!(carousel.current(), 1);
    }

    #[test]
    fn test_empty_carousel_is_inert() {
        let mut carousel = Carousel::new(CarouselKind::Hero, 0);
        assert_eq!(carousel.next(), None);
        assert_eq!(carousel.prev(), None);
        assert_eq!(carousel.show(0), None);
        assert!(carousel.views().is_empty());
    }

    #[test]
    fn test_show_out_of_range_keeps_index() {
        let mut carousel = Carousel::new(CarouselKind::Text, 3);
        carousel.show(1);
        assert_eq!(carousel.show(7), None);
        assert_eq!(carousel.current(), 1);
    }

    #[test]
    fn test_text_view_marks_active_and_prev() {
        let mut carousel = Carousel::new(CarouselKind::Text, 3);
        carousel.show(0);
        let views = carousel.views();
        assert!(views[0].active);
        assert!(views[2].prev);
        assert!(!views[1].active && !views[1].prev);
        assert_eq!(views.iter().filter(|v| v.active).count(), 1);
    }

    #[test]
    fn test_hero_fades_in_after_reveal() {
        let mut carousel = Carousel::new(CarouselKind::Hero, 3);
        carousel.show(2);

        let view = carousel.slide_view(2);
        assert!(view.displayed);
        assert!(!view.opaque);
        assert!(!view.active);
        assert!(!carousel.slide_view(0).displayed);

        assert!(carousel.reveal(2));
        let view = carousel.slide_view(2);
        assert!(view.opaque && view.active);
        assert!(carousel.slide_view(1).prev);
    }

    #[test]
    fn test_stale_reveal_is_ignored() {
        let mut carousel = Carousel::new(CarouselKind::Hero, 3);
        carousel.show(1);
        carousel.show(2);
        assert!(!carousel.reveal(1));
        assert!(!carousel.slide_view(1).active);
        assert!(!carousel.slide_view(2).opaque);
    }

    #[test]
    fn test_single_slide_has_no_prev() {
        let mut carousel = Carousel::new(CarouselKind::Text, 1);
        carousel.next();
        let view = carousel.slide_view(0);
        assert!(view.active);
        assert!(!view.prev);
    }
}
