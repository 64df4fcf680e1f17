//! The landing-page review carousel.
//!
//! [`ReviewCarousel`] is the position state with its transition lock.
//! [`CarouselController`] adds the auto-advance timer and the pointer and
//! button bindings on top of it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

/// Time between automatic advances.
pub const AUTO_ADVANCE_INTERVAL: Duration = Duration::from_secs(4);

/// Moves requested within this long of the previous move are dropped.
pub const TRANSITION_LOCK: Duration = Duration::from_millis(300);

/// Which review is showing.
#[derive(Debug, Clone)]
pub struct ReviewCarousel {
    len: usize,
    current: usize,
    locked_until: Option<Instant>,
}

impl ReviewCarousel {
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self {
            len,
            current: 0,
            locked_until: None,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    /// Whether a transition started less than [`TRANSITION_LOCK`] before `now`.
    #[must_use]
    pub fn is_locked_at(&self, now: Instant) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Show review `index` (modulo the length). Returns whether it moved.
    ///
    /// Nothing happens while locked, with no reviews, or when `index` is
    /// already showing.
    pub fn show_at(&mut self, index: usize, now: Instant) -> bool {
        if self.is_locked_at(now) || self.len == 0 {
            return false;
        }
        let index = index % self.len;
        if index == self.current {
            return false;
        }
        self.current = index;
        self.locked_until = Some(now + TRANSITION_LOCK);
        true
    }

    /// Advance one review, wrapping at the end.
    pub fn next_at(&mut self, now: Instant) -> bool {
        if self.len == 0 {
            return false;
        }
        self.show_at((self.current + 1) % self.len, now)
    }

    /// Go back one review, wrapping at the start.
    pub fn prev_at(&mut self, now: Instant) -> bool {
        if self.len == 0 {
            return false;
        }
        self.show_at((self.current + self.len - 1) % self.len, now)
    }
}

/// A carousel with its auto-advance timer. Must be driven from inside a
/// Tokio runtime.
#[derive(Debug)]
pub struct CarouselController {
    carousel: Arc<Mutex<ReviewCarousel>>,
    autoplay: Option<JoinHandle<()>>,
}

impl CarouselController {
    /// Create a controller for `len` reviews. Auto-play is not started.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            carousel: Arc::new(Mutex::new(ReviewCarousel::new(len))),
            autoplay: None,
        }
    }

    #[must_use]
    pub fn current(&self) -> usize {
        lock(&self.carousel).current()
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.autoplay.is_some()
    }

    /// Start auto-advancing. Any running timer is stopped first, so repeated
    /// calls never stack timers.
    pub fn start_autoplay(&mut self) {
        self.stop_autoplay();
        if lock(&self.carousel).is_empty() {
            return;
        }

        let carousel = Arc::clone(&self.carousel);
        self.autoplay = Some(tokio::spawn(async move {
            let mut ticks = interval_at(
                Instant::now() + AUTO_ADVANCE_INTERVAL,
                AUTO_ADVANCE_INTERVAL,
            );
            loop {
                ticks.tick().await;
                lock(&carousel).next_at(Instant::now());
            }
        }));
    }

    pub fn stop_autoplay(&mut self) {
        if let Some(timer) = self.autoplay.take() {
            timer.abort();
        }
    }

    /// The "next" button. Ignored during a transition; otherwise moves and
    /// restarts the auto-advance countdown.
    pub fn on_next(&mut self) -> bool {
        self.manual_move(ReviewCarousel::next_at)
    }

    /// The "previous" button.
    pub fn on_prev(&mut self) -> bool {
        self.manual_move(ReviewCarousel::prev_at)
    }

    /// Pointer entered the carousel.
    pub fn on_hover_enter(&mut self) {
        self.stop_autoplay();
    }

    /// Pointer left the carousel.
    pub fn on_hover_leave(&mut self) {
        self.start_autoplay();
    }

    fn manual_move(&mut self, step: fn(&mut ReviewCarousel, Instant) -> bool) -> bool {
        let now = Instant::now();
        if lock(&self.carousel).is_locked_at(now) {
            return false;
        }
        self.stop_autoplay();
        let moved = step(&mut lock(&self.carousel), now);
        self.start_autoplay();
        moved
    }
}

impl Drop for CarouselController {
    fn drop(&mut self) {
        self.stop_autoplay();
    }
}

fn lock(carousel: &Mutex<ReviewCarousel>) -> MutexGuard<'_, ReviewCarousel> {
    carousel.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use tokio::time::sleep;

    use super::*;

    #[test]
    fn test_wraps_both_ways() {
        let start = Instant::now();
        let mut carousel = ReviewCarousel::new(3);
        assert!(carousel.prev_at(start));
        assert_eq!(carousel.current(), 2);

        let later = start + Duration::from_secs(1);
        assert!(carousel.next_at(later));
        assert_eq!(carousel.current(), 0);
    }

    #[test]
    fn test_transition_lock() {
        let start = Instant::now();
        let mut carousel = ReviewCarousel::new(3);
        assert!(carousel.next_at(start));
        assert!(!carousel.next_at(start + Duration::from_millis(299)));
        assert_eq!(carousel.current(), 1);
        assert!(carousel.next_at(start + TRANSITION_LOCK));
        assert_eq!(carousel.current(), 2);
    }

    #[test]
    fn test_selecting_current_is_noop() {
        let start = Instant::now();
        let mut carousel = ReviewCarousel::new(3);
        assert!(!carousel.show_at(0, start));
        assert!(!carousel.is_locked_at(start));
        assert!(carousel.show_at(4, start));
        assert_eq!(carousel.current(), 1);
    }

    #[test]
    fn test_empty_carousel_never_moves() {
        let mut carousel = ReviewCarousel::new(0);
        assert!(!carousel.next_at(Instant::now()));
        assert!(!carousel.prev_at(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_advances() {
        let mut controller = CarouselController::new(3);
        controller.start_autoplay();
        controller.start_autoplay();

        sleep(Duration::from_millis(4_050)).await;
        assert_eq!(controller.current(), 1);
        sleep(Duration::from_secs(4)).await;
        assert_eq!(controller.current(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hover_pauses_autoplay() {
        let mut controller = CarouselController::new(3);
        controller.start_autoplay();
        controller.on_hover_enter();
        assert!(!controller.is_playing());

        sleep(Duration::from_secs(20)).await;
        assert_eq!(controller.current(), 0);

        controller.on_hover_leave();
        sleep(Duration::from_millis(4_050)).await;
        assert_eq!(controller.current(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_buttons_respect_lock_and_restart_timer() {
        let mut controller = CarouselController::new(4);
        controller.start_autoplay();

        sleep(Duration::from_secs(3)).await;
        assert!(controller.on_next());
        assert!(!controller.on_next());
        assert_eq!(controller.current(), 1);

        // The countdown restarted at the button press.
        sleep(Duration::from_secs(2)).await;
        assert_eq!(controller.current(), 1);
        sleep(Duration::from_millis(2_050)).await;
        assert_eq!(controller.current(), 2);

        sleep(Duration::from_millis(400)).await;
        assert!(controller.on_prev());
        assert_eq!(controller.current(), 1);
    }
}
