//! Product image URLs and hover rotation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};

/// How long each image shows while a card is hovered.
pub const ROTATION_INTERVAL: Duration = Duration::from_secs(2);

const IMGUR_PAGE_PREFIX: &str = "https://imgur.com/";

/// Turn an imgur page link into a direct image link.
///
/// `https://imgur.com/abc123/extra?x=1` becomes `https://i.imgur.com/abc123.png`.
/// Direct links and other hosts are returned unchanged.
#[must_use]
pub fn normalize_image_url(url: &str) -> String {
    if url.contains("i.imgur.com") {
        return url.to_string();
    }
    let Some(rest) = url.strip_prefix(IMGUR_PAGE_PREFIX) else {
        return url.to_string();
    };
    let id = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    if id.is_empty() {
        return url.to_string();
    }
    format!("https://i.imgur.com/{id}.png")
}

/// Cycles a product card through its images while the pointer is over it.
///
/// At most one timer exists per card: entering again replaces the running
/// timer, and leaving cancels it and shows the first image. Must be driven
/// from inside a Tokio runtime.
#[derive(Debug)]
pub struct HoverRotation {
    image_count: usize,
    current: Arc<AtomicUsize>,
    timer: Option<JoinHandle<()>>,
}

impl HoverRotation {
    #[must_use]
    pub fn new(image_count: usize) -> Self {
        Self {
            image_count,
            current: Arc::new(AtomicUsize::new(0)),
            timer: None,
        }
    }

    /// Index of the image currently shown.
    #[must_use]
    pub fn current(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    /// Whether a rotation timer is running.
    #[must_use]
    pub const fn is_rotating(&self) -> bool {
        self.timer.is_some()
    }

    /// Pointer entered the card. Cards with a single image never rotate.
    pub fn hover_enter(&mut self) {
        self.cancel();
        if self.image_count <= 1 {
            return;
        }

        let count = self.image_count;
        let current = Arc::clone(&self.current);
        self.timer = Some(tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + ROTATION_INTERVAL, ROTATION_INTERVAL);
            loop {
                ticks.tick().await;
                let next = (current.load(Ordering::Relaxed) + 1) % count;
                current.store(next, Ordering::Relaxed);
            }
        }));
    }

    /// Pointer left the card: stop and go back to the first image.
    pub fn hover_leave(&mut self) {
        self.cancel();
        self.current.store(0, Ordering::Relaxed);
    }

    fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for HoverRotation {
    fn drop(&mut self) {
        self.cancel();
    }
}
