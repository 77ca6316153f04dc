//! Termination logic for the comment-dialog auto-scroll loop.
//!
//! The loop itself runs against a live page; the decision of *when to stop*
//! is kept here as a pure state machine so the bounds can be tested without
//! a browser.

/// Scroll height stable for this many consecutive increments means the
/// thread is fully loaded.
pub const STABLE_INCREMENTS: usize = 3;
/// Hard cap on increments; bounds scraping time on endless threads.
pub const MAX_INCREMENTS: usize = 15;

/// Verdict after observing one scroll increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Keep scrolling.
    Continue,
    /// Height unchanged for [`STABLE_INCREMENTS`] increments.
    Stable,
    /// [`MAX_INCREMENTS`] reached without stabilizing.
    Exhausted,
}

/// Tracks scroll-height growth across increments.
#[derive(Debug, Default)]
pub struct ScrollProbe {
    increments: usize,
    stable_count: usize,
    last_height: Option<i64>,
}

impl ScrollProbe {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of increments observed so far.
    #[must_use]
    pub fn increments(&self) -> usize {
        self.increments
    }

    /// Record the scroll height seen after one increment and decide whether
    /// to continue.
    pub fn observe(&mut self, scroll_height: i64) -> Verdict {
        self.increments += 1;

        if self.last_height == Some(scroll_height) {
            self.stable_count += 1;
        } else {
            self.stable_count = 0;
        }
        self.last_height = Some(scroll_height);

        if self.stable_count >= STABLE_INCREMENTS {
            Verdict::Stable
        } else if self.increments >= MAX_INCREMENTS {
            Verdict::Exhausted
        } else {
            Verdict::Continue
        }
    }
}
