//! Comment-thread location and expansion.
//!
//! Given a feed post's root element, make sure the full comment thread is
//! loaded and visible before extraction: open the comment dialog, expand
//! truncated replies, auto-scroll the dialog's lazy-loading region until it
//! stops growing, then hand back an HTML snapshot of the best subtree.
//!
//! The host mounts threads in three shapes (no modal yet, an already-open
//! modal, or an embedded inline thread) and every step degrades gracefully:
//! a missing element narrows the snapshot, it never aborts the import
//! (except the one case where we opened a dialog and it never arrived).

pub mod js_scripts;
pub mod scroll;

use anyhow::{Context, Result};
use chromiumoxide::Page;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use js_scripts::with_post_selector;
use scroll::{ScrollProbe, Verdict};

/// How often to re-check for the dialog after clicking the CTA.
const DIALOG_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// How long to wait for the dialog before giving up on this post.
const DIALOG_TIMEOUT: Duration = Duration::from_secs(8);
/// Pause between scroll increments, giving lazy loading time to fire.
const SCROLL_INTERVAL: Duration = Duration::from_millis(600);
/// Quiet period after scrolling so final lazy-rendered nodes can mount.
const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Ways thread location can fail for one import attempt.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    /// We clicked a comments CTA but no dialog ever mounted.
    #[error("could not open post")]
    DialogTimeout,
    #[error(transparent)]
    Browser(#[from] anyhow::Error),
}

pub(crate) async fn eval<T: serde::de::DeserializeOwned>(page: &Page, script: String) -> Result<T> {
    let result = page
        .evaluate(script)
        .await
        .context("failed to evaluate injected script")?;
    result
        .into_value()
        .map_err(|e| anyhow::anyhow!("injected script returned unexpected value: {e}"))
}

/// Ensure the thread behind `post_selector` is fully loaded and return an
/// HTML snapshot of the widest subtree that contains it.
pub async fn load_thread(page: &Page, post_selector: &str) -> Result<String, LocateError> {
    // Step 1: open the dialog if the post offers a comments CTA.
    let clicked: bool = eval(
        page,
        with_post_selector(js_scripts::CLICK_COMMENT_CTA, post_selector),
    )
    .await?;

    if clicked {
        // Step 2: the dialog mounts asynchronously; poll for it. A timeout
        // here means the click went somewhere unexpected, so the attempt is
        // aborted rather than scraping a page we did not intend to open.
        wait_for_dialog(page).await?;
    } else {
        debug!("no comments CTA found; assuming open modal or inline thread");
    }

    // Step 3 + 4: expand truncated replies, interleaved with auto-scroll.
    expand_more(page, post_selector).await;
    auto_scroll(page, post_selector).await;

    // Step 5: settle before snapshotting so the last batch of comments
    // actually exists in the DOM.
    tokio::time::sleep(SETTLE_DELAY).await;

    let html: String = eval(
        page,
        with_post_selector(js_scripts::THREAD_SNAPSHOT, post_selector),
    )
    .await?;
    debug!(bytes = html.len(), "thread snapshot captured");
    Ok(html)
}

async fn wait_for_dialog(page: &Page) -> Result<(), LocateError> {
    let start = Instant::now();
    loop {
        let present: bool = eval(page, js_scripts::DIALOG_PRESENT.to_string()).await?;
        if present {
            debug!(elapsed = ?start.elapsed(), "comment dialog mounted");
            return Ok(());
        }
        if start.elapsed() >= DIALOG_TIMEOUT {
            return Err(LocateError::DialogTimeout);
        }
        tokio::time::sleep(DIALOG_POLL_INTERVAL).await;
    }
}

/// Click every visible reply expander. Failures are logged, not propagated:
/// a thread we could not expand is still worth scraping.
async fn expand_more(page: &Page, post_selector: &str) {
    match eval::<i64>(
        page,
        with_post_selector(js_scripts::EXPAND_MORE, post_selector),
    )
    .await
    {
        Ok(clicked) if clicked > 0 => debug!(clicked, "expanded hidden comments"),
        Ok(_) => {}
        Err(e) => warn!("expanding comments failed: {e:#}"),
    }
}

/// Scroll the dialog's lazy-loading region until its height stabilizes or
/// the increment cap is reached, re-running the expander after each step.
async fn auto_scroll(page: &Page, post_selector: &str) {
    let mut probe = ScrollProbe::new();
    loop {
        let height: i64 = match eval(page, js_scripts::SCROLL_STEP.to_string()).await {
            Ok(h) => h,
            Err(e) => {
                warn!("scroll step failed: {e:#}");
                return;
            }
        };
        if height < 0 {
            // No dialog or no scrollable region; inline threads land here.
            debug!("no scrollable region; skipping auto-scroll");
            return;
        }

        expand_more(page, post_selector).await;

        match probe.observe(height) {
            Verdict::Continue => tokio::time::sleep(SCROLL_INTERVAL).await,
            Verdict::Stable => {
                debug!(increments = probe.increments(), "scroll height stabilized");
                return;
            }
            Verdict::Exhausted => {
                debug!("scroll increment cap reached");
                return;
            }
        }
    }
}
