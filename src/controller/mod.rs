//! Session controller: watches the page the user is browsing, injects the
//! matching UI, and reacts to the clicks the injected UI reports.
//!
//! The controller is a single task built around `tokio::select!` over three
//! tickers: a 1s URL watch, a 2.5s feed button sweep, and a 300ms event
//! poll. Navigation tears down every injected element before the UI for the
//! new page goes in, so nothing leaks across pages.

use std::time::Duration;

use anyhow::Result;
use chromiumoxide::Page;
use tracing::{debug, info, warn};
use url::Url;

use crate::bridge::{Bridge, BridgeMessage, BridgeResponse};
use crate::classifier::{self, PageKind};
use crate::extractor;
use crate::inject::{self, UiEvent};
use crate::locator::{self, LocateError, eval};
use crate::models::{CandidateLead, Platform};
use crate::panel::Panel;
use crate::profile_url;

const URL_WATCH_INTERVAL: Duration = Duration::from_secs(1);
const SWEEP_INTERVAL: Duration = Duration::from_millis(2500);
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(300);
/// How long the success state stays on screen before the panel dismisses.
const SUCCESS_LINGER: Duration = Duration::from_secs(2);

/// What UI is currently injected for the page under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Unsupported page, nothing injected.
    Idle,
    Profile(Platform),
    Feed(Platform),
}

/// A mounted selection panel plus the post it was scanned from.
struct OpenPanel {
    panel: Panel,
    post_selector: String,
    platform: Platform,
}

pub struct Controller {
    page: Page,
    bridge: Bridge,
    mode: Mode,
    current_url: Option<Url>,
    open_panel: Option<OpenPanel>,
}

impl Controller {
    #[must_use]
    pub fn new(page: Page, bridge: Bridge) -> Self {
        Self {
            page,
            bridge,
            mode: Mode::Idle,
            current_url: None,
            open_panel: None,
        }
    }

    /// Drive the session until the page goes away.
    pub async fn run(mut self) -> Result<()> {
        let mut url_watch = tokio::time::interval(URL_WATCH_INTERVAL);
        let mut sweep = tokio::time::interval(SWEEP_INTERVAL);
        let mut event_poll = tokio::time::interval(EVENT_POLL_INTERVAL);

        loop {
            tokio::select! {
                _ = url_watch.tick() => {
                    match self.page.url().await {
                        Ok(Some(raw)) => self.on_url(&raw).await,
                        Ok(None) => {}
                        Err(e) => {
                            info!("page is gone, ending session: {e}");
                            break;
                        }
                    }
                }
                _ = sweep.tick() => {
                    if matches!(self.mode, Mode::Feed(_)) {
                        match eval::<i64>(&self.page, inject::SWEEP_FEED_BUTTONS.to_string()).await {
                            Ok(added) if added > 0 => debug!(added, "feed sweep added import buttons"),
                            Ok(_) => {}
                            Err(e) => debug!("feed sweep failed (page busy?): {e}"),
                        }
                    }
                }
                _ = event_poll.tick() => {
                    if self.mode == Mode::Idle {
                        continue;
                    }
                    let events = match eval::<Vec<UiEvent>>(&self.page, inject::POLL_EVENTS.to_string()).await {
                        Ok(events) => events,
                        Err(e) => {
                            debug!("event poll failed (page busy?): {e}");
                            continue;
                        }
                    };
                    for event in events {
                        if let Err(e) = self.on_event(event).await {
                            warn!("failed to handle UI event: {e}");
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// React to the URL watch: re-classify on change and swap the UI.
    async fn on_url(&mut self, raw: &str) {
        let Ok(url) = Url::parse(raw) else {
            return;
        };
        if self.current_url.as_ref() == Some(&url) {
            return;
        }
        info!(url = %url, "navigation detected");
        self.current_url = Some(url.clone());
        self.open_panel = None;
        if let Err(e) = eval::<bool>(&self.page, inject::TEARDOWN_UI.to_string()).await {
            debug!("teardown on navigation failed: {e}");
        }

        self.mode = match classifier::classify(url.as_str()) {
            PageKind::Profile(platform) => Mode::Profile(platform),
            PageKind::Feed => match url.host_str().and_then(Platform::from_host) {
                Some(platform) => Mode::Feed(platform),
                None => Mode::Idle,
            },
        };

        match self.mode {
            Mode::Profile(platform) => {
                debug!(?platform, "profile page, injecting import button");
                if let Err(e) = eval::<bool>(&self.page, inject::PROFILE_BUTTON.to_string()).await {
                    debug!("profile button injection failed: {e}");
                }
            }
            Mode::Feed(platform) => {
                debug!(?platform, "feed page, sweeping for action bars");
            }
            Mode::Idle => debug!("unsupported page, staying idle"),
        }
    }

    async fn on_event(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::ProfileImport => self.import_profile().await,
            UiEvent::ImportPost { post } => self.import_post(post).await,
            UiEvent::Toggle { index, checked } => {
                if let Some(open) = self.open_panel.as_mut() {
                    open.panel.apply_toggle(index, checked);
                }
                Ok(())
            }
            UiEvent::ToggleAll { checked } => {
                if let Some(open) = self.open_panel.as_mut() {
                    open.panel.apply_toggle_all(checked);
                }
                Ok(())
            }
            UiEvent::Rescan => self.rescan().await,
            UiEvent::Submit => self.submit().await,
            UiEvent::Close => {
                self.open_panel = None;
                Ok(())
            }
        }
    }

    /// Profile flow: read the name off the page, normalize the URL, send.
    async fn import_profile(&mut self) -> Result<()> {
        let Mode::Profile(platform) = self.mode else {
            return Ok(());
        };
        let Some(url) = self.current_url.clone() else {
            return Ok(());
        };

        let name: Option<String> = eval(&self.page, inject::PAGE_NAME.to_string()).await?;
        let Some(name) = name.filter(|n| !n.is_empty()) else {
            self.toast("Could not read the profile name from this page.", true)
                .await;
            return Ok(());
        };

        let lead = CandidateLead {
            name: name.clone(),
            profile_url: profile_url::normalize(url.as_str()),
            platform,
            avatar_url: None,
        };

        match self.bridge.send(BridgeMessage::SendLead(lead)).await {
            Ok(BridgeResponse { success: true, .. }) => {
                self.toast(&format!("{name} added to your pipeline"), false)
                    .await;
            }
            Ok(response) => {
                let message = response
                    .error
                    .unwrap_or_else(|| "Failed to send lead".to_string());
                self.toast(&message, true).await;
            }
            Err(e) => self.toast(&e.to_string(), true).await,
        }
        Ok(())
    }

    /// Feed flow: open the thread under the tagged post, extract commenters,
    /// and mount the selection panel.
    async fn import_post(&mut self, post: u32) -> Result<()> {
        let Mode::Feed(platform) = self.mode else {
            return Ok(());
        };
        if self.open_panel.is_some() {
            debug!("import requested while a panel is open, ignoring");
            return Ok(());
        }
        let Some(url) = self.current_url.clone() else {
            return Ok(());
        };

        self.toast("Scanning comments...", false).await;
        let post_selector = format!("[data-leadscout-post='{post}']");

        let html = match locator::load_thread(&self.page, &post_selector).await {
            Ok(html) => html,
            Err(LocateError::DialogTimeout) => {
                self.toast(&LocateError::DialogTimeout.to_string(), true)
                    .await;
                return Ok(());
            }
            Err(LocateError::Browser(e)) => return Err(e),
        };

        let candidates = extractor::extract(&html, &url, platform);
        if candidates.is_empty() {
            self.toast(
                "No commenters found. Try scrolling to load comments first.",
                true,
            )
            .await;
            return Ok(());
        }

        info!(count = candidates.len(), "mounting selection panel");
        let panel = Panel::mount(&self.page, candidates).await?;
        self.open_panel = Some(OpenPanel {
            panel,
            post_selector,
            platform,
        });
        Ok(())
    }

    /// Re-run the locator against the same post and grow the open panel.
    async fn rescan(&mut self) -> Result<()> {
        let Some(open) = self.open_panel.as_mut() else {
            return Ok(());
        };
        let Some(url) = self.current_url.clone() else {
            return Ok(());
        };

        open.panel
            .show_status(&self.page, "Re-scanning...", false)
            .await?;
        let html = match locator::load_thread(&self.page, &open.post_selector).await {
            Ok(html) => html,
            Err(e) => {
                open.panel.show_status(&self.page, &e.to_string(), true).await?;
                return Ok(());
            }
        };

        let fresh = extractor::extract(&html, &url, open.platform);
        let added = open.panel.merge_and_remount(&self.page, fresh).await?;
        let message = match added {
            0 => "No new people found".to_string(),
            1 => "1 new person found".to_string(),
            n => format!("{n} new people found"),
        };
        open.panel.show_status(&self.page, &message, false).await?;
        Ok(())
    }

    /// Submit the ticked leads as one batch through the relay.
    async fn submit(&mut self) -> Result<()> {
        let Some(open) = self.open_panel.as_mut() else {
            return Ok(());
        };

        let payload = match open.panel.state().submission() {
            Ok(payload) => payload,
            Err(message) => {
                open.panel.show_status(&self.page, message, true).await?;
                return Ok(());
            }
        };

        let count = payload.leads.len();
        open.panel.show_submitting(&self.page, count).await?;

        match self.bridge.send(BridgeMessage::SendLeadsBatch(payload)).await {
            Ok(BridgeResponse { success: true, result, .. }) => {
                let imported = result
                    .as_ref()
                    .and_then(|v| v.get("count"))
                    .and_then(serde_json::Value::as_u64)
                    .map_or(count, |n| n as usize);
                open.panel.show_success(&self.page, imported).await?;
                tokio::time::sleep(SUCCESS_LINGER).await;
                if let Some(open) = self.open_panel.take() {
                    open.panel.remove(&self.page).await?;
                }
            }
            Ok(response) => {
                let message = response
                    .error
                    .unwrap_or_else(|| "Failed to send leads".to_string());
                open.panel.show_failure(&self.page, &message).await?;
            }
            Err(e) => {
                let message = e.to_string();
                open.panel.show_failure(&self.page, &message).await?;
            }
        }
        Ok(())
    }

    /// Best-effort toast; a failed toast never fails the flow it decorates.
    async fn toast(&self, message: &str, is_error: bool) {
        if let Err(e) = eval::<bool>(&self.page, inject::toast_script(message, is_error)).await {
            debug!("toast failed: {e}");
        }
    }
}
