//! Browser lifecycle: find or download Chromium, launch it headful, and keep
//! the CDP event handler task tracked so it can be stopped.
//!
//! Sessions run with a visible window: the user browses and logs in
//! themselves, we only attach to the page. By default the profile lives
//! under the user's config directory so logins survive across runs; an
//! ephemeral temp profile is available for one-off sessions and is removed
//! on shutdown.

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Where the browser profile lives for this session.
#[derive(Debug, Clone)]
pub enum Profile {
    /// `~/.config/leadscout/profile`; logins persist across runs.
    Persistent,
    /// Unique temp directory, removed when the session ends.
    Ephemeral,
}

/// A launched browser plus its event handler task.
///
/// The handler MUST be aborted when the browser goes away, otherwise the
/// task keeps polling a dead websocket. `Drop` takes care of it.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    ephemeral_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Open a tab on `url` for the user to browse.
    pub async fn open_page(&self, url: &str) -> Result<Page> {
        self.browser
            .new_page(url)
            .await
            .with_context(|| format!("failed to open page {url}"))
    }

    /// Remove the ephemeral profile directory.
    ///
    /// Call after the browser process has exited; Chrome holds file locks
    /// until then. Blocking `remove_dir_all` because this also runs from
    /// `Drop`, where async is unavailable.
    pub fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.ephemeral_dir.take() {
            info!("removing ephemeral profile: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "failed to remove ephemeral profile {}: {e}. Manual cleanup may be required.",
                    path.display()
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();
        if self.ephemeral_dir.is_some() {
            self.cleanup_temp_dir();
        }
    }
}

/// Launch a headful browser using the given profile strategy.
pub async fn launch(profile: Profile) -> Result<BrowserWrapper> {
    let chrome_path = match find_browser_executable() {
        Ok(path) => path,
        Err(_) => download_managed_browser().await?,
    };

    let (user_data_dir, ephemeral) = match profile {
        Profile::Persistent => {
            let dir = dirs::config_dir()
                .context("could not determine config directory")?
                .join("leadscout")
                .join("profile");
            (dir, false)
        }
        Profile::Ephemeral => {
            let dir = std::env::temp_dir().join(format!("leadscout_chrome_{}", std::process::id()));
            (dir, true)
        }
    };
    std::fs::create_dir_all(&user_data_dir).context("failed to create user data directory")?;

    let browser_config = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1440, 900)
        .user_data_dir(user_data_dir.clone())
        .chrome_executable(chrome_path)
        .with_head()
        .arg(format!("--user-agent={USER_AGENT}"))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--disable-desktop-notifications")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-background-networking")
        .arg("--disable-background-timer-throttling")
        .arg("--disable-backgrounding-occluded-windows")
        .arg("--disable-breakpad")
        .arg("--disable-hang-monitor")
        .arg("--disable-ipc-flooding-protection")
        .arg("--disable-prompt-on-repost")
        .arg("--metrics-recording-only")
        .arg("--password-store=basic")
        .arg("--use-mock-keychain")
        .arg("--mute-audio")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

    info!(profile_dir = %user_data_dir.display(), "launching browser");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let msg = e.to_string();
                // CDP events chromiumoxide doesn't model yet show up as
                // deserialization failures; they are not actionable.
                // https://github.com/mattsse/chromiumoxide/issues/167
                let benign = msg.contains("data did not match any variant of untagged enum Message")
                    || msg.contains("Failed to deserialize WS response");
                if benign {
                    trace!("suppressed benign CDP serialization error: {msg}");
                } else {
                    error!("browser handler error: {e:?}");
                }
            }
        }
        info!("browser event handler task completed");
    });

    Ok(BrowserWrapper {
        browser,
        handler: handler_task,
        ephemeral_dir: ephemeral.then_some(user_data_dir),
    })
}

/// Find a Chrome/Chromium executable on the system.
///
/// `CHROMIUM_PATH` overrides everything; then well-known install paths per
/// platform; then `which` on Unix.
pub fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!(
            "CHROMIUM_PATH points to non-existent file: {}",
            path.display()
        );
    }

    let paths = if cfg!(target_os = "windows") {
        vec![
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        vec![
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        vec![
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for path_str in paths {
        let path = if let Some(rest) = path_str.strip_prefix("~/") {
            match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            }
        } else {
            PathBuf::from(path_str)
        };
        if path.exists() {
            info!("found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in &["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path_str.is_empty() {
                    let path = PathBuf::from(path_str);
                    info!("found browser via 'which': {}", path.display());
                    return Ok(path);
                }
            }
        }
    }

    warn!("no Chrome/Chromium executable found, will download a managed copy");
    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium into the cache directory and return its
/// executable path.
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("leadscout")
        .join("chromium");
    std::fs::create_dir_all(&cache_dir).context("failed to create cache directory")?;

    info!("downloading managed Chromium to {}", cache_dir.display());
    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("failed to build fetcher options")?,
    );
    let revision_info = fetcher.fetch().await.context("failed to fetch browser")?;

    info!(
        "downloaded Chromium to: {}",
        revision_info.folder_path.display()
    );
    Ok(revision_info.executable_path)
}
