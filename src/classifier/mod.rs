//! Page-kind classification from the observed URL.
//!
//! The host site is a single-page application, so classification is
//! re-evaluated every time the watched URL changes; the result decides which
//! injection strategy the controller runs.

use crate::models::Platform;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// What kind of page the controller is currently attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// A single account page; imports go straight through as one lead.
    Profile(Platform),
    /// Anything else on a supported host: treat as a feed of posts.
    Feed,
}

/// Bare vanity path: one segment of word characters and dots, e.g. `/jane.doe123`.
static VANITY_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/[A-Za-z0-9.]+/?$").expect("BUG: hardcoded vanity-path regex is invalid")
});

/// Decide which extraction strategy applies to `url`.
///
/// Instagram hosts are always profile pages for our purposes; on Facebook a
/// bare-username path or `/profile.php` is a profile, everything else is a
/// feed. Unparseable URLs fall back to `Feed`, which injects nothing until a
/// post action bar is actually found.
#[must_use]
pub fn classify(url: &str) -> PageKind {
    let Ok(parsed) = Url::parse(url) else {
        return PageKind::Feed;
    };
    let host = parsed.host_str().unwrap_or_default();

    if host.contains("instagram.com") {
        return PageKind::Profile(Platform::Instagram);
    }

    if host.contains("facebook.com") {
        let path = parsed.path();
        if path.starts_with("/profile.php") || VANITY_PATH.is_match(path) {
            return PageKind::Profile(Platform::Facebook);
        }
    }

    PageKind::Feed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instagram_is_profile() {
        assert_eq!(
            classify("https://www.instagram.com/jane.doe/"),
            PageKind::Profile(Platform::Instagram)
        );
    }

    #[test]
    fn facebook_vanity_path_is_profile() {
        assert_eq!(
            classify("https://www.facebook.com/jane.doe123"),
            PageKind::Profile(Platform::Facebook)
        );
        assert_eq!(
            classify("https://www.facebook.com/jane.doe123/"),
            PageKind::Profile(Platform::Facebook)
        );
    }

    #[test]
    fn facebook_profile_php_is_profile() {
        assert_eq!(
            classify("https://www.facebook.com/profile.php?id=1234"),
            PageKind::Profile(Platform::Facebook)
        );
    }

    #[test]
    fn facebook_multi_segment_is_feed() {
        assert_eq!(
            classify("https://www.facebook.com/groups/123456/posts/789"),
            PageKind::Feed
        );
        assert_eq!(classify("https://www.facebook.com/watch/live"), PageKind::Feed);
    }

    #[test]
    fn root_feed_is_feed() {
        // "/" is technically a vanity-shaped path but classification of the
        // homepage as a profile would be wrong; the regex requires at least
        // one path character.
        assert_eq!(classify("https://www.facebook.com/"), PageKind::Feed);
    }

    #[test]
    fn garbage_is_feed() {
        assert_eq!(classify("not a url"), PageKind::Feed);
    }
}
