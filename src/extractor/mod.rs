//! Author-record extraction from a comment-thread HTML snapshot.
//!
//! This is the adversarial-parsing core: the host page has no grammar, its
//! markup shifts between sessions, and most anchors inside a comment node are
//! noise (timestamps, reaction verbs, permalinks, page links). Extraction is
//! a pure function of the snapshot (no network, no DOM mutation) so the
//! whole rule cascade is exercisable from fixtures.

use crate::models::{CandidateLead, Platform};
use crate::profile_url;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Display names shorter than this are UI debris, not people.
const MIN_NAME_CHARS: usize = 2;
/// Empirically tuned cap; longer anchor text is a caption or a shared post.
const MAX_NAME_CHARS: usize = 80;
/// Nodes wrapping more than this many articles are thread containers, not
/// individual comments; re-processing them would double-count.
const MAX_NESTED_ARTICLES: usize = 3;
/// All-caps text beyond this length is a page/brand name, not a person.
const ALL_CAPS_NAME_LIMIT: usize = 8;

/// Image hosts the platforms serve avatars from.
const AVATAR_CDN_FRAGMENTS: &[&str] = &["fbcdn", "scontent", "cdninstagram"];

static ARTICLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[role='article']")
        .expect("BUG: hardcoded CSS selector \"[role='article']\" is invalid")
});

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").expect("BUG: hardcoded CSS selector 'a[href]' is invalid")
});

static IMG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("img[src]").expect("BUG: hardcoded CSS selector 'img[src]' is invalid")
});

static SVG_IMAGE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("svg image").expect("BUG: hardcoded CSS selector 'svg image' is invalid")
});

/// Decorative avatar anchors: hidden from the accessibility tree or taken
/// out of tab order.
static HIDDEN_ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[aria-hidden='true'], a[tabindex='-1']")
        .expect("BUG: hardcoded hidden-anchor selector is invalid")
});

/// Short relative timestamps: "6m", "1h", "20h", "3d", "2w", "1y".
static SHORT_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d+[smhdwy]$").expect("BUG: short-time regex is invalid")
});

/// Spelled-out relative timestamps: "5 minutes", "2 hours ago", "1 day".
static LONG_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d+\s*(sec|second|min|minute|hour|day|week|month|year)")
        .expect("BUG: long-time regex is invalid")
});

/// Closed set of UI action words the host renders as links.
static ACTION_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(Like|Comment|Reply|Share|See more|Follow|Add friend|Author|Top fan|View)$",
    )
    .expect("BUG: action-word regex is invalid")
});

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("BUG: numeric regex is invalid"));

/// Does this anchor text plausibly name a person?
///
/// Rejects timestamps, UI action words, handles, long all-caps brand labels,
/// and bare numbers. Deliberately loose beyond that; the profile-shaped URL
/// gate carries the rest of the disambiguation.
fn is_plausible_name(text: &str) -> bool {
    let len = text.chars().count();
    if !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&len) {
        return false;
    }
    if SHORT_TIME.is_match(text) || LONG_TIME.is_match(text) {
        return false;
    }
    if ACTION_WORD.is_match(text) {
        return false;
    }
    if text.contains('@') {
        return false;
    }
    if len > ALL_CAPS_NAME_LIMIT && text == text.to_uppercase() {
        return false;
    }
    if NUMERIC.is_match(text) {
        return false;
    }
    true
}

/// Resolve a (possibly relative) href against the page URL.
fn resolve_href(base: &Url, href: &str) -> Option<String> {
    base.join(href).ok().map(String::from)
}

/// Scan a comment node's anchors in document order and return the first
/// (name, raw profile URL) pair that survives the full rule cascade.
fn find_author(node: ElementRef<'_>, base: &Url) -> Option<(String, String)> {
    for anchor in node.select(&ANCHOR_SELECTOR) {
        let text = anchor.text().collect::<String>();
        let text = text.trim();
        if !is_plausible_name(text) {
            continue;
        }

        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(abs) = resolve_href(base, href) else {
            continue;
        };
        if !profile_url::is_profile_shaped(&abs) {
            continue;
        }

        return Some((text.to_string(), abs));
    }
    None
}

fn is_avatar_src(src: &str) -> bool {
    AVATAR_CDN_FRAGMENTS.iter().any(|frag| src.contains(frag))
}

/// Best-effort avatar lookup inside one comment node.
///
/// The platforms render the avatar inside a decorative anchor, either as a
/// plain `<img>` or as an inline `<svg><image>` with an href-style
/// attribute; fall back to any CDN-hosted image anywhere in the node.
fn find_avatar(node: ElementRef<'_>, base: &Url) -> Option<String> {
    for hidden in node.select(&HIDDEN_ANCHOR_SELECTOR) {
        for img in hidden.select(&IMG_SELECTOR) {
            if let Some(src) = img.value().attr("src")
                && is_avatar_src(src)
            {
                return resolve_href(base, src);
            }
        }
        for image in hidden.select(&SVG_IMAGE_SELECTOR) {
            let href = image
                .value()
                .attr("xlink:href")
                .or_else(|| image.value().attr("href"));
            if let Some(src) = href
                && is_avatar_src(src)
            {
                return resolve_href(base, src);
            }
        }
    }

    node.select(&IMG_SELECTOR)
        .filter_map(|img| img.value().attr("src"))
        .find(|src| is_avatar_src(src))
        .and_then(|src| resolve_href(base, src))
}

/// Extract candidate leads from a comment-thread snapshot.
///
/// `html` is the serialized subtree the locator settled on (dialog, inline
/// thread, or whole post); `page_url` resolves relative hrefs; `platform`
/// is fixed by the host the controller is attached to.
///
/// Within one pass candidates are deduplicated by display name, first-found
/// wins. Two people sharing a name collapse into one record, a documented
/// limitation of the source system, carried as-is.
#[must_use]
pub fn extract(html: &str, page_url: &Url, platform: Platform) -> Vec<CandidateLead> {
    let fragment = Html::parse_fragment(html);
    // parse_fragment wraps the snapshot in a synthetic <html> root; the
    // snapshot's own outermost element is its first element child.
    let snapshot_root_id = fragment
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .next()
        .map(|el| el.id());

    let mut seen: HashSet<String> = HashSet::new();
    let mut leads: Vec<CandidateLead> = Vec::new();

    for node in fragment.select(&ARTICLE_SELECTOR) {
        // The snapshot root is the post itself, not a comment.
        if Some(node.id()) == snapshot_root_id {
            continue;
        }
        // Thread wrappers re-contain the comments we will visit anyway.
        if node.select(&ARTICLE_SELECTOR).count() > MAX_NESTED_ARTICLES {
            continue;
        }

        // Nodes with no qualifying anchor are expected noise, not errors.
        let Some((name, raw_url)) = find_author(node, page_url) else {
            continue;
        };
        if !seen.insert(name.clone()) {
            continue;
        }

        leads.push(CandidateLead {
            name,
            profile_url: profile_url::normalize(&raw_url),
            platform,
            avatar_url: find_avatar(node, page_url),
        });
    }

    tracing::debug!(count = leads.len(), "extraction pass complete");
    leads
}
