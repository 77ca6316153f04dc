//! Profile-link classification and canonicalization.
//!
//! The same account surfaces under several distinct URL shapes on a single
//! page load (comment permalinks, group-member links, vanity paths,
//! `profile.php?id=` with tracking noise). Everything downstream, from dedup
//! to backend cross-session reconciliation, needs one stable
//! identity string per account, so every accepted link is funneled through
//! [`normalize`] before it leaves the extractor.

use url::Url;

/// Path segments that can never be an individual account page.
const REJECTED_SEGMENTS: &[&str] = &[
    "pages",
    "events",
    "marketplace",
    "watch",
    "stories",
    "hashtag",
    "gaming",
    "notifications",
    "settings",
    "help",
    "ads",
    "permalink",
    "photo",
    "video",
];

fn path_segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default()
}

fn id_query_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.into_owned())
}

fn is_supported_host(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|h| h.contains("facebook.com") || h.contains("instagram.com"))
}

/// Is this link profile-shaped: an individual account page rather than a
/// group/event/media asset?
#[must_use]
pub fn is_profile_shaped(href: &str) -> bool {
    let Ok(url) = Url::parse(href) else {
        return false;
    };
    if !is_supported_host(&url) {
        return false;
    }

    let segments = path_segments(&url);

    // External-redirect trampoline
    if segments.first() == Some(&"l.php") {
        return false;
    }

    if segments
        .iter()
        .any(|seg| REJECTED_SEGMENTS.contains(seg))
    {
        return false;
    }

    // Group links only identify a person when a member segment is present.
    if segments.contains(&"groups") {
        return segments.contains(&"user");
    }

    if id_query_param(&url).is_some() {
        return true;
    }

    if segments.contains(&"people") || segments.contains(&"user") {
        return true;
    }

    // Bare vanity path: exactly one segment of at least 2 characters.
    // `/profile.php` without an id identifies nobody.
    matches!(segments.as_slice(), [seg] if seg.len() >= 2 && *seg != "profile.php")
}

/// Collapse an accepted profile link to its canonical identity string.
///
/// Canonical forms, in match order:
/// - `.../groups/<gid>/user/<uid>/...`  → `https://<host>/profile.php?id=<uid>`
/// - any URL carrying `?id=<uid>`       → `https://<host>/profile.php?id=<uid>`
/// - `/people/<name>/<id>`              → `https://<host>/people/<name>/<id>`
/// - single-segment vanity path         → `https://<host>/<segment>`
///
/// Query noise, fragments, and trailing slashes are stripped in every form.
/// The function is total and idempotent: anything that matches no form comes
/// back with only the noise removed.
#[must_use]
pub fn normalize(href: &str) -> String {
    let Ok(url) = Url::parse(href) else {
        return href.to_string();
    };
    let Some(host) = url.host_str() else {
        return href.to_string();
    };

    let segments: Vec<String> = path_segments(&url)
        .into_iter()
        .map(str::to_string)
        .collect();

    // Group member links carry the uid right after the "user" segment.
    if let Some(pos) = segments.iter().position(|s| s == "user")
        && segments.first().map(String::as_str) == Some("groups")
        && let Some(uid) = segments.get(pos + 1)
    {
        return format!("https://{host}/profile.php?id={uid}");
    }

    if let Some(uid) = id_query_param(&url) {
        return format!("https://{host}/profile.php?id={uid}");
    }

    if segments.first().map(String::as_str) == Some("people") && segments.len() >= 3 {
        return format!("https://{host}/people/{}/{}", segments[1], segments[2]);
    }

    if let [seg] = segments.as_slice() {
        return format!("https://{host}/{seg}");
    }

    // No canonical form applies: strip query/fragment/trailing slash only.
    let path = url.path().trim_end_matches('/');
    format!("https://{host}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_platform_hosts() {
        assert!(!is_profile_shaped("https://example.com/jane.doe"));
        assert!(!is_profile_shaped("not a url"));
    }

    #[test]
    fn rejects_redirect_trampoline() {
        assert!(!is_profile_shaped(
            "https://l.facebook.com/l.php?u=https%3A%2F%2Fexample.com"
        ));
    }

    #[test]
    fn rejects_asset_segments() {
        for href in [
            "https://www.facebook.com/events/12345",
            "https://www.facebook.com/marketplace/item/1",
            "https://www.facebook.com/watch/?v=123",
            "https://www.facebook.com/jane/videos/video/999",
            "https://www.facebook.com/photo/?fbid=1",
            "https://www.facebook.com/permalink/123",
            "https://www.facebook.com/hashtag/rust",
        ] {
            assert!(!is_profile_shaped(href), "should reject {href}");
        }
    }

    #[test]
    fn group_links_need_user_segment() {
        assert!(!is_profile_shaped(
            "https://www.facebook.com/groups/123/posts/456"
        ));
        assert!(is_profile_shaped(
            "https://www.facebook.com/groups/123/user/789/"
        ));
    }

    #[test]
    fn accepts_id_query_and_people_and_vanity() {
        assert!(is_profile_shaped(
            "https://www.facebook.com/profile.php?id=123&ref=abc"
        ));
        assert!(is_profile_shaped(
            "https://www.facebook.com/people/Jane-Doe/100012345"
        ));
        assert!(is_profile_shaped("https://www.facebook.com/jane.doe123"));
        assert!(is_profile_shaped("https://www.instagram.com/jane.doe/"));
    }

    #[test]
    fn rejects_single_character_vanity() {
        assert!(!is_profile_shaped("https://www.facebook.com/a"));
    }

    #[test]
    fn normalizes_group_member_link() {
        assert_eq!(
            normalize("https://www.facebook.com/groups/123/user/789/?ref=feed"),
            "https://www.facebook.com/profile.php?id=789"
        );
    }

    #[test]
    fn strips_query_noise_from_profile_php() {
        let canonical = "https://www.facebook.com/profile.php?id=123";
        assert_eq!(
            normalize("https://www.facebook.com/profile.php?id=123&ref=abc"),
            canonical
        );
        assert_eq!(normalize("https://www.facebook.com/profile.php?id=123"), canonical);
    }

    #[test]
    fn normalizes_vanity_path() {
        assert_eq!(
            normalize("https://www.facebook.com/jane.doe123/?comment_id=9"),
            "https://www.facebook.com/jane.doe123"
        );
    }

    #[test]
    fn normalizes_people_path() {
        assert_eq!(
            normalize("https://www.facebook.com/people/Jane-Doe/100012345/?sk=about"),
            "https://www.facebook.com/people/Jane-Doe/100012345"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        for href in [
            "https://www.facebook.com/groups/123/user/789/",
            "https://www.facebook.com/profile.php?id=123&ref=abc",
            "https://www.facebook.com/jane.doe123/",
            "https://www.facebook.com/people/Jane-Doe/100012345/",
            "https://www.instagram.com/jane.doe/",
        ] {
            let once = normalize(href);
            assert_eq!(normalize(&once), once, "not idempotent for {href}");
        }
    }
}
