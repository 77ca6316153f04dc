//! JavaScript evaluated in-page by the comment-thread locator.
//!
//! Each script is an IIFE returning a JSON-serializable value. Scripts that
//! need to address a specific post substitute `__POST__`, which is always an
//! internally generated `[data-leadscout-post='<n>']` selector and never
//! user input, so plain string substitution is safe.

/// Placeholder replaced with the post-root selector.
pub const POST_PLACEHOLDER: &str = "__POST__";

/// Click the "N comments" call-to-action inside a post subtree.
///
/// Returns `true` when a matching element was clicked. Counts may be
/// abbreviated ("1.2K comments").
pub const CLICK_COMMENT_CTA: &str = r#"
    (() => {
        const root = document.querySelector("__POST__");
        if (!root) return false;
        const cta = /^\s*\d+(?:[.,]\d+)?\s*[KM]?\s*comments?\s*$/i;
        const candidates = root.querySelectorAll("[role='button'], span, div");
        for (const el of candidates) {
            const text = (el.textContent ?? "").trim();
            if (cta.test(text)) {
                try { el.click(); } catch (_) { }
                return true;
            }
        }
        return false;
    })()
"#;

/// Is a dialog-role element mounted anywhere on the page?
pub const DIALOG_PRESENT: &str = r#"
    (() => !!document.querySelector("[role='dialog']"))()
"#;

/// Click every "View N more comments/replies" expander currently visible.
///
/// Scoped to the open dialog when one exists, else to the post subtree.
/// Returns the number of elements clicked.
pub const EXPAND_MORE: &str = r#"
    (() => {
        const scope = document.querySelector("[role='dialog']")
            ?? document.querySelector("__POST__")
            ?? document.body;
        const patterns = [
            /^View \d+ more comments?/i,
            /^View \d+ more repl/i,
            /^View more comments$/i,
            /^View more replies$/i,
        ];
        let clicked = 0;
        for (const el of scope.querySelectorAll("[role='button'], span, div")) {
            const text = (el.textContent ?? "").trim();
            if (patterns.some((p) => p.test(text))) {
                try { el.click(); clicked++; } catch (_) { }
            }
        }
        return clicked;
    })()
"#;

/// Scroll the dialog's internal scrollable region by one fixed increment.
///
/// The region is found heuristically: the first descendant whose scroll
/// height exceeds its client height. Returns the region's scroll height
/// after the increment, or -1 when no scrollable region exists.
pub const SCROLL_STEP: &str = r#"
    (() => {
        const dialog = document.querySelector("[role='dialog']");
        if (!dialog) return -1;
        let region = null;
        for (const el of dialog.querySelectorAll("div")) {
            if (el.scrollHeight > el.clientHeight) { region = el; break; }
        }
        if (!region) return -1;
        region.scrollTop += 800;
        return region.scrollHeight;
    })()
"#;

/// Serialize the best available thread subtree.
///
/// Preference order mirrors the shapes the host presents: an explicit modal,
/// any dialog, the post's own subtree, and finally the whole body. Always
/// returns something; partial results beat none.
pub const THREAD_SNAPSHOT: &str = r#"
    (() => {
        const scopes = [
            document.querySelector("[role='dialog'][aria-modal='true']"),
            document.querySelector("[role='dialog']"),
            document.querySelector("__POST__"),
            document.body,
        ];
        for (const scope of scopes) {
            if (scope) return scope.outerHTML;
        }
        return "";
    })()
"#;

/// Substitute the post-root selector into a script template.
#[must_use]
pub fn with_post_selector(script: &str, post_selector: &str) -> String {
    script.replace(POST_PLACEHOLDER, post_selector)
}
