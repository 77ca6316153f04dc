//! JavaScript injected into the host page: import buttons, toasts, the
//! selection panel, and the event queue the controller polls.
//!
//! The host page is not ours, so everything injected is namespaced with a
//! `leadscout` marker class/id and must be fully removable by
//! [`TEARDOWN_UI`]. User interactions are never handled in-page beyond
//! cosmetics: clicks are recorded into `window.__leadscoutEvents` and the
//! controller polls and interprets them, keeping the Rust side the single
//! source of truth for selection state.

use serde::Deserialize;

/// One user interaction recorded by the injected UI.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum UiEvent {
    /// Floating profile button clicked.
    ProfileImport,
    /// Feed "Import" button clicked on the post tagged `post`.
    ImportPost { post: u32 },
    /// One candidate checkbox flipped.
    Toggle { index: usize, checked: bool },
    /// The master select-all checkbox flipped.
    ToggleAll { checked: bool },
    /// The panel's re-scan action.
    Rescan,
    /// The panel's submit action.
    Submit,
    /// The panel was dismissed.
    Close,
}

/// Drain and return the queued UI events.
pub const POLL_EVENTS: &str = r#"
    (() => {
        const q = window.__leadscoutEvents ?? [];
        window.__leadscoutEvents = [];
        return q;
    })()
"#;

/// Remove every piece of injected UI and drop queued events.
///
/// Run on navigation and on session teardown; must leave the host page
/// exactly as found.
pub const TEARDOWN_UI: &str = r#"
    (() => {
        document.querySelectorAll(".leadscout-btn").forEach((el) => el.remove());
        document.getElementById("leadscout-toast")?.remove();
        document.getElementById("leadscout-panel")?.remove();
        window.__leadscoutEvents = [];
        return true;
    })()
"#;

/// Inject the floating "Add to Pipeline" button on profile pages.
pub const PROFILE_BUTTON: &str = r#"
    (() => {
        if (document.querySelector(".leadscout-btn")) return false;
        window.__leadscoutEvents = window.__leadscoutEvents ?? [];
        const wrap = document.createElement("div");
        wrap.className = "leadscout-btn";
        wrap.style.cssText = "position:fixed; bottom:24px; right:24px; z-index:99999;";
        wrap.innerHTML = `
            <div style="
                background:#2563eb; color:white; padding:12px 20px;
                border-radius:50px; font-family:-apple-system,sans-serif;
                font-size:14px; font-weight:600; cursor:pointer;
                box-shadow:0 4px 24px rgba(0,0,0,0.25); user-select:none;
            ">＋ Add to Pipeline</div>
        `;
        wrap.addEventListener("click", () => {
            window.__leadscoutEvents.push({ kind: "profileImport" });
        });
        document.body.appendChild(wrap);
        return true;
    })()
"#;

/// One sweep of the feed: tag untagged post roots and give each action bar
/// an "Import" button. Returns the number of buttons added this sweep.
///
/// Runs repeatedly because the feed mounts new posts continuously.
pub const SWEEP_FEED_BUTTONS: &str = r#"
    (() => {
        window.__leadscoutEvents = window.__leadscoutEvents ?? [];
        window.__leadscoutPostSeq = window.__leadscoutPostSeq ?? 0;

        const findActionBars = () => {
            const toolbars = Array.from(document.querySelectorAll("[role='toolbar']"));
            if (toolbars.length > 0) return toolbars;
            return Array.from(document.querySelectorAll("div")).filter((div) => {
                if (div.children.length < 2 || div.children.length > 10) return false;
                const t = div.innerText ?? "";
                return t.includes("Like") && t.includes("Comment") && t.includes("Share");
            });
        };

        const postRootOf = (bar) => {
            for (const sel of ["[role='article']", "[data-pagelet]", "article"]) {
                const el = bar.closest(sel);
                if (el) return el;
            }
            let el = bar.parentElement;
            for (let i = 0; i < 10 && el; i++) {
                if (el.offsetHeight > 200) return el;
                el = el.parentElement;
            }
            return document.body;
        };

        let added = 0;
        for (const bar of findActionBars()) {
            if (bar.querySelector(".leadscout-btn")) continue;
            const root = postRootOf(bar);
            if (!root.dataset.leadscoutPost) {
                root.dataset.leadscoutPost = String(++window.__leadscoutPostSeq);
            }
            const postId = Number(root.dataset.leadscoutPost);

            const btn = document.createElement("div");
            btn.className = "leadscout-btn";
            btn.style.cssText = `
                display:inline-flex; align-items:center; gap:5px;
                padding:6px 12px; border-radius:6px; cursor:pointer;
                font-family:-apple-system,BlinkMacSystemFont,sans-serif;
                font-size:13px; font-weight:600; color:#7c3aed;
                background:transparent; user-select:none; margin-left:4px;
            `;
            btn.innerHTML = `<span style="font-size:15px">⬇</span> Import`;
            btn.title = "Import commenters into your pipeline";
            btn.addEventListener("click", (e) => {
                e.stopPropagation();
                e.preventDefault();
                window.__leadscoutEvents.push({ kind: "importPost", post: postId });
            });
            bar.appendChild(btn);
            added++;
        }
        return added;
    })()
"#;

/// Read the profile name from the document title, falling back to the
/// `og:title` meta tag. Returns `null` when neither matches.
pub const PAGE_NAME: &str = r#"
    (() => {
        const m = document.title.match(/^(.+?)\s*[|\-–]\s*(Facebook|Instagram)/);
        if (m && m[1]) return m[1].trim();
        const og = document.querySelector('meta[property="og:title"]');
        const content = og?.getAttribute("content");
        return content ? content.split("|")[0].trim() : null;
    })()
"#;

/// Template for the toast; `__MESSAGE__` and `__COLOR__` are substituted by
/// [`toast_script`].
const TOAST_TEMPLATE: &str = r#"
    (() => {
        document.getElementById("leadscout-toast")?.remove();
        const t = document.createElement("div");
        t.id = "leadscout-toast";
        t.textContent = __MESSAGE__;
        t.style.cssText = `
            position:fixed; bottom:80px; right:24px; z-index:2147483647;
            background:__COLOR__; color:white; padding:10px 18px;
            border-radius:8px; font-family:-apple-system,sans-serif;
            font-size:13px; font-weight:500;
            box-shadow:0 4px 12px rgba(0,0,0,0.15);
        `;
        document.body.appendChild(t);
        setTimeout(() => t.remove(), 4000);
        return true;
    })()
"#;

/// Build a toast script for `message`. The message is JSON-encoded, so any
/// user- or server-provided text is safe to embed.
#[must_use]
pub fn toast_script(message: &str, is_error: bool) -> String {
    let encoded = serde_json::to_string(message).unwrap_or_else(|_| "\"\"".to_string());
    let color = if is_error { "#ef4444" } else { "#10b981" };
    TOAST_TEMPLATE
        .replace("__MESSAGE__", &encoded)
        .replace("__COLOR__", color)
}

/// Template for mounting the selection panel; `__ITEMS__` is substituted
/// with a JSON array of `{name, profileUrl, avatarUrl, selected}` rows.
const PANEL_TEMPLATE: &str = r##"
    (() => {
        document.getElementById("leadscout-panel")?.remove();
        window.__leadscoutEvents = window.__leadscoutEvents ?? [];
        const items = __ITEMS__;

        const panel = document.createElement("div");
        panel.id = "leadscout-panel";
        panel.style.cssText = `
            position:fixed; top:0; right:0; width:380px; height:100vh;
            background:white; z-index:2147483647;
            box-shadow:-4px 0 32px rgba(0,0,0,0.18);
            display:flex; flex-direction:column;
            font-family:-apple-system,BlinkMacSystemFont,sans-serif;
        `;

        const short = (u) => u.replace("https://www.facebook.com/", "fb.com/")
                              .replace("https://www.instagram.com/", "ig.com/");
        const rows = items.map((c, i) => `
            <label style="display:flex; align-items:center; gap:12px; padding:10px 12px;
                          border-radius:8px; border:1px solid #e5e7eb; cursor:pointer;">
                <input type="checkbox" class="ls-cb" data-index="${i}" ${c.selected ? "checked" : ""}
                       style="width:15px; height:15px; cursor:pointer; flex-shrink:0;" />
                ${c.avatarUrl
                    ? `<img src="${c.avatarUrl}" style="width:36px;height:36px;border-radius:50%;object-fit:cover;flex-shrink:0;" />`
                    : `<div style="width:36px;height:36px;border-radius:50%;background:#e5e7eb;flex-shrink:0;display:flex;align-items:center;justify-content:center;color:#9ca3af;">${c.name.charAt(0).toUpperCase()}</div>`}
                <div style="min-width:0; flex:1;">
                    <div style="font-size:13px;font-weight:600;color:#111827;white-space:nowrap;overflow:hidden;text-overflow:ellipsis;">${c.name}</div>
                    <div style="font-size:11px;color:#9ca3af;white-space:nowrap;overflow:hidden;text-overflow:ellipsis;">${short(c.profileUrl)}</div>
                </div>
            </label>
        `).join("");

        panel.innerHTML = `
            <div style="padding:20px; border-bottom:1px solid #f3f4f6; display:flex; justify-content:space-between; align-items:center;">
                <div>
                    <div style="font-size:16px; font-weight:700; color:#111827;">Import Commenters</div>
                    <div style="font-size:12px; color:#6b7280;">${items.length} people found</div>
                </div>
                <div style="display:flex; gap:8px;">
                    <button id="ls-rescan" title="Re-scan comments" style="height:32px; padding:0 10px; border:none; background:#f3f4f6; border-radius:8px; cursor:pointer; font-size:12px; color:#374151;">↻ Re-scan</button>
                    <button id="ls-close" style="width:32px; height:32px; border:none; background:#f3f4f6; border-radius:8px; cursor:pointer; font-size:16px; color:#6b7280;">✕</button>
                </div>
            </div>
            <div style="padding:12px 20px; border-bottom:1px solid #f3f4f6; display:flex; align-items:center; gap:8px;">
                <input type="checkbox" id="ls-select-all" style="width:16px; height:16px; cursor:pointer;" />
                <label for="ls-select-all" style="font-size:13px; font-weight:500; color:#374151; cursor:pointer;">Select all</label>
                <span id="ls-count" style="font-size:12px; color:#6b7280; margin-left:auto;"></span>
            </div>
            <div id="ls-list" style="flex:1; overflow-y:auto; padding:12px 20px; display:flex; flex-direction:column; gap:8px;">${rows}</div>
            <div style="padding:16px 20px; border-top:1px solid #f3f4f6;">
                <button id="ls-import" style="width:100%; padding:12px; background:#2563eb; color:white; border:none; border-radius:8px; font-size:14px; font-weight:600; cursor:pointer;">Import Selected Leads</button>
                <div id="ls-status" style="font-size:12px;text-align:center;margin-top:8px;color:#6b7280;min-height:16px;"></div>
            </div>
        `;
        document.body.appendChild(panel);

        const cbs = () => Array.from(panel.querySelectorAll(".ls-cb"));
        const selectAll = panel.querySelector("#ls-select-all");
        const countEl = panel.querySelector("#ls-count");
        const refresh = () => {
            const boxes = cbs();
            const n = boxes.filter((cb) => cb.checked).length;
            countEl.textContent = `${n} selected`;
            selectAll.checked = n === boxes.length && boxes.length > 0;
            selectAll.indeterminate = n > 0 && n < boxes.length;
        };
        refresh();

        panel.addEventListener("change", (e) => {
            if (e.target === selectAll) {
                const checked = selectAll.checked;
                cbs().forEach((cb) => (cb.checked = checked));
                window.__leadscoutEvents.push({ kind: "toggleAll", checked });
            } else if (e.target.classList.contains("ls-cb")) {
                window.__leadscoutEvents.push({
                    kind: "toggle",
                    index: Number(e.target.dataset.index),
                    checked: e.target.checked,
                });
            }
            refresh();
        });
        panel.querySelector("#ls-rescan").addEventListener("click", () => {
            window.__leadscoutEvents.push({ kind: "rescan" });
        });
        panel.querySelector("#ls-close").addEventListener("click", () => {
            panel.remove();
            window.__leadscoutEvents.push({ kind: "close" });
        });
        panel.querySelector("#ls-import").addEventListener("click", () => {
            window.__leadscoutEvents.push({ kind: "submit" });
        });
        return true;
    })()
"##;

/// Mount (or remount) the selection panel with the given rows.
#[must_use]
pub fn panel_script(items_json: &str) -> String {
    PANEL_TEMPLATE.replace("__ITEMS__", items_json)
}

/// Set the panel's inline status line. Pass `is_error` to tint it red.
#[must_use]
pub fn panel_status_script(message: &str, is_error: bool) -> String {
    let encoded = serde_json::to_string(message).unwrap_or_else(|_| "\"\"".to_string());
    let color = if is_error { "#ef4444" } else { "#6b7280" };
    format!(
        r#"
        (() => {{
            const s = document.getElementById("ls-status");
            if (!s) return false;
            s.textContent = {encoded};
            s.style.color = "{color}";
            return true;
        }})()
        "#
    )
}

/// Put the submit control into/out of its in-progress state.
#[must_use]
pub fn panel_submitting_script(in_progress: bool, label: &str) -> String {
    let encoded = serde_json::to_string(label).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"
        (() => {{
            const b = document.getElementById("ls-import");
            if (!b) return false;
            b.disabled = {in_progress};
            b.textContent = {encoded};
            return true;
        }})()
        "#
    )
}

/// Flip the submit control green with a confirmation label.
#[must_use]
pub fn panel_success_script(label: &str) -> String {
    let encoded = serde_json::to_string(label).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r##"
        (() => {{
            const b = document.getElementById("ls-import");
            if (!b) return false;
            b.style.background = "#10b981";
            b.textContent = {encoded};
            return true;
        }})()
        "##
    )
}

/// Remove the panel if it is still mounted.
pub const REMOVE_PANEL: &str = r#"
    (() => {
        document.getElementById("leadscout-panel")?.remove();
        return true;
    })()
"#;
