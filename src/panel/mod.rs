//! Selection panel: the in-memory selection model and the driver that keeps
//! the injected panel in sync with it.
//!
//! The injected JavaScript only renders and reports clicks; every decision
//! about what is selected lives in [`SelectionState`] on this side. A re-scan
//! merges fresh candidates into the existing state instead of replacing it,
//! so a lead the user already unticked stays unticked.

use anyhow::Result;
use chromiumoxide::Page;
use serde::Serialize;
use tracing::debug;

use crate::inject;
use crate::locator::eval;
use crate::models::{BatchPayload, CandidateLead};

/// Aggregate state of the select-all control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterState {
    All,
    None,
    Partial,
}

#[derive(Debug, Clone)]
struct Entry {
    lead: CandidateLead,
    selected: bool,
}

/// The authoritative selection model behind the panel.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    entries: Vec<Entry>,
}

impl SelectionState {
    /// Every candidate starts selected.
    #[must_use]
    pub fn new(candidates: Vec<CandidateLead>) -> Self {
        let entries = candidates
            .into_iter()
            .map(|lead| Entry { lead, selected: true })
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set one row's selection. Out-of-range indices are ignored; the panel
    /// may report against a list that has since been remounted.
    pub fn set_selected(&mut self, index: usize, selected: bool) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.selected = selected;
        }
    }

    pub fn set_all(&mut self, selected: bool) {
        for entry in &mut self.entries {
            entry.selected = selected;
        }
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.entries.iter().filter(|e| e.selected).count()
    }

    #[must_use]
    pub fn master_state(&self) -> MasterState {
        match self.selected_count() {
            0 => MasterState::None,
            n if n == self.entries.len() => MasterState::All,
            _ => MasterState::Partial,
        }
    }

    /// Merge a fresh scan into the existing state. Existing rows keep their
    /// position and selection; candidates with an unseen name are appended
    /// as selected. Returns how many rows were added.
    pub fn merge(&mut self, fresh: Vec<CandidateLead>) -> usize {
        let mut added = 0;
        for lead in fresh {
            if self.entries.iter().any(|e| e.lead.name == lead.name) {
                continue;
            }
            self.entries.push(Entry { lead, selected: true });
            added += 1;
        }
        added
    }

    /// Clone out the leads currently ticked, in display order.
    #[must_use]
    pub fn selected_leads(&self) -> Vec<CandidateLead> {
        self.entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.lead.clone())
            .collect()
    }

    /// Decide what a submit click does: build the batch payload, or return
    /// the inline validation message when nothing is ticked. Nothing may go
    /// on the wire in the empty case.
    pub fn submission(&self) -> Result<BatchPayload, &'static str> {
        let leads = self.selected_leads();
        if leads.is_empty() {
            return Err("Select at least one lead.");
        }
        Ok(BatchPayload {
            leads,
            stage_id: None,
        })
    }
}

/// Row shape handed to the injected panel for rendering.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PanelRow<'a> {
    name: &'a str,
    profile_url: &'a str,
    avatar_url: Option<&'a str>,
    selected: bool,
}

/// The mounted panel: selection model plus the page it renders on.
pub struct Panel {
    state: SelectionState,
}

impl Panel {
    /// Mount the panel with an initial set of candidates, all selected.
    pub async fn mount(page: &Page, candidates: Vec<CandidateLead>) -> Result<Self> {
        let panel = Self {
            state: SelectionState::new(candidates),
        };
        panel.render(page).await?;
        Ok(panel)
    }

    #[must_use]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Apply a checkbox event reported by the injected panel. The page copy
    /// already reflects the click, so no re-render is needed.
    pub fn apply_toggle(&mut self, index: usize, checked: bool) {
        self.state.set_selected(index, checked);
    }

    pub fn apply_toggle_all(&mut self, checked: bool) {
        self.state.set_all(checked);
    }

    /// Merge a re-scan into the model and remount the panel to show the
    /// grown list. Returns how many new rows appeared.
    pub async fn merge_and_remount(
        &mut self,
        page: &Page,
        fresh: Vec<CandidateLead>,
    ) -> Result<usize> {
        let added = self.state.merge(fresh);
        debug!(added, total = self.state.len(), "re-scan merged into panel");
        self.render(page).await?;
        Ok(added)
    }

    pub async fn show_status(&self, page: &Page, message: &str, is_error: bool) -> Result<()> {
        eval::<bool>(page, inject::panel_status_script(message, is_error)).await?;
        Ok(())
    }

    pub async fn show_submitting(&self, page: &Page, count: usize) -> Result<()> {
        let label = format!("Importing {count}...");
        eval::<bool>(page, inject::panel_submitting_script(true, &label)).await?;
        Ok(())
    }

    pub async fn show_success(&self, page: &Page, count: usize) -> Result<()> {
        let label = format!("✓ Imported {count} leads");
        eval::<bool>(page, inject::panel_success_script(&label)).await?;
        Ok(())
    }

    /// Re-enable the submit control after a failed attempt.
    pub async fn show_failure(&self, page: &Page, message: &str) -> Result<()> {
        eval::<bool>(
            page,
            inject::panel_submitting_script(false, "Import Selected Leads"),
        )
        .await?;
        self.show_status(page, message, true).await
    }

    pub async fn remove(&self, page: &Page) -> Result<()> {
        eval::<bool>(page, inject::REMOVE_PANEL.to_string()).await?;
        Ok(())
    }

    async fn render(&self, page: &Page) -> Result<()> {
        let rows: Vec<PanelRow<'_>> = self
            .state
            .entries
            .iter()
            .map(|e| PanelRow {
                name: &e.lead.name,
                profile_url: &e.lead.profile_url,
                avatar_url: e.lead.avatar_url.as_deref(),
                selected: e.selected,
            })
            .collect();
        let items_json = serde_json::to_string(&rows)?;
        eval::<bool>(page, inject::panel_script(&items_json)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Platform;

    fn lead(name: &str) -> CandidateLead {
        CandidateLead {
            name: name.to_string(),
            profile_url: format!("https://www.facebook.com/{}", name.to_lowercase()),
            platform: Platform::Facebook,
            avatar_url: None,
        }
    }

    #[test]
    fn new_state_selects_everyone() {
        let state = SelectionState::new(vec![lead("Ana"), lead("Ben")]);
        assert_eq!(state.selected_count(), 2);
        assert_eq!(state.master_state(), MasterState::All);
    }

    #[test]
    fn toggling_moves_through_tri_state() {
        let mut state = SelectionState::new(vec![lead("Ana"), lead("Ben"), lead("Cho")]);
        state.set_selected(1, false);
        assert_eq!(state.master_state(), MasterState::Partial);
        state.set_selected(0, false);
        state.set_selected(2, false);
        assert_eq!(state.master_state(), MasterState::None);
        state.set_all(true);
        assert_eq!(state.master_state(), MasterState::All);
    }

    #[test]
    fn out_of_range_toggle_is_ignored() {
        let mut state = SelectionState::new(vec![lead("Ana")]);
        state.set_selected(7, false);
        assert_eq!(state.selected_count(), 1);
    }

    #[test]
    fn merge_keeps_existing_selection_and_appends_new() {
        let mut state = SelectionState::new(vec![lead("Ana"), lead("Ben")]);
        state.set_selected(0, false);

        let added = state.merge(vec![lead("Ana"), lead("Cho")]);
        assert_eq!(added, 1);
        assert_eq!(state.len(), 3);

        // Ana stays unticked, Cho arrives ticked.
        let selected = state.selected_leads();
        let names: Vec<&str> = selected.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Ben", "Cho"]);
    }

    #[test]
    fn merge_never_removes_rows() {
        let mut state = SelectionState::new(vec![lead("Ana"), lead("Ben")]);
        let added = state.merge(Vec::new());
        assert_eq!(added, 0);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn submission_builds_payload_from_ticked_rows_only() {
        let mut state = SelectionState::new(vec![lead("Ana"), lead("Ben"), lead("Cho")]);
        state.set_selected(1, false);
        let payload = state.submission().expect("two rows are still ticked");
        let names: Vec<&str> = payload.leads.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Ana", "Cho"]);
        assert!(payload.stage_id.is_none());
    }

    #[test]
    fn empty_selection_is_refused_with_the_validation_message() {
        let mut state = SelectionState::new(vec![lead("Ana"), lead("Ben")]);
        state.set_all(false);
        assert_eq!(state.submission(), Err("Select at least one lead."));

        // Same for a panel that never had any rows.
        let state = SelectionState::new(Vec::new());
        assert_eq!(state.submission(), Err("Select at least one lead."));
    }

    #[test]
    fn selected_leads_preserves_display_order() {
        let mut state = SelectionState::new(vec![lead("Cho"), lead("Ana"), lead("Ben")]);
        state.set_selected(1, false);
        let names: Vec<String> = state
            .selected_leads()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, ["Cho", "Ben"]);
    }
}
