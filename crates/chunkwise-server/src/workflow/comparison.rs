use serde::Serialize;
use uuid::Uuid;

/// Hard cap on how many workflows can sit in the side-by-side view.
pub const MAX_SELECTIONS: usize = 4;

/// Selection state for comparison mode. Entering and exiting both clear the
/// selection; toggling past the cap is a silent no-op, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonState {
    pub is_comparing: bool,
    pub selected_workflow_ids: Vec<Uuid>,
}

impl ComparisonState {
    pub fn enter(&mut self) {
        self.is_comparing = true;
        self.selected_workflow_ids.clear();
    }

    pub fn exit(&mut self) {
        self.is_comparing = false;
        self.selected_workflow_ids.clear();
    }

    pub fn toggle(&mut self, id: Uuid) {
        if let Some(position) = self.selected_workflow_ids.iter().position(|w| *w == id) {
            self.selected_workflow_ids.remove(position);
        } else if self.selected_workflow_ids.len() < MAX_SELECTIONS {
            self.selected_workflow_ids.push(id);
        }
    }

    /// A comparison needs at least two workflows; fewer is a valid
    /// empty-result state.
    pub fn is_ready(&self) -> bool {
        self.selected_workflow_ids.len() >= 2
    }
}
