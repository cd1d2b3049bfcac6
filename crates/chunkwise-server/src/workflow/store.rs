use chrono::Utc;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use uuid::Uuid;

use crate::utils::ApiError;

use super::stage::classify;
use super::types::{Stage, Workflow, WorkflowPatch};

static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9 ]+$").unwrap());

const TITLE_MAX_CHARS: usize = 50;

/// A single state transition. All mutation logic funnels through
/// `transition` so it stays testable without the HTTP layer.
#[derive(Debug)]
pub enum Command {
    Create { workflow: Workflow },
    Select { id: Option<Uuid> },
    Patch { id: Uuid, patch: WorkflowPatch },
    Delete { id: Uuid },
}

#[derive(Debug, Default)]
struct StoreState {
    workflows: Vec<Workflow>,
    selected: Option<Uuid>,
}

fn transition(state: &mut StoreState, command: Command) -> Result<(), ApiError> {
    match command {
        Command::Create { workflow } => {
            state.selected = Some(workflow.id);
            state.workflows.insert(0, workflow);
            Ok(())
        }
        Command::Select { id } => {
            match id {
                None => state.selected = None,
                // Selecting an id the store does not know is a no-op; the
                // caller is expected to only offer valid ids.
                Some(id) if state.workflows.iter().any(|w| w.id == id) => {
                    state.selected = Some(id)
                }
                Some(_) => {}
            }
            Ok(())
        }
        Command::Patch { id, patch } => {
            let workflow = state
                .workflows
                .iter_mut()
                .find(|w| w.id == id)
                .ok_or_else(|| ApiError::NotFound(format!("No workflow with id {}", id)))?;

            patch.document_title.apply(&mut workflow.document_title);
            patch.chunking_strategy.apply(&mut workflow.chunking_strategy);
            patch.chunks_stats.apply(&mut workflow.chunks_stats);
            patch.visualization_html.apply(&mut workflow.visualization_html);
            patch.evaluation_metrics.apply(&mut workflow.evaluation_metrics);
            workflow.stage = classify(workflow);
            Ok(())
        }
        Command::Delete { id } => {
            let position = state
                .workflows
                .iter()
                .position(|w| w.id == id)
                .ok_or_else(|| ApiError::NotFound(format!("No workflow with id {}", id)))?;
            state.workflows.remove(position);
            if state.selected == Some(id) {
                state.selected = state.workflows.first().map(|w| w.id);
            }
            Ok(())
        }
    }
}

fn validate_title(title: &str) -> Result<String, ApiError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ApiError::Validation(
            "Workflow title must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(ApiError::Validation(format!(
            "Workflow title must be at most {} characters",
            TITLE_MAX_CHARS
        )));
    }
    if !TITLE_RE.is_match(trimmed) {
        return Err(ApiError::Validation(
            "Workflow title may only contain letters, digits and spaces".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// In-memory workflow collection plus the selected-workflow pointer.
///
/// Workflows are kept newest-first. The store is the only writer of
/// workflow state; everything else reads clones.
#[derive(Default)]
pub struct WorkflowStore {
    state: RwLock<StoreState>,
}

impl WorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Vec<Workflow> {
        self.state.read().workflows.clone()
    }

    pub fn get(&self, id: Uuid) -> Option<Workflow> {
        self.state
            .read()
            .workflows
            .iter()
            .find(|w| w.id == id)
            .cloned()
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.state.read().selected
    }

    /// Validates the title, creates the workflow in Draft and selects it.
    pub fn create(&self, title: &str) -> Result<Workflow, ApiError> {
        let title = validate_title(title)?;
        let workflow = Workflow {
            id: Uuid::new_v4(),
            title,
            created_at: Utc::now(),
            document_title: None,
            chunking_strategy: None,
            chunks_stats: None,
            visualization_html: None,
            evaluation_metrics: None,
            stage: Stage::Draft,
        };
        let mut state = self.state.write();
        transition(
            &mut state,
            Command::Create {
                workflow: workflow.clone(),
            },
        )?;
        Ok(workflow)
    }

    pub fn select(&self, id: Option<Uuid>) {
        let mut state = self.state.write();
        // Select cannot fail; an unknown id is silently ignored.
        let _ = transition(&mut state, Command::Select { id });
    }

    /// Shallow-merges the patch and recomputes the stage.
    pub fn patch(&self, id: Uuid, patch: WorkflowPatch) -> Result<Workflow, ApiError> {
        let mut state = self.state.write();
        transition(&mut state, Command::Patch { id, patch })?;
        state
            .workflows
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or_else(|| ApiError::Internal("patched workflow disappeared".to_string()))
    }

    /// Removes the workflow; if it was selected, selection moves to the
    /// first remaining workflow, or clears.
    pub fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let mut state = self.state.write();
        transition(&mut state, Command::Delete { id })
    }
}
