use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use super::workflow_service::WorkflowService;

/// Debounces visualization refreshes triggered by configuration edits.
///
/// Every edit bumps a per-workflow generation and schedules a run after the
/// quiet period. A run only dispatches if its generation is still the
/// newest when the quiet period ends, so rapid edits coalesce into one call
/// with the final configuration; the generation is checked again before the
/// result is applied, so a superseded run's completion is discarded.
pub struct VisualizeScheduler {
    service: Arc<WorkflowService>,
    quiet: Duration,
    generations: Arc<DashMap<Uuid, u64>>,
}

fn generation_is_current(generations: &DashMap<Uuid, u64>, id: Uuid, generation: u64) -> bool {
    generations
        .get(&id)
        .map(|current| *current == generation)
        .unwrap_or(false)
}

impl VisualizeScheduler {
    pub fn new(service: Arc<WorkflowService>, quiet: Duration) -> Self {
        Self {
            service,
            quiet,
            generations: Arc::new(DashMap::new()),
        }
    }

    /// Starts a new generation for the workflow, superseding any run that
    /// has not yet dispatched or applied.
    pub fn begin(&self, id: Uuid) -> u64 {
        let mut entry = self.generations.entry(id).or_insert(0);
        *entry += 1;
        *entry
    }

    pub fn is_current(&self, id: Uuid, generation: u64) -> bool {
        generation_is_current(&self.generations, id, generation)
    }

    /// Schedules a debounced background visualization for the workflow.
    pub fn schedule(&self, id: Uuid) {
        let generation = self.begin(id);
        let service = self.service.clone();
        let generations = self.generations.clone();
        let quiet = self.quiet;

        tokio::spawn(async move {
            sleep(quiet).await;
            if !generation_is_current(&generations, id, generation) {
                debug!("Skipping superseded visualization for workflow {}", id);
                return;
            }

            let outcome = service
                .visualize_if(id, || generation_is_current(&generations, id, generation))
                .await;
            match outcome {
                Ok(outcome) if outcome.applied => {}
                Ok(_) => debug!("Discarded stale visualization for workflow {}", id),
                Err(err) => warn!("Background visualization for {} failed: {}", id, err),
            }
        });
    }
}
