use super::types::{Stage, Workflow};

/// Maps a workflow's populated fields to its lifecycle label. Pure and
/// idempotent; the store calls this after every mutation so `stage` can
/// never drift from the fields it is derived from.
pub fn classify(workflow: &Workflow) -> Stage {
    if workflow.evaluation_metrics.is_some() {
        Stage::Evaluated
    } else if workflow.chunking_strategy.is_some() {
        Stage::Configured
    } else {
        Stage::Draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::{ChunkingStrategy, EvaluationMetrics};
    use chrono::Utc;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn empty_workflow() -> Workflow {
        Workflow {
            id: Uuid::new_v4(),
            title: "Test".to_string(),
            created_at: Utc::now(),
            document_title: None,
            chunking_strategy: None,
            chunks_stats: None,
            visualization_html: None,
            evaluation_metrics: None,
            stage: Stage::Draft,
        }
    }

    #[test]
    fn empty_workflow_is_draft() {
        assert_eq!(classify(&empty_workflow()), Stage::Draft);
    }

    #[test]
    fn strategy_makes_it_configured() {
        let mut workflow = empty_workflow();
        workflow.chunking_strategy = Some(ChunkingStrategy {
            provider: "chonkie".to_string(),
            chunker_type: "token".to_string(),
            options: BTreeMap::new(),
        });
        assert_eq!(classify(&workflow), Stage::Configured);
    }

    #[test]
    fn metrics_win_over_strategy() {
        let mut workflow = empty_workflow();
        workflow.evaluation_metrics = Some(EvaluationMetrics {
            precision_mean: 0.7,
            recall_mean: 0.7,
            iou_mean: 0.6,
            precision_omega_mean: 0.7,
        });
        // A document alone never changes the stage; metrics always do.
        workflow.document_title = Some("doc.txt".to_string());
        assert_eq!(classify(&workflow), Stage::Evaluated);
    }
}
