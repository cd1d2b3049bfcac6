pub mod comparison;
pub mod constraints;
pub mod stage;
pub mod store;
pub mod types;

pub use comparison::ComparisonState;
pub use stage::classify;
pub use store::WorkflowStore;
pub use types::{
    ChunkStatistics, ChunkingStrategy, EvaluationMetrics, Patch, Stage, Workflow, WorkflowPatch,
};
