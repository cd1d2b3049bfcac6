pub mod compute;
pub mod deploy;
pub mod http;
pub mod local;
pub mod scheduler;
pub mod stats;
pub mod workflow_service;

pub use compute::{Chunk, ComputeBackend, EvaluationResponse};
pub use deploy::{DeployRequest, DeployService};
pub use http::HttpComputeBackend;
pub use local::LocalComputeBackend;
pub use scheduler::VisualizeScheduler;
pub use workflow_service::{VisualizeOutcome, VisualizeResponse, WorkflowService};
