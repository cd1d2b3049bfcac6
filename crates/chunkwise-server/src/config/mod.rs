pub mod settings;

pub use settings::{
    ComputeConfig, ComputeMode, DeployConfig, DocumentsConfig, PipelineConfig, ServerConfig,
    Settings,
};
