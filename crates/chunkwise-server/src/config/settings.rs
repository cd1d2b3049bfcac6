use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub compute: ComputeConfig,
    pub documents: DocumentsConfig,
    pub pipeline: PipelineConfig,
    pub deploy: DeployConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which compute backend the gateway talks to.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ComputeMode {
    /// The real chunking/visualization/evaluation services over HTTP.
    Http,
    /// The in-process backend, for development without the services up.
    Local,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ComputeConfig {
    pub mode: ComputeMode,
    pub chunking_url: String,
    pub visualization_url: String,
    pub evaluation_url: String,
    pub chunk_timeout_seconds: u64,
    pub evaluation_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DocumentsConfig {
    pub max_bytes: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PipelineConfig {
    /// Quiet period before a configuration edit triggers a background
    /// visualization refresh.
    pub visualize_debounce_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeployConfig {
    pub engine_version: String,
    pub instance_class: String,
    pub step_delay_ms: u64,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(true))
            .add_source(
                Environment::with_prefix("CHUNKWISE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }
}
