use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use axum::response::sse::Event;
use dashmap::DashMap;
use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::info;
use uuid::Uuid;

use crate::config::DeployConfig;
use crate::workflow::Workflow;

#[derive(Debug, Clone, Deserialize)]
pub struct DeployRequest {
    pub s3_access_key: String,
    pub s3_secret_key: String,
    pub s3_bucket: String,
    #[serde(default)]
    pub s3_region: Option<String>,
}

/// One named server-push event in the deploy stream.
#[derive(Debug, Clone)]
pub struct DeployEvent {
    pub name: &'static str,
    pub data: serde_json::Value,
}

impl DeployEvent {
    fn new<T: Serialize>(name: &'static str, payload: &T) -> Self {
        Self {
            name,
            data: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        }
    }

    pub fn into_sse(self) -> Event {
        Event::default().event(self.name).data(self.data.to_string())
    }
}

#[derive(Debug, Serialize)]
struct S3ConnectedPayload {
    bucket: String,
}

#[derive(Debug, Serialize)]
struct RdsReadyPayload {
    db_instance_identifier: String,
    endpoint: String,
    port: u16,
    engine: String,
    engine_version: String,
    instance_class: String,
    status: String,
}

#[derive(Debug, Serialize)]
struct StageErrorPayload {
    stage: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct DonePayload {
    workflow_id: Uuid,
}

/// Mocked deployment pipeline: validates credentials, verifies the S3
/// bucket and provisions an RDS instance, pushing one event per stage.
///
/// Starting a deploy supersedes any in-flight deploy for the same workflow;
/// the superseded stream ends without emitting further events. Dropping the
/// response body cancels the stream outright.
pub struct DeployService {
    config: DeployConfig,
    generations: Arc<DashMap<Uuid, u64>>,
}

fn generation_is_current(generations: &DashMap<Uuid, u64>, id: Uuid, generation: u64) -> bool {
    generations
        .get(&id)
        .map(|current| *current == generation)
        .unwrap_or(false)
}

impl DeployService {
    pub fn new(config: DeployConfig) -> Self {
        Self {
            config,
            generations: Arc::new(DashMap::new()),
        }
    }

    fn begin(&self, id: Uuid) -> u64 {
        let mut entry = self.generations.entry(id).or_insert(0);
        *entry += 1;
        *entry
    }

    pub fn start(
        &self,
        workflow: Workflow,
        request: DeployRequest,
    ) -> impl Stream<Item = DeployEvent> + Send + 'static {
        let generation = self.begin(workflow.id);
        let generations = self.generations.clone();
        let config = self.config.clone();
        let delay = Duration::from_millis(config.step_delay_ms);

        info!("Starting deploy for workflow {}", workflow.id);

        stream! {
            if request.s3_access_key.trim().is_empty()
                || request.s3_secret_key.trim().is_empty()
                || request.s3_bucket.trim().is_empty()
            {
                yield DeployEvent::new(
                    "error",
                    &StageErrorPayload {
                        stage: "credential-validation".to_string(),
                        error: "S3 access key, secret key and bucket are all required"
                            .to_string(),
                    },
                );
                return;
            }

            sleep(delay).await;
            if !generation_is_current(&generations, workflow.id, generation) {
                return;
            }

            let bucket = request.s3_bucket.trim().to_string();
            if !bucket
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | ' '))
            {
                yield DeployEvent::new(
                    "s3-error",
                    &StageErrorPayload {
                        stage: "s3-verification".to_string(),
                        error: format!("Bucket name {} is not a valid S3 bucket", bucket),
                    },
                );
                return;
            }
            yield DeployEvent::new("s3-connected", &S3ConnectedPayload { bucket: bucket.clone() });

            sleep(delay).await;
            if !generation_is_current(&generations, workflow.id, generation) {
                return;
            }

            let (provider, chunker_type) = workflow
                .chunking_strategy
                .as_ref()
                .map(|s| (s.provider.clone(), s.chunker_type.clone()))
                .unwrap_or_else(|| ("chunkwise".to_string(), "strategy".to_string()));
            let endpoint_host = format!(
                "{}.{}.{}",
                bucket.replace(char::is_whitespace, "-"),
                chunker_type,
                provider
            )
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                    c
                } else {
                    '-'
                }
            })
            .collect::<String>();

            yield DeployEvent::new(
                "rds-ready",
                &RdsReadyPayload {
                    db_instance_identifier: format!("chunkwise-{}", workflow.id.simple()),
                    endpoint: format!("{}.{}.rds.local", workflow.id, endpoint_host),
                    port: 5432,
                    engine: "postgres".to_string(),
                    engine_version: config.engine_version.clone(),
                    instance_class: config.instance_class.clone(),
                    status: "available".to_string(),
                },
            );

            sleep(delay).await;
            if !generation_is_current(&generations, workflow.id, generation) {
                return;
            }

            yield DeployEvent::new("done", &DonePayload { workflow_id: workflow.id });
        }
    }
}
