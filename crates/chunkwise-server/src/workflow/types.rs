use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Lifecycle label derived from a workflow's populated fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Draft,
    Configured,
    Evaluated,
}

/// The chunker selection stored on a workflow: which strategy, plus the
/// numeric option values the user has tuned. Options are flattened on the
/// wire next to the two identifying strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingStrategy {
    pub provider: String,
    pub chunker_type: String,
    #[serde(flatten)]
    pub options: BTreeMap<String, f64>,
}

/// Statistics derived from the last successful visualization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkStatistics {
    pub total_chunks: usize,
    pub avg_chars: f64,
    pub largest_chunk_chars: usize,
    pub largest_text: String,
    pub smallest_chunk_chars: usize,
    pub smallest_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub precision_mean: f64,
    pub recall_mean: f64,
    pub iou_mean: f64,
    pub precision_omega_mean: f64,
}

/// The central entity: one document paired with one chunking strategy and
/// its results. `stage` is always recomputed from the other fields.
///
/// Nested objects may arrive JSON-encoded as strings (older backends stored
/// them in TEXT columns); deserialization decodes them and treats malformed
/// payloads as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_option"
    )]
    pub document_title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_embedded"
    )]
    pub chunking_strategy: Option<ChunkingStrategy>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_embedded"
    )]
    pub chunks_stats: Option<ChunkStatistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization_html: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_embedded"
    )]
    pub evaluation_metrics: Option<EvaluationMetrics>,
    pub stage: Stage,
}

/// Tri-state patch field: absent keeps the stored value, an explicit null or
/// empty string clears it, anything else sets it.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    pub fn apply(self, slot: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Clear => *slot = None,
            Patch::Set(value) => *slot = Some(value),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }
}

/// Shallow-merge patch for a workflow. Only the user-mutable fields appear;
/// `id`, `title`, `created_at` and `stage` are never patched directly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowPatch {
    #[serde(default, deserialize_with = "patch_string")]
    pub document_title: Patch<String>,
    #[serde(default, deserialize_with = "patch_embedded")]
    pub chunking_strategy: Patch<ChunkingStrategy>,
    #[serde(default, deserialize_with = "patch_embedded")]
    pub chunks_stats: Patch<ChunkStatistics>,
    #[serde(default, deserialize_with = "patch_string")]
    pub visualization_html: Patch<String>,
    #[serde(default, deserialize_with = "patch_embedded")]
    pub evaluation_metrics: Patch<EvaluationMetrics>,
}

fn patch_string<'de, D>(deserializer: D) -> Result<Patch<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw {
        None => Patch::Clear,
        Some(s) if s.is_empty() => Patch::Clear,
        Some(s) => Patch::Set(s),
    })
}

fn patch_embedded<'de, D, T>(deserializer: D) -> Result<Patch<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None => Patch::Clear,
        Some(serde_json::Value::String(s)) if s.is_empty() => Patch::Clear,
        Some(serde_json::Value::String(s)) => match serde_json::from_str(&s) {
            Ok(value) => Patch::Set(value),
            Err(err) => {
                tracing::warn!("Ignoring malformed embedded patch field: {}", err);
                Patch::Keep
            }
        },
        Some(value) => match serde_json::from_value(value) {
            Ok(value) => Patch::Set(value),
            Err(err) => {
                tracing::warn!("Ignoring malformed embedded patch field: {}", err);
                Patch::Keep
            }
        },
    })
}

fn lenient_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()))
}

/// Decodes a nested workflow field that may be an object, a JSON-encoded
/// string, null, or garbage. Garbage decodes to `None` rather than failing
/// the whole record.
fn lenient_embedded<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(serde_json::Value::String(s)) if s.is_empty() => None,
        Some(serde_json::Value::String(s)) => match serde_json::from_str(&s) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("Ignoring malformed embedded workflow field: {}", err);
                None
            }
        },
        Some(value) => match serde_json::from_value(value) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("Ignoring malformed embedded workflow field: {}", err);
                None
            }
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> ChunkingStrategy {
        ChunkingStrategy {
            provider: "chonkie".to_string(),
            chunker_type: "token".to_string(),
            options: BTreeMap::from([
                ("chunk_size".to_string(), 2048.0),
                ("chunk_overlap".to_string(), 128.0),
            ]),
        }
    }

    #[test]
    fn patch_fields_default_to_keep() {
        let patch: WorkflowPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.document_title, Patch::Keep);
        assert_eq!(patch.chunking_strategy, Patch::Keep);
        assert_eq!(patch.evaluation_metrics, Patch::Keep);
    }

    #[test]
    fn null_and_empty_string_clear() {
        let patch: WorkflowPatch = serde_json::from_str(
            r#"{"document_title": null, "chunking_strategy": "", "visualization_html": ""}"#,
        )
        .unwrap();
        assert_eq!(patch.document_title, Patch::Clear);
        assert_eq!(patch.chunking_strategy, Patch::Clear);
        assert_eq!(patch.visualization_html, Patch::Clear);
    }

    #[test]
    fn embedded_field_accepts_object_and_json_string() {
        let from_object: WorkflowPatch = serde_json::from_str(
            r#"{"chunking_strategy": {"provider": "chonkie", "chunker_type": "token", "chunk_size": 2048, "chunk_overlap": 128}}"#,
        )
        .unwrap();
        let encoded = serde_json::to_string(&strategy()).unwrap();
        let from_string: WorkflowPatch = serde_json::from_value(
            serde_json::json!({ "chunking_strategy": encoded }),
        )
        .unwrap();

        assert_eq!(from_object.chunking_strategy, Patch::Set(strategy()));
        assert_eq!(from_string.chunking_strategy, Patch::Set(strategy()));
    }

    #[test]
    fn malformed_embedded_field_is_treated_as_absent() {
        let patch: WorkflowPatch =
            serde_json::from_str(r#"{"chunking_strategy": "{not json"}"#).unwrap();
        assert_eq!(patch.chunking_strategy, Patch::Keep);
    }

    #[test]
    fn strategy_options_round_trip_without_field_loss() {
        let original = strategy();
        let encoded = serde_json::to_value(&original).unwrap();
        assert_eq!(encoded["provider"], "chonkie");
        assert_eq!(encoded["chunk_size"], 2048.0);

        let decoded: ChunkingStrategy = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn workflow_decodes_string_encoded_nested_fields() {
        let metrics = EvaluationMetrics {
            precision_mean: 0.708,
            recall_mean: 0.715,
            iou_mean: 0.65,
            precision_omega_mean: 0.725,
        };
        let raw = serde_json::json!({
            "id": Uuid::new_v4(),
            "title": "Demo",
            "created_at": Utc::now(),
            "chunking_strategy": serde_json::to_string(&strategy()).unwrap(),
            "evaluation_metrics": serde_json::to_string(&metrics).unwrap(),
            "chunks_stats": "{broken",
            "stage": "Evaluated",
        });

        let workflow: Workflow = serde_json::from_value(raw).unwrap();
        assert_eq!(workflow.chunking_strategy, Some(strategy()));
        assert_eq!(workflow.evaluation_metrics, Some(metrics));
        assert_eq!(workflow.chunks_stats, None);
    }
}
