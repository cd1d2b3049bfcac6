use std::collections::BTreeMap;

use crate::catalog::Chunker;

use super::types::ChunkingStrategy;

pub const CHUNK_SIZE: &str = "chunk_size";
pub const CHUNK_OVERLAP: &str = "chunk_overlap";
pub const MIN_CHARACTERS_PER_CHUNK: &str = "min_characters_per_chunk";

/// The legal window and clamped value for one option, given the sibling
/// values currently set on a workflow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedOption {
    pub effective_min: f64,
    pub effective_max: f64,
    pub value: f64,
}

/// Computes the effective bounds and clamped value for `option_key`.
///
/// Interdependency rules:
/// - `chunk_size` must stay strictly above any set `chunk_overlap` and
///   `min_characters_per_chunk`.
/// - `chunk_overlap` and `min_characters_per_chunk` are capped at
///   `chunk_size - 1` (never negative) whenever a chunk size is known: the
///   value set on the workflow, else the chunker's declared default.
/// - every other option keeps its declared bounds.
///
/// If the window collapses (`effective_min > effective_max`), the max bound
/// wins and the range becomes a single point at `effective_max`.
///
/// Returns `None` when the chunker does not declare `option_key`.
pub fn resolve(
    chunker: &Chunker,
    option_key: &str,
    current: &BTreeMap<String, f64>,
) -> Option<ResolvedOption> {
    let declared = chunker.option(option_key)?;
    let mut effective_min = declared.min;
    let mut effective_max = declared.max;

    match option_key {
        CHUNK_SIZE => {
            if let Some(overlap) = current.get(CHUNK_OVERLAP) {
                effective_min = effective_min.max(overlap + 1.0);
            }
            if let Some(min_chars) = current.get(MIN_CHARACTERS_PER_CHUNK) {
                effective_min = effective_min.max(min_chars + 1.0);
            }
        }
        CHUNK_OVERLAP | MIN_CHARACTERS_PER_CHUNK => {
            let chunk_size = current
                .get(CHUNK_SIZE)
                .copied()
                .or_else(|| chunker.option(CHUNK_SIZE).map(|o| o.default));
            if let Some(chunk_size) = chunk_size {
                let limit = (chunk_size - 1.0).max(0.0);
                effective_max = effective_max.min(limit);
                if effective_max < declared.min {
                    effective_min = effective_max;
                }
            }
        }
        _ => {}
    }

    if effective_min > effective_max {
        effective_min = effective_max;
    }

    let value = current
        .get(option_key)
        .copied()
        .unwrap_or(declared.default)
        .clamp(effective_min, effective_max);

    Some(ResolvedOption {
        effective_min,
        effective_max,
        value,
    })
}

/// Clamps every catalog-declared option of a strategy into its effective
/// window before the configuration is sent downstream, so a compute service
/// never sees an overlap that exceeds the chunk size. Options the catalog
/// does not know about pass through untouched.
pub fn sanitize(chunker: &Chunker, strategy: &ChunkingStrategy) -> ChunkingStrategy {
    let mut sanitized = strategy.clone();
    // The chunk size the user picked is authoritative: cap the dependent
    // options under it first, then settle chunk_size against the capped
    // siblings.
    for key in chunker.options.keys().filter(|k| *k != CHUNK_SIZE) {
        if let Some(resolved) = resolve(chunker, key, &sanitized.options) {
            sanitized.options.insert(key.clone(), resolved.value);
        }
    }
    if let Some(resolved) = resolve(chunker, CHUNK_SIZE, &sanitized.options) {
        sanitized.options.insert(CHUNK_SIZE.to_string(), resolved.value);
    }
    sanitized
}
