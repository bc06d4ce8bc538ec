use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::stage::{JobStatus, Stage};

/// Request body for `POST /api/jobs/{job_id}/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: JobStatus,
    pub metadata: StageMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_key: Option<String>,
}

impl StatusUpdate {
    pub fn stage(&self) -> Stage {
        self.metadata.stage
    }
}

/// Worker metadata attached to a status callback
///
/// `stage` and `target_lang` are always present. Stage specific keys
/// (`metadata_key`, `translations`, `segments`, ...) live in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageMetadata {
    pub stage: Stage,
    pub target_lang: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StageMetadata {
    pub fn new(stage: Stage, target_lang: &str) -> Self {
        Self {
            stage,
            target_lang: target_lang.to_string(),
            extra: Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }
}

/// Dubbed segment carried inline by the legacy `done` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacySegment {
    pub seg_idx: u32,
    pub speaker: String,
    /// Seconds
    pub start: f64,
    /// Seconds
    pub end: f64,
    pub prompt_text: String,
    pub audio_file: String,
}

/// Compact per-project metadata document referenced by `metadata_key`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub v: u32,
    pub unit: String,
    pub lang: String,
    pub speakers: Vec<String>,
    pub segments: Vec<MetadataSegment>,
    pub vocab: Vec<String>,
    pub words: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataSegment {
    /// Start offset in `unit`
    pub s: u64,
    /// End offset in `unit`
    pub e: u64,
    /// Index into `speakers`
    pub sp: u32,
    pub txt: String,
    /// Gap to the previous and next segment
    pub gap: [Option<u64>; 2],
    /// Word offset and word count into `words`
    pub w_off: [u32; 2],
    /// Original order
    pub o: u32,
    /// Overlaps another speaker
    pub ov: bool,
}
