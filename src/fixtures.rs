// Fixed callback payloads replayed by the simulator

use serde_json::json;

use crate::models::{
    DoneFormat, LegacySegment, MetadataDocument, MetadataSegment, Stage, StageMetadata,
    StageSelection, StatusUpdate,
};

/// Object key of the metadata document the new `done` format points at
pub const METADATA_KEY: &str = "projects/test-project/metadata.json";

const SOURCE_SENTENCES: [&str; 2] = [
    "좋은 개발자라는 단어가 중요한 단인데 좋은 개발자라고 했을 때 정말 중요한 첫 번째는 기초, 소프트웨어 관련된, 컴퓨터가 관련된 것들이 정말 빠르게 변해요.",
    "빠르게 변하는 거를 이렇게 따라가야 되는데, 그러려면 그냥 도구만 알아서는 곤란하고 정말 기초가 탄탄해야 되는 것 같아요.",
];

const DUBBED_SENTENCES: [&str; 2] = [
    "Good developers are important. When we talk about good developers, the first really important thing is fundamentals - software-related, computer-related things change really fast.",
    "We need to keep up with these rapid changes, and to do that, just knowing the tools isn't enough - we really need solid fundamentals.",
];

/// (start, end) of each fixture segment in milliseconds
const SEGMENT_BOUNDS_MS: [(u64, u64); 2] = [(217, 13426), (13446, 23187)];

const SPEAKER: &str = "SPEAKER_00";

/// Object key of the dubbed output video
pub fn result_key(target_lang: &str) -> String {
    format!("projects/test-project/output/dubbed_{}.mp4", target_lang)
}

/// `in_progress` callback for a non-terminal stage
pub fn progress_update(stage: Stage, target_lang: &str) -> StatusUpdate {
    StatusUpdate {
        status: stage.status(),
        metadata: StageMetadata::new(stage, target_lang),
        result_key: None,
    }
}

/// Terminal `done` callback in the requested format
pub fn done_update(format: DoneFormat, target_lang: &str) -> StatusUpdate {
    let metadata = StageMetadata::new(Stage::Done, target_lang);
    let metadata = match format {
        DoneFormat::New => metadata
            .with("metadata_key", json!(METADATA_KEY))
            .with("translations", json!(SOURCE_SENTENCES)),
        DoneFormat::Legacy => metadata.with("segments", json!(legacy_segments())),
    };

    StatusUpdate {
        status: Stage::Done.status(),
        metadata,
        result_key: Some(result_key(target_lang)),
    }
}

/// Segments inlined by the legacy `done` payload
pub fn legacy_segments() -> Vec<LegacySegment> {
    SEGMENT_BOUNDS_MS
        .iter()
        .zip(DUBBED_SENTENCES.iter())
        .enumerate()
        .map(|(idx, (&(start_ms, end_ms), text))| LegacySegment {
            seg_idx: idx as u32,
            speaker: SPEAKER.to_string(),
            start: start_ms as f64 / 1000.0,
            end: end_ms as f64 / 1000.0,
            prompt_text: text.to_string(),
            audio_file: format!("projects/test/segments/seg_{}_en.mp3", idx),
        })
        .collect()
}

/// Ordered callbacks a run sends for the given selection
pub fn plan(selection: StageSelection, format: DoneFormat, target_lang: &str) -> Vec<StatusUpdate> {
    let format = selection.effective_format(format);
    match selection {
        StageSelection::All => Stage::PROGRESS
            .iter()
            .map(|stage| progress_update(*stage, target_lang))
            .chain(std::iter::once(done_update(format, target_lang)))
            .collect(),
        StageSelection::Single(Stage::Done) | StageSelection::DoneLegacy => {
            vec![done_update(format, target_lang)]
        }
        StageSelection::Single(stage) => vec![progress_update(stage, target_lang)],
    }
}

/// Metadata document matching the fixture segments
pub fn metadata_document() -> MetadataDocument {
    let last = SEGMENT_BOUNDS_MS.len() - 1;
    let segments = SEGMENT_BOUNDS_MS
        .iter()
        .zip(SOURCE_SENTENCES.iter())
        .enumerate()
        .map(|(idx, (&(s, e), txt))| {
            let gap = if idx < last {
                let next_start = SEGMENT_BOUNDS_MS[idx + 1].0;
                let gap = next_start.saturating_sub(e);
                [Some(gap), Some(gap)]
            } else {
                [None, None]
            };
            MetadataSegment {
                s,
                e,
                sp: 0,
                txt: txt.to_string(),
                gap,
                w_off: if idx == 0 { [0, 22] } else { [22, 17] },
                o: idx as u32,
                ov: false,
            }
        })
        .collect();

    MetadataDocument {
        v: 1,
        unit: "ms".to_string(),
        lang: "ko".to_string(),
        speakers: vec![SPEAKER.to_string()],
        segments,
        vocab: ["좋은", "개발자라는", "단어가", "중요한"]
            .iter()
            .map(|w| w.to_string())
            .collect(),
        words: Vec::new(),
    }
}
