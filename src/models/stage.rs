use serde::{Deserialize, Serialize};

/// Pipeline stage reported by a dubbing worker
///
/// Variants are declared in pipeline order. `Done` is the only terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Starting,
    AsrStarted,
    AsrCompleted,
    TranslationStarted,
    TranslationCompleted,
    TtsStarted,
    TtsCompleted,
    MuxStarted,
    Done,
}

impl Stage {
    /// Non-terminal stages in the order a worker reports them
    pub const PROGRESS: [Stage; 8] = [
        Stage::Starting,
        Stage::AsrStarted,
        Stage::AsrCompleted,
        Stage::TranslationStarted,
        Stage::TranslationCompleted,
        Stage::TtsStarted,
        Stage::TtsCompleted,
        Stage::MuxStarted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Starting => "starting",
            Stage::AsrStarted => "asr_started",
            Stage::AsrCompleted => "asr_completed",
            Stage::TranslationStarted => "translation_started",
            Stage::TranslationCompleted => "translation_completed",
            Stage::TtsStarted => "tts_started",
            Stage::TtsCompleted => "tts_completed",
            Stage::MuxStarted => "mux_started",
            Stage::Done => "done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "starting" => Some(Stage::Starting),
            "asr_started" => Some(Stage::AsrStarted),
            "asr_completed" => Some(Stage::AsrCompleted),
            "translation_started" => Some(Stage::TranslationStarted),
            "translation_completed" => Some(Stage::TranslationCompleted),
            "tts_started" => Some(Stage::TtsStarted),
            "tts_completed" => Some(Stage::TtsCompleted),
            "mux_started" => Some(Stage::MuxStarted),
            "done" => Some(Stage::Done),
            _ => None,
        }
    }

    /// Job status string sent alongside this stage
    pub fn status(&self) -> JobStatus {
        if self.is_terminal() {
            JobStatus::Done
        } else {
            JobStatus::InProgress
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job status values accepted by the status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    InProgress,
    Done,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::InProgress => "in_progress",
            JobStatus::Done => "done",
        }
    }
}

/// Shape of the terminal `done` payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DoneFormat {
    /// Reference a metadata document by object key
    #[default]
    New,
    /// Inline the dubbed segments
    Legacy,
}

impl DoneFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoneFormat::New => "new",
            DoneFormat::Legacy => "legacy",
        }
    }
}

/// Which callbacks a run sends, as chosen with `--stage`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageSelection {
    /// Every progress stage followed by `done`
    All,
    /// One progress stage, or `done`
    Single(Stage),
    /// `done` with the legacy payload regardless of `--format`
    DoneLegacy,
}

impl StageSelection {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "all" => Ok(StageSelection::All),
            "done-legacy" => Ok(StageSelection::DoneLegacy),
            other => Stage::from_str(other)
                .map(StageSelection::Single)
                .ok_or_else(|| {
                    format!(
                        "Invalid stage: '{}'. Valid stages: all, {}, done, done-legacy",
                        other,
                        Stage::PROGRESS.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
                    )
                }),
        }
    }

    /// Format actually used for the `done` callback
    pub fn effective_format(&self, requested: DoneFormat) -> DoneFormat {
        match self {
            StageSelection::DoneLegacy => DoneFormat::Legacy,
            _ => requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names_roundtrip() {
        for stage in Stage::PROGRESS.iter().chain(std::iter::once(&Stage::Done)) {
            assert_eq!(Stage::from_str(stage.as_str()), Some(*stage));
        }
        assert_eq!(Stage::from_str("mux_completed"), None);
        assert_eq!(Stage::from_str(""), None);
    }

    #[test]
    fn test_stage_status() {
        assert_eq!(Stage::Starting.status(), JobStatus::InProgress);
        assert_eq!(Stage::MuxStarted.status(), JobStatus::InProgress);
        assert_eq!(Stage::Done.status(), JobStatus::Done);
        assert!(Stage::Done.is_terminal());
        assert!(!Stage::TtsCompleted.is_terminal());
    }

    #[test]
    fn test_progress_order() {
        assert_eq!(Stage::PROGRESS.len(), 8);
        assert_eq!(Stage::PROGRESS[0], Stage::Starting);
        assert_eq!(Stage::PROGRESS[7], Stage::MuxStarted);
        assert!(!Stage::PROGRESS.contains(&Stage::Done));
    }

    #[test]
    fn test_stage_serializes_as_wire_name() {
        let json = serde_json::to_string(&Stage::TranslationCompleted).unwrap();
        assert_eq!(json, "\"translation_completed\"");
        let json = serde_json::to_string(&JobStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_selection_parse() {
        assert_eq!(StageSelection::parse("all"), Ok(StageSelection::All));
        assert_eq!(StageSelection::parse("done-legacy"), Ok(StageSelection::DoneLegacy));
        assert_eq!(StageSelection::parse("asr_started"), Ok(StageSelection::Single(Stage::AsrStarted)));
        assert_eq!(StageSelection::parse("done"), Ok(StageSelection::Single(Stage::Done)));

        let err = StageSelection::parse("bogus").unwrap_err();
        assert!(err.contains("Invalid stage: 'bogus'"));
        assert!(err.contains("mux_started"));
    }

    #[test]
    fn test_done_legacy_forces_format() {
        assert_eq!(StageSelection::DoneLegacy.effective_format(DoneFormat::New), DoneFormat::Legacy);
        assert_eq!(StageSelection::All.effective_format(DoneFormat::New), DoneFormat::New);
        assert_eq!(StageSelection::All.effective_format(DoneFormat::Legacy), DoneFormat::Legacy);
    }
}
