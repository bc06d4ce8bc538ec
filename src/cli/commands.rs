use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;

use crate::cli::error::{user_error, validate_base_url, validate_job_id, validate_target_lang, RunFailed};
use crate::cli::output::{format_run_header, get_terminal_width, pretty_json, use_color};
use crate::cli::simulate::{RunSummary, Simulator};
use crate::cli::verify::verify_job;
use crate::client::JobApiClient;
use crate::config::{Config, Overrides};
use crate::fixtures;
use crate::models::{DoneFormat, StageSelection};
use crate::storage::{MetadataUploader, S3Settings};

#[derive(Parser, Debug)]
#[command(name = "dubsim")]
#[command(about = "Dubbing worker callback simulator - replays pipeline progress callbacks against a job-status API")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Job ID to report progress for
    pub job_id: String,
    /// Stage to send: all, starting, asr_started, asr_completed, translation_started,
    /// translation_completed, tts_started, tts_completed, mux_started, done, done-legacy
    #[arg(long, default_value = "all", value_parser = StageSelection::parse)]
    pub stage: StageSelection,
    /// Payload shape of the done stage (new: metadata_key, legacy: inline segments)
    #[arg(long, value_enum, default_value_t = DoneFormat::New)]
    pub format: DoneFormat,
    /// Target language code (default from config, else "en")
    #[arg(long)]
    pub target_lang: Option<String>,
    /// Job-status API base URL (default from DUBSIM_API_URL, config, else http://localhost:8000)
    #[arg(long)]
    pub base_url: Option<String>,
    /// Delay between progress callbacks in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,
    /// Read back the job, targets, segments and assets after the run
    #[arg(long)]
    pub verify: bool,
    /// Print the payloads without sending anything
    #[arg(long)]
    pub dry_run: bool,
    /// Write the test metadata document (new format) to this file
    #[arg(long, value_name = "PATH")]
    pub write_metadata: Option<PathBuf>,
    /// Upload the test metadata document to S3 under the job's project before the run
    /// (AWS_PROFILE, AWS_REGION, AWS_S3_BUCKET)
    #[arg(long)]
    pub upload_metadata: bool,
}

pub fn run() -> Result<()> {
    run_with_args(std::env::args())
}

/// Parse arguments and execute; clap usage errors exit with code 1
pub fn run_with_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                e.print()?;
                return Ok(());
            }
            _ => {
                e.print()?;
                std::process::exit(1);
            }
        },
    };

    handle_simulate(cli)
}

fn handle_simulate(cli: Cli) -> Result<()> {
    if let Err(e) = validate_job_id(&cli.job_id) {
        user_error(&e);
    }

    let overrides = Overrides {
        base_url: cli.base_url.clone(),
        delay_ms: cli.delay_ms,
        target_lang: cli.target_lang.clone(),
    };
    let config = match Config::resolve(&overrides) {
        Ok(config) => config,
        Err(e) => user_error(&format!("{:#}", e)),
    };
    if let Err(e) = validate_target_lang(&config.target_lang) {
        user_error(&e);
    }
    if let Err(e) = validate_base_url(&config.base_url) {
        user_error(&e);
    }

    let job_id = cli.job_id.trim();
    let format = cli.stage.effective_format(cli.format);
    let width = get_terminal_width();
    let color = use_color();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if let Some(path) = &cli.write_metadata {
        if format == DoneFormat::New {
            write_metadata_document(path)?;
            writeln!(out, "Wrote test metadata to {} (upload it as {})", path.display(), fixtures::METADATA_KEY)?;
        } else {
            log::warn!("--write-metadata only applies to the new done format; skipping");
            writeln!(out, "Skipping metadata file: the legacy format does not reference it")?;
        }
    }

    let client = JobApiClient::new(&config.base_url, config.timeout)
        .context("Failed to build HTTP client")?;

    if cli.upload_metadata {
        if format != DoneFormat::New {
            log::warn!("--upload-metadata only applies to the new done format; skipping");
            writeln!(out, "Skipping metadata upload: the legacy format does not reference it")?;
        } else if cli.dry_run {
            writeln!(out, "Skipping metadata upload in dry run")?;
        } else {
            let uploader = MetadataUploader::new(S3Settings::from_env());
            match upload_metadata(&client, &uploader, job_id) {
                Ok(key) => writeln!(
                    out,
                    "Uploaded test metadata to s3://{}/{}",
                    uploader.settings().bucket,
                    key
                )?,
                Err(e) => {
                    log::warn!("Metadata upload for job {} failed: {:#}", job_id, e);
                    writeln!(out, "Skipping metadata upload: {:#}", e)?;
                }
            }
        }
    }

    let updates = fixtures::plan(cli.stage, format, &config.target_lang);
    log::info!(
        "Simulating {} callback(s) for job {} against {}",
        updates.len(),
        job_id,
        config.base_url
    );

    if cli.stage == StageSelection::All {
        let endpoint = client.status_url(job_id);
        let header = format_run_header(
            "Full pipeline simulation",
            &[
                ("Job ID", job_id),
                ("Target Language", config.target_lang.as_str()),
                ("Format", format.as_str()),
                ("Endpoint", endpoint.as_str()),
            ],
            width,
            color,
        );
        writeln!(out, "\n{}", header)?;
    }

    let simulator = Simulator::new((!cli.dry_run).then_some(&client), config.delay).with_display(width, color);
    let summary = simulator.run(job_id, &updates, &mut out)?;

    let mut verify_failed = false;
    if cli.verify {
        if simulator.is_dry_run() {
            writeln!(out, "\nSkipping verification in dry run")?;
        } else {
            std::thread::sleep(config.delay);
            verify_failed = !verify_job(&client, job_id, width, color, &mut out)?;
        }
    }
    out.flush()?;

    finish(summary, verify_failed)
}

fn finish(summary: RunSummary, verify_failed: bool) -> Result<()> {
    if summary.is_success() && !verify_failed {
        return Ok(());
    }
    let mut failed = summary.failed;
    let mut total = summary.sent;
    if verify_failed {
        failed += 1;
        total += 1;
    }
    Err(RunFailed { failed, total }.into())
}

/// Look up the job's project and upload the metadata document for it
///
/// Returns the object key that was written.
pub fn upload_metadata(client: &JobApiClient, uploader: &MetadataUploader, job_id: &str) -> Result<String> {
    let job = client
        .get_job(job_id)
        .with_context(|| format!("Failed to look up job {}", job_id))?;
    let project_id = match job.get("project_id").and_then(|v| v.as_str()) {
        Some(id) if !id.is_empty() => id,
        _ => anyhow::bail!("Job {} has no project_id", job_id),
    };
    let key = uploader.upload(project_id, &fixtures::metadata_document())?;
    Ok(key)
}

/// Write the test metadata document as pretty JSON
pub fn write_metadata_document(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let document = fixtures::metadata_document();
    fs::write(path, pretty_json(&document))
        .with_context(|| format!("Failed to write metadata file: {}", path.display()))?;
    log::debug!("Wrote metadata document to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MetadataDocument, Stage};
    use tempfile::TempDir;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["dubsim", "job-1"]).unwrap();
        assert_eq!(cli.job_id, "job-1");
        assert_eq!(cli.stage, StageSelection::All);
        assert_eq!(cli.format, DoneFormat::New);
        assert!(cli.target_lang.is_none());
        assert!(!cli.verify);
        assert!(!cli.dry_run);
        assert!(!cli.upload_metadata);
    }

    #[test]
    fn test_cli_upload_metadata_flag() {
        let cli = Cli::try_parse_from(["dubsim", "job-1", "--stage", "done", "--upload-metadata"]).unwrap();
        assert!(cli.upload_metadata);
        assert_eq!(cli.stage, StageSelection::Single(Stage::Done));
    }

    #[test]
    fn test_cli_stage_and_format() {
        let cli = Cli::try_parse_from([
            "dubsim", "job-1", "--stage", "tts_completed", "--format", "legacy", "--target-lang", "ja",
        ])
        .unwrap();
        assert_eq!(cli.stage, StageSelection::Single(Stage::TtsCompleted));
        assert_eq!(cli.format, DoneFormat::Legacy);
        assert_eq!(cli.target_lang.as_deref(), Some("ja"));
    }

    #[test]
    fn test_cli_rejects_unknown_stage() {
        let err = Cli::try_parse_from(["dubsim", "job-1", "--stage", "mux_done"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_requires_job_id() {
        assert!(Cli::try_parse_from(["dubsim"]).is_err());
    }

    #[test]
    fn test_finish() {
        assert!(finish(RunSummary { sent: 9, succeeded: 9, failed: 0 }, false).is_ok());

        let err = finish(RunSummary { sent: 9, succeeded: 8, failed: 1 }, false).unwrap_err();
        assert_eq!(err.to_string(), "1 of 9 requests failed");

        let err = finish(RunSummary { sent: 1, succeeded: 1, failed: 0 }, true).unwrap_err();
        let failed = err.downcast_ref::<RunFailed>().unwrap();
        assert_eq!((failed.failed, failed.total), (1, 2));
    }

    #[test]
    fn test_write_metadata_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("metadata.json");
        write_metadata_document(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let doc: MetadataDocument = serde_json::from_str(&written).unwrap();
        assert_eq!(doc, fixtures::metadata_document());
        assert!(written.contains("좋은"));
    }
}
