// Read back what the API recorded for a job after a run

use std::io::{self, Write};

use anyhow::Result;

use crate::cli::output::{
    format_assets, format_job_summary, format_request_failure, format_run_header, format_segments,
    format_targets,
};
use crate::client::{ClientError, JobApiClient};

/// Print the job, then its project's targets, segments and assets.
///
/// Returns `false` if any read-back request failed.
pub fn verify_job<W: Write>(
    client: &JobApiClient,
    job_id: &str,
    width: usize,
    color: bool,
    out: &mut W,
) -> Result<bool> {
    writeln!(out)?;
    writeln!(out, "{}", format_run_header("Verifying results", &[("Job ID", job_id)], width, color))?;

    let mut sections = Vec::new();
    let result = read_back(client, job_id, &mut sections);
    for section in &sections {
        print_section(out, section)?;
    }

    match result {
        Ok(()) => Ok(true),
        Err(err) => {
            log::warn!("Verification of job {} failed: {}", job_id, err);
            writeln!(out, "{}", format_request_failure(&err, color))?;
            Ok(false)
        }
    }
}

/// Collect one report section per read-back; sections gathered before a
/// failing request are kept
fn read_back(client: &JobApiClient, job_id: &str, sections: &mut Vec<String>) -> Result<(), ClientError> {
    let job = client.get_job(job_id)?;
    sections.push(format_job_summary(&job));

    let project_id = match job.get("project_id").and_then(|v| v.as_str()) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            log::info!("Job {} has no project_id; skipping project read-back", job_id);
            return Ok(());
        }
    };

    let targets = client.project_targets(&project_id)?;
    sections.push(format_targets(&targets));

    let segments = client.project_segments(&project_id)?;
    sections.push(format_segments(&segments));

    let assets = client.project_assets(&project_id)?;
    sections.push(format_assets(&assets));

    Ok(())
}

fn print_section<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    writeln!(out, "\n{}", text)
}
