// Sequential replay of worker callbacks

use std::io::Write;
use std::time::Duration;

use anyhow::Result;

use crate::cli::output::{format_callback_banner, format_callback_success, format_request_failure};
use crate::client::JobApiClient;
use crate::models::StatusUpdate;

/// Outcome counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sent: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Replays a callback plan against the job-status API
///
/// Without a client (dry run) banners are printed and nothing is sent.
pub struct Simulator<'a> {
    client: Option<&'a JobApiClient>,
    delay: Duration,
    width: usize,
    color: bool,
}

impl<'a> Simulator<'a> {
    pub fn new(client: Option<&'a JobApiClient>, delay: Duration) -> Self {
        Self {
            client,
            delay,
            width: usize::MAX,
            color: false,
        }
    }

    pub fn with_display(mut self, width: usize, color: bool) -> Self {
        self.width = width;
        self.color = color;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.client.is_none()
    }

    /// Send every update in order. Failures are reported and the run continues.
    pub fn run<W: Write>(&self, job_id: &str, updates: &[StatusUpdate], out: &mut W) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for (idx, update) in updates.iter().enumerate() {
            writeln!(out)?;
            writeln!(out, "{}", format_callback_banner(update, self.width, self.color))?;

            let Some(client) = self.client else {
                writeln!(out, "(dry run: not sent)")?;
                continue;
            };

            summary.sent += 1;
            match client.post_status(job_id, update) {
                Ok(response) => {
                    summary.succeeded += 1;
                    log::info!("{} accepted for job {} ({})", update.stage(), job_id, response.status);
                    writeln!(out, "{}", format_callback_success(&response, self.color))?;
                }
                Err(err) => {
                    summary.failed += 1;
                    log::warn!("{} callback for job {} failed: {}", update.stage(), job_id, err);
                    writeln!(out, "{}", format_request_failure(&err, self.color))?;
                }
            }
            out.flush()?;

            if self.should_pause_after(update, idx, updates.len()) {
                std::thread::sleep(self.delay);
            }
        }

        Ok(summary)
    }

    /// Pause between progress callbacks; never after the last one or after `done`
    fn should_pause_after(&self, update: &StatusUpdate, idx: usize, total: usize) -> bool {
        !self.delay.is_zero() && !update.stage().is_terminal() && idx + 1 < total
    }
}
