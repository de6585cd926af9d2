use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pose_form::models::PoseCheck;
use pose_form::services::PoseCheckTracker;
use std::fs;
use std::path::PathBuf;

use super::open_frames;
use crate::config::Config;
use crate::source::FrameEvent;

#[derive(Args)]
pub struct CheckCommand {
    /// Frames file (JSON Lines, `-` for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Pose checks (JSON array)
    #[arg(short, long)]
    checks: PathBuf,
}

impl CheckCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let contents = fs::read_to_string(&self.checks)
            .with_context(|| format!("Failed to read checks file {}", self.checks.display()))?;
        let checks: Vec<PoseCheck> =
            serde_json::from_str(&contents).context("Failed to parse checks file")?;

        let mut tracker = PoseCheckTracker::new(checks, config.scoring.min_confidence);
        let mut source = open_frames(&self.input, config).await?;

        loop {
            let frame = match source.next_frame().await? {
                FrameEvent::Frame(frame) => frame,
                FrameEvent::Missed { .. } => continue,
                FrameEvent::End => break,
            };

            let Some(pose) = frame.primary_pose() else {
                continue;
            };

            for result in tracker.update(pose, frame.timestamp) {
                let value = result
                    .value
                    .map(|v| format!("{:.2}", v))
                    .unwrap_or_else(|| "-".to_string());
                let status = if result.is_passing {
                    format!("pass {:.1}s", result.passing_ms as f64 / 1000.0).green()
                } else {
                    "fail".red()
                };
                println!("[{:>5}] {:<16} {:>8}  {}", frame.index, result.check_id, value, status);
            }
        }

        Ok(())
    }
}
