use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pose_form::models::{Feedback, SquatLog};
use pose_form::services::{SquatDetector, SquatSession};
use serde::Serialize;
use std::path::PathBuf;

use super::open_frames;
use crate::config::Config;
use crate::source::FrameEvent;

#[derive(Args)]
pub struct SquatCommand {
    /// Frames file (JSON Lines, `-` for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Print a JSON summary instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct SquatSummary<'a> {
    frames: usize,
    missed_frames: usize,
    reps: usize,
    logs: &'a [SquatLog],
}

impl SquatCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let detector = SquatDetector::new().with_min_confidence(config.scoring.min_confidence);
        let mut session = SquatSession::new(detector);
        let mut source = open_frames(&self.input, config).await?;

        let mut frames = 0;
        let mut missed = 0;
        let mut last_feedback: Option<Feedback> = None;

        loop {
            let frame = match source.next_frame().await? {
                FrameEvent::Frame(frame) => frame,
                FrameEvent::Missed { .. } => {
                    missed += 1;
                    continue;
                }
                FrameEvent::End => break,
            };
            frames += 1;

            let Some(pose) = frame.primary_pose() else {
                tracing::debug!(frame = frame.index, "no person detected");
                continue;
            };

            let outcome = session.on_frame(pose, frame.timestamp, format!("frame-{}", frame.index));

            if self.json {
                continue;
            }

            if let Some(completed) = outcome.completed {
                println!("[{:>5}] {} {}", frame.index, "completed".cyan(), completed);
            }
            if let Some(feedback) = outcome.feedback {
                if last_feedback != Some(feedback) {
                    let message = if feedback.is_correct() {
                        feedback.message().green()
                    } else {
                        feedback.message().yellow()
                    };
                    println!("[{:>5}] {}", frame.index, message);
                    last_feedback = Some(feedback);
                }
            }
        }

        if self.json {
            let summary = SquatSummary {
                frames,
                missed_frames: missed,
                reps: session.rep_count(),
                logs: session.logs(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            println!();
            println!("Frames: {} ({} missed)", frames, missed);
            println!("Valid reps: {}", session.rep_count().to_string().bold());
        }

        Ok(())
    }
}
