use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pose_form::services::ComparisonSession;
use serde::Serialize;
use std::path::PathBuf;

use super::open_frames;
use crate::config::Config;
use crate::source::{load_pose, FrameEvent};

#[derive(Args)]
pub struct ScoreCommand {
    /// Frames file (JSON Lines, `-` for stdin)
    #[arg(short, long)]
    input: PathBuf,

    /// Reference pose (JSON)
    #[arg(short, long)]
    reference: PathBuf,

    /// Print one JSON object per scored frame
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ScoredFrame {
    frame: usize,
    raw: f64,
    smoothed: f64,
    logged: bool,
}

impl ScoreCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let reference = load_pose(&self.reference)?;
        let mut session = ComparisonSession::new(reference, &config.scoring)
            .context("Invalid scoring configuration")?;
        let mut source = open_frames(&self.input, config).await?;

        let mut missed = 0;
        loop {
            let frame = match source.next_frame().await? {
                FrameEvent::Frame(frame) => frame,
                FrameEvent::Missed { .. } => {
                    missed += 1;
                    continue;
                }
                FrameEvent::End => break,
            };

            let Some(pose) = frame.primary_pose() else {
                continue;
            };

            let Some(update) = session.on_frame(pose, frame.timestamp)? else {
                continue;
            };

            if self.json {
                let scored = ScoredFrame {
                    frame: frame.index,
                    raw: update.raw,
                    smoothed: update.smoothed,
                    logged: update.log.is_some(),
                };
                println!("{}", serde_json::to_string(&scored)?);
            } else {
                let marker = if update.log.is_some() { " *".green().to_string() } else { String::new() };
                println!(
                    "[{:>5}] raw {:.3}  smoothed {:.3}{}",
                    frame.index, update.raw, update.smoothed, marker
                );
            }
        }

        if !self.json {
            println!();
            println!("Snapshots recorded: {}", session.logs().len());
            println!("Final score: {}", format!("{:.3}", session.displayed()).bold());
            if missed > 0 {
                println!("Missed frames: {}", missed);
            }
        }

        Ok(())
    }
}
