use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pose_form::models::Direction;
use pose_form::services::estimate_orientation;
use std::path::PathBuf;

use super::open_frames;
use crate::config::Config;
use crate::source::FrameEvent;

#[derive(Args)]
pub struct FacingCommand {
    /// Frames file (JSON Lines, `-` for stdin)
    #[arg(short, long)]
    input: PathBuf,
}

impl FacingCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let mut source = open_frames(&self.input, config).await?;

        loop {
            let frame = match source.next_frame().await? {
                FrameEvent::Frame(frame) => frame,
                FrameEvent::Missed { index } => {
                    println!("[{:>5}] {}", index, "missed".dimmed());
                    continue;
                }
                FrameEvent::End => break,
            };

            let Some(pose) = frame.primary_pose() else {
                println!("[{:>5}] {}", frame.index, "no person".dimmed());
                continue;
            };

            let orientation = estimate_orientation(
                pose,
                config.scoring.min_confidence,
                config.scoring.orientation.front_offset,
            );

            let direction = match orientation.direction {
                Direction::Front => orientation.direction.to_string().green(),
                Direction::Unknown => orientation.direction.to_string().dimmed(),
                _ => orientation.direction.to_string().yellow(),
            };
            let validity = if orientation.is_valid { "valid" } else { "not valid" };

            println!(
                "[{:>5}] {:<7} {:>7.1}°  {}",
                frame.index, direction, orientation.angle, validity
            );
        }

        Ok(())
    }
}
