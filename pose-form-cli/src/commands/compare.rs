use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use pose_form::models::{JointAngleKind, SimilarityOptions, SimilarityStrategy, StrategyWeight};
use pose_form::services::SimilarityEngine;
use std::path::PathBuf;

use crate::config::Config;
use crate::source::load_pose;

#[derive(Args)]
pub struct CompareCommand {
    /// Pose to score (JSON)
    #[arg(short, long)]
    pose: PathBuf,

    /// Reference pose (JSON)
    #[arg(short, long)]
    reference: PathBuf,

    /// Strategy and weight, e.g. keyAngles=0.5 (repeatable; defaults to the configured blend)
    #[arg(short, long = "strategy", value_parser = parse_strategy_weight)]
    strategies: Vec<StrategyWeight>,

    /// Joint angles compared by keyAngles, e.g. leftKneeAngle,right_knee
    #[arg(long, value_delimiter = ',')]
    angles: Vec<JointAngleKind>,

    /// Rotate both poses so the torso is vertical before scoring
    #[arg(long)]
    normalize: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

/// Parse `NAME=WEIGHT`
pub fn parse_strategy_weight(value: &str) -> Result<StrategyWeight, String> {
    let (name, weight) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=WEIGHT, got '{}'", value))?;

    let strategy: SimilarityStrategy = name.parse().map_err(|e| format!("{}", e))?;
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|_| format!("invalid weight '{}'", weight))?;

    Ok(StrategyWeight::new(strategy, weight))
}

impl CompareCommand {
    /// Strategies from the command line, or the configured ones
    fn options(&self, config: &Config) -> Result<SimilarityOptions> {
        let mut strategies = if self.strategies.is_empty() {
            config.scoring.strategies.clone()
        } else {
            self.strategies.clone()
        };

        if !self.angles.is_empty() {
            let mut applied = false;
            for entry in strategies
                .iter_mut()
                .filter(|entry| entry.strategy == SimilarityStrategy::KeyAngles)
            {
                entry.selected_angles = Some(self.angles.clone());
                applied = true;
            }
            if !applied {
                bail!("--angles needs a keyAngles strategy in the blend, e.g. --strategy keyAngles=1");
            }
        }

        Ok(SimilarityOptions {
            strategies,
            normalize: self.normalize || config.scoring.normalize,
        })
    }

    pub async fn execute(self, config: &Config) -> Result<()> {
        let pose = load_pose(&self.pose)?;
        let reference = load_pose(&self.reference)?;
        let options = self.options(config)?;

        let engine = SimilarityEngine::new()
            .with_min_confidence(config.scoring.min_confidence)
            .with_adjustment_exponent(config.scoring.adjustment_exponent);

        let breakdown = engine
            .combined_breakdown(&pose, &reference, &options)
            .context("Failed to score poses")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&breakdown)?);
            return Ok(());
        }

        println!("Pose Similarity");
        println!("────────────────────────────────");
        for part in &breakdown.parts {
            println!("  {:<20} weight {:.2}  score {:.3}", part.strategy, part.weight, part.score);
        }
        println!();
        println!("Weighted mean: {:.3}", breakdown.weighted_mean);
        println!("Similarity: {}", format!("{:.3}", breakdown.combined).bold());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy_weight() {
        let entry = parse_strategy_weight("relative-angles=0.25").unwrap();
        assert_eq!(entry.strategy, SimilarityStrategy::RelativeAngles);
        assert_eq!(entry.weight, 0.25);

        assert!(parse_strategy_weight("keyAngles").is_err());
        assert!(parse_strategy_weight("wristFlicks=0.5").is_err());
        assert!(parse_strategy_weight("keyAngles=lots").is_err());
    }

    fn command(strategies: Vec<StrategyWeight>, angles: Vec<JointAngleKind>) -> CompareCommand {
        CompareCommand {
            pose: PathBuf::from("pose.json"),
            reference: PathBuf::from("reference.json"),
            strategies,
            angles,
            normalize: false,
            json: false,
        }
    }

    #[test]
    fn test_angles_apply_to_key_angles_entries() {
        let cmd = command(
            vec![
                StrategyWeight::new(SimilarityStrategy::KeyAngles, 0.5),
                StrategyWeight::new(SimilarityStrategy::RelativeAngles, 0.5),
            ],
            vec![JointAngleKind::LeftKnee],
        );
        let options = cmd.options(&Config::default()).unwrap();
        assert_eq!(
            options.strategies[0].selected_angles,
            Some(vec![JointAngleKind::LeftKnee])
        );
        assert_eq!(options.strategies[1].selected_angles, None);
    }

    #[test]
    fn test_angles_without_key_angles_entry_are_rejected() {
        // default blend is relativeAngles only
        let cmd = command(Vec::new(), vec![JointAngleKind::LeftKnee]);
        let err = cmd.options(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("--angles"));
    }
}
