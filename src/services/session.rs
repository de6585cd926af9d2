/// Per-session state around the stateless scoring functions
///
/// `SquatSession` owns the phase cell and the phase log of one exercise run.
/// `ComparisonSession` throttles, smooths and records combined similarity
/// scores against a fixed reference pose.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::config::ScoringConfig;
use crate::error::{PoseFormError, Result};
use crate::models::keypoint::Pose;
use crate::models::similarity::{SimilarityLog, SimilarityOptions};
use crate::models::squat::{PhaseOutcome, SquatLog, SquatPhase};
use crate::services::phase_classifier::{count_valid_squats, SquatDetector};
use crate::services::score_smoother::ScoreSmoother;
use crate::services::similarity_engine::SimilarityEngine;

/// One squat exercise run
#[derive(Debug, Clone)]
pub struct SquatSession {
    detector: SquatDetector,
    phase: SquatPhase,
    logs: Vec<SquatLog>,
    reps: usize,
}

impl SquatSession {
    pub fn new(detector: SquatDetector) -> Self {
        Self {
            detector,
            phase: SquatPhase::Standing,
            logs: Vec::new(),
            reps: 0,
        }
    }

    pub fn phase(&self) -> SquatPhase {
        self.phase
    }

    pub fn logs(&self) -> &[SquatLog] {
        &self.logs
    }

    /// Valid repetitions counted so far
    pub fn rep_count(&self) -> usize {
        self.reps
    }

    /// Feed one frame. A completed phase is appended to the log with `snapshot`.
    pub fn on_frame(
        &mut self,
        pose: &Pose,
        timestamp: DateTime<Utc>,
        snapshot: impl Into<String>,
    ) -> PhaseOutcome {
        let outcome = self.detector.detect(pose, self.phase);
        self.phase = outcome.phase;

        if let Some(completed) = outcome.completed {
            self.logs.push(SquatLog::new(completed, timestamp, snapshot));

            let reps = count_valid_squats(&mut self.logs);
            if reps > self.reps {
                info!(reps, "squat repetition completed");
            }
            self.reps = reps;
        }

        outcome
    }

    /// Back to STANDING with an empty log
    pub fn reset(&mut self) {
        self.phase = SquatPhase::Standing;
        self.logs.clear();
        self.reps = 0;
    }
}

impl Default for SquatSession {
    fn default() -> Self {
        Self::new(SquatDetector::new())
    }
}

/// Score produced for one evaluated frame
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonUpdate {
    /// Adjusted combined similarity of this frame
    pub raw: f64,
    /// Smoothed value for display
    pub smoothed: f64,
    /// Set when this frame was recorded as a high-similarity snapshot
    pub log: Option<SimilarityLog>,
}

/// Streaming comparison of live poses against one reference pose
#[derive(Debug, Clone)]
pub struct ComparisonSession {
    engine: SimilarityEngine,
    options: SimilarityOptions,
    reference: Pose,
    smoother: ScoreSmoother,
    frame_interval: u32,
    frame_counter: u64,
    min_similarity: f64,
    min_log_interval: Duration,
    last_logged: Option<DateTime<Utc>>,
    logs: Vec<SimilarityLog>,
}

impl ComparisonSession {
    /// Build a session from a validated configuration
    pub fn new(reference: Pose, config: &ScoringConfig) -> Result<Self> {
        config.validate()?;
        let min_interval_ms = i64::try_from(config.logging.min_interval_ms).map_err(|_| {
            PoseFormError::InvalidConfig(format!(
                "logging.min_interval_ms is too large: {}",
                config.logging.min_interval_ms
            ))
        })?;

        let engine = SimilarityEngine::new()
            .with_min_confidence(config.min_confidence)
            .with_adjustment_exponent(config.adjustment_exponent);

        Ok(Self {
            engine,
            options: config.similarity_options(),
            reference,
            smoother: ScoreSmoother::new(config.smoothing.window_size, config.smoothing.min_change),
            frame_interval: config.smoothing.frame_interval.max(1),
            frame_counter: 0,
            min_similarity: config.logging.min_similarity,
            min_log_interval: Duration::milliseconds(min_interval_ms),
            last_logged: None,
            logs: Vec::new(),
        })
    }

    pub fn reference(&self) -> &Pose {
        &self.reference
    }

    pub fn logs(&self) -> &[SimilarityLog] {
        &self.logs
    }

    pub fn displayed(&self) -> f64 {
        self.smoother.displayed()
    }

    /// Feed one frame. Only every `frame_interval`-th frame is scored;
    /// the others return `Ok(None)`.
    pub fn on_frame(&mut self, pose: &Pose, timestamp: DateTime<Utc>) -> Result<Option<ComparisonUpdate>> {
        self.frame_counter += 1;
        if self.frame_counter % u64::from(self.frame_interval) != 0 {
            return Ok(None);
        }

        let raw = self.engine.combined(pose, &self.reference, &self.options)?;
        let smoothed = self.smoother.push(raw);
        let log = self.record_if_needed(pose, smoothed, timestamp);

        Ok(Some(ComparisonUpdate { raw, smoothed, log }))
    }

    fn record_if_needed(
        &mut self,
        pose: &Pose,
        similarity: f64,
        timestamp: DateTime<Utc>,
    ) -> Option<SimilarityLog> {
        if similarity <= self.min_similarity {
            return None;
        }

        if let Some(last) = self.last_logged {
            if timestamp - last < self.min_log_interval {
                debug!(similarity, "similarity log throttled");
                return None;
            }
        }

        let entry = SimilarityLog::new(timestamp, similarity, pose.clone());
        info!(id = %entry.id, similarity, "recorded similarity snapshot");

        self.last_logged = Some(timestamp);
        self.logs.push(entry.clone());
        Some(entry)
    }
}
