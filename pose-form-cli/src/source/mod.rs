//! Recorded pose input
//!
//! Stands in for a live pose estimator: each line of a JSON Lines file holds
//! the skeletons detected in one frame. Reads are bounded by a per-frame
//! deadline so a stalled producer (e.g. a FIFO fed by an estimator) drops
//! frames instead of blocking the session.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use pose_form::models::Pose;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::sync::mpsc;

/// Frame-source errors
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Failed to read frame {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed frame on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// One line of a frames file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    #[serde(default)]
    pub poses: Vec<Pose>,
}

/// A frame ready for scoring
#[derive(Debug, Clone)]
pub struct Frame {
    /// 0-based position in the recording
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub poses: Vec<Pose>,
}

impl Frame {
    /// The first detected person, as scored by every command
    pub fn primary_pose(&self) -> Option<&Pose> {
        self.poses.first()
    }
}

/// Outcome of waiting for the next frame
#[derive(Debug)]
pub enum FrameEvent {
    Frame(Frame),
    /// The deadline passed before the frame arrived
    Missed { index: usize },
    End,
}

/// Reads frames from a JSON Lines recording
///
/// Lines are read by a background task so a frame that misses its deadline
/// stays in flight. When it finally arrives it is discarded, not scored.
pub struct RecordedPoseSource {
    label: String,
    frames: mpsc::Receiver<Result<FrameRecord, SourceError>>,
    index: usize,
    /// The frame at `index` already missed its deadline
    overdue: bool,
    deadline: Duration,
    started: DateTime<Utc>,
}

/// Nominal spacing for frames recorded without timestamps (30 fps)
const DEFAULT_FRAME_SPACING_MS: i64 = 33;

impl RecordedPoseSource {
    pub async fn open(path: &Path, deadline: Duration) -> Result<Self> {
        let file = File::open(path)
            .await
            .with_context(|| format!("Failed to open frames file {}", path.display()))?;

        Ok(Self::from_reader(file, path.display().to_string(), deadline))
    }

    /// Read frames from any byte stream, e.g. a pipe fed by a live estimator
    pub fn from_reader<R>(reader: R, label: impl Into<String>, deadline: Duration) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(read_records(BufReader::new(reader).lines(), tx));

        Self {
            label: label.into(),
            frames: rx,
            index: 0,
            overdue: false,
            deadline,
            started: Utc::now(),
        }
    }

    /// Wait for the next frame, at most the configured deadline
    pub async fn next_frame(&mut self) -> Result<FrameEvent, SourceError> {
        if self.overdue {
            // Already reported as missed; wait it out and drop it.
            match self.frames.recv().await {
                Some(Ok(_)) => {
                    tracing::debug!(frame = self.index, "discarding late frame");
                    self.index += 1;
                    self.overdue = false;
                }
                Some(Err(err)) => return Err(err),
                None => return Ok(FrameEvent::End),
            }
        }

        let index = self.index;
        match tokio::time::timeout(self.deadline, self.frames.recv()).await {
            Ok(Some(Ok(record))) => {
                self.index += 1;
                Ok(FrameEvent::Frame(self.into_frame(index, record)))
            }
            Ok(Some(Err(err))) => Err(err),
            Ok(None) => Ok(FrameEvent::End),
            Err(_) => {
                self.overdue = true;
                tracing::warn!(
                    frame = index,
                    source = %self.label,
                    deadline_ms = self.deadline.as_millis() as u64,
                    "frame missed its deadline, dropping it"
                );
                Ok(FrameEvent::Missed { index })
            }
        }
    }

    fn into_frame(&self, index: usize, record: FrameRecord) -> Frame {
        let timestamp = record
            .timestamp_ms
            .and_then(|ms| i64::try_from(ms).ok())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .unwrap_or_else(|| {
                self.started + chrono::Duration::milliseconds(index as i64 * DEFAULT_FRAME_SPACING_MS)
            });

        Frame {
            index,
            timestamp,
            poses: record.poses,
        }
    }
}

/// Parse non-blank lines into frame records until EOF, the first error, or
/// the source being dropped
async fn read_records<R>(
    mut lines: Lines<BufReader<R>>,
    tx: mpsc::Sender<Result<FrameRecord, SourceError>>,
) where
    R: AsyncRead + Unpin,
{
    let mut line = 0;
    loop {
        line += 1;
        let record = match lines.next_line().await {
            Ok(Some(text)) if text.trim().is_empty() => continue,
            Ok(Some(text)) => {
                serde_json::from_str(&text).map_err(|source| SourceError::Malformed { line, source })
            }
            Ok(None) => return,
            Err(source) => Err(SourceError::Io { line, source }),
        };

        let failed = record.is_err();
        if tx.send(record).await.is_err() || failed {
            return;
        }
    }
}

/// Read a single pose from a JSON file
pub fn load_pose(path: &Path) -> Result<Pose> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pose file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse pose file {}", path.display()))
}
