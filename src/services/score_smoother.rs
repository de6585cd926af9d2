use std::collections::VecDeque;

pub const DEFAULT_WINDOW_SIZE: usize = 5;
pub const DEFAULT_MIN_CHANGE: f64 = 0.1;

/// Moving average over the most recent scores with a display dead band.
///
/// The displayed value starts at 0 and only moves once the window average
/// differs from it by more than `min_change`.
#[derive(Debug, Clone)]
pub struct ScoreSmoother {
    window: VecDeque<f64>,
    window_size: usize,
    min_change: f64,
    displayed: f64,
}

impl ScoreSmoother {
    pub fn new(window_size: usize, min_change: f64) -> Self {
        let window_size = window_size.max(1);
        Self {
            window: VecDeque::with_capacity(window_size),
            window_size,
            min_change,
            displayed: 0.0,
        }
    }

    /// Feed one raw score and return the value to display
    pub fn push(&mut self, score: f64) -> f64 {
        self.window.push_back(score);
        if self.window.len() > self.window_size {
            self.window.pop_front();
        }

        let average = self.average();
        if (average - self.displayed).abs() > self.min_change {
            self.displayed = average;
        }
        self.displayed
    }

    pub fn average(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    pub fn displayed(&self) -> f64 {
        self.displayed
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.displayed = 0.0;
    }
}

impl Default for ScoreSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE, DEFAULT_MIN_CHANGE)
    }
}
