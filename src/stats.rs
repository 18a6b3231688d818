// stats.rs — lap timer with percentile-trimmed statistics.
//
// Twenty laps of a GPU dispatch are not identically distributed: the
// first laps pay pipeline warm-up and the occasional lap lands on a
// scheduler hiccup. Reporting a plain mean over 20 samples lets those
// outliers dominate, so the statistics here are computed over the
// middle of the sorted series only: the lowest 20% and highest 20% of
// laps (by duration) are discarded and mean/stddev are taken over the
// remaining window.
//
// TRIMMING FLOOR
// With k laps the window is sorted[k/5 .. k - k/5] (integer division).
// That window is non-empty for every k >= 1, and for k < 5 both trim
// counts round to zero, so nothing is discarded. With zero laps recorded,
// lap_avg() and lap_std() return 0.0.

use std::time::Instant;

/// Records the durations of consecutive intervals ("laps") and reports
/// trimmed mean and standard deviation over them.
///
/// The timer starts its first interval at construction. Each call to
/// [`next_lap`](LapTimer::next_lap) closes the current interval, records
/// its duration in seconds, and starts the next one.
pub struct LapTimer {
    checkpoint: Instant,
    laps: Vec<f64>,
}

impl LapTimer {
    /// Start the timer. The first interval begins now.
    pub fn start() -> Self {
        LapTimer {
            checkpoint: Instant::now(),
            laps: Vec::new(),
        }
    }

    /// Build a timer from pre-recorded lap durations (seconds).
    ///
    /// Intended for tests and offline analysis; the embedded checkpoint
    /// still allows further live laps to be appended.
    pub fn from_laps(laps: Vec<f64>) -> Self {
        LapTimer {
            checkpoint: Instant::now(),
            laps,
        }
    }

    /// Close the current interval, record its duration, and start the
    /// next interval.
    pub fn next_lap(&mut self) {
        let now = Instant::now();
        self.laps.push(now.duration_since(self.checkpoint).as_secs_f64());
        self.checkpoint = now;
    }

    /// All recorded laps, in recording order.
    pub fn laps(&self) -> &[f64] {
        &self.laps
    }

    /// The laps that survive trimming: sorted by duration, with the
    /// lowest 20% and highest 20% removed.
    pub fn laps_filtered(&self) -> Vec<f64> {
        let mut sorted = self.laps.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let trim = sorted.len() / 5;
        sorted[trim..sorted.len() - trim].to_vec()
    }

    /// Trimmed mean lap duration in seconds. 0.0 if no laps recorded.
    pub fn lap_avg(&self) -> f64 {
        let window = self.laps_filtered();
        if window.is_empty() {
            return 0.0;
        }
        window.iter().sum::<f64>() / window.len() as f64
    }

    /// Trimmed standard deviation of lap duration in seconds.
    /// 0.0 if no laps recorded.
    pub fn lap_std(&self) -> f64 {
        let window = self.laps_filtered();
        if window.is_empty() {
            return 0.0;
        }
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        let var = window
            .iter()
            .map(|&x| (x - mean) * (x - mean))
            .sum::<f64>()
            / window.len() as f64;
        var.sqrt()
    }
}
