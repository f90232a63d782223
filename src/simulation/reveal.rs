//! Count-up animation for a projected savings figure.

use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

pub const DEFAULT_REVEAL_STEPS: u32 = 60;
pub const DEFAULT_REVEAL_DURATION: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RevealFrame {
    /// 1-based step index
    pub step: u32,
    /// Offset from the start of the animation (ms)
    pub offset_ms: u64,
    pub value: f64,
}

/// Linear interpolation from zero to a target over a fixed number of steps.
///
/// Holds no per-run state, so the same schedule can be replayed for every
/// new result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealSchedule {
    steps: u32,
    duration: Duration,
}

impl Default for RevealSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_REVEAL_STEPS, DEFAULT_REVEAL_DURATION)
    }
}

impl RevealSchedule {
    pub fn new(steps: u32, duration: Duration) -> Self {
        Self {
            steps: steps.max(1),
            duration,
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time between frames, never zero.
    pub fn period(&self) -> Duration {
        (self.duration / self.steps).max(Duration::from_millis(1))
    }

    /// Intermediate values are rounded to whole units and never overshoot
    /// the target; the last frame is exactly `target`.
    pub fn frames(&self, target: f64) -> Vec<RevealFrame> {
        let steps = self.steps;
        let total_ms = self.duration.as_millis() as u64;
        (1..=steps)
            .map(|step| {
                let value = if step == steps {
                    target
                } else {
                    let v = (target * step as f64 / steps as f64).round();
                    if target >= 0.0 {
                        v.min(target)
                    } else {
                        v.max(target)
                    }
                };
                RevealFrame {
                    step,
                    offset_ms: total_ms * step as u64 / steps as u64,
                    value,
                }
            })
            .collect()
    }

    pub fn values(&self, target: f64) -> Vec<f64> {
        self.frames(target).into_iter().map(|f| f.value).collect()
    }
}

/// Emits `frames` one per `period` into `tx`.
///
/// Stops early when the receiver is gone or `cancel` fires, so the timer never
/// outlives its consumer. Returns the number of frames delivered.
pub async fn play(
    frames: Vec<RevealFrame>,
    period: Duration,
    tx: mpsc::Sender<RevealFrame>,
    cancel: CancellationToken,
) -> usize {
    let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
    // first tick completes immediately
    interval.tick().await;

    let total = frames.len();
    let mut delivered = 0;
    for frame in frames {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(delivered, total, "reveal cancelled");
                break;
            }
            _ = interval.tick() => {}
        }
        if tx.send(frame).await.is_err() {
            debug!(delivered, total, "reveal consumer gone");
            break;
        }
        delivered += 1;
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveal_2160_is_monotone_and_exact() {
        let values = RevealSchedule::default().values(2160.0);
        assert_eq!(values.len(), 60);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(values[0], 36.0);
        assert_eq!(values[59], 2160.0);
    }

    #[test]
    fn test_fractional_target_never_overshoots() {
        let values = RevealSchedule::default().values(0.9);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert!(values.iter().all(|v| *v <= 0.9));
        assert_eq!(*values.last().unwrap(), 0.9);
    }

    #[test]
    fn test_zero_target() {
        let values = RevealSchedule::default().values(0.0);
        assert!(values.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_frame_offsets_span_duration() {
        let frames = RevealSchedule::default().frames(100.0);
        assert_eq!(frames[0].step, 1);
        assert_eq!(frames[0].offset_ms, 16);
        assert_eq!(frames[59].offset_ms, 1000);
    }

    #[test]
    fn test_zero_steps_becomes_single_frame() {
        let schedule = RevealSchedule::new(0, Duration::from_millis(500));
        assert_eq!(schedule.values(42.5), vec![42.5]);
        assert_eq!(schedule.period(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_delivers_all_frames() {
        let schedule = RevealSchedule::default();
        let (tx, mut rx) = mpsc::channel(4);
        let task = tokio::spawn(play(
            schedule.frames(2160.0),
            schedule.period(),
            tx,
            CancellationToken::new(),
        ));

        let mut received = Vec::new();
        while let Some(frame) = rx.recv().await {
            received.push(frame.value);
        }
        assert_eq!(task.await.unwrap(), 60);
        assert_eq!(received.len(), 60);
        assert_eq!(*received.last().unwrap(), 2160.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_stops_when_consumer_dropped() {
        let schedule = RevealSchedule::default();
        let (tx, mut rx) = mpsc::channel(1);
        let task = tokio::spawn(play(
            schedule.frames(2160.0),
            schedule.period(),
            tx,
            CancellationToken::new(),
        ));

        for _ in 0..5 {
            rx.recv().await.unwrap();
        }
        drop(rx);
        let delivered = task.await.unwrap();
        assert!(delivered < 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_stops_on_cancel() {
        let schedule = RevealSchedule::default();
        let (tx, _rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let delivered = play(schedule.frames(10.0), schedule.period(), tx, cancel).await;
        assert_eq!(delivered, 0);
    }
}
