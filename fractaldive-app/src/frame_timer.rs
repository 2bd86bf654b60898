use std::time::{Duration, Instant};

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Averages frame time over one-second windows.
#[derive(Debug)]
pub struct FrameTimer {
    window_start: Instant,
    frames: u32,
}

impl FrameTimer {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
        }
    }

    /// Count a finished frame. Returns the average ms/frame when a window
    /// closes.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < REPORT_INTERVAL {
            return None;
        }
        let average = elapsed.as_secs_f64() * 1000.0 / f64::from(self.frames);
        self.window_start = now;
        self.frames = 0;
        Some(average)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_second() {
        let start = Instant::now();
        let mut timer = FrameTimer::new(start);

        for i in 1..10 {
            assert_eq!(timer.tick(start + Duration::from_millis(100 * i)), None);
        }
        let average = timer.tick(start + Duration::from_millis(1000)).unwrap();
        assert!((average - 100.0).abs() < 1e-9);
    }

    #[test]
    fn window_restarts_after_report() {
        let start = Instant::now();
        let mut timer = FrameTimer::new(start);
        timer.tick(start + Duration::from_secs(1)).unwrap();

        assert_eq!(timer.tick(start + Duration::from_millis(1500)), None);
        let average = timer.tick(start + Duration::from_secs(2)).unwrap();
        assert!((average - 500.0).abs() < 1e-9);
    }
}
