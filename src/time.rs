use std::time::{Duration, Instant};

const MAX_DELTA: f32 = 0.25;

/// Per-frame timing: seconds since the previous frame and since startup.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last_frame: Option<Instant>,
    delta: f32,
    elapsed: f32,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last_frame: None,
            delta: 0.0,
            elapsed: 0.0,
            frames: 0,
        }
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        self.delta = match self.last_frame {
            Some(last) => seconds(now.saturating_duration_since(last)).min(MAX_DELTA),
            None => 0.0,
        };
        self.elapsed = seconds(now.saturating_duration_since(self.start));
        self.last_frame = Some(now);
        self.frames += 1;
    }

    /// Seconds since the previous frame, clamped to a quarter second.
    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

fn seconds(duration: Duration) -> f32 {
    duration.as_secs_f32()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_zero_delta() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start + Duration::from_millis(100));

        assert_eq!(clock.delta(), 0.0);
        assert!((clock.elapsed() - 0.1).abs() < 1e-4);
        assert_eq!(clock.frames(), 1);
    }

    #[test]
    fn delta_measures_time_between_ticks() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start);
        clock.tick_at(start + Duration::from_millis(16));

        assert!((clock.delta() - 0.016).abs() < 1e-4);
        assert_eq!(clock.frames(), 2);
    }

    #[test]
    fn long_stalls_are_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start);
        clock.tick_at(start + Duration::from_secs(3));

        assert_eq!(clock.delta(), MAX_DELTA);
        assert!((clock.elapsed() - 3.0).abs() < 1e-4);
    }
}
