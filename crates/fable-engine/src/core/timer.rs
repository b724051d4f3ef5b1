/// Elapsed time the timer may reach before resetting to zero.
///
/// Effectively "never" in practice (~317,000 years of milliseconds) but keeps
/// long sessions from growing without bound. A reset drops absolute-time
/// continuity; callers must not assume monotonicity across it and should use
/// [`Timer::time_since`] for differences.
pub const CYCLE_CEILING: u64 = 10_000_000_000_000_000;

/// Frame timer: elapsed engine time plus a frames-per-second measurement
/// over a rolling one-second window.
///
/// `tick` must be called exactly once per engine frame, with a wall-clock
/// millisecond reading supplied by the host.
pub struct Timer {
    /// Elapsed engine time in milliseconds. Wraps at [`CYCLE_CEILING`].
    time: u64,
    /// Wall time of the previous tick.
    last_tick: u64,
    /// Engine time at the last completed one-second window boundary.
    last_frame_time: u64,
    /// Ticks observed in the current window.
    frame_ticks: u32,
    /// Ticks counted during the most recently completed window.
    fps: u32,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            time: 0,
            last_tick: 0,
            last_frame_time: 0,
            frame_ticks: 0,
            fps: 60,
        }
    }

    /// Advance the timer to `now_ms` (host wall clock, milliseconds).
    ///
    /// The first tick observes a zero delta. Once elapsed time passes the
    /// cycle ceiling it resets to zero before accumulating the new delta.
    pub fn tick(&mut self, now_ms: u64) {
        let delta = if self.last_tick == 0 {
            0
        } else {
            now_ms.saturating_sub(self.last_tick)
        };

        if self.time > CYCLE_CEILING {
            self.time = 0;
        }

        self.time += delta;
        self.last_tick = now_ms;

        if self.last_frame_time == 0 {
            self.last_frame_time = self.time;
        }

        // Window boundary check goes through time_since so a cycle reset
        // between boundaries cannot underflow.
        if self.time_since(self.last_frame_time) >= 1000 {
            self.fps = self.frame_ticks;
            self.frame_ticks = 0;
            self.last_frame_time = self.time;
        }

        self.frame_ticks += 1;
    }

    /// Current elapsed engine time in milliseconds.
    pub fn now(&self) -> u64 {
        self.time
    }

    /// Frames counted during the most recently completed one-second window.
    /// Starts at 60 before the first window completes.
    pub fn current_fps(&self) -> u32 {
        self.fps
    }

    /// Milliseconds elapsed since a previously recorded engine timestamp.
    ///
    /// Handles the wraparound case where `t` was recorded just before a
    /// cycle reset: the result is `time + CYCLE_CEILING - t`, never a
    /// negative (underflowed) value.
    pub fn time_since(&self, t: u64) -> u64 {
        if t > self.time {
            self.time + CYCLE_CEILING - t
        } else {
            self.time - t
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_zero_delta() {
        let mut timer = Timer::new();
        timer.tick(5_000);
        assert_eq!(timer.now(), 0);
    }

    #[test]
    fn elapsed_time_accumulates() {
        let mut timer = Timer::new();
        timer.tick(1_000);
        timer.tick(1_016);
        timer.tick(1_032);
        assert_eq!(timer.now(), 32);
    }

    #[test]
    fn time_since_is_monotonic_below_ceiling() {
        let mut timer = Timer::new();
        timer.tick(1_000);
        let mut stamps = Vec::new();
        for i in 1..=10 {
            timer.tick(1_000 + i * 16);
            stamps.push(timer.now());
        }
        // Later stamps yield smaller (non-increasing) deltas.
        let deltas: Vec<u64> = stamps.iter().map(|&t| timer.time_since(t)).collect();
        for pair in deltas.windows(2) {
            assert!(pair[0] >= pair[1], "deltas not monotonic: {:?}", deltas);
        }
    }

    #[test]
    fn fps_window_counts_ticks_per_second() {
        let mut timer = Timer::new();
        timer.tick(1_000);
        // 30 ticks inside the window, then one tick past the boundary.
        for i in 1..=29 {
            timer.tick(1_000 + i * 33);
        }
        timer.tick(2_100);
        assert_eq!(timer.current_fps(), 30);
    }

    #[test]
    fn fps_unchanged_before_window_completes() {
        let mut timer = Timer::new();
        timer.tick(1_000);
        timer.tick(1_100);
        timer.tick(1_200);
        assert_eq!(timer.current_fps(), 60);
    }

    #[test]
    fn cycle_wrap_resets_and_time_since_stays_positive() {
        let mut timer = Timer::new();
        timer.tick(10);
        // Push elapsed time exactly to the ceiling.
        timer.tick(10 + CYCLE_CEILING);
        let before_wrap = timer.now();
        assert_eq!(before_wrap, CYCLE_CEILING);

        // Next tick detects time > ceiling is false (==), one more pushes past.
        timer.tick(10 + CYCLE_CEILING + 5);
        timer.tick(10 + CYCLE_CEILING + 9);
        let now = timer.now();
        assert!(now < before_wrap, "timer should have wrapped: {}", now);

        // Timestamp recorded before the wrap still compares correctly.
        assert_eq!(timer.time_since(before_wrap), now);
    }
}
