//! Fixed timestep scheduling.
//!
//! Variable frame times are accumulated and paid out as whole simulation
//! ticks; what is left over becomes the interpolation factor for drawing.
//! A backlog is never dropped: ticks beyond the per-frame cap stay in the
//! accumulator and run back-to-back on the following frames.

/// Most ticks run for a single frame.
const MAX_TICKS_PER_FRAME: u32 = 10;

/// Accumulator turning frame times into fixed ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// Tick length in seconds
    fixed_dt: f32,
    /// Time not yet simulated
    accumulator: f32,
    /// Longest frame accepted, to avoid a spiral of death
    max_frame_time: f32,
}

impl FixedTimestep {
    /// Creates a timestep running `tick_rate` ticks per second.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        Self {
            fixed_dt: 1.0 / tick_rate.max(1) as f32,
            accumulator: 0.0,
            max_frame_time: 0.25,
        }
    }

    /// Sets the longest frame time accepted.
    #[must_use]
    pub fn with_max_frame_time(mut self, seconds: f32) -> Self {
        self.max_frame_time = seconds.max(self.fixed_dt);
        self
    }

    /// Tick length in seconds.
    #[must_use]
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt
    }

    /// Accumulate a frame's time.
    /// Returns the number of fixed ticks that should be run.
    ///
    /// A single frame counts for at most `max_frame_time`, so a stall (a
    /// debugger pause, a suspended process) is not replayed in full.
    pub fn accumulate(&mut self, frame_time: f32) -> u32 {
        self.accumulator += frame_time.clamp(0.0, self.max_frame_time);
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < MAX_TICKS_PER_FRAME {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        count
    }

    /// Whole ticks still owed after the last [`Self::accumulate`].
    #[must_use]
    pub fn backlog(&self) -> u32 {
        (self.accumulator / self.fixed_dt) as u32
    }

    /// How far the leftover time reaches into the next tick (0.0-1.0).
    #[must_use]
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.fixed_dt).fract().clamp(0.0, 1.0)
    }
}
