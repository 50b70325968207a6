/// Frame clock driving the fur animation
///
/// Holds the only persistent animation state: seconds since start.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameClock {
    time: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one frame of `dt` seconds
    ///
    /// Negative or non-finite deltas do not move time, so `time` never
    /// decreases.
    pub fn advance(&mut self, dt: f32) -> f32 {
        if dt.is_finite() && dt > 0.0 {
            self.time += dt;
        }
        self.time
    }

    pub fn time(&self) -> f32 {
        self.time
    }
}
