use log::{debug, trace};
use serde::{Deserialize, Serialize};
use crate::error::{FurError, FurResult};
use crate::strands::StrandBuffer;

/// How the wave displacement relates to previous frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveMode {
    /// Displace from the rest position; idempotent for a given time
    #[default]
    RestRelative,
    /// Add the displacement onto the current position every call. Strands
    /// wander progressively and displacement is not bounded.
    Compounding,
}

/// Which points of the buffer the wave moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveTarget {
    /// First point of every segment pair
    #[default]
    SegmentStarts,
    /// Every point
    AllPoints,
}

impl WaveTarget {
    fn stride(self) -> usize {
        match self {
            WaveTarget::SegmentStarts => 2,
            WaveTarget::AllPoints => 1,
        }
    }
}

/// `y = y_rest + amplitude * sin(frequency * time + phase_scale * x_rest)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    pub amplitude: f32,
    /// Angular speed in radians per second
    pub frequency: f32,
    /// Phase advance per unit of x
    pub phase_scale: f32,
    pub mode: WaveMode,
    pub target: WaveTarget,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            amplitude: 0.01,
            frequency: 2.0,
            phase_scale: 10.0,
            mode: WaveMode::RestRelative,
            target: WaveTarget::SegmentStarts,
        }
    }
}

impl WaveParams {
    pub fn validate(&self) -> FurResult<()> {
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(FurError::Config(format!(
                "wave amplitude must be finite and non-negative, got {}",
                self.amplitude
            )));
        }
        if !self.frequency.is_finite() || !self.phase_scale.is_finite() {
            return Err(FurError::Config("wave frequency and phase_scale must be finite".into()));
        }
        Ok(())
    }

    /// Vertical offset of a point resting at `x` at time `time`
    pub fn displacement(&self, x: f32, time: f32) -> f32 {
        self.amplitude * (self.frequency * time + self.phase_scale * x).sin()
    }
}

/// Per-frame wave motion for a strand buffer
///
/// Keeps a copy of the rest positions taken when attached; every frame is
/// computed from them rather than from the previous frame.
#[derive(Debug, Clone)]
pub struct StrandAnimator {
    params: WaveParams,
    rest_positions: Vec<f32>,
}

impl StrandAnimator {
    /// Capture the rest pose of `buffer`
    pub fn attach(buffer: &StrandBuffer, params: WaveParams) -> Self {
        debug!("Animator attached to {} strand points", buffer.point_count());
        Self {
            params,
            rest_positions: buffer.positions().to_vec(),
        }
    }

    pub fn rest_positions(&self) -> &[f32] {
        &self.rest_positions
    }

    /// Move the targeted points for `time` and mark the buffer dirty
    ///
    /// Returns `false` without touching the buffer when there is nothing to
    /// animate or the buffer no longer matches the captured rest pose.
    pub fn apply(&self, buffer: &mut StrandBuffer, time: f32) -> bool {
        if buffer.is_empty() {
            return false;
        }
        if buffer.positions().len() != self.rest_positions.len() {
            trace!(
                "Skipping fur animation: buffer has {} floats, rest pose {}",
                buffer.positions().len(),
                self.rest_positions.len()
            );
            return false;
        }

        let params = &self.params;
        let rest = &self.rest_positions;
        let positions = buffer.positions_mut();
        let stride = params.target.stride() * 3;

        for base in (0..positions.len()).step_by(stride) {
            let x = rest[base];
            let offset = params.displacement(x, time);
            positions[base + 1] = match params.mode {
                WaveMode::RestRelative => rest[base + 1] + offset,
                WaveMode::Compounding => positions[base + 1] + offset,
            };
        }

        buffer.mark_dirty();
        true
    }

    /// Put every point back at rest
    pub fn restore(&self, buffer: &mut StrandBuffer) -> bool {
        if buffer.positions().len() != self.rest_positions.len() {
            return false;
        }
        buffer.positions_mut().copy_from_slice(&self.rest_positions);
        buffer.mark_dirty();
        true
    }
}
