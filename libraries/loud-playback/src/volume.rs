//! Linear volume control

/// Linear gain applied to every rendered sample
///
/// Always within `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    gain: f32,
}

impl Volume {
    /// Create a volume, clamping into range (NaN becomes silence)
    pub fn new(gain: f32) -> Self {
        Self {
            gain: Self::clamp(gain),
        }
    }

    pub fn set(&mut self, gain: f32) {
        self.gain = Self::clamp(gain);
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Apply volume to audio buffer (in-place)
    ///
    /// Unity gain leaves the buffer untouched.
    pub fn apply(&self, buffer: &mut [f32]) {
        if self.gain == 1.0 {
            return;
        }
        for sample in buffer.iter_mut() {
            *sample *= self.gain;
        }
    }

    fn clamp(gain: f32) -> f32 {
        if gain.is_nan() {
            0.0
        } else {
            gain.clamp(0.0, 1.0)
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self { gain: 1.0 }
    }
}
