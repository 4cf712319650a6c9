/// Linear ramp that saturates at its bounds.
///
/// Drives the voice volume envelope: one value per sample, starting at
/// `start` and moving by `step` each call to [`LinearRamp::next_value`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRamp {
    value: f32,
    step: f32,
    min: f32,
    max: f32,
}

impl LinearRamp {
    pub fn new(start: f32, step: f32) -> Self {
        Self {
            value: start,
            step,
            min: f32::NEG_INFINITY,
            max: f32::INFINITY,
        }
    }

    /// Constant value, no movement.
    pub fn constant(value: f32) -> Self {
        Self::new(value, 0.0)
    }

    /// Saturate every produced value (including the first) to `[min, max]`.
    pub fn with_bounds(mut self, min: f32, max: f32) -> Self {
        self.min = min;
        self.max = max;
        self.value = self.value.clamp(min, max);
        self
    }

    /// Current value, then advance by one step.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        let current = self.value;
        self.value = (self.value + self.step).clamp(self.min, self.max);
        current
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn is_constant(&self) -> bool {
        self.step == 0.0
    }
}
