//! Exponential low-pass filtering for the fingertip velocity signal
//!
//! Two cascaded first-order stages: one over the raw velocity vector, one
//! over the resulting scalar magnitude. The magnitude stage runs on an
//! already-smoothed vector, which keeps the discrete speed mapping stable
//! without over-damping direction changes.

use glam::Vec3;

use crate::params::ControlParameters;

/// Lower bound for the smoothing coefficient. Below this the filter
/// effectively stops following the input.
pub const MIN_FILTER_STRENGTH: f32 = 0.01;
/// Upper bound for the smoothing coefficient (1.0 = passthrough).
pub const MAX_FILTER_STRENGTH: f32 = 1.0;

/// First-order exponential low-pass over a scalar signal.
///
/// `y += strength * (x - y)`; smaller strength smooths harder. The first
/// sample after construction or [`reset`](ScalarFilter::reset) passes
/// through verbatim so there is no warm-up transient.
#[derive(Debug, Clone, Copy)]
pub struct ScalarFilter {
    value: f32,
    initialized: bool,
}

impl ScalarFilter {
    pub fn new() -> Self {
        Self {
            value: 0.0,
            initialized: false,
        }
    }

    /// Feed one sample and return the smoothed value.
    pub fn filter(&mut self, sample: f32, strength: f32) -> f32 {
        if !self.initialized {
            self.value = sample;
            self.initialized = true;
            return self.value;
        }

        let alpha = strength.clamp(MIN_FILTER_STRENGTH, MAX_FILTER_STRENGTH);
        self.value += alpha * (sample - self.value);
        self.value
    }

    /// Clear the held state; the next sample passes through unchanged.
    pub fn reset(&mut self) {
        self.initialized = false;
        self.value = 0.0;
    }

    /// Last smoothed value (diagnostics).
    pub fn current_value(&self) -> f32 {
        self.value
    }
}

impl Default for ScalarFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// First-order exponential low-pass over a 3D vector, component-wise.
#[derive(Debug, Clone, Copy)]
pub struct VectorFilter {
    value: Vec3,
    initialized: bool,
}

impl VectorFilter {
    pub fn new() -> Self {
        Self {
            value: Vec3::ZERO,
            initialized: false,
        }
    }

    /// Feed one sample and return the smoothed vector.
    pub fn filter(&mut self, sample: Vec3, strength: f32) -> Vec3 {
        if !self.initialized {
            self.value = sample;
            self.initialized = true;
            return self.value;
        }

        let alpha = strength.clamp(MIN_FILTER_STRENGTH, MAX_FILTER_STRENGTH);
        self.value += (sample - self.value) * alpha;
        self.value
    }

    /// Clear the held state; the next sample passes through unchanged.
    pub fn reset(&mut self) {
        self.initialized = false;
        self.value = Vec3::ZERO;
    }

    /// Last smoothed vector (diagnostics).
    pub fn current_value(&self) -> Vec3 {
        self.value
    }
}

impl Default for VectorFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Cascaded conditioning of the raw velocity sample.
///
/// Stage 1 smooths the vector, stage 2 smooths the magnitude taken from
/// stage 1's output. Each stage has its own strength and enable flag in
/// [`ControlParameters`]; a disabled stage is reset so re-enabling it starts
/// from the then-current signal instead of a stale value.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalConditioner {
    vector: VectorFilter,
    magnitude: ScalarFilter,
}

impl SignalConditioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Condition one raw velocity sample, returning the filtered magnitude
    /// used for speed mapping.
    pub fn condition(&mut self, raw: Vec3, params: &ControlParameters) -> f32 {
        let vector = if params.vector_filter_enabled {
            self.vector.filter(raw, params.vector_filter_strength)
        } else {
            self.vector.reset();
            raw
        };

        let magnitude = vector.length();
        if params.magnitude_filter_enabled {
            self.magnitude
                .filter(magnitude, params.magnitude_filter_strength)
        } else {
            self.magnitude.reset();
            magnitude
        }
    }

    /// Reset both stages.
    pub fn reset(&mut self) {
        self.vector.reset();
        self.magnitude.reset();
    }

    /// Last smoothed vector (diagnostics).
    pub fn filtered_vector(&self) -> Vec3 {
        self.vector.current_value()
    }

    /// Last smoothed magnitude (diagnostics).
    pub fn filtered_magnitude(&self) -> f32 {
        self.magnitude.current_value()
    }
}
