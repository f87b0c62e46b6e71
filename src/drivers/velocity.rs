//! Acceleration spectrum to particle-velocity spectrum.
//!
//! A sinusoidal acceleration of amplitude `a` at frequency `f` integrates to a
//! velocity of amplitude `a / (2π f)`. Amplitudes arrive in g, are converted to
//! m/s² with [`STANDARD_GRAVITY`] and leave as mm/s. The DC bin has no finite
//! integral and is pinned to zero.
use std::f64::consts::PI;
use crate::drivers::fft::Spectrum;
/// Standard gravity used for the g to m/s² conversion.
pub const STANDARD_GRAVITY: f64 = 9.81;
const MM_PER_M: f64 = 1000.0;
/// Velocity amplitudes in mm/s, index-aligned with the source [`Spectrum`].
#[derive(Clone, Debug, PartialEq)]
pub struct VelocitySpectrum {
    velocities_mm_s: Vec<f64>,
}
impl VelocitySpectrum {
    pub fn velocities_mm_s(&self) -> &[f64] {
        &self.velocities_mm_s
    }
    pub fn len(&self) -> usize {
        self.velocities_mm_s.len()
    }
    pub fn is_empty(&self) -> bool {
        self.velocities_mm_s.is_empty()
    }
}
impl From<Vec<f64>> for VelocitySpectrum {
    fn from(velocities_mm_s: Vec<f64>) -> Self {
        Self { velocities_mm_s }
    }
}
/// Velocity (mm/s) of a single bin; zero at 0 Hz regardless of amplitude.
pub fn velocity_mm_s(frequency_hz: f64, amplitude_g: f64) -> f64 {
    if frequency_hz == 0.0 {
        return 0.0;
    }
    let acceleration_ms2 = amplitude_g * STANDARD_GRAVITY;
    acceleration_ms2 / (2.0 * PI * frequency_hz) * MM_PER_M
}
#[derive(Clone, Copy, Debug, Default)]
pub struct VelocityEstimator;
impl VelocityEstimator {
    pub fn new() -> Self {
        Self
    }
    pub fn estimate(&self, spectrum: &Spectrum) -> VelocitySpectrum {
        let velocities_mm_s = spectrum
            .frequencies_hz()
            .iter()
            .zip(spectrum.amplitudes_g())
            .map(|(&f, &a)| velocity_mm_s(f, a))
            .collect();
        VelocitySpectrum { velocities_mm_s }
    }
}
