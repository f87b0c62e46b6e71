use rustfft::{num_complex::Complex64, FftPlanner};
use crate::drivers::MonitorError;
/// Non-negative half of a real signal's DFT.
///
/// `frequencies_hz[k] == k * sample_rate / N` and `amplitudes_g[k]` is the
/// unnormalised magnitude of coefficient `k`; both hold `N / 2` bins.
#[derive(Clone, Debug, PartialEq)]
pub struct Spectrum {
    sample_rate_hz: f64,
    frequencies_hz: Vec<f64>,
    amplitudes_g: Vec<f64>,
}
impl Spectrum {
    /// Builds a spectrum from precomputed, index-aligned bins.
    pub fn from_bins(
        sample_rate_hz: f64,
        frequencies_hz: Vec<f64>,
        amplitudes_g: Vec<f64>,
    ) -> Result<Self, MonitorError> {
        if frequencies_hz.len() != amplitudes_g.len() {
            return Err(MonitorError::BinMismatch {
                expected: frequencies_hz.len(),
                actual: amplitudes_g.len(),
            });
        }
        Ok(Self {
            sample_rate_hz,
            frequencies_hz,
            amplitudes_g,
        })
    }
    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }
    pub fn frequencies_hz(&self) -> &[f64] {
        &self.frequencies_hz
    }
    pub fn amplitudes_g(&self) -> &[f64] {
        &self.amplitudes_g
    }
    pub fn len(&self) -> usize {
        self.frequencies_hz.len()
    }
    pub fn is_empty(&self) -> bool {
        self.frequencies_hz.is_empty()
    }
    /// Frequency spacing between adjacent bins.
    pub fn bin_width_hz(&self) -> Option<f64> {
        self.frequencies_hz.get(1).copied()
    }
}
/// Subtracts the series mean from every sample.
pub fn remove_dc(samples: &[f64]) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    samples.iter().map(|v| v - mean).collect()
}
/// Stateless DFT stage: DC removal, forward FFT, keep the non-negative half.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpectralAnalyzer;
impl SpectralAnalyzer {
    pub fn new() -> Self {
        Self
    }
    pub fn analyze(&self, series: &[f64], sample_rate_hz: f64) -> Result<Spectrum, MonitorError> {
        if series.is_empty() {
            return Err(MonitorError::InsufficientData(
                "cannot analyze an empty series",
            ));
        }
        if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
            return Err(MonitorError::InvalidSampleRate(sample_rate_hz));
        }
        let n = series.len();
        let half = n / 2;
        let mut buffer: Vec<Complex64> = remove_dc(series)
            .into_iter()
            .map(|v| Complex64::new(v, 0.0))
            .collect();
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(n);
        fft.process(&mut buffer);
        let bin_width = sample_rate_hz / n as f64;
        let frequencies_hz = (0..half).map(|k| k as f64 * bin_width).collect();
        let amplitudes_g = buffer.iter().take(half).map(|c| c.norm()).collect();
        Ok(Spectrum {
            sample_rate_hz,
            frequencies_hz,
            amplitudes_g,
        })
    }
}
