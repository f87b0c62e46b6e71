use std::fmt;
use crate::drivers::fft::Spectrum;
use crate::drivers::velocity::VelocitySpectrum;
use crate::drivers::MonitorError;
/// Dominant vibration mode of one cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VibrationReport {
    pub dominant_frequency_hz: f64,
    pub dominant_amplitude_g: f64,
    pub dominant_velocity_mm_s: f64,
}
impl fmt::Display for VibrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Vibration Analysis ---")?;
        writeln!(f, "Dominant Frequency: {:.2} Hz", self.dominant_frequency_hz)?;
        writeln!(f, "Acceleration Amplitude: {:.4} g", self.dominant_amplitude_g)?;
        write!(f, "Particle Velocity: {:.2} mm/s", self.dominant_velocity_mm_s)
    }
}
/// Index of the largest amplitude; the first one wins a tie and NaN never wins.
pub fn dominant_index(amplitudes: &[f64]) -> Option<usize> {
    if amplitudes.is_empty() {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for (idx, &amp) in amplitudes.iter().enumerate() {
        if amp.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if amp <= top => {}
            _ => best = Some((idx, amp)),
        }
    }
    Some(best.map_or(0, |(idx, _)| idx))
}
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportGenerator;
impl ReportGenerator {
    pub fn new() -> Self {
        Self
    }
    pub fn summarize(
        &self,
        spectrum: &Spectrum,
        velocity: &VelocitySpectrum,
    ) -> Result<VibrationReport, MonitorError> {
        if velocity.len() != spectrum.len() {
            return Err(MonitorError::BinMismatch {
                expected: spectrum.len(),
                actual: velocity.len(),
            });
        }
        let idx = dominant_index(spectrum.amplitudes_g()).ok_or(
            MonitorError::InsufficientData("spectrum has no bins to summarize"),
        )?;
        Ok(VibrationReport {
            dominant_frequency_hz: spectrum.frequencies_hz()[idx],
            dominant_amplitude_g: spectrum.amplitudes_g()[idx],
            dominant_velocity_mm_s: velocity.velocities_mm_s()[idx],
        })
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::velocity::VelocityEstimator;
    fn spectrum(amps: Vec<f64>) -> Spectrum {
        let freqs = (0..amps.len()).map(|k| k as f64 * 0.5).collect();
        Spectrum::from_bins(amps.len() as f64, freqs, amps).unwrap()
    }
    #[test]
    fn picks_largest_amplitude() {
        let s = spectrum(vec![0.1, 0.4, 2.0, 0.3]);
        let v = VelocityEstimator::new().estimate(&s);
        let report = ReportGenerator::new().summarize(&s, &v).unwrap();
        assert_eq!(report.dominant_frequency_hz, 1.0);
        assert_eq!(report.dominant_amplitude_g, 2.0);
        assert_eq!(report.dominant_velocity_mm_s, v.velocities_mm_s()[2]);
    }
    #[test]
    fn ties_resolve_to_first_occurrence() {
        assert_eq!(dominant_index(&[0.2, 0.9, 0.5, 0.9, 0.9]), Some(1));
        assert_eq!(dominant_index(&[0.0; 6]), Some(0));
        assert_eq!(dominant_index(&[]), None);
    }
    #[test]
    fn nan_never_wins() {
        assert_eq!(dominant_index(&[f64::NAN, 0.1, 0.3]), Some(2));
        assert_eq!(dominant_index(&[0.3, f64::NAN]), Some(0));
        assert_eq!(dominant_index(&[f64::NAN, f64::NAN]), Some(0));
    }
    #[test]
    fn flat_spectrum_reports_dc_bin_with_zero_velocity() {
        let s = spectrum(vec![0.0; 50]);
        let v = VelocityEstimator::new().estimate(&s);
        let report = ReportGenerator::new().summarize(&s, &v).unwrap();
        assert_eq!(report.dominant_frequency_hz, 0.0);
        assert_eq!(report.dominant_velocity_mm_s, 0.0);
    }
    #[test]
    fn identical_inputs_give_bitwise_identical_reports() {
        let s = spectrum(vec![0.013, 0.7, 0.699_999_9, 0.2]);
        let v = VelocityEstimator::new().estimate(&s);
        let a = ReportGenerator::new().summarize(&s, &v).unwrap();
        let b = ReportGenerator::new().summarize(&s, &v).unwrap();
        assert_eq!(a.dominant_frequency_hz.to_bits(), b.dominant_frequency_hz.to_bits());
        assert_eq!(a.dominant_amplitude_g.to_bits(), b.dominant_amplitude_g.to_bits());
        assert_eq!(a.dominant_velocity_mm_s.to_bits(), b.dominant_velocity_mm_s.to_bits());
    }
    #[test]
    fn empty_or_misaligned_inputs_are_rejected() {
        let empty = spectrum(vec![]);
        let v = VelocityEstimator::new().estimate(&empty);
        assert!(matches!(
            ReportGenerator::new().summarize(&empty, &v),
            Err(MonitorError::InsufficientData(_))
        ));
        let s = spectrum(vec![0.1, 0.2]);
        let short = VelocitySpectrum::from(vec![0.0]);
        assert!(matches!(
            ReportGenerator::new().summarize(&s, &short),
            Err(MonitorError::BinMismatch { .. })
        ));
    }
    #[test]
    fn renders_units_and_precision() {
        let report = VibrationReport {
            dominant_frequency_hz: 10.0,
            dominant_amplitude_g: 2.5,
            dominant_velocity_mm_s: 390.327_497,
        };
        let text = report.to_string();
        assert!(text.contains("Dominant Frequency: 10.00 Hz"));
        assert!(text.contains("Acceleration Amplitude: 2.5000 g"));
        assert!(text.contains("Particle Velocity: 390.33 mm/s"));
    }
}
