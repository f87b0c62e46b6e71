use std::time::Duration;
use log::{debug, info};
use crate::drivers::acquisition::{CancelToken, MagnitudeSeries, SampleAcquirer};
use crate::drivers::error::MonitorError;
use crate::drivers::fft::{SpectralAnalyzer, Spectrum};
use crate::drivers::report::{ReportGenerator, VibrationReport};
use crate::drivers::sensor::Sensor;
use crate::drivers::velocity::{VelocityEstimator, VelocitySpectrum};
/// Everything one cycle produces, handed out by value.
#[derive(Clone, Debug)]
pub struct CycleOutput {
    pub spectrum: Spectrum,
    pub velocity: VelocitySpectrum,
    pub report: VibrationReport,
}
/// Acquisition parameters for a cycle.
#[derive(Clone, Copy, Debug)]
pub struct CycleSettings {
    pub n_samples: usize,
    pub sample_rate_hz: f64,
    pub read_timeout: Duration,
}
/// Runs the pure stages on an already acquired series.
pub fn process_series(
    series: &MagnitudeSeries,
    sample_rate_hz: f64,
) -> Result<CycleOutput, MonitorError> {
    let spectrum = SpectralAnalyzer::new().analyze(series.samples(), sample_rate_hz)?;
    let velocity = VelocityEstimator::new().estimate(&spectrum);
    let report = ReportGenerator::new().summarize(&spectrum, &velocity)?;
    Ok(CycleOutput {
        spectrum,
        velocity,
        report,
    })
}
/// Acquire → spectrum → velocity → report, one cycle per call.
///
/// The pipeline owns its sensor; `run_cycle` takes `&mut self`, so two
/// acquisitions can never interleave on the same transport.
pub struct VibrationPipeline<S: Sensor> {
    acquirer: SampleAcquirer<S>,
    settings: CycleSettings,
}
impl<S: Sensor> VibrationPipeline<S> {
    pub fn new(sensor: S, settings: CycleSettings) -> Self {
        Self {
            acquirer: SampleAcquirer::new(sensor, settings.read_timeout),
            settings,
        }
    }
    pub fn settings(&self) -> CycleSettings {
        self.settings
    }
    pub fn sensor(&self) -> &S {
        self.acquirer.sensor()
    }
    pub fn run_cycle(&mut self, cancel: &CancelToken) -> Result<CycleOutput, MonitorError> {
        let CycleSettings {
            n_samples,
            sample_rate_hz,
            ..
        } = self.settings;
        let series = match self.acquirer.acquire(n_samples, sample_rate_hz, cancel) {
            Ok(series) => series,
            Err(err @ MonitorError::Cancelled { .. }) => {
                debug!("{err}; partial series discarded");
                return Err(err);
            }
            Err(err) => return Err(err),
        };
        let output = process_series(&series, sample_rate_hz)?;
        info!(
            "dominant {:.2} Hz, {:.4} g, {:.2} mm/s",
            output.report.dominant_frequency_hz,
            output.report.dominant_amplitude_g,
            output.report.dominant_velocity_mm_s
        );
        Ok(output)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::sensor::{AccelerationSample, ManualSensor, ScriptedRead};
    use crate::drivers::velocity::velocity_mm_s;
    use std::f64::consts::PI;
    fn settings(n_samples: usize, sample_rate_hz: f64) -> CycleSettings {
        CycleSettings {
            n_samples,
            sample_rate_hz,
            read_timeout: Duration::from_millis(200),
        }
    }
    fn tone(freq_hz: f64, amplitude_g: f64, rate: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 1.0 + amplitude_g * (2.0 * PI * freq_hz * i as f64 / rate).sin())
            .collect()
    }
    #[test]
    fn still_machine_reports_dc_and_zero_velocity() {
        let series = MagnitudeSeries::from(vec![1.0; 100]);
        let output = process_series(&series, 100.0).unwrap();
        assert_eq!(output.spectrum.len(), 50);
        assert!(output.spectrum.amplitudes_g().iter().all(|a| a.abs() < 1e-9));
        assert_eq!(output.report.dominant_frequency_hz, 0.0);
        assert_eq!(output.report.dominant_velocity_mm_s, 0.0);
    }
    #[test]
    fn ten_hertz_vibration_is_reported() {
        let series = MagnitudeSeries::from(tone(10.0, 0.05, 100.0, 100));
        let report = process_series(&series, 100.0).unwrap().report;
        assert!((report.dominant_frequency_hz - 10.0).abs() <= 1.0);
        let expected = velocity_mm_s(report.dominant_frequency_hz, report.dominant_amplitude_g);
        assert!((report.dominant_velocity_mm_s - expected).abs() < 1e-9);
    }
    #[test]
    fn full_cycle_from_sensor_readings() {
        let rate = 1000.0;
        let n = 200;
        let sensor = ManualSensor::from_magnitudes(&tone(100.0, 0.2, rate, n));
        let mut pipeline = VibrationPipeline::new(sensor, settings(n, rate));
        let output = pipeline.run_cycle(&CancelToken::new()).unwrap();
        assert_eq!(output.spectrum.len(), n / 2);
        assert_eq!(output.velocity.len(), n / 2);
        assert!((output.report.dominant_frequency_hz - 100.0).abs() <= rate / n as f64);
        assert_eq!(pipeline.sensor().reads(), n);
    }
    #[test]
    fn repeated_cycles_are_independent() {
        let rate = 1000.0;
        let mut readings = tone(50.0, 0.1, rate, 40);
        readings.extend(tone(50.0, 0.1, rate, 40));
        let sensor = ManualSensor::from_magnitudes(&readings);
        let mut pipeline = VibrationPipeline::new(sensor, settings(40, rate));
        let first = pipeline.run_cycle(&CancelToken::new()).unwrap();
        let second = pipeline.run_cycle(&CancelToken::new()).unwrap();
        assert_eq!(first.report, second.report);
    }
    #[test]
    fn device_failure_yields_no_report() {
        let sensor = ManualSensor::new(vec![
            ScriptedRead::Sample(AccelerationSample::new(0.0, 0.0, 1.0)),
            ScriptedRead::IoFailure,
        ]);
        let mut pipeline = VibrationPipeline::new(sensor, settings(10, 1000.0));
        let err = pipeline.run_cycle(&CancelToken::new()).unwrap_err();
        assert!(err.is_device_fault());
    }
    #[test]
    fn cancelled_cycle_yields_no_report() {
        let token = CancelToken::new();
        token.cancel();
        let sensor = ManualSensor::from_magnitudes(&[1.0; 10]);
        let mut pipeline = VibrationPipeline::new(sensor, settings(10, 1000.0));
        let err = pipeline.run_cycle(&token).unwrap_err();
        assert!(matches!(err, MonitorError::Cancelled { completed: 0, .. }));
        assert_eq!(pipeline.sensor().reads(), 0);
    }
    #[test]
    fn cancellation_mid_acquisition_discards_partial_series() {
        struct SwitchedAway {
            token: CancelToken,
            reads: usize,
        }
        impl Sensor for SwitchedAway {
            fn read_axes(&mut self) -> Result<AccelerationSample, MonitorError> {
                self.reads += 1;
                if self.reads == 7 {
                    self.token.cancel();
                }
                Ok(AccelerationSample::new(0.0, 0.0, 1.0))
            }
        }
        let token = CancelToken::new();
        let sensor = SwitchedAway {
            token: token.clone(),
            reads: 0,
        };
        let mut pipeline = VibrationPipeline::new(sensor, settings(50, 1000.0));
        let result = pipeline.run_cycle(&token);
        assert!(matches!(
            result,
            Err(MonitorError::Cancelled {
                completed: 7,
                requested: 50
            })
        ));
        assert_eq!(pipeline.sensor().reads, 7);
    }
    #[test]
    fn single_sample_cycle_has_nothing_to_summarize() {
        let sensor = ManualSensor::from_magnitudes(&[1.0]);
        let mut pipeline = VibrationPipeline::new(sensor, settings(1, 100.0));
        assert!(matches!(
            pipeline.run_cycle(&CancelToken::new()),
            Err(MonitorError::InsufficientData(_))
        ));
    }
}
