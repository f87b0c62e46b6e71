use std::collections::VecDeque;
use std::f64::consts::PI;
use std::io;
use std::thread;
use std::time::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::drivers::MonitorError;
/// ADXL345 full-resolution scale factor.
pub const SCALE_G_PER_LSB: f64 = 0.0039;
/// One instantaneous triaxial reading, in g.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccelerationSample {
    pub x_g: f64,
    pub y_g: f64,
    pub z_g: f64,
}
impl AccelerationSample {
    pub fn new(x_g: f64, y_g: f64, z_g: f64) -> Self {
        Self { x_g, y_g, z_g }
    }
    /// Euclidean norm of the three axes.
    pub fn magnitude(&self) -> f64 {
        (self.x_g * self.x_g + self.y_g * self.y_g + self.z_g * self.z_g).sqrt()
    }
}
/// Decode one little-endian register pair as 16-bit two's complement, scaled to g.
pub fn decode_axis(lo: u8, hi: u8) -> f64 {
    i16::from_le_bytes([lo, hi]) as f64 * SCALE_G_PER_LSB
}
/// Decode the six DATAX0..DATAZ1 bytes into a sample.
pub fn decode_sample(raw: &[u8; 6]) -> AccelerationSample {
    AccelerationSample {
        x_g: decode_axis(raw[0], raw[1]),
        y_g: decode_axis(raw[2], raw[3]),
        z_g: decode_axis(raw[4], raw[5]),
    }
}
/// Anything that can deliver a single triaxial read on demand.
pub trait Sensor {
    fn read_axes(&mut self) -> Result<AccelerationSample, MonitorError>;
}
impl<S: Sensor + ?Sized> Sensor for Box<S> {
    fn read_axes(&mut self) -> Result<AccelerationSample, MonitorError> {
        (**self).read_axes()
    }
}
/// Scripted outcome for [`ManualSensor`].
#[derive(Clone, Debug)]
pub enum ScriptedRead {
    Sample(AccelerationSample),
    IoFailure,
    Timeout,
    /// Block for the given time, then return the sample.
    Stall(Duration, AccelerationSample),
}
/// In-memory sensor useful for tests and deterministic playback.
pub struct ManualSensor {
    queue: VecDeque<ScriptedRead>,
    reads: usize,
}
impl ManualSensor {
    pub fn new(script: impl IntoIterator<Item = ScriptedRead>) -> Self {
        Self {
            queue: script.into_iter().collect(),
            reads: 0,
        }
    }
    /// Plays back a magnitude series as readings along the Z axis.
    pub fn from_magnitudes(magnitudes: &[f64]) -> Self {
        Self::new(
            magnitudes
                .iter()
                .map(|&m| ScriptedRead::Sample(AccelerationSample::new(0.0, 0.0, m))),
        )
    }
    pub fn reads(&self) -> usize {
        self.reads
    }
}
impl Sensor for ManualSensor {
    fn read_axes(&mut self) -> Result<AccelerationSample, MonitorError> {
        self.reads += 1;
        match self.queue.pop_front() {
            Some(ScriptedRead::Sample(sample)) => Ok(sample),
            Some(ScriptedRead::Stall(delay, sample)) => {
                thread::sleep(delay);
                Ok(sample)
            }
            Some(ScriptedRead::Timeout) => Err(MonitorError::DeviceTimeout { limit_ms: 0 }),
            Some(ScriptedRead::IoFailure) => Err(MonitorError::DeviceIo(io::Error::new(
                io::ErrorKind::Other,
                "scripted transport failure",
            ))),
            None => Err(MonitorError::DeviceIo(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "manual sensor script exhausted",
            ))),
        }
    }
}
/// Synthetic machine: 1 g of gravity on Z plus a sinusoidal vibration and optional noise.
pub struct SimulatedSensor {
    frequency_hz: f64,
    amplitude_g: f64,
    noise_g: f64,
    dt: f64,
    t: f64,
    rng: StdRng,
}
impl SimulatedSensor {
    pub fn new(
        frequency_hz: f64,
        amplitude_g: f64,
        noise_g: f64,
        sample_rate_hz: f64,
        seed: u64,
    ) -> Result<Self, MonitorError> {
        if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
            return Err(MonitorError::InvalidSampleRate(sample_rate_hz));
        }
        Ok(Self {
            frequency_hz,
            amplitude_g,
            noise_g: noise_g.abs(),
            dt: 1.0 / sample_rate_hz,
            t: 0.0,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}
impl Sensor for SimulatedSensor {
    fn read_axes(&mut self) -> Result<AccelerationSample, MonitorError> {
        let vibration = self.amplitude_g * (2.0 * PI * self.frequency_hz * self.t).sin();
        let noise = if self.noise_g > 0.0 {
            self.rng.gen_range(-self.noise_g..=self.noise_g)
        } else {
            0.0
        };
        self.t += self.dt;
        Ok(AccelerationSample::new(0.0, 0.0, 1.0 + vibration + noise))
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn decodes_twos_complement_axes() {
        assert_eq!(decode_axis(0x00, 0x00), 0.0);
        assert!((decode_axis(0x00, 0x01) - 256.0 * 0.0039).abs() < 1e-12);
        assert!((decode_axis(0xFF, 0xFF) + 0.0039).abs() < 1e-12);
        assert!((decode_axis(0x00, 0x80) + 32768.0 * 0.0039).abs() < 1e-9);
    }
    #[test]
    fn decodes_full_register_block() {
        // x = 256 LSB, y = -1 LSB, z = 1 LSB
        let sample = decode_sample(&[0x00, 0x01, 0xFF, 0xFF, 0x01, 0x00]);
        assert!((sample.x_g - 0.9984).abs() < 1e-9);
        assert!((sample.y_g + 0.0039).abs() < 1e-12);
        assert!((sample.z_g - 0.0039).abs() < 1e-12);
    }
    #[test]
    fn magnitude_is_euclidean_norm() {
        let sample = AccelerationSample::new(3.0, 4.0, 12.0);
        assert!((sample.magnitude() - 13.0).abs() < 1e-12);
    }
    #[test]
    fn manual_sensor_plays_script_then_fails() {
        let mut sensor = ManualSensor::new(vec![
            ScriptedRead::Sample(AccelerationSample::new(0.0, 0.0, 1.0)),
            ScriptedRead::Timeout,
        ]);
        assert!(sensor.read_axes().is_ok());
        assert!(matches!(
            sensor.read_axes(),
            Err(MonitorError::DeviceTimeout { .. })
        ));
        assert!(matches!(sensor.read_axes(), Err(MonitorError::DeviceIo(_))));
        assert_eq!(sensor.reads(), 3);
    }
    #[test]
    fn simulated_sensor_is_reproducible_for_a_seed() {
        let mut a = SimulatedSensor::new(10.0, 0.05, 0.01, 100.0, 3).unwrap();
        let mut b = SimulatedSensor::new(10.0, 0.05, 0.01, 100.0, 3).unwrap();
        for _ in 0..20 {
            assert_eq!(a.read_axes().unwrap(), b.read_axes().unwrap());
        }
    }
    #[test]
    fn simulated_sensor_rejects_bad_rate() {
        assert!(matches!(
            SimulatedSensor::new(10.0, 0.05, 0.0, 0.0, 1),
            Err(MonitorError::InvalidSampleRate(_))
        ));
    }
}
