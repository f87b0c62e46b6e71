use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use log::debug;
use crate::drivers::sensor::Sensor;
use crate::drivers::MonitorError;
/// Longest single sleep between cancellation checks.
const CANCEL_POLL: Duration = Duration::from_millis(20);
/// Samples reserved up front; longer series grow on demand.
const MAX_PREALLOC: usize = 4096;
/// Shared flag a caller flips to abandon an in-progress cycle.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);
impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
/// Per-sample acceleration magnitudes in acquisition order, in g.
#[derive(Clone, Debug, PartialEq)]
pub struct MagnitudeSeries {
    samples: Vec<f64>,
}
impl MagnitudeSeries {
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
impl From<Vec<f64>> for MagnitudeSeries {
    fn from(samples: Vec<f64>) -> Self {
        Self { samples }
    }
}
/// Drives paced reads from an exclusively owned sensor.
pub struct SampleAcquirer<S: Sensor> {
    sensor: S,
    read_timeout: Duration,
}
impl<S: Sensor> SampleAcquirer<S> {
    pub fn new(sensor: S, read_timeout: Duration) -> Self {
        Self {
            sensor,
            read_timeout,
        }
    }
    pub fn sensor(&self) -> &S {
        &self.sensor
    }
    /// Performs exactly `n_samples` reads spaced `1 / sample_rate_hz` apart.
    ///
    /// Any read failure aborts the whole acquisition: a retry would shift every
    /// later sample off the cadence. A cancelled acquisition drops what it has
    /// collected and returns [`MonitorError::Cancelled`].
    pub fn acquire(
        &mut self,
        n_samples: usize,
        sample_rate_hz: f64,
        cancel: &CancelToken,
    ) -> Result<MagnitudeSeries, MonitorError> {
        if n_samples == 0 {
            return Err(MonitorError::InsufficientData(
                "sample count must be greater than zero",
            ));
        }
        if !(sample_rate_hz.is_finite() && sample_rate_hz > 0.0) {
            return Err(MonitorError::InvalidSampleRate(sample_rate_hz));
        }
        // A period too long for `Duration` or `Instant` is rejected like a zero rate.
        let period = Duration::try_from_secs_f64(1.0 / sample_rate_hz)
            .map_err(|_| MonitorError::InvalidSampleRate(sample_rate_hz))?;
        let mut deadline = Instant::now();
        if deadline.checked_add(period).is_none() {
            return Err(MonitorError::InvalidSampleRate(sample_rate_hz));
        }
        let mut samples = Vec::with_capacity(n_samples.min(MAX_PREALLOC));
        for i in 0..n_samples {
            if cancel.is_cancelled() {
                return Err(MonitorError::Cancelled {
                    completed: i,
                    requested: n_samples,
                });
            }
            let started = Instant::now();
            let reading = self.sensor.read_axes()?;
            if started.elapsed() > self.read_timeout {
                return Err(MonitorError::DeviceTimeout {
                    limit_ms: self.read_timeout.as_millis() as u64,
                });
            }
            samples.push(reading.magnitude());
            if i + 1 == n_samples {
                break;
            }
            deadline = deadline
                .checked_add(period)
                .ok_or(MonitorError::InvalidSampleRate(sample_rate_hz))?;
            let now = Instant::now();
            if deadline > now {
                sleep_until(deadline, cancel);
            } else {
                debug!("sample {i} overran its slot by {:?}", now - deadline);
                deadline = now;
            }
        }
        Ok(MagnitudeSeries { samples })
    }
}
/// Sleeps until `deadline`, waking early if `cancel` fires.
fn sleep_until(deadline: Instant, cancel: &CancelToken) {
    loop {
        let now = Instant::now();
        if now >= deadline || cancel.is_cancelled() {
            return;
        }
        thread::sleep((deadline - now).min(CANCEL_POLL));
    }
}
