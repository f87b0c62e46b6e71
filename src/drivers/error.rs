use std::io;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("sensor transport read failed: {0}")]
    DeviceIo(#[source] io::Error),
    #[error("sensor read exceeded {limit_ms} ms")]
    DeviceTimeout { limit_ms: u64 },
    #[error("insufficient data: {0}")]
    InsufficientData(&'static str),
    #[error("sample rate must be finite and greater than zero, got {0}")]
    InvalidSampleRate(f64),
    #[error("bin count mismatch: expected {expected}, got {actual}")]
    BinMismatch { expected: usize, actual: usize },
    #[error("acquisition cancelled after {completed} of {requested} reads")]
    Cancelled { completed: usize, requested: usize },
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl MonitorError {
    /// Hardware failures abort the cycle; the caller may start a fresh one.
    pub fn is_device_fault(&self) -> bool {
        matches!(
            self,
            MonitorError::DeviceIo(_) | MonitorError::DeviceTimeout { .. }
        )
    }
}
impl From<io::Error> for MonitorError {
    fn from(value: io::Error) -> Self {
        match value.kind() {
            // The adapter timeout is reported by the kernel as ETIMEDOUT.
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                MonitorError::DeviceTimeout { limit_ms: 0 }
            }
            _ => MonitorError::DeviceIo(value),
        }
    }
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for MonitorError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        MonitorError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for MonitorError {
    fn from(value: image::ImageError) -> Self {
        MonitorError::Plot(value.to_string())
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn timed_out_io_maps_to_device_timeout() {
        let err: MonitorError = io::Error::new(io::ErrorKind::TimedOut, "slow bus").into();
        assert!(matches!(err, MonitorError::DeviceTimeout { .. }));
        assert!(err.is_device_fault());
    }
    #[test]
    fn other_io_maps_to_device_io() {
        let err: MonitorError = io::Error::new(io::ErrorKind::BrokenPipe, "nack").into();
        assert!(matches!(err, MonitorError::DeviceIo(_)));
        assert!(!MonitorError::InsufficientData("empty").is_device_fault());
    }
}
