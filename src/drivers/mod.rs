// src/drivers/mod.rs
// 传感器采集 → 频谱 → 速度 → 报告
pub mod acquisition;
#[cfg(target_os = "linux")]
pub mod adxl345;
pub mod error;
pub mod fft;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod sensor;
pub mod velocity;
// 公开导出这些模块里的结构体，方便外部调用
pub use acquisition::{CancelToken, MagnitudeSeries, SampleAcquirer};
#[cfg(target_os = "linux")]
pub use adxl345::Adxl345;
pub use error::MonitorError;
pub use fft::{SpectralAnalyzer, Spectrum};
pub use pipeline::{process_series, CycleOutput, CycleSettings, VibrationPipeline};
pub use plot::{render_spectrum_png, PlotStyle};
pub use report::{ReportGenerator, VibrationReport};
pub use sensor::{AccelerationSample, ManualSensor, Sensor, SimulatedSensor};
pub use velocity::{VelocityEstimator, VelocitySpectrum};
