// src/main.rs
mod config;
mod display;
mod drivers;
mod engine;
mod gui;
mod types;
use std::path::PathBuf;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use log::info;
use config::{MonitorConfig, SensorConfig};
use drivers::{
    render_spectrum_png, CancelToken, CycleOutput, PlotStyle, Sensor, SimulatedSensor,
    VibrationPipeline,
};
type BoxedSensor = Box<dyn Sensor + Send>;
#[derive(Parser, Debug)]
#[command(name = "vibscope")]
#[command(about = "Triaxial accelerometer vibration analyzer")]
#[command(version)]
struct CliArgs {
    /// JSON configuration file (defaults to ./vibscope.json, then built-ins)
    #[arg(long, env = "VIBSCOPE_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,
    /// Run analysis cycles in the terminal instead of opening the window
    #[arg(long)]
    headless: bool,
    /// Number of cycles in headless mode
    #[arg(long, default_value_t = 1)]
    cycles: usize,
    /// Use the synthetic sensor instead of the ADXL345
    #[arg(long)]
    simulate: bool,
    /// Headless only: write the last cycle's spectrum to this PNG
    #[arg(long, value_name = "PATH", requires = "headless")]
    spectrum_png: Option<PathBuf>,
}
#[cfg(target_os = "linux")]
fn open_adxl345(bus: &str, address: u16, config: &MonitorConfig) -> Result<BoxedSensor> {
    let device = drivers::Adxl345::open(bus, address, config.read_timeout())?;
    Ok(Box::new(device))
}
#[cfg(not(target_os = "linux"))]
fn open_adxl345(_bus: &str, _address: u16, _config: &MonitorConfig) -> Result<BoxedSensor> {
    Err(anyhow!("the ADXL345 driver needs Linux i2c-dev; run with --simulate"))
}
// 设备初始化只做一次，之后传感器整体交给流水线独占
fn open_sensor(config: &MonitorConfig) -> Result<BoxedSensor> {
    match &config.sensor {
        SensorConfig::Adxl345 { bus, address } => open_adxl345(bus, *address, config),
        SensorConfig::Simulated { frequency_hz, amplitude_g, noise_g, seed } => {
            let sim = SimulatedSensor::new(
                *frequency_hz,
                *amplitude_g,
                *noise_g,
                config.sample_rate_hz,
                *seed,
            )?;
            info!("using simulated sensor: {frequency_hz} Hz at {amplitude_g} g");
            Ok(Box::new(sim))
        }
    }
}
fn run_headless(
    mut pipeline: VibrationPipeline<BoxedSensor>,
    cycles: usize,
    spectrum_png: Option<PathBuf>,
) -> Result<()> {
    let mut last: Option<CycleOutput> = None;
    engine::run_cycles(&mut pipeline, cycles, &CancelToken::new(), |_, output| {
        println!("{}", output.report);
        last = Some(output.clone());
    })?;
    if let (Some(path), Some(output)) = (spectrum_png, last) {
        let png = render_spectrum_png(&output.spectrum, &output.velocity, &PlotStyle::default())?;
        std::fs::write(&path, png)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("spectrum written to {}", path.display());
    }
    Ok(())
}
fn run_gui(pipeline: VibrationPipeline<BoxedSensor>, config: &MonitorConfig) -> Result<()> {
    let tick_interval = config.tick_interval();
    let display_capacity = config.display_capacity;
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([900.0, 480.0])
        .with_min_inner_size([640.0, 360.0])
        .with_title("vibscope");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "vibscope",
        options,
        Box::new(move |_cc| {
            Box::new(gui::VibscopeApp::new(pipeline, tick_interval, display_capacity))
        }),
    )
    .map_err(|e| anyhow!("GUI terminated with an error: {e}"))
}
// 入口函数
fn main() -> Result<()> {
    env_logger::init();
    let args = CliArgs::parse();
    let mut config =
        MonitorConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if args.simulate {
        config.sensor = SensorConfig::simulated();
    }
    let sensor = open_sensor(&config).context("failed to initialise the sensor")?;
    let pipeline = VibrationPipeline::new(sensor, config.cycle_settings());
    if args.headless {
        run_headless(pipeline, args.cycles, args.spectrum_png)
    } else {
        run_gui(pipeline, &config)
    }
}
