use std::io::Cursor;
use std::ops::Range;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::coord::Shift;
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::drivers::error::MonitorError;
use crate::drivers::fft::Spectrum;
use crate::drivers::velocity::VelocitySpectrum;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub amplitude_color: RGBColor,
    pub velocity_color: RGBColor,
    /// Captions, axis labels and mesh. Needs a system font.
    pub annotate: bool,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 600,
            background: RGBColor(10, 10, 10),
            amplitude_color: CYAN,
            velocity_color: YELLOW,
            annotate: true,
        }
    }
}
/// Acceleration amplitude (top) and particle velocity (bottom) against frequency.
pub fn render_spectrum_png(
    spectrum: &Spectrum,
    velocity: &VelocitySpectrum,
    style: &PlotStyle,
) -> Result<Vec<u8>, MonitorError> {
    if spectrum.is_empty() {
        return Err(MonitorError::Plot("spectrum has no bins".into()));
    }
    if velocity.len() != spectrum.len() {
        return Err(MonitorError::BinMismatch {
            expected: spectrum.len(),
            actual: velocity.len(),
        });
    }
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let panels = root.split_evenly((2, 1));
        let max_freq = spectrum
            .frequencies_hz()
            .last()
            .copied()
            .unwrap_or(0.0)
            .max(1e-3);
        draw_panel(
            &panels[0],
            style,
            "Acceleration amplitude (g)",
            style.amplitude_color,
            0f64..max_freq,
            spectrum.frequencies_hz(),
            spectrum.amplitudes_g(),
        )?;
        draw_panel(
            &panels[1],
            style,
            "Particle velocity (mm/s)",
            style.velocity_color,
            0f64..max_freq,
            spectrum.frequencies_hz(),
            velocity.velocities_mm_s(),
        )?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    style: &PlotStyle,
    caption: &str,
    color: RGBColor,
    x_range: Range<f64>,
    frequencies: &[f64],
    values: &[f64],
) -> Result<(), MonitorError> {
    let y_max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max)
        .max(1e-3);
    let mut builder = ChartBuilder::on(area);
    builder.margin(10);
    if style.annotate {
        builder
            .caption(caption, ("sans-serif", 18).into_font().color(&WHITE))
            .set_label_area_size(LabelAreaPosition::Left, 55)
            .set_label_area_size(LabelAreaPosition::Bottom, 35);
    }
    let mut chart = builder.build_cartesian_2d(x_range, 0f64..y_max)?;
    if style.annotate {
        chart
            .configure_mesh()
            .x_desc("Hz")
            .light_line_style(&WHITE.mix(0.1))
            .label_style(("sans-serif", 12).into_font().color(&WHITE))
            .draw()?;
    }
    let series = frequencies.iter().copied().zip(values.iter().copied());
    chart.draw_series(LineSeries::new(series, &color))?;
    Ok(())
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, MonitorError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| MonitorError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
