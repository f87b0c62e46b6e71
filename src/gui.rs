// src/gui.rs
use eframe::egui;
use egui::Color32;
use egui_plot::{Line, Plot, PlotPoints, Points};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;
use crate::display::LiveDisplay;
use crate::drivers::{Sensor, VibrationPipeline, VibrationReport};
use crate::engine;
use crate::types::*;

pub struct VibscopeApp {
    // 系统状态 (当前模式由 display 持有)
    display: LiveDisplay,
    last_report: Option<VibrationReport>,
    cycles_ok: u64,
    cycles_failed: u64,

    // 界面日志
    log_messages: Vec<String>,

    // 通讯管道
    rx: Receiver<MonitorMessage>,
    tx_cmd: Sender<GuiCommand>,
    engine: Option<JoinHandle<()>>,
}

impl VibscopeApp {
    pub fn new<S>(pipeline: VibrationPipeline<S>, tick_interval: Duration, display_capacity: usize) -> Self
    where
        S: Sensor + Send + 'static,
    {
        let (tx, rx) = channel();
        let (tx_cmd, rx_cmd) = channel();

        // 启动后台引擎
        let handle = engine::spawn_thread(pipeline, tick_interval, tx, rx_cmd);

        Self {
            display: LiveDisplay::new(display_capacity),
            last_report: None,
            cycles_ok: 0,
            cycles_failed: 0,
            log_messages: vec!["vibscope ready. Select a mode.".to_owned()],
            rx,
            tx_cmd,
            engine: Some(handle),
        }
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > 8 { self.log_messages.remove(0); }
    }

    fn select_mode(&mut self, mode: OperatingMode) {
        // 切换模式时立即清空曲线
        self.display.set_mode(mode);
        self.tx_cmd.send(GuiCommand::SetMode(mode)).ok();
    }

    fn drain_messages(&mut self) {
        let mut msg_count = 0;
        while let Ok(msg) = self.rx.try_recv() {
            msg_count += 1;
            match msg {
                MonitorMessage::Log(s) => self.log(&s),
                MonitorMessage::ModeChanged(m) => self.log(&format!("{m} mode activated.")),
                MonitorMessage::Report { mode, report } => {
                    // 旧模式遗留的结果直接丢弃
                    if self.display.push_report(mode, &report) {
                        self.last_report = Some(report);
                        self.cycles_ok += 1;
                    }
                }
                MonitorMessage::CycleFailed(e) => {
                    self.cycles_failed += 1;
                    self.log(&format!("❌ {e}"));
                }
            }
            if msg_count > 50 { break; }
        }
    }

    fn draw_report(&self, ui: &mut egui::Ui) {
        match &self.last_report {
            Some(r) => {
                ui.monospace(format!("Dominant Frequency:     {:>10.2} Hz", r.dominant_frequency_hz));
                ui.monospace(format!("Acceleration Amplitude: {:>10.4} g", r.dominant_amplitude_g));
                ui.monospace(format!("Particle Velocity:      {:>10.2} mm/s", r.dominant_velocity_mm_s));
            }
            None => { ui.label("No report yet."); }
        }
        ui.label(format!("cycles: {} ok / {} failed", self.cycles_ok, self.cycles_failed));
        ui.label(format!("points: {} / {}", self.display.len(), self.display.capacity()));
    }
}

impl eframe::App for VibscopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 1. 消息处理
        self.drain_messages();
        if self.display.mode().is_active() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // 2. UI 绘制
        egui::SidePanel::right("modes").min_width(200.0).show(ctx, |ui| {
            ui.add_space(10.0);
            ui.heading("Mode Selector");
            ui.label(format!("Current: {}", self.display.mode()));
            ui.separator();

            if ui.button("Idle Mode").clicked() { self.select_mode(OperatingMode::Idle); }
            if ui.button("Calibration Mode").clicked() { self.select_mode(OperatingMode::Calibration); }
            if ui.button("Monitoring Mode").clicked() { self.select_mode(OperatingMode::Monitoring); }
            let stop = egui::Button::new(egui::RichText::new("Stop Monitoring").color(Color32::WHITE)).fill(Color32::DARK_RED);
            if ui.add_enabled(self.display.mode().is_active(), stop).clicked() { self.select_mode(OperatingMode::Idle); }

            ui.add_space(20.0);
            ui.separator();
            ui.label("LATEST REPORT");
            self.draw_report(ui);

            ui.add_space(10.0);
            egui::ScrollArea::vertical().max_height(140.0).show(ui, |ui| {
                for m in &self.log_messages { ui.monospace(m); }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.display.mode().is_active() {
                ui.label("Idle: select Calibration or Monitoring to start acquiring.");
            }
            let points = self.display.plot_points();
            Plot::new("velocity_plot")
                .x_axis_label("mm/s")
                .y_axis_label("Hz")
                .auto_bounds_x()
                .auto_bounds_y()
                .show(ui, |plot_ui| {
                    if !self.display.is_empty() {
                        plot_ui.line(Line::new(PlotPoints::new(points.clone())).name("dominant").color(Color32::from_rgb(0, 120, 255)).width(3.0));
                        plot_ui.points(Points::new(PlotPoints::new(points)).radius(2.5).color(Color32::WHITE));
                    }
                });
        });
    }
}

impl Drop for VibscopeApp {
    fn drop(&mut self) {
        self.tx_cmd.send(GuiCommand::Shutdown).ok();
        if let Some(handle) = self.engine.take() {
            handle.join().ok();
        }
    }
}
