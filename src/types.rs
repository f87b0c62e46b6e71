// src/types.rs
use std::fmt;
use crate::drivers::VibrationReport;

// 运行模式
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum OperatingMode {
    #[default]
    Idle,
    Calibration,
    Monitoring,
}

impl OperatingMode {
    /// Calibration and Monitoring both acquire; Idle never does.
    pub fn is_active(self) -> bool {
        matches!(self, OperatingMode::Calibration | OperatingMode::Monitoring)
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperatingMode::Idle => "Idle",
            OperatingMode::Calibration => "Calibration",
            OperatingMode::Monitoring => "Monitoring",
        };
        f.write_str(name)
    }
}

// GUI 发给后台的命令
#[derive(Clone, Debug)]
pub enum GuiCommand {
    SetMode(OperatingMode),
    Shutdown,
}

// 后台发给 GUI 的消息
#[derive(Clone, Debug)]
pub enum MonitorMessage {
    Log(String),
    ModeChanged(OperatingMode),
    Report {
        mode: OperatingMode,
        report: VibrationReport,
    },
    CycleFailed(String),
}
