// src/display.rs
use std::collections::VecDeque;
use crate::drivers::VibrationReport;
use crate::types::OperatingMode;

/// One plotted point: velocity on X, frequency on Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayPoint {
    pub velocity_mm_s: f64,
    pub frequency_hz: f64,
}

impl From<&VibrationReport> for DisplayPoint {
    fn from(report: &VibrationReport) -> Self {
        Self {
            velocity_mm_s: report.dominant_velocity_mm_s,
            frequency_hz: report.dominant_frequency_hz,
        }
    }
}

/// Rolling window of the most recent report points, gated by mode.
pub struct LiveDisplay {
    points: VecDeque<DisplayPoint>,
    capacity: usize,
    mode: OperatingMode,
}

impl LiveDisplay {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            mode: OperatingMode::Idle,
        }
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Any transition, even to the same mode, starts a fresh trace.
    pub fn set_mode(&mut self, mode: OperatingMode) {
        self.mode = mode;
        self.points.clear();
    }

    /// Appends a point if the display's mode is active; in Idle it clears instead.
    /// Returns whether the point was kept.
    pub fn push(&mut self, point: DisplayPoint) -> bool {
        if !self.mode.is_active() {
            self.points.clear();
            return false;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
        true
    }

    /// Points in arrival order, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &DisplayPoint> {
        self.points.iter()
    }

    /// Plots a report produced for `mode`. Reports from any other mode are
    /// leftovers of a cycle started before the last transition and are dropped.
    pub fn push_report(&mut self, mode: OperatingMode, report: &VibrationReport) -> bool {
        if mode != self.mode {
            return false;
        }
        self.push(DisplayPoint::from(report))
    }

    /// `[x, y]` pairs ready for a line plot.
    pub fn plot_points(&self) -> Vec<[f64; 2]> {
        self.points()
            .map(|p| [p.velocity_mm_s, p.frequency_hz])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize) -> DisplayPoint {
        DisplayPoint {
            velocity_mm_s: i as f64,
            frequency_hz: 10.0 * i as f64,
        }
    }

    #[test]
    fn idle_rejects_and_clears() {
        let mut display = LiveDisplay::new(50);
        assert!(!display.push(point(1)));
        assert!(display.is_empty());
    }

    #[test]
    fn keeps_only_the_most_recent_points_in_order() {
        let mut display = LiveDisplay::new(50);
        display.set_mode(OperatingMode::Monitoring);
        for i in 0..75 {
            assert!(display.push(point(i)));
        }
        assert_eq!(display.len(), 50);
        let kept: Vec<f64> = display.points().map(|p| p.velocity_mm_s).collect();
        let expected: Vec<f64> = (25..75).map(|i| i as f64).collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn mode_transitions_clear_the_buffer() {
        let mut display = LiveDisplay::new(50);
        display.set_mode(OperatingMode::Calibration);
        display.push(point(1));
        display.push(point(2));
        display.set_mode(OperatingMode::Monitoring);
        assert!(display.is_empty());
        display.push(point(3));
        display.set_mode(OperatingMode::Idle);
        assert!(display.is_empty());
        assert!(!display.push(point(4)));
    }

    #[test]
    fn reports_from_another_mode_are_dropped() {
        let report = VibrationReport {
            dominant_frequency_hz: 10.0,
            dominant_amplitude_g: 2.5,
            dominant_velocity_mm_s: 390.33,
        };
        let mut display = LiveDisplay::new(50);
        display.set_mode(OperatingMode::Monitoring);
        assert!(display.push_report(OperatingMode::Monitoring, &report));
        assert!(!display.push_report(OperatingMode::Calibration, &report));
        assert_eq!(display.len(), 1);

        display.set_mode(OperatingMode::Idle);
        assert!(!display.push_report(OperatingMode::Idle, &report));
        assert!(!display.push_report(OperatingMode::Monitoring, &report));
        assert!(display.is_empty());
        assert_eq!(display.mode(), OperatingMode::Idle);
        assert_eq!(display.capacity(), 50);
    }

    #[test]
    fn plot_points_put_velocity_on_x() {
        let mut display = LiveDisplay::new(3);
        display.set_mode(OperatingMode::Calibration);
        let report = VibrationReport {
            dominant_frequency_hz: 12.5,
            dominant_amplitude_g: 0.3,
            dominant_velocity_mm_s: 4.2,
        };
        display.push(DisplayPoint::from(&report));
        assert_eq!(display.plot_points(), vec![[4.2, 12.5]]);
    }
}
