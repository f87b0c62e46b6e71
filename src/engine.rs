// src/engine.rs
use crate::drivers::{CancelToken, CycleOutput, CycleSettings, MonitorError, Sensor, VibrationPipeline};
use crate::types::*;
use log::{debug, error, info, warn};
use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Work order handed from the dispatcher to the acquisition worker.
#[derive(Clone, Debug)]
pub struct CycleRequest {
    pub mode: OperatingMode,
    pub cancel: CancelToken,
}

/// Decides, per tick, whether a cycle may run, and owns the cancel flag of the current mode.
pub struct ModeDispatcher {
    mode: OperatingMode,
    cancel: CancelToken,
}

impl Default for ModeDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeDispatcher {
    pub fn new() -> Self {
        Self { mode: OperatingMode::Idle, cancel: CancelToken::new() }
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Cancels whatever the previous mode started and arms a fresh token.
    /// Returns `true` when the mode actually changed.
    pub fn set_mode(&mut self, mode: OperatingMode) -> bool {
        self.cancel.cancel();
        self.cancel = CancelToken::new();
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    pub fn on_tick(&self) -> Option<CycleRequest> {
        if self.mode.is_active() {
            Some(CycleRequest { mode: self.mode, cancel: self.cancel.clone() })
        } else {
            None
        }
    }
}

/// Scheduler + dispatcher thread. The pipeline (and with it the sensor) moves
/// into a dedicated worker so a long acquisition never blocks mode changes.
pub fn spawn_thread<S>(
    pipeline: VibrationPipeline<S>,
    tick_interval: Duration,
    tx: Sender<MonitorMessage>,
    rx_cmd: Receiver<GuiCommand>,
) -> JoinHandle<()>
where
    S: Sensor + Send + 'static,
{
    thread::spawn(move || {
        tx.send(MonitorMessage::Log("⚙️ Vibration engine ready.".to_owned())).ok();

        // 容量为 0 的通道: 只有当 worker 空闲等待时 try_send 才会成功
        let (cycle_tx, cycle_rx) = sync_channel::<CycleRequest>(0);
        let worker = spawn_worker(pipeline, cycle_rx, tx.clone());

        let mut dispatcher = ModeDispatcher::new();
        let mut next_tick = Instant::now() + tick_interval;

        loop {
            let wait = next_tick.saturating_duration_since(Instant::now());
            match rx_cmd.recv_timeout(wait) {
                Ok(GuiCommand::SetMode(mode)) => {
                    if dispatcher.set_mode(mode) {
                        info!("mode -> {mode}");
                    }
                    tx.send(MonitorMessage::ModeChanged(mode)).ok();
                }
                Ok(GuiCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                    dispatcher.set_mode(OperatingMode::Idle);
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {
                    next_tick += tick_interval;
                    let now = Instant::now();
                    if next_tick <= now {
                        // 落后太多时不补发
                        next_tick = now + tick_interval;
                    }
                    if !dispatch_tick(&dispatcher, &cycle_tx) {
                        break;
                    }
                }
            }
        }

        drop(cycle_tx);
        if worker.join().is_err() {
            error!("acquisition worker panicked");
        }
        debug!("engine stopped");
    })
}

/// Returns `false` once the worker is gone.
fn dispatch_tick(dispatcher: &ModeDispatcher, cycle_tx: &SyncSender<CycleRequest>) -> bool {
    let Some(request) = dispatcher.on_tick() else {
        return true;
    };
    match cycle_tx.try_send(request) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            debug!("acquisition still running, tick skipped");
            true
        }
        Err(TrySendError::Disconnected(_)) => {
            error!("acquisition worker is gone");
            false
        }
    }
}

fn spawn_worker<S>(
    mut pipeline: VibrationPipeline<S>,
    cycle_rx: Receiver<CycleRequest>,
    tx: Sender<MonitorMessage>,
) -> JoinHandle<()>
where
    S: Sensor + Send + 'static,
{
    thread::spawn(move || {
        for request in cycle_rx.iter() {
            let result = pipeline.run_cycle(&request.cancel);
            if !publish_cycle(&request, result, &tx) {
                break;
            }
        }
    })
}

/// Forwards one cycle's outcome to the GUI. Returns `false` once the GUI is gone.
fn publish_cycle(
    request: &CycleRequest,
    result: Result<CycleOutput, MonitorError>,
    tx: &Sender<MonitorMessage>,
) -> bool {
    match result {
        // 读完最后一个样本后才取消的周期同样作废
        Ok(_) if request.cancel.is_cancelled() => {
            debug!("cycle finished after its {} mode was left, report dropped", request.mode);
            true
        }
        Ok(output) => {
            let msg = MonitorMessage::Report { mode: request.mode, report: output.report };
            tx.send(msg).is_ok()
        }
        Err(MonitorError::Cancelled { .. }) => true,
        Err(err) => {
            if err.is_device_fault() {
                warn!("sensor fault, cycle aborted: {err}");
            } else {
                warn!("cycle failed: {err}");
            }
            tx.send(MonitorMessage::CycleFailed(err.to_string())).is_ok()
        }
    }
}

/// Blocking helper for terminal use: runs `cycles` back-to-back.
pub fn run_cycles<S: Sensor>(
    pipeline: &mut VibrationPipeline<S>,
    cycles: usize,
    cancel: &CancelToken,
    mut on_output: impl FnMut(usize, &CycleOutput),
) -> Result<(), MonitorError> {
    let CycleSettings { n_samples, sample_rate_hz, .. } = pipeline.settings();
    info!("running {cycles} cycle(s) of {n_samples} samples at {sample_rate_hz} Hz");
    for i in 0..cycles {
        let output = pipeline.run_cycle(cancel)?;
        on_output(i, &output);
    }
    Ok(())
}
