//! Background stepping driver
//!
//! Runs `SimulationEngine::step` on a dedicated thread at the engine's step
//! interval and publishes each completed state through a single-slot watch
//! channel. Observers only ever see whole steps. Stopping is cooperative: the
//! worker finishes the step in flight, then hands the engine back.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tokio::sync::watch;

use crate::core::config::ParameterBounds;
use crate::core::error::{Result, SlimeError};
use crate::core::types::Step;
use crate::simulation::engine::{SimulationEngine, StepReport};
use crate::simulation::random::RandomSource;
use crate::simulation::state::GridState;

/// A completed step as seen by observers
#[derive(Debug, Clone)]
pub struct Frame {
    pub step: Step,
    pub state: GridState,
    pub report: StepReport,
}

impl Frame {
    fn capture<R: RandomSource>(engine: &SimulationEngine<R>) -> Self {
        Self {
            step: engine.step_count(),
            state: engine.snapshot(),
            report: engine.report(),
        }
    }
}

/// Flags shared between the handle and the worker
struct Control {
    running: AtomicBool,
    /// Requested interval; 0 means no change pending
    pending_interval_ms: AtomicU64,
}

pub struct Driver<R: RandomSource + Send + 'static> {
    control: Arc<Control>,
    frames: watch::Receiver<Arc<Frame>>,
    bounds: ParameterBounds,
    worker: JoinHandle<SimulationEngine<R>>,
}

impl<R: RandomSource + Send + 'static> Driver<R> {
    /// Start stepping `engine`; stops by itself after `max_steps` if given
    pub fn spawn(engine: SimulationEngine<R>, max_steps: Option<u64>) -> Result<Self> {
        let control = Arc::new(Control {
            running: AtomicBool::new(true),
            pending_interval_ms: AtomicU64::new(0),
        });
        let (tx, frames) = watch::channel(Arc::new(Frame::capture(&engine)));
        let bounds = engine.bounds().clone();

        let worker_control = Arc::clone(&control);
        let worker = thread::Builder::new()
            .name("slime-stepper".into())
            .spawn(move || step_loop(engine, worker_control, tx, max_steps))?;

        tracing::info!("Driver started");
        Ok(Self {
            control,
            frames,
            bounds,
            worker,
        })
    }

    /// Latest published frame
    pub fn latest(&self) -> Arc<Frame> {
        Arc::clone(&*self.frames.borrow())
    }

    /// Independent receiver for another observer
    pub fn subscribe(&self) -> watch::Receiver<Arc<Frame>> {
        self.frames.clone()
    }

    /// Change the cadence; applied before the next sleep
    pub fn set_step_interval(&self, step_interval_ms: u64) -> Result<()> {
        self.bounds.check_interval(step_interval_ms)?;
        self.control
            .pending_interval_ms
            .store(step_interval_ms, Ordering::Release);
        Ok(())
    }

    /// True once the worker has exited (step limit reached or stopped)
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Ask the worker to stop after the current step and take the engine back
    pub fn stop(self) -> Result<SimulationEngine<R>> {
        self.control.running.store(false, Ordering::Release);
        self.worker.thread().unpark();
        let engine = self
            .worker
            .join()
            .map_err(|_| SlimeError::Driver("stepping thread panicked".into()))?;
        tracing::info!("Driver stopped at step {}", engine.step_count());
        Ok(engine)
    }
}

fn step_loop<R: RandomSource>(
    mut engine: SimulationEngine<R>,
    control: Arc<Control>,
    tx: watch::Sender<Arc<Frame>>,
    max_steps: Option<u64>,
) -> SimulationEngine<R> {
    let mut taken = 0u64;
    while max_steps.map_or(true, |max| taken < max) {
        let pending = control.pending_interval_ms.swap(0, Ordering::AcqRel);
        if pending != 0 {
            // already validated by the handle
            if let Err(e) = engine.set_step_interval(pending) {
                tracing::warn!("Ignoring step interval: {}", e);
            }
        }

        let interval = Duration::from_millis(engine.state().step_interval_ms);
        if !sleep_while_running(&control, interval) {
            break;
        }

        engine.step();
        taken += 1;
        tx.send_replace(Arc::new(Frame::capture(&engine)));
    }
    engine
}

/// Park until `interval` has elapsed; false if a stop was requested meanwhile
fn sleep_while_running(control: &Control, interval: Duration) -> bool {
    let deadline = Instant::now() + interval;
    loop {
        if !control.running.load(Ordering::Acquire) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::park_timeout(deadline - now);
    }
}
