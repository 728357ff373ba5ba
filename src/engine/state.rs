//! state.rs
//! Shared control state: one consistency domain (configuration + runtime
//! telemetry + one-shot reset flag) guarded by a single lock.
//!
//! Locking discipline: every field is read or written while holding the
//! lock, critical sections are plain field copies, and no reference to the
//! guarded data escapes the lock boundary. The engine is the tick-rate
//! writer of telemetry; the control plane is a burst writer of configuration
//! and a reader of everything.

use parking_lot::Mutex;

use crate::control::plant::PlantModel;

/// Plant output the simulation starts from and returns to on reset.
pub const PLANT_OUTPUT_BASELINE: f64 = 25.0;

/// Operator-facing loop configuration, mutable via the query protocol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub setpoint: f64,
    pub master_setpoint: f64,
    /// Master (external) setpoint drives the loop instead of the operator one.
    pub use_master: bool,
    /// Feed the plant output back into the error term.
    pub allow_sens: bool,
    /// Tick period in milliseconds; the engine clamps to 1..=1000.
    pub dt_ms: u32,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub model: PlantModel,
    pub gain: f64,
    pub tau: f64,
    pub wn: f64,
    pub zeta: f64,
    pub dead_time_ms: u32,
    pub act_inject: bool,
    pub act_absorb: bool,
    pub act_min: f64,
    pub act_max: f64,
    pub running: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            setpoint: 200.0,
            master_setpoint: 0.0,
            use_master: false,
            allow_sens: true,
            dt_ms: 10,
            kp: 2.0,
            ki: 0.5,
            kd: 0.1,
            model: PlantModel::FirstOrder,
            gain: 2.0,
            tau: 8.0,
            wn: 1.2,
            zeta: 0.7,
            dead_time_ms: 0,
            act_inject: true,
            act_absorb: true,
            act_min: -100.0,
            act_max: 100.0,
            running: false,
        }
    }
}

/// Engine-owned telemetry, read-only to the control plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimRuntime {
    pub time_s: f64,
    /// Effective setpoint of the last tick (0 while stopped).
    pub setpoint: f64,
    /// Raw controller output.
    pub control: f64,
    /// Post-actuator output.
    pub actuator: f64,
    /// Plant output.
    pub output: f64,
}

impl Default for SimRuntime {
    fn default() -> Self {
        Self {
            time_s: 0.0,
            setpoint: SimConfig::default().setpoint,
            control: 0.0,
            actuator: 0.0,
            output: PLANT_OUTPUT_BASELINE,
        }
    }
}

#[derive(Debug, Default)]
struct SharedInner {
    cfg: SimConfig,
    rt: SimRuntime,
    reset_requested: bool,
}

/// The pairing `(SimConfig, SimRuntime, reset flag)` behind one lock,
/// shared between the engine thread and the control plane.
///
/// Created once at startup; lives for the process lifetime. All accessors
/// copy whole structs in or out so neither side can observe a torn state.
#[derive(Debug, Default)]
pub struct SharedControlState {
    inner: Mutex<SharedInner>,
}

impl SharedControlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the configuration and consume the one-shot reset flag in a
    /// single lock acquisition, so a reset can never be applied twice or
    /// lost between the check and the clear.
    pub fn begin_tick(&self) -> (SimConfig, bool) {
        let mut inner = self.inner.lock();
        let cfg = inner.cfg;
        let reset = inner.reset_requested;
        if reset {
            inner.reset_requested = false;
        }
        (cfg, reset)
    }

    /// Publish one tick of telemetry: advance elapsed time by `dt` and
    /// store the loop signals. Returns the new elapsed time.
    pub fn publish(&self, dt: f64, setpoint: f64, control: f64, actuator: f64, output: f64) -> f64 {
        let mut inner = self.inner.lock();
        inner.rt.time_s += dt;
        inner.rt.setpoint = setpoint;
        inner.rt.control = control;
        inner.rt.actuator = actuator;
        inner.rt.output = output;
        inner.rt.time_s
    }

    /// Copy out the full state for serialization.
    pub fn view(&self) -> (SimConfig, SimRuntime, bool) {
        let inner = self.inner.lock();
        (inner.cfg, inner.rt, inner.reset_requested)
    }

    /// Mutate the configuration and reset flag as one atomic batch. The
    /// closure runs under the lock and must restrict itself to plain field
    /// stores; it is crate-visible so only the protocol layer can reach it.
    pub(crate) fn mutate(&self, f: impl FnOnce(&mut SimConfig, &mut bool)) {
        let mut inner = self.inner.lock();
        let SharedInner {
            cfg,
            reset_requested,
            ..
        } = &mut *inner;
        f(cfg, reset_requested);
    }
}
