//! snapshot.rs
//! Field-complete state export for the control plane.
//!
//! One snapshot carries the whole editable configuration plus the runtime
//! telemetry, so the operator UI can always rebuild its full form state
//! from a single read. Values are post-clamp: what the engine actually
//! uses, not what the operator sent.

use serde::{Deserialize, Serialize};

use crate::engine::state::SharedControlState;

/// JSON-serializable record of configuration + telemetry + reset flag.
///
/// `setpoint` is the runtime active setpoint (0 while stopped);
/// `setpoint_cfg` is the operator-configured value. `model` is 0 for
/// first-order, 1 for second-order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub running: bool,
    pub setpoint: f64,
    pub setpoint_cfg: f64,
    pub master_setpoint: f64,
    pub use_master: bool,
    pub allow_sens: bool,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub dt: u32,
    pub model: u8,
    pub gain: f64,
    pub tau: f64,
    pub wn: f64,
    pub zeta: f64,
    pub dead: u32,
    pub time: f64,
    pub control: f64,
    pub actuator: f64,
    pub output: f64,
    pub reset: bool,
    pub act_inject: bool,
    pub act_absorb: bool,
    pub act_min: f64,
    pub act_max: f64,
}

impl StateSnapshot {
    /// JSON encoding for the wire. Serializing a plain scalar struct cannot
    /// fail.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("snapshot serializes")
    }
}

/// Copy the full shared state into a snapshot under one lock acquisition.
/// Two calls with no intervening write or tick yield identical records.
pub fn snapshot_state(state: &SharedControlState) -> StateSnapshot {
    let (cfg, rt, reset) = state.view();

    StateSnapshot {
        running: cfg.running,
        setpoint: rt.setpoint,
        setpoint_cfg: cfg.setpoint,
        master_setpoint: cfg.master_setpoint,
        use_master: cfg.use_master,
        allow_sens: cfg.allow_sens,
        kp: cfg.kp,
        ki: cfg.ki,
        kd: cfg.kd,
        dt: cfg.dt_ms,
        model: cfg.model.code(),
        gain: cfg.gain,
        tau: cfg.tau,
        wn: cfg.wn,
        zeta: cfg.zeta,
        dead: cfg.dead_time_ms,
        time: rt.time_s,
        control: rt.control,
        actuator: rt.actuator,
        output: rt.output,
        reset,
        act_inject: cfg.act_inject,
        act_absorb: cfg.act_absorb,
        act_min: cfg.act_min,
        act_max: cfg.act_max,
    }
}
