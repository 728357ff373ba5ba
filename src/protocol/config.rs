//! config.rs
//! Typed configuration delta parsed from request key/value pairs.
//!
//! Parsing and validation happen once, up front; the application step is a
//! plain sequence of field stores under the shared lock. Unknown keys and
//! unparseable or non-finite values are ignored; out-of-range values clamp
//! to the documented bound, and the snapshot always reflects the values
//! actually stored.

use crate::control::plant::PlantModel;
use crate::engine::state::{SharedControlState, SimConfig};

/// Bounds applied by the parser. The engine re-clamps `dt` defensively, but
/// a delta produced here is already in range.
const DT_MS_RANGE: (i64, i64) = (1, 1000);
const DEAD_MS_RANGE: (i64, i64) = (0, 2560);
const GAIN_RANGE: (f64, f64) = (0.0, 10.0);
const TAU_RANGE: (f64, f64) = (0.1, 60.0);
const WN_RANGE: (f64, f64) = (0.1, 10.0);
const ZETA_RANGE: (f64, f64) = (0.0, 2.0);
const ACT_LIMIT_RANGE: (f64, f64) = (-1000.0, 1000.0);

/// Validated mutation set for one request. `None` leaves the field alone;
/// `reset` is one-shot and can only be armed, never cleared, by a request.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConfigDelta {
    pub setpoint: Option<f64>,
    pub master_setpoint: Option<f64>,
    pub kp: Option<f64>,
    pub ki: Option<f64>,
    pub kd: Option<f64>,
    pub dt_ms: Option<u32>,
    pub model: Option<PlantModel>,
    pub gain: Option<f64>,
    pub tau: Option<f64>,
    pub wn: Option<f64>,
    pub zeta: Option<f64>,
    pub dead_time_ms: Option<u32>,
    pub act_min: Option<f64>,
    pub act_max: Option<f64>,
    pub act_inject: Option<bool>,
    pub act_absorb: Option<bool>,
    pub use_master: Option<bool>,
    pub allow_sens: Option<bool>,
    pub running: Option<bool>,
    pub reset: bool,
}

impl ConfigDelta {
    /// Build a delta from ordered key/value string pairs. Pure; never fails.
    /// Later occurrences of a key overwrite earlier ones.
    pub fn parse<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut delta = ConfigDelta::default();

        for (key, value) in pairs {
            match key {
                "setpoint" => delta.setpoint = parse_float(value),
                "master_setpoint" => delta.master_setpoint = parse_float(value),
                "kp" => delta.kp = parse_float(value),
                "ki" => delta.ki = parse_float(value),
                "kd" => delta.kd = parse_float(value),
                "dt" => delta.dt_ms = parse_int_clamped(value, DT_MS_RANGE).map(|v| v as u32),
                "model" => delta.model = parse_int(value).map(PlantModel::from_code),
                "gain" => delta.gain = parse_float_clamped(value, GAIN_RANGE),
                "tau" => delta.tau = parse_float_clamped(value, TAU_RANGE),
                "wn" => delta.wn = parse_float_clamped(value, WN_RANGE),
                "zeta" => delta.zeta = parse_float_clamped(value, ZETA_RANGE),
                "dead" => {
                    delta.dead_time_ms = parse_int_clamped(value, DEAD_MS_RANGE).map(|v| v as u32)
                }
                "act_min" => delta.act_min = parse_float_clamped(value, ACT_LIMIT_RANGE),
                "act_max" => delta.act_max = parse_float_clamped(value, ACT_LIMIT_RANGE),
                "act_inject" => delta.act_inject = parse_bool(value),
                "act_absorb" => delta.act_absorb = parse_bool(value),
                "use_master" => delta.use_master = parse_bool(value),
                "allow_sens" => delta.allow_sens = parse_bool(value),
                "run" => delta.running = parse_bool(value),
                // One-shot: reset=0 must not clear a pending flag.
                "reset" => {
                    if parse_bool(value) == Some(true) {
                        delta.reset = true;
                    }
                }
                _ => {}
            }
        }

        delta
    }

    /// Store every present field into `cfg`. After all updates an inverted
    /// actuator limit pair is swapped in place, so the stored configuration
    /// is always normalized.
    pub fn apply(&self, cfg: &mut SimConfig) {
        if let Some(v) = self.setpoint {
            cfg.setpoint = v;
        }
        if let Some(v) = self.master_setpoint {
            cfg.master_setpoint = v;
        }
        if let Some(v) = self.kp {
            cfg.kp = v;
        }
        if let Some(v) = self.ki {
            cfg.ki = v;
        }
        if let Some(v) = self.kd {
            cfg.kd = v;
        }
        if let Some(v) = self.dt_ms {
            cfg.dt_ms = v;
        }
        if let Some(v) = self.model {
            cfg.model = v;
        }
        if let Some(v) = self.gain {
            cfg.gain = v;
        }
        if let Some(v) = self.tau {
            cfg.tau = v;
        }
        if let Some(v) = self.wn {
            cfg.wn = v;
        }
        if let Some(v) = self.zeta {
            cfg.zeta = v;
        }
        if let Some(v) = self.dead_time_ms {
            cfg.dead_time_ms = v;
        }
        if let Some(v) = self.act_min {
            cfg.act_min = v;
        }
        if let Some(v) = self.act_max {
            cfg.act_max = v;
        }
        if let Some(v) = self.act_inject {
            cfg.act_inject = v;
        }
        if let Some(v) = self.act_absorb {
            cfg.act_absorb = v;
        }
        if let Some(v) = self.use_master {
            cfg.use_master = v;
        }
        if let Some(v) = self.allow_sens {
            cfg.allow_sens = v;
        }
        if let Some(v) = self.running {
            cfg.running = v;
        }

        if cfg.act_min > cfg.act_max {
            std::mem::swap(&mut cfg.act_min, &mut cfg.act_max);
        }
    }
}

/// Parse and apply a request's key/value pairs against the shared state as
/// one atomic batch. Total: never fails, whatever the input.
pub fn apply_config<'a, I>(state: &SharedControlState, pairs: I)
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let delta = ConfigDelta::parse(pairs);
    state.mutate(|cfg, reset_requested| {
        delta.apply(cfg);
        if delta.reset {
            *reset_requested = true;
        }
    });
}

fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_float_clamped(value: &str, (lo, hi): (f64, f64)) -> Option<f64> {
    parse_float(value).map(|v| v.clamp(lo, hi))
}

fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

fn parse_int_clamped(value: &str, (lo, hi): (i64, i64)) -> Option<i64> {
    parse_int(value).map(|v| v.clamp(lo, hi))
}

fn parse_bool(value: &str) -> Option<bool> {
    parse_int(value).map(|v| v != 0)
}
