//! # PID Control-Loop Simulator
//!
//! A real-time closed-loop simulator (setpoint → PID → actuator → dead time
//! → plant → sensor feedback) plus the configuration/query protocol an HTTP
//! control plane uses to inspect and retune the loop live.
//!
//! The engine runs on its own periodic thread; the control plane runs on an
//! event-driven listener thread. Both sides exchange state only through
//! [`engine::state::SharedControlState`], one mutex-guarded consistency
//! domain with a lock-then-copy discipline.
//!
//! Every core operation is total: out-of-range configuration is clamped,
//! degenerate numerics are floored or swapped, and the tick loop never
//! stalls or panics on bad input.

pub mod control;
pub mod engine;
pub mod protocol;
pub mod server;
pub mod trace;
