//! sim.rs
//! Per-tick simulation state machine and its periodic run loop.
//!
//! Each tick walks Idle-config-read → Reset-check → Compute → Publish:
//! snapshot the configuration (consuming the one-shot reset flag), apply a
//! pending reset, step PID → actuator → dead-time line → plant, then
//! publish telemetry. Every numeric guard resolves locally by flooring or
//! clamping; the engine never stalls or panics on out-of-range
//! configuration, it degrades to the nearest valid behaviour and keeps
//! ticking.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use log::{debug, info};
use spin_sleep::{SpinSleeper, SpinStrategy};

use crate::control::{
    actuator::actuator_apply,
    delay::DeadTimeLine,
    pid::PidController,
    plant::{
        FirstOrderParams, PlantModel, SecondOrderParams, SecondOrderState, first_order_step,
        second_order_step,
    },
};
use crate::engine::state::{PLANT_OUTPUT_BASELINE, SharedControlState};
use crate::trace::TraceRecorder;

/// Simulation engine: owns the controller, plant and delay-line state and
/// advances them one tick at a time against the shared control state.
///
/// The PID runs unconstrained (inverted clamp sentinel); the actuator stage
/// applies the physical limits.
pub struct SimEngine {
    state: Arc<SharedControlState>,
    pid: PidController,
    second: SecondOrderState,
    /// Plant output, doubling as the first-order model's state variable.
    output: f64,
    delay: DeadTimeLine,
    trace: Option<Arc<TraceRecorder>>,
}

impl SimEngine {
    pub fn new(state: Arc<SharedControlState>, trace: Option<Arc<TraceRecorder>>) -> Self {
        // view(), not begin_tick(): construction must not consume a reset
        // flag armed before the engine thread came up.
        let (cfg, _, _) = state.view();
        Self {
            state,
            pid: PidController::unclamped(cfg.kp, cfg.ki, cfg.kd),
            second: SecondOrderState::default(),
            output: PLANT_OUTPUT_BASELINE,
            delay: DeadTimeLine::new(),
            trace,
        }
    }

    /// Advance the simulation by one period. Returns the clamped tick
    /// period in milliseconds so the scheduler can pace the next call.
    ///
    /// Takes no wall-clock input: `dt` derives solely from the configured
    /// period, which keeps the engine deterministic under test.
    pub fn tick(&mut self) -> u32 {
        // Idle-config-read + Reset-check: one atomic snapshot.
        let (cfg, reset) = self.state.begin_tick();

        if reset {
            info!("simulation reset requested");
            self.pid = PidController::unclamped(cfg.kp, cfg.ki, cfg.kd);
            self.second.reset();
            self.output = PLANT_OUTPUT_BASELINE;
            self.delay.reset();
        }

        let dt_ms = cfg.dt_ms.clamp(1, 1000);
        let dt = dt_ms as f64 / 1000.0;

        // Gains hot-swap every tick; integrator and previous error persist.
        self.pid.set_gains(cfg.kp, cfg.ki, cfg.kd);

        let active_setpoint = if cfg.use_master {
            cfg.master_setpoint
        } else {
            cfg.setpoint
        };
        let setpoint = if cfg.running { active_setpoint } else { 0.0 };

        // Stopping only disables the control law; it does not reset the
        // integrator. Only an explicit reset clears PID state.
        let control = if cfg.running {
            let feedback = if cfg.allow_sens { self.output } else { 0.0 };
            let error = setpoint - feedback;
            self.pid.step(error, dt)
        } else {
            0.0
        };

        let actuator = actuator_apply(
            control,
            cfg.act_inject,
            cfg.act_absorb,
            cfg.act_min,
            cfg.act_max,
        );

        let delayed = self.delay.push_and_read(actuator, cfg.dead_time_ms, dt_ms);

        self.output = match cfg.model {
            PlantModel::FirstOrder => {
                let p = FirstOrderParams {
                    gain: cfg.gain,
                    tau: cfg.tau,
                };
                first_order_step(self.output, delayed, &p, dt)
            }
            PlantModel::SecondOrder => {
                let p = SecondOrderParams {
                    gain: cfg.gain,
                    wn: cfg.wn,
                    zeta: cfg.zeta,
                };
                second_order_step(&mut self.second, delayed, &p, dt)
            }
        };

        debug!(
            "tick: sp={:.2} u={:.3} u1={:.3} y={:.3}",
            setpoint, control, actuator, self.output
        );

        let time_s = self
            .state
            .publish(dt, setpoint, control, actuator, self.output);

        if let Some(recorder) = &self.trace {
            recorder.record(time_s, setpoint, control, actuator, self.output);
        }

        dt_ms
    }

    /// Periodic run loop: tick, then sleep until the next absolute deadline.
    /// The period is re-read every tick so an operator `dt` change takes
    /// effect on the following cycle. Runs until `running` is cleared; the
    /// production binary never clears it.
    pub fn run(&mut self, running: Arc<AtomicBool>) {
        let sleeper = SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread);
        let mut next_deadline = Instant::now();

        info!("engine loop started");
        while running.load(Ordering::Acquire) {
            let dt_ms = self.tick();
            next_deadline += Duration::from_millis(dt_ms as u64);

            let now = Instant::now();
            if now < next_deadline {
                sleeper.sleep(next_deadline - now);
            } else {
                // Fell behind schedule: restart the timeline from now
                // instead of bursting to catch up.
                debug!("engine fell behind schedule by {:?}", now - next_deadline);
                next_deadline = now;
            }
        }
        info!("engine loop stopped");
    }
}
