//! pid.rs
//! Textbook PID transfer function with integrator/previous-error state.
//!
//! The output clamp is optional: a pair with `out_min > out_max` is the
//! sentinel for "unclamped" (the engine runs the PID wide open and lets the
//! actuator stage apply the physical limits).

/// PID controller state. Gains may be hot-swapped between steps; the
/// integrator and previous error survive until an explicit [`reset`].
///
/// [`reset`]: PidController::reset
#[derive(Debug, Clone)]
pub struct PidController {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    integrator: f64,
    prev_error: f64,
    out_min: f64,
    out_max: f64,
}

impl PidController {
    /// Create a controller with gains and an output clamp `[out_min, out_max]`.
    pub fn new(kp: f64, ki: f64, kd: f64, out_min: f64, out_max: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            integrator: 0.0,
            prev_error: 0.0,
            out_min,
            out_max,
        }
    }

    /// Create a controller with no output clamp (inverted sentinel pair).
    pub fn unclamped(kp: f64, ki: f64, kd: f64) -> Self {
        Self::new(kp, ki, kd, 1.0, -1.0)
    }

    /// Replace the gains without touching integrator or previous error.
    pub fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Zero the integrator and previous error. Gains and limits untouched.
    pub fn reset(&mut self) {
        self.integrator = 0.0;
        self.prev_error = 0.0;
    }

    #[inline]
    pub fn integrator(&self) -> f64 {
        self.integrator
    }

    /// Compute one PID step for the given tracking error and time step.
    ///
    /// `dt <= 0` degrades the derivative term to 0 instead of dividing by
    /// zero; the integrator still accumulates `error * dt`.
    pub fn step(&mut self, error: f64, dt: f64) -> f64 {
        let derivative = if dt > 0.0 {
            (error - self.prev_error) / dt
        } else {
            0.0
        };
        self.integrator += error * dt;

        let mut out = self.kp * error + self.ki * self.integrator + self.kd * derivative;

        // Clamp only when the limit pair is enabled (min <= max).
        if self.out_min <= self.out_max {
            out = out.clamp(self.out_min, self.out_max);
        }

        self.prev_error = error;
        out
    }
}
