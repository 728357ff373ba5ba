//! Tests for the numeric building blocks: PID law, actuator mapping,
//! dead-time line and plant models.

use pidsim::control::{
    actuator::actuator_apply,
    delay::{DEAD_TIME_CAPACITY, DeadTimeLine},
    pid::PidController,
    plant::{FirstOrderParams, SecondOrderParams, SecondOrderState, first_order_step,
            second_order_step},
};

// ============================================================================
// PID CONTROLLER TESTS
// ============================================================================

#[test]
fn test_pid_zero_dt_degrades_derivative_to_zero() {
    let mut pid = PidController::unclamped(0.0, 0.0, 1.0);

    // Pure-derivative controller: with dt <= 0 the output must be exactly 0.
    for dt in [0.0, -0.5, -1e9] {
        let out = pid.step(10.0, dt);
        assert_eq!(out, 0.0, "dt={} must not divide by zero", dt);
        assert!(out.is_finite());
    }
}

#[test]
fn test_pid_inverted_limits_disable_clamp() {
    let mut pid = PidController::new(1.0, 0.0, 0.0, 1.0, -1.0);

    let out = pid.step(5000.0, 0.01);
    assert_eq!(out, 5000.0, "sentinel pair must leave output unclamped");
}

#[test]
fn test_pid_clamps_when_limits_enabled() {
    let mut pid = PidController::new(1.0, 0.0, 0.0, -50.0, 50.0);

    assert_eq!(pid.step(5000.0, 0.01), 50.0);
    assert_eq!(pid.step(-5000.0, 0.01), -50.0);
}

#[test]
fn test_pid_integrator_accumulates_error_times_dt() {
    let mut pid = PidController::unclamped(0.0, 1.0, 0.0);

    // Constant error 10 over three 0.1 s steps: integrator 1, 2, 3.
    assert!((pid.step(10.0, 0.1) - 1.0).abs() < 1e-12);
    assert!((pid.step(10.0, 0.1) - 2.0).abs() < 1e-12);
    assert!((pid.step(10.0, 0.1) - 3.0).abs() < 1e-12);
}

#[test]
fn test_pid_reset_clears_state_but_not_gains() {
    let mut pid = PidController::unclamped(2.0, 1.0, 0.5);
    pid.step(10.0, 0.1);
    pid.step(20.0, 0.1);
    assert!(pid.integrator() > 0.0);

    pid.reset();
    assert_eq!(pid.integrator(), 0.0);

    // First step after reset: derivative sees prev_error = 0 again.
    let out = pid.step(1.0, 1.0);
    let expected = 2.0 * 1.0 + 1.0 * 1.0 + 0.5 * 1.0;
    assert!((out - expected).abs() < 1e-12);
}

// ============================================================================
// ACTUATOR MAPPER TESTS
// ============================================================================

#[test]
fn test_actuator_disabled_forces_zero() {
    for u in [-1e6, -1.0, 0.0, 42.0, 1e6] {
        assert_eq!(actuator_apply(u, false, false, -100.0, 100.0), 0.0);
    }
}

#[test]
fn test_actuator_inject_only_never_negative() {
    for u in [-500.0, -1.0, 0.0, 3.0, 500.0] {
        let out = actuator_apply(u, true, false, -100.0, 100.0);
        assert!(out >= 0.0, "inject-only produced {} for u={}", out, u);
    }
    // In-range positive values pass through.
    assert_eq!(actuator_apply(42.0, true, false, -100.0, 100.0), 42.0);
}

#[test]
fn test_actuator_absorb_only_never_positive() {
    for u in [-500.0, -3.0, 0.0, 1.0, 500.0] {
        let out = actuator_apply(u, false, true, -100.0, 100.0);
        assert!(out <= 0.0, "absorb-only produced {} for u={}", out, u);
    }
    assert_eq!(actuator_apply(-42.0, false, true, -100.0, 100.0), -42.0);
}

#[test]
fn test_actuator_both_directions_use_limits_as_given() {
    assert_eq!(actuator_apply(250.0, true, true, -100.0, 100.0), 100.0);
    assert_eq!(actuator_apply(-250.0, true, true, -100.0, 100.0), -100.0);
    assert_eq!(actuator_apply(7.5, true, true, -100.0, 100.0), 7.5);
}

#[test]
fn test_actuator_swaps_inverted_limits() {
    // min > max is normalized before clamping.
    assert_eq!(actuator_apply(250.0, true, true, 100.0, -100.0), 100.0);
    assert_eq!(actuator_apply(-250.0, true, true, 100.0, -100.0), -100.0);
}

// ============================================================================
// DEAD-TIME LINE TESTS
// ============================================================================

#[test]
fn test_delay_zero_is_passthrough() {
    let mut line = DeadTimeLine::new();

    for i in 0..1000 {
        let sample = i as f64 * 0.5;
        assert_eq!(line.push_and_read(sample, 0, 10), sample);
    }
}

#[test]
fn test_delay_k_ticks_returns_sample_from_k_ticks_ago() {
    let k = 5u32;
    let tick_ms = 10u32;
    let mut line = DeadTimeLine::new();

    // Run well past the ring capacity to cover wraparound.
    let mut pushed = Vec::new();
    for n in 0..(3 * DEAD_TIME_CAPACITY) {
        let sample = (n * n) as f64;
        pushed.push(sample);
        let delayed = line.push_and_read(sample, k * tick_ms, tick_ms);

        if n >= k as usize {
            assert_eq!(delayed, pushed[n - k as usize], "tick {}", n);
        } else {
            // Before the line fills, the zero-initialized buffer is read.
            assert_eq!(delayed, 0.0, "tick {}", n);
        }
    }
}

#[test]
fn test_delay_clamps_to_capacity() {
    let mut line = DeadTimeLine::new();
    // Dead time far beyond the ring: clamps to capacity - 1 ticks.
    line.push_and_read(1.0, u32::MAX, 1);
    assert_eq!(line.delay_ticks(), DEAD_TIME_CAPACITY - 1);
}

#[test]
fn test_delay_change_takes_effect_next_push() {
    let mut line = DeadTimeLine::new();
    for n in 0..10 {
        line.push_and_read(n as f64, 30, 10);
    }
    // Shrink the delay: the next read jumps forward, no re-interpolation.
    let delayed = line.push_and_read(10.0, 10, 10);
    assert_eq!(delayed, 9.0);
    // Delay zero: immediate passthrough again.
    let delayed = line.push_and_read(11.0, 0, 10);
    assert_eq!(delayed, 11.0);
}

// ============================================================================
// PLANT MODEL TESTS
// ============================================================================

#[test]
fn test_first_order_converges_to_gain_times_input() {
    let p = FirstOrderParams { gain: 2.0, tau: 1.0 };
    let u = 3.0;
    let dt = 0.01;

    let mut y = 0.0;
    for _ in 0..10_000 {
        y = first_order_step(y, u, &p, dt);
    }

    assert!(
        (y - p.gain * u).abs() < 1e-3,
        "steady state {} should approach {}",
        y,
        p.gain * u
    );
}

#[test]
fn test_first_order_floors_degenerate_tau() {
    let p = FirstOrderParams { gain: 1.0, tau: 0.0 };
    let y = first_order_step(1.0, 1.0, &p, 0.000_1);
    assert!(y.is_finite(), "tau=0 must not divide by zero");
}

#[test]
fn test_second_order_converges_to_gain_times_input() {
    let p = SecondOrderParams { gain: 2.0, wn: 1.0, zeta: 0.9 };
    let u = 3.0;
    let dt = 0.005;

    let mut s = SecondOrderState::default();
    let mut y = 0.0;
    for _ in 0..50_000 {
        y = second_order_step(&mut s, u, &p, dt);
    }

    assert!(
        (y - p.gain * u).abs() < 1e-2,
        "steady state {} should approach {}",
        y,
        p.gain * u
    );
}

#[test]
fn test_second_order_floors_degenerate_params() {
    let p = SecondOrderParams { gain: 1.0, wn: 0.0, zeta: -5.0 };
    let mut s = SecondOrderState::default();
    let y = second_order_step(&mut s, 1.0, &p, 0.001);
    assert!(y.is_finite());
    assert!(s.x2.is_finite());
}
