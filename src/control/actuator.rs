//! actuator.rs
//! Maps the unconstrained controller output onto a physically limited,
//! direction-constrained actuator signal.
//!
//! Real actuators can only add energy (a heater), only remove it (a
//! refrigerator), or both (a motor drive). The inject/absorb flags pick the
//! mode; the limit pair bounds the magnitude.

/// Apply actuator mode and limits to a controller output.
///
/// - Neither flag set: the actuator is disabled and the output is forced to 0.
/// - Inject-only: the output cannot go below 0.
/// - Absorb-only: the output cannot exceed 0.
/// - Both: the limits are used as given.
///
/// An inverted limit pair is swapped before use, and if the directional
/// adjustment leaves `min > max` the range collapses to the single point
/// `max`. Always returns a value inside the final range.
pub fn actuator_apply(u: f64, inject: bool, absorb: bool, min_out: f64, max_out: f64) -> f64 {
    if !inject && !absorb {
        return 0.0;
    }

    // Force the limit pair to be sane before directional adjustment.
    let (mut min_out, mut max_out) = if min_out > max_out {
        (max_out, min_out)
    } else {
        (min_out, max_out)
    };

    if inject && !absorb {
        min_out = min_out.max(0.0);
        max_out = max_out.max(0.0);
    }

    if !inject && absorb {
        max_out = max_out.min(0.0);
        min_out = min_out.min(0.0);
    }

    // Degenerate single-point range after adjustment.
    if min_out > max_out {
        min_out = max_out;
    }

    u.clamp(min_out, max_out)
}
