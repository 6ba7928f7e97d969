//! Arc sweep math
//!
//! The sweep angle comes from the angle between the start and end radius
//! vectors, signed by direction. It therefore never exceeds half a turn,
//! except for full circles (start equals end), which sweep a whole turn.

use std::f64::consts::{PI, TAU};

/// Start and end closer than this describe a full circle
pub const FULL_CIRCLE_EPSILON: f64 = 1e-6;

/// Signed sweep of an arc in radians, positive counter-clockwise
///
/// Returns `None` when the start point coincides with the center.
pub fn sweep_angle(start: [f64; 2], end: [f64; 2], center: [f64; 2], clockwise: bool) -> Option<f64> {
    let vs = [start[0] - center[0], start[1] - center[1]];
    let ve = [end[0] - center[0], end[1] - center[1]];
    let rs = vs[0].hypot(vs[1]);
    let re = ve[0].hypot(ve[1]);
    if rs <= f64::EPSILON || re <= f64::EPSILON {
        return None;
    }

    let sign = if clockwise { -1.0 } else { 1.0 };
    if (start[0] - end[0]).hypot(start[1] - end[1]) <= FULL_CIRCLE_EPSILON {
        return Some(sign * TAU);
    }

    let cos = ((vs[0] * ve[0] + vs[1] * ve[1]) / (rs * re)).clamp(-1.0, 1.0);
    let angle = sign * cos.acos();
    Some(if angle <= -PI { angle + TAU } else { angle })
}

/// End point of an arc from its start, center and sweep
pub fn arc_end(start: [f64; 2], center: [f64; 2], angle: f64) -> [f64; 2] {
    let (sin, cos) = angle.sin_cos();
    let dx = start[0] - center[0];
    let dy = start[1] - center[1];
    [
        center[0] + dx * cos - dy * sin,
        center[1] + dx * sin + dy * cos,
    ]
}
