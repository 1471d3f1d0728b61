//! Pure computation helpers extracted for testability.
//!
//! All functions in this module are free of Bevy ECS dependencies and operate
//! on plain numeric inputs, making them straightforward to unit-test.

/// Maps a noise value from the standard `[-1, 1]` range into `[min, max]`.
///
/// Noise generators (e.g. `Fbm<Perlin>`) produce values centred around zero.
/// This linearly rescales to an arbitrary output range.
pub fn map_noise_to_range(noise_val: f64, min: f32, max: f32) -> f32 {
    min + ((noise_val as f32 + 1.0) / 2.0) * (max - min)
}

/// Linear interpolation between `a` and `b`.
///
/// Written as `a * (1 - t) + b * t` so that `t == 0` returns `a` and `t == 1`
/// returns `b` bit-exactly.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Normalized position of `x` inside `[start, end]`, clamped to `[0, 1]`.
///
/// A zero-length or inverted window behaves as a step at `start`.
pub fn window_progress(x: f32, start: f32, end: f32) -> f32 {
    if end <= start {
        return if x >= start { 1.0 } else { 0.0 };
    }
    ((x - start) / (end - start)).clamp(0.0, 1.0)
}

/// Exponential approach of `current` toward `target` with time constant `tau`.
///
/// Snaps to `target` once within `snap`, so smoothed values settle exactly.
pub fn smooth_toward(current: f32, target: f32, dt: f32, tau: f32, snap: f32) -> f32 {
    if tau <= 0.0 {
        return target;
    }
    let next = current + (target - current) * (1.0 - (-dt / tau).exp());
    if (target - next).abs() < snap {
        target
    } else {
        next
    }
}

/// Quadratic ease-out (`1 - (1 - t)^2`), the default tween curve.
pub fn ease_out_quad(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(2)
}

/// Cubic ease-out curve: fast start, gentle deceleration.
///
/// `t` should be in `[0, 1]`. Returns `1 - (1 - t)^3`.
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Exponential ease-out: `1 - 2^(-10t)`, pinned to exactly `1` at `t == 1`.
pub fn ease_out_expo(t: f32) -> f32 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2f32.powf(-10.0 * t)
    }
}
