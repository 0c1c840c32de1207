//! Zoom step and clamp rules for the viewport scale

/// Minimum allowed scale factor
pub const MIN_SCALE: f32 = 0.5;
/// Maximum allowed scale factor
pub const MAX_SCALE: f32 = 3.0;
/// Fixed zoom step per in/out operation
pub const ZOOM_STEP: f32 = 0.2;

/// Clamp a scale to the supported range, handling NaN/Inf
#[must_use]
pub fn clamp_scale(scale: f32) -> f32 {
    if !scale.is_finite() {
        1.0
    } else {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    }
}

/// One zoom-in step from `scale`
#[must_use]
pub fn step_in(scale: f32) -> f32 {
    clamp_scale(scale + ZOOM_STEP)
}

/// One zoom-out step from `scale`
#[must_use]
pub fn step_out(scale: f32) -> f32 {
    clamp_scale(scale - ZOOM_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_bounds() {
        assert_eq!(clamp_scale(5.0), 3.0);
        assert_eq!(clamp_scale(0.1), 0.5);
        assert_eq!(clamp_scale(1.7), 1.7);
    }

    #[test]
    fn non_finite_falls_back_to_default() {
        assert_eq!(clamp_scale(f32::NAN), 1.0);
        assert_eq!(clamp_scale(f32::INFINITY), 1.0);
    }

    #[test]
    fn steps_move_by_fixed_increment() {
        assert!((step_in(1.0) - 1.2).abs() < f32::EPSILON);
        assert!((step_out(1.0) - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn steps_saturate_at_bounds() {
        assert_eq!(step_in(2.9), 3.0);
        assert_eq!(step_in(3.0), 3.0);
        assert_eq!(step_out(0.6), 0.5);
        assert_eq!(step_out(0.5), 0.5);
    }
}
