//! Coordinate mapping between document space and raster space
//!
//! Document space has its origin at the bottom-left corner with y growing
//! upward; raster space has its origin at the top-left with y growing
//! downward. Projection applies the viewport scale and flips the y axis.

use super::types::{HighlightRect, TextItem};

/// 2x3 affine transform in the usual `[a b c d e f]` layout, with the
/// translation carried by `e` and `f`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Uniform scaling transform
    #[must_use]
    pub const fn scaling(s: f32) -> Self {
        Self {
            a: s,
            b: 0.0,
            c: 0.0,
            d: s,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Pure translation transform
    #[must_use]
    pub const fn translation(x: f32, y: f32) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: x,
            f: y,
        }
    }

    /// Compose with `inner`, which is applied first: `self * inner`
    #[must_use]
    pub fn concat(self, inner: Self) -> Self {
        Self {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    /// Apply the transform to a point
    #[must_use]
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}

/// Project a text run into raster space at the given viewport scale.
///
/// `viewport_height` is the scaled page height in raster pixels. The run's
/// origin lands at the scaled translation of its source transform, and the
/// y coordinate is flipped from bottom-up to top-down. Deterministic for a
/// given input, no side effects.
#[must_use]
pub fn project_run(
    page_index: usize,
    run: &TextItem,
    scale: f32,
    viewport_height: f32,
) -> HighlightRect {
    let device = Transform::scaling(scale).concat(run.transform);
    let width = run.width * scale;
    let height = run.height * scale;

    HighlightRect {
        page_index,
        x: device.e,
        y: viewport_height - device.f - height,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_at(x: f32, y: f32, width: f32, height: f32) -> TextItem {
        TextItem {
            text: String::new(),
            transform: Transform::translation(x, y),
            width,
            height,
        }
    }

    #[test]
    fn concat_applies_inner_first() {
        let t = Transform::scaling(2.0).concat(Transform::translation(10.0, 5.0));
        assert_eq!(t.apply(0.0, 0.0), (20.0, 10.0));
        assert_eq!(t.apply(1.0, 1.0), (22.0, 12.0));
    }

    #[test]
    fn identity_is_neutral() {
        let t = Transform::translation(3.0, 4.0);
        assert_eq!(Transform::IDENTITY.concat(t), t);
        assert_eq!(t.concat(Transform::IDENTITY), t);
    }

    #[test]
    fn projection_flips_y_axis() {
        // A run sitting at document y=700 on a 792pt page lands near the top
        // of the raster: 792 - 700 - 12 = 80.
        let rect = project_run(0, &run_at(72.0, 700.0, 100.0, 12.0), 1.0, 792.0);
        assert_eq!(rect.x, 72.0);
        assert_eq!(rect.y, 80.0);
        assert_eq!(rect.width, 100.0);
        assert_eq!(rect.height, 12.0);
    }

    #[test]
    fn projection_is_scale_linear() {
        let run = run_at(50.0, 100.0, 80.0, 10.0);
        let at_one = project_run(0, &run, 1.0, 792.0);
        let at_two = project_run(0, &run, 2.0, 1584.0);

        assert_eq!(at_two.x, at_one.x * 2.0);
        assert_eq!(at_two.y, at_one.y * 2.0);
        assert_eq!(at_two.width, at_one.width * 2.0);
        assert_eq!(at_two.height, at_one.height * 2.0);
    }

    #[test]
    fn projection_is_deterministic() {
        let run = run_at(10.0, 20.0, 30.0, 8.0);
        assert_eq!(
            project_run(3, &run, 1.5, 1188.0),
            project_run(3, &run, 1.5, 1188.0)
        );
    }
}
