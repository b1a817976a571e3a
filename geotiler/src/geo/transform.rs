//! Affine transformation between two coordinate planes.
//!
//! ```text
//! x' = a·x + b·y + c
//! y' = d·x + e·y + f
//! ```
//!
//! Providers use this to map raw spherical Mercator output onto the tile
//! plane. The coefficients are normally derived from three control-point
//! correspondences rather than written by hand.

use super::types::{GeoError, Point, DEGENERATE_EPSILON};

/// An invertible 2D affine map.
///
/// The determinant `a·e − b·d` is checked at construction, so every value
/// of this type can be inverted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transformation {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Transformation {
    /// Creates a transformation from its six coefficients.
    ///
    /// Fails with [`GeoError::DegenerateTransform`] when the linear part is
    /// singular or any coefficient is not finite.
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Result<Self, GeoError> {
        let determinant = a * e - b * d;
        let finite = [a, b, c, d, e, f].iter().all(|v| v.is_finite());
        if !finite || determinant == 0.0 || !determinant.is_finite() {
            return Err(GeoError::DegenerateTransform { determinant });
        }
        Ok(Self { a, b, c, d, e, f })
    }

    /// Builds a transformation from coefficients known to be invertible.
    pub(crate) const fn from_raw(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// The identity map.
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 1.0,
            f: 0.0,
        }
    }

    /// Derives the transformation mapping each source point onto its
    /// destination.
    ///
    /// Solves the two 3×3 systems for `(a, b, c)` and `(d, e, f)` with
    /// Cramer's rule.
    ///
    /// # Arguments
    ///
    /// * `pairs` - Three `(source, destination)` correspondences
    ///
    /// # Errors
    ///
    /// [`GeoError::DegenerateTransform`] if the source points are collinear.
    pub fn derive(pairs: [(Point, Point); 3]) -> Result<Self, GeoError> {
        let [(s1, d1), (s2, d2), (s3, d3)] = pairs;

        let p = s2.x - s1.x;
        let q = s2.y - s1.y;
        let r = s3.x - s1.x;
        let s = s3.y - s1.y;
        let determinant = p * s - q * r;

        if !determinant.is_finite() || determinant.abs() < DEGENERATE_EPSILON {
            return Err(GeoError::DegenerateTransform { determinant });
        }

        let solve = |t1: f64, t2: f64, t3: f64| -> (f64, f64, f64) {
            let u = t2 - t1;
            let v = t3 - t1;
            let a = (u * s - q * v) / determinant;
            let b = (p * v - r * u) / determinant;
            let c = t1 - a * s1.x - b * s1.y;
            (a, b, c)
        };

        let (a, b, c) = solve(d1.x, d2.x, d3.x);
        let (d, e, f) = solve(d1.y, d2.y, d3.y);

        Self::new(a, b, c, d, e, f)
    }

    /// Applies the forward map.
    #[inline]
    pub fn apply(&self, point: Point) -> Point {
        Point {
            x: self.a * point.x + self.b * point.y + self.c,
            y: self.d * point.x + self.e * point.y + self.f,
        }
    }

    /// Computes the algebraic inverse.
    pub fn invert(&self) -> Result<Self, GeoError> {
        let determinant = self.determinant();
        if determinant == 0.0 || !determinant.is_finite() {
            return Err(GeoError::DegenerateTransform { determinant });
        }
        let inv = 1.0 / determinant;
        Self::new(
            self.e * inv,
            -self.b * inv,
            (self.b * self.f - self.e * self.c) * inv,
            -self.d * inv,
            self.a * inv,
            (self.d * self.c - self.a * self.f) * inv,
        )
    }

    /// Returns `a·e − b·d`.
    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// Returns the coefficients as `[a, b, c, d, e, f]`.
    pub fn coefficients(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn assert_point_eq(actual: Point, expected: Point, tolerance: f64) {
        assert!(
            (actual.x - expected.x).abs() < tolerance && (actual.y - expected.y).abs() < tolerance,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_identity_apply() {
        let t = Transformation::identity();
        assert_eq!(t.apply(Point::new(5.0, 10.0)), Point::new(5.0, 10.0));
    }

    #[test]
    fn test_apply_scale_and_offset() {
        let t = Transformation::new(10.0, 0.0, 500000.0, 0.0, -10.0, 6000000.0).unwrap();
        assert_point_eq(
            t.apply(Point::new(100.0, 100.0)),
            Point::new(501000.0, 5999000.0),
            1e-9,
        );
    }

    #[test]
    fn test_new_rejects_singular() {
        let result = Transformation::new(1.0, 2.0, 0.0, 2.0, 4.0, 0.0);
        assert!(matches!(
            result,
            Err(GeoError::DegenerateTransform { .. })
        ));
    }

    #[test]
    fn test_new_rejects_nan() {
        assert!(Transformation::new(f64::NAN, 0.0, 0.0, 0.0, 1.0, 0.0).is_err());
    }

    #[test]
    fn test_invert_roundtrip() {
        let t = Transformation::new(2.0, 0.5, -3.0, -1.0, 4.0, 7.0).unwrap();
        let inv = t.invert().unwrap();
        let p = Point::new(12.5, -8.25);
        assert_point_eq(t.apply(inv.apply(p)), p, 1e-9);
        assert_point_eq(inv.apply(t.apply(p)), p, 1e-9);
    }

    #[test]
    fn test_derive_maps_control_points() {
        let pairs = [
            (Point::new(0.0, 0.0), Point::new(10.0, 20.0)),
            (Point::new(1.0, 0.0), Point::new(12.0, 21.0)),
            (Point::new(0.0, 1.0), Point::new(9.0, 23.0)),
        ];
        let t = Transformation::derive(pairs).unwrap();
        for (source, destination) in pairs {
            assert_point_eq(t.apply(source), destination, 1e-12);
        }
    }

    #[test]
    fn test_derive_spherical_mercator_square() {
        let t = Transformation::derive([
            (Point::new(-PI, PI), Point::new(0.0, 0.0)),
            (Point::new(PI, PI), Point::new(1.0, 0.0)),
            (Point::new(-PI, -PI), Point::new(0.0, 1.0)),
        ])
        .unwrap();

        let [a, b, c, d, e, f] = t.coefficients();
        assert!((a - 1.0 / (2.0 * PI)).abs() < 1e-15);
        assert!(b.abs() < 1e-15);
        assert!((c - 0.5).abs() < 1e-15);
        assert!(d.abs() < 1e-15);
        assert!((e + 1.0 / (2.0 * PI)).abs() < 1e-15);
        assert!((f - 0.5).abs() < 1e-15);

        // The fourth corner follows from the other three
        assert_point_eq(t.apply(Point::new(PI, -PI)), Point::new(1.0, 1.0), 1e-12);
    }

    #[test]
    fn test_derive_collinear_fails() {
        let result = Transformation::derive([
            (Point::new(0.0, 0.0), Point::new(0.0, 0.0)),
            (Point::new(1.0, 1.0), Point::new(1.0, 0.0)),
            (Point::new(2.0, 2.0), Point::new(0.0, 1.0)),
        ]);
        assert!(matches!(
            result,
            Err(GeoError::DegenerateTransform { .. })
        ));
    }

    #[test]
    fn test_derive_coincident_points_fail() {
        let p = Point::new(3.0, 4.0);
        let result = Transformation::derive([
            (p, Point::new(0.0, 0.0)),
            (p, Point::new(1.0, 0.0)),
            (Point::new(5.0, 5.0), Point::new(0.0, 1.0)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_derive_nearly_collinear_below_epsilon_fails() {
        let result = Transformation::derive([
            (Point::new(0.0, 0.0), Point::new(0.0, 0.0)),
            (Point::new(1.0, 1.0), Point::new(1.0, 0.0)),
            (Point::new(2.0, 2.0 + 1e-14), Point::new(0.0, 1.0)),
        ]);
        assert!(result.is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_invert_roundtrip_property(
                a in -10.0..10.0_f64,
                b in -10.0..10.0_f64,
                c in -1000.0..1000.0_f64,
                d in -10.0..10.0_f64,
                e in -10.0..10.0_f64,
                f in -1000.0..1000.0_f64,
                x in -1000.0..1000.0_f64,
                y in -1000.0..1000.0_f64,
            ) {
                prop_assume!((a * e - b * d).abs() > 0.5);
                let t = Transformation::new(a, b, c, d, e, f)?;
                let inv = t.invert()?;
                let p = Point::new(x, y);
                let back = t.apply(inv.apply(p));
                let tolerance = 1e-6 * (1.0 + x.abs().max(y.abs()));
                prop_assert!((back.x - x).abs() < tolerance, "x: {} vs {}", back.x, x);
                prop_assert!((back.y - y).abs() < tolerance, "y: {} vs {}", back.y, y);
            }
        }
    }
}
