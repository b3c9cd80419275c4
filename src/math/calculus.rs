use crate::math::functions::Curve1;

/// Central-difference slope estimate `(f(x+dt) - f(x-dt)) / (2*dt)`.
///
/// Display-only approximation; exact on affine pieces, second-order accurate on
/// smooth curves.
pub fn central_difference(curve: &Curve1, x: f64, dt: f64) -> f64 {
    (curve.eval(x + dt) - curve.eval(x - dt)) / (2.0 * dt)
}

/// Endpoints of the tangent segment at `x`, clipped so both endpoints stay inside
/// `[x_min, x_max]`. The segment always passes through `(x, f(x))`.
pub fn tangent_segment(
    curve: &Curve1,
    x: f64,
    dt: f64,
    half_len: f64,
    x_min: f64,
    x_max: f64,
) -> ([f64; 2], [f64; 2]) {
    let slope = central_difference(curve, x, dt);
    let y = curve.eval(x);
    let x_left = (x - half_len).max(x_min);
    let x_right = (x + half_len).min(x_max);
    (
        [x_left, y + slope * (x_left - x)],
        [x_right, y + slope * (x_right - x)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_on_affine_pieces() {
        let f = Curve1::Poly {
            coeffs: vec![1.0, 1.2],
        };
        let s = central_difference(&f, 10.0, 0.1);
        assert!((s - 1.2).abs() < 1e-12);
    }

    #[test]
    fn converges_with_shrinking_dt() {
        // f(x) = x^3, f'(2) = 12.
        let f = Curve1::Poly {
            coeffs: vec![0.0, 0.0, 0.0, 1.0],
        };
        let coarse = (central_difference(&f, 2.0, 0.5) - 12.0).abs();
        let fine = (central_difference(&f, 2.0, 0.01) - 12.0).abs();
        assert!(fine < coarse);
        assert!(fine < 1e-3);
    }

    #[test]
    fn tangent_segment_clips_to_range() {
        let f = Curve1::Polyline {
            points: vec![[0.0, 0.0], [20.0, 24.0], [40.0, 30.0], [60.0, 50.0]],
        };
        let (l, r) = tangent_segment(&f, 3.0, 0.1, 15.0, 0.0, 60.0);
        assert_eq!(l[0], 0.0);
        assert_eq!(r[0], 18.0);
        // Slope of the first piece is 1.2, and the line passes through (3, 3.6).
        assert!((l[1] - 0.0).abs() < 1e-9);
        assert!((r[1] - 21.6).abs() < 1e-9);
    }
}
