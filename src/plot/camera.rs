use glam::DVec3;
use kurbo::Point;

/// Sampled orbit-camera state for one frame.
///
/// `phi` is the polar angle from the +z axis, `theta` the azimuth in the xy
/// plane, both radians. `zoom` multiplies the base pixels-per-world-unit scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    pub phi: f64,
    pub theta: f64,
    pub zoom: f64,
}

/// Orthographic projector for world-space 3D geometry.
pub struct Projector {
    right: DVec3,
    up: DVec3,
    eye: DVec3,
    center_px: Point,
    px_per_unit: f64,
}

impl Projector {
    /// Base scale: pixels per world unit before zoom.
    pub const BASE_PX_PER_UNIT: f64 = 52.0;

    pub fn new(state: CameraState, canvas_w: u32, canvas_h: u32) -> Self {
        let (sp, cp) = state.phi.sin_cos();
        let (st, ct) = state.theta.sin_cos();
        // Unit vector from the origin toward the camera.
        let eye = DVec3::new(sp * ct, sp * st, cp);

        // Screen basis: keep world +z pointing up on screen. Near the poles fall
        // back to world +y as the up reference.
        let up_ref = if sp.abs() < 1e-6 {
            DVec3::Y
        } else {
            DVec3::Z
        };
        let right = up_ref.cross(eye).normalize();
        let up = eye.cross(right).normalize();

        Self {
            right,
            up,
            eye,
            center_px: Point::new(f64::from(canvas_w) * 0.5, f64::from(canvas_h) * 0.55),
            px_per_unit: Self::BASE_PX_PER_UNIT * state.zoom,
        }
    }

    /// Project a world point to screen pixels plus a view depth.
    ///
    /// Larger depth means nearer to the camera; sorting ascending yields
    /// far-to-near painter order.
    pub fn project(&self, p: [f64; 3]) -> (Point, f64) {
        let v = DVec3::new(p[0], p[1], p[2]);
        let sx = v.dot(self.right) * self.px_per_unit;
        let sy = v.dot(self.up) * self.px_per_unit;
        let depth = v.dot(self.eye);
        (
            Point::new(self.center_px.x + sx, self.center_px.y - sy),
            depth,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(phi_deg: f64, theta_deg: f64) -> CameraState {
        CameraState {
            phi: phi_deg.to_radians(),
            theta: theta_deg.to_radians(),
            zoom: 1.0,
        }
    }

    #[test]
    fn origin_projects_to_center() {
        let pr = Projector::new(state(70.0, -60.0), 1280, 720);
        let (pt, _) = pr.project([0.0, 0.0, 0.0]);
        assert!((pt.x - 640.0).abs() < 1e-9);
        assert!((pt.y - 396.0).abs() < 1e-9);
    }

    #[test]
    fn world_z_points_up_on_screen() {
        let pr = Projector::new(state(70.0, -60.0), 1280, 720);
        let (lo, _) = pr.project([0.0, 0.0, 0.0]);
        let (hi, _) = pr.project([0.0, 0.0, 2.0]);
        assert!(hi.y < lo.y);
        assert!((hi.x - lo.x).abs() < 1e-9);
    }

    #[test]
    fn depth_orders_along_view_axis() {
        let st = state(70.0, -60.0);
        let pr = Projector::new(st, 1280, 720);
        let eye = DVec3::new(
            st.phi.sin() * st.theta.cos(),
            st.phi.sin() * st.theta.sin(),
            st.phi.cos(),
        );
        let near = eye * 2.0;
        let far = eye * -2.0;
        let (_, d_near) = pr.project([near.x, near.y, near.z]);
        let (_, d_far) = pr.project([far.x, far.y, far.z]);
        assert!(d_near > d_far);
    }

    #[test]
    fn zoom_scales_screen_distance() {
        let mut st = state(70.0, -60.0);
        let pr1 = Projector::new(st, 1280, 720);
        st.zoom = 2.0;
        let pr2 = Projector::new(st, 1280, 720);
        let (a1, _) = pr1.project([1.0, 0.0, 0.0]);
        let (a2, _) = pr2.project([1.0, 0.0, 0.0]);
        let c = Point::new(640.0, 396.0);
        let d1 = (a1 - c).hypot();
        let d2 = (a2 - c).hypot();
        assert!((d2 - 2.0 * d1).abs() < 1e-9);
    }
}
