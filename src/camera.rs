use glam::{Mat4, Vec3};

const MIN_PITCH: f32 = -89.0;
const MAX_PITCH: f32 = 89.0;
const MIN_DISTANCE: f32 = 1.5;
const MAX_DISTANCE: f32 = 40.0;

/// Orbit camera: yaw/pitch/distance around a fixed look-at target. Mouse drag
/// orbits, scroll wheel zooms, and the eye is always recomputed from the
/// current angles rather than integrated.
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub sensitivity: f32,
    pub fov: f32,
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 68.0,
            pitch: 20.0,
            distance: 5.7,
            sensitivity: 0.3,
            fov: 60.0,
        }
    }

    pub fn orbit(&mut self, mouse_dx: f32, mouse_dy: f32) {
        self.yaw += mouse_dx * self.sensitivity;
        self.pitch += mouse_dy * self.sensitivity;
        self.pitch = self.pitch.clamp(MIN_PITCH, MAX_PITCH);
    }

    pub fn zoom(&mut self, scroll_dy: f32) {
        // Exponential zoom keeps steps proportional at any distance.
        self.distance = (self.distance * (1.0 - scroll_dy * 0.1)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn eye(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        let offset = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        );
        self.target + offset * self.distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect, 0.1, 500.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn eye_keeps_the_orbit_distance() {
        let mut cam = OrbitCamera::new();
        for (yaw, pitch) in [(0.0, 0.0), (45.0, 30.0), (200.0, -60.0)] {
            cam.yaw = yaw;
            cam.pitch = pitch;
            let d = (cam.eye() - cam.target).length();
            assert!((d - cam.distance).abs() < EPS, "yaw {yaw} pitch {pitch}: {d}");
        }
    }

    #[test]
    fn pitch_is_clamped_short_of_the_poles() {
        let mut cam = OrbitCamera::new();
        cam.orbit(0.0, 10_000.0);
        assert_eq!(cam.pitch, MAX_PITCH);
        cam.orbit(0.0, -20_000.0);
        assert_eq!(cam.pitch, MIN_PITCH);
    }

    #[test]
    fn zoom_is_clamped_to_the_stage() {
        let mut cam = OrbitCamera::new();
        for _ in 0..200 {
            cam.zoom(1.0);
        }
        assert_eq!(cam.distance, MIN_DISTANCE);
        for _ in 0..200 {
            cam.zoom(-1.0);
        }
        assert_eq!(cam.distance, MAX_DISTANCE);
    }

    #[test]
    fn zero_pitch_eye_sits_level_with_the_target() {
        let mut cam = OrbitCamera::new();
        cam.pitch = 0.0;
        cam.target = Vec3::new(0.0, 1.0, 0.0);
        assert!((cam.eye().y - 1.0).abs() < EPS);
    }
}
