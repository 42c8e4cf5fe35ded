//! Pure derivations from parameter values to scene state. Everything here is
//! deterministic arithmetic: no world access, no I/O, so calling any of these
//! twice with the same inputs yields bit-identical outputs.

use glam::{Quat, Vec3};

use super::params::{
    AmbientParams, AnimationParams, EnvironmentParams, GroundParams, LightRigParams,
};

/// One slot of the orbit rig: a fixed phase offset from the base angle and a
/// fixed intensity ratio off the base intensity.
pub struct RigSlot {
    pub phase_deg: f32,
    pub ratio: f32,
}

/// Three-point stage rig (key, fill, rim). Slots share the base orbit and fan
/// out at a uniform phase delta; the key light carries the full base intensity.
pub const RIG_SLOTS: [RigSlot; 3] = [
    RigSlot { phase_deg: 0.0, ratio: 1.0 },
    RigSlot { phase_deg: 120.0, ratio: 0.45 },
    RigSlot { phase_deg: 240.0, ratio: 0.2 },
];

/// Derived state for one rig light.
#[derive(Clone, Debug, PartialEq)]
pub struct LightPose {
    pub position: Vec3,
    /// Unit vector from the light toward the world origin.
    pub direction: Vec3,
    pub intensity: f32,
    pub color: Vec3,
    pub helpers: bool,
}

/// Derived environment state. Both consumers (sky dome transform, reflection
/// lookup) are written from this one value.
#[derive(Clone, Debug, PartialEq)]
pub struct EnvPose {
    pub angle_rad: f32,
    pub rotation: Quat,
    pub exposure: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AmbientState {
    pub color: Vec3,
    pub intensity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroundState {
    pub opacity: f32,
    pub visible: bool,
    pub blur: f32,
    pub max_distance: f32,
    pub fresnel: f32,
    pub distance_attenuation: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimState {
    pub frame: f32,
    pub playing: bool,
}

/// A group's recomputed outputs, handed to every sink bound to that group.
#[derive(Clone, Debug, PartialEq)]
pub enum Derived {
    LightRig(Vec<LightPose>),
    Ambient(AmbientState),
    Environment(EnvPose),
    Ground(GroundState),
    Animation(AnimState),
}

/// Wrap an angle into [0, 360).
pub fn normalize_deg(deg: f32) -> f32 {
    deg.rem_euclid(360.0)
}

/// Orbit placement: `(cos θ · r, h, sin θ · r)` around the world origin.
pub fn orbit_position(angle_deg: f32, radius: f32, height: f32) -> Vec3 {
    let rad = angle_deg.to_radians();
    Vec3::new(rad.cos() * radius, height, rad.sin() * radius)
}

/// Orientation toward the origin, recomputed absolutely each time so repeated
/// updates can never drift.
pub fn aim_at_origin(position: Vec3) -> Vec3 {
    (-position).try_normalize().unwrap_or(Vec3::NEG_Y)
}

/// Fan the shared base parameters out across the rig slots.
pub fn light_fan(rig: &LightRigParams) -> Vec<LightPose> {
    RIG_SLOTS
        .iter()
        .map(|slot| {
            let angle = normalize_deg(rig.angle_deg + slot.phase_deg);
            let position = orbit_position(angle, rig.radius, rig.height);
            LightPose {
                position,
                direction: aim_at_origin(position),
                intensity: rig.intensity * slot.ratio,
                color: rig.color,
                helpers: rig.helpers,
            }
        })
        .collect()
}

/// Single-axis (vertical) environment rotation plus exposure. This is the one
/// place the rotation quaternion is built.
pub fn environment_pose(env: &EnvironmentParams) -> EnvPose {
    let angle_rad = normalize_deg(env.rotation_deg).to_radians();
    EnvPose {
        angle_rad,
        rotation: Quat::from_rotation_y(angle_rad),
        exposure: env.exposure,
    }
}

pub fn ambient_state(ambient: &AmbientParams) -> AmbientState {
    AmbientState {
        color: ambient.color,
        intensity: ambient.intensity,
    }
}

pub fn ground_state(ground: &GroundParams) -> GroundState {
    GroundState {
        opacity: ground.opacity,
        visible: ground.visible,
        blur: ground.blur,
        max_distance: ground.max_distance,
        fresnel: ground.fresnel,
        distance_attenuation: ground.distance_attenuation,
    }
}

pub fn anim_state(animation: &AnimationParams) -> AnimState {
    AnimState {
        frame: animation.frame,
        playing: animation.playing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn orbit_position_stays_on_the_ring() {
        for angle in [0.0, 37.5, 90.0, 180.0, 271.25, 359.0] {
            for radius in [1.0_f32, 5.0, 9.75] {
                let p = orbit_position(angle, radius, 2.5);
                assert!(
                    (p.x * p.x + p.z * p.z - radius * radius).abs() < EPS * radius * radius + EPS,
                    "angle {angle} radius {radius} left the ring: {p:?}"
                );
                assert_eq!(p.y, 2.5);
            }
        }
    }

    #[test]
    fn orbit_position_hits_the_axes() {
        let p = orbit_position(0.0, 5.0, 2.0);
        assert!((p - Vec3::new(5.0, 2.0, 0.0)).length() < EPS);

        let p = orbit_position(90.0, 5.0, 2.0);
        assert!(p.x.abs() < EPS);
        assert_eq!(p.y, 2.0);
        assert!((p.z - 5.0).abs() < EPS);
    }

    #[test]
    fn aim_at_origin_points_home() {
        let pos = Vec3::new(3.0, 4.0, 0.0);
        let dir = aim_at_origin(pos);
        assert!((pos + dir * 5.0).length() < EPS);
    }

    #[test]
    fn aim_at_origin_handles_degenerate_position() {
        assert_eq!(aim_at_origin(Vec3::ZERO), Vec3::NEG_Y);
    }

    #[test]
    fn light_fan_applies_phase_and_ratio() {
        let rig = LightRigParams {
            angle_deg: 300.0,
            intensity: 2.0,
            ..Default::default()
        };
        let poses = light_fan(&rig);
        assert_eq!(poses.len(), RIG_SLOTS.len());
        for (pose, slot) in poses.iter().zip(RIG_SLOTS.iter()) {
            let expected_angle = normalize_deg(300.0 + slot.phase_deg);
            let expected = orbit_position(expected_angle, rig.radius, rig.height);
            assert!((pose.position - expected).length() < EPS);
            assert!((pose.intensity - 2.0 * slot.ratio).abs() < EPS);
        }
    }

    #[test]
    fn normalize_deg_wraps_both_directions() {
        assert_eq!(normalize_deg(360.0), 0.0);
        assert!((normalize_deg(420.0) - 60.0).abs() < EPS);
        assert!((normalize_deg(-90.0) - 270.0).abs() < EPS);
    }

    #[test]
    fn environment_pose_is_single_axis() {
        let pose = environment_pose(&EnvironmentParams {
            rotation_deg: 90.0,
            exposure: 1.5,
        });
        let rotated = pose.rotation * Vec3::Y;
        assert!((rotated - Vec3::Y).length() < EPS, "rotation must keep the vertical axis fixed");
        assert!((pose.angle_rad - std::f32::consts::FRAC_PI_2).abs() < EPS);
    }
}
