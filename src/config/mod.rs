//! The stage configurator: one owner for every user-adjustable parameter and
//! one derivation path from parameters to scene state.
//!
//! The panel talks to [`Configurator::set`]; the scene registers sinks with
//! [`Configurator::bind`]. A `set` clamps the value to the control's declared
//! range, stores it, and recomputes that group's derived outputs exactly once,
//! pushing them through every sink bound to the group. The configurator never
//! owns scene objects; sinks write into externally owned components.

pub mod derive;
pub mod params;

pub use derive::{AmbientState, AnimState, Derived, EnvPose, GroundState, LightPose, RIG_SLOTS};
pub use params::{
    control_table, format_hex, parse_hex, Control, ControlKind, GroupId, ParamKey, ParamValue,
    PLACEHOLDER_FRAME_MAX,
};

use hecs::World;

use params::{AmbientParams, AnimationParams, EnvironmentParams, GroundParams, LightRigParams};

/// A recomputation sink: pushes one group's derived outputs into externally
/// owned scene state.
pub type Sink = Box<dyn FnMut(&mut World, &Derived)>;

pub struct Configurator {
    rig: LightRigParams,
    ambient: AmbientParams,
    env: EnvironmentParams,
    ground: GroundParams,
    animation: AnimationParams,
    controls: Vec<Control>,
    sinks: Vec<(GroupId, Sink)>,
}

impl Configurator {
    pub fn new() -> Self {
        Self {
            rig: LightRigParams::default(),
            ambient: AmbientParams::default(),
            env: EnvironmentParams::default(),
            ground: GroundParams::default(),
            animation: AnimationParams::default(),
            controls: control_table(),
            sinks: Vec::new(),
        }
    }

    /// The control surface, in panel display order.
    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Register a sink for `group`. Call [`recompute_all`](Self::recompute_all)
    /// once after the last bind so every target starts consistent.
    pub fn bind(&mut self, group: GroupId, sink: Sink) {
        self.sinks.push((group, sink));
    }

    /// Current value of one parameter, or `None` for an unknown pair.
    pub fn get(&self, group: GroupId, key: ParamKey) -> Option<ParamValue> {
        use GroupId as G;
        use ParamKey as K;
        use ParamValue as V;
        Some(match (group, key) {
            (G::LightRig, K::Angle) => V::Scalar(self.rig.angle_deg),
            (G::LightRig, K::Radius) => V::Scalar(self.rig.radius),
            (G::LightRig, K::Height) => V::Scalar(self.rig.height),
            (G::LightRig, K::Intensity) => V::Scalar(self.rig.intensity),
            (G::LightRig, K::LightColor) => V::Color(self.rig.color),
            (G::LightRig, K::Helpers) => V::Flag(self.rig.helpers),
            (G::Ambient, K::Intensity) => V::Scalar(self.ambient.intensity),
            (G::Ambient, K::LightColor) => V::Color(self.ambient.color),
            (G::Environment, K::Rotation) => V::Scalar(self.env.rotation_deg),
            (G::Environment, K::Exposure) => V::Scalar(self.env.exposure),
            (G::Ground, K::Opacity) => V::Scalar(self.ground.opacity),
            (G::Ground, K::Visible) => V::Flag(self.ground.visible),
            (G::Ground, K::Blur) => V::Scalar(self.ground.blur),
            (G::Ground, K::MaxDistance) => V::Scalar(self.ground.max_distance),
            (G::Ground, K::Fresnel) => V::Scalar(self.ground.fresnel),
            (G::Ground, K::DistanceAttenuation) => V::Flag(self.ground.distance_attenuation),
            (G::Animation, K::Frame) => V::Scalar(self.animation.frame),
            (G::Animation, K::Playing) => V::Flag(self.animation.playing),
            _ => return None,
        })
    }

    /// Convenience scalar read; 0.0 for unknown pairs.
    pub fn scalar(&self, group: GroupId, key: ParamKey) -> f32 {
        match self.get(group, key) {
            Some(ParamValue::Scalar(v)) => v,
            _ => 0.0,
        }
    }

    /// Declared `(min, max, step)` of a scalar control.
    pub fn scalar_range(&self, group: GroupId, key: ParamKey) -> Option<(f32, f32, f32)> {
        self.controls.iter().find_map(|c| match c.kind {
            ControlKind::Scalar { min, max, step } if c.group == group && c.key == key => {
                Some((min, max, step))
            }
            _ => None,
        })
    }

    /// The inbound change handler: clamp, store, recompute the group once.
    pub fn set(&mut self, world: &mut World, group: GroupId, key: ParamKey, value: ParamValue) {
        let value = self.clamp(group, key, value);
        if self.store(group, key, value) {
            self.recompute(world, group);
        }
    }

    /// Color-picker entry point: hex string in, stored color out. Malformed
    /// input is dropped with a warning; it cannot disturb the stored value.
    pub fn set_hex(&mut self, world: &mut World, group: GroupId, key: ParamKey, hex: &str) {
        match parse_hex(hex) {
            Some(color) => self.set(world, group, key, ParamValue::Color(color)),
            None => log::warn!("ignoring malformed hex color {hex:?} for {group:?}"),
        }
    }

    /// Recompute one group's derived outputs and push them through its sinks.
    pub fn recompute(&mut self, world: &mut World, group: GroupId) {
        let derived = self.derived(group);
        for (bound, sink) in self.sinks.iter_mut() {
            if *bound == group {
                sink(world, &derived);
            }
        }
    }

    /// Recompute every group; used once after the scene has bound its sinks.
    pub fn recompute_all(&mut self, world: &mut World) {
        for group in [
            GroupId::LightRig,
            GroupId::Ambient,
            GroupId::Environment,
            GroupId::Ground,
            GroupId::Animation,
        ] {
            self.recompute(world, group);
        }
    }

    /// The pure derivation for one group. Deterministic and idempotent:
    /// unchanged parameters always yield identical outputs.
    pub fn derived(&self, group: GroupId) -> Derived {
        match group {
            GroupId::LightRig => Derived::LightRig(derive::light_fan(&self.rig)),
            GroupId::Ambient => Derived::Ambient(derive::ambient_state(&self.ambient)),
            GroupId::Environment => Derived::Environment(derive::environment_pose(&self.env)),
            GroupId::Ground => Derived::Ground(derive::ground_state(&self.ground)),
            GroupId::Animation => Derived::Animation(derive::anim_state(&self.animation)),
        }
    }

    /// Re-seed the scrub control after a clip has loaded: the frame max becomes
    /// `frames` and the current frame is re-clamped against it.
    pub fn seed_clip_frames(&mut self, world: &mut World, frames: f32) {
        for control in self.controls.iter_mut() {
            if control.group == GroupId::Animation && control.key == ParamKey::Frame {
                if let ControlKind::Scalar { max, .. } = &mut control.kind {
                    *max = frames;
                }
            }
        }
        self.animation.frame = self.animation.frame.min(frames);
        self.recompute(world, GroupId::Animation);
    }

    fn clamp(&self, group: GroupId, key: ParamKey, value: ParamValue) -> ParamValue {
        match (value, self.scalar_range(group, key)) {
            (ParamValue::Scalar(v), Some((min, max, _))) => ParamValue::Scalar(v.clamp(min, max)),
            _ => value,
        }
    }

    fn store(&mut self, group: GroupId, key: ParamKey, value: ParamValue) -> bool {
        use GroupId as G;
        use ParamKey as K;
        use ParamValue as V;
        match (group, key, value) {
            (G::LightRig, K::Angle, V::Scalar(v)) => self.rig.angle_deg = v,
            (G::LightRig, K::Radius, V::Scalar(v)) => self.rig.radius = v,
            (G::LightRig, K::Height, V::Scalar(v)) => self.rig.height = v,
            (G::LightRig, K::Intensity, V::Scalar(v)) => self.rig.intensity = v,
            (G::LightRig, K::LightColor, V::Color(v)) => self.rig.color = v,
            (G::LightRig, K::Helpers, V::Flag(v)) => self.rig.helpers = v,
            (G::Ambient, K::Intensity, V::Scalar(v)) => self.ambient.intensity = v,
            (G::Ambient, K::LightColor, V::Color(v)) => self.ambient.color = v,
            (G::Environment, K::Rotation, V::Scalar(v)) => self.env.rotation_deg = v,
            (G::Environment, K::Exposure, V::Scalar(v)) => self.env.exposure = v,
            (G::Ground, K::Opacity, V::Scalar(v)) => self.ground.opacity = v,
            (G::Ground, K::Visible, V::Flag(v)) => self.ground.visible = v,
            (G::Ground, K::Blur, V::Scalar(v)) => self.ground.blur = v,
            (G::Ground, K::MaxDistance, V::Scalar(v)) => self.ground.max_distance = v,
            (G::Ground, K::Fresnel, V::Scalar(v)) => self.ground.fresnel = v,
            (G::Ground, K::DistanceAttenuation, V::Flag(v)) => {
                self.ground.distance_attenuation = v
            }
            (G::Animation, K::Frame, V::Scalar(v)) => self.animation.frame = v,
            (G::Animation, K::Playing, V::Flag(v)) => self.animation.playing = v,
            _ => {
                log::warn!("ignoring unknown parameter write {group:?}/{key:?}");
                return false;
            }
        }
        true
    }
}

impl Default for Configurator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{EnvironmentSettings, LocalTransform};
    use glam::{Quat, Vec3};
    use std::cell::Cell;
    use std::rc::Rc;

    const EPS: f32 = 1e-4;

    #[test]
    fn out_of_range_scalars_are_clamped_not_rejected() {
        let mut world = World::new();
        let mut config = Configurator::new();

        config.set(&mut world, GroupId::Ground, ParamKey::Opacity, ParamValue::Scalar(5.0));
        assert_eq!(config.scalar(GroupId::Ground, ParamKey::Opacity), 1.0);

        config.set(&mut world, GroupId::Ground, ParamKey::Opacity, ParamValue::Scalar(-1.0));
        assert_eq!(config.scalar(GroupId::Ground, ParamKey::Opacity), 0.0);
    }

    #[test]
    fn recompute_is_idempotent() {
        let config = Configurator::new();
        for group in [
            GroupId::LightRig,
            GroupId::Ambient,
            GroupId::Environment,
            GroupId::Ground,
            GroupId::Animation,
        ] {
            assert_eq!(config.derived(group), config.derived(group));
        }
    }

    #[test]
    fn one_set_recomputes_exactly_once() {
        let mut world = World::new();
        let mut config = Configurator::new();
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        config.bind(
            GroupId::LightRig,
            Box::new(move |_, _| seen.set(seen.get() + 1)),
        );

        config.set(&mut world, GroupId::LightRig, ParamKey::Angle, ParamValue::Scalar(45.0));
        assert_eq!(calls.get(), 1);

        // A write to another group must not touch this sink.
        config.set(&mut world, GroupId::Ground, ParamKey::Blur, ParamValue::Scalar(1.0));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn orbit_scenario_places_the_key_light() {
        let mut world = World::new();
        let target = world.spawn((LocalTransform::new(Vec3::ZERO),));
        let mut config = Configurator::new();
        config.bind(
            GroupId::LightRig,
            Box::new(move |world, derived| {
                if let Derived::LightRig(poses) = derived {
                    if let Ok(mut lt) = world.get::<&mut LocalTransform>(target) {
                        lt.position = poses[0].position;
                    }
                }
            }),
        );

        config.set(&mut world, GroupId::LightRig, ParamKey::Radius, ParamValue::Scalar(5.0));
        config.set(&mut world, GroupId::LightRig, ParamKey::Height, ParamValue::Scalar(2.0));
        config.set(&mut world, GroupId::LightRig, ParamKey::Angle, ParamValue::Scalar(0.0));
        {
            let lt = world.get::<&LocalTransform>(target).unwrap();
            assert!((lt.position - Vec3::new(5.0, 2.0, 0.0)).length() < EPS);
        }

        config.set(&mut world, GroupId::LightRig, ParamKey::Angle, ParamValue::Scalar(90.0));
        let lt = world.get::<&LocalTransform>(target).unwrap();
        assert!(lt.position.x.abs() < EPS);
        assert_eq!(lt.position.y, 2.0);
        assert!((lt.position.z - 5.0).abs() < EPS);
    }

    #[test]
    fn environment_consumers_never_disagree() {
        let mut world = World::new();
        let sky = world.spawn((LocalTransform::new(Vec3::ZERO),));
        let settings = world.spawn((EnvironmentSettings::default(),));

        let mut config = Configurator::new();
        config.bind(
            GroupId::Environment,
            Box::new(move |world, derived| {
                if let Derived::Environment(pose) = derived {
                    if let Ok(mut lt) = world.get::<&mut LocalTransform>(sky) {
                        lt.rotation = pose.rotation;
                    }
                }
            }),
        );
        config.bind(
            GroupId::Environment,
            Box::new(move |world, derived| {
                if let Derived::Environment(pose) = derived {
                    if let Ok(mut env) = world.get::<&mut EnvironmentSettings>(settings) {
                        env.angle_rad = pose.angle_rad;
                        env.rotation = pose.rotation;
                        env.exposure = pose.exposure;
                    }
                }
            }),
        );

        config.set(&mut world, GroupId::Environment, ParamKey::Rotation, ParamValue::Scalar(90.0));

        let sky_rot = world.get::<&LocalTransform>(sky).unwrap().rotation;
        let env = world.get::<&EnvironmentSettings>(settings).unwrap();
        assert_eq!(sky_rot, env.rotation);
        assert!((env.angle_rad - std::f32::consts::FRAC_PI_2).abs() < EPS);
        let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        assert!(sky_rot.dot(expected).abs() > 1.0 - EPS);
    }

    #[test]
    fn scrub_range_seeds_after_clip_load() {
        let mut world = World::new();
        let mut config = Configurator::new();

        // Before the load the placeholder range holds.
        let (_, max, _) = config.scalar_range(GroupId::Animation, ParamKey::Frame).unwrap();
        assert_eq!(max, PLACEHOLDER_FRAME_MAX);

        // A 5.0 s clip at 30 fps seeds the range to 150.
        config.seed_clip_frames(&mut world, 5.0 * 30.0);
        let (_, max, _) = config.scalar_range(GroupId::Animation, ParamKey::Frame).unwrap();
        assert_eq!(max, 150.0);

        // Seeding below the current frame re-clamps it.
        config.set(&mut world, GroupId::Animation, ParamKey::Frame, ParamValue::Scalar(120.0));
        config.seed_clip_frames(&mut world, 60.0);
        assert_eq!(config.scalar(GroupId::Animation, ParamKey::Frame), 60.0);
    }

    #[test]
    fn malformed_hex_leaves_the_stored_color_alone() {
        let mut world = World::new();
        let mut config = Configurator::new();
        config.set_hex(&mut world, GroupId::LightRig, ParamKey::LightColor, "#ff8000");
        config.set_hex(&mut world, GroupId::LightRig, ParamKey::LightColor, "#nope!!");
        match config.get(GroupId::LightRig, ParamKey::LightColor) {
            Some(ParamValue::Color(c)) => {
                assert!((c - parse_hex("#ff8000").unwrap()).length() < EPS)
            }
            other => panic!("expected a color, got {other:?}"),
        }
    }
}
