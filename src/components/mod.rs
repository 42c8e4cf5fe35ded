use glam::{Mat4, Quat, Vec3};
use hecs::{Entity, World};

pub mod lighting;

pub use lighting::{AmbientLight, DirectionalLight};

/// Spatial transform with position, rotation, and scale (local space).
pub struct LocalTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl LocalTransform {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Computed world-space transform matrix, updated by the propagation system.
pub struct GlobalTransform(pub Mat4);

/// Points to the parent entity in the transform hierarchy.
#[allow(dead_code)]
pub struct Parent(pub Entity);

/// Lists child entities in the transform hierarchy.
pub struct Children(pub Vec<Entity>);

/// Attach `child` under `parent` in the transform hierarchy.
pub fn add_child(world: &mut World, parent: Entity, child: Entity) {
    let has_children = world.get::<&Children>(parent).is_ok();
    if has_children {
        if let Ok(mut children) = world.get::<&mut Children>(parent) {
            if !children.0.contains(&child) {
                children.0.push(child);
            }
        }
    } else {
        let _ = world.insert_one(parent, Children(vec![child]));
    }

    let _ = world.insert_one(child, Parent(parent));
}

/// Index into the MeshStore resource.
#[derive(Clone, Copy)]
pub struct MeshHandle(pub usize);

/// RGB color applied to an entity for rendering.
pub struct Color(pub Vec3);

/// Marker: entity is skipped by every render pass.
pub struct Hidden;

/// Marker: the inward-facing environment dome. Its rotation is written by the
/// environment recompute sink and is the only transform the sky pass reads.
pub struct SkyDome;

/// Marker: the placeholder prop shown until a model finishes loading.
pub struct StageProp;

/// Marker: small indicator mesh tracking one rig light.
pub struct LightGizmo;

/// Mirror-like ground settings, mirrored 1:1 from the ground parameter group.
pub struct GroundMirror {
    pub opacity: f32,
    pub visible: bool,
    pub blur: f32,
    pub max_distance: f32,
    pub fresnel: f32,
    pub distance_attenuation: bool,
}

impl Default for GroundMirror {
    fn default() -> Self {
        Self {
            opacity: 0.5,
            visible: true,
            blur: 2.0,
            max_distance: 15.0,
            fresnel: 0.5,
            distance_attenuation: true,
        }
    }
}

/// Environment lookup state consumed by the reflection paths of the lit and
/// ground shaders. The sky dome does not read this; it receives the same
/// derived rotation through its own transform, so the two consumers can be
/// compared directly.
#[derive(Clone)]
pub struct EnvironmentSettings {
    pub angle_rad: f32,
    pub rotation: Quat,
    pub exposure: f32,
}

impl Default for EnvironmentSettings {
    fn default() -> Self {
        Self {
            angle_rad: 0.0,
            rotation: Quat::IDENTITY,
            exposure: 1.0,
        }
    }
}

/// Clip playback state, written by the animation group's sink. Exists (and is
/// scrubbed) before any clip has loaded; sampling is a no-op until then.
#[derive(Default)]
pub struct ClipPlayback {
    pub frame: f32,
    pub playing: bool,
}
