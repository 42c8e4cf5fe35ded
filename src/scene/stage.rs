//! Builds the stage world and registers every configurator sink. This is the
//! only place that knows which entity receives which derived value; the panel
//! and renderer stay decoupled from both.

use glam::{Mat4, Vec3};
use hecs::{Entity, World};

use crate::assets::LoadedModel;
use crate::components::{
    add_child, AmbientLight, ClipPlayback, Color, DirectionalLight, EnvironmentSettings,
    GlobalTransform, GroundMirror, Hidden, LightGizmo, LocalTransform, SkyDome, StageProp,
};
use crate::config::{Configurator, Derived, GroupId, RIG_SLOTS};
use crate::renderer::mesh::{self, Mesh};
use crate::renderer::MeshStore;

const GROUND_COLOR: Vec3 = Vec3::new(0.42, 0.42, 0.45);
const PROP_COLOR: Vec3 = Vec3::new(0.75, 0.33, 0.21);

/// What the frame loop needs back from the stage build. The stage entities
/// themselves are owned by the world and reached through the bound sinks.
pub struct Stage {
    /// glTF node index → entity, filled once the model loads.
    pub model_nodes: Vec<Entity>,
}

/// Spawn the stage scene and bind the configurator to it. Finishes with one
/// `recompute_all` so every target starts consistent with the defaults.
pub fn build_stage(world: &mut World, meshes: &mut MeshStore, config: &mut Configurator) -> Stage {
    let plane_handle = meshes.add(Mesh::upload(&mesh::plane(20.0)));
    let dome_handle = meshes.add(Mesh::upload(&mesh::uv_sphere(200.0, 16, 32)));
    let sphere_handle = meshes.add(Mesh::upload(&mesh::uv_sphere(0.8, 24, 32)));
    let gizmo_handle = meshes.add(Mesh::upload(&mesh::gizmo_diamond(0.18)));

    let ground = world.spawn((
        LocalTransform::new(Vec3::ZERO),
        GlobalTransform(Mat4::IDENTITY),
        plane_handle,
        Color(GROUND_COLOR),
        GroundMirror::default(),
    ));

    let sky = world.spawn((
        SkyDome,
        LocalTransform::new(Vec3::ZERO),
        GlobalTransform(Mat4::IDENTITY),
        dome_handle,
    ));

    world.spawn((
        StageProp,
        LocalTransform::new(Vec3::new(0.0, 0.8, 0.0)),
        GlobalTransform(Mat4::IDENTITY),
        sphere_handle,
        Color(PROP_COLOR),
    ));

    let env_state = world.spawn((EnvironmentSettings::default(), AmbientLight::default()));
    let playback = world.spawn((ClipPlayback::default(),));

    let mut lights = Vec::with_capacity(RIG_SLOTS.len());
    let mut gizmos = Vec::with_capacity(RIG_SLOTS.len());
    for _ in RIG_SLOTS.iter() {
        lights.push(world.spawn((DirectionalLight::new(Vec3::NEG_Y, Vec3::ONE, 1.0),)));
        gizmos.push(world.spawn((
            LightGizmo,
            LocalTransform::new(Vec3::ZERO),
            GlobalTransform(Mat4::IDENTITY),
            gizmo_handle,
            Color(Vec3::ONE),
        )));
    }

    bind_sinks(config, &lights, &gizmos, sky, env_state, ground, playback);
    config.recompute_all(world);

    Stage {
        model_nodes: Vec::new(),
    }
}

fn bind_sinks(
    config: &mut Configurator,
    lights: &[Entity],
    gizmos: &[Entity],
    sky: Entity,
    env_state: Entity,
    ground: Entity,
    playback: Entity,
) {
    // Rig lights.
    let light_entities = lights.to_vec();
    config.bind(
        GroupId::LightRig,
        Box::new(move |world, derived| {
            let Derived::LightRig(poses) = derived else { return };
            for (&entity, pose) in light_entities.iter().zip(poses.iter()) {
                if let Ok(mut light) = world.get::<&mut DirectionalLight>(entity) {
                    light.direction = pose.direction;
                    light.color = pose.color;
                    light.intensity = pose.intensity;
                }
            }
        }),
    );

    // The gizmos track the same derivation as the lights they mark.
    let gizmo_entities = gizmos.to_vec();
    config.bind(
        GroupId::LightRig,
        Box::new(move |world, derived| {
            let Derived::LightRig(poses) = derived else { return };
            for (&entity, pose) in gizmo_entities.iter().zip(poses.iter()) {
                if let Ok(mut local) = world.get::<&mut LocalTransform>(entity) {
                    local.position = pose.position;
                }
                if let Ok(mut color) = world.get::<&mut Color>(entity) {
                    color.0 = pose.color;
                }
                if pose.helpers {
                    let _ = world.remove_one::<Hidden>(entity);
                } else {
                    let _ = world.insert_one(entity, Hidden);
                }
            }
        }),
    );

    // Environment, consumer one: the dome's transform.
    config.bind(
        GroupId::Environment,
        Box::new(move |world, derived| {
            let Derived::Environment(pose) = derived else { return };
            if let Ok(mut local) = world.get::<&mut LocalTransform>(sky) {
                local.rotation = pose.rotation;
            }
        }),
    );

    // Environment, consumer two: the reflection lookup settings.
    config.bind(
        GroupId::Environment,
        Box::new(move |world, derived| {
            let Derived::Environment(pose) = derived else { return };
            if let Ok(mut env) = world.get::<&mut EnvironmentSettings>(env_state) {
                env.angle_rad = pose.angle_rad;
                env.rotation = pose.rotation;
                env.exposure = pose.exposure;
            }
        }),
    );

    config.bind(
        GroupId::Ambient,
        Box::new(move |world, derived| {
            let Derived::Ambient(state) = derived else { return };
            if let Ok(mut ambient) = world.get::<&mut AmbientLight>(env_state) {
                ambient.color = state.color;
                ambient.intensity = state.intensity;
            }
        }),
    );

    config.bind(
        GroupId::Ground,
        Box::new(move |world, derived| {
            let Derived::Ground(state) = derived else { return };
            if let Ok(mut mirror) = world.get::<&mut GroundMirror>(ground) {
                mirror.opacity = state.opacity;
                mirror.visible = state.visible;
                mirror.blur = state.blur;
                mirror.max_distance = state.max_distance;
                mirror.fresnel = state.fresnel;
                mirror.distance_attenuation = state.distance_attenuation;
            }
        }),
    );

    config.bind(
        GroupId::Animation,
        Box::new(move |world, derived| {
            let Derived::Animation(state) = derived else { return };
            if let Ok(mut clip) = world.get::<&mut ClipPlayback>(playback) {
                clip.frame = state.frame;
                clip.playing = state.playing;
            }
        }),
    );
}

/// Instantiate a loaded model under the stage: node hierarchy first, then one
/// child entity per primitive. The placeholder prop is hidden, not despawned,
/// in case a future reload wants it back.
pub fn instantiate_model(
    world: &mut World,
    meshes: &mut MeshStore,
    stage: &mut Stage,
    model: &LoadedModel,
) {
    let props: Vec<Entity> = world.query::<&StageProp>().iter().map(|(e, _)| e).collect();
    for prop in props {
        let _ = world.insert_one(prop, Hidden);
    }

    let entities: Vec<Entity> = model
        .nodes
        .iter()
        .map(|node| {
            world.spawn((
                LocalTransform {
                    position: node.translation,
                    rotation: node.rotation,
                    scale: node.scale,
                },
                GlobalTransform(Mat4::IDENTITY),
            ))
        })
        .collect();

    for (i, node) in model.nodes.iter().enumerate() {
        if let Some(parent) = node.parent {
            add_child(world, entities[parent], entities[i]);
        }
    }

    for primitive in &model.primitives {
        let handle = meshes.add(Mesh::upload(&mesh::from_raw(
            &primitive.positions,
            &primitive.normals,
            primitive.indices.clone(),
        )));
        let entity = world.spawn((
            LocalTransform::new(Vec3::ZERO),
            GlobalTransform(Mat4::IDENTITY),
            handle,
            Color(primitive.base_color),
        ));
        add_child(world, entities[primitive.node], entity);
    }

    stage.model_nodes = entities;
}
