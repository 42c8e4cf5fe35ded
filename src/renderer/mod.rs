pub mod mesh;
pub mod shader;

use gl::types::*;
use glam::{Mat4, Vec3, Vec4};
use hecs::World;

use crate::assets::EquirectImage;
use crate::components::{
    AmbientLight, Color, DirectionalLight, EnvironmentSettings, GlobalTransform, GroundMirror,
    Hidden, LightGizmo, MeshHandle, SkyDome,
};
pub use mesh::MeshStore;
use shader::ShaderProgram;

const SCENE_VERT: &str = include_str!("../../shaders/scene.vert");
const SCENE_FRAG: &str = include_str!("../../shaders/scene.frag");
const SKY_VERT: &str = include_str!("../../shaders/sky.vert");
const SKY_FRAG: &str = include_str!("../../shaders/sky.frag");
const GROUND_FRAG: &str = include_str!("../../shaders/ground.frag");

/// Matches MAX_LIGHTS in scene.frag / ground.frag.
const MAX_LIGHTS: usize = 4;

const CLEAR_COLOR: Vec3 = Vec3::new(0.13, 0.13, 0.16);

pub struct Renderer {
    scene_shader: ShaderProgram,
    sky_shader: ShaderProgram,
    ground_shader: ShaderProgram,
    env_tex: GLuint,
}

impl Renderer {
    pub fn init() -> Self {
        unsafe {
            gl::Enable(gl::DEPTH_TEST);
            gl::DepthFunc(gl::LEQUAL);
            gl::ClearColor(CLEAR_COLOR.x, CLEAR_COLOR.y, CLEAR_COLOR.z, 1.0);
        }

        let scene_shader = ShaderProgram::from_sources(SCENE_VERT, SCENE_FRAG)
            .expect("Failed to compile scene shaders");
        let sky_shader =
            ShaderProgram::from_sources(SKY_VERT, SKY_FRAG).expect("Failed to compile sky shaders");
        let ground_shader = ShaderProgram::from_sources(SCENE_VERT, GROUND_FRAG)
            .expect("Failed to compile ground shaders");

        let mut env_tex: GLuint = 0;
        unsafe {
            gl::GenTextures(1, &mut env_tex);
        }

        let mut renderer = Self {
            scene_shader,
            sky_shader,
            ground_shader,
            env_tex,
        };
        renderer.set_environment(&crate::assets::environment::gradient_fallback());
        renderer
    }

    /// Replace the environment lookup wholesale. Runs between frames, so no
    /// frame ever samples a partially updated panorama.
    pub fn set_environment(&mut self, image: &EquirectImage) {
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, self.env_tex);
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGB32F as GLint,
                image.width as GLsizei,
                image.height as GLsizei,
                0,
                gl::RGB,
                gl::FLOAT,
                image.pixels.as_ptr() as *const _,
            );
            // Mip chain backs the mirror blur (sampled via textureLod).
            gl::GenerateMipmap(gl::TEXTURE_2D);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR_MIPMAP_LINEAR as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::REPEAT as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }
    }

    pub fn draw_scene(
        &mut self,
        world: &World,
        meshes: &MeshStore,
        view: &Mat4,
        proj: &Mat4,
        camera_pos: Vec3,
    ) {
        unsafe {
            gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
            gl::ActiveTexture(gl::TEXTURE0);
            gl::BindTexture(gl::TEXTURE_2D, self.env_tex);
        }

        let env = world
            .query::<&EnvironmentSettings>()
            .iter()
            .next()
            .map(|(_, e)| e.clone())
            .unwrap_or_default();
        let ambient = world
            .query::<&AmbientLight>()
            .iter()
            .next()
            .map(|(_, a)| a.color * a.intensity)
            .unwrap_or(Vec3::splat(0.1));

        let mut light_dirs: Vec<Vec3> = Vec::with_capacity(MAX_LIGHTS);
        let mut light_colors: Vec<Vec3> = Vec::with_capacity(MAX_LIGHTS);
        for (_, light) in world.query::<&DirectionalLight>().iter() {
            if light_dirs.len() == MAX_LIGHTS {
                break;
            }
            light_dirs.push(light.direction);
            light_colors.push(light.color * light.intensity);
        }

        self.draw_sky(world, meshes, view, proj, &env);
        self.draw_lit(world, meshes, view, proj, camera_pos, &env, ambient, &light_dirs, &light_colors);
        self.draw_ground(world, meshes, view, proj, camera_pos, &env, ambient, &light_dirs, &light_colors);
    }

    fn draw_sky(
        &mut self,
        world: &World,
        meshes: &MeshStore,
        view: &Mat4,
        proj: &Mat4,
        env: &EnvironmentSettings,
    ) {
        // Rotation-only view keeps the dome centered on the camera.
        let mut sky_view = *view;
        sky_view.w_axis = Vec4::W;

        self.sky_shader.bind();
        self.sky_shader.set_mat4("u_view", &sky_view);
        self.sky_shader.set_mat4("u_projection", proj);
        self.sky_shader.set_float("u_exposure", env.exposure);
        self.sky_shader.set_int("u_env", 0);

        unsafe {
            gl::DepthMask(gl::FALSE);
        }
        for (_, (_, global, handle)) in world
            .query::<(&SkyDome, &GlobalTransform, &MeshHandle)>()
            .iter()
        {
            self.sky_shader.set_mat4("u_model", &global.0);
            meshes.get(*handle).draw();
        }
        unsafe {
            gl::DepthMask(gl::TRUE);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_lit(
        &mut self,
        world: &World,
        meshes: &MeshStore,
        view: &Mat4,
        proj: &Mat4,
        camera_pos: Vec3,
        env: &EnvironmentSettings,
        ambient: Vec3,
        light_dirs: &[Vec3],
        light_colors: &[Vec3],
    ) {
        self.scene_shader.bind();
        self.scene_shader.set_mat4("u_view", view);
        self.scene_shader.set_mat4("u_projection", proj);
        self.scene_shader.set_vec3("u_camera_pos", camera_pos);
        self.scene_shader.set_vec3("u_ambient", ambient);
        self.scene_shader.set_int("u_light_count", light_dirs.len() as i32);
        self.scene_shader.set_vec3_array("u_light_dir", light_dirs);
        self.scene_shader.set_vec3_array("u_light_color", light_colors);
        self.scene_shader.set_int("u_env", 0);
        self.scene_shader.set_float("u_env_rot", env.angle_rad);
        self.scene_shader.set_float("u_env_exposure", env.exposure);

        for (_, (global, handle, color, hidden, sky, ground, gizmo)) in world
            .query::<(
                &GlobalTransform,
                &MeshHandle,
                &Color,
                Option<&Hidden>,
                Option<&SkyDome>,
                Option<&GroundMirror>,
                Option<&LightGizmo>,
            )>()
            .iter()
        {
            if hidden.is_some() || sky.is_some() || ground.is_some() {
                continue;
            }
            self.scene_shader.set_mat4("u_model", &global.0);
            self.scene_shader.set_vec3("u_object_color", color.0);
            // Gizmos mark light positions; shading them would defeat the point.
            self.scene_shader.set_int("u_unlit", gizmo.is_some() as i32);
            meshes.get(*handle).draw();
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_ground(
        &mut self,
        world: &World,
        meshes: &MeshStore,
        view: &Mat4,
        proj: &Mat4,
        camera_pos: Vec3,
        env: &EnvironmentSettings,
        ambient: Vec3,
        light_dirs: &[Vec3],
        light_colors: &[Vec3],
    ) {
        self.ground_shader.bind();
        self.ground_shader.set_mat4("u_view", view);
        self.ground_shader.set_mat4("u_projection", proj);
        self.ground_shader.set_vec3("u_camera_pos", camera_pos);
        self.ground_shader.set_vec3("u_ambient", ambient);
        self.ground_shader.set_int("u_light_count", light_dirs.len() as i32);
        self.ground_shader.set_vec3_array("u_light_dir", light_dirs);
        self.ground_shader.set_vec3_array("u_light_color", light_colors);
        self.ground_shader.set_int("u_env", 0);
        self.ground_shader.set_float("u_env_rot", env.angle_rad);
        self.ground_shader.set_float("u_env_exposure", env.exposure);

        for (_, (mirror, global, handle, color, hidden)) in world
            .query::<(
                &GroundMirror,
                &GlobalTransform,
                &MeshHandle,
                &Color,
                Option<&Hidden>,
            )>()
            .iter()
        {
            if hidden.is_some() || !mirror.visible {
                continue;
            }
            self.ground_shader.set_mat4("u_model", &global.0);
            self.ground_shader.set_vec3("u_object_color", color.0);
            self.ground_shader.set_float("u_mirror_opacity", mirror.opacity);
            self.ground_shader.set_float("u_blur_lod", mirror.blur);
            self.ground_shader.set_float("u_max_distance", mirror.max_distance);
            self.ground_shader.set_float("u_fresnel", mirror.fresnel);
            self.ground_shader
                .set_int("u_distance_attenuation", mirror.distance_attenuation as i32);
            meshes.get(*handle).draw();
        }
    }
}
