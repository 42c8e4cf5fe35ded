use glam::{Mat4, Vec3};

use crate::camera::OrbitCamera;
use crate::config::{Configurator, GroupId, ParamKey};
use crate::ui::text::TextRenderer;

const HUD_SCALE: f32 = 2.0;
const HUD_MARGIN: f32 = 8.0;
// 8px glyph height * scale + 4px padding
const LINE_HEIGHT: f32 = 8.0 * HUD_SCALE + 4.0;
const HUD_COLOR: Vec3 = Vec3::new(1.0, 1.0, 0.0);

const FPS_SAMPLES: usize = 60;

pub struct DebugHud {
    visible: bool,
    fps_ring: [f32; FPS_SAMPLES],
    fps_index: usize,
    fps_count: usize,
}

impl DebugHud {
    pub fn new() -> Self {
        Self {
            visible: false,
            fps_ring: [0.0; FPS_SAMPLES],
            fps_index: 0,
            fps_count: 0,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Push a frame delta into the rolling FPS buffer. Call every frame when visible.
    pub fn update(&mut self, dt: f32) {
        self.fps_ring[self.fps_index] = dt;
        self.fps_index = (self.fps_index + 1) % FPS_SAMPLES;
        if self.fps_count < FPS_SAMPLES {
            self.fps_count += 1;
        }
    }

    /// Render HUD lines at the top-left of the screen. Caller must set up the
    /// orthographic projection and GL blend state before calling.
    pub fn draw(
        &self,
        text_renderer: &mut TextRenderer,
        camera: &OrbitCamera,
        config: &Configurator,
        projection: &Mat4,
    ) {
        let fps = if self.fps_count == 0 {
            0.0
        } else {
            let sum: f32 = self.fps_ring[..self.fps_count].iter().sum();
            self.fps_count as f32 / sum
        };

        let lines = [
            format!("FPS: {:.0}", fps),
            format!(
                "Cam: yaw {:.1} pitch {:.1} dist {:.2}",
                camera.yaw, camera.pitch, camera.distance
            ),
            format!(
                "Key light: {:.0} deg  r {:.1}  h {:.1}",
                config.scalar(GroupId::LightRig, ParamKey::Angle),
                config.scalar(GroupId::LightRig, ParamKey::Radius),
                config.scalar(GroupId::LightRig, ParamKey::Height),
            ),
            format!(
                "Env: {:.0} deg  exp {:.2}",
                config.scalar(GroupId::Environment, ParamKey::Rotation),
                config.scalar(GroupId::Environment, ParamKey::Exposure),
            ),
            format!("Frame: {:.0}", config.scalar(GroupId::Animation, ParamKey::Frame)),
        ];

        for (i, line) in lines.iter().enumerate() {
            text_renderer.draw_text(
                line,
                HUD_MARGIN,
                HUD_MARGIN + LINE_HEIGHT * i as f32,
                HUD_SCALE,
                HUD_COLOR,
                projection,
            );
        }
    }
}
