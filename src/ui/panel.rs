use gl::types::*;
use glam::{Mat4, Vec3};
use hecs::World;
use sdl2::keyboard::Scancode;
use std::mem;

use crate::config::{format_hex, Configurator, ControlKind, ParamValue};
use crate::engine::input::{InputEvent, InputState};
use crate::renderer::shader::ShaderProgram;
use crate::ui::text::TextRenderer;

const QUAD_VERT_SRC: &str = include_str!("../../shaders/quad.vert");
const QUAD_FRAG_SRC: &str = include_str!("../../shaders/quad.frag");

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    None,
    Close,
}

/// Hex swatches the color rows cycle through; a keyboard stand-in for a
/// color picker, fed through the same `set_hex` path a picker would use.
const SWATCHES: &[&str] = &[
    "#ffffff", "#fff1d6", "#ffd9a0", "#ffb36b", "#ff8a7a", "#c9a0ff", "#a0b8ff", "#8fd4ff",
    "#9affc9", "#d8d8d8", "#6f6f6f",
];

const PANEL_WIDTH: f32 = 300.0;
const ROW_HEIGHT: f32 = 26.0;
const GROUP_GAP: f32 = 10.0;
const TEXT_SCALE: f32 = 1.5;

/// The parameter panel: the GUI layer of the stage. Every edit funnels into
/// `Configurator::set` / `set_hex`; the panel holds no scene state of its own
/// beyond the row cursor and per-row swatch positions.
pub struct Panel {
    shader: ShaderProgram,
    vao: GLuint,
    vbo: GLuint,
    selected: usize,
    swatch_idx: Vec<usize>,
}

impl Panel {
    pub fn new() -> Self {
        let shader = ShaderProgram::from_sources(QUAD_VERT_SRC, QUAD_FRAG_SRC)
            .expect("Failed to compile quad shaders");

        let mut vao: GLuint = 0;
        let mut vbo: GLuint = 0;

        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::GenBuffers(1, &mut vbo);

            gl::BindVertexArray(vao);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            // Enough for a single quad (6 vertices * 2 floats)
            gl::BufferData(
                gl::ARRAY_BUFFER,
                (12 * mem::size_of::<f32>()) as GLsizeiptr,
                std::ptr::null(),
                gl::DYNAMIC_DRAW,
            );

            let stride = (2 * mem::size_of::<f32>()) as GLsizei;
            gl::EnableVertexAttribArray(0);
            gl::VertexAttribPointer(0, 2, gl::FLOAT, gl::FALSE, stride, std::ptr::null());

            gl::BindVertexArray(0);
        }

        Self {
            shader,
            vao,
            vbo,
            selected: 0,
            swatch_idx: Vec::new(),
        }
    }

    pub fn reset_selection(&mut self) {
        self.selected = 0;
    }

    pub fn handle_input(
        &mut self,
        input: &InputState,
        world: &mut World,
        config: &mut Configurator,
    ) -> PanelAction {
        let count = config.controls().len();
        if self.swatch_idx.len() != count {
            self.swatch_idx = vec![0; count];
        }
        // Shift makes scalar steps coarse.
        let step_mult = if input.is_key_held(Scancode::LShift) || input.is_key_held(Scancode::RShift)
        {
            10.0
        } else {
            1.0
        };

        for event in &input.events {
            let InputEvent::KeyPressed(sc) = event else {
                continue;
            };
            match sc {
                Scancode::Up | Scancode::W => {
                    self.selected = if self.selected > 0 { self.selected - 1 } else { count - 1 };
                }
                Scancode::Down | Scancode::S => {
                    self.selected = (self.selected + 1) % count;
                }
                Scancode::Left | Scancode::A => {
                    self.adjust(world, config, -1.0, step_mult);
                }
                Scancode::Right | Scancode::D => {
                    self.adjust(world, config, 1.0, step_mult);
                }
                Scancode::Return | Scancode::KpEnter | Scancode::Space => {
                    self.toggle_selected(world, config);
                }
                Scancode::Tab | Scancode::Escape => return PanelAction::Close,
                _ => {}
            }
        }
        PanelAction::None
    }

    fn adjust(&mut self, world: &mut World, config: &mut Configurator, dir: f32, step_mult: f32) {
        let control = &config.controls()[self.selected];
        let (group, key, kind) = (control.group, control.key, control.kind);
        match kind {
            ControlKind::Scalar { step, .. } => {
                let current = config.scalar(group, key);
                let next = current + dir * step * step_mult;
                config.set(world, group, key, ParamValue::Scalar(next));
            }
            ControlKind::Toggle => self.toggle_selected(world, config),
            ControlKind::Color => {
                let slot = &mut self.swatch_idx[self.selected];
                *slot = (*slot as isize + dir as isize).rem_euclid(SWATCHES.len() as isize) as usize;
                config.set_hex(world, group, key, SWATCHES[*slot]);
            }
        }
    }

    fn toggle_selected(&mut self, world: &mut World, config: &mut Configurator) {
        let control = &config.controls()[self.selected];
        let (group, key, kind) = (control.group, control.key, control.kind);
        if !matches!(kind, ControlKind::Toggle) {
            return;
        }
        if let Some(ParamValue::Flag(value)) = config.get(group, key) {
            config.set(world, group, key, ParamValue::Flag(!value));
        }
    }

    pub fn draw(
        &mut self,
        text_renderer: &mut TextRenderer,
        width: f32,
        height: f32,
        projection: &Mat4,
        config: &Configurator,
    ) {
        let x0 = width - PANEL_WIDTH - 12.0;
        let controls = config.controls();

        // Row layout first; the backdrop is sized to fit.
        let mut rows = Vec::with_capacity(controls.len());
        let mut y = 48.0;
        let mut prev_group = None;
        for control in controls {
            if prev_group.is_some() && prev_group != Some(control.group) {
                y += GROUP_GAP;
            }
            prev_group = Some(control.group);
            rows.push(y);
            y += ROW_HEIGHT;
        }
        let panel_height = (y + 28.0).min(height - 24.0);

        self.draw_quad(x0, 12.0, PANEL_WIDTH, panel_height, [0.0, 0.0, 0.0, 0.65], projection);

        text_renderer.draw_text("STAGE", x0 + 10.0, 22.0, 2.0, Vec3::ONE, projection);

        for (i, (control, &row_y)) in controls.iter().zip(rows.iter()).enumerate() {
            let selected = i == self.selected;
            let color = if selected {
                Vec3::new(1.0, 0.9, 0.2)
            } else {
                Vec3::new(0.75, 0.75, 0.75)
            };

            if selected {
                self.draw_quad(
                    x0 + 4.0,
                    row_y - 3.0,
                    PANEL_WIDTH - 8.0,
                    ROW_HEIGHT - 6.0,
                    [1.0, 1.0, 1.0, 0.08],
                    projection,
                );
                text_renderer.draw_text(">", x0 + 6.0, row_y, TEXT_SCALE, color, projection);
            }

            text_renderer.draw_text(control.label, x0 + 22.0, row_y, TEXT_SCALE, color, projection);

            let value = self.value_string(config, i);
            let value_w = text_renderer.measure_text(&value, TEXT_SCALE);
            text_renderer.draw_text(
                &value,
                x0 + PANEL_WIDTH - value_w - 10.0,
                row_y,
                TEXT_SCALE,
                color,
                projection,
            );

            // Slider track under scalar rows.
            if let ControlKind::Scalar { min, max, .. } = control.kind {
                let v = config.scalar(control.group, control.key);
                let t = if max > min { (v - min) / (max - min) } else { 0.0 };
                let track_x = x0 + 22.0;
                let track_w = PANEL_WIDTH - 44.0;
                let track_y = row_y + 14.0;
                self.draw_quad(track_x, track_y, track_w, 3.0, [1.0, 1.0, 1.0, 0.15], projection);
                self.draw_quad(
                    track_x,
                    track_y,
                    track_w * t.clamp(0.0, 1.0),
                    3.0,
                    [1.0, 0.8, 0.3, 0.8],
                    projection,
                );
            }
        }

        text_renderer.draw_text(
            "tab: close  arrows: adjust  shift: coarse",
            x0 + 10.0,
            12.0 + panel_height - 16.0,
            1.0,
            Vec3::new(0.55, 0.55, 0.55),
            projection,
        );
    }

    fn value_string(&self, config: &Configurator, index: usize) -> String {
        let control = &config.controls()[index];
        match (control.kind, config.get(control.group, control.key)) {
            (ControlKind::Scalar { step, .. }, Some(ParamValue::Scalar(v))) => {
                if step >= 1.0 {
                    format!("{v:.0}")
                } else {
                    format!("{v:.2}")
                }
            }
            (_, Some(ParamValue::Flag(flag))) => if flag { "on" } else { "off" }.to_string(),
            (_, Some(ParamValue::Color(color))) => format_hex(color),
            _ => String::from("-"),
        }
    }

    fn draw_quad(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: [f32; 4],
        projection: &Mat4,
    ) {
        #[rustfmt::skip]
        let vertices: [f32; 12] = [
            x,     y,
            x + w, y,
            x + w, y + h,
            x,     y,
            x + w, y + h,
            x,     y + h,
        ];

        self.shader.bind();
        self.shader.set_mat4("u_projection", projection);
        self.shader.set_vec4("u_color", color);

        unsafe {
            gl::BindVertexArray(self.vao);
            gl::BindBuffer(gl::ARRAY_BUFFER, self.vbo);
            gl::BufferSubData(
                gl::ARRAY_BUFFER,
                0,
                mem::size_of_val(&vertices) as GLsizeiptr,
                vertices.as_ptr() as *const _,
            );

            gl::DrawArrays(gl::TRIANGLES, 0, 6);
            gl::BindVertexArray(0);
        }
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteVertexArrays(1, &self.vao);
            gl::DeleteBuffers(1, &self.vbo);
        }
    }
}
