use glam::Mat4;
use hecs::World;
use sdl2::keyboard::Scancode;
use sdl2::Sdl;

use crate::assets::{AnimationClip, AssetLoader, LoadEvent};
use crate::camera::OrbitCamera;
use crate::config::{Configurator, GroupId, ParamKey, ParamValue};
use crate::engine::input::{InputEvent, InputState};
use crate::engine::time::FrameTimer;
use crate::engine::window::ViewerWindow;
use crate::renderer::{MeshStore, Renderer};
use crate::scene::{instantiate_model, Stage};
use crate::systems::{advance_frame, animation_system, transform_propagation_system, CLIP_FPS};
use crate::ui::{DebugHud, Panel, PanelAction, TextRenderer};

#[derive(Clone, Copy, PartialEq, Eq)]
enum UiMode {
    Scene,
    Panel,
}

pub struct ViewerApp {
    world: World,
    meshes: MeshStore,
    stage: Stage,
    config: Configurator,
    camera: OrbitCamera,
    renderer: Renderer,
    text_renderer: TextRenderer,
    panel: Panel,
    hud: DebugHud,
    mode: UiMode,
    loader: AssetLoader,
    clip: Option<AnimationClip>,
}

impl ViewerApp {
    pub fn new(
        world: World,
        meshes: MeshStore,
        stage: Stage,
        config: Configurator,
        renderer: Renderer,
        loader: AssetLoader,
    ) -> Self {
        Self {
            world,
            meshes,
            stage,
            config,
            camera: OrbitCamera::new(),
            renderer,
            text_renderer: TextRenderer::new(),
            panel: Panel::new(),
            hud: DebugHud::new(),
            mode: UiMode::Scene,
            loader,
            clip: None,
        }
    }

    pub fn run(&mut self, sdl: &Sdl, window: &ViewerWindow) {
        let mut event_pump = sdl.event_pump().expect("Failed to get event pump");
        let mut input = InputState::new();
        let mut timer = FrameTimer::new();

        'main: loop {
            timer.tick();
            input.update(&mut event_pump);

            if input.should_quit() {
                break;
            }

            let mut just_opened = false;
            for event in &input.events {
                match event {
                    InputEvent::KeyPressed(Scancode::Tab) if self.mode == UiMode::Scene => {
                        self.mode = UiMode::Panel;
                        self.panel.reset_selection();
                        just_opened = true;
                    }
                    InputEvent::KeyPressed(Scancode::F3) => self.hud.toggle(),
                    // Resize belongs to the render layer; nothing else cares.
                    InputEvent::Resized(w, h) => window.apply_resize(*w, *h),
                    _ => {}
                }
            }

            match self.mode {
                UiMode::Panel => {
                    // Skip input on the frame the panel opened (same Tab event
                    // would close it again).
                    if !just_opened {
                        let action =
                            self.panel.handle_input(&input, &mut self.world, &mut self.config);
                        if action == PanelAction::Close {
                            self.mode = UiMode::Scene;
                        }
                    }
                }
                UiMode::Scene => {
                    for event in &input.events {
                        if let InputEvent::KeyPressed(Scancode::Escape) = event {
                            break 'main;
                        }
                    }
                    if input.left_held {
                        self.camera.orbit(input.mouse_dx, input.mouse_dy);
                    }
                    if input.scroll_dy != 0.0 {
                        self.camera.zoom(input.scroll_dy);
                    }
                }
            }

            if self.hud.is_visible() {
                self.hud.update(timer.dt);
            }

            self.poll_loader();
            self.advance_playback(timer.dt);

            if let Some(clip) = &self.clip {
                animation_system(&mut self.world, clip, &self.stage.model_nodes);
            }
            transform_propagation_system(&mut self.world);

            let view = self.camera.view_matrix();
            let proj = self.camera.projection_matrix(window.aspect_ratio());
            self.renderer
                .draw_scene(&self.world, &self.meshes, &view, &proj, self.camera.eye());

            self.draw_overlay(window);

            window.swap();
        }
    }

    /// Consume finished asset loads. Failures are terminal: log and move on.
    fn poll_loader(&mut self) {
        while let Some(event) = self.loader.poll() {
            match event {
                LoadEvent::Model(Ok(model)) => {
                    log::info!(
                        "model loaded: {} nodes, {} primitives, {} clips",
                        model.nodes.len(),
                        model.primitives.len(),
                        model.clips.len()
                    );
                    instantiate_model(&mut self.world, &mut self.meshes, &mut self.stage, &model);
                    if let Some(clip) = model.clips.into_iter().next() {
                        log::info!("playing clip {:?} ({:.2}s)", clip.name, clip.duration);
                        self.config
                            .seed_clip_frames(&mut self.world, clip.duration * CLIP_FPS);
                        self.clip = Some(clip);
                    }
                }
                LoadEvent::Model(Err(err)) => log::error!("model load failed: {err}"),
                LoadEvent::Environment(Ok(image)) => self.renderer.set_environment(&image),
                LoadEvent::Environment(Err(err)) => log::error!("environment load failed: {err}"),
            }
        }
    }

    /// Drive the scrub frame while the clip is playing. Routing the advance
    /// through the configurator keeps the panel readout, the playback
    /// component, and the sampled pose on one source of truth.
    fn advance_playback(&mut self, dt: f32) {
        if self.clip.is_none() {
            return;
        }
        let playing = matches!(
            self.config.get(GroupId::Animation, ParamKey::Playing),
            Some(ParamValue::Flag(true))
        );
        if !playing {
            return;
        }
        let Some((_, max, _)) = self.config.scalar_range(GroupId::Animation, ParamKey::Frame)
        else {
            return;
        };
        let current = self.config.scalar(GroupId::Animation, ParamKey::Frame);
        let next = advance_frame(current, dt, max);
        self.config
            .set(&mut self.world, GroupId::Animation, ParamKey::Frame, ParamValue::Scalar(next));
    }

    fn draw_overlay(&mut self, window: &ViewerWindow) {
        let (w, h) = window.size();
        let ui_proj = Mat4::orthographic_rh_gl(0.0, w as f32, h as f32, 0.0, -1.0, 1.0);

        unsafe {
            gl::Disable(gl::DEPTH_TEST);
            gl::Enable(gl::BLEND);
            gl::BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
        }

        if self.mode == UiMode::Panel {
            self.panel
                .draw(&mut self.text_renderer, w as f32, h as f32, &ui_proj, &self.config);
        }

        if self.hud.is_visible() {
            self.hud
                .draw(&mut self.text_renderer, &self.camera, &self.config, &ui_proj);
        }

        unsafe {
            gl::Disable(gl::BLEND);
            gl::Enable(gl::DEPTH_TEST);
        }
    }
}
