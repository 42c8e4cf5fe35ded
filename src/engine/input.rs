use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Scancode;
use sdl2::mouse::MouseButton;
use sdl2::EventPump;
use std::collections::HashSet;

/// Discrete events surfaced to the frame loop. Key repeats are kept so panel
/// sliders step while a key is held down.
pub enum InputEvent {
    KeyPressed(Scancode),
    Resized(u32, u32),
}

pub struct InputState {
    pub keys: HashSet<Scancode>,
    pub events: Vec<InputEvent>,
    pub mouse_dx: f32,
    pub mouse_dy: f32,
    pub scroll_dy: f32,
    pub left_held: bool,
    quit: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys: HashSet::new(),
            events: Vec::new(),
            mouse_dx: 0.0,
            mouse_dy: 0.0,
            scroll_dy: 0.0,
            left_held: false,
            quit: false,
        }
    }

    pub fn update(&mut self, event_pump: &mut EventPump) {
        self.mouse_dx = 0.0;
        self.mouse_dy = 0.0;
        self.scroll_dy = 0.0;
        self.events.clear();

        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => self.quit = true,
                Event::KeyDown {
                    scancode: Some(sc), ..
                } => {
                    self.keys.insert(sc);
                    self.events.push(InputEvent::KeyPressed(sc));
                }
                Event::KeyUp {
                    scancode: Some(sc), ..
                } => {
                    self.keys.remove(&sc);
                }
                Event::MouseMotion { xrel, yrel, .. } => {
                    self.mouse_dx += xrel as f32;
                    self.mouse_dy += yrel as f32;
                }
                Event::MouseButtonDown {
                    mouse_btn: MouseButton::Left,
                    ..
                } => self.left_held = true,
                Event::MouseButtonUp {
                    mouse_btn: MouseButton::Left,
                    ..
                } => self.left_held = false,
                Event::MouseWheel { y, .. } => {
                    self.scroll_dy += y as f32;
                }
                Event::Window {
                    win_event: WindowEvent::Resized(w, h),
                    ..
                } => {
                    if w > 0 && h > 0 {
                        self.events.push(InputEvent::Resized(w as u32, h as u32));
                    }
                }
                _ => {}
            }
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn is_key_held(&self, sc: Scancode) -> bool {
        self.keys.contains(&sc)
    }
}
