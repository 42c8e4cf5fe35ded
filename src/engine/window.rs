use sdl2::video::{GLContext, GLProfile, Window};
use sdl2::Sdl;

pub struct ViewerWindow {
    _gl_context: GLContext,
    window: Window,
}

impl ViewerWindow {
    pub fn new(sdl: &Sdl, title: &str, width: u32, height: u32) -> Self {
        let video = sdl.video().expect("Failed to init SDL2 video");

        let gl_attr = video.gl_attr();
        gl_attr.set_context_profile(GLProfile::Core);
        gl_attr.set_context_version(3, 3);

        let window = video
            .window(title, width, height)
            .opengl()
            .resizable()
            .position_centered()
            .build()
            .expect("Failed to create window");

        let gl_context = window
            .gl_create_context()
            .expect("Failed to create GL context");

        gl::load_with(|s| video.gl_get_proc_address(s) as *const _);

        Self {
            _gl_context: gl_context,
            window,
        }
    }

    pub fn swap(&self) {
        self.window.gl_swap_window();
    }

    pub fn size(&self) -> (u32, u32) {
        self.window.size()
    }

    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.window.size();
        w as f32 / h as f32
    }

    /// Resize handling belongs entirely to the render layer: update the GL
    /// viewport and let the next frame pick up the new aspect ratio.
    pub fn apply_resize(&self, width: u32, height: u32) {
        unsafe {
            gl::Viewport(0, 0, width as i32, height as i32);
        }
    }
}
