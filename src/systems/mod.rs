mod animation;
mod transform;

pub use animation::{advance_frame, animation_system, CLIP_FPS};
pub use transform::transform_propagation_system;
