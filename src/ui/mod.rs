pub mod hud;
pub mod panel;
pub mod text;

pub use hud::DebugHud;
pub use panel::{Panel, PanelAction};
pub use text::TextRenderer;
