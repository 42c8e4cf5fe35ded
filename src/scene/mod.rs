pub mod stage;

pub use stage::{build_stage, instantiate_model, Stage};
