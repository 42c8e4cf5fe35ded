//! Asset collaborators. Both loads run at most once, at startup, on a worker
//! thread; results come back over a channel the frame loop polls. A failed
//! load is terminal: it is logged and the stage keeps rendering without it.

pub mod environment;
pub mod model;

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use thiserror::Error;

pub use environment::EquirectImage;
pub use model::{AnimationClip, Channel, ChannelOutput, Interpolation, LoadedModel};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("glTF import failed: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
}

pub enum LoadEvent {
    Model(Result<LoadedModel, AssetError>),
    Environment(Result<EquirectImage, AssetError>),
}

pub struct AssetLoader {
    rx: Receiver<LoadEvent>,
}

impl AssetLoader {
    /// Kick off the startup loads. Decoding happens off the main thread; GL
    /// upload and scene instantiation happen wherever the events are polled.
    pub fn spawn(model: Option<PathBuf>, hdr: Option<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();

        if let Some(path) = model {
            let tx = tx.clone();
            thread::spawn(move || {
                let _ = tx.send(LoadEvent::Model(model::load_gltf(&path)));
            });
        }

        if let Some(path) = hdr {
            thread::spawn(move || {
                let _ = tx.send(LoadEvent::Environment(environment::load_hdr(&path)));
            });
        }

        Self { rx }
    }

    /// Non-blocking: at most one finished load per call.
    pub fn poll(&self) -> Option<LoadEvent> {
        self.rx.try_recv().ok()
    }
}
