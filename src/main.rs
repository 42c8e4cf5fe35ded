mod app;
mod assets;
mod camera;
mod components;
mod config;
mod engine;
mod renderer;
mod scene;
mod systems;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use hecs::World;

use app::ViewerApp;
use assets::AssetLoader;
use config::Configurator;
use engine::window::ViewerWindow;
use renderer::{MeshStore, Renderer};
use scene::build_stage;

#[derive(Parser)]
#[command(name = "skylight", about = "HDRI lighting stage and model viewer")]
struct Args {
    /// glTF model (.glb/.gltf) to put on the stage
    model: Option<PathBuf>,
    /// Equirectangular .hdr environment map
    #[arg(long)]
    hdr: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let sdl = sdl2::init().expect("Failed to init SDL2");
    let window = ViewerWindow::new(&sdl, "Skylight", 1280, 720);

    // GL context is live from here on; the renderer compiles its shaders and
    // the stage uploads its meshes against it.
    let renderer = Renderer::init();

    let mut world = World::new();
    let mut meshes = MeshStore::new();
    let mut config = Configurator::new();
    let stage = build_stage(&mut world, &mut meshes, &mut config);

    let loader = AssetLoader::spawn(args.model, args.hdr);

    ViewerApp::new(world, meshes, stage, config, renderer, loader).run(&sdl, &window);
}
