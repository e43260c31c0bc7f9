//! `hemp`: render a scene file to PNG, optionally after replaying gestures.

use clap::Parser;
use hemp_app::{FsLoader, Gesture, load_scene, write_png};
use hemp_core::{HempConfig, SceneEvent};
use hemp_render::{Hemp, PixelSurface};
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "hemp", version, about = "Render and transform Hemp scenes")]
struct Cli {
    /// Scene file: a JSON array of objects.
    scene: PathBuf,
    /// Controller configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    /// Pointer drag `x0,y0:x1,y1[:mods]`, e.g. `200,150:250,200:shift`.
    /// May be repeated.
    #[arg(long = "gesture")]
    gestures: Vec<Gesture>,
    /// Write the rendered canvas here.
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Print the property descriptor registry instead of the scene.
    #[arg(long)]
    properties: bool,
}

fn read_config(path: Option<&Path>) -> Result<HempConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(HempConfig::from_json_str(&std::fs::read_to_string(path)?)?),
        None => Ok(HempConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    log::info!("Starting hemp");
    let cli = Cli::parse();

    let mut config = read_config(cli.config.as_deref())?;
    config.width = cli.width.unwrap_or(config.width);
    config.height = cli.height.unwrap_or(config.height);

    let base = cli.scene.parent().unwrap_or(Path::new(".")).to_path_buf();
    let surface = PixelSurface::new(config.width, config.height);
    let mut hemp = Hemp::new(surface, config, Rc::new(FsLoader::new(base)))?;
    hemp.on_event(|event| match event {
        SceneEvent::FrameRate(fps) => log::info!("transform finished at {fps:.1} fps"),
        other => log::debug!("{} event", other.name()),
    });

    let objects = load_scene(&cli.scene)?;
    let outcome = pollster::block_on(hemp.set_objects(objects))?;
    for err in &outcome.errors {
        eprintln!("warning: {err}");
    }

    for gesture in &cli.gestures {
        for event in gesture.events() {
            hemp.handle_pointer(event)?;
        }
    }
    hemp.render()?;

    if let Some(path) = &cli.output {
        write_png(path, hemp.surface())?;
    }

    let report = if cli.properties {
        serde_json::to_value(hemp.property_registry())?
    } else {
        hemp.to_json()?
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
