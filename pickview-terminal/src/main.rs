//! PickView terminal viewer
//!
//! Renders polyhedral models as ASCII art and highlights the face under a
//! mouse click.
//! Controls:
//!   - Left click: pick a face
//!   - Middle/right drag: orbit, with Shift: pan
//!   - Wheel, +/-: zoom
//!   - WASD / arrow keys: rotate
//!   - O: toggle perspective/orthographic, V: isometric view
//!   - Q/ESC: quit

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pickview_core::{stl, Model, PickPolicy, ViewerConfig};
use pickview_terminal::TerminalApp;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Shape {
    Cube,
    Donut,
    Both,
    None,
}

#[derive(Debug, Parser)]
#[command(name = "pickview")]
#[command(about = "Interactive terminal 3D viewer with ray-cast face picking.")]
struct Cli {
    /// Built-in model(s) to show
    #[arg(long, value_enum, default_value_t = Shape::Cube)]
    model: Shape,
    /// Additional STL files to load
    #[arg(long)]
    stl: Vec<PathBuf>,
    /// Segments around each circle of the donut
    #[arg(long, default_value_t = 12)]
    donut_sides: usize,
    /// Perspective only, no picking
    #[arg(long)]
    wireframe: bool,
    /// Pick the first face in scene order instead of the nearest
    #[arg(long)]
    first_hit: bool,
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Degrees of orbit per terminal cell dragged
    #[arg(long, default_value_t = 4.0)]
    rotate_speed: f64,
    /// Pan units per terminal cell dragged
    #[arg(long, default_value_t = 0.05)]
    pan_speed: f64,
    /// Write logs here; otherwise only warnings go to stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let models = load_models(&cli)?;
    let mut config = if cli.wireframe {
        ViewerConfig::wireframe()
    } else {
        ViewerConfig::default()
    };
    if cli.first_hit {
        config.pick_policy = PickPolicy::FirstHit;
    }
    config.rotate_sensitivity = cli.rotate_speed;
    config.pan_sensitivity = cli.pan_speed;

    let mut app = TerminalApp::new(models, config, cli.fps).context("failed to set up terminal")?;
    app.run().context("terminal session failed")?;

    println!("Thank you for using PickView!");
    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let builder = tracing_subscriber::fmt();
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "pickview_core=info,pickview_terminal=info".into()),
                )
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            builder
                .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_models(cli: &Cli) -> Result<Vec<Model>> {
    let mut models = match cli.model {
        Shape::Cube => vec![Model::cube()],
        Shape::Donut => vec![Model::donut(cli.donut_sides)],
        Shape::Both => vec![Model::cube(), Model::donut(cli.donut_sides)],
        Shape::None => Vec::new(),
    };
    for path in &cli.stl {
        let data = std::fs::read(path)
            .with_context(|| format!("failed to read STL file {}", path.display()))?;
        let model = stl::parse_stl(&data)
            .with_context(|| format!("failed to parse STL file {}", path.display()))?;
        info!(path = %path.display(), faces = model.faces().len(), "loaded STL");
        models.push(model);
    }
    Ok(models)
}
