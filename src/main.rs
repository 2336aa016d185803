use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{error, info};

use clipview::app::Viewer;
use clipview::config::ViewerConfig;
use clipview::window::{FrameLimiter, InputState, Window, WindowEvent};

#[derive(Parser)]
#[command(name = "clipview")]
#[command(about = "STL viewer with clip planes and stencil caps")]
struct Cli {
    /// STL files to load, each as its own object
    files: Vec<PathBuf>,

    /// Configuration file (defaults to ./clipview.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render a single frame to this image file and exit
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = ViewerConfig::discover(cli.config.as_deref())?;
    let mut viewer = Viewer::new(&config).context("failed to build the scene")?;
    let loaded = viewer.load_files(&cli.files);
    info!("{loaded} of {} file(s) loaded", cli.files.len());

    if let Some(path) = cli.snapshot {
        return viewer
            .save_snapshot(&path)
            .with_context(|| format!("failed to write {}", path.display()));
    }

    let mut window = Window::new(&config.window.title, config.window.width, config.window.height)
        .map_err(|e| anyhow!(e))
        .context("failed to open window")?;
    viewer.log_bindings();

    let mut input = InputState::default();
    let mut limiter = FrameLimiter::new(&window, config.window.fps);

    loop {
        input.begin_frame();
        match window.poll_events(&mut input) {
            WindowEvent::Quit => break,
            WindowEvent::Resize(width, height) if width > 0 && height > 0 => {
                viewer.resize(width, height);
                window.resize(width, height).map_err(|e| anyhow!(e))?;
            }
            WindowEvent::Resize(..) | WindowEvent::None => {}
        }

        if let Err(err) = viewer.handle_input(&input) {
            error!("{err}");
        }
        viewer.frame();

        window
            .present(viewer.engine().frame_buffer())
            .map_err(|e| anyhow!(e))?;
        limiter.wait_and_get_delta(&window);
    }

    Ok(())
}
