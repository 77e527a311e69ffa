//! gridcanvas viewer: one virtualized grid in a window

mod runtime;

use anyhow::Result;
use clap::Parser;
use winit::event_loop::EventLoop;

use gridcanvas::cli::CliArgs;
use gridcanvas::GridConfig;

use runtime::App;

fn main() -> Result<()> {
    gridcanvas::tracing::init();

    let args = CliArgs::parse();
    let config = GridConfig::load();
    let startup = args.into_config(&config).map_err(anyhow::Error::msg)?;

    let event_loop = EventLoop::new()?;
    let mut app = App::new(startup, &config)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
