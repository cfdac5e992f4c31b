//! Headless tile solver.
//!
//! Loads a catalog file, runs the solver one step per tick and writes the
//! result as a PNG (and as text on stdout).
//!
//! Run with: `cargo run -- tilesets/roads/tileset.json --seed 7 --output roads.png`
//!
//! Set `RUST_LOG=debug` to see every collapse.

mod render;

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tilewave_core::{
    Catalog, ContradictionPolicy, Model, Options, Propagation, StepOutcome, DEFAULT_HEIGHT,
    DEFAULT_WIDTH,
};

#[derive(Parser, Debug)]
#[command(name = "tilewave", about = "Fill a grid with socket-matching tiles")]
struct Args {
    /// Catalog JSON file (tiles or sprite sheet)
    catalog: PathBuf,

    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,

    /// Seed for a reproducible run; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Propagate with a worklist instead of rescanning the grid
    #[arg(long)]
    worklist: bool,

    /// Rebuild the grid after a contradiction, up to this many extra times
    #[arg(long, default_value_t = 0)]
    max_restarts: usize,

    /// Output PNG
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Write a PNG every N steps into this directory
    #[arg(long)]
    frames: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    frame_interval: usize,

    /// Multiply drawn tiles by this colour, RRGGBB
    #[arg(long, value_parser = render::parse_tint)]
    tint: Option<[u8; 3]>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Arc::new(Catalog::load(&args.catalog)?);
    info!(
        "Loaded {} tile variants from {}",
        catalog.len(),
        args.catalog.display()
    );

    let options = Options {
        width: args.width,
        height: args.height,
        seed: args.seed,
        propagation: if args.worklist {
            Propagation::Worklist
        } else {
            Propagation::Rescan
        },
        on_contradiction: if args.max_restarts > 0 {
            ContradictionPolicy::Restart {
                max_attempts: args.max_restarts + 1,
            }
        } else {
            ContradictionPolicy::Halt
        },
    };

    let base_dir = args.catalog.parent().unwrap_or(Path::new("."));
    let needs_images = args.output.is_some() || args.frames.is_some();
    let atlas = if needs_images {
        Some(render::TileAtlas::load(&catalog, base_dir)?)
    } else {
        None
    };

    if let Some(dir) = &args.frames {
        std::fs::create_dir_all(dir)?;
    }

    let mut model = Model::new(catalog, options)?;
    let result = match (&args.frames, &atlas) {
        (Some(dir), Some(atlas)) => run_with_frames(&mut model, atlas, dir, args),
        _ => model.run().map(|_| ()).map_err(Into::into),
    };

    print!("{}", render::render_text(model.grid()));

    if let (Some(path), Some(atlas)) = (&args.output, &atlas) {
        render::render_grid(model.grid(), atlas, args.tint)?.save(path)?;
        info!("Wrote {}", path.display());
    }

    result
}

/// Step manually so each tick can be captured.
fn run_with_frames(
    model: &mut Model,
    atlas: &render::TileAtlas,
    dir: &Path,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    let interval = args.frame_interval.max(1);
    let mut tick = 0usize;

    let save_frame = |model: &Model, tick: usize| -> Result<(), Box<dyn std::error::Error>> {
        let path = dir.join(format!("frame_{:05}.png", tick));
        render::render_grid(model.grid(), atlas, args.tint)?.save(&path)?;
        Ok(())
    };

    loop {
        if tick % interval == 0 {
            save_frame(model, tick)?;
        }
        tick += 1;

        match model.step() {
            StepOutcome::Collapsed { .. } => {}
            StepOutcome::Finished => {
                // The solved grid always gets a frame
                let last = tick - 1;
                if last % interval != 0 {
                    save_frame(model, last)?;
                }
                info!("Finished after {} ticks", tick);
                return Ok(());
            }
            StepOutcome::Contradiction { x, y } => model.recover(x, y)?,
        }
    }
}
