use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};

use crate::command::RenderCommand;
use crate::config::{Config, load_config, theme_by_name};
use crate::controller::TraversalController;
use crate::layout::{Layout, compute_layout};
use crate::parser::parse_tree;
use crate::playback::clamp_speed;
use crate::render::{render_svg, write_output_svg};
use crate::traversal::TraversalMode;

static SAMPLE_PAYLOAD: &str = include_str!("../tests/fixtures/sample_reasoning.json");

#[derive(Parser, Debug)]
#[command(name = "rtr", version, about = "Reasoning-tree traversal renderer")]
pub struct Args {
    /// Input payload (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Render the bundled sample reasoning tree
    #[arg(long, conflicts_with = "input")]
    pub sample: bool,

    /// Output file for the final SVG. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Directory receiving one SVG frame per traversal step
    #[arg(long = "frames")]
    pub frames: Option<PathBuf>,

    /// Downward-phase presentation
    #[arg(long, value_enum, default_value = "layered")]
    pub mode: ModeArg,

    /// Playback speed 1..10; out-of-range values are clamped
    #[arg(long)]
    pub speed: Option<u8>,

    /// Sleep the playback interval between frames
    #[arg(long, requires = "frames")]
    pub animate: bool,

    /// Config JSON/JSON5 file with partial overrides
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Theme name (light/dark)
    #[arg(long)]
    pub theme: Option<String>,

    /// Viewport width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Viewport height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ModeArg {
    /// Reveal whole depth layers at once ("parallel" in older payloads)
    #[value(alias = "parallel")]
    Layered,
    Sequential,
}

impl From<ModeArg> for TraversalMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Layered => TraversalMode::Layered,
            ModeArg::Sequential => TraversalMode::Sequential,
        }
    }
}

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    config.layout.viewport_width = args.width;
    config.layout.viewport_height = args.height;
    config.render.width = args.width;
    config.render.height = args.height;
    if let Some(name) = args.theme.as_deref() {
        config.theme =
            theme_by_name(name).ok_or_else(|| anyhow::anyhow!("unknown theme `{name}`"))?;
    }
    let input = read_input(&args)?;
    let tree = parse_tree(&input).context("malformed tree payload")?;
    info!(nodes = tree.len(), depth = tree.max_depth(), "tree loaded");

    let layout = compute_layout(&tree, &config.layout);
    let mut controller =
        TraversalController::new(tree, &layout, args.mode.into(), &config.layout);

    if let Some(dir) = args.frames.as_deref() {
        let speed = clamp_speed(args.speed.unwrap_or(config.playback.default_speed));
        return emit_frames(&mut controller, &layout, &config, dir, speed, args.animate);
    }

    // No frame directory: run the whole traversal and render the final
    // state once.
    while controller.step_forward() {}
    log_commands(&mut controller);
    let svg = render_svg(
        controller.tree(),
        &layout,
        &controller.highlight_map(),
        &config.theme,
        &config.render,
    );
    write_output_svg(&svg, args.output.as_deref())
}

fn emit_frames(
    controller: &mut TraversalController,
    layout: &Layout,
    config: &Config,
    dir: &Path,
    speed: u8,
    animate: bool,
) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let mut frame = 0usize;
    write_frame(dir, frame, controller, layout, config)?;

    if animate {
        controller.play(speed);
        while controller.is_playing() {
            std::thread::sleep(Duration::from_millis(25));
            if controller.tick(Instant::now()) {
                frame += 1;
                log_commands(controller);
                write_frame(dir, frame, controller, layout, config)?;
            }
        }
    } else {
        while controller.step_forward() {
            frame += 1;
            log_commands(controller);
            write_frame(dir, frame, controller, layout, config)?;
        }
    }
    info!(frames = frame + 1, "frame export complete");
    Ok(())
}

fn write_frame(
    dir: &Path,
    index: usize,
    controller: &TraversalController,
    layout: &Layout,
    config: &Config,
) -> Result<()> {
    let svg = render_svg(
        controller.tree(),
        layout,
        &controller.highlight_map(),
        &config.theme,
        &config.render,
    );
    let path = dir.join(format!("step_{index:03}.svg"));
    std::fs::write(&path, svg).with_context(|| format!("failed to write {}", path.display()))
}

fn log_commands(controller: &mut TraversalController) {
    for command in controller.take_commands() {
        match &command {
            RenderCommand::ShowStepSummary { ids, phase, depth } => {
                info!(phase = phase.as_str(), depth, nodes = ids.len(), "step");
            }
            RenderCommand::ShowCompletion => info!("traversal complete"),
            RenderCommand::HighlightLayer { ids, role } => {
                debug!(role = role.as_str(), nodes = ids.len(), "highlight layer");
            }
            _ => debug!(?command, "renderer command"),
        }
    }
}

fn read_input(args: &Args) -> Result<String> {
    if args.sample {
        return Ok(SAMPLE_PAYLOAD.to_string());
    }
    match args.input.as_deref() {
        Some(path) if path == Path::new("-") => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => Err(anyhow::anyhow!("no input given; pass --input FILE or --sample")),
    }
}
