use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use clipstory::{
    CpuBackend, FrameIndex, RenderSettings, RenderToMp4Opts, StoryConfig, Storyboard,
    build_storyboard, render_frame, render_to_mp4, scenes, write_png,
};

#[derive(Parser, Debug)]
#[command(name = "clipstory", version, about = "Render the CLIP explainer scenes")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available scenes.
    List,
    /// Print the recorded step list of a scene.
    Script(ScriptArgs),
    /// Dump the final scene graph as JSON.
    Inspect(SceneArg),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct SceneArg {
    /// Scene name, see `clipstory list`.
    #[arg(long)]
    scene: String,
}

#[derive(Args, Debug)]
struct ScriptArgs {
    #[command(flatten)]
    scene: SceneArg,

    /// Emit JSON instead of one line per step.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct OutputOpts {
    /// JSON render config; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Whole frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArg,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    output: OutputOpts,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    scene: SceneArg,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    output: OutputOpts,
}

#[derive(serde::Serialize)]
struct StepRow<'a> {
    index: usize,
    start_secs: f64,
    duration_secs: f64,
    summary: &'a str,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::List => {
            for scene in scenes::all() {
                println!("{:<16} {}", scene.name(), scene.description());
            }
            Ok(())
        }
        Command::Script(args) => cmd_script(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn record(scene: &SceneArg) -> anyhow::Result<Storyboard> {
    let def = scenes::by_name(&scene.scene)?;
    build_storyboard(def).with_context(|| format!("record scene '{}'", scene.scene))
}

fn load_config(opts: &OutputOpts) -> anyhow::Result<StoryConfig> {
    let mut cfg = match &opts.config {
        Some(path) => StoryConfig::load(path)?,
        None => StoryConfig::default(),
    };
    if let Some(w) = opts.width {
        cfg.canvas.width = w;
    }
    if let Some(h) = opts.height {
        cfg.canvas.height = h;
    }
    if let Some(fps) = opts.fps {
        cfg.fps.num = fps;
        cfg.fps.den = 1;
    }
    if opts.parallel {
        cfg.threading.parallel = true;
    }
    if opts.threads.is_some() {
        cfg.threading.threads = opts.threads;
    }
    cfg.validate().context("invalid render options")?;
    Ok(cfg)
}

fn cmd_script(args: ScriptArgs) -> anyhow::Result<()> {
    let sb = record(&args.scene)?;
    let lines = sb.summary();
    if args.json {
        let rows: Vec<StepRow<'_>> = sb
            .steps
            .iter()
            .zip(&lines)
            .enumerate()
            .map(|(index, (step, line))| StepRow {
                index,
                start_secs: step.start_secs,
                duration_secs: step.duration_secs,
                summary: line,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for line in &lines {
            println!("{line}");
        }
        println!("total {:.2}s", sb.duration_secs());
    }
    Ok(())
}

fn cmd_inspect(args: SceneArg) -> anyhow::Result<()> {
    let sb = record(&args)?;
    println!("{}", serde_json::to_string_pretty(&sb.final_graph)?);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.output)?;
    let sb = record(&args.scene)?;
    let bg = cfg.background_override()?;
    let mut backend = CpuBackend::new(RenderSettings { clear_rgba: bg });

    let frame = render_frame(&sb, cfg.target(), FrameIndex(args.frame), &mut backend)
        .with_context(|| format!("render frame {}", args.frame))?;
    write_png(&frame, bg.unwrap_or(sb.background), &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.output)?;
    let sb = record(&args.scene)?;
    let bg = cfg.background_override()?;
    let mut backend = CpuBackend::new(RenderSettings { clear_rgba: bg });

    let opts = RenderToMp4Opts {
        range: None,
        bg_rgba: bg,
        overwrite: cfg.overwrite,
        threading: cfg.threading.clone(),
    };
    let stats = render_to_mp4(&sb, cfg.target(), &args.out, opts, &mut backend)?;

    eprintln!(
        "wrote {} ({} frames, {} rendered)",
        args.out.display(),
        stats.frames_total,
        stats.frames_rendered
    );
    Ok(())
}
