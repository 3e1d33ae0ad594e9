use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cubereel::{Pipeline, PipelineConfig, ReelError, RunReport, puzzle};

#[derive(Parser, Debug)]
#[command(
    name = "cubereel",
    version,
    about = "Render the cube puzzle with Blender and build mount/dismount videos with ffmpeg"
)]
struct Cli {
    /// JSON pipeline config; flags below override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the render script, frames and videos.
    #[arg(long, global = true)]
    workdir: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render frames, then encode both videos (the default).
    Run(ToolArgs),
    /// Only run the renderer.
    Render(ToolArgs),
    /// Only encode both videos from frames already on disk.
    Encode(ToolArgs),
    /// List the frames in encode order.
    Frames,
    /// Print the puzzle piece catalog.
    Pieces(PiecesArgs),
}

#[derive(Args, Debug, Default)]
struct ToolArgs {
    /// Renderer executable.
    #[arg(long)]
    blender: Option<PathBuf>,

    /// Script the renderer runs, relative to the working directory.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Encoder executable.
    #[arg(long)]
    ffmpeg: Option<PathBuf>,

    /// Output frame rate.
    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Args, Debug)]
struct PiecesArgs {
    /// Print as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            exit_code_for(&err)
        }
    }
}

/// A failing subprocess hands its own exit code through; everything else is 1.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    let code = err
        .chain()
        .find_map(|cause| match cause.downcast_ref::<ReelError>() {
            Some(ReelError::Process { status, .. }) => status.code(),
            _ => None,
        })
        .and_then(|code| u8::try_from(code).ok())
        .filter(|&code| code != 0)
        .unwrap_or(1);
    ExitCode::from(code)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let load = |args| load_config(cli.config.as_deref(), cli.workdir.as_deref(), args);

    match cli.cmd {
        None => cmd_run(load(ToolArgs::default())?),
        Some(Command::Run(args)) => cmd_run(load(args)?),
        Some(Command::Render(args)) => {
            let pipeline = Pipeline::new(load(args)?)?;
            pipeline.render()?;
            Ok(())
        }
        Some(Command::Encode(args)) => {
            let pipeline = Pipeline::new(load(args)?)?;
            print_report(&pipeline.encode()?);
            Ok(())
        }
        Some(Command::Frames) => cmd_frames(load(ToolArgs::default())?),
        Some(Command::Pieces(args)) => cmd_pieces(args),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(
    path: Option<&Path>,
    workdir: Option<&Path>,
    args: ToolArgs,
) -> anyhow::Result<PipelineConfig> {
    let mut cfg = match path {
        Some(p) => PipelineConfig::from_path(p)?,
        None => PipelineConfig::default(),
    };

    if let Some(dir) = workdir {
        cfg.workdir = dir.to_path_buf();
    }
    if let Some(blender) = args.blender {
        cfg.render.blender = blender;
    }
    if let Some(script) = args.script {
        cfg.render.script = script;
    }
    if let Some(ffmpeg) = args.ffmpeg {
        cfg.encode.ffmpeg = ffmpeg;
    }
    if let Some(fps) = args.fps {
        cfg.encode.fps = fps;
    }

    cfg.validate().context("invalid pipeline configuration")?;
    Ok(cfg)
}

fn cmd_run(cfg: PipelineConfig) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(cfg)?;
    let report = pipeline.run()?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &RunReport) {
    eprintln!(
        "encoded {} frames ({}x{})",
        report.frames, report.dimensions.0, report.dimensions.1
    );
    for out in &report.outputs {
        eprintln!(
            "wrote {} ({} bytes, sha256 {})",
            out.path.display(),
            out.bytes,
            out.sha256
        );
    }
}

fn cmd_frames(cfg: PipelineConfig) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(cfg)?;
    let frames = pipeline.frames()?;
    for frame in frames.frames() {
        println!("{}\t{}", frame.index, frame.path.display());
    }
    Ok(())
}

fn cmd_pieces(args: PiecesArgs) -> anyhow::Result<()> {
    let pieces = puzzle::catalog();

    if args.json {
        let out = serde_json::to_string_pretty(&pieces).context("serialize pieces")?;
        println!("{out}");
    } else {
        for piece in &pieces {
            println!("{piece}");
        }
    }

    let invalid: Vec<&str> = pieces
        .iter()
        .filter(|p| !p.is_valid())
        .map(|p| p.name.as_str())
        .collect();
    if !invalid.is_empty() {
        anyhow::bail!("invalid pieces: {}", invalid.join(", "));
    }
    Ok(())
}
