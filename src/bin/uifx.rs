use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "uifx", version)]
struct Cli {
    /// Log slot, scheduler and flush activity to stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scenario and write the resulting parameter texture as a PNG.
    Dump(DumpArgs),
    /// Print the texture layout of every effect type.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct DumpArgs {
    /// Input scenario JSON.
    #[arg(long)]
    scenario: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[arg(long, value_enum, default_value_t = Backend::Cpu)]
    backend: Backend,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Effect texture config JSON. Built-in layouts are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    Cpu,
    Gpu,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Dump(args) => cmd_dump(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn backend_kind(backend: Backend) -> anyhow::Result<uifx::BackendKind> {
    match backend {
        Backend::Cpu => Ok(uifx::BackendKind::Cpu),
        #[cfg(feature = "gpu")]
        Backend::Gpu => Ok(uifx::BackendKind::Gpu),
        #[cfg(not(feature = "gpu"))]
        Backend::Gpu => anyhow::bail!("this build has no gpu backend (enable the `gpu` feature)"),
    }
}

fn cmd_dump(args: DumpArgs) -> anyhow::Result<()> {
    let scenario = uifx::Scenario::from_path(&args.scenario)
        .with_context(|| format!("load scenario '{}'", args.scenario.display()))?;
    let mut backend = uifx::create_backend(backend_kind(args.backend)?)?;
    let run = uifx::run_scenario(&scenario, backend.as_mut())?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &run.pixels.data,
        run.pixels.width,
        run.pixels.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    let stats = backend.stats();
    eprintln!(
        "wrote {} ({}x{}, {} frames, {} draws, {} cells)",
        args.out.display(),
        run.pixels.width,
        run.pixels.height,
        run.frames.len(),
        stats.draws,
        run.stats.cells_written,
    );
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => uifx::UifxConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => uifx::UifxConfig::default(),
    };
    for kind in uifx::EffectKind::ALL {
        let c = config.get(kind);
        let layout = uifx::PtexLayout::from_config(c)?;
        println!(
            "{:<20} channels={:<3} capacity={:<5} texture={}x{} property={}",
            kind.material_name(),
            layout.channel_count(),
            layout.instance_capacity(),
            layout.width(),
            layout.height(),
            c.property_name,
        );
    }
    Ok(())
}
