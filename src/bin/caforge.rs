use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use caforge::document::bundle::{Bundle, ImportOpts, import_bundle};
use caforge::layers::tree;
use caforge::{
    CellAssetMap, EmitterSim, IdGen, Layer, LayerDoc, ProjectDocument, RealizeOpts,
    ShapePolicy,
};

#[derive(Parser, Debug)]
#[command(name = "caforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the project header, layer outline, and states.
    Inspect(DocArgs),
    /// Check a project document for invalid data and duplicate ids.
    Validate(DocArgs),
    /// Print the layer tree as displayed in one state.
    Resolve(ResolveArgs),
    /// Step one emitter layer and report particle counts.
    Simulate(SimulateArgs),
    /// Convert a single-root bundle into a project document.
    Import(ImportArgs),
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum RootArg {
    #[default]
    Floating,
    Background,
}

#[derive(Parser, Debug)]
struct DocArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// State to display.
    #[arg(long, default_value = caforge::BASE_STATE)]
    state: String,

    /// Which tree to resolve.
    #[arg(long, value_enum, default_value_t = RootArg::Floating)]
    root: RootArg,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Emitter layer id.
    #[arg(long)]
    layer: String,

    /// State the emitter is taken from.
    #[arg(long, default_value = caforge::BASE_STATE)]
    state: String,

    /// Number of steps.
    #[arg(long, default_value_t = 60)]
    steps: u32,

    /// Step length in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,

    /// RNG seed.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Live particle cap.
    #[arg(long, default_value_t = caforge::emitter::sim::DEFAULT_CAPACITY)]
    capacity: usize,

    /// Emit unsampled shapes from the anchor point instead of failing.
    #[arg(long, default_value_t = false)]
    fallback_shapes: bool,
}

#[derive(Parser, Debug)]
struct ImportArgs {
    /// Input bundle JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output project JSON; stdout when absent.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Seed the app's default states when the bundle has none.
    #[arg(long, default_value_t = false)]
    default_states: bool,
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
        Command::Inspect(args) => cmd_inspect(args),
        Command::Validate(args) => cmd_validate(args),
        Command::Resolve(args) => cmd_resolve(args),
        Command::Simulate(args) => cmd_simulate(args),
        Command::Import(args) => cmd_import(args),
    }
}

fn load(path: &Path) -> anyhow::Result<ProjectDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read project JSON '{}'", path.display()))?;
    ProjectDocument::from_json_str(&text).with_context(|| format!("load '{}'", path.display()))
}

fn pick(doc: &ProjectDocument, root: RootArg) -> anyhow::Result<&LayerDoc> {
    match root {
        RootArg::Floating => Ok(&doc.floating),
        RootArg::Background => doc
            .background_layers
            .as_ref()
            .context("project has no background tree"),
    }
}

fn outline(layers: &[Arc<Layer>], depth: usize, out: &mut String) -> std::fmt::Result {
    for layer in layers {
        writeln!(
            out,
            "{:indent$}- {} \"{}\" ({})",
            "",
            layer.kind.type_name(),
            layer.name,
            layer.id(),
            indent = depth * 2
        )?;
        outline(&layer.children, depth + 1, out)?;
    }
    Ok(())
}

fn cmd_inspect(args: DocArgs) -> anyhow::Result<()> {
    let doc = load(&args.in_path)?;
    let meta = &doc.meta;
    let mut out = String::new();
    writeln!(out, "{} ({}x{})", meta.name, meta.width, meta.height)?;
    writeln!(out, "background: {}", meta.background_or_default())?;

    let roots = [("floating", Some(&doc.floating)), ("background", doc.background_layers.as_ref())];
    for (label, root) in roots {
        let Some(root) = root else { continue };
        writeln!(out, "{label}: {} layers", root.layer_count())?;
        outline(&root.layers, 1, &mut out)?;
        if !root.states.states.is_empty() {
            writeln!(out, "  states: {}", root.states.states.join(", "))?;
        }
        let dangling = root.states.dangling_targets(&root.layers);
        if !dangling.is_empty() {
            let ids: Vec<&str> = dangling.iter().map(String::as_str).collect();
            writeln!(out, "  dangling targets: {}", ids.join(", "))?;
        }
    }
    for g in &doc.wallpaper_parallax_groups {
        writeln!(
            out,
            "parallax: {} -> {} {} [{}, {}]",
            g.title,
            g.layer_name,
            g.key_path.as_str(),
            g.map_min_to,
            g.map_max_to
        )?;
    }
    print!("{out}");
    Ok(())
}

fn cmd_validate(args: DocArgs) -> anyhow::Result<()> {
    let doc = load(&args.in_path)?;
    doc.validate()
        .with_context(|| format!("validate '{}'", args.in_path.display()))?;
    println!("ok");
    Ok(())
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let doc = load(&args.in_path)?;
    let root = pick(&doc, args.root)?;
    if !root.states.has_state(&args.state) {
        anyhow::bail!("unknown state '{}'", args.state);
    }
    let resolved = root.states.resolve(&root.layers, &args.state);
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    if !(args.dt.is_finite() && args.dt > 0.0) {
        anyhow::bail!("--dt must be a positive number of seconds");
    }
    let doc = load(&args.in_path)?;
    let resolved = doc.floating.states.resolve(&doc.floating.layers, &args.state);
    let layer = tree::find_by_id(&resolved, &args.layer)
        .with_context(|| format!("no layer '{}'", args.layer))?;

    let opts = RealizeOpts {
        capacity: args.capacity,
        seed: Some(args.seed),
        shape_policy: if args.fallback_shapes {
            ShapePolicy::FallbackToPoint
        } else {
            ShapePolicy::Reject
        },
        ..RealizeOpts::default()
    };
    let mut sim = EmitterSim::realize(layer, &CellAssetMap::new(), &opts)
        .with_context(|| format!("realize emitter '{}'", args.layer))?;

    let mut peak = 0usize;
    for _ in 0..args.steps {
        sim.step(args.dt);
        peak = peak.max(sim.live_count());
    }
    let stats = sim.stats();
    println!(
        "{}",
        serde_json::json!({
            "steps": args.steps,
            "seconds": f64::from(args.steps) * args.dt,
            "live": sim.live_count(),
            "peak": peak,
            "pooled": sim.pooled(),
            "spawned": stats.spawned,
            "recycled": stats.recycled,
            "evicted": stats.evicted,
        })
    );
    Ok(())
}

fn cmd_import(args: ImportArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read bundle JSON '{}'", args.in_path.display()))?;
    let bundle = Bundle::from_json_str(&text)
        .with_context(|| format!("parse bundle '{}'", args.in_path.display()))?;
    let opts = if args.default_states {
        ImportOpts::with_app_defaults()
    } else {
        ImportOpts::default()
    };
    let doc = import_bundle(bundle, &opts, &mut IdGen::from_entropy())?;
    let json = doc.to_json_pretty()?;
    match args.out {
        Some(out) => {
            if let Some(parent) = out.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(&out, json).with_context(|| format!("write '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
