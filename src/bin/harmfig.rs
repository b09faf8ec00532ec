use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use harm_figures::figure::{Figure, FigureRegistry, RecipeParams, View};
use harm_figures::{DisplayOptions, FlagSet, Override, flags, stats, storage, viz};
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "harmfig",
    version,
    about = "Render named multi-panel figures from GRMHD snapshots"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available figures.
    List,
    /// Show the panel layout of a figure.
    Describe(DescribeArgs),
    /// Render one frame per snapshot.
    Render(RenderArgs),
    /// Print per-field statistics and flag hit counts of a snapshot.
    Inspect(InspectArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutFormat {
    Svg,
    Png,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FloorTable {
    Kharma,
    Iharm3d,
}

impl FloorTable {
    fn flags(self) -> FlagSet {
        match self {
            FloorTable::Kharma => flags::floor_flags_kharma(),
            FloorTable::Iharm3d => flags::floor_flags_iharm3d(),
        }
    }
}

#[derive(Args, Debug)]
struct RecipeArgs {
    /// Figure name (see `harmfig list`).
    recipe: String,
    /// Slices to show: poloidal, toroidal or both.
    #[arg(long)]
    view: Option<View>,
    /// Variable for `simplest`, e.g. log_rho.
    #[arg(long)]
    var: Option<String>,
    /// Plot `prims` on a linear scale.
    #[arg(long, default_value_t = false)]
    linear: bool,
    /// Keep labels and colorbars on `prims`.
    #[arg(long, default_value_t = false)]
    decorated: bool,
    /// Floor flag table for `floors` and `old_floors`.
    #[arg(long, value_enum)]
    floors: Option<FloorTable>,
}

impl RecipeArgs {
    fn params(&self) -> RecipeParams {
        RecipeParams {
            view: self.view,
            var: self.var.clone(),
            log: self.linear.then_some(false),
            simple: self.decorated.then_some(false),
            floor_flags: self.floors.map(FloorTable::flags),
            fail_codes: None,
        }
    }
}

#[derive(Args, Debug)]
struct DescribeArgs {
    #[command(flatten)]
    recipe: RecipeArgs,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    recipe: RecipeArgs,
    /// Snapshot JSON files; one frame each.
    #[arg(long, required = true, num_args = 1..)]
    snapshot: Vec<PathBuf>,
    /// History CSV for figures with time series.
    #[arg(long)]
    history: Option<PathBuf>,
    /// Display options JSON; command-line flags win over it.
    #[arg(long)]
    options: Option<PathBuf>,
    /// Output file (single snapshot only).
    #[arg(long, conflicts_with = "out_dir")]
    out: Option<PathBuf>,
    /// Output directory; frames are named `<snapshot>_<figure>.<ext>`.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Image format when writing into a directory.
    #[arg(long, value_enum, default_value = "png")]
    format: OutFormat,
    /// Radius for theta-phi shells.
    #[arg(long)]
    radius: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    vmin: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    vmax: Option<f64>,
    #[arg(long)]
    cmap: Option<String>,
    /// Width of the image (default 1600).
    #[arg(long, default_value_t = 1600)]
    width: u32,
    /// Height of the image (default 1200).
    #[arg(long, default_value_t = 1200)]
    height: u32,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[arg(long)]
    snapshot: PathBuf,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::List => cmd_list(),
        Command::Describe(args) => cmd_describe(args),
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn cmd_list() -> Result<()> {
    let registry = FigureRegistry::standard();
    for name in registry.names() {
        println!("{:<16} {}", name, registry.describe(name)?);
    }
    Ok(())
}

fn cmd_describe(args: DescribeArgs) -> Result<()> {
    let registry = FigureRegistry::standard();
    let recipe = registry.build(&args.recipe.recipe, &args.recipe.params())?;
    println!("{}: {}", recipe.name, recipe.about);
    println!(
        "{} panels on {} axes{}",
        recipe.panel_count(),
        recipe.axes_count(),
        if recipe.uses_history() { ", needs --history" } else { "" }
    );
    for (i, panel) in recipe.panels.iter().enumerate() {
        println!("{:>3}  {}", i + 1, panel.describe());
    }
    Ok(())
}

/// Options file (or defaults) with the command-line flags applied on top.
fn load_options(args: &RenderArgs) -> Result<DisplayOptions> {
    let base = match &args.options {
        Some(p) => storage::load_options_json(p)
            .with_context(|| format!("reading options {}", p.display()))?,
        None => DisplayOptions::default(),
    };
    let mut overrides = Vec::new();
    if let Some(v) = args.vmin {
        overrides.push(Override::Vmin(v));
    }
    if let Some(v) = args.vmax {
        overrides.push(Override::Vmax(v));
    }
    if let Some(c) = &args.cmap {
        overrides.push(Override::Cmap(c.clone()));
    }
    let mut opts = base.with(&overrides);
    if args.radius.is_some() {
        opts.radius = args.radius;
    }
    Ok(opts)
}

fn frame_path(args: &RenderArgs, snapshot: &Path, recipe: &str) -> Result<PathBuf> {
    if let Some(out) = &args.out {
        return Ok(out.clone());
    }
    let stem = snapshot
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("snapshot path {} has no file name", snapshot.display()))?;
    let ext = match args.format {
        OutFormat::Svg => "svg",
        OutFormat::Png => "png",
    };
    let dir = args.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    Ok(dir.join(format!("{stem}_{recipe}.{ext}")))
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    if args.out.is_some() && args.snapshot.len() > 1 {
        bail!("--out takes a single snapshot; use --out-dir for several");
    }
    let registry = FigureRegistry::standard();
    let recipe = registry.build(&args.recipe.recipe, &args.recipe.params())?;
    let history = match &args.history {
        Some(p) => Some(
            storage::load_history_csv(p)
                .with_context(|| format!("reading history {}", p.display()))?,
        ),
        None => None,
    };
    if recipe.uses_history() && history.is_none() {
        bail!("figure '{}' plots history series; pass --history", recipe.name);
    }
    let options = load_options(&args)?;
    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }

    let mut written = 0usize;
    for path in &args.snapshot {
        let frame = || -> Result<PathBuf> {
            let snap = storage::load_snapshot_json(path)
                .with_context(|| format!("reading snapshot {}", path.display()))?;
            let mut fig = Figure::new();
            recipe.produce(&mut fig, &snap, history.as_ref(), &options)?;
            let out = frame_path(&args, path, &recipe.name)?;
            viz::save_figure(&fig, &out, args.width, args.height)?;
            Ok(out)
        };
        match frame() {
            Ok(out) => {
                info!("{} -> {}", path.display(), out.display());
                eprintln!("Wrote {}", out.display());
                written += 1;
            }
            Err(e) => warn!("skipping {}: {:#}", path.display(), e),
        }
    }
    if written == 0 {
        bail!("no frames were rendered");
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> Result<()> {
    let snap = storage::load_snapshot_json(&args.snapshot)
        .with_context(|| format!("reading snapshot {}", args.snapshot.display()))?;
    let [n1, n2, n3] = snap.shape();
    println!("t = {}  grid {}x{}x{}", snap.t, n1, n2, n3);
    for s in stats::field_summary(&snap) {
        println!(
            "{:<10} count={} nonfinite={}  min={} max={} mean={} median={}",
            s.name,
            s.count,
            s.nonfinite,
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.mean),
            fmt_opt(s.median)
        );
    }
    for (field, table) in [
        ("fflag", flags::floor_flags_kharma()),
        ("pflag", flags::inversion_failures()),
    ] {
        if let Ok(f) = snap.field(field) {
            println!("{field}: {} cells flagged", stats::count_positive(f));
            for hit in stats::flag_hits(f, &table) {
                println!("  {:<16} {:>5}  {}", hit.name, hit.value, hit.cells);
            }
        }
    }
    Ok(())
}
