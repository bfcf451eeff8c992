use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "formatizer", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the content level of every target and print the plan as JSON.
    Plan(PlanArgs),
    /// Render every target of a job and write one image per target.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input export job JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory of .ttf/.otf/.ttc files used for measurement.
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Measure with a fixed advance of this many em per character instead of real fonts.
    #[arg(long)]
    fixed_advance: Option<f32>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input export job JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory; files are named after each target's ratio id.
    #[arg(long)]
    out_dir: PathBuf,

    /// Directory of .ttf/.otf/.ttc files.
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Root for relative image urls (defaults to the job file's directory).
    #[arg(long)]
    assets: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// JPEG quality (1-100).
    #[arg(long)]
    quality: Option<u8>,

    #[arg(long)]
    pixel_ratio: Option<f64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpeg,
}

#[derive(Serialize)]
struct PlanEntry<'a> {
    ratio_id: &'a str,
    label: &'a str,
    width: u32,
    height: u32,
    content_level: Option<formatizer::ContentLevel>,
    warnings: &'a [String],
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
        Command::Plan(args) => cmd_plan(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_job(path: &Path) -> anyhow::Result<formatizer::ExportJob> {
    let job = formatizer::ExportJob::from_path(path)
        .with_context(|| format!("load export job '{}'", path.display()))?;
    job.validate()?;
    Ok(job)
}

fn load_fonts(dir: Option<&Path>) -> anyhow::Result<formatizer::FontLibrary> {
    let lib = match dir {
        Some(dir) => {
            let mut lib = formatizer::FontLibrary::new();
            let faces = lib.load_dir(dir)?;
            tracing::info!(faces, dir = %dir.display(), "loaded fonts");
            lib
        }
        None => formatizer::FontLibrary::from_env()?,
    };
    Ok(lib)
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let mut job = read_job(&args.in_path)?;

    let warnings = match args.fixed_advance {
        Some(em) => {
            let mut m = formatizer::FixedAdvanceMeasurer::new(em);
            formatizer::reduce_all_targets(&mut job.targets, &job.snapshot, &mut m)
        }
        None => {
            let mut fonts = load_fonts(args.fonts.as_deref())?;
            if fonts.face_count() == 0 {
                tracing::warn!("no fonts loaded; measuring with a fixed advance");
                let mut m = formatizer::FixedAdvanceMeasurer::default();
                formatizer::reduce_all_targets(&mut job.targets, &job.snapshot, &mut m)
            } else {
                formatizer::reduce_all_targets(&mut job.targets, &job.snapshot, &mut fonts)
            }
        }
    };

    let entries = job
        .targets
        .iter()
        .map(|t| PlanEntry {
            ratio_id: &t.ratio_id,
            label: &t.label,
            width: t.width,
            height: t.height,
            content_level: t.content_level,
            warnings: warnings.get(&t.ratio_id).map(Vec::as_slice).unwrap_or_default(),
        })
        .collect::<Vec<_>>();

    let stdout = std::io::stdout();
    serde_json::to_writer_pretty(stdout.lock(), &entries).context("write plan JSON")?;
    println!();
    Ok(())
}

/// File stem for a ratio id: `1.91:1` becomes `1_91_1`.
fn file_stem(ratio_id: &str) -> String {
    ratio_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut job = read_job(&args.in_path)?;
    if let Some(f) = args.format {
        job.export.format = match f {
            FormatChoice::Png => formatizer::ExportFormat::Png,
            FormatChoice::Jpeg => formatizer::ExportFormat::Jpeg,
        };
    }
    if let Some(q) = args.quality {
        job.export.quality = q;
    }
    if let Some(r) = args.pixel_ratio {
        job.export.pixel_ratio = r;
    }
    job.export.validate()?;

    let assets_root = match args.assets {
        Some(p) => p,
        None => args
            .in_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };
    let mut resolver = formatizer::FsImageResolver::new(assets_root);
    let mut host = formatizer::CpuHost::new(load_fonts(args.fonts.as_deref())?);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let results = formatizer::BatchOrchestrator::new(&mut host, &mut resolver)
        .with_settings(job.export)
        .render_all_formats(&mut job.targets, &job.snapshot, &mut |i, r| {
            tracing::debug!(index = i, ratio = %r.ratio_id, status = ?r.status, "progress");
        });

    for r in &results {
        for w in &r.warnings {
            eprintln!("[{}] {w}", r.ratio_id);
        }
        let Some(bitmap) = &r.bitmap else {
            eprintln!("[{}] {:?}", r.ratio_id, r.status);
            continue;
        };
        let path = args
            .out_dir
            .join(format!("{}.{}", file_stem(&r.ratio_id), bitmap.format.extension()));
        std::fs::write(&path, &bitmap.bytes)
            .with_context(|| format!("write '{}'", path.display()))?;
        eprintln!("wrote {} ({}x{})", path.display(), bitmap.width, bitmap.height);
    }

    let summary = formatizer::BatchSummary::from_results(&results);
    let stats = host.stats();
    tracing::info!(created = stats.created, released = stats.released, "surfaces");
    if summary.errors > 0 {
        anyhow::bail!("{} of {} formats failed", summary.errors, summary.total);
    }
    Ok(())
}
