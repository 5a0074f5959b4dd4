use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "lapse",
    version,
    about = "Timelapse helpers: raster normalization and clock overlays"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the frame count and first/last timestamps of a set of photos.
    Probe(ProbeArgs),
    /// Map photos onto a fixed-interval series of numbered files.
    Normalize(NormalizeArgs),
    /// Sort photos by timestamp and rename them to consecutive numbers.
    Number(NumberArgs),
    /// Render a single clock image.
    Clock(ClockArgs),
    /// Render a clock for every photo, named like the photo with `.png`.
    ClocksFromPhotos(ClocksFromPhotosArgs),
    /// Render a clock for every slot of a time raster.
    ClocksSeries(ClocksSeriesArgs),
}

#[derive(clap::Args, Debug)]
struct IndexArgs {
    /// Timestamp field: datetime_original, datetime, datetime_digitized or file_modified.
    #[arg(long, default_value_t = lapse::TimestampField::DatetimeOriginal)]
    field: lapse::TimestampField,

    /// Seconds added to every photo timestamp (compensates a skewed camera clock).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    offset: i64,
}

impl IndexArgs {
    fn indexer(&self) -> lapse::FrameIndexer<lapse::MetadataExtractor> {
        lapse::FrameIndexer::new(
            lapse::MetadataExtractor,
            lapse::IndexOptions {
                field: self.field,
                offset_secs: self.offset,
                ..lapse::IndexOptions::default()
            },
        )
    }
}

#[derive(clap::Args, Debug)]
struct RasterArgs {
    /// First slot time, seconds since epoch.
    #[arg(long, allow_negative_numbers = true)]
    start: i64,

    /// Last covered time, seconds since epoch (inclusive).
    #[arg(long, allow_negative_numbers = true)]
    end: i64,

    /// Slot length in seconds.
    #[arg(long)]
    interval: i64,
}

impl RasterArgs {
    fn spec(&self) -> anyhow::Result<lapse::RasterSpec> {
        Ok(lapse::RasterSpec::new(self.start, self.end, self.interval)?)
    }
}

#[derive(clap::Args, Debug)]
struct ThreadingArgs {
    /// Render images in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

impl ThreadingArgs {
    fn threading(&self) -> lapse::RenderThreading {
        lapse::RenderThreading {
            parallel: self.parallel,
            threads: self.threads,
        }
    }
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Photo directories or files, visited in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    #[command(flatten)]
    index: IndexArgs,
}

#[derive(Parser, Debug)]
struct NormalizeArgs {
    /// Photo directories or files, visited in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory for the numbered series.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    raster: RasterArgs,

    /// Placeholder image for slots with no usable photo.
    #[arg(long)]
    filler: PathBuf,

    /// Gaps shorter than this many slots repeat the previous photo.
    #[arg(long, default_value_t = lapse::NormalizeOptions::DEFAULT_GAP_THRESHOLD)]
    gap_threshold: u64,

    /// How slots land on disk: symlink, copy or manifest.
    #[arg(long, default_value_t = lapse::MaterializeMode::default())]
    mode: lapse::MaterializeMode,

    /// Width of the zero-padded output index.
    #[arg(long, default_value_t = lapse::NormalizeOptions::DEFAULT_DIGITS)]
    digits: usize,

    #[command(flatten)]
    index: IndexArgs,
}

#[derive(Parser, Debug)]
struct NumberArgs {
    /// Directory containing the photos.
    dir: PathBuf,

    /// Width of the zero-padded number.
    #[arg(long, default_value_t = 4)]
    digits: usize,

    /// First number to assign.
    #[arg(long, default_value_t = 0)]
    start_index: u64,

    /// Print the plan without renaming anything.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    #[command(flatten)]
    index: IndexArgs,
}

#[derive(Parser, Debug)]
struct ClockArgs {
    /// Time of day, HH:MM or HH:MM:SS.
    #[arg(long)]
    time: String,

    /// Output path (PNG, or SVG with --svg).
    #[arg(long)]
    out: PathBuf,

    /// Side of the square image in pixels.
    #[arg(long, default_value_t = 500)]
    size: u32,

    /// Write the vector scene as SVG instead of rasterizing it.
    #[arg(long, default_value_t = false)]
    svg: bool,
}

#[derive(Parser, Debug)]
struct ClocksFromPhotosArgs {
    /// Directory containing the photos.
    input: PathBuf,

    /// Output directory; defaults to `<input>/clocks`.
    #[arg(short, long)]
    outdir: Option<PathBuf>,

    /// Side of the square images in pixels.
    #[arg(long, default_value_t = 500)]
    size: u32,

    #[command(flatten)]
    index: IndexArgs,

    #[command(flatten)]
    threading: ThreadingArgs,
}

#[derive(Parser, Debug)]
struct ClocksSeriesArgs {
    /// Output directory; created if missing.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    raster: RasterArgs,

    /// Side of the square images in pixels.
    #[arg(long, default_value_t = 1000)]
    size: u32,

    /// Seconds east of UTC used to read the wall clock from epoch times.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    utc_offset: i64,

    #[command(flatten)]
    threading: ThreadingArgs,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Probe(args) => cmd_probe(args),
        Command::Normalize(args) => cmd_normalize(args),
        Command::Number(args) => cmd_number(args),
        Command::Clock(args) => cmd_clock(args),
        Command::ClocksFromPhotos(args) => cmd_clocks_from_photos(args),
        Command::ClocksSeries(args) => cmd_clocks_series(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let span = args.index.indexer().probe(args.inputs.as_slice())?;
    println!("frames: {}", span.frames);
    println!("first timestamp: {}", span.first);
    println!("last timestamp: {}", span.last);
    Ok(())
}

fn cmd_normalize(args: NormalizeArgs) -> anyhow::Result<()> {
    let options = lapse::NormalizeOptions {
        raster: args.raster.spec()?,
        gap_threshold: args.gap_threshold,
        filler: args.filler,
        mode: args.mode,
        digits: args.digits,
    };
    eprintln!(
        "going from {} to {} -> {} images",
        options.raster.start,
        options.raster.end,
        options.raster.slot_count()
    );

    let report = lapse::normalize(
        &args.index.indexer(),
        args.inputs.as_slice(),
        &options,
        &args.out,
    )?;
    let s = report.stats;
    eprintln!(
        "{} slots: {} original, {} repeated, {} filler; {} frames dropped",
        s.slots, s.original, s.repeated, s.filler, s.dropped
    );
    match report.manifest {
        Some(path) => eprintln!("wrote {}", path.display()),
        None => eprintln!("wrote {} files to {}", report.files_written, args.out.display()),
    }
    Ok(())
}

fn cmd_number(args: NumberArgs) -> anyhow::Result<()> {
    let frames = args.index.indexer().index(&[&args.dir])?;
    let plan = lapse::plan_numbering(&frames, args.start_index, args.digits)?;
    for r in &plan {
        eprintln!("{} -> {}", r.from.display(), r.to.display());
    }
    if !args.dry_run {
        lapse::apply_numbering(&plan)?;
        eprintln!("renamed {} photos", plan.len());
    }
    Ok(())
}

fn cmd_clock(args: ClockArgs) -> anyhow::Result<()> {
    let time = lapse::ClockTime::parse(&args.time)?;
    let scene = lapse::render_clock(time, args.size)?;

    if args.svg {
        let svg = lapse::SceneEmitter::emit(&lapse::SvgEmitter, &scene)?;
        ensure_parent_dir(&args.out)?;
        std::fs::write(&args.out, svg)
            .with_context(|| format!("write svg '{}'", args.out.display()))?;
    } else {
        lapse::SceneEmitter::emit(&lapse::PngEmitter, &scene)?.save_png(&args.out)?;
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_clocks_from_photos(args: ClocksFromPhotosArgs) -> anyhow::Result<()> {
    let outdir = args
        .outdir
        .clone()
        .unwrap_or_else(|| args.input.join("clocks"));
    let written = lapse::clocks_from_photos(
        &args.index.indexer(),
        &[&args.input],
        &outdir,
        args.size,
        &args.threading.threading(),
    )?;
    eprintln!("wrote {written} clocks to {}", outdir.display());
    Ok(())
}

fn cmd_clocks_series(args: ClocksSeriesArgs) -> anyhow::Result<()> {
    let written = lapse::clocks_series(
        &args.raster.spec()?,
        args.utc_offset,
        &args.out,
        args.size,
        &args.threading.threading(),
    )?;
    eprintln!("wrote {written} clocks to {}", args.out.display());
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
