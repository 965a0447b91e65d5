use casepics::config::{self, BatchConfig};
use casepics::output;
use casepics::process::{self, Job, JobKind};
use casepics::scan::{self, ScanOptions};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Flags shared by every batch command.
#[derive(clap::Args, Clone)]
struct BatchArgs {
    /// Directory to process (defaults to the one configured under [paths])
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Write a JSON report of the run to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Called once per process
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "casepics")]
#[command(about = "In-place batch cropping, color correction and recompression for site images")]
#[command(long_about = "\
In-place batch cropping, color correction and recompression for site images

Every job rewrites files in place. Run it on a clean working tree so the
changes can be reviewed and reverted.

Directory layout (defaults, configurable in casepics.toml):

  public/pics/                 # compress: every image in this tree
  └── casesPics/               # crop, brighten, fix-colors: this folder only
      ├── acme-redesign.png
      └── northwind-app.jpg

Jobs:
  crop        Center-crop to 14:9 and resize to exactly 2800x1800 (PNG)
  brighten    Brightness x1.2 (PNG and JPEG)
  fix-colors  Brightness x0.75, saturation x1.2 (PNG)
  compress    Re-encode PNG at level 9 and JPEG at quality 85, report savings

A file that fails is logged and skipped; the rest of the batch still runs.

Run 'casepics gen-config' to generate a documented casepics.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: casepics.toml in the working directory, if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum parallel workers (capped at the number of CPU cores)
    #[arg(long, short = 'j', global = true, value_name = "N")]
    jobs: Option<usize>,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Center-crop case images to the target aspect ratio and resize them
    Crop {
        #[command(flatten)]
        batch: BatchArgs,

        /// Print the planned crops without writing any file
        #[arg(long)]
        dry_run: bool,
    },
    /// Brighten case images
    Brighten(BatchArgs),
    /// Darken and saturate case images
    FixColors(BatchArgs),
    /// Recompress every image under the pics directory
    Compress(BatchArgs),
    /// Print a stock casepics.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (kind, batch, dry_run) = match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
        Command::Crop { batch, dry_run } => (JobKind::Crop, batch, dry_run),
        Command::Brighten(batch) => (JobKind::Brighten, batch, false),
        Command::FixColors(batch) => (JobKind::FixColors, batch, false),
        Command::Compress(batch) => (JobKind::Compress, batch, false),
    };

    let mut config = config::load_config(cli.config.as_deref(), Path::new("."))?;
    if let Some(jobs) = cli.jobs {
        config.processing.max_processes = Some(jobs);
    }
    init_thread_pool(&config.processing);

    let (job, options) = job_for(kind, &config, dry_run);
    let dir = batch.dir.unwrap_or_else(|| default_dir(&config, kind));
    run_job(&dir, &options, &job, batch.report.as_deref())
}

/// Build the job and its file selection from the resolved config.
fn job_for(kind: JobKind, config: &BatchConfig, dry_run: bool) -> (Job, ScanOptions) {
    match kind {
        JobKind::Crop => (
            Job::Crop {
                config: config.crop.to_crop_config(),
                dry_run,
            },
            ScanOptions::flat(&config.crop.extensions),
        ),
        JobKind::Brighten => (
            Job::Adjust {
                kind,
                config: config.brighten.to_adjust_config(),
            },
            ScanOptions::flat(&config.brighten.extensions).skipping(&config.brighten.skip_files),
        ),
        JobKind::FixColors => (
            Job::Adjust {
                kind,
                config: config.fix_colors.to_adjust_config(),
            },
            ScanOptions::flat(&config.fix_colors.extensions)
                .skipping(&config.fix_colors.skip_files),
        ),
        JobKind::Compress => (
            Job::Compress {
                encode: config.compress.encode_settings(),
            },
            ScanOptions::recursive(&config.compress.extensions),
        ),
    }
}

/// Scan `dir`, run the job with a printer thread draining progress events,
/// then print the summary and write the optional JSON report.
fn run_job(
    dir: &Path,
    options: &ScanOptions,
    job: &Job,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let files = scan::find_images(dir, options)?;
    if files.is_empty() {
        tracing::warn!(dir = %dir.display(), "no matching images");
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let report = process::run(&files, job, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;

    output::print_summary(&report);

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), "report written");
    }

    Ok(())
}

fn default_dir(config: &BatchConfig, kind: JobKind) -> PathBuf {
    match kind {
        JobKind::Compress => config.paths.pics_dir.clone(),
        _ => config.paths.cases_dir.clone(),
    }
}

/// Log to stderr so progress lines on stdout stay clean.
///
/// `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("casepics={level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
