use byline::directory::{Authors, Contributors, Kind};
use byline::helpers::Helpers;
use byline::scan::Manifest;
use byline::{config, generate, output, scan};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("BYLINE_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("BYLINE_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "byline")]
#[command(about = "Author and contributor directories for a markdown blog")]
#[command(long_about = "\
Author and contributor directories for a markdown blog

The site config holds the registries; posts name their author and contributor
by display name. Each registered person gets a page with their posts, level,
and academy badges, and each kind gets an index page.

Source structure:

  site/
  ├── config.toml                  # Site settings + [authors.\"Name\"] / [contributors.\"Name\"]
  └── posts/
      ├── xss-basics.md            # +++ TOML front matter +++, then markdown
      └── 2024/
          └── csrf.md              # Subdirectories are walked too

Front matter keys: title, date, author, contributor, categories, slug, draft.

Levels (posts attributed to the person):
  beginner   0 ..= levels.beginner_max
  advanced   .. ..= levels.advanced_max
  expert     above

Run 'byline gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site source directory
    #[arg(long, default_value = "site", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".byline-temp", global = true)]
    temp_dir: PathBuf,

    /// Log filter when RUST_LOG is unset (e.g. "debug", "byline=trace")
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Authors,
    Contributors,
}

#[derive(Subcommand)]
enum Command {
    /// Scan config and posts into a manifest
    Scan,
    /// Produce the HTML site from the manifest
    Generate,
    /// Run the full pipeline: scan → generate
    Build,
    /// Validate config and posts, report registry problems
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Resolve one person the way page templates do
    Lookup {
        /// Which registry to search
        #[arg(long, value_enum, default_value = "contributors")]
        kind: KindArg,
        /// Display name, exactly as in the registry
        name: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);
        }
        Command::Generate => {
            let manifest_path = cli.temp_dir.join("manifest.json");
            let manifest_content = std::fs::read_to_string(&manifest_path)?;
            let manifest: Manifest = serde_json::from_str(&manifest_content)?;
            init_thread_pool(&manifest.config.processing);
            let report = generate::generate_site(&manifest, &cli.output)?;
            output::print_generate_output(&report);
            fail_on_write_errors(&report)?;
        }
        Command::Build => {
            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            init_thread_pool(&manifest.config.processing);
            let report = generate::generate_site(&manifest, &cli.output)?;
            output::print_generate_output(&report);
            fail_on_write_errors(&report)?;

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            output::print_check_output(&manifest);
            let duplicates = manifest.config.authors.duplicate_slugs().len()
                + manifest.config.contributors.duplicate_slugs().len();
            if duplicates > 0 {
                return Err(format!("{duplicates} duplicate slug(s) in the registries").into());
            }
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Lookup { kind, name } => {
            let manifest = scan::scan(&cli.source)?;
            match kind {
                KindArg::Authors => lookup::<Authors>(&manifest, &name)?,
                KindArg::Contributors => lookup::<Contributors>(&manifest, &name)?,
            }
        }
    }

    Ok(())
}

fn lookup<K: Kind>(manifest: &Manifest, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let helpers = Helpers::<K>::from_config(&manifest.config, &manifest.posts);
    output::print_lookup_output(&helpers, name)?;
    Ok(())
}

fn write_manifest(manifest: &Manifest, temp_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(temp_dir)?;
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(temp_dir.join("manifest.json"), json)?;
    Ok(())
}

fn fail_on_write_errors(report: &generate::GenerateReport) -> Result<(), Box<dyn std::error::Error>> {
    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(format!("{} page(s) could not be written", report.failed.len()).into())
    }
}

/// Log to stderr; stdout is reserved for the progress output.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
