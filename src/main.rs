use archfolio::{config, content, generate, output};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "archfolio")]
#[command(about = "Single-page portfolio generator with scroll-driven reveals")]
#[command(long_about = "\
Single-page portfolio generator with scroll-driven reveals

Your portfolio is a handful of data files. Sections reveal as they scroll
into view and gallery images load only when they approach the viewport.

Content structure:

  content/
  ├── config.toml        # Site config (optional; see gen-config)
  ├── site.toml          # [person], [contact], [[skills]], [[stats]]
  ├── projects.toml      # [[projects]] gallery entries
  ├── experience.toml    # [[experience]] timeline entries
  ├── about.md           # Bio as markdown (overrides person.bio)
  └── assets/            # Local images and files, copied fingerprinted
      └── projects/
          └── timber-house.jpg

Logging is controlled with RUST_LOG (default: info).

Run 'archfolio gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load content and produce the site
    Build,
    /// Validate content directory without building
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Build => {
            println!("==> Loading {}", cli.source.display());
            let site = content::load(&cli.source)?;
            output::print_content_output(&site);

            init_thread_pool(&site.config.processing);
            println!("==> Generating HTML \u{2192} {}", cli.output.display());
            let summary = generate::generate(&site, &cli.source, &cli.output)?;
            output::print_generate_output(&summary);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site = content::load(&cli.source)?;
            output::print_content_output(&site);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays the command's output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
