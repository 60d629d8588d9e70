use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use schemagen_catalog::SnapshotConnection;
use schemagen_codegen::{generate, GenerateOptions, GenerateSummary, TargetProfile};
use schemagen_core::{Config, Target};

const DEFAULT_CONFIG_FILE: &str = "schemagen.toml";
const SNAPSHOT_ENV: &str = "SCHEMAGEN_SNAPSHOT";

/// schemagen - Query builder generator
#[derive(Parser)]
#[command(name = "schemagen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemagen.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Introspect a schema and generate the query builder
    Generate {
        /// Directory to generate into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output dialect (ts, mts, esm, cjs, deno)
        #[arg(short, long)]
        target: Option<Target>,

        /// JSON schema snapshot to introspect
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Directory holding static support files
        #[arg(long)]
        support_dir: Option<PathBuf>,
    },

    /// List the supported output targets
    Targets,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Generate {
            output_dir,
            target,
            snapshot,
            support_dir,
        } => {
            let mut config = load_config(cli.config.as_deref(), cli.verbose)?;

            if let Some(dir) = output_dir {
                config.output_dir = absolute(dir)?;
            }
            if let Some(target) = target {
                config.target = target;
            }
            if let Some(dir) = support_dir {
                config.support_dir = Some(absolute(dir)?);
            }
            if let Some(path) = snapshot {
                config.connection.snapshot = Some(absolute(path)?);
            }

            generate_command(&config, cli.verbose).await
        }
        Commands::Targets => {
            targets_command();
            Ok(())
        }
    }
}

/// Load the config file, `.env` and environment overrides
fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(path) if verbose => eprintln!("{} {}", "Loaded environment from:".cyan(), path.display()),
        _ => {}
    }

    let mut config = if let Some(config_path) = path {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config {}", config_path.display()))?
    } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG_FILE))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    if let Ok(snapshot) = std::env::var(SNAPSHOT_ENV) {
        config.connection.snapshot = Some(absolute(PathBuf::from(snapshot))?);
    }

    Ok(config)
}

/// Paths given on the command line are relative to the working directory, not
/// the config file
fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Generate command - introspect and write the query builder
async fn generate_command(config: &Config, verbose: bool) -> Result<()> {
    let snapshot = config.connection.snapshot.as_ref().ok_or_else(|| {
        anyhow::anyhow!(
            "No schema source configured. Pass --snapshot, set {} or add [connection] snapshot to {}",
            SNAPSHOT_ENV,
            DEFAULT_CONFIG_FILE
        )
    })?;
    let snapshot = config.resolve(snapshot);
    tracing::debug!(?config, "Resolved configuration");

    if verbose {
        eprintln!("{} {}", "Loading schema snapshot from:".cyan(), snapshot.display());
    }
    let conn = SnapshotConnection::from_file(&snapshot)?;

    let options = GenerateOptions::from_config(config)?;
    eprintln!(
        "{} {} query builder into {}...",
        "Generating".cyan(),
        options.target.to_string().bold(),
        options.output_dir.display()
    );

    let summary = generate(&conn, &options).await?;
    print_summary(&summary, &options.output_dir);

    Ok(())
}

/// Targets command - list output profiles
fn targets_command() {
    println!("{}", "Supported targets:".bold());
    for profile in TargetProfile::all() {
        let extensions: Vec<&str> = profile.passes.iter().map(|pass| pass.extension).collect();
        let suffix = if profile.import_suffix.is_empty() {
            "none".to_string()
        } else {
            profile.import_suffix.to_string()
        };

        println!(
            "  {:<6} files: {:<16} import suffix: {}",
            profile.target.as_str().green(),
            extensions.join(" "),
            suffix
        );
    }
}

fn print_summary(summary: &GenerateSummary, output_dir: &Path) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Query Builder Generated".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Server version: {}", summary.server_version);
    println!("Target:         {}", summary.target);
    println!("Output:         {}", output_dir.display());
    println!();

    println!("{}", "Schema:".bold());
    println!("  Object types: {}", summary.object_types);
    println!("  Scalars:      {}", summary.scalars);
    println!("  Casts:        {}", summary.casts);
    println!("  Functions:    {}", summary.functions);
    println!("  Operators:    {}", summary.operators);
    println!("  Globals:      {}", summary.globals);
    println!();

    println!("{}", "Files:".bold());
    println!("  Rendered:  {}", summary.files);
    println!("  Written:   {}", summary.sync.written.to_string().green());
    println!("  Unchanged: {}", summary.sync.unchanged);
    if summary.sync.removed > 0 {
        println!("  Removed:   {}", summary.sync.removed.to_string().yellow());
    } else {
        println!("  Removed:   {}", summary.sync.removed);
    }
    println!();

    if summary.sync.written == 0 && summary.sync.removed == 0 {
        println!("{}", "✓ Query builder already up to date".green().bold());
    } else {
        println!("{}", "✓ Query builder generated".green().bold());
    }
    println!("{}", "=".repeat(60).bright_blue());
}
