//! dcop-yaml CLI - Convert DCOP description files into simulator YAML.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dcop_yaml::models::DEFAULT_CONFIG_FILE;
use dcop_yaml::pipeline::ConversionOutput;
use dcop_yaml::{make_rng, Config, PdcopMode, PdcopPipeline, SimPipeline, TracingReporter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "dcop-yaml")]
#[command(version)]
#[command(about = "Convert PDCOP and DynaGraph files into DCOP simulator YAML")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (optional)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output directory (overrides [output] dir)
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a static PDCOP .dzn file
    Pdcop {
        /// Path to the .dzn file
        #[arg(short, long)]
        file: PathBuf,

        /// Problem name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Convert a dynamic PDCOP .dzn file, scheduling random variable changes
    Ddcop {
        /// Path to the .dzn file
        #[arg(short, long)]
        file: PathBuf,

        /// Problem name (defaults to the file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Seed for the event shuffle (overrides [pdcop] seed)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Convert a DynaGraph sim file
    Sim {
        /// Sim file path
        #[arg(short, long)]
        file: PathBuf,

        /// DCOP name
        #[arg(short, long)]
        name: String,
    },

    /// Validate configuration file
    Validate,

    /// Show example configuration
    Example,
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn print_example_config() {
    let example = r#"# dcop-yaml configuration file

[output]
dir = "./yaml-files"

[scenario]
initial_delay = 1      # delay of the leading w0 wait
resolution_delay = 1   # wait after each random variable change (ddcop)
command_delay = 12     # wait after each agent command (sim)

[pdcop]
# seed = 42            # fixed shuffle for reproducible ddcop scenarios
"#;
    println!("{example}");
}

fn load_config(cli: &Cli) -> Result<Config> {
    let (path, explicit) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    let mut config = Config::load_or_default(&path, explicit)
        .with_context(|| format!("Failed to load config from {path:?}"))?;

    if let Some(dir) = &cli.output_dir {
        config.output.dir = dir.clone();
    }
    Ok(config)
}

fn print_output(output: &ConversionOutput) {
    println!("Problem file saved:  {}", output.paths.problem_path.display());
    println!("Scenario file saved: {}", output.paths.scenario_path.display());
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Commands::Example = cli.command {
        print_example_config();
        return Ok(());
    }

    let config = load_config(&cli)?;
    let reporter = Arc::new(TracingReporter);

    match cli.command {
        Commands::Example => {}

        Commands::Validate => {
            info!("Configuration is valid");
            info!("  Output dir: {}", config.output.dir.display());
            info!(
                "  Delays: initial {}, resolution {}, command {}",
                config.scenario.initial_delay,
                config.scenario.resolution_delay,
                config.scenario.command_delay
            );
            match config.pdcop.seed {
                Some(seed) => info!("  Shuffle seed: {seed}"),
                None => info!("  Shuffle seed: system entropy"),
            }
        }

        Commands::Pdcop { file, name } => {
            let mut rng = make_rng(config.pdcop.seed);
            let pipeline = PdcopPipeline::new(config, reporter);
            let output = pipeline
                .run(&file, name.as_deref(), PdcopMode::Static, &mut rng)
                .with_context(|| format!("Failed to convert {file:?}"))?;
            print_output(&output);
        }

        Commands::Ddcop { file, name, seed } => {
            let mut rng = make_rng(seed.or(config.pdcop.seed));
            let pipeline = PdcopPipeline::new(config, reporter);
            let output = pipeline
                .run(&file, name.as_deref(), PdcopMode::Dynamic, &mut rng)
                .with_context(|| format!("Failed to convert {file:?}"))?;
            print_output(&output);
        }

        Commands::Sim { file, name } => {
            let pipeline = SimPipeline::new(config, reporter);
            let output = pipeline
                .run(&file, &name)
                .with_context(|| format!("Failed to convert {file:?}"))?;
            print_output(&output);
        }
    }

    Ok(())
}
