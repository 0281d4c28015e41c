use clap::Parser;
use colored::Colorize;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use memberusage::analysis::{parse_candidates, UsageAnalyzer};
use memberusage::config::Config;
use memberusage::metadata::ClassIndex;
use memberusage::packages::InstalledPackages;
use memberusage::providers::ProviderRegistry;
use memberusage::report::{ReportFormat, Reporter};

/// memberusage - Suppress dead code findings for framework-invoked PHP members
#[derive(Parser, Debug)]
#[command(name = "memberusage")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the project root (config lookup, vendor directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Metadata snapshot exported by the analyzer (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    metadata: PathBuf,

    /// Dead code findings to check, one `Class::method` per line.
    /// Without it every method in the snapshot is evaluated.
    #[arg(long, value_name = "FILE")]
    candidates: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Runtime version of the analysed code (e.g. 8.2, 7.4.33)
    #[arg(long, value_name = "VERSION")]
    runtime_version: Option<String>,

    /// Composer vendor directory, relative to the project root
    #[arg(long, value_name = "DIR")]
    vendor_dir: Option<PathBuf>,

    /// Force the Doctrine provider on
    #[arg(long, conflicts_with = "no_doctrine")]
    doctrine: bool,

    /// Force the Doctrine provider off
    #[arg(long)]
    no_doctrine: bool,

    /// Only list members that a provider marks as used
    #[arg(long)]
    used_only: bool,

    /// Evaluate members in parallel
    #[arg(long)]
    parallel: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    Terminal,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    info!("memberusage v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config(&cli)?;

    run(&config, &cli)
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        // Try to load from default locations
        Config::from_default_locations(&cli.path)?
    };

    // Override with CLI arguments
    if cli.doctrine {
        config.providers.doctrine.enabled = Some(true);
    }
    if cli.no_doctrine {
        config.providers.doctrine.enabled = Some(false);
    }
    if let Some(version) = &cli.runtime_version {
        config.runtime.version = Some(version.clone());
    }
    if let Some(vendor_dir) = &cli.vendor_dir {
        config.packages.vendor_dir = vendor_dir.clone();
    }
    if let Some(format) = &cli.format {
        config.report.format = match format {
            OutputFormat::Terminal => "terminal".to_string(),
            OutputFormat::Json => "json".to_string(),
        };
    }
    if cli.used_only {
        config.report.show_unused = false;
    }

    Ok(config)
}

fn run(config: &Config, cli: &Cli) -> Result<()> {
    let start_time = Instant::now();

    // Step 1: Load metadata
    info!("Loading metadata snapshot {}", cli.metadata.display());
    let index = ClassIndex::load(&cli.metadata)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to load {}", cli.metadata.display()))?;

    // Step 2: Resolve runtime capabilities and installed packages
    let capabilities = config.capabilities(index.runtime_version())?;
    let vendor_dir = config.vendor_dir(&cli.path);
    let packages = InstalledPackages::from_vendor_dir(&vendor_dir).into_diagnostic()?;

    // Step 3: Build providers
    let registry = ProviderRegistry::from_config(&config.providers, capabilities, &packages);
    if registry.enabled_count() == 0 && !cli.quiet {
        eprintln!(
            "{}",
            "No usage provider is enabled; every finding stands.".yellow()
        );
    }

    // Step 4: Evaluate
    let analyzer = UsageAnalyzer::new(&registry).with_parallel(cli.parallel);
    let verdicts = match &cli.candidates {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to read candidates file: {}", path.display()))?;
            let candidates = parse_candidates(&contents)
                .into_diagnostic()
                .wrap_err_with(|| format!("Invalid candidates file: {}", path.display()))?;
            analyzer.analyze_candidates(&index, &candidates)
        }
        None => analyzer.analyze_all(&index),
    };

    // Step 5: Report
    let format = ReportFormat::from_name(&config.report.format).ok_or_else(|| {
        miette::miette!("Unknown report format '{}'", config.report.format)
    })?;
    let reporter = Reporter::new(format, cli.output.clone()).with_show_unused(config.report.show_unused);
    reporter.report(&verdicts)?;

    info!(
        "Evaluated {} members in {:.2?}",
        verdicts.len(),
        start_time.elapsed()
    );

    Ok(())
}
