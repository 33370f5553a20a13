//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use eksreview_chart::RasterChartRenderer;
use eksreview_core::{
    ChartOutcome, GenerateOutput, GenerateRequest, InputFormat, ProgressReporter, generate,
    load_input, load_references, render_template,
};
use eksreview_shared::{AppConfig, SeverityLevel, init_config, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// eksreview: turn an EKS operational assessment into a PDF report.
#[derive(Parser)]
#[command(
    name = "eksreview",
    version,
    about = "Compile EKS operational review findings into a paginated PDF report.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Serialization of a generated input template.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum TemplateFormat {
    Json,
    Toml,
}

impl From<TemplateFormat> for InputFormat {
    fn from(format: TemplateFormat) -> Self {
        match format {
            TemplateFormat::Json => InputFormat::Json,
            TemplateFormat::Toml => InputFormat::Toml,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate the review report.
    Generate {
        /// Review input file (.json or .toml) with findings and risk counts.
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF path (defaults to report.output_dir/report.file_name).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Override one risk count, e.g. `--risk critical=2`. Repeatable.
        #[arg(long = "risk", value_name = "LEVEL=COUNT", value_parser = parse_risk)]
        risk: Vec<(SeverityLevel, u64)>,

        /// Documentation search results to append (.json or .toml).
        #[arg(long)]
        references: Option<PathBuf>,

        /// Report title (overrides report.title).
        #[arg(long)]
        title: Option<String>,
    },

    /// Write a starter input file with sample findings.
    Template {
        /// Output format.
        #[arg(long, default_value = "json")]
        format: TemplateFormat,

        /// File to write (prints to stdout when omitted).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

/// Parse `LEVEL=COUNT`.
fn parse_risk(raw: &str) -> std::result::Result<(SeverityLevel, u64), String> {
    let (level, count) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LEVEL=COUNT, got '{raw}'"))?;
    let level: SeverityLevel = level.parse().map_err(|e| format!("{e}"))?;
    let count = count
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid count '{count}': {e}"))?;
    Ok((level, count))
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "eksreview=info",
        1 => "eksreview=debug",
        _ => "eksreview=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            input,
            out,
            risk,
            references,
            title,
        } => cmd_generate(&input, out, &risk, references.as_deref(), title),
        Command::Template { format, out } => cmd_template(format, out.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_generate(
    input_path: &Path,
    out: Option<PathBuf>,
    risk: &[(SeverityLevel, u64)],
    references: Option<&Path>,
    title: Option<String>,
) -> Result<()> {
    let mut config: AppConfig = load_config()?;
    if let Some(title) = title {
        config.report.title = title;
    }

    let mut input = load_input(input_path)?;
    for (level, count) in risk {
        input.risk_summary.set(*level, *count);
    }

    if let Some(path) = references {
        match load_references(path) {
            Ok(items) => input.references.extend(items),
            Err(e) => {
                warn!(error = %e, "documentation lookup failed; continuing without it");
                eprintln!("  warning: {e}");
            }
        }
    }

    let output_path = out.unwrap_or_else(|| config.report.output_path());
    info!(
        input = %input_path.display(),
        output = %output_path.display(),
        "generating report"
    );

    let request = GenerateRequest::new(input, output_path);
    let reporter = CliProgress::new();
    let result = generate(&request, &config, &RasterChartRenderer, &reporter);
    if result.is_err() {
        reporter.spinner.finish_and_clear();
    }
    let output = result?;

    // Print summary
    println!();
    println!("  Report generated!");
    println!("  Path:    {}", output.artifact.path.display());
    println!("  Pages:   {}", output.artifact.page_count);
    println!("  Size:    {} bytes", output.artifact.size_bytes);
    println!("  SHA256:  {}", output.artifact.sha256);
    match &output.chart {
        ChartOutcome::Embedded => println!("  Chart:   embedded"),
        ChartOutcome::Placeholder(why) => println!("  Chart:   placeholder ({why})"),
    }
    if output.skipped_references > 0 {
        println!("  Skipped: {} malformed reference(s)", output.skipped_references);
    }
    println!("  Time:    {:.1}s", output.elapsed.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_template(format: TemplateFormat, out: Option<&Path>) -> Result<()> {
    let text = render_template(format.into())?;
    match out {
        Some(path) => {
            if path.exists() {
                return Err(eyre!("refusing to overwrite existing file '{}'", path.display()));
            }
            std::fs::write(path, text)
                .map_err(|e| eyre!("cannot write '{}': {e}", path.display()))?;
            println!("Template written to: {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn degraded(&self, what: &str) {
        self.spinner.println(format!("  warning: {what}"));
    }

    fn done(&self, _output: &GenerateOutput) {
        self.spinner.finish_and_clear();
    }
}
