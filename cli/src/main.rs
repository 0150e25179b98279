use anyhow::{Context, Result};
use apicov_core::{render_summary, save_html, save_json, AnalyzerConfig, CoverageEngine};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "apicov")]
#[command(about = "Measure how much of an OpenAPI description a Terraform provider covers", long_about = None)]
struct Cli {
    /// OpenAPI description (JSON, or YAML by extension)
    #[arg(long, env = "APICOV_OPENAPI", default_value = "api/openapi.json")]
    openapi: PathBuf,

    /// Provider source directory
    #[arg(long, env = "APICOV_PROVIDER", default_value = "bastion/")]
    provider: PathBuf,

    /// JSON report destination
    #[arg(long, env = "APICOV_OUTPUT", default_value = "coverage-report.json")]
    output: PathBuf,

    /// Also write an HTML report here
    #[arg(long)]
    html: Option<PathBuf>,

    /// Debug logging and a diagnostics section in the summary
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Analyze schema property coverage
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    schemas: bool,
}

impl From<Cli> for AnalyzerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            openapi_path: cli.openapi,
            provider_dir: cli.provider,
            output_path: cli.output,
            html_output: cli.html,
            verbose: cli.verbose,
            analyze_schemas: cli.schemas,
        }
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // 初始化日志
    let default_filter = if cli.verbose {
        "apicov=debug,apicov_core=debug"
    } else {
        "apicov=info,apicov_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AnalyzerConfig::from(cli);
    if let Err(e) = run(config) {
        tracing::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}

fn run(config: AnalyzerConfig) -> Result<()> {
    tracing::info!(
        "Analyzing {} against {}",
        config.provider_dir.display(),
        config.openapi_path.display()
    );
    let mut engine = CoverageEngine::new(config).context("failed to initialise the analyzer")?;
    let report = engine.analyze().context("coverage analysis failed")?;

    let config = engine.config();
    print!("{}", render_summary(&report, config.verbose));

    save_json(&report, &config.output_path)
        .with_context(|| format!("failed to write {}", config.output_path.display()))?;
    if let Some(html_path) = &config.html_output {
        save_html(&report, html_path)
            .with_context(|| format!("failed to write {}", html_path.display()))?;
    }

    Ok(())
}
