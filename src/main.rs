use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use conference_scraper::app::ports::HttpClientPort;
use conference_scraper::config::{Config, Overrides};
use conference_scraper::infra::http_client::{fetch_html, ReqwestHttp};
use conference_scraper::observability::failures::write_failures_jsonl;
use conference_scraper::observability::metrics;
use conference_scraper::pipeline::normalize::normalize_talk;
use conference_scraper::pipeline::PipelineOrchestrator;
use conference_scraper::{apis, logging, output};

#[derive(Parser)]
#[command(name = "conference_scraper")]
#[command(about = "General conference talk scraper")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Default)]
struct YearArgs {
    /// First conference year to include
    #[arg(long)]
    start_year: Option<i32>,
    /// Last conference year to include
    #[arg(long)]
    end_year: Option<i32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate, extract and write every talk to a CSV file
    Run {
        #[command(flatten)]
        years: YearArgs,
        /// Output CSV path
        #[arg(long)]
        output: Option<PathBuf>,
        /// Number of concurrent fetches
        #[arg(long)]
        concurrency: Option<usize>,
        /// Write failure reports here as JSON lines
        #[arg(long)]
        failures: Option<PathBuf>,
    },
    /// Print every discovered talk URL, one per line
    Enumerate {
        #[command(flatten)]
        years: YearArgs,
    },
    /// Extract a single talk and print it as JSON
    Extract {
        #[arg(long)]
        url: String,
    },
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight pages");
            token.cancel();
        }
    });
    cancel
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let _log_guard = logging::init_logging();
    if let Err(e) = metrics::init() {
        warn!("Metrics disabled: {}", e);
    }

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Run { years, output, concurrency, failures } => {
            let config = config.with_overrides(Overrides {
                start_year: years.start_year,
                end_year: years.end_year,
                output_path: output,
                concurrency,
                failures_path: failures,
            });
            let http: Arc<dyn HttpClientPort> =
                Arc::new(ReqwestHttp::new(config.request_timeout_secs)?);
            let orchestrator = PipelineOrchestrator::new(config, http)?;
            let cancel = cancel_on_ctrl_c();

            let result = orchestrator.run(&cancel).await;
            let config = orchestrator.config();

            output::write_csv(&config.output_path, &result.records)
                .with_context(|| format!("writing {}", config.output_path.display()))?;
            if let Some(path) = &config.failures_path {
                write_failures_jsonl(path, &result.summary.failures)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            metrics::push_all("conference_scraper").await;

            println!("\n📊 Run results:");
            println!("   Talks: {}", result.summary.total);
            println!("   Complete: {}", result.summary.complete);
            println!("   Empty: {}", result.summary.empty);
            println!("   Failures reported: {}", result.summary.failures.len());
            println!("   Output file: {}", config.output_path.display());
            println!("   Elapsed: {:.1}s", result.summary.elapsed.as_secs_f64());
        }
        Commands::Enumerate { years } => {
            let config = config.with_overrides(Overrides {
                start_year: years.start_year,
                end_year: years.end_year,
                ..Overrides::default()
            });
            let http: Arc<dyn HttpClientPort> =
                Arc::new(ReqwestHttp::new(config.request_timeout_secs)?);
            let orchestrator = PipelineOrchestrator::new(config, http)?;
            let cancel = cancel_on_ctrl_c();

            for url in orchestrator.enumerate(&cancel).await {
                println!("{}", url);
            }
            let failed = orchestrator.failures().len();
            if failed > 0 {
                warn!("{} landing pages failed", failed);
            }
        }
        Commands::Extract { url } => {
            config.validate()?;
            let http = ReqwestHttp::new(config.request_timeout_secs)?;
            let body = fetch_html(&http, &url).await?;
            match apis::talk::extract_talk(&body, &url).and_then(normalize_talk) {
                Ok(talk) => {
                    info!("Extracted '{}'", talk.title);
                    println!("{}", serde_json::to_string_pretty(&talk)?);
                }
                Err(e) => {
                    error!("Extraction failed ({}): {}", e.kind().as_str(), e);
                    anyhow::bail!("could not extract {}: {}", url, e);
                }
            }
        }
    }

    Ok(())
}
