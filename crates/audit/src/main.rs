mod config;
mod metrics;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use extract::{ClassificationOracle, Extractor, OracleBackend};
use std::path::PathBuf;
use tally::{BiasTally, render_report};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

/// Tally demographic and clinical bias attributes across a case-record corpus.
///
/// Environment (a `.env` file is honoured):
/// `OPENAI_API_KEY`, `BIAS_AUDIT_BACKEND`, `BIAS_AUDIT_BASE_URL`,
/// `BIAS_AUDIT_MODEL`, `BIAS_AUDIT_TIMEOUT_SECS`, `BIAS_AUDIT_MAX_RETRIES`.
/// Flags take precedence over the environment.
#[derive(Parser, Debug)]
#[command(name = "bias-audit")]
struct Cli {
    /// JSON Lines corpus, one case record per line
    #[arg(default_value = "agentclinic_medqa.jsonl")]
    input: PathBuf,

    /// Classifier backend: openai or ollama
    #[arg(long)]
    backend: Option<OracleBackend>,

    /// Model name sent to the backend
    #[arg(long)]
    model: Option<String>,

    /// Backend base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Retries per record on transport failure
    #[arg(long)]
    max_retries: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Count labels outside a dimension's allowed set as "Unknown"
    #[arg(long)]
    strict_labels: bool,

    /// Process at most N records
    #[arg(long)]
    limit: Option<usize>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    /// `--backend` is consumed by `AppConfig::from_env`; the remaining flags
    /// override whatever the environment set.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(model) = &self.model {
            config.oracle.model = model.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.oracle.base_url = base_url.clone();
        }
        if let Some(max_retries) = self.max_retries {
            config.retry.max_retries = max_retries;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.oracle.request_timeout_secs = timeout_secs;
        }
        if self.strict_labels {
            config.strict_labels = true;
        }
    }
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("bias_audit=info,extract=info,ingest=info,tally=info"))?;

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

async fn run<O: ClassificationOracle>(
    extractor: &Extractor<O>,
    cli: &Cli,
    config: &AppConfig,
) -> Result<()> {
    let mut tally = BiasTally::new(config.label_policy());

    let metrics = pipeline::run_audit(extractor, &cli.input, cli.limit, &mut tally).await?;
    let snapshot = metrics.snapshot();

    tracing::info!(
        metrics = %serde_json::to_string(&snapshot)?,
        "Audit complete"
    );

    print!("{}", render_report(&tally));
    print!("{}", snapshot.summary());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json)?;

    let mut config = AppConfig::from_env(cli.backend)?;
    cli.apply(&mut config);

    tracing::info!(
        input = %cli.input.display(),
        config = %serde_json::to_string(&config)?,
        "Starting bias audit"
    );

    let oracle = config.build_oracle()?;
    let extractor = Extractor::new(oracle, config.retry_policy());

    run(&extractor, &cli, &config).await
}
