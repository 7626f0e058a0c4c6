//! CLI entrypoint for maestro
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, bail};
use clap::Parser;
use maestro_application::{
    ConfidenceValidator, NoStepObserver, Planner, ProcessRequestUseCase, ReasoningOptimizer,
    StepObserver, WorkflowExecutor,
};
use maestro_domain::{EngineRequest, ExecutionSpec, ResponseStatus, Strategy};
use maestro_infrastructure::{
    BuiltinToolExecutor, ConfigLoader, FileConfig, HttpProviderGateway, InMemoryDataSource,
    JsonlStepObserver, StaticDataSourceRegistry, StaticGuardrail,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "maestro", version, about = "AI orchestration engine with confidence-gated responses")]
struct Cli {
    /// The message to process
    message: Option<String>,

    /// Path to a config file (overrides discovered configs)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip config file discovery and use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Planning strategy: direct, reasoned or adaptive
    #[arg(short, long)]
    strategy: Option<String>,

    /// Confidence threshold required to accept an answer
    #[arg(long)]
    threshold: Option<f64>,

    /// Maximum validation attempts before falling back
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Override the configured model
    #[arg(short, long)]
    model: Option<String>,

    /// Application tag attached to the request
    #[arg(long, default_value = "cli")]
    application: String,

    /// Session correlation id (generated when omitted)
    #[arg(long)]
    session: Option<String>,

    /// User identity for guardrail checks
    #[arg(long)]
    user: Option<String>,

    /// Build and print the execution plan without running it
    #[arg(long)]
    plan_only: bool,

    /// Print the full response envelope as JSON
    #[arg(long)]
    json: bool,

    /// Append workflow step events to this JSONL file
    #[arg(long)]
    trace_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(cli: &Cli, config: &FileConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    if let Some(log_dir) = &config.logging.log_dir {
        let appender = tracing_appender::rolling::daily(log_dir, "maestro.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        None
    }
}

fn apply_overrides(cli: &Cli, mut spec: ExecutionSpec) -> Result<ExecutionSpec> {
    if let Some(strategy) = &cli.strategy {
        let strategy: Strategy = strategy
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        spec.policy.strategy = strategy;
    }
    if let Some(threshold) = cli.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            bail!("--threshold must be in [0, 1], got {threshold}");
        }
        spec.policy.confidence_threshold = threshold;
    }
    if let Some(max_attempts) = cli.max_attempts {
        if max_attempts == 0 {
            bail!("--max-attempts must be at least 1");
        }
        spec.policy.max_attempts = max_attempts;
    }
    if let Some(model) = &cli.model {
        spec.provider.model = model.clone();
    }
    Ok(spec)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!("{e}"))?
    };

    let _log_guard = init_logging(&cli, &config);
    info!("Starting maestro");

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            warn!("config: {issue}");
        }
        bail!("invalid configuration ({} issue(s))", issues.len());
    }

    let Some(message) = cli.message.clone() else {
        bail!("A message is required.");
    };

    let spec = apply_overrides(&cli, config.execution_spec())?;

    // === Dependency Injection ===
    let gateway = Arc::new(HttpProviderGateway::from_env(
        &config.provider.base_url,
        &config.provider.api_key_env,
    ));

    let planner = Planner::new(ReasoningOptimizer::new(gateway.clone()), &config.execution);

    if cli.plan_only {
        let plan = planner.build_plan(&spec, &message).await?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let registry = StaticDataSourceRegistry::new().register(Arc::new(InMemoryDataSource::new(
        "memory",
        config.documents.clone(),
    )));
    let tools = Arc::new(BuiltinToolExecutor::new());
    let guardrail = Arc::new(StaticGuardrail::new(config.guardrail.clone()));

    let trace_path = cli.trace_file.clone().or(config.logging.trace_file.clone());
    let observer: Arc<dyn StepObserver> = match &trace_path {
        Some(path) => match JsonlStepObserver::new(path) {
            Some(observer) => Arc::new(observer),
            None => {
                warn!("could not open trace file {}, tracing disabled", path.display());
                Arc::new(NoStepObserver)
            }
        },
        None => Arc::new(NoStepObserver),
    };

    let cancellation = CancellationToken::new();
    {
        let cancellation = cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling");
                cancellation.cancel();
            }
        });
    }

    let validator = ConfidenceValidator::new(gateway.clone(), config.validation.clone());
    let executor = WorkflowExecutor::new(
        gateway,
        Arc::new(registry),
        tools,
        validator,
        observer,
        config.execution.clone(),
    )
    .with_cancellation(cancellation);

    let use_case = ProcessRequestUseCase::new(guardrail, planner, executor);

    let session_id = cli
        .session
        .clone()
        .unwrap_or_else(|| format!("session_{}", chrono::Utc::now().timestamp_millis()));
    let mut request = EngineRequest::new(message, &cli.application).with_session_id(session_id);
    if let Some(user) = &cli.user {
        request = request.with_context_value("user_id", user.as_str());
    }

    let response = use_case.process(&request, &spec).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.content);
        if cli.verbose > 0 {
            eprintln!(
                "confidence: {:.3} | attempts: {} | steps: {} | {:.2}s",
                response.confidence,
                response.metadata.validation_attempts,
                response.metadata.execution_steps.len(),
                response.metadata.duration_seconds,
            );
        }
    }

    if response.status == ResponseStatus::Failed {
        std::process::exit(1);
    }
    Ok(())
}
