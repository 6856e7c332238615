//! Ask command - answers one question over a fixed context set

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{AppConfig, OPENAI_API_KEY_ENV};
use crate::domain::{CompletionOptions, Query};
use crate::infrastructure::answering::AnsweringClient;
use crate::infrastructure::events::{EventBus, MetricsSubscriber, TracingSubscriber};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::llm::OpenAiGenerator;
use crate::infrastructure::oracle::HttpScoreOracle;
use crate::infrastructure::rag::{RagAnswer, RagFacade};
use crate::infrastructure::retriever::StaticRetriever;
use crate::infrastructure::{logging, observability};

/// Arguments for the ask command
#[derive(Args, Clone, Debug)]
pub struct AskArgs {
    /// Question to answer
    pub question: String,

    /// JSON array of `{text, source_id, rank?}` context chunks
    #[arg(long, short = 'c')]
    pub context: Option<PathBuf>,

    /// Generation model (overrides config)
    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long)]
    pub temperature: Option<f32>,

    /// Deadline per external call, in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Number of context chunks to use
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Print the answer as JSON
    #[arg(long)]
    pub json: bool,

    /// Print a Prometheus snapshot after answering
    #[arg(long)]
    pub metrics: bool,
}

impl AskArgs {
    /// Options given on the command line, layered over the configured ones
    fn query_options(&self) -> CompletionOptions {
        let mut options = CompletionOptions::new();

        if let Some(model) = &self.model {
            options = options.with_model(model.clone());
        }
        if let Some(max_tokens) = self.max_tokens {
            options = options.with_max_tokens(max_tokens);
        }
        if let Some(temperature) = self.temperature {
            options = options.with_temperature(temperature);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            options = options.with_timeout_ms(timeout_ms);
        }
        if let Some(top_k) = self.top_k {
            options = options.with_top_k(top_k);
        }

        options
    }
}

/// Run the ask command
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Ignoring invalid configuration: {}", e);
        let mut config = AppConfig::default();
        config.resolve_api_keys(|name| std::env::var(name).ok());
        config
    });
    logging::init_logging(&config.logging);

    let prometheus = if args.metrics {
        observability::init_metrics()
    } else {
        None
    };

    let retriever = match &args.context {
        Some(path) => StaticRetriever::from_json_file(path)?,
        None => {
            warn!("No context file given, answering without retrieved context");
            StaticRetriever::empty()
        }
    };

    let facade = build_facade(&config)?;
    let query = Query::new(args.question.clone()).with_options(args.query_options());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling query");
            on_interrupt.cancel();
        }
    });

    let answer = facade
        .answer_with_cancellation(&query, &retriever, &config.completion_options(), &cancel)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        print_answer(&answer);
    }

    if let Some(prometheus) = prometheus {
        println!();
        print!("{}", prometheus.render());
    }

    Ok(())
}

fn build_facade(config: &AppConfig) -> anyhow::Result<RagFacade> {
    let generation_key = config.generation.api_key.clone().with_context(|| {
        format!(
            "No generation API key: set generation.api_key or {}",
            OPENAI_API_KEY_ENV
        )
    })?;

    let http = HttpClient::new();

    let generator = OpenAiGenerator::with_base_url(
        http.clone(),
        generation_key,
        config.generation.base_url.clone(),
    )
    .with_default_model(config.generation.model.clone());

    let mut oracle = HttpScoreOracle::new(http, config.oracle.base_url.clone());
    if let Some(key) = &config.oracle.api_key {
        oracle = oracle.with_api_key(key.clone());
    }

    let bus = Arc::new(EventBus::new());
    bus.subscribe(TracingSubscriber);
    bus.subscribe(MetricsSubscriber);

    let client = AnsweringClient::new(Arc::new(generator), Arc::new(oracle), bus);

    Ok(RagFacade::new(client))
}

fn print_answer(answer: &RagAnswer) {
    println!("{}", answer.answer);
    println!();
    println!("Trust: {}", answer.trust);

    if !answer.sources.is_empty() {
        println!("Sources:");
        for chunk in &answer.sources {
            println!("  [{}] {}", chunk.source_id, chunk.text);
        }
    }
}
