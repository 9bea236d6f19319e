#![doc = include_str!("../README.md")]

mod reader;

use anyhow::Context;
use clap::Parser;
use lector::{Document, VOICES};
use lector_pool::TaskPool;
use reader::command::CommandLoader;
use reader::config::{AppConfig, CliArgs, ReadConfig};
use reader::driver::Reader;
use reader::telemetry::init_telemetry;
use tokio::signal;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;

    match config {
        AppConfig::ListVoices => {
            list_voices();
            Ok(())
        }
        AppConfig::Read(config) => {
            let providers = init_telemetry()?;
            let result = read(&config).await;
            providers.shutdown();
            result
        }
    }
}

fn list_voices() {
    for voice in VOICES {
        println!("{:<12} {}", voice.id, voice.name);
    }
}

async fn read(config: &ReadConfig) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(&config.input)
        .await
        .with_context(|| format!("cannot read {}", config.input.display()))?;
    let document = Document::from_text(&text);

    log_startup_info(config, &document);

    let mut pool = TaskPool::new();
    pool.initialize(
        config.num_workers,
        CommandLoader::new(config.command.clone()),
        config.model.clone(),
        |_progress| {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                "Worker {} loading {}/{}",
                _progress.worker_id,
                _progress.loaded,
                _progress.total
            );
        },
    )
    .await
    .context("failed to start generation workers")?;

    let reader = Reader::new(&document, &pool, config);
    let result = tokio::select! {
        result = reader.run() => result,
        () = shutdown_signal() => {
            #[cfg(feature = "tracing")]
            tracing::info!("Shutdown signal received, stopping workers...");
            pool.terminate();
            anyhow::bail!("interrupted");
        }
    };

    pool.terminate();

    let summary = result?;
    eprintln!(
        "Read {} sentences in {} batches",
        summary.sentences, summary.batches
    );
    Ok(())
}

fn log_startup_info(_config: &ReadConfig, _document: &Document) {
    if cfg!(debug_assertions) {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Reading {} ({} sentences) with full config: {:#?}",
            _config.input.display(),
            _document.sentence_count(),
            _config
        );
    } else {
        #[cfg(feature = "tracing")]
        tracing::info!(
            "Reading {} ({} sentences) with {} workers",
            _config.input.display(),
            _document.sentence_count(),
            _config.num_workers
        );
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received SIGTERM signal");
        },
    }
}
