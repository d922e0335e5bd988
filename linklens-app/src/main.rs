use anyhow::{Context, Result};
use clap::Parser;
use linklens_common::observability::init_logging;
use linklens_config::{LinklensConfig, LinklensConfigLoader};
use linklens_server::{AppState, ParseResponse};
use linklens_social::profile::ProfilePipeline;
use tokio::net::TcpListener;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the token may come from the real environment.
    let _ = dotenvy::dotenv();
    let args = cli::Args::parse();

    // 1) Load config (env wins over file)
    let loader = match &args.config {
        Some(path) => LinklensConfigLoader::new().with_file(path),
        None => LinklensConfigLoader::new().with_optional_file(cli::DEFAULT_CONFIG),
    };
    let mut cfg: LinklensConfig = loader.load().context("loading configuration")?;
    if let Some(bind) = args.bind {
        cfg.server.bind = bind;
    }
    if let Some(format) = args.log_format {
        cfg.logging.format = format;
    }

    let log_path = init_logging(cfg.logging.to_log_config("linklens"))?;
    tracing::info!(log_path = %log_path.display(), "linklens.start");

    match args.link {
        Some(link) => one_shot(&cfg, &link).await,
        None => serve(&cfg).await,
    }
}

async fn one_shot(cfg: &LinklensConfig, link: &str) -> Result<()> {
    let pipeline = ProfilePipeline::from_config(cfg)?;
    let doc = pipeline.run(link).await;
    let out = ParseResponse {
        result: doc.to_wire()?,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

async fn serve(cfg: &LinklensConfig) -> Result<()> {
    let state = AppState::from_config(cfg);
    let listener = TcpListener::bind(cfg.server.bind.as_str())
        .await
        .with_context(|| format!("binding {}", cfg.server.bind))?;

    linklens_server::serve(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("linklens.shutdown");
    })
    .await?;
    Ok(())
}
