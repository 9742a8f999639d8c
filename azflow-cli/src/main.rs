//! azflow: collect Entra ID and Azure Resource Manager objects as JSON.

mod args;

use anyhow::{Context, Result};
use args::{Cli, Command};
use azflow::prelude::*;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::BufWriter;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = if cli.json_logs { LogFormat::Json } else { LogFormat::Text };
    if let Err(e) = init_tracing(cli.verbose, format) {
        eprintln!("{e}");
    }

    match run(cli).await {
        Ok(summary) if summary.cancelled => {
            warn!("collection cancelled, output is partial");
            ExitCode::from(130)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<CollectionSummary> {
    let Command::List { target } = cli.command;

    let mut config = match &cli.config {
        Some(path) => CollectorConfig::from_file(path)?,
        None => CollectorConfig::new(),
    };
    if let Some(tenant) = cli.tenant {
        config = config.with_tenant(tenant);
    }

    let jwt = cli.jwt.context("a bearer token is required, pass --jwt or set AZFLOW_JWT")?;
    let tokens: Arc<dyn TokenSource> = Arc::new(StaticToken::new(jwt)?);
    let client = AzureClient::from_config(&config, tokens)?;

    let plan = target.plan();
    plan.validate()?;

    let mut identity = RunIdentity::new();
    if let Some(tenant) = &config.tenant {
        identity = identity.with_tenant(tenant.clone());
    }
    let token = Arc::new(CancellationToken::new());
    let ctx = RunContext::with_token(identity, token.clone());
    let interrupt = cancel_on_interrupt(token);

    info!(
        run_id = %ctx.identity().run_id,
        target = ?target,
        kinds = plan.len(),
        "collecting"
    );
    let stream = collect(&ctx, &client, &plan, &config.queries);
    let run_id = ctx.identity().run_id;

    let summary = match &cli.output {
        Some(path) => {
            let file = tokio::fs::File::create(path)
                .await
                .with_context(|| format!("unable to create {}", path.display()))?;
            let mut sink = JsonSink::new(BufWriter::new(file), run_id);
            output_stream(&ctx, stream, &mut sink).await?
        }
        None => {
            let mut sink = JsonSink::new(tokio::io::stdout(), run_id);
            output_stream(&ctx, stream, &mut sink).await?
        }
    };

    interrupt.abort();
    ctx.join().await;
    Ok(summary)
}
