// Benchmark command: build config and signer, run, write artifacts, summarize

use anyhow::{bail, Context};
use ingestbench_harness::prelude::*;

use crate::output::{OutputFormat, RunSummary};
use crate::Cli;

fn build_config(cli: &Cli) -> anyhow::Result<BenchmarkConfig> {
    let timeout =
        BenchmarkConfig::timeout_from_secs(cli.timeout_sec).context("invalid --timeout-sec")?;
    let config = BenchmarkConfig::new(cli.base_url.clone())
        .with_requests(cli.requests)
        .with_base_timestamp(cli.base_timestamp)
        .with_timeout(timeout)
        .with_mode(cli.mode.clone());
    Ok(config)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = OutputFormat::from_str(&cli.format);
    let config = build_config(&cli)?;

    // Config is validated first, then the key is checked, all before any traffic
    let runner = BenchmarkRunner::try_new(config, || {
        Ok(OpenSslSigner::new(&cli.private_key)?.with_program(cli.openssl_bin.clone()))
    })
    .context("benchmark setup failed")?;

    let report = tokio::select! {
        result = runner.run() => result.context("benchmark aborted")?,
        _ = tokio::signal::ctrl_c() => bail!("interrupted before the benchmark completed"),
    };

    let artifact = report
        .write_json(&cli.output)
        .with_context(|| format!("failed to write report to {}", cli.output.display()))?;
    let html = match &cli.html_report {
        Some(path) => Some(
            report
                .write_html(path)
                .with_context(|| format!("failed to write HTML report to {}", path.display()))?,
        ),
        None => None,
    };
    tracing::info!(artifact = %artifact.display(), "Report written");

    if !cli.quiet {
        RunSummary::new(&report, &artifact, html.as_deref()).print(format)?;
    }
    Ok(())
}
