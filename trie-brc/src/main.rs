use std::io::{self, BufWriter, Write};

use anyhow::Context;
use clap::Parser;
use trie_brc::cli::Cli;
use trie_brc::{aggregate_file, write_report};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.init_tracing();

    let index = aggregate_file(&cli.input, cli.pipeline_config())
        .await
        .with_context(|| format!("aggregating {}", cli.input.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_report(&index, &mut out).context("writing report")?;
    writeln!(out)?;
    out.flush().context("flushing report")?;

    Ok(())
}
