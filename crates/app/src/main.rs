use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = cli::Cli::parse();
    let report = cli::run(args)?;
    tracing::info!("report written to {}", report.display());
    Ok(())
}
