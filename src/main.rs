use anyhow::Result;
use clap::Parser;
use headcount::{cli::Cli, config::PipelineConfig, pipeline};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    let config = args.apply(config);

    let table = pipeline::run(&config)?;
    let written = pipeline::write_outputs(&config, &table)?;

    for path in &written {
        println!("{}", path.display());
    }

    match table.peak_total() {
        Some((at, peak)) => println!(
            "{} sources, {} minutes, peak {} at {}",
            table.source_labels().len(),
            table.len(),
            peak,
            at.hour_minute()
        ),
        None => println!("{} sources, {} minutes", table.source_labels().len(), table.len()),
    }

    Ok(())
}
