//! # ldblock: LD Block Boundaries from PLINK Genotypes
//!
//! ## Usage
//! ```bash
//! # Default settings, writes ldblock.breaks
//! ldblock data/chr22
//!
//! # Wider window, metric dump and span timings
//! ldblock data/chr22 --win 500 --print-metric --out chr22 --profile
//! ```

use std::time::Instant;

use ldblock::config::Config;
use ldblock::pipelines::BlockPipeline;
use ldblock::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber; `profile` adds span close timings
fn init_logging(profile: bool) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let span_events = if profile { FmtSpan::CLOSE } else { FmtSpan::NONE };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_span_events(span_events)
                .with_target(false)
                .with_timer(fmt::time::uptime()),
        )
        .with(LevelFilter::INFO)
        .init();
}

fn run() -> Result<()> {
    let start = Instant::now();

    let config = Config::parse_and_validate()?;
    init_logging(config.profile);

    eprintln!("ldblock v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("Input: {:?}", config.input);

    let mut pipeline = BlockPipeline::new(config);
    let summary = pipeline.run()?;

    eprintln!(
        "Found {} break points among {} SNPs; report written to {:?}",
        summary.breaks, summary.retained, summary.report
    );
    let elapsed = start.elapsed();
    eprintln!("\nCompleted in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}
