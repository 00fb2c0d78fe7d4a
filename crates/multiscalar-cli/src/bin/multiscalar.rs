//! Multiscalar Segregation Analysis
//!
//! Usage: `multiscalar <input.json> <output.json> [config.json]`

use std::env;
use std::path::Path;

use multiscalar_cli::RunSettings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "multiscalar=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command line args
    let args: Vec<String> = env::args().collect();
    let (Some(input), Some(output)) = (args.get(1), args.get(2)) else {
        eprintln!("usage: multiscalar <input.json> <output.json> [config.json]");
        std::process::exit(2);
    };

    let settings = RunSettings::load(args.get(3).map(Path::new))?;
    let report = multiscalar_cli::run(Path::new(input), Path::new(output), &settings)?;

    tracing::info!(
        points = report.normalized.len(),
        factor = report.normalization_factor,
        output = %output,
        "analysis written"
    );
    Ok(())
}
