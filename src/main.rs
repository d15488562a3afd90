use std::env;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use rstree::cli::{execute_command, output, Cli};

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.debug);

    if let Err(e) = execute_command(&cli) {
        output::error(&e);
        std::process::exit(e.exit_code());
    }
}

/// `-d` count to log level; anything past `-ddd` stays at trace.
fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn setup_logging(verbosity: u8) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE);

    // Without -d, RUST_LOG selects the filter
    if verbosity == 0 && env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::registry()
            .with(fmt_layer.with_filter(EnvFilter::from_default_env()))
            .init();
        return;
    }

    let level = level_for(verbosity);
    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(level))
        .init();
    if verbosity > 3 {
        output::warning(&format!("-d given {} times, logging at trace", verbosity));
    }
    tracing::info!(%level, "rstree logging enabled");
}
