//! IPTS stylus CLI entry point.

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ipts_stylus_cli::print::{PrintFilter, PrintSink};
use ipts_stylus_cli::runner::{DeviceRunner, FileRunner};
use ipts_stylus_cli::{Cli, Commands};
use ipts_stylus_core::{EventSink, StylusData};

/// Sink reporting stylus state transitions through the log.
///
/// Consumers are expected to diff consecutive states; this sink does
/// exactly that and reports the interesting edges, with full samples at
/// trace level.
#[derive(Debug, Default)]
struct LogSink {
    last: StylusData,
}

impl EventSink for LogSink {
    fn on_start(&mut self) {
        info!("processing started");
    }

    fn on_stop(&mut self) {
        info!("processing stopped");
    }

    fn on_stylus(&mut self, stylus: &StylusData) {
        if stylus.proximity != self.last.proximity {
            debug!("proximity: {}", stylus.proximity);
        }

        if stylus.contact != self.last.contact {
            debug!("contact: {}", stylus.contact);
        }

        if stylus.button != self.last.button {
            debug!("button: {}", stylus.button);
        }

        if stylus.rubber != self.last.rubber {
            debug!("rubber: {}", stylus.rubber);
        }

        tracing::trace!(
            "x: {:.4} y: {:.4} pressure: {:.3} altitude: {:.3} azimuth: {:.3}",
            stylus.x,
            stylus.y,
            stylus.pressure,
            stylus.altitude,
            stylus.azimuth,
        );

        self.last = *stylus;
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let mut runner = DeviceRunner::new(&args.device, LogSink::default())?;
            runner.run()?;
        }
        Commands::Print(args) => {
            let sink = PrintSink::new(PrintFilter::from(&args));
            let mut runner = FileRunner::new(&args.file, sink)?;
            runner.run()?;
        }
    }

    Ok(())
}
