// main.rs
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;

use rincron::daemon::Daemon;
use rincron::logging::FileSink;

/// A privilege-dropping inotify supervisor: watch files and directories, spawn commands as a
/// target user when they change.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to the JSON configuration document.
    #[arg(long)]
    config: PathBuf,

    /// Path to the event log sink.
    #[arg(long)]
    log: PathBuf,
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let config_text = match fs::read_to_string(&args.config) {
        Ok(text) => text,
        Err(err) => {
            log::error!("unable to read {}: {}", args.config.display(), err);
            process::exit(1);
        }
    };

    let mut sink = match FileSink::open(&args.log) {
        Ok(sink) => sink,
        Err(err) => {
            log::error!("unable to open {}: {}", args.log.display(), err);
            process::exit(1);
        }
    };

    let mut daemon = match Daemon::start(&config_text, &mut sink) {
        Ok(daemon) => daemon,
        Err(err) => {
            log::error!("failed to start: {}", err);
            process::exit(1);
        }
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        if let Err(err) = signal_hook::flag::register(signal, Arc::clone(&shutdown)) {
            log::error!("unable to install signal handler: {}", err);
            process::exit(1);
        }
    }

    daemon.run(&shutdown, &mut sink);
    daemon.shutdown();
}
