use std::path::Path;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use subsplit::{Git, NoProgress, Progress, SplitConfig};

#[derive(Parser)]
#[command(name = "subsplit")]
#[command(about = "Extract a subdirectory's history into a standalone commit graph")]
struct Cli {
    /// Subdirectory whose history to extract, relative to the repository root
    #[arg(short = 'P', long)]
    prefix: String,

    /// Existing split history to scan for provenance markers before synthesizing
    #[arg(long)]
    reference: Option<String>,

    /// Suppress the progress meter
    #[arg(short, long)]
    quiet: bool,

    /// Revision to split from
    #[arg(default_value = "HEAD")]
    start: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let git = Git::discover(Path::new("."))?;
    let config = SplitConfig {
        prefix: cli.prefix,
        start: cli.start,
        reference: cli.reference,
    };

    let mut meter: Box<dyn Progress> = if cli.quiet {
        Box::new(NoProgress)
    } else {
        Box::new(StderrProgress::new())
    };

    match subsplit::split(&git, &config, meter.as_mut())? {
        Some(id) => {
            // The identifier is the program's only stdout output.
            println!("{id}");
            Ok(())
        }
        None => {
            eprintln!(
                "no commits touch '{}' from {}",
                config.prefix, config.start
            );
            std::process::exit(1);
        }
    }
}

/// Progress meter on stderr: count, percentage, coarse ETA.
struct StderrProgress {
    started: Instant,
}

impl StderrProgress {
    fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Progress for StderrProgress {
    fn commit_processed(&mut self, done: usize, total: usize, _skipped: bool) {
        let pct = done * 100 / total.max(1);
        let elapsed = self.started.elapsed().as_secs_f64();
        let eta = (elapsed / done as f64 * (total - done) as f64) as u64;
        eprint!("\r{done}/{total} ({pct}%) eta {eta}s ");
        if done == total {
            eprintln!();
        }
    }
}
