use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use megastring::app::pipeline::Pipeline;
use megastring::app::watch::ChangeWatcher;
use megastring::infra::clipboard::{ClipboardSink, StdoutSink, SystemClipboard};
use megastring::infra::config::Config;
use megastring::infra::signal;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Concatenate the files named in a path list and keep the result on the clipboard",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Path-list file, one file or directory per line
    #[arg(long, short = 's', value_name = "FILE")]
    sources: Option<PathBuf>,
    /// Minimum time between rebuilds triggered by edits
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,
    /// Build once and exit instead of watching
    #[arg(long)]
    once: bool,
    /// Write the mega string to stdout instead of the clipboard
    #[arg(long)]
    stdout: bool,
    /// More log output
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    verbose: bool,
    /// Only log warnings and errors
    #[arg(long, short = 'q')]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "megastring", &mut io::stdout());
        return Ok(());
    }

    let level = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "warn",
        _ => "info",
    };
    megastring::init(level);

    let config = Config::load()
        .context("failed to load configuration")?
        .with_overrides(cli.sources.clone(), cli.debounce_ms);
    let base = std::env::current_dir().context("unable to determine working directory")?;
    let sources = base.join(config.sources.file());

    if cli.stdout {
        serve(&cli, &config, Pipeline::new(sources, base, StdoutSink))
    } else {
        let clipboard = SystemClipboard::new(config.clipboard.command_fallback());
        serve(&cli, &config, Pipeline::new(sources, base, clipboard))
    }
}

fn serve<S: ClipboardSink>(cli: &Cli, config: &Config, mut pipeline: Pipeline<S>) -> Result<()> {
    if cli.once {
        pipeline.run().context("initial build failed")?;
        pipeline.hand_off();
        return Ok(());
    }

    // Installed before the first build so an early Ctrl-C still shuts down cleanly.
    let shutdown = signal::interrupt_channel().context("failed to install Ctrl-C handler")?;
    pipeline.run().context("initial build failed")?;
    let watcher = ChangeWatcher::new(pipeline.sources(), config.watch.debounce())
        .context("failed to start watching the path list")?;
    tracing::info!(
        path = %watcher.target().display(),
        debounce_ms = config.watch.debounce_ms(),
        "watching for changes, press Ctrl+C to stop"
    );

    watcher.run(&shutdown, || {
        if let Err(err) = pipeline.run() {
            tracing::error!(error = %err, "rebuild failed, clipboard left unchanged");
        }
    })?;

    pipeline.hand_off();
    tracing::info!("stopped watching");
    Ok(())
}
