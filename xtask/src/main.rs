use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the workspace tests through cargo nextest
    Test {
        #[arg(long)]
        profile: Option<String>,
        /// Extra filter passed through to nextest
        filter: Option<String>,
    },
    /// Check formatting and run clippy with warnings denied
    Lint,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Test { profile, filter } => run_tests(profile, filter)?,
        Commands::Lint => run_lint()?,
    }
    Ok(())
}

fn run_tests(profile: Option<String>, filter: Option<String>) -> Result<()> {
    let mut cmd = Command::new(cargo());
    cmd.args(["nextest", "run", "--workspace"]);
    if let Some(profile) = profile {
        cmd.arg("--profile").arg(profile);
    }
    if let Some(filter) = filter {
        cmd.arg(filter);
    }
    run(cmd, "cargo nextest run")
}

fn run_lint() -> Result<()> {
    let mut fmt = Command::new(cargo());
    fmt.args(["fmt", "--all", "--", "--check"]);
    run(fmt, "cargo fmt --check")?;

    let mut clippy = Command::new(cargo());
    clippy.args(["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]);
    run(clippy, "cargo clippy")
}

fn cargo() -> String {
    std::env::var("CARGO").unwrap_or_else(|_| "cargo".into())
}

fn run(mut cmd: Command, label: &str) -> Result<()> {
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{label} failed");
    }
    Ok(())
}
