use std::{path::PathBuf, sync::OnceLock};

use clap::Parser;

/// Simulated CI/CD pipeline dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the config file.
    #[arg(short, long, default_value = "pipewatch.toml")]
    pub config: PathBuf,
    /// Path to a file with variables the config file can reference.
    #[arg(long, default_value = "pipewatch.vars.toml")]
    pub vars: PathBuf,
    /// Only list runs of this pipeline id, or `all`.
    #[arg(short, long, default_value = "all")]
    pub pipeline: String,
    /// Only list runs in this environment id, or `all`.
    #[arg(short, long, default_value = "all")]
    pub environment: String,
    /// Only list runs whose fields contain this text.
    #[arg(short, long, default_value = "")]
    pub search: String,
    /// Neither load nor write the build history snapshot.
    #[arg(long)]
    pub no_snapshot: bool,
}

static ARGS: OnceLock<Args> = OnceLock::new();

pub fn get_cli_args() -> &'static Args {
    ARGS.get_or_init(Args::parse)
}
