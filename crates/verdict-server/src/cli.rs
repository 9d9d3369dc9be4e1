use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "verdict-server")]
#[command(author, version, about = "Verdict spam and churn prediction service", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "VERDICT_CONFIG", default_value = "verdict.yaml")]
    pub config: PathBuf,

    /// Listen address
    #[arg(short = 'l', long, env = "VERDICT_LISTEN")]
    pub listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long, env = "VERDICT_PORT")]
    pub port: Option<u16>,

    /// Directory holding model artifacts and datasets
    #[arg(short, long, env = "VERDICT_ARTIFACTS_DIR")]
    pub artifacts_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
