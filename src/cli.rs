use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::logging::LogArgs;
use crate::simulate::ObserverParams;

#[derive(Debug, Parser)]
#[command(
    name = "visual-search",
    version,
    about = "Visual search experiment: find the T among rotated Ls"
)]
pub struct Cli {
    #[command(flatten)]
    pub log: LogArgs,

    /// JSON config file, written with defaults if missing
    #[arg(long, short, global = true, default_value = "visual_search.json")]
    pub config: PathBuf,

    /// Seed for stimulus generation, random if omitted
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a session in a window
    Run(SessionArgs),
    /// Run a session headless against a simulated observer
    Simulate {
        #[command(flatten)]
        session: SessionArgs,
        #[command(flatten)]
        observer: ObserverArgs,
    },
    /// Print freshly assembled blocks as JSON
    Preview {
        #[arg(long, default_value_t = 1)]
        blocks: usize,
    },
}

#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    /// Participant identifier written to every record
    #[arg(long, short)]
    pub subject: String,

    /// Overrides `data_directory` from the config file
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct ObserverArgs {
    /// Probability of a correct response
    #[arg(long, default_value_t = 0.95)]
    pub accuracy: f64,

    #[arg(long, default_value_t = 450.0)]
    pub base_rt_ms: f64,

    /// Extra response time per display item
    #[arg(long, default_value_t = 25.0)]
    pub slope_ms: f64,

    #[arg(long, default_value_t = 60.0)]
    pub jitter_ms: f64,
}

impl ObserverArgs {
    pub fn params(&self) -> ObserverParams {
        ObserverParams {
            accuracy: self.accuracy,
            base_rt_ms: self.base_rt_ms,
            slope_ms: self.slope_ms,
            jitter_ms: self.jitter_ms,
        }
    }
}
