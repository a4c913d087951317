use clap::Parser;
use std::path::PathBuf;

const DEFAULT_STATE_PATH: &str = ".slurm_state.json";

#[derive(Debug, Parser)]
#[command(
    name = "slurmsim",
    author,
    version,
    about = "A batch-workload scheduler simulator for a heterogeneous compute cluster."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML config file supplying defaults for `run`
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the persisted state document
    #[arg(short, long, global = true, default_value = DEFAULT_STATE_PATH)]
    pub state: PathBuf,

    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,
}

#[derive(Debug, Parser)]
pub enum Commands {
    /// Enqueue one PENDING job
    Submit(SubmitArgs),
    /// Print the current simulated time and one line per job
    Squeue(SqueueArgs),
    /// Provision nodes (if needed) and alternate try_schedule/advance_time
    Run(RunArgs),
    /// Bulk-submit jobs from a JSON array file
    LoadSamples(LoadSamplesArgs),
}

#[derive(Debug, Parser)]
pub struct SubmitArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub minutes: u64,
    #[arg(long)]
    pub cpus: u32,
    #[arg(long, default_value_t = 0)]
    pub gpus: u32,
    #[arg(long, default_value_t = 0)]
    pub priority: i64,
}

#[derive(Debug, Parser)]
pub struct SqueueArgs {
    /// Force the plain `<id> <state> <name> ...` line format even on a terminal
    #[arg(long)]
    pub plain: bool,
}

#[derive(Debug, Parser)]
pub struct RunArgs {
    #[arg(long)]
    pub nodes: Option<u32>,
    #[arg(long)]
    pub cpus_per_node: Option<u32>,
    #[arg(long)]
    pub gpus_per_node: Option<u32>,
    #[arg(long)]
    pub policy: Option<String>,
    #[arg(long)]
    pub tick: Option<u64>,
    #[arg(long)]
    pub duration: Option<u64>,
}

#[derive(Debug, Parser)]
pub struct LoadSamplesArgs {
    #[arg(long)]
    pub path: PathBuf,
}
