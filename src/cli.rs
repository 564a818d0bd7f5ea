use std::path::PathBuf;

use clap::{value_parser, Args, Parser, Subcommand};

use crate::config::SgeConfig;
use crate::submit::split::SplitStrategy;

/// Launch dask on a Sun Grid Engine cluster and throttle batch submissions
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub sge: SgeConfig,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit an array job of dask workers connected to a running scheduler
    LaunchWorker(LaunchWorkerArgs),
    /// Submit a dask scheduler, wait for its address, then submit workers for it
    LaunchCluster(LaunchClusterArgs),
    /// Submit one job per file with at most MAX_JOBS running at once
    SubmitMaxJobs(SubmitMaxJobsArgs),
}

impl Command {
    /// Name the subcommand is invoked by
    pub fn name(&self) -> &'static str {
        match self {
            Command::LaunchWorker(_) => "launch-worker",
            Command::LaunchCluster(_) => "launch-cluster",
            Command::SubmitMaxJobs(_) => "submit-max-jobs",
        }
    }
}

#[derive(Args, Debug)]
pub struct LaunchWorkerArgs {
    /// Scheduler address (hostname:port)
    pub address: String,

    /// Number of worker array tasks
    #[arg(value_parser = value_parser!(u32).range(1..))]
    pub njobs: u32,

    /// Threads per worker
    #[arg(value_parser = value_parser!(u32).range(1..), default_value_t = 1)]
    pub ncore: u32,

    /// Worker scratch directory on the compute node
    #[arg(long, env = "TMP", default_value = "/tmp")]
    pub local_directory: PathBuf,

    /// Extra arguments passed to qsub as they are
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub qsub_args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct LaunchClusterArgs {
    /// Number of worker array tasks
    #[arg(value_parser = value_parser!(u32).range(1..))]
    pub workers: u32,

    /// Threads per worker
    #[arg(long, value_parser = value_parser!(u32).range(1..), default_value_t = 1)]
    pub ncore: u32,

    /// Port for the dask scheduler to listen on (dask picks its default when unset)
    #[arg(long)]
    pub port: Option<u16>,

    /// Worker scratch directory on the compute node
    #[arg(long, env = "TMP", default_value = "/tmp")]
    pub local_directory: PathBuf,

    /// Owner of the jobs, used to filter qstat output
    #[arg(long, env = "USER")]
    pub user: String,

    /// Give up waiting for the scheduler address after this many seconds
    #[arg(long, default_value_t = 600)]
    pub timeout_secs: u64,

    /// Seconds between checks of the scheduler log
    #[arg(long, value_parser = value_parser!(u64).range(1..), default_value_t = 5)]
    pub poll_secs: u64,

    /// Extra arguments passed to qsub as they are, for both scheduler and workers
    #[arg(last = true)]
    pub qsub_args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct SubmitMaxJobsArgs {
    /// Job script, run with a single input file as its argument
    pub script: PathBuf,

    /// Job name prefix; jobs are named TITLE_GROUP-INDEX
    pub title: String,

    /// Maximum number of jobs running at the same time
    pub max_jobs: usize,

    /// Input files, one job each
    pub files: Vec<PathBuf>,

    /// How files are divided into hold-chained groups
    #[arg(long, value_enum, default_value_t = SplitStrategy::Balanced)]
    pub split: SplitStrategy,

    /// Print the submission plan as JSON instead of submitting
    #[arg(long)]
    pub dry_run: bool,
}
