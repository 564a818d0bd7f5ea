use std::path::PathBuf;

use clap::Args;

/// Settings shared by every subcommand that talks to the scheduler
#[derive(Args, Clone, Debug)]
pub struct SgeConfig {
    /// Path to the qsub binary
    #[arg(long, global = true, default_value = "qsub")]
    pub qsub: PathBuf,

    /// Path to the qstat binary
    #[arg(long, global = true, default_value = "qstat")]
    pub qstat: PathBuf,

    /// Directory for rendered job scripts and scheduler log files
    #[arg(long, global = true, default_value = ".")]
    pub work_dir: PathBuf,

    /// Hard wall-clock limit (h_rt) for worker and scheduler jobs
    #[arg(long, global = true, default_value = "04:00:00")]
    pub h_rt: String,

    /// SGE parallel environment used to request one slot per worker thread
    #[arg(long, global = true)]
    pub parallel_env: Option<String>,
}
