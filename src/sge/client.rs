use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use log::{debug, info};

use crate::config::SgeConfig;
use crate::error::SchedulerError;
use crate::sge::job::{parse_job_id, parse_qstat, JobId, JobSpec, JobStatus};

/// A narrow interface to the batch scheduler
///
/// Planning and launching code only ever sees this trait, so it can be exercised without a
/// grid engine installed.
pub trait SchedulerClient {
    /// Submit a job and return the id the scheduler gave it
    fn submit(&self, spec: &JobSpec) -> Result<JobId, SchedulerError>;

    /// List the jobs the scheduler currently knows about for `user`
    fn jobs(&self, user: &str) -> Result<Vec<JobStatus>, SchedulerError>;
}

/// Runs the real qsub / qstat binaries
///
/// The binaries run inside the working directory (job scripts use `-cwd`, so that is where
/// logs land), but every path they receive was given relative to the directory `qdask` was
/// started from. Those paths are made absolute against that directory.
pub struct Qsub {
    qsub: PathBuf,
    qstat: PathBuf,
    work_dir: PathBuf,
    caller_dir: PathBuf,
}

impl Qsub {
    pub fn new(config: &SgeConfig) -> io::Result<Self> {
        let caller_dir = env::current_dir()?;
        Ok(Qsub {
            qsub: resolve_program(&caller_dir, &config.qsub),
            qstat: resolve_program(&caller_dir, &config.qstat),
            work_dir: caller_dir.join(&config.work_dir),
            caller_dir,
        })
    }

    fn run(&self, program: &Path, args: &[OsString]) -> Result<Output, SchedulerError> {
        let mut command = Command::new(program);
        let cmd = command.args(args).current_dir(&self.work_dir);
        debug!("{:?}", &cmd);

        let output = cmd.output().map_err(|source| SchedulerError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(SchedulerError::Failed {
                program: program.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
    }
}

impl SchedulerClient for Qsub {
    fn submit(&self, spec: &JobSpec) -> Result<JobId, SchedulerError> {
        info!("Running qsub for job {}", spec.name);
        let mut spec = spec.clone();
        spec.script = self.caller_dir.join(&spec.script);
        let output = self.run(&self.qsub, &spec.qsub_args())?;
        parse_job_id(&String::from_utf8_lossy(&output.stdout))
    }

    fn jobs(&self, user: &str) -> Result<Vec<JobStatus>, SchedulerError> {
        let args: Vec<OsString> = vec!["-u".into(), user.into()];
        let output = self.run(&self.qstat, &args)?;
        Ok(parse_qstat(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Bare names like `qsub` are looked up on PATH; anything with a directory is pinned to `base`
fn resolve_program(base: &Path, program: &Path) -> PathBuf {
    if program.components().count() > 1 {
        base.join(program)
    } else {
        program.to_path_buf()
    }
}
