//! Error types shared by the submitter, the scheduler client and the launchers

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// Missing or invalid command line arguments
///
/// Reported with usage text and exit status 1, before the scheduler is ever invoked.
#[derive(Debug, PartialEq, Eq)]
pub struct UsageError {
    pub message: String,
}

impl UsageError {
    pub fn new(message: impl Into<String>) -> Self {
        UsageError { message: message.into() }
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "usage error: {}", self.message)
    }
}

impl std::error::Error for UsageError {}

/// Anything that went wrong talking to qsub or qstat
#[derive(Debug)]
pub enum SchedulerError {
    /// The program couldn't be started at all (usually not on PATH)
    Spawn { program: PathBuf, source: io::Error },
    /// The program ran and exited non-zero
    Failed { program: PathBuf, status: ExitStatus, stderr: String },
    /// qsub exited 0 but printed something that doesn't contain a job id
    UnparsableJobId(String),
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SchedulerError::Spawn { program, source } => {
                write!(f, "can't run {}: {}", program.display(), source)
            }
            SchedulerError::Failed { program, status, stderr } => {
                write!(f, "{} exited with {}: {}", program.display(), status, stderr.trim())
            }
            SchedulerError::UnparsableJobId(output) => {
                write!(f, "can't find a job id in qsub output {:?}", output)
            }
        }
    }
}

impl std::error::Error for SchedulerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SchedulerError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum LaunchError {
    Template(String),
    WriteScript { path: PathBuf, source: io::Error },
    Scheduler(SchedulerError),
    WaitTimedOut { elapsed: Duration, polls: u32 },
    WaitFailed(String),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LaunchError::Template(msg) => write!(f, "can't render job script: {}", msg),
            LaunchError::WriteScript { path, source } => {
                write!(f, "can't write job script {}: {}", path.display(), source)
            }
            LaunchError::Scheduler(err) => write!(f, "{}", err),
            LaunchError::WaitTimedOut { elapsed, polls } => write!(
                f,
                "gave up waiting for the scheduler address after {:.0?} ({} polls)",
                elapsed, polls
            ),
            LaunchError::WaitFailed(reason) => write!(f, "scheduler job failed: {}", reason),
        }
    }
}

impl std::error::Error for LaunchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LaunchError::WriteScript { source, .. } => Some(source),
            LaunchError::Scheduler(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SchedulerError> for LaunchError {
    fn from(err: SchedulerError) -> Self {
        LaunchError::Scheduler(err)
    }
}

impl From<tinytemplate::error::Error> for LaunchError {
    fn from(err: tinytemplate::error::Error) -> Self {
        LaunchError::Template(err.to_string())
    }
}
