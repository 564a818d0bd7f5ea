use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use crate::error::SchedulerError;

/// A job identifier assigned by the scheduler at submission time
///
/// Never inspected, only handed back to qsub as a `-hold_jid` token or printed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything needed to submit a single job with qsub
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobSpec {
    pub name: String,
    pub script: PathBuf,
    /// Passed to the script untouched, so file names need not be UTF-8
    pub script_args: Vec<OsString>,
    /// Delay this job until the named job has finished
    pub hold_jid: Option<JobId>,
    /// Raw qsub arguments passed through from the command line
    pub extra_args: Vec<String>,
}

impl JobSpec {
    pub fn new(name: impl Into<String>, script: impl Into<PathBuf>) -> Self {
        JobSpec {
            name: name.into(),
            script: script.into(),
            script_args: Vec::new(),
            hold_jid: None,
            extra_args: Vec::new(),
        }
    }

    /// qsub arguments, in order: options first, then the script and its arguments
    pub fn qsub_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-terse".into(), "-N".into(), self.name.clone().into()];
        if let Some(hold) = &self.hold_jid {
            args.push("-hold_jid".into());
            args.push(hold.0.clone().into());
        }
        args.extend(self.extra_args.iter().map(OsString::from));
        args.push(self.script.clone().into_os_string());
        args.extend(self.script_args.iter().cloned());
        args
    }
}

/// One row of `qstat -u $USER`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobStatus {
    pub id: JobId,
    /// Raw state code, e.g. `qw`, `r`, `hqw`, `Eqw`
    pub state: String,
}

impl JobStatus {
    pub fn is_error(&self) -> bool {
        self.state.contains('E')
    }
}

/// Pull the job id out of qsub output
///
/// Accepts `-terse` output (`12345`, or `12345.1-4:1` for array jobs) as well as the
/// verbose `Your job 12345 ("name") has been submitted` and
/// `Your job-array 12345.1-4:1 ("name") has been submitted` forms.
pub fn parse_job_id(output: &str) -> Result<JobId, SchedulerError> {
    let token = match output.split_whitespace().collect::<Vec<_>>().as_slice() {
        ["Your", "job" | "job-array", id, ..] => *id,
        [id] => *id,
        _ => return Err(SchedulerError::UnparsableJobId(output.to_string())),
    };

    // array job ids carry the task range after a dot
    let id = token.split('.').next().unwrap_or_default();
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        Ok(JobId(id.to_string()))
    } else {
        Err(SchedulerError::UnparsableJobId(output.to_string()))
    }
}

/// Parse `qstat` output into job statuses
///
/// The first two lines are a column header and a dashed rule. An empty output means the
/// user has no jobs at all. Array jobs show one row per task, so ids may repeat.
pub fn parse_qstat(output: &str) -> Vec<JobStatus> {
    output
        .lines()
        .skip(2)
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            match columns.as_slice() {
                [id, _prior, _name, _user, state, ..] => Some(JobStatus {
                    id: JobId(id.to_string()),
                    state: state.to_string(),
                }),
                _ => None,
            }
        })
        .collect()
}
