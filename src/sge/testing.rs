use std::cell::RefCell;
use std::collections::VecDeque;
use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::error::SchedulerError;
use crate::sge::client::SchedulerClient;
use crate::sge::job::{JobId, JobSpec, JobStatus};

/// In-memory scheduler that hands out sequential job ids and remembers every submission
pub struct RecordingClient {
    next_id: RefCell<u32>,
    pub submitted: RefCell<Vec<JobSpec>>,
    /// Submission number (0-based) that fails instead of returning an id
    pub fail_at: Option<usize>,
    /// Successive answers for `jobs`; the last one repeats once the queue is drained
    pub qstat: RefCell<VecDeque<Vec<JobStatus>>>,
    pub qstat_calls: RefCell<u32>,
}

impl RecordingClient {
    pub fn new(first_id: u32) -> Self {
        RecordingClient {
            next_id: RefCell::new(first_id),
            submitted: RefCell::new(Vec::new()),
            fail_at: None,
            qstat: RefCell::new(VecDeque::new()),
            qstat_calls: RefCell::new(0),
        }
    }
}

impl SchedulerClient for RecordingClient {
    fn submit(&self, spec: &JobSpec) -> Result<JobId, SchedulerError> {
        let mut submitted = self.submitted.borrow_mut();
        if self.fail_at == Some(submitted.len()) {
            return Err(SchedulerError::UnparsableJobId("qsub: denied".to_string()));
        }
        submitted.push(spec.clone());

        let mut next = self.next_id.borrow_mut();
        let id = JobId(next.to_string());
        *next += 1;
        Ok(id)
    }

    fn jobs(&self, _user: &str) -> Result<Vec<JobStatus>, SchedulerError> {
        *self.qstat_calls.borrow_mut() += 1;
        let mut answers = self.qstat.borrow_mut();
        let answer = if answers.len() > 1 {
            answers.pop_front().unwrap_or_default()
        } else {
            answers.front().cloned().unwrap_or_default()
        };
        Ok(answer)
    }
}

/// Write an executable shell script standing in for qsub or qstat
pub fn fake_binary(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write fake binary");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

/// A scratch directory under the current one, plus its path relative to the current one
pub fn relative_tempdir() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir_in(".").expect("temp dir");
    let cwd = env::current_dir().expect("current dir");
    let relative = dir.path().strip_prefix(&cwd).unwrap_or(dir.path()).to_path_buf();
    (dir, relative)
}
