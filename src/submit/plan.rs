use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::error::UsageError;
use crate::submit::split::SplitStrategy;

/// Immutable submission parameters
#[derive(Clone, Debug)]
pub struct SubmitConfig {
    /// Job script, run once per file with the file path as its only argument
    pub script: PathBuf,
    /// Prefix of every job name
    pub title: String,
    /// Upper bound on concurrently running jobs (number of hold chains)
    pub max_groups: usize,
    pub files: Vec<PathBuf>,
    pub split: SplitStrategy,
}

impl SubmitConfig {
    /// Pin the script and every input file to `base`
    ///
    /// qsub runs inside the working directory, so paths the user typed relative to where they
    /// ran the command would otherwise be looked up there. Absolute paths are left alone.
    pub fn anchored_at(mut self, base: &Path) -> Self {
        self.script = base.join(&self.script);
        self.files = self.files.iter().map(|file| base.join(file)).collect();
        self
    }
}

/// One job to submit, before the scheduler has given it an id
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlannedJob {
    pub name: String,
    pub file: PathBuf,
    /// 1-based position inside its group; every job after the first holds on its predecessor
    pub index: usize,
}

impl PlannedJob {
    pub fn holds_on_previous(&self) -> bool {
        self.index > 1
    }
}

/// A chain of jobs that run one after another
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobGroup {
    /// 1-based group number, part of every job name in the group
    pub index: usize,
    pub jobs: Vec<PlannedJob>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub script: PathBuf,
    pub split: SplitStrategy,
    pub groups: Vec<JobGroup>,
}

impl Plan {
    pub fn job_count(&self) -> usize {
        self.groups.iter().map(|g| g.jobs.len()).sum()
    }
}

/// Assign every file to exactly one group, keeping input order
///
/// Groups are contiguous runs of the input, so walking groups in order and jobs in order
/// visits files in the order they were given. Job names are `<title>_<group>-<index>`.
pub fn plan(config: &SubmitConfig) -> Result<Plan, UsageError> {
    if config.max_groups < 1 {
        return Err(UsageError::new("max_jobs must be at least 1"));
    }
    if config.files.is_empty() {
        warn!("No input files given, nothing to submit");
    }

    let sizes = config.split.group_sizes(config.files.len(), config.max_groups);
    info!(
        "Splitting {} files into {} groups ({} split, at most {})",
        config.files.len(),
        sizes.len(),
        config.split,
        config.max_groups
    );

    let mut files = config.files.iter();
    let groups = sizes
        .iter()
        .enumerate()
        .map(|(g, &size)| {
            let group = g + 1;
            let jobs = files
                .by_ref()
                .take(size)
                .enumerate()
                .map(|(i, file)| PlannedJob {
                    name: format!("{}_{}-{}", config.title, group, i + 1),
                    file: file.clone(),
                    index: i + 1,
                })
                .collect();
            JobGroup { index: group, jobs }
        })
        .collect();

    Ok(Plan { script: config.script.clone(), split: config.split, groups })
}
