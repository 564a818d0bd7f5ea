use std::fs;
use std::path::PathBuf;

use log::{info, warn};

use crate::config::SgeConfig;
use crate::error::LaunchError;
use crate::launch::wait::{wait_until, Check, WaitOutcome, WaitPolicy};
use crate::launch::worker::{launch_workers, WorkerLaunch};
use crate::sge::client::SchedulerClient;
use crate::sge::job::{JobId, JobSpec};
use crate::sge::template::{HeaderContext, JobScript, SchedulerContext};

pub const SCHEDULER_JOB_NAME: &str = "dask-scheduler";

/// A dask scheduler job plus `workers` worker array tasks pointed at it
#[derive(Clone, Debug)]
pub struct ClusterLaunch {
    pub workers: u32,
    pub ncore: u32,
    pub port: Option<u16>,
    pub local_directory: PathBuf,
    /// Owner of the jobs, used to filter qstat
    pub user: String,
    pub wait: WaitPolicy,
    /// Raw qsub arguments applied to both the scheduler and the worker jobs
    pub qsub_args: Vec<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Cluster {
    pub scheduler_job: JobId,
    pub scheduler_address: String,
    pub worker_job: JobId,
}

/// Submit the scheduler, wait for it to report its address, then submit the workers
///
/// A timeout or a scheduler job that disappears without an address leaves the scheduler job
/// as it is; no workers are submitted.
pub async fn launch_cluster(
    launch: &ClusterLaunch,
    config: &SgeConfig,
    client: &dyn SchedulerClient,
) -> Result<Cluster, LaunchError> {
    let scheduler_job = submit_scheduler(launch, config, client)?;

    let log_path = config.work_dir.join(format!("{}.o{}", SCHEDULER_JOB_NAME, scheduler_job));
    info!("Waiting for scheduler address in {}", log_path.display());

    let read_address = || {
        fs::read_to_string(&log_path)
            .ok()
            .and_then(|log| scheduler_address(&log))
    };

    // qstat runs synchronously on the runtime thread. The wait is the only task in the process,
    // so the blocking call only delays the next poll; other tasks get the thread between polls.
    let check = || {
        if let Some(address) = read_address() {
            return Check::Ready(address);
        }
        match client.jobs(&launch.user) {
            Ok(jobs) => match jobs.iter().find(|job| job.id == scheduler_job) {
                Some(job) if job.is_error() => {
                    Check::Failed(format!("job {} is in error state {}", job.id, job.state))
                }
                Some(_) => Check::Pending,
                // the job may have written its address and exited between the two checks
                None => match read_address() {
                    Some(address) => Check::Ready(address),
                    None => Check::Failed(format!(
                        "job {} left the queue before reporting an address",
                        scheduler_job
                    )),
                },
            },
            Err(err) => {
                warn!("Can't check scheduler job state: {err}");
                Check::Pending
            }
        }
    };

    let scheduler_address = match wait_until(&launch.wait, check).await {
        WaitOutcome::Ready(address) => address,
        WaitOutcome::TimedOut { elapsed, polls } => {
            warn!("Scheduler job {scheduler_job} is still queued, cancel it with qdel if it's no longer needed");
            return Err(LaunchError::WaitTimedOut { elapsed, polls });
        }
        WaitOutcome::Failed(reason) => return Err(LaunchError::WaitFailed(reason)),
    };
    info!("Scheduler at {scheduler_address}");

    let workers = WorkerLaunch {
        scheduler_address: scheduler_address.clone(),
        njobs: launch.workers,
        ncore: launch.ncore,
        local_directory: launch.local_directory.clone(),
        qsub_args: launch.qsub_args.clone(),
    };
    let worker_job = launch_workers(&workers, config, client)?;

    Ok(Cluster { scheduler_job, scheduler_address, worker_job })
}

fn submit_scheduler(
    launch: &ClusterLaunch,
    config: &SgeConfig,
    client: &dyn SchedulerClient,
) -> Result<JobId, LaunchError> {
    let header = HeaderContext {
        name: SCHEDULER_JOB_NAME.to_string(),
        h_rt: config.h_rt.clone(),
        array_tasks: None,
        parallel_env: None,
        slots: 1,
    };
    let script = JobScript::scheduler(&header, &SchedulerContext { port: launch.port })?;
    let path = script.write(&config.work_dir)?;

    let mut spec = JobSpec::new(SCHEDULER_JOB_NAME, path);
    spec.extra_args = launch.qsub_args.clone();
    let id = client.submit(&spec)?;
    info!("Scheduler job id: {id}");
    Ok(id)
}

/// Address from the first `Scheduler at` line of a dask-scheduler log
///
/// dask logs e.g. `distributed.scheduler - INFO -   Scheduler at:   tcp://10.0.0.1:8786`.
pub fn scheduler_address(log: &str) -> Option<String> {
    log.lines().find_map(|line| {
        let (_, rest) = line.split_once("Scheduler at")?;
        rest.trim_start_matches(|c: char| c == ':' || c.is_whitespace())
            .split_whitespace()
            .next()
            .map(str::to_string)
    })
}
