use std::env;
use std::path::PathBuf;

use log::{info, warn};

use crate::config::SgeConfig;
use crate::error::LaunchError;
use crate::sge::client::SchedulerClient;
use crate::sge::job::{JobId, JobSpec};
use crate::sge::template::{HeaderContext, JobScript, WorkerContext};

pub const WORKER_JOB_NAME: &str = "dask-worker";

/// An array job of `njobs` dask workers, each with `ncore` threads
#[derive(Clone, Debug)]
pub struct WorkerLaunch {
    /// `hostname:port` or `tcp://hostname:port` of a running dask scheduler
    pub scheduler_address: String,
    pub njobs: u32,
    pub ncore: u32,
    /// Worker scratch space on the compute node
    pub local_directory: PathBuf,
    pub qsub_args: Vec<String>,
}

/// Render the worker script, write it to the working directory and submit it as an array job
pub fn launch_workers(
    launch: &WorkerLaunch,
    config: &SgeConfig,
    client: &dyn SchedulerClient,
) -> Result<JobId, LaunchError> {
    if which("dask-worker").is_none() {
        warn!("Can't find 'dask-worker'");
    }

    let header = HeaderContext {
        name: WORKER_JOB_NAME.to_string(),
        h_rt: config.h_rt.clone(),
        array_tasks: Some(launch.njobs),
        parallel_env: config.parallel_env.clone(),
        slots: launch.ncore,
    };
    let worker = WorkerContext {
        scheduler_address: launch.scheduler_address.clone(),
        ncore: launch.ncore,
        local_directory: launch.local_directory.display().to_string(),
    };
    let script = JobScript::worker(&header, &worker)?;
    let path = script.write(&config.work_dir)?;

    let mut spec = JobSpec::new(WORKER_JOB_NAME, path);
    spec.extra_args = launch.qsub_args.clone();

    info!(
        "Submitting {} workers with {} cores each for scheduler {}",
        launch.njobs, launch.ncore, launch.scheduler_address
    );
    let id = client.submit(&spec)?;
    info!("Worker array job id: {id}");
    Ok(id)
}

/// First match for `cmd` on PATH
fn which(cmd: &str) -> Option<PathBuf> {
    env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths).find_map(|dir| {
            let full_path = dir.join(cmd);
            if full_path.is_file() {
                Some(full_path)
            } else {
                None
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::sge::client::Qsub;
    use crate::sge::testing::{fake_binary, relative_tempdir, RecordingClient};

    fn config(work_dir: PathBuf) -> SgeConfig {
        SgeConfig {
            qsub: PathBuf::from("qsub"),
            qstat: PathBuf::from("qstat"),
            work_dir,
            h_rt: "03:00:00".to_string(),
            parallel_env: Some("smp".to_string()),
        }
    }

    #[test]
    fn submits_one_array_job() {
        let dir = tempfile::tempdir().expect("temp dir");
        let client = RecordingClient::new(42);
        let launch = WorkerLaunch {
            scheduler_address: "node1:8786".to_string(),
            njobs: 6,
            ncore: 2,
            local_directory: PathBuf::from("/scratch/tmp"),
            qsub_args: vec!["-q".to_string(), "short.q".to_string()],
        };

        let id = launch_workers(&launch, &config(dir.path().to_path_buf()), &client).unwrap();
        assert_eq!(id, JobId("42".into()));

        let submitted = client.submitted.borrow();
        assert_eq!(submitted.len(), 1);
        let spec = &submitted[0];
        assert_eq!(spec.name, "dask-worker");
        assert_eq!(spec.script, dir.path().join("dask-worker.sh"));
        assert_eq!(spec.extra_args, vec!["-q", "short.q"]);
        assert_eq!(spec.hold_jid, None);

        let script = fs::read_to_string(&spec.script).unwrap();
        assert!(script.contains("#$ -t 1-6\n"));
        assert!(script.contains("#$ -pe smp 2\n"));
        assert!(script.contains("#$ -l h_rt=03:00:00\n"));
        assert!(script.contains("dask-worker \"node1:8786\" --nthreads 2 --local-directory \"/scratch/tmp\""));
    }

    #[test]
    fn missing_work_dir_fails_before_submitting() {
        let client = RecordingClient::new(1);
        let launch = WorkerLaunch {
            scheduler_address: "node1:8786".to_string(),
            njobs: 1,
            ncore: 1,
            local_directory: PathBuf::from("/tmp"),
            qsub_args: Vec::new(),
        };

        let result = launch_workers(&launch, &config(PathBuf::from("/nonexistent/qdask")), &client);
        assert!(matches!(result, Err(LaunchError::WriteScript { .. })));
        assert!(client.submitted.borrow().is_empty());
    }

    #[test]
    fn relative_work_dir_hands_qsub_a_script_that_exists() {
        let (_dir, relative) = relative_tempdir();
        let work_dir = relative.join("jobs");
        fs::create_dir(&work_dir).unwrap();
        assert!(work_dir.is_relative());

        // fails unless its last argument names a file, seen from the work dir it runs in
        let qsub = fake_binary(
            &relative,
            "qsub",
            "for last in \"$@\"; do :; done\n\
             [ -f \"$last\" ] || { echo \"no such script $last in $(pwd)\" >&2; exit 1; }\n\
             echo 77",
        );
        let mut sge = config(work_dir.clone());
        sge.qsub = qsub;
        let client = Qsub::new(&sge).unwrap();

        let launch = WorkerLaunch {
            scheduler_address: "node1:8786".to_string(),
            njobs: 2,
            ncore: 1,
            local_directory: PathBuf::from("/tmp"),
            qsub_args: Vec::new(),
        };
        assert_eq!(launch_workers(&launch, &sge, &client).unwrap(), JobId("77".into()));
        assert!(work_dir.join("dask-worker.sh").is_file());
    }

    #[test]
    fn which_finds_nothing_for_nonsense() {
        assert!(which("qdask-no-such-binary-anywhere").is_none());
    }
}
