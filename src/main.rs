use std::env;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use env_logger::Env;
use log::{error, info};

use crate::cli::{Cli, Command, LaunchClusterArgs, LaunchWorkerArgs, SubmitMaxJobsArgs};
use crate::config::SgeConfig;
use crate::error::UsageError;
use crate::launch::cluster::{launch_cluster, ClusterLaunch};
use crate::launch::wait::WaitPolicy;
use crate::launch::worker::{launch_workers, WorkerLaunch};
use crate::sge::client::Qsub;
use crate::submit::execute::execute;
use crate::submit::plan::{plan, SubmitConfig};

mod cli;
mod config;
mod error;
mod launch;
mod sge;
mod submit;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            process::exit(exit_code(&err));
        }
    };

    let subcommand = cli.command.name();
    if let Err(err) = run(cli).await {
        if err.downcast_ref::<UsageError>().is_some() {
            eprintln!("{}\n\n{}", err, usage(subcommand));
        } else {
            error!("{:#}", err);
        }
        process::exit(1);
    }
}

/// --help and --version are reported through clap errors too, but succeed
fn exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

/// Usage line of `subcommand`, or of the whole program if there is no such subcommand
fn usage(subcommand: &str) -> String {
    let mut cmd = Cli::command();
    cmd.build();
    match cmd.find_subcommand_mut(subcommand) {
        Some(sub) => sub.render_usage().to_string(),
        None => cmd.render_usage().to_string(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::LaunchWorker(args) => launch_worker(args, &cli.sge),
        Command::LaunchCluster(args) => launch_cluster_command(args, &cli.sge).await,
        Command::SubmitMaxJobs(args) => submit_max_jobs(args, &cli.sge),
    }
}

fn launch_worker(args: LaunchWorkerArgs, sge: &SgeConfig) -> Result<()> {
    let launch = WorkerLaunch {
        scheduler_address: args.address,
        njobs: args.njobs,
        ncore: args.ncore,
        local_directory: args.local_directory,
        qsub_args: args.qsub_args,
    };
    let client = Qsub::new(sge).context("Locating the working directory")?;
    let id = launch_workers(&launch, sge, &client).context("Launching dask workers")?;
    println!("{id}");
    Ok(())
}

async fn launch_cluster_command(args: LaunchClusterArgs, sge: &SgeConfig) -> Result<()> {
    let launch = ClusterLaunch {
        workers: args.workers,
        ncore: args.ncore,
        port: args.port,
        local_directory: args.local_directory,
        user: args.user,
        wait: WaitPolicy {
            interval: Duration::from_secs(args.poll_secs),
            timeout: Duration::from_secs(args.timeout_secs),
        },
        qsub_args: args.qsub_args,
    };
    let client = Qsub::new(sge).context("Locating the working directory")?;
    let cluster = launch_cluster(&launch, sge, &client)
        .await
        .context("Launching dask cluster")?;
    info!(
        "Scheduler job {} and worker job {} submitted",
        cluster.scheduler_job, cluster.worker_job
    );
    println!("{}", cluster.scheduler_address);
    Ok(())
}

fn submit_max_jobs(args: SubmitMaxJobsArgs, sge: &SgeConfig) -> Result<()> {
    let caller_dir = env::current_dir().context("Locating the current directory")?;
    let config = SubmitConfig {
        script: args.script,
        title: args.title,
        max_groups: args.max_jobs,
        files: args.files,
        split: args.split,
    }
    .anchored_at(&caller_dir);
    let plan = plan(&config)?;

    if args.dry_run {
        info!("--dry-run set, printing plan without submitting");
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    info!("Submitting {} jobs in {} groups", plan.job_count(), plan.groups.len());
    let client = Qsub::new(sge).context("Locating the working directory")?;
    let groups = execute(&plan, &client).context("Submitting jobs")?;
    for (group, submitted) in plan.groups.iter().zip(&groups) {
        info!("Group {} holds {} jobs", submitted.index, submitted.job_ids.len());
        for (job, id) in group.jobs.iter().zip(&submitted.job_ids) {
            println!("{} {}", job.name, id);
        }
    }
    Ok(())
}
