use log::{info, warn};

use crate::error::SchedulerError;
use crate::sge::client::SchedulerClient;
use crate::sge::job::{JobId, JobSpec};
use crate::submit::plan::Plan;

/// Job ids the scheduler returned for one group, in submission order
#[derive(Debug, PartialEq, Eq)]
pub struct SubmittedGroup {
    pub index: usize,
    pub job_ids: Vec<JobId>,
}

/// Submit every planned job, chaining each job onto the previous one in its group
///
/// Stops at the first failure. Nothing already submitted is cancelled; those ids are logged
/// so they can be removed with qdel.
pub fn execute(plan: &Plan, client: &dyn SchedulerClient) -> Result<Vec<SubmittedGroup>, SchedulerError> {
    let mut submitted: Vec<SubmittedGroup> = Vec::with_capacity(plan.groups.len());

    for group in &plan.groups {
        submitted.push(SubmittedGroup { index: group.index, job_ids: Vec::new() });

        for job in &group.jobs {
            let mut spec = JobSpec::new(job.name.clone(), plan.script.clone());
            spec.script_args.push(job.file.clone().into_os_string());
            if job.holds_on_previous() {
                spec.hold_jid = submitted.last().and_then(|g| g.job_ids.last()).cloned();
            }

            match client.submit(&spec) {
                Ok(id) => {
                    match &spec.hold_jid {
                        Some(hold) => info!("Submitted {} as job {id}, held on {hold}", job.name),
                        None => info!("Submitted {} as job {id}", job.name),
                    }
                    if let Some(g) = submitted.last_mut() {
                        g.job_ids.push(id);
                    }
                }
                Err(err) => {
                    warn_left_running(&submitted);
                    return Err(err);
                }
            }
        }
    }

    Ok(submitted)
}

fn warn_left_running(submitted: &[SubmittedGroup]) {
    let ids: Vec<String> = submitted
        .iter()
        .flat_map(|g| &g.job_ids)
        .map(|id| id.to_string())
        .collect();
    if !ids.is_empty() {
        warn!("Submission aborted, these jobs are still queued: {}", ids.join(" "));
    }
}
