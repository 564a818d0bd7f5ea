use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::error::LaunchError;

/// A rendered job script, ready to be written to disk and handed to qsub
///
/// The script is the `#$` directive header followed by the command body.
pub struct JobScript {
    pub name: String,
    header: Header,
    body: Body,
}

/// Rendered `#$` directive header
///
/// qsub reads options from `#$` lines before the first command:
/// - job name, working directory and joined stdout/stderr (log is `<name>.o<job_id>`)
/// - hard wall-clock limit (h_rt), enforced by the scheduler
/// - array task range, for worker jobs
/// - parallel environment slots, when a parallel environment is configured
struct Header {
    content: String,
}

/// Rendered commands run by the job
struct Body {
    content: String,
}

/// Rendering context for the header
#[derive(Serialize)]
pub struct HeaderContext {
    pub name: String,
    pub h_rt: String,
    pub array_tasks: Option<u32>,
    pub parallel_env: Option<String>,
    pub slots: u32,
}

/// Rendering context for a dask worker body
#[derive(Serialize)]
pub struct WorkerContext {
    pub scheduler_address: String,
    pub ncore: u32,
    pub local_directory: String,
}

/// Rendering context for a dask scheduler body
#[derive(Serialize)]
pub struct SchedulerContext {
    pub port: Option<u16>,
}

#[derive(Serialize)]
struct TimestampedHeader<'a> {
    #[serde(flatten)]
    header: &'a HeaderContext,
    time_now: String,
}

impl JobScript {
    pub fn worker(header: &HeaderContext, worker: &WorkerContext) -> Result<JobScript, LaunchError> {
        /// included worker template
        static WORKER: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/worker.txt"));
        Ok(JobScript {
            name: header.name.clone(),
            header: render_header(header)?,
            body: Body { content: render("worker", WORKER, worker)? },
        })
    }

    pub fn scheduler(header: &HeaderContext, scheduler: &SchedulerContext) -> Result<JobScript, LaunchError> {
        /// included scheduler template
        static SCHEDULER: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/scheduler.txt"));
        Ok(JobScript {
            name: header.name.clone(),
            header: render_header(header)?,
            body: Body { content: render("scheduler", SCHEDULER, scheduler)? },
        })
    }

    /// Header then body; qsub stops reading directives at the first command
    pub fn content(&self) -> String {
        format!("{}{}", self.header.content, self.body.content)
    }

    /// Write the complete script to `<dir>/<name>.sh`, replacing any earlier script
    pub fn write(&self, dir: &Path) -> Result<PathBuf, LaunchError> {
        let path = dir.join(format!("{}.sh", self.name));
        if path.exists() {
            warn!("Job script {} already exists, it will be overwritten", path.display());
        }
        info!("Writing job script to {}", path.display());

        let write = |path: &Path| -> std::io::Result<()> {
            let mut file = File::create(path)?;
            file.write_all(self.content().as_bytes())
        };

        write(&path).map_err(|source| LaunchError::WriteScript { path: path.clone(), source })?;
        Ok(path)
    }
}

/// Render the `#$` header, stamped with the current time
fn render_header(context: &HeaderContext) -> Result<Header, LaunchError> {
    /// included header template
    static HEADER: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/header.txt"));
    let stamped = TimestampedHeader { header: context, time_now: Utc::now().to_rfc3339() };
    Ok(Header { content: render("header", HEADER, &stamped)? })
}

fn render<C: Serialize>(name: &str, template: &str, context: &C) -> Result<String, LaunchError> {
    let mut tt = TinyTemplate::new();
    // shell scripts, not HTML
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template(name, template)?;
    Ok(tt.render(name, context)?)
}
