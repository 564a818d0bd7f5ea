//! Talk to a Sun Grid Engine style scheduler and render the job scripts it runs

/// Job ids, submission requests and qsub/qstat output parsing
pub mod job;

/// The one place where qsub and qstat get executed
pub mod client;

/// Read job script templates and render them
pub mod template;

#[cfg(test)]
pub mod testing;
