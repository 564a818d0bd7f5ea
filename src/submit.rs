//! Bounded-concurrency submission: one job per input file, at most `max_jobs` running at once
//!
//! Files are split into groups. Jobs inside a group are chained with `-hold_jid` so they run
//! one after another, while separate groups run side by side on the scheduler. Planning is a
//! pure function of [`plan::SubmitConfig`]; only [`execute`] talks to the scheduler.

pub mod split;
pub mod plan;
pub mod execute;
