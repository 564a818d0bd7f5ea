use std::time::Duration;

use log::debug;
use tokio::time::{sleep, Instant};

/// How often to poll and when to give up
#[derive(Clone, Copy, Debug)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

/// Result of a single poll
#[derive(Debug, PartialEq, Eq)]
pub enum Check<T> {
    Ready(T),
    Pending,
    Failed(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    Ready(T),
    TimedOut { elapsed: Duration, polls: u32 },
    Failed(String),
}

/// Poll `check` every `policy.interval` until it is ready, it fails, or `policy.timeout` passes
///
/// The check always runs at least once, and once more right at the deadline.
pub async fn wait_until<T, F>(policy: &WaitPolicy, mut check: F) -> WaitOutcome<T>
where
    F: FnMut() -> Check<T>,
{
    let start = Instant::now();
    let mut polls: u32 = 0;

    loop {
        polls += 1;
        match check() {
            Check::Ready(value) => return WaitOutcome::Ready(value),
            Check::Failed(reason) => return WaitOutcome::Failed(reason),
            Check::Pending => {}
        }

        let elapsed = start.elapsed();
        if elapsed >= policy.timeout {
            return WaitOutcome::TimedOut { elapsed, polls };
        }
        let pause = policy.interval.min(policy.timeout - elapsed);
        debug!("Poll {polls} pending, next in {pause:?}");
        sleep(pause).await;
    }
}
