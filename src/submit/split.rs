use std::fmt;
use clap::ValueEnum;
use serde::Serialize;

/// How input files are divided into hold-chained groups
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitStrategy {
    /// Exactly min(max_jobs, files) groups whose sizes differ by at most one
    Balanced,
    /// Fixed group size of floor(files / max_jobs) + 1, which can leave groups unused
    Legacy,
}

impl fmt::Display for SplitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SplitStrategy::Balanced => write!(f, "balanced"),
            SplitStrategy::Legacy => write!(f, "legacy"),
        }
    }
}

impl SplitStrategy {
    /// Group sizes for `files` files and at most `max_groups` groups, first group first
    ///
    /// Sizes always sum to `files`, and no size is zero.
    pub fn group_sizes(&self, files: usize, max_groups: usize) -> Vec<usize> {
        if files == 0 || max_groups == 0 {
            return Vec::new();
        }
        match self {
            SplitStrategy::Balanced => {
                let groups = max_groups.min(files);
                let base = files / groups;
                let larger = files % groups;
                (0..groups).map(|g| if g < larger { base + 1 } else { base }).collect()
            }
            SplitStrategy::Legacy => {
                let nsplit = files / max_groups + 1;
                let mut sizes = vec![nsplit; files / nsplit];
                if files % nsplit != 0 {
                    sizes.push(files % nsplit);
                }
                sizes
            }
        }
    }
}
