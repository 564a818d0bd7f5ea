//! Start dask schedulers and workers as grid engine jobs

/// Timeout-bounded polling
pub mod wait;
pub mod worker;
pub mod cluster;
