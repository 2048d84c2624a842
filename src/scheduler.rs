//! Bounded worker pool that runs flow field builds in the background.
use bevy::log::debug;

use crate::{error::CacheError, settings::FlowCacheSettings};

/// Runs build jobs with at most `max_parallel_builds` of them active at once.
///
/// A dedicated rayon pool whose thread count is the admission limit; jobs beyond it wait
/// in the pool's queue.
pub(crate) struct BuildPool {
    pool: rayon::ThreadPool,
    max_parallel_builds: usize,
}

impl BuildPool {
    pub(crate) fn new(settings: &FlowCacheSettings) -> Result<Self, CacheError> {
        let prefix = settings.thread_name_prefix.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.max_parallel_builds)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()?;

        debug!(
            "Started flow field build pool with {} workers",
            settings.max_parallel_builds
        );

        Ok(BuildPool {
            pool,
            max_parallel_builds: settings.max_parallel_builds,
        })
    }

    pub(crate) fn max_parallel_builds(&self) -> usize {
        self.max_parallel_builds
    }

    /// Queues `job`. Never waits for it to run.
    pub(crate) fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn_fifo(job);
    }
}

/// Half the logical cores, clamped to `1..=4`.
pub(crate) fn default_parallel_builds() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cores / 2).clamp(1, 4)
}
