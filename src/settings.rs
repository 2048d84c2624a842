//! Settings for [`crate::cache::FlowFieldCache`].
use crate::scheduler::default_parallel_builds;

/// Default step budget for path walks.
pub const DEFAULT_MAX_PATH_LEN: usize = 16384;

/// Holder for the cache settings. Create one with [`FlowCacheSettingsBuilder`].
#[derive(Clone, Debug)]
pub struct FlowCacheSettings {
    /// How many flow fields may be built at the same time.
    pub(crate) max_parallel_builds: usize,
    /// Step budget used by [`crate::cache::FlowFieldCache::try_get_path_default`].
    pub(crate) max_path_len: usize,
    /// Build worker threads are named `{prefix}-{index}`.
    pub(crate) thread_name_prefix: String,
}

impl Default for FlowCacheSettings {
    fn default() -> Self {
        FlowCacheSettingsBuilder::default().build()
    }
}

impl FlowCacheSettings {
    pub fn max_parallel_builds(&self) -> usize {
        self.max_parallel_builds
    }

    pub fn max_path_len(&self) -> usize {
        self.max_path_len
    }

    pub fn thread_name_prefix(&self) -> &str {
        &self.thread_name_prefix
    }
}

/// Builder for [`FlowCacheSettings`].
///
/// Example usage:
/// ```
/// use bevy_flowcache::prelude::*;
///
/// let settings = FlowCacheSettingsBuilder::new()
///     .max_parallel_builds(2)
///     .max_path_len(4096)
///     .build();
///
/// assert_eq!(settings.max_parallel_builds(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct FlowCacheSettingsBuilder {
    max_parallel_builds: usize,
    max_path_len: usize,
    thread_name_prefix: String,
}

impl Default for FlowCacheSettingsBuilder {
    fn default() -> Self {
        FlowCacheSettingsBuilder {
            max_parallel_builds: default_parallel_builds(),
            max_path_len: DEFAULT_MAX_PATH_LEN,
            thread_name_prefix: "flowfield-build".to_string(),
        }
    }
}

impl FlowCacheSettingsBuilder {
    /// Starts from the defaults: half the logical cores (clamped to 1..=4) build workers and
    /// a 16384 step path budget.
    pub fn new() -> Self {
        FlowCacheSettingsBuilder::default()
    }

    /// Upper bound on concurrently running builds.
    /// Must be at least 1.
    pub fn max_parallel_builds(mut self, max_parallel_builds: usize) -> Self {
        if max_parallel_builds < 1 {
            panic!("Max parallel builds must be at least 1");
        }

        self.max_parallel_builds = max_parallel_builds;
        self
    }

    /// Step budget for path walks that don't pass their own.
    pub fn max_path_len(mut self, max_path_len: usize) -> Self {
        self.max_path_len = max_path_len;
        self
    }

    /// Name prefix for the build worker threads.
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Builds the [`FlowCacheSettings`] from the current builder state.
    pub fn build(self) -> FlowCacheSettings {
        FlowCacheSettings {
            max_parallel_builds: self.max_parallel_builds,
            max_path_len: self.max_path_len,
            thread_name_prefix: self.thread_name_prefix,
        }
    }
}
