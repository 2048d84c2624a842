//! This module contains [`FlowFieldCache`], the concurrent, memoized store of direction fields.
use bevy::{
    log::{debug, error, info},
    math::IVec2,
};
use indexmap::map::Entry::{Occupied, Vacant};
use parking_lot::{Mutex, RwLock};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use crate::{
    cancel::CancelToken,
    dijkstra::build_direction_field,
    error::{BuildError, CacheError, PathError},
    field::DirectionField,
    grid::WalkableGrid,
    path::Path,
    scheduler::BuildPool,
    settings::FlowCacheSettings,
    FxIndexMap,
};

/// Registry entry for one target.
#[derive(Debug, Clone)]
enum FieldSlot {
    /// A build was scheduled under this cancellation generation and has not finished.
    Pending { generation: u64 },
    Ready(Arc<DirectionField>),
}

type Registry = Arc<RwLock<FxIndexMap<IVec2, FieldSlot>>>;

/// Builds and caches one [`DirectionField`] per requested target over a fixed [`WalkableGrid`].
///
/// Every query is non-blocking: [`FlowFieldCache::ensure_field`] only reserves a slot and
/// queues a background build, [`FlowFieldCache::is_field_ready`] and
/// [`FlowFieldCache::try_get_path`] only read what has been committed so far.
/// A cache is tied to one area; when the area changes, call [`FlowFieldCache::cancel_all`]
/// and replace the cache with one built over the new grid.
///
/// # Example
/// ```
/// use bevy::math::IVec2;
/// use bevy_flowcache::prelude::*;
///
/// // 8x4 fully walkable area
/// let cache = FlowFieldCache::from_packed(&[0x11; 16], 4).unwrap();
/// let target = IVec2::new(7, 3);
///
/// assert!(cache.ensure_field(target));
/// // already requested
/// assert!(!cache.ensure_field(target));
///
/// while !cache.is_field_ready(target) {
///     std::thread::yield_now();
/// }
///
/// let path = cache.try_get_path(IVec2::new(0, 0), target, 64).unwrap();
/// assert_eq!(path.len(), 7);
/// ```
pub struct FlowFieldCache {
    grid: Arc<WalkableGrid>,
    registry: Registry,
    cancel: Mutex<CancelToken>,
    pool: BuildPool,
    settings: FlowCacheSettings,
}

impl FlowFieldCache {
    /// Creates an empty cache over `grid`.
    pub fn new(grid: WalkableGrid, settings: FlowCacheSettings) -> Result<Self, CacheError> {
        let pool = BuildPool::new(&settings)?;

        info!(
            "Created flow field cache over a {}x{} grid ({} walkable cells, {} parallel builds)",
            grid.width(),
            grid.height(),
            grid.walkable_count(),
            pool.max_parallel_builds()
        );

        Ok(FlowFieldCache {
            grid: Arc::new(grid),
            registry: Arc::new(RwLock::new(FxIndexMap::default())),
            cancel: Mutex::new(CancelToken::new()),
            pool,
            settings,
        })
    }

    /// Decodes a nibble-packed grid and creates a cache over it with default settings.
    ///
    /// See [`WalkableGrid::from_packed`] for the buffer layout. A non-positive stride still
    /// produces a working cache; it just never has a field to offer.
    pub fn from_packed(data: &[u8], bytes_per_row: i32) -> Result<Self, CacheError> {
        FlowFieldCache::new(
            WalkableGrid::from_packed(data, bytes_per_row),
            FlowCacheSettings::default(),
        )
    }

    pub fn grid(&self) -> &WalkableGrid {
        &self.grid
    }

    pub fn settings(&self) -> &FlowCacheSettings {
        &self.settings
    }

    /// Current cancellation generation, bumped by every [`FlowFieldCache::cancel_all`].
    pub fn generation(&self) -> u64 {
        self.cancel.lock().generation()
    }

    /// Token shared by the builds of the current generation.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.lock().clone()
    }

    /// Requests a flow field toward `target`.
    ///
    /// Returns `false` if the field is already built or being built. Otherwise reserves the
    /// target, queues a background build and returns `true`. The build may still produce
    /// nothing, for instance when `target` is not walkable, in which case the reservation is
    /// dropped and `target` simply never becomes ready.
    pub fn ensure_field(&self, target: IVec2) -> bool {
        let token = self.cancel.lock().clone();

        {
            let mut registry = self.registry.write();
            match registry.entry(target) {
                Occupied(mut e) => {
                    // Reservations left behind by a cancelled generation can be taken over
                    let stale = matches!(
                        e.get(),
                        FieldSlot::Pending { generation } if *generation < token.generation()
                    );
                    if !stale {
                        return false;
                    }
                    e.insert(FieldSlot::Pending {
                        generation: token.generation(),
                    });
                }
                Vacant(e) => {
                    e.insert(FieldSlot::Pending {
                        generation: token.generation(),
                    });
                }
            }
        }

        debug!("Queued flow field build for target {}", target);

        let grid = self.grid.clone();
        let registry = self.registry.clone();
        self.pool
            .spawn(move || run_build(&grid, &registry, target, &token));

        true
    }

    /// True once a completed field for `target` is in the cache.
    pub fn is_field_ready(&self, target: IVec2) -> bool {
        matches!(self.registry.read().get(&target), Some(FieldSlot::Ready(_)))
    }

    /// The completed field for `target`, if any.
    pub fn field(&self, target: IVec2) -> Option<Arc<DirectionField>> {
        match self.registry.read().get(&target) {
            Some(FieldSlot::Ready(field)) => Some(field.clone()),
            _ => None,
        }
    }

    /// Walks the field of `target` from `start`, reporting why no path could be produced.
    pub fn path(&self, start: IVec2, target: IVec2, max_len: usize) -> Result<Path, PathError> {
        let field = self.field(target).ok_or(PathError::NotReady(target))?;
        field.path_from(start, max_len)
    }

    /// Walks the field of `target` from `start`, taking at most `max_len` steps.
    ///
    /// Returns `None` if the field isn't ready, `start` can't reach `target`, or the walk
    /// doesn't end on `target` within the budget.
    pub fn try_get_path(&self, start: IVec2, target: IVec2, max_len: usize) -> Option<Path> {
        self.path(start, target, max_len).ok()
    }

    /// [`FlowFieldCache::try_get_path`] with the step budget from the cache settings.
    pub fn try_get_path_default(&self, start: IVec2, target: IVec2) -> Option<Path> {
        self.try_get_path(start, target, self.settings.max_path_len)
    }

    /// Aborts every build scheduled so far and re-arms the cache for new requests.
    ///
    /// In-flight builds stop at their next dequeued cell; queued ones never start. Their
    /// reservations are dropped immediately, so afterwards the cache only holds completed
    /// fields and any target may be requested again.
    pub fn cancel_all(&self) {
        let mut current = self.cancel.lock();
        current.cancel();
        *current = current.next();

        let mut registry = self.registry.write();
        let before = registry.len();
        registry.retain(|_, slot| matches!(slot, FieldSlot::Ready(_)));

        info!(
            "Cancelled {} pending flow field builds, now on generation {}",
            before - registry.len(),
            current.generation()
        );
    }

    /// Number of targets with a completed field.
    pub fn ready_count(&self) -> usize {
        self.registry
            .read()
            .values()
            .filter(|slot| matches!(slot, FieldSlot::Ready(_)))
            .count()
    }

    /// Number of targets reserved by a build that hasn't finished.
    pub fn pending_count(&self) -> usize {
        self.registry
            .read()
            .values()
            .filter(|slot| matches!(slot, FieldSlot::Pending { .. }))
            .count()
    }

    /// Targets with a completed field, in the order they were first requested.
    pub fn ready_targets(&self) -> Vec<IVec2> {
        self.registry
            .read()
            .iter()
            .filter(|(_, slot)| matches!(slot, FieldSlot::Ready(_)))
            .map(|(&target, _)| target)
            .collect()
    }
}

impl Drop for FlowFieldCache {
    fn drop(&mut self) {
        self.cancel.get_mut().cancel();
    }
}

/// Body of one background build. Commits the field only if the slot still belongs to the
/// generation that scheduled it.
fn run_build(grid: &WalkableGrid, registry: &Registry, target: IVec2, token: &CancelToken) {
    let result = if token.is_cancelled() {
        Err(BuildError::Cancelled(target))
    } else {
        panic::catch_unwind(AssertUnwindSafe(|| {
            crate::timed!("Built flow field", {
                build_direction_field(grid, target, token)
            })
        }))
        .unwrap_or_else(|payload| {
            Err(BuildError::Panicked {
                target,
                message: panic_message(payload.as_ref()),
            })
        })
    };

    let mut registry = registry.write();

    let owns_slot = matches!(
        registry.get(&target),
        Some(FieldSlot::Pending { generation }) if *generation == token.generation()
    );
    if !owns_slot {
        debug!(
            "Discarding flow field build for {} from stale generation {}",
            target,
            token.generation()
        );
        return;
    }

    match result {
        Ok(field) if !token.is_cancelled() => {
            debug!(
                "Flow field for {} ready, {} cells reach it",
                target,
                field.reachable_count()
            );
            registry.insert(target, FieldSlot::Ready(Arc::new(field)));
        }
        Ok(_) => {
            registry.shift_remove(&target);
        }
        Err(err @ BuildError::Panicked { .. }) => {
            error!("{}", err);
            registry.shift_remove(&target);
        }
        Err(err) => {
            debug!("No flow field produced: {}", err);
            registry.shift_remove(&target);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
