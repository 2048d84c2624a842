//! Cached, cancellable flow field pathfinding over packed walkability grids.
//!
//! A [`cache::FlowFieldCache`] owns a [`grid::WalkableGrid`] and builds one
//! [`field::DirectionField`] per requested target in the background. Once a field is ready,
//! a path from any cell to that target is a cheap walk over the stored directions.
use std::cmp::Ordering;
use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use rustc_hash::FxHasher;

mod macros;

pub mod cache;
pub mod cancel;
mod dijkstra;
pub mod dir;
pub mod error;
pub mod field;
pub mod grid;
pub mod path;
pub mod plugin;
mod scheduler;
pub mod settings;

pub mod prelude {
    pub use crate::cache::FlowFieldCache;
    pub use crate::cancel::CancelToken;
    pub use crate::dir::Dir;
    pub use crate::error::{BuildError, CacheError, PathError};
    pub use crate::field::DirectionField;
    pub use crate::grid::{WalkableGrid, DEFAULT_SNAP_RADIUS};
    pub use crate::path::Path;
    pub use crate::plugin::{
        AreaChanged, AreaCleared, FlowFieldPlugin, FlowFieldSet, FlowFieldSettings, FlowFields,
    };
    pub use crate::settings::{FlowCacheSettings, FlowCacheSettingsBuilder, DEFAULT_MAX_PATH_LEN};
}

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Priority queue entry for the flood; `BinaryHeap` pops the cheapest cell first.
///
/// Equal costs are broken by the lower flat cell index so builds are deterministic.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SmallestCostHolder {
    cost: u32,
    index: usize,
}

impl PartialEq for SmallestCostHolder {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.index == other.index
    }
}

impl Eq for SmallestCostHolder {}

impl PartialOrd for SmallestCostHolder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SmallestCostHolder {
    fn cmp(&self, other: &Self) -> Ordering {
        match other.cost.cmp(&self.cost) {
            Ordering::Equal => other.index.cmp(&self.index),
            s => s,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::time::{Duration, Instant};

    /// Packs a row-major `[[y, x]]` boolean map into the nibble source format.
    /// Odd widths get an unwalkable padding column.
    pub(crate) fn pack(rows: &[&[bool]]) -> (Vec<u8>, i32) {
        let width = rows[0].len();
        let bytes_per_row = width.div_ceil(2);
        let mut data = vec![0u8; bytes_per_row * rows.len()];

        for (y, row) in rows.iter().enumerate() {
            for (x, &walkable) in row.iter().enumerate() {
                if walkable {
                    let nibble = if x & 1 == 0 { 0x01 } else { 0x10 };
                    data[y * bytes_per_row + x / 2] |= nibble;
                }
            }
        }

        (data, bytes_per_row as i32)
    }

    /// Polls `condition` for up to ten seconds.
    pub(crate) fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        condition()
    }
}
