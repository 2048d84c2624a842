//! This module contains [`WalkableGrid`], the immutable passability map every flow field is built over.
use bevy::{log::warn, math::IVec2};
use ndarray::{Array2, ArrayView2, Zip};
use smallvec::SmallVec;

use crate::dir::Dir;

/// Default search radius used when snapping a cell to the closest walkable cell.
pub const DEFAULT_SNAP_RADIUS: i32 = 12;

/// Walkable neighbors of a cell, paired with the direction used to reach them.
pub type Neighbors = SmallVec<[(Dir, IVec2); 8]>;

/// Boolean passability map decoded from a nibble-packed source buffer.
///
/// The source stores two cells per byte: the low nibble holds the even `x` column and the
/// high nibble the odd one. A nibble of `0` is impassable, anything else is walkable.
///
/// Cells are stored `[[y, x]]`, matching the row-major layout of the source.
///
/// ```
/// use bevy::math::IVec2;
/// use bevy_flowcache::prelude::*;
///
/// // One row of two bytes: cells 0 and 3 are walkable.
/// let grid = WalkableGrid::from_packed(&[0x01, 0x20], 2);
///
/// assert_eq!(grid.dimensions(), (4, 1));
/// assert!(grid.is_walkable(IVec2::new(0, 0)));
/// assert!(!grid.is_walkable(IVec2::new(1, 0)));
/// assert!(grid.is_walkable(IVec2::new(3, 0)));
/// ```
#[derive(Debug, Clone)]
pub struct WalkableGrid {
    cells: Array2<bool>,
}

impl Default for WalkableGrid {
    /// A degenerate `0 x 0` grid where nothing is walkable.
    fn default() -> Self {
        WalkableGrid {
            cells: Array2::from_elem((0, 0), false),
        }
    }
}

impl WalkableGrid {
    /// Decodes a nibble-packed passability buffer.
    ///
    /// # Arguments
    /// * `data` - The packed source, `bytes_per_row` bytes per row.
    /// * `bytes_per_row` - Row stride of `data`. Each byte holds two cells.
    ///
    /// A non-positive stride produces an empty grid instead of an error; every query on it
    /// reports unwalkable and no flow field can ever be built over it.
    pub fn from_packed(data: &[u8], bytes_per_row: i32) -> Self {
        if bytes_per_row <= 0 {
            warn!(
                "Walkable grid has a non-positive row stride ({}), pathing is unavailable",
                bytes_per_row
            );
            return WalkableGrid::default();
        }

        let bytes_per_row = bytes_per_row as usize;
        let width = bytes_per_row * 2;
        let height = data.len() / bytes_per_row;

        if height == 0 {
            warn!(
                "Walkable grid source of {} bytes is shorter than one row of {} bytes",
                data.len(),
                bytes_per_row
            );
            return WalkableGrid::default();
        }

        let mut cells = Array2::from_elem((height, width), false);

        crate::timed!("Decoded walkable grid", {
            decode_nibbles(&mut cells, data, bytes_per_row);
        });

        WalkableGrid { cells }
    }

    /// Builds a grid directly from a `[[y, x]]` passability array.
    pub fn from_array(cells: Array2<bool>) -> Self {
        WalkableGrid { cells }
    }

    /// Width of the grid in cells.
    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    /// Height of the grid in cells.
    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// True for a degenerate grid with no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// A read-only `[[y, x]]` view of the passability data.
    pub fn view(&self) -> ArrayView2<bool> {
        self.cells.view()
    }

    #[inline(always)]
    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width()
            && (cell.y as usize) < self.height()
    }

    /// Returns `false` for any cell outside the grid.
    #[inline(always)]
    pub fn is_walkable(&self, cell: IVec2) -> bool {
        self.in_bounds(cell) && self.cells[[cell.y as usize, cell.x as usize]]
    }

    /// Number of walkable cells in the grid.
    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|&&walkable| walkable).count()
    }

    /// Walkable 8-neighbors of `cell`.
    ///
    /// Diagonal neighbors are dropped when either orthogonal cell flanking the move is blocked,
    /// so a path can never squeeze between two wall corners.
    pub fn neighbors(&self, cell: IVec2) -> Neighbors {
        let mut neighbors = Neighbors::new();

        for dir in Dir::all() {
            let neighbor = cell + dir.vector();
            if !self.is_walkable(neighbor) {
                continue;
            }

            if let Some((a, b)) = dir.flanking() {
                if !self.is_walkable(cell + a.vector()) || !self.is_walkable(cell + b.vector()) {
                    continue;
                }
            }

            neighbors.push((dir, neighbor));
        }

        neighbors
    }

    /// Finds the walkable cell closest to `cell` by scanning square rings of growing radius.
    ///
    /// Returns `cell` itself if it is walkable, `None` if nothing walkable lies within
    /// `max_radius` rings.
    pub fn find_closest_walkable(&self, cell: IVec2, max_radius: i32) -> Option<IVec2> {
        if self.is_walkable(cell) {
            return Some(cell);
        }

        for r in 1..=max_radius {
            let (left, right) = (cell.x - r, cell.x + r);
            let (top, bottom) = (cell.y - r, cell.y + r);

            for i in 0..=2 * r {
                let candidates = [
                    IVec2::new(left + i, top),
                    IVec2::new(left + i, bottom),
                    IVec2::new(left, top + i),
                    IVec2::new(right, top + i),
                ];

                if let Some(found) = candidates.into_iter().find(|&c| self.is_walkable(c)) {
                    return Some(found);
                }
            }
        }

        None
    }

    /// Flat row-major index of an in-bounds cell.
    #[inline(always)]
    pub(crate) fn index(&self, cell: IVec2) -> usize {
        cell.y as usize * self.width() + cell.x as usize
    }

    #[inline(always)]
    pub(crate) fn cell_at(&self, index: usize) -> IVec2 {
        let width = self.width();
        IVec2::new((index % width) as i32, (index / width) as i32)
    }
}

#[inline(always)]
fn nibble_at(data: &[u8], bytes_per_row: usize, x: usize, y: usize) -> u8 {
    let byte = data.get(y * bytes_per_row + (x >> 1)).copied().unwrap_or(0);
    if x & 1 == 0 {
        byte & 0x0F
    } else {
        (byte >> 4) & 0x0F
    }
}

#[cfg(feature = "parallel")]
fn decode_nibbles(cells: &mut Array2<bool>, data: &[u8], bytes_per_row: usize) {
    Zip::indexed(cells).par_for_each(|(y, x), cell| {
        *cell = nibble_at(data, bytes_per_row, x, y) > 0;
    });
}

#[cfg(not(feature = "parallel"))]
fn decode_nibbles(cells: &mut Array2<bool>, data: &[u8], bytes_per_row: usize) {
    Zip::indexed(cells).for_each(|(y, x), cell| {
        *cell = nibble_at(data, bytes_per_row, x, y) > 0;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::pack;

    #[test]
    fn test_from_packed_dimensions() {
        let grid = WalkableGrid::from_packed(&[0xFF; 12], 3);
        assert_eq!(grid.width(), 6);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.walkable_count(), 24);
    }

    #[test]
    fn test_nibble_decoding() {
        // low nibble is the even column, high nibble the odd column, any non-zero value walks
        let grid = WalkableGrid::from_packed(&[0x70, 0x0A, 0x00, 0x11], 2);

        assert!(!grid.is_walkable(IVec2::new(0, 0)));
        assert!(grid.is_walkable(IVec2::new(1, 0)));
        assert!(grid.is_walkable(IVec2::new(2, 0)));
        assert!(!grid.is_walkable(IVec2::new(3, 0)));
        assert!(!grid.is_walkable(IVec2::new(0, 1)));
        assert!(!grid.is_walkable(IVec2::new(1, 1)));
        assert!(grid.is_walkable(IVec2::new(2, 1)));
        assert!(grid.is_walkable(IVec2::new(3, 1)));
    }

    #[test]
    fn test_trailing_partial_row_is_ignored() {
        let grid = WalkableGrid::from_packed(&[0x11, 0x11, 0x11], 2);
        assert_eq!(grid.dimensions(), (4, 1));
    }

    #[test]
    fn test_out_of_bounds_is_unwalkable() {
        let grid = WalkableGrid::from_packed(&[0xFF; 4], 2);
        assert!(!grid.is_walkable(IVec2::new(-1, 0)));
        assert!(!grid.is_walkable(IVec2::new(0, -1)));
        assert!(!grid.is_walkable(IVec2::new(4, 0)));
        assert!(!grid.is_walkable(IVec2::new(0, 2)));
        assert!(grid.is_walkable(IVec2::new(3, 1)));
    }

    #[test]
    fn test_degenerate_stride() {
        for stride in [0, -4] {
            let grid = WalkableGrid::from_packed(&[0xFF; 16], stride);
            assert!(grid.is_empty());
            assert_eq!(grid.dimensions(), (0, 0));
            assert!(!grid.is_walkable(IVec2::ZERO));
        }

        let grid = WalkableGrid::from_packed(&[0xFF], 4);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_neighbors_open() {
        let grid = WalkableGrid::from_packed(&[0xFF; 6], 2);
        assert_eq!(grid.neighbors(IVec2::new(1, 1)).len(), 8);
        // corner cell only sees three neighbors
        assert_eq!(grid.neighbors(IVec2::new(0, 0)).len(), 3);
    }

    #[test]
    fn test_neighbors_no_corner_cutting() {
        let (data, stride) = pack(&[
            &[true, true, true],
            &[true, true, false],
            &[true, true, true],
        ]);
        let grid = WalkableGrid::from_packed(&data, stride);
        let neighbors = grid.neighbors(IVec2::new(1, 1));

        // East is blocked, which also removes both eastern diagonals
        assert_eq!(neighbors.len(), 5);
        assert!(neighbors.iter().all(|(dir, _)| !matches!(
            dir,
            Dir::EAST | Dir::NORTHEAST | Dir::SOUTHEAST
        )));
    }

    #[test]
    fn test_find_closest_walkable() {
        let (data, stride) = pack(&[
            &[false, false, false, false, false],
            &[false, false, false, false, false],
            &[false, false, false, false, true],
        ]);
        let grid = WalkableGrid::from_packed(&data, stride);

        assert_eq!(
            grid.find_closest_walkable(IVec2::new(4, 2), DEFAULT_SNAP_RADIUS),
            Some(IVec2::new(4, 2))
        );
        assert_eq!(
            grid.find_closest_walkable(IVec2::new(2, 2), DEFAULT_SNAP_RADIUS),
            Some(IVec2::new(4, 2))
        );
        assert_eq!(grid.find_closest_walkable(IVec2::new(0, 0), 3), None);
        assert_eq!(
            grid.find_closest_walkable(IVec2::new(0, 0), 4),
            Some(IVec2::new(4, 2))
        );
    }

    #[test]
    fn test_index_round_trip() {
        let grid = WalkableGrid::from_packed(&[0xFF; 12], 3);
        let cell = IVec2::new(5, 2);
        assert_eq!(grid.index(cell), 17);
        assert_eq!(grid.cell_at(17), cell);
    }
}
