//! The per-target direction field produced by a flow field build.
use bevy::math::IVec2;
use ndarray::{Array2, ArrayView2};

use crate::{dir::Dir, error::PathError, path::Path};

/// Code of a cell with no route to the target (blocked, unreached, or outside the flood).
pub const UNREACHABLE: u8 = 0;
/// Code stored on the target cell itself.
pub const AT_TARGET: u8 = 9;

/// Dense `[[y, x]]` grid of direction codes leading toward one target cell.
///
/// Codes `1..=8` decode through [`Dir::from_code`] to the step to take from that cell,
/// [`UNREACHABLE`] marks cells with no route and [`AT_TARGET`] marks the target.
/// A field is immutable once built and is shared between readers behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionField {
    target: IVec2,
    codes: Array2<u8>,
}

impl DirectionField {
    pub(crate) fn new(target: IVec2, codes: Array2<u8>) -> Self {
        DirectionField { target, codes }
    }

    pub fn target(&self) -> IVec2 {
        self.target
    }

    pub fn width(&self) -> usize {
        self.codes.ncols()
    }

    pub fn height(&self) -> usize {
        self.codes.nrows()
    }

    pub fn codes(&self) -> ArrayView2<u8> {
        self.codes.view()
    }

    #[inline(always)]
    pub fn in_bounds(&self, cell: IVec2) -> bool {
        cell.x >= 0
            && cell.y >= 0
            && (cell.x as usize) < self.width()
            && (cell.y as usize) < self.height()
    }

    /// Raw code at `cell`, [`UNREACHABLE`] outside the field.
    #[inline(always)]
    pub fn code_at(&self, cell: IVec2) -> u8 {
        if self.in_bounds(cell) {
            self.codes[[cell.y as usize, cell.x as usize]]
        } else {
            UNREACHABLE
        }
    }

    /// The step to take from `cell` toward the target.
    pub fn dir_at(&self, cell: IVec2) -> Option<Dir> {
        Dir::from_code(self.code_at(cell))
    }

    /// True if walking from `cell` leads to the target.
    pub fn is_reachable(&self, cell: IVec2) -> bool {
        self.code_at(cell) != UNREACHABLE
    }

    /// Number of cells that can reach the target, the target included.
    pub fn reachable_count(&self) -> usize {
        self.codes.iter().filter(|&&code| code != UNREACHABLE).count()
    }

    /// Follows the stored directions from `start` until the target is reached.
    ///
    /// Takes at most `max_len` steps. The walk never re-reads the walkability grid, so it
    /// only fails on a dead end, on leaving the field, or on running out of steps. A failed
    /// walk never returns the cells it did visit.
    pub fn path_from(&self, start: IVec2, max_len: usize) -> Result<Path, PathError> {
        if !self.in_bounds(start) {
            return Err(PathError::StartOutOfBounds(start));
        }
        if !self.is_reachable(start) {
            return Err(PathError::StartUnreachable(start));
        }

        let mut path = Path::default();
        let mut current = start;
        let mut steps = 0;

        while current != self.target {
            if steps == max_len {
                return Err(PathError::StepBudgetExceeded(max_len));
            }
            steps += 1;

            let Some(dir) = self.dir_at(current) else {
                return Err(PathError::DeadEnd(current));
            };

            current += dir.vector();
            if !self.in_bounds(current) {
                return Err(PathError::LeftGrid(current));
            }

            path.push_step(current, dir);
        }

        Ok(path)
    }
}
