//! This module defines the `Path` returned by flow field walks.
use bevy::math::IVec2;
use std::collections::VecDeque;

use crate::dir::Dir;

/// The cells visited when walking a flow field from a start cell to its target.
///
/// The start cell is not part of the path; the last cell is always the target.
/// A path whose start already is the target is empty.
#[derive(Debug, Clone, Default)]
pub struct Path {
    pub(crate) path: VecDeque<IVec2>,
    cost: u32,
}

impl Path {
    /// Create a new path from a vector of cells.
    /// # Arguments
    /// * `path` - The cells of the path, in walking order
    /// * `cost` - The total movement cost of the path
    ///
    pub fn new(path: Vec<IVec2>, cost: u32) -> Self {
        Path {
            path: path.into_iter().collect(),
            cost,
        }
    }

    /// Returns true if the path contains the given cell
    pub fn is_position_in_path(&self, pos: IVec2) -> bool {
        self.path.contains(&pos)
    }

    /// Returns the path as a slice of cells.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bevy::math::IVec2;
    /// use bevy_flowcache::prelude::*;
    ///
    /// let path = Path::new(vec![IVec2::new(1, 1), IVec2::new(2, 2)], 28);
    /// assert_eq!(path.path(), &[IVec2::new(1, 1), IVec2::new(2, 2)]);
    /// ```
    pub fn path(&self) -> &[IVec2] {
        self.path.as_slices().0
    }

    /// Returns the movement cost of the path, 10 per orthogonal and 14 per diagonal step
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Returns the number of steps in the path
    pub fn len(&self) -> usize {
        self.path.len()
    }

    /// Returns true if the path is empty
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Pops the first cell of the path.
    pub fn pop(&mut self) -> Option<IVec2> {
        self.path.pop_front()
    }

    /// Returns the next cell in the path without removing it.
    pub fn next(&self) -> Option<IVec2> {
        self.path.front().cloned()
    }

    /// Returns the last cell of the path.
    pub fn goal(&self) -> Option<IVec2> {
        self.path.back().cloned()
    }

    /// Appends a step taken in `dir`, accumulating its cost.
    pub(crate) fn push_step(&mut self, cell: IVec2, dir: Dir) {
        self.path.push_back(cell);
        self.cost += dir.cost();
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Path {}

impl IntoIterator for Path {
    type Item = IVec2;
    type IntoIter = std::collections::vec_deque::IntoIter<IVec2>;

    fn into_iter(self) -> Self::IntoIter {
        self.path.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_step_accumulates_cost() {
        let mut path = Path::default();
        path.push_step(IVec2::new(1, 0), Dir::EAST);
        path.push_step(IVec2::new(2, 1), Dir::NORTHEAST);

        assert_eq!(path.len(), 2);
        assert_eq!(path.cost(), 24);
        assert_eq!(path.next(), Some(IVec2::new(1, 0)));
        assert_eq!(path.goal(), Some(IVec2::new(2, 1)));
    }

    #[test]
    fn test_pop() {
        let mut path = Path::new(vec![IVec2::new(0, 1), IVec2::new(0, 2)], 20);
        assert_eq!(path.pop(), Some(IVec2::new(0, 1)));
        assert_eq!(path.len(), 1);
        assert!(!path.is_position_in_path(IVec2::new(0, 1)));
        assert_eq!(path.into_iter().collect::<Vec<_>>(), vec![IVec2::new(0, 2)]);
    }
}
