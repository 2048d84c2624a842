//! The eight planar movement directions and their direction-field codes.
use bevy::math::IVec2;

/// Movement cost of an orthogonal step.
pub const ORTHOGONAL_COST: u32 = 10;
/// Movement cost of a diagonal step.
pub const DIAGONAL_COST: u32 = 14;

/// One of the eight neighbor offsets of a grid cell.
///
/// The discriminant order is the neighbor table order used by [`crate::field::DirectionField`]:
/// a stored code is always `discriminant + 1`, leaving `0` free for "no direction".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    EAST = 0,
    WEST = 1,
    NORTH = 2,
    SOUTH = 3,
    NORTHEAST = 4,
    SOUTHEAST = 5,
    NORTHWEST = 6,
    SOUTHWEST = 7,
}

pub use self::Dir::*;

impl Dir {
    pub fn cardinal() -> std::iter::Copied<std::slice::Iter<'static, Dir>> {
        [EAST, WEST, NORTH, SOUTH].iter().copied()
    }

    pub fn ordinal() -> std::iter::Copied<std::slice::Iter<'static, Dir>> {
        [NORTHEAST, SOUTHEAST, NORTHWEST, SOUTHWEST].iter().copied()
    }

    /// All eight directions in neighbor table order.
    pub fn all() -> std::iter::Copied<std::slice::Iter<'static, Dir>> {
        [
            EAST, WEST, NORTH, SOUTH, NORTHEAST, SOUTHEAST, NORTHWEST, SOUTHWEST,
        ]
        .iter()
        .copied()
    }

    pub fn vector(self) -> IVec2 {
        match self {
            EAST => IVec2::new(1, 0),
            WEST => IVec2::new(-1, 0),
            NORTH => IVec2::new(0, 1),
            SOUTH => IVec2::new(0, -1),
            NORTHEAST => IVec2::new(1, 1),
            SOUTHEAST => IVec2::new(1, -1),
            NORTHWEST => IVec2::new(-1, 1),
            SOUTHWEST => IVec2::new(-1, -1),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            EAST => WEST,
            WEST => EAST,
            NORTH => SOUTH,
            SOUTH => NORTH,
            NORTHEAST => SOUTHWEST,
            SOUTHEAST => NORTHWEST,
            NORTHWEST => SOUTHEAST,
            SOUTHWEST => NORTHEAST,
        }
    }

    pub fn is_diagonal(self) -> bool {
        matches!(self, NORTHEAST | SOUTHEAST | NORTHWEST | SOUTHWEST)
    }

    /// Integer step cost, 10 for orthogonal and 14 for diagonal moves.
    #[inline(always)]
    pub fn cost(self) -> u32 {
        if self.is_diagonal() {
            DIAGONAL_COST
        } else {
            ORTHOGONAL_COST
        }
    }

    /// The non-zero code stored in a direction field for this direction.
    #[inline(always)]
    pub fn code(self) -> u8 {
        self as u8 + 1
    }

    /// Decodes a direction field code. `0` and the target marker have no direction.
    pub fn from_code(code: u8) -> Option<Dir> {
        match code {
            1 => Some(EAST),
            2 => Some(WEST),
            3 => Some(NORTH),
            4 => Some(SOUTH),
            5 => Some(NORTHEAST),
            6 => Some(SOUTHEAST),
            7 => Some(NORTHWEST),
            8 => Some(SOUTHWEST),
            _ => None,
        }
    }

    /// Returns the direction whose offset equals `delta`, if any.
    pub fn from_vector(delta: IVec2) -> Option<Dir> {
        Dir::all().find(|dir| dir.vector() == delta)
    }

    /// The two orthogonal directions flanking a diagonal move.
    pub(crate) fn flanking(self) -> Option<(Dir, Dir)> {
        match self {
            NORTHEAST => Some((EAST, NORTH)),
            SOUTHEAST => Some((EAST, SOUTH)),
            NORTHWEST => Some((WEST, NORTH)),
            SOUTHWEST => Some((WEST, SOUTH)),
            _ => None,
        }
    }
}
