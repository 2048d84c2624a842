//! Reverse Dijkstra flood that turns a target cell into a [`DirectionField`].
use bevy::math::IVec2;
use ndarray::Array2;
use std::collections::BinaryHeap;

use crate::{
    cancel::CancelToken,
    error::BuildError,
    field::{DirectionField, AT_TARGET, UNREACHABLE},
    grid::WalkableGrid,
    SmallestCostHolder,
};

/// Floods the whole grid outward from `target` and records, for every cell that can reach it,
/// the first step of a shortest path toward `target`.
///
/// ## Arguments
/// * `grid` - The `WalkableGrid` to flood.
/// * `target` - The cell every direction leads to.
/// * `cancel` - Checked once per dequeued cell; a raised flag aborts the flood.
///
/// ## Returns
/// The completed `DirectionField`, or the reason no field exists for `target`.
pub(crate) fn build_direction_field(
    grid: &WalkableGrid,
    target: IVec2,
    cancel: &CancelToken,
) -> Result<DirectionField, BuildError> {
    if !grid.in_bounds(target) {
        return Err(BuildError::OutOfBounds(target));
    }
    if !grid.is_walkable(target) {
        return Err(BuildError::Unwalkable(target));
    }

    let shape = (grid.height(), grid.width());
    let mut distance = vec![u32::MAX; shape.0 * shape.1];
    let mut codes = Array2::from_elem(shape, UNREACHABLE);

    let target_index = grid.index(target);
    distance[target_index] = 0;

    let mut to_visit = BinaryHeap::with_capacity(shape.0 * shape.1 / 8);
    to_visit.push(SmallestCostHolder {
        cost: 0,
        index: target_index,
    });

    let mut relaxed = 0usize;

    while let Some(SmallestCostHolder { cost, index }) = to_visit.pop() {
        if cancel.is_cancelled() {
            return Err(BuildError::Cancelled(target));
        }

        // Stale queue entry, a shorter route to this cell was already expanded
        if cost > distance[index] {
            continue;
        }

        let current = grid.cell_at(index);

        for (dir, neighbor) in grid.neighbors(current) {
            let new_cost = relaxed_cost(cost, dir.cost());
            let n = grid.index(neighbor);

            if new_cost < distance[n] {
                distance[n] = new_cost;
                // Standing on the neighbor, the step toward the target goes back to `current`
                codes[[neighbor.y as usize, neighbor.x as usize]] = dir.opposite().code();
                relaxed += 1;

                to_visit.push(SmallestCostHolder {
                    cost: new_cost,
                    index: n,
                });
            }
        }
    }

    if relaxed == 0 {
        return Err(BuildError::Isolated(target));
    }

    codes[[target.y as usize, target.x as usize]] = AT_TARGET;

    Ok(DirectionField::new(target, codes))
}

/// Cost of stepping on from `cost`. Saturates at `u32::MAX`, which never beats an
/// unvisited cell.
fn relaxed_cost(cost: u32, step: u32) -> u32 {
    cost.saturating_add(step)
}
