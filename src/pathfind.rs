use std::collections::{BTreeMap, VecDeque};

use crate::board::Board;
use crate::constants::MAX_PATH_VISITS;
use crate::hex::{neighbors, Hex};

/// Breadth-first shortest path over walkable tiles, start and goal inclusive.
/// Neighbors are visited in canonical order, so among equal-length paths the
/// first one in that order always wins. Iteration is capped; unreachable or
/// pathological boards yield `None`.
pub fn find_path(board: &Board, start: Hex, goal: Hex) -> Option<Vec<Hex>> {
    if !board.is_walkable(start) || !board.is_walkable(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut came_from: BTreeMap<Hex, Hex> = BTreeMap::new();
    let mut queue = VecDeque::new();
    came_from.insert(start, start);
    queue.push_back(start);
    let mut visited = 1usize;

    while let Some(current) = queue.pop_front() {
        for next in neighbors(current) {
            if came_from.contains_key(&next) || !board.is_walkable(next) {
                continue;
            }
            came_from.insert(next, current);
            if next == goal {
                return Some(reconstruct(&came_from, start, goal));
            }
            visited += 1;
            if visited >= MAX_PATH_VISITS {
                return None;
            }
            queue.push_back(next);
        }
    }
    None
}

fn reconstruct(came_from: &BTreeMap<Hex, Hex>, start: Hex, goal: Hex) -> Vec<Hex> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = came_from[&current];
        path.push(current);
    }
    path.reverse();
    path
}
