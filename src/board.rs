use std::collections::BTreeMap;

use crate::hex::{hex_disk, neighbors, Hex};
use crate::rng::Rng;
use crate::types::{BoardSpec, Tile, TileState};

/// Tile board for one level. Coordinates map to stacks ordered by height;
/// only the topmost tile of a stack is interactable. Disk boards have
/// single-tile stacks at height zero.
#[derive(Clone, Debug, Default)]
pub struct Board {
    stacks: BTreeMap<Hex, Vec<Tile>>,
}

impl Board {
    pub fn generate(spec: BoardSpec, rng: &mut Rng) -> Board {
        match spec {
            BoardSpec::Disk {
                radius,
                blocked_fraction,
            } => Self::generate_disk(radius, blocked_fraction, rng),
            BoardSpec::Pyramid { layers } => Self::generate_pyramid(layers),
        }
    }

    fn generate_disk(radius: i32, blocked_fraction: f32, rng: &mut Rng) -> Board {
        let mut stacks = BTreeMap::new();
        // The spawn tile and its ring stay open so a fresh level is never an
        // instant dead end.
        let mut protected = vec![Hex::ORIGIN];
        protected.extend(neighbors(Hex::ORIGIN));

        for hex in hex_disk(radius.max(0)) {
            let state = if hex == Hex::ORIGIN {
                TileState::Claimed
            } else if !protected.contains(&hex) && rng.bool(blocked_fraction) {
                TileState::Blocked
            } else {
                TileState::Unclaimed
            };
            stacks.insert(
                hex,
                vec![Tile {
                    hex,
                    state,
                    height: 0,
                }],
            );
        }
        Board { stacks }
    }

    fn generate_pyramid(layers: i32) -> Board {
        let mut stacks: BTreeMap<Hex, Vec<Tile>> = BTreeMap::new();
        for layer in 0..layers.max(1) {
            let radius = layers.max(1) - 1 - layer;
            for hex in hex_disk(radius) {
                stacks.entry(hex).or_default().push(Tile {
                    hex,
                    state: TileState::Unclaimed,
                    height: layer,
                });
            }
        }
        // The apex is the spawn tile.
        if let Some(stack) = stacks.get_mut(&Hex::ORIGIN) {
            if let Some(top) = stack.last_mut() {
                top.state = TileState::Claimed;
            }
        }
        Board { stacks }
    }

    pub fn top_tile(&self, hex: Hex) -> Option<&Tile> {
        self.stacks.get(&hex).and_then(|stack| stack.last())
    }

    /// Unclaimed -> Claimed on the topmost tile. Blocked and already-Claimed
    /// tiles are no-ops, not errors; the return gates side-effect
    /// notifications.
    pub fn claim(&mut self, hex: Hex) -> bool {
        debug_assert!(!self.stacks.is_empty(), "claim on an ungenerated board");
        match self.stacks.get_mut(&hex).and_then(|stack| stack.last_mut()) {
            Some(tile) if tile.state == TileState::Unclaimed => {
                tile.state = TileState::Claimed;
                true
            }
            _ => false,
        }
    }

    pub fn is_walkable(&self, hex: Hex) -> bool {
        self.top_tile(hex)
            .map(|tile| tile.state != TileState::Blocked)
            .unwrap_or(false)
    }

    /// Level-completion predicate: every interactable non-Blocked tile is
    /// Claimed.
    pub fn is_fully_claimed(&self) -> bool {
        self.stacks.values().all(|stack| {
            stack
                .last()
                .map(|tile| tile.state != TileState::Unclaimed)
                .unwrap_or(true)
        })
    }

    pub fn painted_tiles(&self) -> usize {
        self.top_states()
            .filter(|state| *state == TileState::Claimed)
            .count()
    }

    pub fn paintable_tiles(&self) -> usize {
        self.top_states()
            .filter(|state| *state != TileState::Blocked)
            .count()
    }

    fn top_states(&self) -> impl Iterator<Item = TileState> + '_ {
        self.stacks
            .values()
            .filter_map(|stack| stack.last().map(|tile| tile.state))
    }

    pub fn unclaimed_hexes(&self) -> Vec<Hex> {
        self.stacks
            .iter()
            .filter(|(_, stack)| {
                stack
                    .last()
                    .map(|tile| tile.state == TileState::Unclaimed)
                    .unwrap_or(false)
            })
            .map(|(hex, _)| *hex)
            .collect()
    }

    pub fn random_unclaimed(&self, rng: &mut Rng) -> Option<Hex> {
        let candidates = self.unclaimed_hexes();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[rng.pick_index(candidates.len())])
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.stacks.values().flatten()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn disk_tiles_have_unique_coordinates() {
        for seed in 0..50u32 {
            let mut rng = Rng::new(seed);
            let board = Board::generate(
                BoardSpec::Disk {
                    radius: 4,
                    blocked_fraction: 0.15,
                },
                &mut rng,
            );
            let mut seen = HashSet::new();
            for tile in board.tiles() {
                assert!(seen.insert((tile.hex, tile.height)));
            }
        }
    }

    #[test]
    fn pyramid_stacks_are_unique_per_height() {
        let mut rng = Rng::new(0);
        let board = Board::generate(BoardSpec::Pyramid { layers: 4 }, &mut rng);
        let mut seen = HashSet::new();
        for tile in board.tiles() {
            assert!(seen.insert((tile.hex, tile.height)));
        }
        // Apex stack is layers deep at the origin.
        assert_eq!(board.stacks.get(&Hex::ORIGIN).map(Vec::len), Some(4));
    }

    #[test]
    fn origin_starts_claimed() {
        let mut rng = Rng::new(3);
        let board = Board::generate(
            BoardSpec::Disk {
                radius: 3,
                blocked_fraction: 0.0,
            },
            &mut rng,
        );
        assert_eq!(
            board.top_tile(Hex::ORIGIN).map(|t| t.state),
            Some(TileState::Claimed)
        );
    }

    #[test]
    fn claim_transitions_exactly_once() {
        let mut rng = Rng::new(5);
        let mut board = Board::generate(
            BoardSpec::Disk {
                radius: 2,
                blocked_fraction: 0.0,
            },
            &mut rng,
        );
        let hex = Hex::new(1, 0);
        assert!(board.claim(hex));
        assert!(!board.claim(hex));
        assert!(!board.claim(Hex::new(99, 99)));
    }

    #[test]
    fn blocked_tiles_never_claim_and_are_unwalkable() {
        let mut rng = Rng::new(8);
        let mut board = Board::generate(
            BoardSpec::Disk {
                radius: 4,
                blocked_fraction: 0.9,
            },
            &mut rng,
        );
        let blocked: Vec<Hex> = board
            .tiles()
            .filter(|tile| tile.state == TileState::Blocked)
            .map(|tile| tile.hex)
            .collect();
        assert!(!blocked.is_empty());
        for hex in blocked {
            assert!(!board.is_walkable(hex));
            assert!(!board.claim(hex));
        }
        // Spawn ring is always open regardless of the fraction.
        assert!(board.is_walkable(Hex::ORIGIN));
        for n in crate::hex::neighbors(Hex::ORIGIN) {
            assert!(board.is_walkable(n));
        }
    }

    #[test]
    fn fully_claimed_counts_only_interactable_tiles() {
        let mut rng = Rng::new(11);
        let mut board = Board::generate(
            BoardSpec::Disk {
                radius: 2,
                blocked_fraction: 0.0,
            },
            &mut rng,
        );
        assert!(!board.is_fully_claimed());
        let remaining = board.unclaimed_hexes();
        assert_eq!(remaining.len(), 18);
        for hex in remaining {
            board.claim(hex);
        }
        assert!(board.is_fully_claimed());
    }

    #[test]
    fn random_unclaimed_is_deterministic_per_seed() {
        let make = || {
            let mut rng = Rng::new(77);
            let board = Board::generate(
                BoardSpec::Disk {
                    radius: 3,
                    blocked_fraction: 0.1,
                },
                &mut rng,
            );
            board.random_unclaimed(&mut rng)
        };
        assert_eq!(make(), make());
        assert!(make().is_some());
    }
}
