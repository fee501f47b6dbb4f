use super::{AdversaryInternal, GameEngine, TimerKind};
use crate::constants::{CHASER_DECIDE_MS, DEFAULT_DECIDE_MS, VULNERABLE_DECIDE_FACTOR};
use crate::hex::{hex_distance, Facing, Hex};
use crate::types::{AdversaryKind, Phase};

fn sign(v: i32) -> i32 {
    v.signum()
}

/// Adversary behaviors. Each adversary re-evaluates on its own cadence
/// timer, picks a target by kind, and commits at most one axial step.
impl GameEngine {
    pub(super) fn spawn_adversary(&mut self, kind: AdversaryKind, now: u64) {
        let id = self.make_id("adv");
        self.adversaries.push(AdversaryInternal {
            id,
            kind,
            hex: Hex::ORIGIN,
            facing: Facing::Down,
            stunned_until: 0,
        });
        let idx = self.adversaries.len() - 1;
        self.adversaries[idx].hex = self.pick_adversary_spawn(idx);
        self.timers.schedule(
            now + self.decide_period(kind),
            TimerKind::AdversaryDecide { idx },
        );
    }

    /// Walkable tile away from the reset spawn area and from other
    /// adversaries. Falls back to any walkable tile on crowded boards.
    pub(super) fn pick_adversary_spawn(&mut self, idx: usize) -> Hex {
        let occupied: Vec<Hex> = self
            .adversaries
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, adv)| adv.hex)
            .collect();
        let mut candidates: Vec<Hex> = self
            .board
            .tiles()
            .map(|tile| tile.hex)
            .filter(|hex| {
                self.board.is_walkable(*hex)
                    && hex_distance(*hex, self.player.hex) >= 3
                    && !occupied.contains(hex)
            })
            .collect();
        if candidates.is_empty() {
            candidates = self
                .board
                .tiles()
                .map(|tile| tile.hex)
                .filter(|hex| self.board.is_walkable(*hex) && *hex != self.player.hex)
                .collect();
        }
        if candidates.is_empty() {
            return Hex::ORIGIN;
        }
        candidates[self.rng.pick_index(candidates.len())]
    }

    fn decide_period(&self, kind: AdversaryKind) -> u64 {
        let base = match kind {
            AdversaryKind::Chaser => CHASER_DECIDE_MS,
            _ => DEFAULT_DECIDE_MS,
        };
        if self.adversaries_vulnerable() && kind != AdversaryKind::Fleeing {
            (base as f32 * VULNERABLE_DECIDE_FACTOR) as u64
        } else {
            base
        }
    }

    pub(super) fn on_adversary_decide(&mut self, idx: usize, now: u64) {
        if idx >= self.adversaries.len() {
            return;
        }
        let kind = self.adversaries[idx].kind;
        self.timers.schedule(
            now + self.decide_period(kind),
            TimerKind::AdversaryDecide { idx },
        );
        if self.phase != Phase::Playing || now < self.adversaries[idx].stunned_until {
            return;
        }
        self.adversary_decide(idx, now);
    }

    fn adversary_decide(&mut self, idx: usize, now: u64) {
        let here = self.adversaries[idx].hex;
        let kind = self.adversaries[idx].kind;
        let player = self.player.hex;
        let fleeing_player = self.adversaries_vulnerable() && kind != AdversaryKind::Fleeing;

        let (mut dq, mut dr) = if fleeing_player {
            // Run from the player instead of toward the kind's target.
            (-sign(player.q - here.q), -sign(player.r - here.r))
        } else {
            let target = self.pick_target(idx, now);
            (sign(target.q - here.q), sign(target.r - here.r))
        };
        // One axial component per step.
        if dq != 0 && dr != 0 {
            if self.rng.bool(0.5) {
                dr = 0;
            } else {
                dq = 0;
            }
        }
        if dq == 0 && dr == 0 {
            return;
        }
        let dest = here.offset(dq, dr);
        if !self.board.is_walkable(dest) {
            return;
        }
        self.adversaries[idx].hex = dest;
        if let Some(facing) = Facing::from_delta(dq, dr) {
            self.adversaries[idx].facing = facing;
        }
        self.resolve_adversary_arrival(idx, now);
    }

    fn pick_target(&mut self, idx: usize, _now: u64) -> Hex {
        let here = self.adversaries[idx].hex;
        let player = self.player.hex;
        let radius = self.board_radius();
        match self.adversaries[idx].kind {
            AdversaryKind::Chaser => player,
            // Aims a few tiles past the player; the lead sign re-rolls each
            // decision, so the ambush point jitters around the player.
            AdversaryKind::Ambusher => {
                player.offset(4 * self.rng.sign(), 4 * self.rng.sign())
            }
            AdversaryKind::Patroller => {
                if hex_distance(here, Hex::ORIGIN) < (radius + 1) / 2 {
                    let edge_q = if here.q >= 0 { radius + 1 } else { -(radius + 1) };
                    Hex::new(edge_q, 0)
                } else {
                    Hex::new(
                        self.rng.int(-radius, radius),
                        self.rng.int(-radius, radius),
                    )
                }
            }
            // Reflection of the player through the adversary; always points
            // directly away. May land off-board, which only shapes the delta.
            AdversaryKind::Fleeing => {
                Hex::new(2 * here.q - player.q, 2 * here.r - player.r)
            }
        }
    }
}
