use super::GameEngine;
use crate::constants::{ARMOR_STUN_MS, STOMP_STUN_MS};
use crate::types::{DeathCause, EffectId, HazardKind, OutputEvent, PerkId, Phase};

/// Arrival resolution. Runs whenever the player or an adversary lands on a
/// tile: hazards first, then painting, collectible pickup, contact, and the
/// level-completion check. Teleport arrivals skip the hazard stage so a pad
/// cannot bounce the player back and forth.
impl GameEngine {
    pub(crate) fn resolve_player_arrival(&mut self, now: u64, via_teleport: bool) {
        if self.phase != Phase::Playing {
            return;
        }
        if !via_teleport {
            match self.hazard_at(self.player.hex).map(|h| h.kind) {
                Some(HazardKind::Spike { active: true }) => {
                    self.resolve_spike_contact();
                    if self.phase != Phase::Playing {
                        return;
                    }
                }
                Some(HazardKind::TeleportPad { target }) => {
                    self.teleport_player(target);
                    self.resolve_player_arrival(now, true);
                    return;
                }
                _ => {}
            }
        }

        let painted = self.paint_tile(self.player.hex, false);
        if painted && self.splash_active() {
            for neighbor in self.player.hex.neighbors() {
                self.paint_tile(neighbor, true);
            }
        }
        if self.perks.contains(&PerkId::Stomp) {
            self.stomp_adjacent(now);
        }

        if self.collectible.as_ref().map(|c| c.hex) == Some(self.player.hex) {
            self.pickup_collectible(now);
        }

        for idx in 0..self.adversaries.len() {
            self.resolve_contact(idx, now);
            if self.phase != Phase::Playing {
                return;
            }
        }

        self.check_level_completion();
    }

    pub(crate) fn resolve_adversary_arrival(&mut self, idx: usize, now: u64) {
        if self.phase != Phase::Playing {
            return;
        }
        self.resolve_contact(idx, now);
    }

    /// Shared coincidence rule. Defeat beats everything while adversaries
    /// are vulnerable; otherwise grace, armor and shield are consulted in
    /// that order before the contact is lethal.
    fn resolve_contact(&mut self, idx: usize, now: u64) {
        let adv = &self.adversaries[idx];
        if adv.hex != self.player.hex || now < adv.stunned_until {
            return;
        }
        let kind = adv.kind;
        if self.adversaries_vulnerable() && kind != crate::types::AdversaryKind::Fleeing {
            self.defeat_adversary(idx, now);
            return;
        }
        if now < self.grace_until {
            return;
        }
        if self.spike_armor_charges > 0 {
            self.spike_armor_charges -= 1;
            self.stun_adversary(idx, now, ARMOR_STUN_MS);
            return;
        }
        if self.has_effect(EffectId::Shield) {
            return;
        }
        self.player_died(DeathCause::Adversary);
    }

    pub(super) fn resolve_spike_contact(&mut self) {
        if self.has_effect(EffectId::Shield) {
            return;
        }
        self.player_died(DeathCause::Spike);
    }

    fn splash_active(&self) -> bool {
        self.perks.contains(&PerkId::SplashPaint) || self.has_effect(EffectId::AreaPaint)
    }

    fn stomp_adjacent(&mut self, now: u64) {
        let neighbors = self.player.hex.neighbors();
        for idx in 0..self.adversaries.len() {
            if neighbors.contains(&self.adversaries[idx].hex) {
                self.stun_adversary(idx, now, STOMP_STUN_MS);
            }
        }
    }

    fn stun_adversary(&mut self, idx: usize, now: u64, duration_ms: u64) {
        let until = now + duration_ms;
        if until <= self.adversaries[idx].stunned_until {
            return;
        }
        self.adversaries[idx].stunned_until = until;
        self.events.push(OutputEvent::AdversaryStunned {
            id: self.adversaries[idx].id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{bare_level, config, open_level};
    use super::super::GameEngine;
    use crate::constants::{
        ARMOR_STUN_MS, COMBO_DEFEAT_BONUS, DEFEAT_SCORE, GRACE_PERIOD_MS, PAINT_BASE_SCORE,
    };
    use crate::hex::Hex;
    use crate::types::{
        Dir, EffectId, Hazard, HazardKind, OutputEvent, PerkId, Phase, TileState,
    };

    #[test]
    fn landing_paints_and_scores_with_combo_scaling() {
        let mut engine = GameEngine::new(config(2, bare_level));
        engine.apply_intent(Dir::East);
        assert_eq!(engine.combo, 1);
        assert_eq!(engine.score, PAINT_BASE_SCORE);
        // Chained paint within the window scales by the combo counter.
        engine.perks.push(PerkId::DoubleJump);
        engine.apply_intent(Dir::SouthEast);
        assert_eq!(engine.combo, 2);
        assert_eq!(engine.score, PAINT_BASE_SCORE * 3);
    }

    #[test]
    fn repainting_a_claimed_tile_adds_nothing() {
        let mut engine = GameEngine::new(config(2, bare_level));
        engine.apply_intent(Dir::East);
        let score = engine.score;
        engine.player.motion = crate::types::MotionState::Idle;
        engine.player.jumps_used = 0;
        engine.apply_intent(Dir::West);
        // Origin was claimed at generation time.
        assert_eq!(engine.score, score);
        assert_eq!(engine.combo, 1);
    }

    #[test]
    fn splash_paint_claims_neighbors_without_combo_credit() {
        let mut engine = GameEngine::new(config(2, open_level));
        engine.perks.push(PerkId::SplashPaint);
        engine.apply_intent(Dir::East);
        for neighbor in Hex::new(1, 0).neighbors() {
            let tile = engine.board.top_tile(neighbor).unwrap();
            assert_eq!(tile.state, TileState::Claimed);
        }
        assert_eq!(engine.combo, 1);
        let events = engine.build_snapshot(true).events;
        let splashes = events
            .iter()
            .filter(|e| matches!(e, OutputEvent::TilePainted { splash: true, .. }))
            .count();
        // Six neighbors minus the already-claimed origin.
        assert_eq!(splashes, 5);
    }

    #[test]
    fn active_spike_kills_without_shield_and_not_with_it() {
        let mut engine = GameEngine::new(config(2, open_level));
        engine.hazards.push(Hazard {
            hex: Hex::new(1, 0),
            kind: HazardKind::Spike { active: true },
        });
        engine.activate_effect(EffectId::Shield, 1.0, 10_000);
        engine.apply_intent(Dir::East);
        assert_eq!(engine.phase, Phase::Playing);

        let mut doomed = GameEngine::new(config(2, open_level));
        doomed.hazards.push(Hazard {
            hex: Hex::new(1, 0),
            kind: HazardKind::Spike { active: true },
        });
        doomed.apply_intent(Dir::East);
        assert_eq!(doomed.phase, Phase::GameOver);
    }

    #[test]
    fn inactive_spike_is_safe_and_still_paintable() {
        let mut engine = GameEngine::new(config(2, open_level));
        engine.hazards.push(Hazard {
            hex: Hex::new(1, 0),
            kind: HazardKind::Spike { active: false },
        });
        engine.apply_intent(Dir::East);
        assert_eq!(engine.phase, Phase::Playing);
        let tile = engine.board.top_tile(Hex::new(1, 0)).unwrap();
        assert_eq!(tile.state, TileState::Claimed);
    }

    #[test]
    fn teleport_pad_relocates_and_skips_destination_hazards() {
        let mut engine = GameEngine::new(config(2, open_level));
        // Pads pointing at each other; arrival via pad must not re-trigger.
        engine.hazards.push(Hazard {
            hex: Hex::new(1, 0),
            kind: HazardKind::TeleportPad {
                target: Hex::new(-3, 0),
            },
        });
        engine.hazards.push(Hazard {
            hex: Hex::new(-3, 0),
            kind: HazardKind::TeleportPad {
                target: Hex::new(1, 0),
            },
        });
        engine.apply_intent(Dir::East);
        assert_eq!(engine.player.hex, Hex::new(-3, 0));
        // Destination painted on arrival; the pad tile itself was not.
        assert_eq!(
            engine.board.top_tile(Hex::new(-3, 0)).unwrap().state,
            TileState::Claimed
        );
        assert_eq!(
            engine.board.top_tile(Hex::new(1, 0)).unwrap().state,
            TileState::Unclaimed
        );
        let events = engine.build_snapshot(true).events;
        assert!(events.iter().any(|e| matches!(
            e,
            OutputEvent::PlayerTeleported { to } if *to == Hex::new(-3, 0)
        )));
    }

    #[test]
    fn vulnerable_contact_defeats_and_pays_out() {
        let mut engine = GameEngine::new(config(2, open_level));
        engine.activate_effect(EffectId::Vulnerability, 1.0, 8_000);
        engine.adversaries[0].hex = Hex::new(1, 0);
        let score = engine.score;
        engine.apply_intent(Dir::East);
        assert_eq!(engine.phase, Phase::Playing);
        assert!(engine.elapsed_ms < engine.adversaries[0].stunned_until);
        // Paint combo of 1, then the defeat bonus on top.
        assert_eq!(engine.combo, 1 + COMBO_DEFEAT_BONUS);
        assert!(engine.score >= score + DEFEAT_SCORE);
        let events = engine.build_snapshot(true).events;
        assert!(events
            .iter()
            .any(|e| matches!(e, OutputEvent::AdversaryDefeated { .. })));
    }

    #[test]
    fn spike_armor_consumes_a_charge_and_stuns_instead_of_dying() {
        let mut engine = GameEngine::new(config(2, open_level));
        engine.grace_until = 0;
        engine.elapsed_ms = GRACE_PERIOD_MS + 1;
        engine.spike_armor_charges = 1;
        engine.adversaries[0].hex = Hex::new(1, 0);
        engine.apply_intent(Dir::East);
        assert_eq!(engine.phase, Phase::Playing);
        assert_eq!(engine.spike_armor_charges, 0);
        assert_eq!(
            engine.adversaries[0].stunned_until,
            engine.elapsed_ms + ARMOR_STUN_MS
        );

        // Second contact has no charge left.
        engine.adversaries[0].stunned_until = 0;
        engine.resolve_adversary_arrival(0, engine.elapsed_ms);
        assert_eq!(engine.phase, Phase::GameOver);
    }

    #[test]
    fn stunned_adversary_contact_is_inert() {
        let mut engine = GameEngine::new(config(2, open_level));
        engine.grace_until = 0;
        engine.elapsed_ms = GRACE_PERIOD_MS + 1;
        engine.adversaries[0].hex = Hex::new(1, 0);
        engine.adversaries[0].stunned_until = engine.elapsed_ms + 1_000;
        engine.apply_intent(Dir::East);
        assert_eq!(engine.phase, Phase::Playing);
    }

    #[test]
    fn stomp_perk_stuns_adjacent_adversaries_on_landing() {
        let mut engine = GameEngine::new(config(2, open_level));
        engine.perks.push(PerkId::Stomp);
        engine.adversaries[0].hex = Hex::new(2, 0);
        engine.apply_intent(Dir::East);
        assert!(engine.elapsed_ms < engine.adversaries[0].stunned_until);
        let events = engine.build_snapshot(true).events;
        assert!(events
            .iter()
            .any(|e| matches!(e, OutputEvent::AdversaryStunned { .. })));
    }
}
