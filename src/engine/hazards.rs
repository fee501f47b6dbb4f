use super::{ActiveEffect, CollectibleInternal, GameEngine, TimerKind};
use crate::constants::SPIKE_PERIOD_MS;
use crate::hex::{hex_distance, Hex};
use crate::types::{EffectId, Hazard, HazardKind, OutputEvent, Phase};

/// Hazard placement and the collectible lifecycle. Spikes toggle on a
/// fixed cadence with a randomized phase per spike; teleport pads come in
/// mutually-targeting pairs; at most one collectible exists at a time.
impl GameEngine {
    pub(super) fn place_hazards(&mut self, now: u64) {
        self.hazards.clear();
        let mut pool: Vec<Hex> = self
            .board
            .tiles()
            .map(|tile| tile.hex)
            .filter(|hex| self.board.is_walkable(*hex) && hex_distance(*hex, Hex::ORIGIN) >= 2)
            .collect();

        for _ in 0..self.level_cfg.spike_count {
            if pool.is_empty() {
                break;
            }
            let hex = pool.swap_remove(self.rng.pick_index(pool.len()));
            let idx = self.hazards.len();
            self.hazards.push(Hazard {
                hex,
                kind: HazardKind::Spike { active: false },
            });
            // Randomized phase so spikes on a board do not pulse in lockstep.
            let first = now + self.rng.int(500, SPIKE_PERIOD_MS as i32) as u64;
            self.timers.schedule(
                first,
                TimerKind::SpikeToggle {
                    idx,
                    gen: self.board_gen,
                },
            );
        }

        for _ in 0..self.level_cfg.teleport_pairs {
            if pool.len() < 2 {
                break;
            }
            let a = pool.swap_remove(self.rng.pick_index(pool.len()));
            let b = pool.swap_remove(self.rng.pick_index(pool.len()));
            self.hazards.push(Hazard {
                hex: a,
                kind: HazardKind::TeleportPad { target: b },
            });
            self.hazards.push(Hazard {
                hex: b,
                kind: HazardKind::TeleportPad { target: a },
            });
        }
    }

    pub(super) fn on_spike_toggle(&mut self, idx: usize, gen: u64, now: u64) {
        if gen != self.board_gen || idx >= self.hazards.len() {
            return;
        }
        self.timers
            .schedule(now + SPIKE_PERIOD_MS, TimerKind::SpikeToggle { idx, gen });
        if self.phase != Phase::Playing {
            return;
        }
        let hex = self.hazards[idx].hex;
        let now_active = match &mut self.hazards[idx].kind {
            HazardKind::Spike { active } => {
                *active = !*active;
                *active
            }
            _ => return,
        };
        // A spike erupting under the player counts as stepping onto it.
        if now_active && self.player.hex == hex {
            self.resolve_spike_contact();
        }
    }

    pub(super) fn hazard_at(&self, hex: Hex) -> Option<&Hazard> {
        self.hazards.iter().find(|h| h.hex == hex)
    }

    // ---- collectibles ---------------------------------------------------

    pub(super) fn on_collectible_spawn(&mut self, gen: u64, now: u64) {
        if gen != self.board_gen {
            return;
        }
        if self.phase != Phase::Playing
            || self.collectible.is_some()
            || self.config.power_up_catalog.is_empty()
        {
            self.timers.schedule(
                now + self.level_cfg.collectible_spawn_ms,
                TimerKind::CollectibleSpawn { gen },
            );
            return;
        }
        let candidates: Vec<Hex> = self
            .board
            .unclaimed_hexes()
            .into_iter()
            .filter(|hex| *hex != self.player.hex && self.hazard_at(*hex).is_none())
            .collect();
        if candidates.is_empty() {
            self.timers.schedule(
                now + self.level_cfg.collectible_spawn_ms,
                TimerKind::CollectibleSpawn { gen },
            );
            return;
        }
        let hex = candidates[self.rng.pick_index(candidates.len())];
        let def = &self.config.power_up_catalog[self.rng.pick_index(self.config.power_up_catalog.len())];
        let (effect, magnitude, duration_ms) = (def.effect, def.magnitude, def.duration_ms);
        self.collectible_gen += 1;
        let expires_at = now + self.level_cfg.collectible_lifetime_ms;
        self.collectible = Some(CollectibleInternal {
            hex,
            effect,
            magnitude,
            duration_ms,
            expires_at,
            gen: self.collectible_gen,
        });
        self.timers.schedule(
            expires_at,
            TimerKind::CollectibleExpire {
                gen: self.collectible_gen,
            },
        );
        self.events
            .push(OutputEvent::CollectibleSpawned { hex, effect });
    }

    pub(super) fn on_collectible_expire(&mut self, gen: u64, now: u64) {
        let live = self.collectible.as_ref().map(|c| c.gen) == Some(gen);
        if !live {
            return;
        }
        self.collectible = None;
        self.timers.schedule(
            now + self.level_cfg.collectible_spawn_ms,
            TimerKind::CollectibleSpawn {
                gen: self.board_gen,
            },
        );
    }

    pub(super) fn pickup_collectible(&mut self, now: u64) {
        let Some(collectible) = self.collectible.take() else {
            return;
        };
        self.events.push(OutputEvent::PowerUpActivated {
            effect: collectible.effect,
        });
        if collectible.duration_ms == 0 {
            self.apply_instant_effect(collectible.effect, now);
        } else {
            self.activate_effect(collectible.effect, collectible.magnitude, collectible.duration_ms);
        }
        self.timers.schedule(
            now + self.level_cfg.collectible_spawn_ms,
            TimerKind::CollectibleSpawn {
                gen: self.board_gen,
            },
        );
    }

    /// Timed effect activation. Re-activating an effect refreshes its
    /// deadline; the old expiry becomes stale via the generation.
    pub(super) fn activate_effect(&mut self, effect: EffectId, magnitude: f32, duration_ms: u64) {
        self.effect_gen += 1;
        self.active_effects.insert(
            effect,
            ActiveEffect {
                gen: self.effect_gen,
                magnitude,
            },
        );
        self.timers.schedule(
            self.elapsed_ms + duration_ms,
            TimerKind::EffectExpire {
                effect,
                gen: self.effect_gen,
            },
        );
    }

    fn apply_instant_effect(&mut self, effect: EffectId, now: u64) {
        match effect {
            EffectId::PaintBurst => {
                for neighbor in self.player.hex.neighbors() {
                    self.paint_tile(neighbor, true);
                }
                self.check_level_completion();
            }
            EffectId::Recenter => {
                self.teleport_player(Hex::ORIGIN);
                self.resolve_player_arrival(now, true);
            }
            _ => {}
        }
    }
}
