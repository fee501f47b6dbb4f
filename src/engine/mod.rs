use std::collections::{BTreeMap, VecDeque};

use crate::board::Board;
use crate::constants::{
    COMBO_CAP, COMBO_DECAY_MS, COMBO_DEFEAT_BONUS, DEFEAT_SCORE, DEFEAT_STUN_MS,
    LEVEL_ADVANCE_DELAY_MS, LEVEL_BONUS_SCORE, PAINT_BASE_SCORE, PERK_CHOICES, TURRET_PERIOD_MS,
};
use crate::hex::{Facing, Hex};
use crate::rng::Rng;
use crate::scheduler::Scheduler;
use crate::types::{
    AdversaryKind, AdversaryView, BoardSpec, CollectibleView, DeathCause, EffectId, Hazard,
    LevelConfig, MotionState, OutputEvent, PerkId, Phase, PlayerView, SessionConfig, Snapshot,
};

mod adversary;
mod hazards;
mod movement;
mod resolver;

#[derive(Clone, Debug)]
pub(crate) struct PlayerInternal {
    hex: Hex,
    facing: Facing,
    motion: MotionState,
    jumps_used: u32,
    motion_gen: u64,
    path: VecDeque<Hex>,
}

#[derive(Clone, Debug)]
pub(crate) struct AdversaryInternal {
    id: String,
    kind: AdversaryKind,
    hex: Hex,
    facing: Facing,
    stunned_until: u64,
}

#[derive(Clone, Copy, Debug)]
struct ActiveEffect {
    gen: u64,
    magnitude: f32,
}

#[derive(Clone, Debug)]
pub(crate) struct CollectibleInternal {
    hex: Hex,
    effect: EffectId,
    magnitude: f32,
    duration_ms: u64,
    expires_at: u64,
    gen: u64,
}

/// Deferred work items. Stale entries carry a generation their handler
/// compares against, so a timer that outlives its owner is a no-op.
#[derive(Clone, Copy, Debug)]
enum TimerKind {
    StepEnd { gen: u64 },
    CooldownEnd { gen: u64 },
    AdversaryDecide { idx: usize },
    SpikeToggle { idx: usize, gen: u64 },
    CollectibleSpawn { gen: u64 },
    CollectibleExpire { gen: u64 },
    EffectExpire { effect: EffectId, gen: u64 },
    ComboDecay { gen: u64 },
    LevelAdvance { gen: u64 },
    TurretFire,
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    config: SessionConfig,
    rng: Rng,
    timers: Scheduler<TimerKind>,

    board: Board,
    board_gen: u64,
    level_cfg: LevelConfig,
    level: u32,
    phase: Phase,
    grace_until: u64,

    player: PlayerInternal,
    adversaries: Vec<AdversaryInternal>,
    hazards: Vec<Hazard>,
    collectible: Option<CollectibleInternal>,
    collectible_gen: u64,
    active_effects: BTreeMap<EffectId, ActiveEffect>,
    effect_gen: u64,

    perks: Vec<PerkId>,
    perk_offers: Vec<PerkId>,
    spike_armor_charges: u32,
    turret_count: u32,

    combo: u32,
    combo_gen: u64,
    score: i64,

    events: Vec<OutputEvent>,
    elapsed_ms: u64,
    tick: u64,
    next_id: u64,
}

impl GameEngine {
    pub fn new(config: SessionConfig) -> Self {
        let rng = Rng::new(config.seed);
        let level_cfg = (config.level_table)(1);
        let mut engine = Self {
            config,
            rng,
            timers: Scheduler::new(),
            board: Board::default(),
            board_gen: 0,
            level_cfg,
            level: 1,
            phase: Phase::Playing,
            grace_until: 0,
            player: PlayerInternal {
                hex: Hex::ORIGIN,
                facing: Facing::Down,
                motion: MotionState::Idle,
                jumps_used: 0,
                motion_gen: 0,
                path: VecDeque::new(),
            },
            adversaries: Vec::new(),
            hazards: Vec::new(),
            collectible: None,
            collectible_gen: 0,
            active_effects: BTreeMap::new(),
            effect_gen: 0,
            perks: Vec::new(),
            perk_offers: Vec::new(),
            spike_armor_charges: 0,
            turret_count: 0,
            combo: 0,
            combo_gen: 0,
            score: 0,
            events: Vec::new(),
            elapsed_ms: 0,
            tick: 0,
            next_id: 1,
        };
        engine.enter_level();
        engine
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn player_hex(&self) -> Hex {
        self.player.hex
    }

    /// Remaining paint targets, in deterministic order. Drives scripted
    /// pilots in the scenario runner.
    pub fn unclaimed_hexes(&self) -> Vec<Hex> {
        self.board.unclaimed_hexes()
    }

    pub fn perk_offers(&self) -> &[PerkId] {
        &self.perk_offers
    }

    /// Advances the simulation clock and drains every due timer in deadline
    /// order. All engine behavior hangs off these timers; there is no
    /// per-tick sweep.
    pub fn step(&mut self, dt_ms: u64) {
        if self.phase == Phase::GameOver {
            return;
        }
        self.tick += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        let now = self.elapsed_ms;
        while let Some(kind) = self.timers.pop_due(now) {
            self.handle_timer(kind, now);
            if self.phase == Phase::GameOver {
                break;
            }
        }
    }

    fn handle_timer(&mut self, kind: TimerKind, now: u64) {
        match kind {
            TimerKind::StepEnd { gen } => self.on_step_end(gen, now),
            TimerKind::CooldownEnd { gen } => self.on_cooldown_end(gen, now),
            TimerKind::AdversaryDecide { idx } => self.on_adversary_decide(idx, now),
            TimerKind::SpikeToggle { idx, gen } => self.on_spike_toggle(idx, gen, now),
            TimerKind::CollectibleSpawn { gen } => self.on_collectible_spawn(gen, now),
            TimerKind::CollectibleExpire { gen } => self.on_collectible_expire(gen, now),
            TimerKind::EffectExpire { effect, gen } => {
                let stale = self
                    .active_effects
                    .get(&effect)
                    .map(|active| active.gen != gen)
                    .unwrap_or(true);
                if !stale {
                    self.active_effects.remove(&effect);
                }
            }
            TimerKind::ComboDecay { gen } => {
                if gen == self.combo_gen && self.combo > 0 {
                    self.combo = 0;
                    self.events.push(OutputEvent::ComboChanged { count: 0 });
                }
            }
            TimerKind::LevelAdvance { gen } => {
                if gen == self.board_gen && self.phase == Phase::LevelComplete {
                    self.open_perk_selection();
                }
            }
            TimerKind::TurretFire => self.on_turret_fire(now),
        }
    }

    // ---- level / session machinery -------------------------------------

    /// (Re)generates the board, hazards and roster for `self.level`. The
    /// player keeps perks and score, position resets to the origin, and the
    /// grace window restarts.
    fn enter_level(&mut self) {
        self.board_gen += 1;
        self.level_cfg = (self.config.level_table)(self.level);
        self.board = Board::generate(self.level_cfg.board, &mut self.rng);

        let now = self.elapsed_ms;
        self.player.hex = Hex::ORIGIN;
        self.player.motion = MotionState::Idle;
        self.player.jumps_used = 0;
        self.player.motion_gen += 1;
        self.player.path.clear();

        self.active_effects.clear();
        self.combo = 0;
        self.combo_gen += 1;
        self.collectible = None;
        self.grace_until = now + self.config.grace_period_ms;

        self.place_hazards(now);
        self.timers.schedule(
            now + self.level_cfg.collectible_spawn_ms,
            TimerKind::CollectibleSpawn {
                gen: self.board_gen,
            },
        );
        self.sync_roster(now);
        self.phase = Phase::Playing;
    }

    fn sync_roster(&mut self, now: u64) {
        let roster = self.level_cfg.roster.clone();
        while self.adversaries.len() < roster.len() {
            let kind = roster[self.adversaries.len()];
            self.spawn_adversary(kind, now);
        }
        // Everyone respawns away from the reset spawn area.
        for idx in 0..self.adversaries.len() {
            let hex = self.pick_adversary_spawn(idx);
            self.adversaries[idx].hex = hex;
            self.adversaries[idx].stunned_until = 0;
        }
    }

    fn complete_level(&mut self) {
        self.phase = Phase::LevelComplete;
        self.add_score(LEVEL_BONUS_SCORE);
        self.events.push(OutputEvent::LevelCompleted { level: self.level });
        self.timers.schedule(
            self.elapsed_ms + LEVEL_ADVANCE_DELAY_MS,
            TimerKind::LevelAdvance {
                gen: self.board_gen,
            },
        );
    }

    fn open_perk_selection(&mut self) {
        self.perk_offers = self.draw_perk_offers();
        // Nothing to offer (empty catalog): selection would never resolve,
        // so go straight to the next level.
        if self.perk_offers.is_empty() {
            self.advance_level();
            return;
        }
        self.phase = Phase::PerkSelection;
        self.events.push(OutputEvent::PerkOffered {
            perks: self.perk_offers.clone(),
        });
    }

    /// Bounded random subset, without replacement, unowned perks first.
    fn draw_perk_offers(&mut self) -> Vec<PerkId> {
        let catalog: Vec<PerkId> = self.config.perk_catalog.iter().map(|p| p.id).collect();
        let mut pool: Vec<PerkId> = catalog
            .iter()
            .copied()
            .filter(|id| !self.perks.contains(id))
            .collect();
        if pool.len() < PERK_CHOICES {
            pool = catalog;
        }
        let mut offers = Vec::new();
        while offers.len() < PERK_CHOICES && !pool.is_empty() {
            let idx = self.rng.pick_index(pool.len());
            offers.push(pool.swap_remove(idx));
        }
        offers
    }

    /// Only valid while perk selection blocks the simulation; unknown or
    /// unoffered ids are ignored.
    pub fn choose_perk(&mut self, perk: PerkId) {
        if self.phase != Phase::PerkSelection || !self.perk_offers.contains(&perk) {
            return;
        }
        self.perks.push(perk);
        match perk {
            PerkId::SpikeArmor => self.spike_armor_charges += 1,
            PerkId::Turret => {
                self.turret_count += 1;
                if self.turret_count == 1 {
                    self.timers
                        .schedule(self.elapsed_ms + TURRET_PERIOD_MS, TimerKind::TurretFire);
                }
            }
            _ => {}
        }
        self.events.push(OutputEvent::PerkChosen { perk });
        self.perk_offers.clear();
        self.advance_level();
    }

    fn advance_level(&mut self) {
        self.level += 1;
        self.enter_level();
    }

    fn on_turret_fire(&mut self, now: u64) {
        self.timers
            .schedule(now + TURRET_PERIOD_MS, TimerKind::TurretFire);
        if self.phase != Phase::Playing || self.turret_count == 0 {
            return;
        }
        if let Some(hex) = self.board.random_unclaimed(&mut self.rng) {
            self.paint_tile(hex, true);
            self.check_level_completion();
        }
    }

    pub(crate) fn check_level_completion(&mut self) {
        if self.phase == Phase::Playing && self.board.is_fully_claimed() {
            self.complete_level();
        }
    }

    // ---- combo / score --------------------------------------------------

    /// Claims a tile and applies scoring. Splash paints (area effects,
    /// turrets) score at the base rate and never touch the combo counter.
    pub(crate) fn paint_tile(&mut self, hex: Hex, splash: bool) -> bool {
        if !self.board.claim(hex) {
            return false;
        }
        self.events.push(OutputEvent::TilePainted { hex, splash });
        let delta = if splash {
            PAINT_BASE_SCORE
        } else {
            self.bump_combo(1);
            PAINT_BASE_SCORE * i64::from(self.combo.min(COMBO_CAP))
        };
        self.add_score(delta * self.score_multiplier());
        true
    }

    fn bump_combo(&mut self, amount: u32) {
        self.combo += amount;
        self.combo_gen += 1;
        self.timers.schedule(
            self.elapsed_ms + COMBO_DECAY_MS,
            TimerKind::ComboDecay {
                gen: self.combo_gen,
            },
        );
        self.events.push(OutputEvent::ComboChanged { count: self.combo });
    }

    fn score_multiplier(&self) -> i64 {
        self.active_effects
            .get(&EffectId::DoubleScore)
            .map(|active| active.magnitude as i64)
            .unwrap_or(1)
            .max(1)
    }

    fn add_score(&mut self, delta: i64) {
        if delta == 0 {
            return;
        }
        self.score += delta;
        self.events.push(OutputEvent::ScoreChanged { delta });
    }

    pub(crate) fn defeat_adversary(&mut self, idx: usize, now: u64) {
        self.adversaries[idx].stunned_until = now + DEFEAT_STUN_MS;
        self.events.push(OutputEvent::AdversaryDefeated {
            id: self.adversaries[idx].id.clone(),
        });
        self.bump_combo(COMBO_DEFEAT_BONUS);
        self.add_score(DEFEAT_SCORE);
    }

    pub(crate) fn player_died(&mut self, cause: DeathCause) {
        self.events.push(OutputEvent::PlayerDied { cause });
        self.phase = Phase::GameOver;
    }

    // ---- shared helpers -------------------------------------------------

    pub(crate) fn adversaries_vulnerable(&self) -> bool {
        self.active_effects.contains_key(&EffectId::Vulnerability)
    }

    pub(crate) fn has_effect(&self, effect: EffectId) -> bool {
        self.active_effects.contains_key(&effect)
    }

    pub(crate) fn board_radius(&self) -> i32 {
        match self.level_cfg.board {
            BoardSpec::Disk { radius, .. } => radius,
            BoardSpec::Pyramid { layers } => layers - 1,
        }
    }

    fn make_id(&mut self, prefix: &str) -> String {
        let id = format!("{}_{}", prefix, self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    // ---- snapshot -------------------------------------------------------

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let vulnerable = self.adversaries_vulnerable();
        let now = self.elapsed_ms;
        let snapshot = Snapshot {
            tick: self.tick,
            now_ms: now,
            level: self.level,
            phase: self.phase,
            score: self.score,
            combo: self.combo,
            painted_tiles: self.board.painted_tiles(),
            paintable_tiles: self.board.paintable_tiles(),
            player: PlayerView {
                hex: self.player.hex,
                facing: self.player.facing,
                motion: self.player.motion,
                jump_budget: self.jump_budget(),
                active_effects: self.active_effects.keys().copied().collect(),
                perks: self.perks.clone(),
            },
            adversaries: self
                .adversaries
                .iter()
                .map(|adv| AdversaryView {
                    id: adv.id.clone(),
                    kind: adv.kind,
                    hex: adv.hex,
                    facing: adv.facing,
                    vulnerable: vulnerable && adv.kind != AdversaryKind::Fleeing,
                    stunned: now < adv.stunned_until,
                })
                .collect(),
            hazards: self.hazards.clone(),
            collectibles: self
                .collectible
                .iter()
                .map(|c| CollectibleView {
                    hex: c.hex,
                    effect: c.effect,
                    expires_at_ms: c.expires_at,
                })
                .collect(),
            perk_offers: self.perk_offers.clone(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::constants;
    use crate::types::{AdversaryKind, BoardSpec, LevelConfig, SessionConfig};

    /// Open radius-5 disk, one chaser, no hazards. Big enough for the AI
    /// scenarios and free of random walls.
    pub fn open_level(_level: u32) -> LevelConfig {
        LevelConfig {
            board: BoardSpec::Disk {
                radius: 5,
                blocked_fraction: 0.0,
            },
            roster: vec![AdversaryKind::Chaser],
            spike_count: 0,
            teleport_pairs: 0,
            collectible_spawn_ms: 600_000,
            collectible_lifetime_ms: 600_000,
        }
    }

    /// Radius-2 disk with no adversaries or hazards at all.
    pub fn bare_level(_level: u32) -> LevelConfig {
        LevelConfig {
            board: BoardSpec::Disk {
                radius: 2,
                blocked_fraction: 0.0,
            },
            roster: Vec::new(),
            spike_count: 0,
            teleport_pairs: 0,
            collectible_spawn_ms: 600_000,
            collectible_lifetime_ms: 600_000,
        }
    }

    pub fn config(seed: u32, table: fn(u32) -> LevelConfig) -> SessionConfig {
        SessionConfig {
            seed,
            level_table: table,
            grace_period_ms: constants::GRACE_PERIOD_MS,
            ..SessionConfig::default()
        }
    }
}
