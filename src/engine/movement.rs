use super::{GameEngine, TimerKind};
use crate::constants::{COOLDOWN_BASE_MS, COOLDOWN_MIN_MS, STEP_DURATION_MS};
use crate::hex::{Facing, Hex};
use crate::pathfind::find_path;
use crate::types::{Dir, EffectId, MotionState, OutputEvent, PerkId, Phase};

/// Player movement: the idle/stepping/cooling gate, the mid-air jump
/// budget, and the BFS autopilot that feeds one hop per cooldown.
impl GameEngine {
    /// Manual step request. Preempts any autopilot route.
    pub fn apply_intent(&mut self, dir: Dir) {
        if self.phase != Phase::Playing {
            return;
        }
        self.player.path.clear();
        self.try_step(dir);
    }

    /// Routes the player to `target` with BFS and walks the route one hop
    /// per movement cycle. Unreachable targets are ignored.
    pub fn move_to(&mut self, target: Hex) {
        if self.phase != Phase::Playing {
            return;
        }
        let Some(path) = find_path(&self.board, self.player.hex, target) else {
            return;
        };
        // The first element is the tile we are standing on.
        self.player.path = path.into_iter().skip(1).collect();
        if self.player.motion == MotionState::Idle {
            self.advance_autopilot();
        }
    }

    /// One extra mid-air step per owned double-jump perk, plus any active
    /// jump power-up.
    pub(crate) fn jump_budget(&self) -> u32 {
        let perk_jumps = self
            .perks
            .iter()
            .filter(|p| **p == PerkId::DoubleJump)
            .count() as u32;
        let effect_jumps = self
            .active_effects
            .get(&EffectId::ExtraJump)
            .map(|a| a.magnitude as u32)
            .unwrap_or(0);
        1 + perk_jumps + effect_jumps
    }

    fn speed_multiplier(&self) -> f32 {
        let mut speed = 1.0;
        if self.perks.contains(&PerkId::SpeedDemon) {
            speed *= 1.6;
        }
        if let Some(active) = self.active_effects.get(&EffectId::SpeedBoost) {
            speed *= active.magnitude;
        }
        speed
    }

    fn cooldown_ms(&self) -> u64 {
        let scaled = (COOLDOWN_BASE_MS as f32 / self.speed_multiplier()) as u64;
        scaled.max(COOLDOWN_MIN_MS)
    }

    fn try_step(&mut self, dir: Dir) {
        match self.player.motion {
            MotionState::Idle => {}
            MotionState::Stepping if self.player.jumps_used < self.jump_budget() => {}
            _ => return,
        }
        let (dq, dr) = dir.delta();
        let dest = self.player.hex.offset(dq, dr);
        if !self.board.is_walkable(dest) {
            return;
        }
        self.player.hex = dest;
        if let Some(facing) = Facing::from_delta(dq, dr) {
            self.player.facing = facing;
        }
        self.player.jumps_used += 1;
        self.player.motion = MotionState::Stepping;
        self.player.motion_gen += 1;
        self.timers.schedule(
            self.elapsed_ms + STEP_DURATION_MS,
            TimerKind::StepEnd {
                gen: self.player.motion_gen,
            },
        );
        self.resolve_player_arrival(self.elapsed_ms, false);
    }

    pub(super) fn on_step_end(&mut self, gen: u64, now: u64) {
        if gen != self.player.motion_gen || self.player.motion != MotionState::Stepping {
            return;
        }
        self.player.motion = MotionState::Cooling;
        self.timers.schedule(
            now + self.cooldown_ms(),
            TimerKind::CooldownEnd {
                gen: self.player.motion_gen,
            },
        );
    }

    pub(super) fn on_cooldown_end(&mut self, gen: u64, _now: u64) {
        if gen != self.player.motion_gen || self.player.motion != MotionState::Cooling {
            return;
        }
        self.player.motion = MotionState::Idle;
        self.player.jumps_used = 0;
        if self.phase == Phase::Playing {
            self.advance_autopilot();
        }
    }

    /// Issues the next queued hop. A hop invalidated by board state since
    /// planning abandons the whole route.
    fn advance_autopilot(&mut self) {
        let Some(&next) = self.player.path.front() else {
            return;
        };
        let dq = next.q - self.player.hex.q;
        let dr = next.r - self.player.hex.r;
        match Dir::from_delta(dq, dr) {
            Some(dir) if self.board.is_walkable(next) => {
                self.player.path.pop_front();
                self.try_step(dir);
            }
            _ => self.player.path.clear(),
        }
    }

    /// Unconditional relocation. Skips the step/cooldown cycle and cancels
    /// pending motion timers via the generation bump.
    pub(crate) fn teleport_player(&mut self, target: Hex) {
        self.player.hex = target;
        self.player.path.clear();
        self.player.motion = MotionState::Idle;
        self.player.jumps_used = 0;
        self.player.motion_gen += 1;
        self.events.push(OutputEvent::PlayerTeleported { to: target });
    }
}
