use crate::types::{AdversaryKind, BoardSpec, LevelConfig};

pub const TICK_RATE: u32 = 20;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const STEP_DURATION_MS: u64 = 150;
pub const COOLDOWN_BASE_MS: u64 = 150;
pub const COOLDOWN_MIN_MS: u64 = 20;

pub const COMBO_DECAY_MS: u64 = 1_000;
pub const COMBO_CAP: u32 = 10;
pub const COMBO_DEFEAT_BONUS: u32 = 5;
pub const PAINT_BASE_SCORE: i64 = 10;
pub const DEFEAT_SCORE: i64 = 120;
pub const LEVEL_BONUS_SCORE: i64 = 1_000;

pub const GRACE_PERIOD_MS: u64 = 2_000;
pub const LEVEL_ADVANCE_DELAY_MS: u64 = 1_000;
pub const PERK_CHOICES: usize = 3;

pub const SPIKE_PERIOD_MS: u64 = 2_500;
pub const DEFEAT_STUN_MS: u64 = 3_000;
pub const ARMOR_STUN_MS: u64 = 3_000;
pub const STOMP_STUN_MS: u64 = 2_000;
pub const TURRET_PERIOD_MS: u64 = 3_000;

pub const CHASER_DECIDE_MS: u64 = 800;
pub const DEFAULT_DECIDE_MS: u64 = 1_200;
/// Vulnerable adversaries think (and therefore move) slower.
pub const VULNERABLE_DECIDE_FACTOR: f32 = 1.5;

/// Pathfinding visit cap; disconnected or pathological boards fail closed.
pub const MAX_PATH_VISITS: usize = 4_096;

pub fn adversary_roster_for_level(level: u32) -> Vec<AdversaryKind> {
    let mut roster = vec![AdversaryKind::Chaser];
    if level >= 2 {
        roster.push(AdversaryKind::Ambusher);
    }
    if level >= 3 {
        roster.push(AdversaryKind::Patroller);
    }
    if level >= 4 {
        roster.push(AdversaryKind::Fleeing);
    }
    let extra_chasers = (level.saturating_sub(4) / 2).min(4);
    for _ in 0..extra_chasers {
        roster.push(AdversaryKind::Chaser);
    }
    roster
}

pub fn blocked_fraction_for_level(level: u32) -> f32 {
    (level.saturating_sub(1) as f32 * 0.04).min(0.2)
}

pub fn spike_count_for_level(level: u32) -> usize {
    ((level / 2) as usize).min(3)
}

pub fn teleport_pairs_for_level(level: u32) -> usize {
    usize::from(level >= 3)
}

pub fn default_level_config(level: u32) -> LevelConfig {
    LevelConfig {
        board: BoardSpec::Disk {
            radius: 4,
            blocked_fraction: blocked_fraction_for_level(level),
        },
        roster: adversary_roster_for_level(level),
        spike_count: spike_count_for_level(level),
        teleport_pairs: teleport_pairs_for_level(level),
        collectible_spawn_ms: 8_000,
        collectible_lifetime_ms: 12_000,
    }
}
