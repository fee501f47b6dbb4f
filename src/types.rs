use serde::Serialize;

use crate::hex::{Facing, Hex, HEX_DIRS};

/// One of the six axial step directions, in canonical enumeration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dir {
    East,
    West,
    SouthEast,
    NorthWest,
    NorthEast,
    SouthWest,
}

impl Dir {
    pub const ALL: [Dir; 6] = [
        Dir::East,
        Dir::West,
        Dir::SouthEast,
        Dir::NorthWest,
        Dir::NorthEast,
        Dir::SouthWest,
    ];

    pub fn delta(self) -> (i32, i32) {
        HEX_DIRS[self as usize]
    }

    pub fn from_delta(dq: i32, dr: i32) -> Option<Self> {
        Dir::ALL.iter().copied().find(|d| d.delta() == (dq, dr))
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "east" => Some(Self::East),
            "west" => Some(Self::West),
            "south_east" => Some(Self::SouthEast),
            "north_west" => Some(Self::NorthWest),
            "north_east" => Some(Self::NorthEast),
            "south_west" => Some(Self::SouthWest),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileState {
    Unclaimed,
    Claimed,
    Blocked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub hex: Hex,
    pub state: TileState,
    pub height: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    Idle,
    Stepping,
    Cooling,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdversaryKind {
    Chaser,
    Ambusher,
    Patroller,
    Fleeing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum HazardKind {
    Spike { active: bool },
    TeleportPad { target: Hex },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Hazard {
    pub hex: Hex,
    #[serde(flatten)]
    pub kind: HazardKind,
}

/// Symbolic effect ids the engine knows how to apply. Catalogs reference
/// these; the engine never needs the full catalog entry beyond id,
/// magnitude and duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectId {
    Vulnerability,
    SpeedBoost,
    Shield,
    AreaPaint,
    ExtraJump,
    DoubleScore,
    PaintBurst,
    Recenter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerkId {
    DoubleJump,
    SpeedDemon,
    SpikeArmor,
    Stomp,
    SplashPaint,
    Turret,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Playing,
    LevelComplete,
    PerkSelection,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    Adversary,
    Spike,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputEvent {
    TilePainted {
        hex: Hex,
        splash: bool,
    },
    ComboChanged {
        count: u32,
    },
    ScoreChanged {
        delta: i64,
    },
    AdversaryDefeated {
        id: String,
    },
    AdversaryStunned {
        id: String,
    },
    PlayerDied {
        cause: DeathCause,
    },
    PlayerTeleported {
        to: Hex,
    },
    LevelCompleted {
        level: u32,
    },
    PowerUpActivated {
        effect: EffectId,
    },
    CollectibleSpawned {
        hex: Hex,
        effect: EffectId,
    },
    PerkOffered {
        perks: Vec<PerkId>,
    },
    PerkChosen {
        perk: PerkId,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub hex: Hex,
    pub facing: Facing,
    pub motion: MotionState,
    #[serde(rename = "jumpBudget")]
    pub jump_budget: u32,
    #[serde(rename = "activeEffects")]
    pub active_effects: Vec<EffectId>,
    pub perks: Vec<PerkId>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AdversaryView {
    pub id: String,
    pub kind: AdversaryKind,
    pub hex: Hex,
    pub facing: Facing,
    pub vulnerable: bool,
    pub stunned: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct CollectibleView {
    pub hex: Hex,
    pub effect: EffectId,
    #[serde(rename = "expiresAtMs")]
    pub expires_at_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub level: u32,
    pub phase: Phase,
    pub score: i64,
    pub combo: u32,
    #[serde(rename = "paintedTiles")]
    pub painted_tiles: usize,
    #[serde(rename = "paintableTiles")]
    pub paintable_tiles: usize,
    pub player: PlayerView,
    pub adversaries: Vec<AdversaryView>,
    pub hazards: Vec<Hazard>,
    pub collectibles: Vec<CollectibleView>,
    #[serde(rename = "perkOffers")]
    pub perk_offers: Vec<PerkId>,
    pub events: Vec<OutputEvent>,
}

/// Board topology for one level. Pyramid layers stack shrinking disks, so a
/// coordinate may carry several tiles at distinct heights.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum BoardSpec {
    Disk {
        radius: i32,
        #[serde(rename = "blockedFraction")]
        blocked_fraction: f32,
    },
    Pyramid {
        layers: i32,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct LevelConfig {
    pub board: BoardSpec,
    /// Full adversary roster for the level; entries beyond the current
    /// population are spawned on entry, existing adversaries are kept.
    pub roster: Vec<AdversaryKind>,
    #[serde(rename = "spikeCount")]
    pub spike_count: usize,
    #[serde(rename = "teleportPairs")]
    pub teleport_pairs: usize,
    #[serde(rename = "collectibleSpawnMs")]
    pub collectible_spawn_ms: u64,
    #[serde(rename = "collectibleLifetimeMs")]
    pub collectible_lifetime_ms: u64,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct PerkDef {
    pub id: PerkId,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct PowerUpDef {
    pub id: &'static str,
    pub effect: EffectId,
    pub magnitude: f32,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
}

/// Everything the engine consumes at construction. The numeric progression
/// is game-design data supplied by the caller, not a core invariant.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub seed: u32,
    pub level_table: fn(u32) -> LevelConfig,
    pub perk_catalog: Vec<PerkDef>,
    pub power_up_catalog: Vec<PowerUpDef>,
    pub grace_period_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            level_table: crate::constants::default_level_config,
            perk_catalog: crate::catalog::default_perks(),
            power_up_catalog: crate::catalog::default_power_ups(),
            grace_period_ms: crate::constants::GRACE_PERIOD_MS,
        }
    }
}
