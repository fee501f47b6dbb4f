//! Default perk and power-up tables. These are game-design data consumed by
//! the session config; the engine itself only applies effects by id.

use crate::types::{EffectId, PerkDef, PerkId, PowerUpDef};

pub fn default_perks() -> Vec<PerkDef> {
    vec![
        PerkDef {
            id: PerkId::DoubleJump,
            name: "Double Jump",
            description: "Step again before the cooldown lands.",
        },
        PerkDef {
            id: PerkId::SpeedDemon,
            name: "Speed Demon",
            description: "Cooldown recovers 60% faster.",
        },
        PerkDef {
            id: PerkId::SpikeArmor,
            name: "Spike Armor",
            description: "Survive one adversary contact.",
        },
        PerkDef {
            id: PerkId::Stomp,
            name: "Stomp",
            description: "Landing stuns adjacent adversaries.",
        },
        PerkDef {
            id: PerkId::SplashPaint,
            name: "Splash Paint",
            description: "Paint the six neighboring tiles.",
        },
        PerkDef {
            id: PerkId::Turret,
            name: "Turret Builder",
            description: "Auto-paints a random tile periodically.",
        },
    ]
}

pub fn default_power_ups() -> Vec<PowerUpDef> {
    vec![
        PowerUpDef {
            id: "shrink_pulse",
            effect: EffectId::Vulnerability,
            magnitude: 1.0,
            duration_ms: 8_000,
        },
        PowerUpDef {
            id: "turbo",
            effect: EffectId::SpeedBoost,
            magnitude: 1.6,
            duration_ms: 10_000,
        },
        PowerUpDef {
            id: "shield",
            effect: EffectId::Shield,
            magnitude: 1.0,
            duration_ms: 6_000,
        },
        PowerUpDef {
            id: "pellet_shooter",
            effect: EffectId::AreaPaint,
            magnitude: 1.0,
            duration_ms: 10_000,
        },
        PowerUpDef {
            id: "multijump",
            effect: EffectId::ExtraJump,
            magnitude: 2.0,
            duration_ms: 12_000,
        },
        PowerUpDef {
            id: "double_xp",
            effect: EffectId::DoubleScore,
            magnitude: 2.0,
            duration_ms: 15_000,
        },
        PowerUpDef {
            id: "paint_bomb",
            effect: EffectId::PaintBurst,
            magnitude: 1.0,
            duration_ms: 0,
        },
        PowerUpDef {
            id: "teleport",
            effect: EffectId::Recenter,
            magnitude: 0.0,
            duration_ms: 0,
        },
    ]
}
