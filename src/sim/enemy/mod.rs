//! Hostile entities: data model, construction and per-kind behavior

pub mod ai;
pub mod behavior;
pub mod factory;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use ai::{player_strength, update_movement};
pub use behavior::{Behavior, BehaviorCtx, behavior_for};
pub use factory::{CreationError, CreationOptions, EnemyFactory};

/// Enemy kinds: ten base kinds plus the elite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyKind {
    Red,
    Blue,
    White,
    Black,
    LargeRed,
    Rotating,
    Teleport,
    Snake,
    Yellow,
    Control,
    Elite,
}

impl EnemyKind {
    /// Kinds picked uniformly by the spawners
    pub const BASE: [EnemyKind; 10] = [
        EnemyKind::Red,
        EnemyKind::Blue,
        EnemyKind::White,
        EnemyKind::Black,
        EnemyKind::LargeRed,
        EnemyKind::Rotating,
        EnemyKind::Teleport,
        EnemyKind::Snake,
        EnemyKind::Yellow,
        EnemyKind::Control,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Red => "red",
            EnemyKind::Blue => "blue",
            EnemyKind::White => "white",
            EnemyKind::Black => "black",
            EnemyKind::LargeRed => "largered",
            EnemyKind::Rotating => "rotating",
            EnemyKind::Teleport => "teleport",
            EnemyKind::Snake => "snake",
            EnemyKind::Yellow => "yellow",
            EnemyKind::Control => "control",
            EnemyKind::Elite => "elite",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(EnemyKind::Red),
            "blue" => Some(EnemyKind::Blue),
            "white" => Some(EnemyKind::White),
            "black" => Some(EnemyKind::Black),
            "largered" => Some(EnemyKind::LargeRed),
            "rotating" => Some(EnemyKind::Rotating),
            "teleport" => Some(EnemyKind::Teleport),
            "snake" => Some(EnemyKind::Snake),
            "yellow" => Some(EnemyKind::Yellow),
            "control" => Some(EnemyKind::Control),
            "elite" => Some(EnemyKind::Elite),
            _ => None,
        }
    }

    /// Movement speed before size, fast and level modifiers
    pub fn base_speed(&self) -> f32 {
        match self {
            EnemyKind::Black => 3.5,
            EnemyKind::White => 5.5,
            _ => 4.5,
        }
    }
}

/// Elite sub-variants, also used for safe-zone guardians
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EliteVariant {
    Graviton,
    Destroyer,
    Guardian,
    Vortex,
}

impl EliteVariant {
    pub const ALL: [EliteVariant; 4] = [
        EliteVariant::Graviton,
        EliteVariant::Destroyer,
        EliteVariant::Guardian,
        EliteVariant::Vortex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EliteVariant::Graviton => "graviton",
            EliteVariant::Destroyer => "destroyer",
            EliteVariant::Guardian => "guardian",
            EliteVariant::Vortex => "vortex",
        }
    }
}

/// Movement state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Idle,
    Chase,
    Flee,
    Return,
}

/// Ball orbiting a rotating enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Companion {
    pub angle: f32,
    pub distance: f32,
    pub radius: f32,
    pub rotation_speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnakeSegment {
    pub pos: Vec2,
    pub radius: f32,
}

/// Orb circling an elite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orb {
    pub angle: f32,
    pub radius: f32,
    pub health: f32,
}

/// Kind-specific runtime state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum KindState {
    #[default]
    Plain,
    LargeRed {
        scatter_timer: f32,
        scatter_interval: f32,
    },
    Rotating {
        companion: Companion,
    },
    Teleport {
        timer: f32,
        interval: f32,
        range: f32,
        charging: bool,
        charge_timer: f32,
        charge_time: f32,
    },
    Snake {
        segments: Vec<SnakeSegment>,
        spacing: f32,
    },
    Yellow {
        base_radius: f32,
        min_radius: f32,
        max_radius: f32,
        phase: f32,
        change_speed: f32,
        base_damage: f32,
        base_speed: f32,
    },
    Control {
        ring_radius: f32,
        min_ring: f32,
        max_ring: f32,
        phase: f32,
        pulse_speed: f32,
        timer: f32,
        interval: f32,
    },
    Elite {
        variant: EliteVariant,
        field_radius: f32,
        field_strength: f32,
        orbs: Vec<Orb>,
        orb_orbit: f32,
        orb_angle: f32,
        bullet_timer: f32,
        bullet_interval: f32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub speed: f32,
    pub level: u32,
    pub distance_from_spawn: f32,
    pub ai: AiState,
    pub detection_range: f32,
    pub chase_range: f32,
    pub return_speed: f32,
    pub return_threshold: f32,
    /// Spawn position, where returning enemies head
    pub anchor: Vec2,
    /// Frames until the next contact hit
    pub attack_cooldown: f32,
    /// Frames until the next ranged or special attack
    pub ranged_cooldown: f32,
    pub stunned: u32,
    pub is_large: bool,
    pub is_fast: bool,
    /// Level scaling has been applied
    pub scaled: bool,
    /// Remove without rewards (self-destruct, density eviction)
    pub despawn: bool,
    pub state: KindState,
}

impl Enemy {
    pub fn is_elite(&self) -> bool {
        self.kind == EnemyKind::Elite
    }

    pub fn elite_variant(&self) -> Option<EliteVariant> {
        match self.state {
            KindState::Elite { variant, .. } => Some(variant),
            _ => None,
        }
    }

    /// Set health and make it the new maximum
    pub fn reset_health(&mut self, health: f32) {
        self.health = health;
        self.max_health = health;
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.health -= amount.max(0.0);
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Dead or flagged for silent removal
    pub fn should_remove(&self) -> bool {
        self.despawn || self.is_dead()
    }

    /// Enemy strength used by the flee check
    pub fn strength(&self) -> f32 {
        if self.kind == EnemyKind::Red {
            self.radius * 1.5
        } else {
            self.radius
        }
    }

    pub fn touches(&self, pos: Vec2, radius: f32) -> bool {
        self.pos.distance(pos) < self.radius + radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in EnemyKind::BASE.iter().chain(std::iter::once(&EnemyKind::Elite)) {
            assert_eq!(EnemyKind::from_str(kind.as_str()), Some(*kind));
        }
        assert_eq!(EnemyKind::from_str("LargeRed"), Some(EnemyKind::LargeRed));
        assert!(EnemyKind::from_str("green").is_none());
    }

    #[test]
    fn test_base_speeds() {
        assert_eq!(EnemyKind::Black.base_speed(), 3.5);
        assert_eq!(EnemyKind::White.base_speed(), 5.5);
        assert_eq!(EnemyKind::Snake.base_speed(), 4.5);
    }

    #[test]
    fn test_base_excludes_elite() {
        assert_eq!(EnemyKind::BASE.len(), 10);
        assert!(!EnemyKind::BASE.contains(&EnemyKind::Elite));
    }
}
