//! Bullets fired by the player, allies and enemies

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::polar_to_cartesian;

/// Projectiles farther than this from the player are discarded
pub const PROJECTILE_CLEANUP_DISTANCE: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectileKind {
    #[default]
    Normal,
    /// Eight-way burst
    Scatter,
    /// Side shot of a Trinity Force volley
    Trinity,
    /// Elite heavy shot
    BigBullet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub owner: Owner,
    pub kind: ProjectileKind,
    /// Remaining frames
    pub lifetime: f32,
}

impl Projectile {
    pub fn new(
        owner: Owner,
        pos: Vec2,
        angle: f32,
        speed: f32,
        radius: f32,
        damage: f32,
        lifetime: f32,
    ) -> Self {
        Self {
            pos,
            vel: polar_to_cartesian(speed, angle),
            radius,
            damage,
            owner,
            kind: ProjectileKind::Normal,
            lifetime,
        }
    }

    pub fn with_kind(mut self, kind: ProjectileKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn step(&mut self) {
        self.pos += self.vel;
        self.lifetime -= 1.0;
    }

    /// Out of time or too far from the player
    pub fn is_spent(&self, player_pos: Vec2) -> bool {
        self.lifetime <= 0.0 || self.pos.distance(player_pos) > PROJECTILE_CLEANUP_DISTANCE
    }

    pub fn hits(&self, pos: Vec2, radius: f32) -> bool {
        self.pos.distance(pos) < self.radius + radius
    }
}
