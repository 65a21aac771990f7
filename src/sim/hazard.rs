//! Spiked balls drifting around the player

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::SimRng;
use crate::polar_to_cartesian;

/// Spiked balls beyond this distance from the player are removed
pub const SPIKED_BALL_CLEANUP_DISTANCE: f32 = 1200.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikedBall {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
}

impl SpikedBall {
    /// Random spiked ball 300-600 units from the player
    pub fn spawn_near(player_pos: Vec2, rng: &mut SimRng) -> Self {
        let angle = rng.angle();
        let distance = rng.range(300.0, 600.0);
        Self {
            pos: player_pos + polar_to_cartesian(distance, angle),
            vel: Vec2::new(rng.range(-2.0, 2.0), rng.range(-2.0, 2.0)),
            radius: rng.range(15.0, 25.0),
            damage: rng.range(15.0, 25.0),
            rotation: 0.0,
            rotation_speed: rng.range(0.05, 0.15),
        }
    }

    pub fn step(&mut self) {
        self.pos += self.vel;
        self.rotation += self.rotation_speed;
    }

    pub fn touches(&self, pos: Vec2, radius: f32) -> bool {
        self.pos.distance(pos) < self.radius + radius
    }

    pub fn is_stray(&self, player_pos: Vec2) -> bool {
        self.pos.distance(player_pos) > SPIKED_BALL_CLEANUP_DISTANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_ring() {
        let mut rng = SimRng::new(3);
        for _ in 0..100 {
            let ball = SpikedBall::spawn_near(Vec2::new(50.0, 50.0), &mut rng);
            let d = ball.pos.distance(Vec2::new(50.0, 50.0));
            assert!((299.0..=601.0).contains(&d));
            assert!(!ball.is_stray(Vec2::new(50.0, 50.0)));
        }
    }
}
