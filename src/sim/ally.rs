//! Friendly balls summoned by a full rage bar

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::projectile::{Owner, Projectile};

pub const MAX_FRIENDLY_BALLS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendlyBall {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub health: f32,
    pub damage: f32,
    pub speed: f32,
    pub follow_distance: f32,
    pub attack_range: f32,
    pub attack_cooldown: f32,
}

impl FriendlyBall {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: 15.0,
            health: 30.0,
            damage: 10.0,
            speed: 4.0,
            follow_distance: 80.0,
            attack_range: 300.0,
            attack_cooldown: 0.0,
        }
    }

    /// Follow the player and shoot the nearest enemy in range
    pub fn update(&mut self, player_pos: Vec2, enemies: &[Enemy]) -> Option<Projectile> {
        let to_player = player_pos - self.pos;
        let distance = to_player.length();
        if distance > self.follow_distance {
            self.vel = to_player / distance * self.speed;
        } else {
            self.vel *= 0.9;
        }

        let mut shot = None;
        if self.attack_cooldown <= 0.0 {
            let target = enemies
                .iter()
                .map(|e| (e, e.pos.distance(self.pos)))
                .filter(|(_, d)| *d < self.attack_range)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((enemy, _)) = target {
                let angle = (enemy.pos - self.pos).to_angle();
                shot = Some(Projectile::new(
                    Owner::Player,
                    self.pos,
                    angle,
                    8.0,
                    6.0,
                    self.damage,
                    80.0,
                ));
                self.attack_cooldown = 30.0;
            }
        }
        if self.attack_cooldown > 0.0 {
            self.attack_cooldown -= 1.0;
        }

        self.pos += self.vel;
        shot
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follows_player() {
        let mut ball = FriendlyBall::new(Vec2::new(500.0, 0.0));
        ball.update(Vec2::ZERO, &[]);
        assert!(ball.pos.x < 500.0);
    }

    #[test]
    fn test_no_shot_without_targets() {
        let mut ball = FriendlyBall::new(Vec2::ZERO);
        assert!(ball.update(Vec2::ZERO, &[]).is_none());
    }
}
