//! Predictive follow camera. `pos` is the top-left corner of the view in world space.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::CAMERA_SMOOTHNESS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub pos: Vec2,
    pub target: Vec2,
    pub viewport: Vec2,
    pub smoothness: f32,
}

impl Camera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            pos: -viewport / 2.0,
            target: -viewport / 2.0,
            viewport,
            smoothness: CAMERA_SMOOTHNESS,
        }
    }

    /// Ease toward the player, leading in the direction of travel
    pub fn follow(&mut self, player_pos: Vec2, player_vel: Vec2) {
        let speed = player_vel.length();
        let look = (speed * 3.0).min(100.0);
        let offset = Vec2::new(lead(player_vel.x, look), lead(player_vel.y, look * 0.5));
        self.target = player_pos - self.viewport / 2.0 + offset;

        // Faster movement tightens the follow
        let rate = (self.smoothness + speed * 0.01).clamp(self.smoothness, 1.0);
        self.pos += (self.target - self.pos) * rate;
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.viewport / 2.0
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.pos + screen
    }

    /// Larger viewport side, used as the unit for screen-relative ranges
    pub fn screen_size(&self) -> f32 {
        self.viewport.x.max(self.viewport.y)
    }
}

fn lead(velocity: f32, look: f32) -> f32 {
    if velocity > 0.0 {
        look
    } else if velocity < 0.0 {
        -look
    } else {
        0.0
    }
}
