//! Idle / chase / flee / return movement shared by every enemy kind

use glam::Vec2;

use super::{AiState, Enemy};
use crate::sim::player::Player;
use crate::sim::safe_zone::SafeZoneManager;

/// Return trips end this close to the anchor
const ANCHOR_REACHED: f32 = 20.0;
const FLEE_RATIO: f32 = 3.0;
const FRENZY_FLEE_RATIO: f32 = 4.0;
const FRENZY_RANGE_MULTIPLIER: f32 = 1.8;
const FRENZY_SPEED_MULTIPLIER: f32 = 1.5;

pub fn player_strength(player: &Player) -> f32 {
    player.strength()
}

/// Decide the AI state and steer `enemy.vel`. Position integration and stun
/// countdown happen in the frame step.
pub fn update_movement(
    enemy: &mut Enemy,
    player_pos: Vec2,
    player_strength: f32,
    zones: &SafeZoneManager,
    frenzy: bool,
) {
    // Safe zones override everything else
    if zones.is_in_safe_zone(enemy.pos) {
        enemy.ai = AiState::Idle;
        enemy.vel = Vec2::ZERO;
        return;
    }
    if zones.is_in_safe_zone(player_pos) {
        return_to_anchor(enemy, enemy.speed * enemy.return_speed);
        return;
    }
    if let Some(away) = zones.avoidance_vector(enemy.pos) {
        enemy.ai = AiState::Flee;
        enemy.vel = away * enemy.speed * 1.2;
        return;
    }

    let (range_mult, speed_mult, flee_ratio) = if frenzy {
        (FRENZY_RANGE_MULTIPLIER, FRENZY_SPEED_MULTIPLIER, FRENZY_FLEE_RATIO)
    } else {
        (1.0, 1.0, FLEE_RATIO)
    };
    let detection = enemy.detection_range * range_mult;
    let chase = enemy.chase_range * range_mult;
    let speed = enemy.speed * speed_mult;

    let distance = enemy.pos.distance(player_pos);
    if distance < detection {
        enemy.ai = if player_strength > enemy.strength() * flee_ratio {
            AiState::Flee
        } else {
            AiState::Chase
        };
    } else if distance > chase {
        enemy.ai = if enemy.pos.distance(enemy.anchor) > enemy.return_threshold {
            AiState::Return
        } else {
            AiState::Idle
        };
    }

    match enemy.ai {
        AiState::Chase => {
            enemy.vel = crate::direction(enemy.pos, player_pos) * speed;
        }
        AiState::Flee => {
            enemy.vel = crate::direction(player_pos, enemy.pos) * speed * 0.8;
        }
        AiState::Return => {
            return_to_anchor(enemy, speed * enemy.return_speed);
        }
        AiState::Idle => {
            enemy.vel *= 0.95;
        }
    }
}

fn return_to_anchor(enemy: &mut Enemy, speed: f32) {
    if enemy.pos.distance(enemy.anchor) < ANCHOR_REACHED {
        enemy.ai = AiState::Idle;
        enemy.vel = Vec2::ZERO;
    } else {
        enemy.ai = AiState::Return;
        enemy.vel = crate::direction(enemy.pos, enemy.anchor) * speed;
    }
}
