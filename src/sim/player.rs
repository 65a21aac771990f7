//! The player ball: movement, resources, skills state and progression

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::{Effects, Tint};
use super::rng::SimRng;
use super::tick::TickInput;
use crate::consts::*;

/// Spinning orbs summoned with rage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindFireWheels {
    pub active: bool,
    pub duration: f32,
    pub max_duration: f32,
    pub cooldown_timer: f32,
    pub cooldown: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    /// Orbit radius around the player
    pub radius: f32,
    pub orb_size: f32,
    pub damage: f32,
    pub rage_cost: f32,
    /// Rage drained per active frame
    pub rage_drain: f32,
}

impl Default for WindFireWheels {
    fn default() -> Self {
        Self {
            active: false,
            duration: 0.0,
            max_duration: 300.0,
            cooldown_timer: 0.0,
            cooldown: 600.0,
            rotation: 0.0,
            rotation_speed: 0.15,
            radius: 60.0,
            orb_size: 15.0,
            damage: 5.0,
            rage_cost: 15.0,
            rage_drain: 0.2,
        }
    }
}

/// Mana-channelled beam
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    pub active: bool,
    pub min_mana: f32,
    /// Mana per channelled frame
    pub mana_cost: f32,
    pub range: f32,
    pub base_damage: f32,
    /// Extra damage as a fraction of the target's max health
    pub max_health_fraction: f32,
    pub width: f32,
    /// Frames between damage ticks on the same enemy
    pub tick_interval: f32,
    /// Frames until each enemy (by id) takes the next tick
    pub hit_timers: BTreeMap<u32, f32>,
    /// Beam end points
    pub beams: Vec<Vec2>,
}

impl Default for Laser {
    fn default() -> Self {
        Self {
            active: false,
            min_mana: 10.0,
            mana_cost: 0.5,
            range: 600.0,
            base_damage: 5.0,
            max_health_fraction: 0.01,
            width: 8.0,
            tick_interval: 10.0,
            hit_timers: BTreeMap::new(),
            beams: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,

    pub health: f32,
    pub max_health: f32,
    pub mana: f32,
    pub max_mana: f32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub rage: f32,
    pub max_rage: f32,

    pub level: u32,
    pub exp: f32,
    pub exp_to_next: f32,
    pub attack: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    /// Rage gain multiplier, grows while taking hits
    pub hit_rage_multiplier: f32,
    /// Frames until the rage multiplier resets
    pub hit_timer: f32,
    /// Frames immune to melee hits
    pub invulnerable: f32,

    pub jumping: bool,
    pub jump_count: u32,
    pub charging_jump: bool,
    pub charge_frames: f32,
    double_jump_latched: bool,

    pub dashing: bool,
    pub dash_frames: f32,
    pub dash_cooldown: f32,
    last_tap_left: Option<f64>,
    last_tap_right: Option<f64>,
    prev_left: bool,
    prev_right: bool,
    pub blink_distance: f32,
    pub blink_cooldown: f32,

    pub immobilize_frames: u32,
    pub in_gravity_field: bool,
    pub gravity_slow: f32,

    pub attack_cooldown: f32,
    pub aoe_cooldown: f32,
    pub wheels: WindFireWheels,
    pub laser: Laser,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: 20.0,
            health: 100.0,
            max_health: 100.0,
            mana: 100.0,
            max_mana: 100.0,
            stamina: 100.0,
            max_stamina: 100.0,
            rage: 0.0,
            max_rage: 100.0,
            level: 1,
            exp: 0.0,
            exp_to_next: 100.0,
            attack: 10.0,
            crit_chance: 0.1,
            crit_multiplier: 2.0,
            hit_rage_multiplier: 1.0,
            hit_timer: 0.0,
            invulnerable: 0.0,
            jumping: false,
            jump_count: 0,
            charging_jump: false,
            charge_frames: 0.0,
            double_jump_latched: false,
            dashing: false,
            dash_frames: 0.0,
            dash_cooldown: 0.0,
            last_tap_left: None,
            last_tap_right: None,
            prev_left: false,
            prev_right: false,
            blink_distance: 200.0,
            blink_cooldown: 0.0,
            immobilize_frames: 0,
            in_gravity_field: false,
            gravity_slow: 1.0,
            attack_cooldown: 0.0,
            aoe_cooldown: 0.0,
            wheels: WindFireWheels::default(),
            laser: Laser::default(),
        }
    }
}

impl Player {
    /// Strength compared against enemies deciding to flee
    pub fn strength(&self) -> f32 {
        self.level as f32 + self.radius
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Immobilized and not protected by the wheels
    pub fn is_controlled(&self) -> bool {
        self.immobilize_frames > 0 && !self.wheels.active
    }

    /// Try to root the player; wind-fire wheels grant immunity
    pub fn immobilize(&mut self, frames: u32) -> bool {
        if self.wheels.active || self.immobilize_frames > 0 {
            return false;
        }
        self.immobilize_frames = frames;
        self.vel = Vec2::ZERO;
        true
    }

    /// Standing on something solid again
    pub fn land(&mut self) {
        self.jumping = false;
        self.jump_count = 0;
    }

    /// Take damage from an enemy hit and bank rage for it
    pub fn take_hit(&mut self, damage: f32) {
        self.hurt(damage, damage * self.hit_rage_multiplier);
    }

    /// Damage with an explicit rage gain
    pub fn hurt(&mut self, damage: f32, rage: f32) {
        self.health -= damage;
        self.add_rage(rage);
        self.hit_timer = 120.0;
        self.hit_rage_multiplier = (self.hit_rage_multiplier + 0.1).min(3.0);
    }

    pub fn add_rage(&mut self, amount: f32) {
        self.rage = (self.rage + amount).clamp(0.0, self.max_rage);
    }

    pub fn knock_back(&mut self, from: Vec2, force: f32) {
        self.vel += crate::direction(from, self.pos) * force;
    }

    /// Movement, jumping and dashing for one frame
    pub fn update_movement(
        &mut self,
        input: &TickInput,
        now_ms: f64,
        fx: &mut Effects,
        rng: &mut SimRng,
    ) {
        // Gravity fields set the slow during the previous entity pass
        let slow = self.gravity_slow;
        self.in_gravity_field = false;
        self.gravity_slow = 1.0;

        if self.immobilize_frames > 0 {
            if self.wheels.active {
                self.immobilize_frames = 0;
            } else {
                self.immobilize_frames -= 1;
            }
        }

        let controlled = self.is_controlled();
        if controlled {
            self.vel.x = 0.0;
            self.vel.y = self.vel.y.max(0.0);
        } else if input.left {
            if !self.dashing {
                self.vel.x = -PLAYER_SPEED * slow;
            }
        } else if input.right {
            if !self.dashing {
                self.vel.x = PLAYER_SPEED * slow;
            }
        } else {
            self.vel.x *= FRICTION;
        }

        let left_tap = input.left && !self.prev_left;
        let right_tap = input.right && !self.prev_right;
        self.prev_left = input.left;
        self.prev_right = input.right;
        if !controlled && !self.dashing && self.dash_cooldown <= 0.0 && self.stamina >= 20.0 {
            if left_tap {
                if self.last_tap_left.is_some_and(|t| now_ms - t < DOUBLE_TAP_MS) {
                    self.start_dash(-1.0, fx, rng);
                }
                self.last_tap_left = Some(now_ms);
            }
            if right_tap {
                if self.last_tap_right.is_some_and(|t| now_ms - t < DOUBLE_TAP_MS) {
                    self.start_dash(1.0, fx, rng);
                }
                self.last_tap_right = Some(now_ms);
            }
        }

        // Charge while held, jump on release
        if input.jump && !self.jumping && self.stamina >= 10.0 {
            if !self.charging_jump {
                self.charging_jump = true;
                self.charge_frames = 0.0;
            }
        } else if self.charging_jump && !self.jumping {
            let charge = self.charge_frames / CHARGE_JUMP_MAX_FRAMES;
            let force = JUMP_FORCE * (1.0 + charge * (CHARGE_JUMP_MULTIPLIER - 1.0));
            self.vel.y = -force;
            self.jumping = true;
            self.charging_jump = false;
            self.charge_frames = 0.0;
            self.stamina -= 10.0;
            self.jump_count += 1;
        }

        if input.double_jump
            && !self.double_jump_latched
            && self.jump_count < MAX_JUMPS
            && self.stamina >= 15.0
        {
            self.vel.y = -DOUBLE_JUMP_FORCE;
            self.jump_count += 1;
            self.stamina -= 15.0;
            self.double_jump_latched = true;
            fx.burst(rng, self.pos + Vec2::new(0.0, self.radius), 8, 3.0, 20.0, Tint::Gold);
        }
        if !input.double_jump {
            self.double_jump_latched = false;
        }

        if input.fast_fall && self.jumping {
            self.vel.y += GRAVITY * 2.0;
        }
        self.vel.y += GRAVITY;

        self.pos += self.vel;
    }

    fn start_dash(&mut self, direction: f32, fx: &mut Effects, rng: &mut SimRng) {
        self.dashing = true;
        self.dash_frames = DASH_DURATION;
        self.vel.x = direction * DASH_SPEED;
        self.stamina -= 20.0;
        fx.burst(rng, self.pos, 15, 3.0, 20.0, Tint::White);
        log::debug!("Dash {}", if direction < 0.0 { "left" } else { "right" });
    }

    /// Dash timer and jump charge
    pub fn update_timers(&mut self) {
        if self.dashing {
            self.dash_frames -= 1.0;
            if self.dash_frames <= 0.0 {
                self.dashing = false;
                self.dash_cooldown = DASH_COOLDOWN;
            }
        } else if self.dash_cooldown > 0.0 {
            self.dash_cooldown -= 1.0;
        }

        if self.charging_jump {
            self.charge_frames = (self.charge_frames + 1.0).min(CHARGE_JUMP_MAX_FRAMES);
        }
    }

    /// Passive stamina, mana and rage regeneration
    pub fn regenerate(&mut self) {
        self.stamina = (self.stamina + STAMINA_RECOVERY).min(self.max_stamina);
        self.mana = (self.mana + MANA_RECOVERY).min(self.max_mana);
        self.rage = (self.rage + RAGE_RECOVERY).min(self.max_rage);

        if self.hit_timer > 0.0 {
            self.hit_timer -= 1.0;
            if self.hit_timer <= 0.0 {
                self.hit_rage_multiplier = 1.0;
            }
        }
    }

    pub fn tick_cooldowns(&mut self) {
        for timer in [
            &mut self.attack_cooldown,
            &mut self.aoe_cooldown,
            &mut self.blink_cooldown,
            &mut self.invulnerable,
            &mut self.wheels.cooldown_timer,
        ] {
            if *timer > 0.0 {
                *timer = (*timer - 1.0).max(0.0);
            }
        }
    }

    pub fn gain_exp(&mut self, exp: f32) {
        self.exp += exp;
    }

    /// Level up once if enough experience is banked
    pub fn check_level_up(&mut self) -> bool {
        if self.exp < self.exp_to_next {
            return false;
        }
        self.level += 1;
        self.exp -= self.exp_to_next;
        self.exp_to_next = (self.exp_to_next * 1.2).floor();

        self.max_health += 20.0;
        self.health = self.max_health;
        self.max_mana += 10.0;
        self.mana = self.max_mana;
        self.max_stamina += 5.0;
        self.stamina = self.max_stamina;
        self.attack += 5.0;
        if self.radius < 40.0 {
            self.radius += 1.0;
        }
        log::info!("Player reached level {}", self.level);
        true
    }
}
