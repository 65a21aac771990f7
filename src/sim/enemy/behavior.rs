//! Per-kind enemy behavior.
//!
//! Every kind is a unit struct implementing [`Behavior`]; [`behavior_for`] maps an
//! [`EnemyKind`] to its static instance. Kind-specific runtime data lives in
//! [`KindState`] on the enemy itself so the behaviors stay stateless.

use std::f32::consts::TAU;

use glam::Vec2;

use super::factory::CreationOptions;
use super::{Companion, EliteVariant, Enemy, EnemyKind, KindState, Orb, SnakeSegment};
use crate::consts::*;
use crate::sim::effects::{Effects, Tint};
use crate::sim::player::Player;
use crate::sim::projectile::{Owner, Projectile, ProjectileKind};
use crate::sim::rng::SimRng;
use crate::sim::safe_zone::SafeZoneManager;
use crate::{direction, polar_to_cartesian};

/// World access handed to behaviors during the entity pass
pub struct BehaviorCtx<'a> {
    pub player: &'a mut Player,
    pub zones: &'a SafeZoneManager,
    pub projectiles: &'a mut Vec<Projectile>,
    pub effects: &'a mut Effects,
    pub rng: &'a mut SimRng,
    pub frenzy: bool,
    /// Player stands in a safe zone
    pub player_protected: bool,
    /// Damage dealt to the player this frame
    pub damage_dealt: f32,
}

impl BehaviorCtx<'_> {
    fn player_distance(&self, enemy: &Enemy) -> f32 {
        enemy.pos.distance(self.player.pos)
    }

    fn hit_player(&mut self, damage: f32, at: Vec2) {
        self.player.take_hit(damage);
        self.damage_dealt += damage;
        self.effects.damage_number(self.rng, at, damage, false);
    }
}

pub trait Behavior: Sync {
    /// Kind adjustments applied after level scaling
    fn on_create(&self, _enemy: &mut Enemy, _rng: &mut SimRng, _opts: &CreationOptions) {}

    /// Per-frame special behavior (attacks, pulses, teleports)
    fn on_update(&self, _enemy: &mut Enemy, _ctx: &mut BehaviorCtx) {}

    /// Body contact with the player; returns the damage dealt
    fn on_player_contact(&self, enemy: &mut Enemy, ctx: &mut BehaviorCtx) -> Option<f32> {
        let damage = enemy.damage;
        contact_hit(enemy, ctx, damage, CONTACT_KNOCKBACK)
    }
}

fn contact_hit(enemy: &mut Enemy, ctx: &mut BehaviorCtx, damage: f32, knockback: f32) -> Option<f32> {
    if enemy.attack_cooldown > 0.0 || ctx.player_protected {
        return None;
    }
    let at = ctx.player.pos;
    ctx.hit_player(damage, at);
    ctx.player.knock_back(enemy.pos, knockback);
    enemy.attack_cooldown = if ctx.frenzy {
        ENEMY_ATTACK_COOLDOWN * 0.6
    } else {
        ENEMY_ATTACK_COOLDOWN
    };
    Some(damage)
}

fn enemy_shot(pos: Vec2, target: Vec2, speed: f32, radius: f32, damage: f32, lifetime: f32) -> Projectile {
    let angle = (target - pos).to_angle();
    Projectile::new(Owner::Enemy, pos, angle, speed, radius, damage, lifetime)
}

/// Position on a pulse between `min` and `max`
fn pulse(min: f32, max: f32, phase: f32) -> f32 {
    min + (max - min) * (phase.sin() + 1.0) / 2.0
}

pub struct Red;
pub struct Blue;
pub struct White;
pub struct Black;
pub struct LargeRed;
pub struct Rotating;
pub struct Teleport;
pub struct Snake;
pub struct Yellow;
pub struct Control;
pub struct Elite;

pub fn behavior_for(kind: EnemyKind) -> &'static dyn Behavior {
    match kind {
        EnemyKind::Red => &Red,
        EnemyKind::Blue => &Blue,
        EnemyKind::White => &White,
        EnemyKind::Black => &Black,
        EnemyKind::LargeRed => &LargeRed,
        EnemyKind::Rotating => &Rotating,
        EnemyKind::Teleport => &Teleport,
        EnemyKind::Snake => &Snake,
        EnemyKind::Yellow => &Yellow,
        EnemyKind::Control => &Control,
        EnemyKind::Elite => &Elite,
    }
}

impl Behavior for Red {
    fn on_update(&self, enemy: &mut Enemy, ctx: &mut BehaviorCtx) {
        if ctx.player_protected || ctx.player.invulnerable > 0.0 {
            return;
        }
        if ctx.player_distance(enemy) < 50.0 + ctx.player.radius {
            ctx.player.hurt(10.0, 15.0);
            ctx.damage_dealt += 10.0;
            ctx.player.invulnerable = 60.0;
            ctx.player.knock_back(enemy.pos, CONTACT_KNOCKBACK);
            let at = ctx.player.pos;
            ctx.effects.damage_number(ctx.rng, at, 10.0, false);
        }
    }

    // Melee covers contact
    fn on_player_contact(&self, _enemy: &mut Enemy, _ctx: &mut BehaviorCtx) -> Option<f32> {
        None
    }
}

impl Behavior for Blue {
    fn on_update(&self, enemy: &mut Enemy, ctx: &mut BehaviorCtx) {
        if enemy.ranged_cooldown > 0.0 || ctx.player_protected {
            return;
        }
        if ctx.player_distance(enemy) < 400.0 {
            ctx.projectiles
                .push(enemy_shot(enemy.pos, ctx.player.pos, 6.0, 5.0, 8.0, 80.0));
            enemy.ranged_cooldown = if ctx.frenzy { 45.0 } else { 60.0 };
        }
    }
}

impl Behavior for White {
    fn on_update(&self, enemy: &mut Enemy, ctx: &mut BehaviorCtx) {
        if ctx.player_protected || ctx.player_distance(enemy) >= 80.0 {
            return;
        }
        if ctx.player_distance(enemy) < 100.0 {
            let at = ctx.player.pos;
            ctx.hit_player(25.0, at);
        }
        ctx.effects.burst(ctx.rng, enemy.pos, 30, 6.0, 40.0, Tint::Orange);
        enemy.despawn = true;
        log::debug!("White enemy {} exploded", enemy.id);
    }
}

impl Behavior for Black {
    fn on_create(&self, enemy: &mut Enemy, _rng: &mut SimRng, _opts: &CreationOptions) {
        enemy.radius *= 1.5;
        enemy.reset_health(enemy.health * 2.0);
    }

    fn on_update(&self, enemy: &mut Enemy, ctx: &mut BehaviorCtx) {
        if ctx.player_protected || ctx.player_distance(enemy) >= 200.0 {
            return;
        }
        ctx.player.vel += direction(ctx.player.pos, enemy.pos) * 0.3;
    }
}

impl Behavior for LargeRed {
    fn on_create(&self, enemy: &mut Enemy, _rng: &mut SimRng, _opts: &CreationOptions) {
        enemy.radius = 40.0;
        enemy.reset_health(enemy.health * 4.0);
        enemy.speed = enemy.kind.base_speed() * 0.7;
        enemy.state = KindState::LargeRed {
            scatter_timer: 0.0,
            scatter_interval: 120.0,
        };
    }

    fn on_update(&self, enemy: &mut Enemy, ctx: &mut BehaviorCtx) {
        let KindState::LargeRed {
            scatter_timer,
            scatter_interval,
        } = &mut enemy.state
        else {
            return;
        };
        *scatter_timer += 1.0;
        if *scatter_timer < *scatter_interval {
            return;
        }
        *scatter_timer = 0.0;
        if ctx.player_protected || enemy.pos.distance(ctx.player.pos) > 600.0 {
            return;
        }
        for i in 0..8 {
            let angle = i as f32 * TAU / 8.0;
            ctx.projectiles.push(
                Projectile::new(Owner::Enemy, enemy.pos, angle, 8.0, 12.0, 15.0, 100.0)
                    .with_kind(ProjectileKind::Scatter),
            );
        }
    }
}

impl Behavior for Rotating {
    fn on_create(&self, enemy: &mut Enemy, rng: &mut SimRng, _opts: &CreationOptions) {
        enemy.state = KindState::Rotating {
            companion: Companion {
                angle: rng.angle(),
                distance: 50.0,
                radius: 8.0,
                rotation_speed: 0.05,
            },
        };
    }

    fn on_update(&self, enemy: &mut Enemy, ctx: &mut BehaviorCtx) {
        let KindState::Rotating { companion } = &mut enemy.state else {
            return;
        };
        let next = companion.angle + companion.rotation_speed;
        let target = enemy.pos + polar_to_cartesian(companion.distance, next);
        if ctx.zones.is_in_safe_zone(target) {
            return;
        }
        companion.angle = next % TAU;
        let companion_radius = companion.radius;

        if target.distance(ctx.player.pos) < companion_radius + ctx.player.radius {
            let damage = enemy.damage * 0.5;
            contact_hit(enemy, ctx, damage, CONTACT_KNOCKBACK * 0.5);
        }
    }
}

impl Behavior for Teleport {
    fn on_create(&self, enemy: &mut Enemy, _rng: &mut SimRng, _opts: &CreationOptions) {
        enemy.state = KindState::Teleport {
            timer: 0.0,
            interval: 120.0,
            range: 200.0,
            charging: false,
            charge_timer: 0.0,
            charge_time: 45.0,
        };
    }

    fn on_update(&self, enemy: &mut Enemy, ctx: &mut BehaviorCtx) {
        let pos = enemy.pos;
        let player_pos = ctx.player.pos;
        let detection = enemy.detection_range;
        let KindState::Teleport {
            timer,
            interval,
            range,
            charging,
            charge_timer,
            charge_time,
        } = &mut enemy.state
        else {
            return;
        };

        if ctx.player_protected {
            *charging = false;
            *charge_timer = 0.0;
            return;
        }

        if !*charging {
            *timer += 1.0;
            if *timer >= *interval && pos.distance(player_pos) < detection {
                *charging = true;
                *charge_timer = 0.0;
            }
            return;
        }

        *charge_timer += 1.0;
        if *charge_timer % 10.0 == 0.0 {
            ctx.effects.burst(ctx.rng, pos, 3, 1.5, 15.0, Tint::Cyan);
        }
        if *charge_timer < *charge_time {
            return;
        }
        *charging = false;
        *timer = 0.0;

        let max_range = *range;
        let distance = pos.distance(player_pos);
        let destination = (0..10).find_map(|_| {
            let candidate = if ctx.rng.chance(0.7) {
                // up close the reach drops below the minimum jump
                let reach = max_range.min(distance * 0.8);
                let jump = ctx.rng.range(reach.min(150.0), reach.max(150.0));
                pos + direction(pos, player_pos) * jump
            } else {
                pos + polar_to_cartesian(ctx.rng.range(100.0, max_range), ctx.rng.angle())
            };
            (!ctx.zones.is_in_safe_zone(candidate)).then_some(candidate)
        });
        if let Some(to) = destination {
            ctx.effects.burst(ctx.rng, pos, 12, 3.0, 20.0, Tint::Cyan);
            enemy.pos = to;
            ctx.effects.burst(ctx.rng, to, 12, 3.0, 20.0, Tint::Cyan);
        }
    }
}

impl Behavior for Snake {
    fn on_create(&self, enemy: &mut Enemy, _rng: &mut SimRng, _opts: &CreationOptions) {
        let spacing = enemy.radius * 2.5;
        let segments = (1..=3)
            .map(|i| SnakeSegment {
                pos: enemy.pos - Vec2::new(spacing * i as f32, 0.0),
                radius: enemy.radius * 0.8,
            })
            .collect();
        enemy.state = KindState::Snake { segments, spacing };
    }

    fn on_update(&self, enemy: &mut Enemy, ctx: &mut BehaviorCtx) {
        let KindState::Snake { segments, spacing } = &mut enemy.state else {
            return;
        };
        let mut leader = enemy.pos;
        let mut touching = false;
        for segment in segments.iter_mut() {
            let offset = segment.pos - leader;
            let distance = offset.length();
            if distance > *spacing {
                segment.pos = leader + offset / distance * *spacing;
            }
            leader = segment.pos;
            touching |= segment.pos.distance(ctx.player.pos) < segment.radius + ctx.player.radius;
        }
        if touching {
            contact_hit(enemy, ctx, 3.0, 5.0);
        }
    }
}

impl Behavior for Yellow {
    fn on_create(&self, enemy: &mut Enemy, rng: &mut SimRng, _opts: &CreationOptions) {
        enemy.radius = 15.0;
        enemy.reset_health(enemy.health * 0.75);
        enemy.speed = enemy.kind.base_speed() * 1.5;
        enemy.state = KindState::Yellow {
            base_radius: 15.0,
            min_radius: 15.0 * 0.5,
            max_radius: 15.0 * 2.5,
            phase: rng.angle(),
            change_speed: 0.02,
            base_damage: enemy.damage,
            base_speed: enemy.speed,
        };
    }

    fn on_update(&self, enemy: &mut Enemy, _ctx: &mut BehaviorCtx) {
        let KindState::Yellow {
            base_radius,
            min_radius,
            max_radius,
            phase,
            change_speed,
            base_damage,
            base_speed,
        } = &mut enemy.state
        else {
            return;
        };
        *phase = (*phase + *change_speed) % TAU;
        let radius = pulse(*min_radius, *max_radius, *phase);
        let ratio = radius / *base_radius;
        enemy.radius = radius;
        // Bigger hits harder but moves slower
        enemy.damage = (*base_damage * ratio).floor();
        enemy.speed = *base_speed / ratio;
    }
}

impl Behavior for Control {
    fn on_create(&self, enemy: &mut Enemy, rng: &mut SimRng, _opts: &CreationOptions) {
        enemy.state = KindState::Control {
            ring_radius: 120.0,
            min_ring: 80.0,
            max_ring: 150.0,
            phase: rng.angle(),
            pulse_speed: 0.05,
            timer: 0.0,
            interval: 180.0,
        };
    }

    fn on_update(&self, enemy: &mut Enemy, ctx: &mut BehaviorCtx) {
        let pos = enemy.pos;
        let KindState::Control {
            ring_radius,
            min_ring,
            max_ring,
            phase,
            pulse_speed,
            timer,
            interval,
        } = &mut enemy.state
        else {
            return;
        };
        *phase = (*phase + *pulse_speed) % TAU;
        *ring_radius = pulse(*min_ring, *max_ring, *phase);
        *timer += 1.0;

        if *timer < *interval || ctx.player_protected {
            return;
        }
        if pos.distance(ctx.player.pos) < *ring_radius + ctx.player.radius {
            *timer = 0.0;
            if ctx.player.immobilize(60) {
                let above = ctx.player.pos - Vec2::new(0.0, 40.0);
                ctx.effects.text(above, "Immobilized!", Tint::Blue, 60.0, 1.0);
                log::debug!("Control enemy {} immobilized the player", enemy.id);
            }
        }
    }
}

impl Behavior for Elite {
    fn on_create(&self, enemy: &mut Enemy, rng: &mut SimRng, opts: &CreationOptions) {
        enemy.radius *= 2.0;
        enemy.reset_health(enemy.health * 8.0);
        enemy.speed *= 0.6;
        enemy.damage = 25.0;

        let variant = opts
            .elite_variant
            .or_else(|| rng.pick(&EliteVariant::ALL).copied())
            .unwrap_or(EliteVariant::Graviton);
        let (field_radius, field_strength, orb_count, bullet_interval) = match variant {
            EliteVariant::Graviton => (350.0, 1.2, 4, 240.0),
            EliteVariant::Destroyer => {
                enemy.damage *= 1.5;
                (250.0, 0.8, 6, 180.0)
            }
            EliteVariant::Guardian => {
                enemy.reset_health(enemy.health * 1.5);
                (300.0, 1.0, 3, 240.0)
            }
            EliteVariant::Vortex => {
                enemy.speed *= 1.3;
                (400.0, 1.5, 5, 240.0)
            }
        };

        let orbs = (0..orb_count)
            .map(|i| Orb {
                angle: i as f32 * TAU / orb_count as f32,
                radius: enemy.radius * 0.4,
                health: enemy.max_health * 0.2,
            })
            .collect();
        enemy.state = KindState::Elite {
            variant,
            field_radius,
            field_strength,
            orbs,
            orb_orbit: enemy.radius + 40.0,
            orb_angle: 0.0,
            bullet_timer: 0.0,
            bullet_interval,
        };
    }

    fn on_update(&self, enemy: &mut Enemy, ctx: &mut BehaviorCtx) {
        let pos = enemy.pos;
        let damage = enemy.damage;
        let in_zone = ctx.zones.is_in_safe_zone(pos);
        let KindState::Elite {
            field_radius,
            field_strength,
            orb_angle,
            bullet_timer,
            bullet_interval,
            ..
        } = &mut enemy.state
        else {
            return;
        };

        if !in_zone {
            *orb_angle = (*orb_angle + 0.02) % TAU;
        }
        if ctx.player_protected {
            return;
        }

        let distance = pos.distance(ctx.player.pos);
        if distance < *field_radius {
            let falloff = distance / *field_radius;
            let pull = *field_strength * (1.0 - falloff);
            ctx.player.vel += direction(ctx.player.pos, pos) * pull;
            if !ctx.player.wheels.active {
                ctx.player.in_gravity_field = true;
                ctx.player.gravity_slow = ctx.player.gravity_slow.min(0.3 + 0.4 * falloff);
            }
        }

        *bullet_timer += 1.0;
        if *bullet_timer >= *bullet_interval && distance < 600.0 {
            *bullet_timer = 0.0;
            ctx.projectiles.push(
                enemy_shot(pos, ctx.player.pos, 6.0, 20.0, damage, 120.0)
                    .with_kind(ProjectileKind::BigBullet),
            );
        }
    }
}
