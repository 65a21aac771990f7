//! Player skills, projectile and hazard resolution, kill rewards

use std::f32::consts::{FRAC_PI_2, FRAC_PI_6, TAU};

use glam::Vec2;

use super::ally::{FriendlyBall, MAX_FRIENDLY_BALLS};
use super::buff::{BuffId, DropClass};
use super::effects::Tint;
use super::enemy::Enemy;
use super::events::GameEvent;
use super::player::WindFireWheels;
use super::projectile::{Owner, Projectile, ProjectileKind};
use super::rng::SimRng;
use super::terrain::BrickHit;
use super::world::World;
use crate::consts::*;
use crate::{direction, polar_to_cartesian};

pub const AOE_MANA_COST: f32 = 20.0;
pub const AOE_COOLDOWN: f32 = 120.0;
pub const AOE_RADIUS: f32 = 250.0;
const AOE_DAMAGE: f32 = 40.0;
const AOE_STUN: u32 = 30;

/// Shots at targets farther than this are not fired
const MAX_SHOT_DISTANCE: f32 = 800.0;
const SCATTER_CROWD: usize = 8;
const SCATTER_CHANCE: f32 = 0.15;
const SCATTER_SPEED: f32 = 12.0;

const ENEMY_SHOT_KNOCKBACK: f32 = 8.0;
const WHEEL_KNOCKBACK: f32 = 10.0;
const LASER_KNOCKBACK: f32 = 12.0;

const BRICK_EXP: u32 = 3;
const BRICK_SCORE: u32 = 5;
/// Rage per kill, scaled by the hit multiplier
const KILL_RAGE: f32 = 3.0;

/// Enemies farther than this from the player are dropped silently
pub const ENEMY_CLEANUP_DISTANCE: f32 = 4000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reward {
    pub exp: u32,
    pub score: u32,
}

/// Experience and score for killing an enemy.
///
/// Both grow with the enemy's level and with every 1000 units it spawned from the origin.
pub fn kill_reward(max_health: f32, level: u32, distance: f32) -> Reward {
    let multiplier =
        1.0 + level.saturating_sub(1) as f32 * 0.5 + (distance / 1000.0).floor() * 0.2;
    Reward {
        exp: (((max_health / 4.0).floor() + 5.0) * multiplier).floor() as u32,
        score: (((max_health / 2.0).floor() + 10.0) * multiplier).floor() as u32,
    }
}

fn roll_damage(base: f32, crit_chance: f32, crit_multiplier: f32, rng: &mut SimRng) -> (f32, bool) {
    if rng.chance(crit_chance) {
        ((base * crit_multiplier).floor(), true)
    } else {
        (base, false)
    }
}

fn segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Fire at the nearest enemy in auto-aim range, else at `aim`. Returns shots fired.
pub fn player_fire(world: &mut World, aim: Option<Vec2>) -> usize {
    let player = &world.player;
    if player.attack_cooldown > 0.0 || !player.is_alive() {
        return 0;
    }
    let origin = player.pos;
    let target = world
        .enemies
        .iter()
        .filter(|e| !e.should_remove())
        .map(|e| (e.pos, e.pos.distance(origin)))
        .filter(|(_, d)| *d < AUTO_AIM_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(pos, _)| pos)
        .or(aim);
    let Some(target) = target else {
        return 0;
    };
    let distance = target.distance(origin);
    if distance > MAX_SHOT_DISTANCE {
        return 0;
    }
    let angle = (target - origin).to_angle();
    let attack = player.attack;
    let lifetime = (120.0f32).min((distance / 8.0).floor() + 30.0);

    let crowd = world
        .enemies
        .iter()
        .filter(|e| e.pos.distance(origin) < AUTO_AIM_RADIUS)
        .count();
    let mut shots = Vec::new();
    if crowd >= SCATTER_CROWD && world.rng.chance(SCATTER_CHANCE) {
        for i in 0..8 {
            let a = i as f32 * TAU / 8.0;
            shots.push(
                Projectile::new(Owner::Player, origin, a, SCATTER_SPEED, 6.0, (attack * 0.8).floor(), 100.0)
                    .with_kind(ProjectileKind::Scatter),
            );
        }
        world.effects.burst(&mut world.rng, origin, 20, 8.0, 30.0, Tint::Cyan);
        world.effects.text(origin - Vec2::new(0.0, 50.0), "Scatter!", Tint::Cyan, 90.0, 1.0);
    } else if world.buffs.is_active(BuffId::TrinityForce) {
        for (a, kind) in [
            (angle, ProjectileKind::Normal),
            (angle - FRAC_PI_6, ProjectileKind::Trinity),
            (angle + FRAC_PI_6, ProjectileKind::Trinity),
        ] {
            shots.push(
                Projectile::new(Owner::Player, origin, a, PROJECTILE_SPEED, 8.0, attack, lifetime)
                    .with_kind(kind),
            );
        }
    } else {
        shots.push(Projectile::new(
            Owner::Player,
            origin,
            angle,
            PROJECTILE_SPEED,
            8.0,
            attack,
            lifetime,
        ));
    }

    let fired = shots.len();
    world.projectiles.extend(shots);
    let player = &mut world.player;
    player.vel -= polar_to_cartesian(RECOIL_FORCE, angle);
    player.attack_cooldown = PLAYER_ATTACK_COOLDOWN;
    fired
}

/// Shockwave around the player. Returns how many enemies it hit, or `None`
/// when on cooldown or short of mana.
pub fn cast_aoe(world: &mut World) -> Option<usize> {
    let player = &mut world.player;
    if player.aoe_cooldown > 0.0 || player.mana < AOE_MANA_COST {
        return None;
    }
    player.mana -= AOE_MANA_COST;
    player.aoe_cooldown = AOE_COOLDOWN;
    let center = player.pos;

    let mut hits = 0;
    for enemy in world.enemies.iter_mut().filter(|e| !e.should_remove()) {
        let distance = enemy.pos.distance(center);
        if distance >= AOE_RADIUS {
            continue;
        }
        let damage = (AOE_DAMAGE * (1.0 - distance / AOE_RADIUS).max(0.3)).floor();
        enemy.take_damage(damage);
        let push = (35.0 - distance / 10.0).max(20.0);
        enemy.pos += direction(center, enemy.pos) * push;
        enemy.stunned = AOE_STUN;
        world.effects.burst(&mut world.rng, enemy.pos, 8, 4.0, 20.0, Tint::Red);
        world.effects.damage_number(&mut world.rng, enemy.pos, damage, false);
        hits += 1;
    }
    world.effects.shockwave(center);
    log::debug!("AOE hit {} enemies", hits);
    Some(hits)
}

/// Orb positions of active wheels: four, or three while Trinity Force is up
pub fn wheel_orbs(wheels: &WindFireWheels, center: Vec2, trinity: bool) -> Vec<Vec2> {
    let (count, step) = if trinity {
        (3, TAU / 3.0)
    } else {
        (4, FRAC_PI_2)
    };
    (0..count)
        .map(|i| center + polar_to_cartesian(wheels.radius, wheels.rotation + i as f32 * step))
        .collect()
}

pub fn activate_wheels(world: &mut World) -> bool {
    let player = &mut world.player;
    let wheels = &mut player.wheels;
    if wheels.active || wheels.cooldown_timer > 0.0 || player.rage < wheels.rage_cost {
        return false;
    }
    player.rage -= wheels.rage_cost;
    wheels.active = true;
    wheels.duration = wheels.max_duration;
    wheels.cooldown_timer = wheels.cooldown;
    wheels.rotation = 0.0;
    // The wheels break crowd control
    player.immobilize_frames = 0;

    let pos = player.pos;
    world.effects.burst(&mut world.rng, pos, 20, 5.0, 40.0, Tint::Orange);
    log::debug!("Wind-fire wheels activated");
    true
}

pub fn update_wheels(world: &mut World) {
    let trinity = world.buffs.is_active(BuffId::TrinityForce);
    let player = &mut world.player;
    if !player.wheels.active {
        return;
    }
    player.wheels.duration -= 1.0;
    if player.wheels.duration <= 0.0 || player.rage <= 0.0 {
        player.wheels.active = false;
        return;
    }
    player.rage = (player.rage - player.wheels.rage_drain).max(0.0);
    player.wheels.rotation += player.wheels.rotation_speed;

    let orb_size = player.wheels.orb_size;
    let damage = player.wheels.damage;
    for orb in wheel_orbs(&player.wheels, player.pos, trinity) {
        for enemy in world.enemies.iter_mut().filter(|e| !e.should_remove()) {
            if !enemy.touches(orb, orb_size) {
                continue;
            }
            enemy.take_damage(damage);
            enemy.vel += direction(orb, enemy.pos) * WHEEL_KNOCKBACK;
            world.effects.damage_number(&mut world.rng, enemy.pos, damage, false);
        }
    }
}

/// Channel the laser while `held`, draining mana each frame
pub fn update_laser(world: &mut World, held: bool, aim: Option<Vec2>) {
    let trinity = world.buffs.is_active(BuffId::TrinityForce);
    let player = &mut world.player;
    let laser = &mut player.laser;
    if held && !laser.active && player.mana >= laser.min_mana {
        laser.active = true;
    } else if !held {
        laser.active = false;
    }
    if laser.active {
        player.mana -= laser.mana_cost;
        if player.mana < 0.0 {
            player.mana = 0.0;
            laser.active = false;
        }
    }
    if !laser.active {
        laser.beams.clear();
        laser.hit_timers.clear();
        return;
    }

    let origin = player.pos;
    let facing = if player.vel.x < 0.0 { -Vec2::X } else { Vec2::X };
    let angle = (aim.unwrap_or(origin + facing) - origin).to_angle();
    let angles = if trinity {
        vec![angle, angle - FRAC_PI_6, angle + FRAC_PI_6]
    } else {
        vec![angle]
    };
    laser.beams = angles
        .iter()
        .map(|a| origin + polar_to_cartesian(laser.range, *a))
        .collect();

    for timer in laser.hit_timers.values_mut() {
        *timer -= 1.0;
    }
    laser.hit_timers.retain(|_, t| *t > 0.0);

    for enemy in world.enemies.iter_mut().filter(|e| !e.should_remove()) {
        let reach = enemy.radius + laser.width / 2.0;
        let hit = laser
            .beams
            .iter()
            .any(|end| segment_distance(enemy.pos, origin, *end) < reach);
        if !hit || laser.hit_timers.contains_key(&enemy.id) {
            continue;
        }
        let base = laser.base_damage + enemy.max_health * laser.max_health_fraction;
        let (damage, critical) =
            roll_damage(base, player.crit_chance, player.crit_multiplier, &mut world.rng);
        enemy.take_damage(damage);
        enemy.vel += direction(origin, enemy.pos) * LASER_KNOCKBACK;
        world.effects.damage_number(&mut world.rng, enemy.pos, damage, critical);
        laser.hit_timers.insert(enemy.id, laser.tick_interval);
    }
}

/// Teleport toward `aim`, spending all stamina. Blocked targets still cost the stamina.
pub fn blink(world: &mut World, aim: Vec2) -> bool {
    let player = &mut world.player;
    if player.blink_cooldown > 0.0 || player.stamina <= 0.0 {
        return false;
    }
    let dir = direction(player.pos, aim);
    if dir == Vec2::ZERO {
        return false;
    }
    player.stamina = 0.0;
    player.blink_cooldown = DASH_COOLDOWN;

    let target = player.pos + dir * player.blink_distance;
    if world.terrain.is_solid_at(target, player.radius) {
        log::debug!("Blink blocked at ({:.0}, {:.0})", target.x, target.y);
        return false;
    }
    player.pos = target;
    world.effects.burst(&mut world.rng, target, 20, 5.0, 40.0, Tint::Cyan);
    true
}

/// A full rage bar summons a friendly ball
pub fn summon_friendly(world: &mut World) -> bool {
    let player = &mut world.player;
    if player.rage < player.max_rage || world.friendly_balls.len() >= MAX_FRIENDLY_BALLS {
        return false;
    }
    player.rage = 0.0;
    let offset = Vec2::new(world.rng.range(-50.0, 50.0), -40.0);
    world.friendly_balls.push(FriendlyBall::new(player.pos + offset));
    world.effects.text(player.pos - Vec2::new(0.0, 40.0), "Ally!", Tint::Green, 60.0, 1.0);
    log::info!("Friendly ball summoned ({} active)", world.friendly_balls.len());
    true
}

fn award_brick(world: &mut World, center: Vec2) {
    world.player.gain_exp(BRICK_EXP as f32);
    world.score += BRICK_SCORE;
    world.effects.exp_number(&mut world.rng, center, BRICK_EXP);
    world.effects.burst(&mut world.rng, center, 8, 3.0, 25.0, Tint::Brick);
}

/// Reward bricks broken by the player's head this frame
pub fn award_bricks(world: &mut World, centers: &[Vec2]) {
    for center in centers {
        award_brick(world, *center);
    }
}

/// Move projectiles and resolve them against terrain, enemies and the player
pub fn update_projectiles(world: &mut World) {
    let protected = world.zones.is_in_safe_zone(world.player.pos);

    for i in (0..world.projectiles.len()).rev() {
        let projectile = &mut world.projectiles[i];
        projectile.step();
        if projectile.is_spent(world.player.pos) {
            world.projectiles.remove(i);
            continue;
        }
        let (pos, radius) = (projectile.pos, projectile.radius);

        if world.terrain.blocks_projectile(pos, radius) {
            world.projectiles.remove(i);
            continue;
        }
        if let Some(hit) = world.terrain.hit_brick(pos, radius) {
            world.projectiles.remove(i);
            if let BrickHit::Destroyed(center) = hit {
                award_brick(world, center);
            }
            continue;
        }

        let projectile = &world.projectiles[i];
        match projectile.owner {
            Owner::Enemy => {
                if !projectile.hits(world.player.pos, world.player.radius) {
                    continue;
                }
                let damage = projectile.damage;
                world.projectiles.remove(i);
                if protected {
                    continue;
                }
                let player = &mut world.player;
                player.health -= damage;
                player.knock_back(pos, ENEMY_SHOT_KNOCKBACK);
                let at = player.pos;
                world.effects.damage_number(&mut world.rng, at, damage, false);
                world.events.emit(GameEvent::PlayerDamaged { damage });
            }
            Owner::Player => {
                let Some(enemy) = world
                    .enemies
                    .iter_mut()
                    .find(|e| !e.should_remove() && projectile.hits(e.pos, e.radius))
                else {
                    continue;
                };
                let (damage, critical) = roll_damage(
                    projectile.damage,
                    world.player.crit_chance,
                    world.player.crit_multiplier,
                    &mut world.rng,
                );
                enemy.take_damage(damage);
                let at = enemy.pos;
                world.effects.damage_number(&mut world.rng, at, damage, critical);
                world.effects.burst(&mut world.rng, at, 5, 3.0, 20.0, Tint::Gold);
                world.projectiles.remove(i);
            }
        }
    }
}

pub fn update_friendly_balls(world: &mut World) {
    for ball in &mut world.friendly_balls {
        if let Some(shot) = ball.update(world.player.pos, &world.enemies) {
            world.projectiles.push(shot);
        }
    }
    world.friendly_balls.retain(FriendlyBall::is_alive);
}

/// Drift spiked balls; touching one hurts the player and consumes it
pub fn update_spiked_balls(world: &mut World) {
    let protected = world.zones.is_in_safe_zone(world.player.pos);
    for i in (0..world.spiked_balls.len()).rev() {
        let ball = &mut world.spiked_balls[i];
        ball.step();
        if ball.touches(world.player.pos, world.player.radius) {
            let damage = ball.damage;
            world.spiked_balls.remove(i);
            if !protected {
                world.player.health -= damage;
                let at = world.player.pos;
                world.effects.damage_number(&mut world.rng, at, damage, false);
                world.events.emit(GameEvent::PlayerDamaged { damage });
            }
        } else if ball.is_stray(world.player.pos) {
            world.spiked_balls.remove(i);
        }
    }
}

/// Drop dead, evicted and distant enemies, paying out rewards for the dead
pub fn remove_enemies(world: &mut World) -> usize {
    let mut killed = 0;
    for i in (0..world.enemies.len()).rev() {
        let enemy = &world.enemies[i];
        if enemy.despawn {
            world.enemies.remove(i);
        } else if enemy.is_dead() {
            let enemy = world.enemies.remove(i);
            on_enemy_killed(world, &enemy);
            killed += 1;
        } else if enemy.pos.distance(world.player.pos) > ENEMY_CLEANUP_DISTANCE {
            log::debug!("Enemy #{} left the play area", enemy.id);
            world.enemies.remove(i);
        }
    }
    killed
}

fn on_enemy_killed(world: &mut World, enemy: &Enemy) {
    let now = world.time_ms;
    world.stats.record_kill(enemy.kind);
    world.spawn_points.record_kill_near(enemy.pos, now);

    if let Some(zone_id) = world.zones.record_kill(enemy.pos, now, &mut world.rng) {
        let center = world
            .zones
            .zones()
            .iter()
            .find(|z| z.id == zone_id)
            .map_or(enemy.pos, |z| z.center);
        world.effects.text(center, "Safe Zone!", Tint::Green, 120.0, 1.5);
        world.events.emit(GameEvent::SafeZoneCreated { zone_id, center });
    }

    if let Some(id) = world
        .buffs
        .check_drop(DropClass::of(enemy.kind), now, &mut world.rng)
    {
        let at = world.player.pos - Vec2::new(0.0, 60.0);
        world.effects.text(at, format!("{}!", id.display_name()), Tint::Gold, 120.0, 1.3);
        world.events.emit(GameEvent::BuffActivated { id });
    }

    let reward = kill_reward(enemy.max_health, enemy.level, enemy.distance_from_spawn);
    let player = &mut world.player;
    player.gain_exp(reward.exp as f32);
    let rage = KILL_RAGE * player.hit_rage_multiplier;
    player.add_rage(rage);
    world.score += reward.score;

    world.effects.exp_number(&mut world.rng, enemy.pos, reward.exp);
    world.events.emit(GameEvent::MonsterKilled {
        kind: enemy.kind,
        elite_variant: enemy.elite_variant(),
        level: enemy.level,
        max_health: enemy.max_health,
        pos: enemy.pos,
        exp: reward.exp,
        score: reward.score,
    });
    world.effects.burst(&mut world.rng, enemy.pos, 15, 4.0, 30.0, Tint::Red);
}
