//! Fixed timestep simulation tick
//!
//! Advances the world by one frame in a fixed order: player, camera, terrain,
//! spawning, population control, entities, buffs, progression.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combat;
use super::density::{self, FrenzyChange};
use super::effects::Tint;
use super::enemy::ai;
use super::enemy::behavior::{BehaviorCtx, behavior_for};
use super::events::GameEvent;
use super::hazard::SpikedBall;
use super::rng::SimRng;
use super::world::World;
use crate::consts::*;

/// Enemies farther than this from the player only run AI every few frames
const AI_THROTTLE_DISTANCE: f32 = 1000.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// A / D held
    pub left: bool,
    pub right: bool,
    /// Space held: charges, jumps on release
    pub jump: bool,
    /// W held
    pub double_jump: bool,
    /// S held
    pub fast_fall: bool,
    pub fire: bool,
    pub aoe: bool,
    pub wheels: bool,
    /// Laser channel held
    pub laser: bool,
    pub blink: bool,
    /// Pause toggle
    pub pause: bool,
    /// Pointer position in world space
    pub aim: Option<Vec2>,
}

/// Advance the world by one frame
pub fn tick(world: &mut World, input: &TickInput) {
    if input.pause {
        world.paused = !world.paused;
        log::info!("Game {}", if world.paused { "paused" } else { "resumed" });
    }
    if world.paused || world.game_over {
        return;
    }

    world.frame += 1;
    world.time_ms += FRAME_MS;
    let now = world.time_ms;

    // Player physics
    world
        .player
        .update_movement(input, now, &mut world.effects, &mut world.rng);
    world.player.update_timers();
    let contact = world.terrain.resolve_player(&mut world.player);
    combat::award_bricks(world, &contact.broken_bricks);
    handle_actions(world, input);

    world.camera.follow(world.player.pos, world.player.vel);

    world.terrain.generate_ahead(&world.player, &mut world.rng);
    if world.frame % world.mode.cleanup_interval() == 0 {
        world.terrain.cleanup(world.player.pos);
    }

    update_spawn_points(world, now);

    let screen = world.camera.screen_size();
    let forced = density::enforce_monster_density(
        &world.enemies,
        world.player.pos,
        world.player.level,
        screen,
        &mut world.spawn_points,
    );
    for _ in 0..forced {
        world.spawn_near_player();
    }
    density::enforce_area_limits(&mut world.enemies, world.player.pos, screen);

    match world.frenzy.update(world.player.pos, &world.enemies) {
        Some(FrenzyChange::Started) => {
            let at = world.player.pos - Vec2::new(0.0, 80.0);
            world.effects.text(at, "FRENZY!", Tint::Red, 120.0, 2.0);
            world.events.emit(GameEvent::FrenzyStarted);
        }
        Some(FrenzyChange::Ended) => world.events.emit(GameEvent::FrenzyEnded),
        None => {}
    }

    world.zones.update(world.player.pos);

    update_dynamic_spawner(world);
    update_spiked_spawner(world);

    world.player.regenerate();
    world.player.tick_cooldowns();

    // Entity pass
    update_enemies(world);
    combat::update_projectiles(world);
    combat::update_friendly_balls(world);
    combat::update_spiked_balls(world);
    world.effects.update();
    combat::update_wheels(world);
    combat::update_laser(world, input.laser, input.aim);

    let burns = world
        .buffs
        .update(now, FRAME_MS as f32, world.player.pos, &mut world.enemies);
    for hit in burns {
        world
            .effects
            .damage_number(&mut world.rng, hit.pos, hit.damage, false);
    }
    combat::remove_enemies(world);

    if world.player.check_level_up() {
        let level = world.player.level;
        let at = world.player.pos - Vec2::new(0.0, 60.0);
        world.effects.text(at, format!("Level {}!", level), Tint::Gold, 120.0, 1.5);
        world.events.emit(GameEvent::LevelUp { level });
    }

    if !world.player.is_alive() {
        world.game_over = true;
        log::info!(
            "Game over at level {} with score {}",
            world.player.level,
            world.score
        );
    }
}

/// Skills triggered by this frame's input
fn handle_actions(world: &mut World, input: &TickInput) {
    // Wheels stay usable while immobilized and break the hold
    if input.wheels {
        combat::activate_wheels(world);
    }
    if world.player.is_controlled() {
        return;
    }
    if input.fire {
        combat::player_fire(world, input.aim);
    }
    if input.aoe {
        combat::cast_aoe(world);
    }
    if input.blink {
        if let Some(aim) = input.aim {
            combat::blink(world, aim);
        }
    }
    combat::summon_friendly(world);
}

fn update_spawn_points(world: &mut World, now: f64) {
    let speed = world.player.vel.length();
    let due = world.spawn_points.tick(
        now,
        world.player.pos,
        speed,
        &world.enemies,
        &world.zones,
        &mut world.rng,
    );
    let seeded = world.spawn_points.generate(
        world.player.pos,
        speed,
        &world.noise,
        &world.zones,
        &mut world.rng,
    );
    for pos in due.into_iter().chain(seeded) {
        world.spawn_rolled(pos);
    }
}

/// Timed spawns around the player, denser in frenzy
fn update_dynamic_spawner(world: &mut World) {
    world.spawn_timer_ms += FRAME_MS;
    let interval = world.mode.spawn_interval() as f64 * 1000.0;
    if world.spawn_timer_ms < interval {
        return;
    }
    world.spawn_timer_ms = 0.0;

    if world.enemies.len() >= world.mode.max_enemies()
        || !world.rng.chance(world.mode.spawn_probability())
    {
        return;
    }
    for _ in 0..spawn_burst(world.frenzy.active, &mut world.rng) {
        world.spawn_near_player();
    }
}

/// Enemies per dynamic spawn: one, or two to three in frenzy
fn spawn_burst(frenzy: bool, rng: &mut SimRng) -> u32 {
    if !frenzy {
        1
    } else if rng.chance(0.6) {
        2
    } else if rng.chance(0.3) {
        3
    } else {
        1
    }
}

fn update_spiked_spawner(world: &mut World) {
    if world.spiked_balls.len() < world.mode.max_spiked_balls()
        && world.rng.chance(world.mode.spiked_ball_chance())
    {
        let ball = SpikedBall::spawn_near(world.player.pos, &mut world.rng);
        world.spiked_balls.push(ball);
    }
}

/// AI, kind behavior, movement and player contact for every enemy
fn update_enemies(world: &mut World) {
    let stride = world.mode.ai_stride().max(1);
    let frame = world.frame;
    let frenzy = world.frenzy.active;
    let strength = ai::player_strength(&world.player);
    let protected = world.zones.is_in_safe_zone(world.player.pos);

    let World {
        enemies,
        player,
        zones,
        projectiles,
        effects,
        rng,
        events,
        ..
    } = world;
    let mut ctx = BehaviorCtx {
        player,
        zones,
        projectiles,
        effects,
        rng,
        frenzy,
        player_protected: protected,
        damage_dealt: 0.0,
    };

    for enemy in enemies.iter_mut() {
        if enemy.should_remove() {
            continue;
        }
        if !enemy.pos.is_finite() || !enemy.vel.is_finite() {
            log::warn!("Dropping enemy #{} with a broken position", enemy.id);
            enemy.despawn = true;
            continue;
        }
        if enemy.stunned > 0 {
            enemy.stunned -= 1;
            continue;
        }

        let behavior = behavior_for(enemy.kind);
        let near = enemy.pos.distance(ctx.player.pos) <= AI_THROTTLE_DISTANCE;
        if near || (frame + enemy.id as u64) % stride == 0 {
            ai::update_movement(enemy, ctx.player.pos, strength, ctx.zones, frenzy);
            behavior.on_update(enemy, &mut ctx);
        }
        enemy.pos += enemy.vel;

        if !enemy.despawn && enemy.touches(ctx.player.pos, ctx.player.radius) {
            behavior.on_player_contact(enemy, &mut ctx);
        }
        enemy.attack_cooldown = (enemy.attack_cooldown - 1.0).max(0.0);
        enemy.ranged_cooldown = (enemy.ranged_cooldown - 1.0).max(0.0);
    }

    if ctx.damage_dealt > 0.0 {
        events.emit(GameEvent::PlayerDamaged {
            damage: ctx.damage_dealt,
        });
    }
}
