//! Procedural platforms and blocks
//!
//! Platforms are generated ahead of the player's movement and dropped once they fall
//! far behind. Stone blocks stop bullets; bricks can be broken from below or shot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::player::Player;
use super::rng::SimRng;

const BLOCK_SIZE: f32 = 40.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainConfig {
    pub min_width: f32,
    pub max_width: f32,
    pub height: f32,
    pub mainland_min_width: f32,
    pub mainland_max_width: f32,
    pub mainland_height: f32,
    pub ground_block_chance: f32,
    pub mainland_chance: f32,
    pub stone_block_chance: f32,
    pub brick_block_chance: f32,
    pub brick_health: u32,
    pub cleanup_distance: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            min_width: 100.0,
            max_width: 300.0,
            height: 20.0,
            mainland_min_width: 400.0,
            mainland_max_width: 800.0,
            mainland_height: 80.0,
            ground_block_chance: 0.2,
            mainland_chance: 0.1,
            stone_block_chance: 0.15,
            brick_block_chance: 0.15,
            brick_health: 2,
            cleanup_distance: 4000.0,
        }
    }
}

/// Axis-aligned box with `min` at the top-left (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Circle vs box overlap using the box expanded by the radius
    pub fn overlaps_circle(&self, pos: Vec2, radius: f32) -> bool {
        let max = self.max();
        pos.x + radius > self.min.x
            && pos.x - radius < max.x
            && pos.y + radius > self.min.y
            && pos.y - radius < max.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Plain,
    Ground,
    Mainland,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub rect: Rect,
    pub health: u32,
}

/// Outcome of resolving the player against terrain this frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TerrainContact {
    pub on_ground: bool,
    /// Centers of bricks destroyed by a head-butt
    pub broken_bricks: Vec<Vec2>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Terrain {
    pub config: TerrainConfig,
    pub platforms: Vec<Platform>,
    pub solid_blocks: Vec<Rect>,
    pub stone_blocks: Vec<Rect>,
    pub bricks: Vec<Brick>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Area {
    Below,
    Horizontal,
    Diagonal,
}

impl Terrain {
    pub fn new(config: TerrainConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Wide starting platform under the spawn point
    pub fn with_start_platform(config: TerrainConfig) -> Self {
        let mut terrain = Self::new(config);
        terrain.platforms.push(Platform {
            rect: Rect::new(-300.0, 60.0, 600.0, terrain.config.height),
            kind: PlatformKind::Plain,
        });
        terrain
    }

    /// Generate platforms where the player is heading
    pub fn generate_ahead(&mut self, player: &Player, rng: &mut SimRng) {
        let look_ahead = (player.vel.length() * 50.0).max(800.0);
        let facing = if player.vel.x > 0.0 { 1.0 } else { -1.0 };
        let areas = [
            (Area::Below, Vec2::new(0.0, 1.0)),
            (Area::Horizontal, Vec2::new(facing, 0.0)),
            (Area::Diagonal, Vec2::new(facing, 1.0)),
        ];
        for (area, dir) in areas {
            let center = player.pos + dir * look_ahead;
            if self.needs_platforms(center, area) {
                self.generate_in_area(center, area, rng);
            }
        }
    }

    fn needs_platforms(&self, center: Vec2, area: Area) -> bool {
        let (search, min) = match area {
            Area::Below => (400.0, 1),
            Area::Horizontal | Area::Diagonal => (600.0, 2),
        };
        let nearby = self
            .platforms
            .iter()
            .filter(|p| {
                let anchor = Vec2::new(p.rect.center().x, p.rect.min.y);
                anchor.distance(center) < search
            })
            .count();
        nearby < min
    }

    fn generate_in_area(&mut self, center: Vec2, area: Area, rng: &mut SimRng) {
        let count = match area {
            Area::Below => 1,
            _ => rng.range_inclusive(2, 4),
        };
        for _ in 0..count {
            let c = &self.config;
            let mut width = rng.range(c.min_width, c.max_width);
            let x = center.x - width / 2.0 + rng.range(-200.0, 200.0);
            let y = center.y + rng.range(-100.0, 100.0);
            let ground = rng.chance(c.ground_block_chance);
            let mainland = rng.chance(c.mainland_chance);

            // One decoration per platform
            let roll = rng.unit();
            let stone = roll < c.stone_block_chance;
            let brick = !stone && roll < c.stone_block_chance + c.brick_block_chance;

            let (kind, height) = if mainland {
                width = rng.range(c.mainland_min_width, c.mainland_max_width);
                (PlatformKind::Mainland, c.mainland_height)
            } else if ground {
                (PlatformKind::Ground, c.height)
            } else {
                (PlatformKind::Plain, c.height)
            };
            let brick_health = c.brick_health;
            let columns = (width / BLOCK_SIZE).floor() as u32;

            match kind {
                PlatformKind::Ground => self.stack_blocks(x, y, columns, 1),
                PlatformKind::Mainland => {
                    self.stack_blocks(x, y, columns, (height / BLOCK_SIZE).floor() as u32)
                }
                PlatformKind::Plain => {}
            }
            if stone {
                let layers = rng.range_inclusive(1, 3);
                for col in 0..columns {
                    for layer in 0..layers {
                        self.stone_blocks.push(block_rect(x, y, col, layer));
                    }
                }
            } else if brick {
                let layers = rng.range_inclusive(1, 2);
                for col in 0..columns {
                    for layer in 0..layers {
                        self.bricks.push(Brick {
                            rect: block_rect(x, y, col, layer),
                            health: brick_health,
                        });
                    }
                }
            }

            self.platforms.push(Platform {
                rect: Rect::new(x, y, width, height),
                kind,
            });
        }
    }

    fn stack_blocks(&mut self, x: f32, y: f32, columns: u32, layers: u32) {
        for col in 0..columns {
            for layer in 0..layers {
                self.solid_blocks.push(block_rect(x, y, col, layer));
            }
        }
    }

    /// Drop terrain far from the player
    pub fn cleanup(&mut self, player_pos: Vec2) {
        let max = self.config.cleanup_distance;
        self.platforms
            .retain(|p| p.rect.center().distance(player_pos) <= max);
        self.solid_blocks
            .retain(|r| r.center().distance(player_pos) <= max);
        self.stone_blocks
            .retain(|r| r.center().distance(player_pos) <= max);
        self.bricks
            .retain(|b| b.rect.center().distance(player_pos) <= max);
    }

    /// Collide the player with platforms, blocks and bricks
    pub fn resolve_player(&mut self, player: &mut Player) -> TerrainContact {
        let mut contact = TerrainContact::default();

        let solids = self
            .platforms
            .iter()
            .map(|p| p.rect)
            .chain(self.solid_blocks.iter().copied())
            .chain(self.stone_blocks.iter().copied());
        for rect in solids {
            if rect.center().distance(player.pos) > 400.0 + rect.size.x {
                continue;
            }
            if rect.overlaps_circle(player.pos, player.radius) && land_on(player, &rect) {
                contact.on_ground = true;
                break;
            }
        }

        for i in (0..self.bricks.len()).rev() {
            let rect = self.bricks[i].rect;
            if !rect.overlaps_circle(player.pos, player.radius) {
                continue;
            }
            if player.vel.y > 0.0 {
                player.pos.y = rect.min.y - player.radius;
                player.vel.y = 0.0;
                player.land();
                contact.on_ground = true;
            } else if player.vel.y < 0.0 {
                // Head-butt from below
                let brick = &mut self.bricks[i];
                brick.health = brick.health.saturating_sub(1);
                player.pos.y = rect.max().y + player.radius;
                player.vel.y = 2.0;
                if brick.health == 0 {
                    contact.broken_bricks.push(rect.center());
                    self.bricks.remove(i);
                }
            }
        }
        contact
    }

    /// Stone block hit by a circle, used to stop projectiles
    pub fn blocks_projectile(&self, pos: Vec2, radius: f32) -> bool {
        self.stone_blocks
            .iter()
            .any(|r| r.overlaps_circle(pos, radius))
    }

    /// Damage a brick hit by a projectile; returns its center when destroyed
    pub fn hit_brick(&mut self, pos: Vec2, radius: f32) -> Option<BrickHit> {
        let index = self
            .bricks
            .iter()
            .position(|b| b.rect.overlaps_circle(pos, radius))?;
        let brick = &mut self.bricks[index];
        brick.health = brick.health.saturating_sub(1);
        let center = brick.rect.center();
        if brick.health == 0 {
            self.bricks.remove(index);
            Some(BrickHit::Destroyed(center))
        } else {
            Some(BrickHit::Damaged(center))
        }
    }

    /// Any solid terrain overlapping the circle
    pub fn is_solid_at(&self, pos: Vec2, radius: f32) -> bool {
        self.platforms
            .iter()
            .map(|p| &p.rect)
            .chain(self.solid_blocks.iter())
            .chain(self.stone_blocks.iter())
            .chain(self.bricks.iter().map(|b| &b.rect))
            .any(|r| r.overlaps_circle(pos, radius))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrickHit {
    Damaged(Vec2),
    Destroyed(Vec2),
}

fn block_rect(x: f32, y: f32, col: u32, layer: u32) -> Rect {
    Rect::new(
        x + col as f32 * BLOCK_SIZE,
        y - (layer + 1) as f32 * BLOCK_SIZE,
        BLOCK_SIZE,
        BLOCK_SIZE,
    )
}

/// Push the player out of `rect`; returns true when standing on top of it
fn land_on(player: &mut Player, rect: &Rect) -> bool {
    let center = rect.center();
    let offset = player.pos - center;
    let overlap_x = player.radius + rect.size.x / 2.0 - offset.x.abs();
    let overlap_y = player.radius + rect.size.y / 2.0 - offset.y.abs();
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return false;
    }

    if overlap_x < overlap_y {
        player.pos.x = if offset.x > 0.0 {
            rect.max().x + player.radius
        } else {
            rect.min.x - player.radius
        };
        player.vel.x = 0.0;
        false
    } else if offset.y > 0.0 {
        // Jumping up passes through platforms
        if player.vel.y < 0.0 {
            return false;
        }
        player.pos.y = rect.max().y + player.radius;
        player.vel.y = player.vel.y.max(0.0);
        false
    } else if player.vel.y > 0.0 {
        player.pos.y = rect.min.y - player.radius;
        player.vel.y = 0.0;
        player.land();
        true
    } else {
        false
    }
}
